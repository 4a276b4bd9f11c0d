use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Simulation;
use crate::{Error, Vector3D};

/// Metropolis Monte Carlo single-particle displacement move.
///
/// Each attempt displaces one random particle by a uniform random vector in
/// `[-max_displacement, max_displacement]^3` and accepts it with probability
/// `min(1, exp(-beta * delta_u))`, where `delta_u` is computed from the
/// particle's own neighbor lists (up and down).
///
/// `max_displacement` should stay below half the neighbor list buffer, so
/// that a single accepted move can not carry a particle past an unlisted
/// neighbor before the criteria notice.
pub struct TranslateMove {
    max_displacement: f64,
    beta: f64,
    rng: StdRng,
    attempted: u64,
    accepted: u64,
}

impl TranslateMove {
    /// Create a move with the given maximum displacement per axis and
    /// inverse temperature `beta`, seeding the random number generator with
    /// `seed`.
    pub fn new(max_displacement: f64, beta: f64, seed: u64) -> Result<TranslateMove, Error> {
        if !(max_displacement > 0.0) || !max_displacement.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "max displacement must be positive and finite, got {}", max_displacement
            )));
        }
        if !(beta >= 0.0) || !beta.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "beta must be non-negative and finite, got {}", beta
            )));
        }

        Ok(TranslateMove {
            max_displacement: max_displacement,
            beta: beta,
            rng: StdRng::seed_from_u64(seed),
            attempted: 0,
            accepted: 0,
        })
    }

    /// Attempt one displacement, returning true if it was accepted
    pub fn attempt(&mut self, simulation: &mut Simulation) -> bool {
        simulation.update_lists_if_needed();

        let size = simulation.system().size();
        if size == 0 {
            return false;
        }
        self.attempted += 1;

        let particle = self.rng.gen_range(0..size);
        let old_position = simulation.system().positions()[particle];
        let old_energy = simulation.particle_energy(particle);

        let delta = Vector3D::new(
            self.rng.gen_range(-self.max_displacement..=self.max_displacement),
            self.rng.gen_range(-self.max_displacement..=self.max_displacement),
            self.rng.gen_range(-self.max_displacement..=self.max_displacement),
        );
        simulation.set_position(particle, old_position + delta);
        let delta_energy = simulation.particle_energy(particle) - old_energy;

        let accept = delta_energy <= 0.0
            || self.rng.gen::<f64>() < f64::exp(-self.beta * delta_energy);

        if accept {
            self.accepted += 1;
        } else {
            simulation.set_position(particle, old_position);
        }
        return accept;
    }

    /// Attempt `n` displacements
    pub fn run(&mut self, simulation: &mut Simulation, n: usize) {
        for _ in 0..n {
            self.attempt(simulation);
        }
    }

    /// Get the fraction of attempted moves that were accepted
    pub fn acceptance(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        return self.accepted as f64 / self.attempted as f64;
    }
}
