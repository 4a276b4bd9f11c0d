use super::Simulation;
use crate::Error;

/// Velocity Verlet integrator for molecular dynamics.
///
/// Each step is the usual kick-drift-kick sequence: half a velocity update
/// from the current forces, a full position update, then the second half of
/// the velocity update from the recomputed forces. Neighbor list maintenance
/// happens inside the force computation, once per step.
pub struct VelocityVerlet {
    timestep: f64,
}

impl VelocityVerlet {
    /// Create an integrator advancing time by `timestep` per step
    pub fn new(timestep: f64) -> Result<VelocityVerlet, Error> {
        if !(timestep > 0.0) || !timestep.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "timestep must be positive and finite, got {}", timestep
            )));
        }
        Ok(VelocityVerlet { timestep: timestep })
    }

    /// Get the timestep
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Advance the simulation by one step
    pub fn step(&self, simulation: &mut Simulation) {
        let dt = self.timestep;
        let size = simulation.system().size();

        // first half-kick and drift
        let forces = simulation.compute_forces().to_vec();
        for i in 0..size {
            let mass = simulation.system().masses()[i];
            let velocity = simulation.system().velocities()[i] + 0.5 * dt / mass * forces[i];
            simulation.set_velocity(i, velocity);
            simulation.translate(i, dt * velocity);
        }

        // second half-kick from the forces at the new positions
        let forces = simulation.compute_forces().to_vec();
        for i in 0..size {
            let mass = simulation.system().masses()[i];
            let velocity = simulation.system().velocities()[i] + 0.5 * dt / mass * forces[i];
            simulation.set_velocity(i, velocity);
        }
    }

    /// Advance the simulation by `n` steps
    pub fn run(&self, simulation: &mut Simulation, n: usize) {
        for _ in 0..n {
            self.step(simulation);
        }
    }
}

/// Total kinetic energy of the system
pub fn kinetic_energy(simulation: &Simulation) -> f64 {
    let velocities = simulation.system().velocities();
    let masses = simulation.system().masses();
    velocities
        .iter()
        .zip(masses)
        .map(|(v, &m)| 0.5 * m * v.norm2())
        .sum()
}
