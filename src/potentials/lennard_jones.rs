use super::PairPotential;
use crate::Error;

/// The Lennard-Jones potential, truncated at `cutoff`:
///
/// `u(r) = 4 epsilon [(sigma / r)^12 - (sigma / r)^6]` for `r < cutoff`,
/// zero above.
///
/// With `shift` set, the energy is shifted by `-u(cutoff)` so that it goes
/// continuously to zero at the cutoff; the force is unaffected by the shift.
#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct LennardJones {
    /// Distance at which the unshifted potential crosses zero
    pub sigma: f64,
    /// Depth of the potential well
    pub epsilon: f64,
    /// Truncation distance
    pub cutoff: f64,
    /// Shift the energy to zero at the cutoff
    #[serde(default)]
    pub shift: bool,
}

impl LennardJones {
    /// Create a new truncated (not shifted) Lennard-Jones potential
    pub fn new(sigma: f64, epsilon: f64, cutoff: f64) -> Result<LennardJones, Error> {
        let potential = LennardJones {
            sigma: sigma,
            epsilon: epsilon,
            cutoff: cutoff,
            shift: false,
        };
        potential.validate()?;
        return Ok(potential);
    }

    /// Create a new truncated and shifted Lennard-Jones potential
    pub fn shifted(sigma: f64, epsilon: f64, cutoff: f64) -> Result<LennardJones, Error> {
        let mut potential = LennardJones::new(sigma, epsilon, cutoff)?;
        potential.shift = true;
        return Ok(potential);
    }

    /// Create a potential from a JSON string of parameters
    pub fn from_parameters(parameters: &str) -> Result<LennardJones, Error> {
        let potential: LennardJones = serde_json::from_str(parameters)?;
        potential.validate()?;
        return Ok(potential);
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "sigma must be positive and finite, got {}", self.sigma
            )));
        }
        if !(self.epsilon > 0.0) || !self.epsilon.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "epsilon must be positive and finite, got {}", self.epsilon
            )));
        }
        if !(self.cutoff > 0.0) || !self.cutoff.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be positive and finite, got {}", self.cutoff
            )));
        }
        Ok(())
    }

    /// `(sigma / r)^6` and `(sigma / r)^12` from the squared distance
    #[inline]
    fn sigma_powers(&self, r2: f64) -> (f64, f64) {
        let s2 = self.sigma * self.sigma / r2;
        let s6 = s2 * s2 * s2;
        return (s6, s6 * s6);
    }

    #[inline]
    fn unshifted(&self, r2: f64) -> f64 {
        let (s6, s12) = self.sigma_powers(r2);
        return 4.0 * self.epsilon * (s12 - s6);
    }
}

impl PairPotential for LennardJones {
    fn energy(&self, r2: f64) -> f64 {
        if r2 >= self.cutoff * self.cutoff {
            return 0.0;
        }

        let mut energy = self.unshifted(r2);
        if self.shift {
            energy -= self.unshifted(self.cutoff * self.cutoff);
        }
        return energy;
    }

    fn force_factor(&self, r2: f64) -> f64 {
        if r2 >= self.cutoff * self.cutoff {
            return 0.0;
        }

        let (s6, s12) = self.sigma_powers(r2);
        return 24.0 * self.epsilon * (2.0 * s12 - s6) / r2;
    }

    fn range(&self) -> f64 {
        self.cutoff
    }

    fn tail_correction(&self, volume: f64, n_pairs: f64) -> f64 {
        if self.shift {
            // shifting is used precisely when no tail correction is wanted
            return 0.0;
        }

        let sc3 = (self.sigma / self.cutoff).powi(3);
        let sc9 = sc3 * sc3 * sc3;
        let prefactor = 16.0 * std::f64::consts::PI * n_pairs * self.epsilon
            * self.sigma.powi(3) / (3.0 * volume);
        return prefactor * (sc9 / 3.0 - sc3);
    }
}
