use super::PairPotential;
use crate::Error;

/// Purely repulsive inverse-power potential, truncated at `cutoff`:
///
/// `u(r) = epsilon (sigma / r)^exponent` for `r < cutoff`, zero above.
#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct SoftSphere {
    /// Length scale of the repulsion
    pub sigma: f64,
    /// Energy scale of the repulsion
    pub epsilon: f64,
    /// Inverse-power exponent, must be even and at least 4
    pub exponent: u32,
    /// Truncation distance
    pub cutoff: f64,
}

impl SoftSphere {
    /// Create a new soft-sphere potential
    pub fn new(sigma: f64, epsilon: f64, exponent: u32, cutoff: f64) -> Result<SoftSphere, Error> {
        let potential = SoftSphere {
            sigma: sigma,
            epsilon: epsilon,
            exponent: exponent,
            cutoff: cutoff,
        };
        potential.validate()?;
        return Ok(potential);
    }

    /// Create a potential from a JSON string of parameters
    pub fn from_parameters(parameters: &str) -> Result<SoftSphere, Error> {
        let potential: SoftSphere = serde_json::from_str(parameters)?;
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
        if self.exponent < 4 || self.exponent % 2 != 0 {
            // even exponents allow evaluation from the squared distance
            return Err(Error::InvalidParameter(format!(
                "exponent must be even and at least 4, got {}", self.exponent
            )));
        }
        if !(self.cutoff > 0.0) || !self.cutoff.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be positive and finite, got {}", self.cutoff
            )));
        }
        Ok(())
    }

    #[inline]
    fn repulsion(&self, r2: f64) -> f64 {
        let s2 = self.sigma * self.sigma / r2;
        return self.epsilon * s2.powi((self.exponent / 2) as i32);
    }
}

impl PairPotential for SoftSphere {
    fn energy(&self, r2: f64) -> f64 {
        if r2 >= self.cutoff * self.cutoff {
            return 0.0;
        }
        return self.repulsion(r2);
    }

    fn force_factor(&self, r2: f64) -> f64 {
        if r2 >= self.cutoff * self.cutoff {
            return 0.0;
        }
        return f64::from(self.exponent) * self.repulsion(r2) / r2;
    }

    fn range(&self) -> f64 {
        self.cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn invalid_parameters() {
        assert!(SoftSphere::new(0.0, 1.0, 12, 1.5).is_err());
        assert!(SoftSphere::new(1.0, -1.0, 12, 1.5).is_err());
        assert!(SoftSphere::new(1.0, 1.0, 7, 1.5).is_err());
        assert!(SoftSphere::new(1.0, 1.0, 2, 1.5).is_err());
        assert!(SoftSphere::new(1.0, 1.0, 12, 0.0).is_err());
    }

    #[test]
    fn energy_and_force() {
        let ss = SoftSphere::new(1.0, 2.0, 12, 3.0).unwrap();

        // u(sigma) = epsilon
        assert_relative_eq!(ss.energy(1.0), 2.0, max_relative = 1e-12);

        // u(2 sigma) = epsilon / 2^12
        assert_relative_eq!(ss.energy(4.0), 2.0 / 4096.0, max_relative = 1e-12);

        // always repulsive inside the cutoff
        assert!(ss.force_factor(1.0) > 0.0);
        assert!(ss.force_factor(4.0) > 0.0);

        // -(du/dr)/r = n u(r) / r^2
        assert_relative_eq!(ss.force_factor(1.0), 12.0 * 2.0, max_relative = 1e-12);

        assert_eq!(ss.energy(9.0), 0.0);
        assert_eq!(ss.force_factor(9.0), 0.0);
    }
}
