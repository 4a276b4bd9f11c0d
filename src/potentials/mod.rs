use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::Error;

mod lennard_jones;
pub use self::lennard_jones::LennardJones;

mod soft_sphere;
pub use self::soft_sphere::SoftSphere;

/// A pairwise interaction potential, evaluated from the squared separation
/// between two particles.
///
/// Working with the squared distance lets the hot loops skip the square root
/// whenever the functional form allows it. The capability set is
/// intentionally small: energy, force, interaction range, and an optional
/// long-range correction for truncated forms.
pub trait PairPotential: Send + Sync {
    /// Interaction energy of a pair at squared distance `r2`
    fn energy(&self, r2: f64) -> f64;

    /// Scalar force factor `-(dU/dr)/r` of a pair at squared distance `r2`.
    ///
    /// With `rij` the minimum-image vector from particle `i` to particle
    /// `j`, the force acting on `j` is `force_factor(r2) * rij` and the
    /// force on `i` is its opposite.
    fn force_factor(&self, r2: f64) -> f64;

    /// Distance above which this potential is treated as zero
    fn range(&self) -> f64;

    /// Long-range correction to the total energy for a truncated potential,
    /// evaluated once per full energy calculation.
    ///
    /// `n_pairs` is the number of particle pairs this potential applies to
    /// (`n (n - 1) / 2` within one species, `n_a n_b` across two species),
    /// and `volume` the box volume. Potentials without an analytic tail
    /// return zero.
    fn tail_correction(&self, volume: f64, n_pairs: f64) -> f64 {
        let _ = (volume, n_pairs);
        return 0.0;
    }
}

/// One registered potential with the species pair it applies to
struct RegistryEntry {
    species: (i32, i32),
    potential: Box<dyn PairPotential>,
}

/// The `PotentialRegistry` maps unordered species pairs to the potential
/// governing their interaction.
///
/// It is consulted both when sizing cells and neighbor criteria (through
/// each potential's `range`) and for every accepted pair during energy and
/// force evaluation.
pub struct PotentialRegistry {
    entries: Vec<RegistryEntry>,
    by_species: BTreeMap<(i32, i32), usize>,
}

impl Default for PotentialRegistry {
    fn default() -> PotentialRegistry {
        PotentialRegistry::new()
    }
}

impl PotentialRegistry {
    /// Create a new empty registry
    pub fn new() -> PotentialRegistry {
        PotentialRegistry {
            entries: Vec::new(),
            by_species: BTreeMap::new(),
        }
    }

    /// Register `potential` for pairs of particles with species `a` and `b`
    /// (in any order), returning the potential index.
    pub fn add_pair(
        &mut self,
        a: i32,
        b: i32,
        potential: Box<dyn PairPotential>,
    ) -> Result<usize, Error> {
        let range = potential.range();
        if !(range > 0.0) || !range.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "potential range must be positive and finite, got {}", range
            )));
        }

        let species = sort_species(a, b);
        if self.by_species.contains_key(&species) {
            return Err(Error::InvalidParameter(format!(
                "a potential is already registered for species {} and {}",
                species.0, species.1
            )));
        }

        let index = self.entries.len();
        self.entries.push(RegistryEntry {
            species: species,
            potential: potential,
        });
        self.by_species.insert(species, index);
        return Ok(index);
    }

    /// Get the index of the potential governing species `a` and `b`, if any
    pub fn index_for(&self, a: i32, b: i32) -> Option<usize> {
        self.by_species.get(&sort_species(a, b)).copied()
    }

    /// Get the potential at the given `index`
    pub fn potential(&self, index: usize) -> &dyn PairPotential {
        &*self.entries[index].potential
    }

    /// Get the species pair the potential at `index` applies to
    pub fn species_for(&self, index: usize) -> (i32, i32) {
        self.entries[index].species
    }

    /// Get the number of registered potentials
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether this registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the largest interaction range among all registered potentials, or
    /// `None` if the registry is empty.
    pub fn max_range(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|entry| entry.potential.range())
            .fold(None, |max, range| match max {
                Some(max) => Some(f64::max(max, range)),
                None => Some(range),
            })
    }
}

fn sort_species(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}

type PotentialCreator = fn(parameters: &str) -> Result<Box<dyn PairPotential>, Error>;

static REGISTERED_POTENTIALS: Lazy<BTreeMap<&'static str, PotentialCreator>> = Lazy::new(|| {
    let mut map = BTreeMap::new();

    map.insert("lennard_jones", (|parameters| {
        let potential = LennardJones::from_parameters(parameters)?;
        Ok(Box::new(potential) as Box<dyn PairPotential>)
    }) as PotentialCreator);

    map.insert("soft_sphere", (|parameters| {
        let potential = SoftSphere::from_parameters(parameters)?;
        Ok(Box::new(potential) as Box<dyn PairPotential>)
    }) as PotentialCreator);

    return map;
});

/// Create a potential from its registered `name` and a JSON string of
/// `parameters`.
pub fn from_parameters(name: &str, parameters: &str) -> Result<Box<dyn PairPotential>, Error> {
    match REGISTERED_POTENTIALS.get(name) {
        Some(creator) => creator(parameters),
        None => Err(Error::InvalidParameter(format!(
            "unknown potential name '{}'", name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry() {
        let mut registry = PotentialRegistry::new();
        let lj = LennardJones::new(1.0, 1.0, 2.5).unwrap();
        let ss = SoftSphere::new(1.0, 1.0, 12, 1.5).unwrap();

        let first = registry.add_pair(1, 2, Box::new(lj)).unwrap();
        let second = registry.add_pair(1, 1, Box::new(ss)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_for(1, 2), Some(first));
        assert_eq!(registry.index_for(2, 1), Some(first));
        assert_eq!(registry.index_for(1, 1), Some(second));
        assert_eq!(registry.index_for(2, 2), None);

        assert_eq!(registry.species_for(first), (1, 2));
        assert_eq!(registry.max_range(), Some(2.5));
    }

    #[test]
    fn duplicate_pair() {
        let mut registry = PotentialRegistry::new();
        let lj = LennardJones::new(1.0, 1.0, 2.5).unwrap();
        registry.add_pair(2, 1, Box::new(lj)).unwrap();

        let lj = LennardJones::new(1.0, 1.0, 3.0).unwrap();
        let result = registry.add_pair(1, 2, Box::new(lj));
        assert!(result.is_err());
    }

    #[test]
    fn from_json_parameters() {
        let potential = from_parameters(
            "lennard_jones",
            r#"{"sigma": 1.0, "epsilon": 0.5, "cutoff": 2.5}"#,
        ).unwrap();
        assert_eq!(potential.range(), 2.5);

        let result = from_parameters("not_a_potential", "{}");
        assert!(result.is_err());

        let result = from_parameters("lennard_jones", r#"{"sigma": "oops"}"#);
        assert!(result.is_err());
    }
}
