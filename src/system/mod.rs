use crate::Vector3D;

mod boundary;
pub use self::boundary::Boundary;

mod agents;
pub use self::agents::{AgentManager, AgentSource};

/// Reindex event produced when a particle is removed from a
/// [`ParticleSystem`].
///
/// Removal compacts the particle arrays by moving the last particle into the
/// freed slot. Every structure indexed by particle (neighbor lists, agent
/// tables) must be updated from this event to stay consistent: the entry at
/// `removed` is dropped, and if `moved` is `Some(old_index)`, the entry that
/// lived at `old_index` now lives at `removed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// index of the removed particle, now occupied by the moved particle
    /// (if any)
    pub removed: usize,
    /// previous index of the particle moved into the freed slot, if the
    /// removed particle was not the last one
    pub moved: Option<usize>,
}

/// A `ParticleSystem` owns the simulation topology: the enclosing
/// [`Boundary`] and all per-particle state (species, position, velocity,
/// mass).
///
/// Particles are identified by their index, which is stable between
/// structural changes. Removing a particle compacts the arrays and returns a
/// [`Removal`] event that dependent structures consult to renumber their own
/// slots; there is no listener mechanism, causality is explicit at the call
/// site.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    boundary: Boundary,
    species: Vec<i32>,
    positions: Vec<Vector3D>,
    velocities: Vec<Vector3D>,
    masses: Vec<f64>,
}

impl ParticleSystem {
    /// Create a new empty system inside the given `boundary`
    pub fn new(boundary: Boundary) -> ParticleSystem {
        ParticleSystem {
            boundary: boundary,
            species: Vec::new(),
            positions: Vec::new(),
            velocities: Vec::new(),
            masses: Vec::new(),
        }
    }

    /// Add a particle with the given `species` and `position`, returning its
    /// index. The particle starts at rest with unit mass.
    pub fn add_particle(&mut self, species: i32, position: Vector3D) -> usize {
        self.species.push(species);
        self.positions.push(position);
        self.velocities.push(Vector3D::zero());
        self.masses.push(1.0);
        return self.species.len() - 1;
    }

    /// Remove the particle at `index`, compacting the arrays by moving the
    /// last particle into the freed slot.
    pub fn remove_particle(&mut self, index: usize) -> Removal {
        assert!(index < self.size(), "particle index {} out of bounds", index);

        let last = self.size() - 1;
        self.species.swap_remove(index);
        self.positions.swap_remove(index);
        self.velocities.swap_remove(index);
        self.masses.swap_remove(index);

        Removal {
            removed: index,
            moved: if index == last { None } else { Some(last) },
        }
    }

    /// Get the number of particles in this system
    pub fn size(&self) -> usize {
        self.species.len()
    }

    /// Get the boundary of this system
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Get the species of all particles
    pub fn species(&self) -> &[i32] {
        &self.species
    }

    /// Get the positions of all particles
    pub fn positions(&self) -> &[Vector3D] {
        &self.positions
    }

    /// Get the velocities of all particles
    pub fn velocities(&self) -> &[Vector3D] {
        &self.velocities
    }

    /// Get the masses of all particles
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Set the position of the particle at `index`
    pub fn set_position(&mut self, index: usize, position: Vector3D) {
        self.positions[index] = position;
    }

    /// Displace the particle at `index` by `delta`
    pub fn translate(&mut self, index: usize, delta: Vector3D) {
        self.positions[index] += delta;
    }

    /// Set the velocity of the particle at `index`
    pub fn set_velocity(&mut self, index: usize, velocity: Vector3D) {
        self.velocities[index] = velocity;
    }

    /// Set the mass of the particle at `index`
    pub fn set_mass(&mut self, index: usize, mass: f64) {
        assert!(mass > 0.0, "particle mass must be positive");
        self.masses[index] = mass;
    }
}
