//! Top-level glue: a [`Simulation`] wires the particle system, potential
//! registry, neighbor list manager and force registers together, and the
//! integrators in [`md`] and [`mc`] drive it.

use crate::compute;
use crate::neighbors::NeighborListManager;
use crate::potentials::PotentialRegistry;
use crate::system::{AgentManager, AgentSource, ParticleSystem, Removal};
use crate::{Error, Vector3D};

mod md;
pub use self::md::VelocityVerlet;

mod mc;
pub use self::mc::TranslateMove;

/// Force register attached to every particle
struct ForceSource;

impl AgentSource<Vector3D> for ForceSource {
    fn make_agent(&mut self, _index: usize) -> Vector3D {
        Vector3D::zero()
    }
}

/// A `Simulation` is the explicit context object tying together all the
/// state a simulation run needs.
///
/// Structural changes (adding and removing particles) go through the
/// simulation so that the neighbor list slots and the per-particle agents
/// follow the topology in a single place; bypassing it leaves the dependent
/// tables out of sync, which the lifecycle assertions catch.
pub struct Simulation {
    system: ParticleSystem,
    registry: PotentialRegistry,
    manager: NeighborListManager,
    forces: AgentManager<Vector3D>,
}

impl Simulation {
    /// Create a simulation over `system` with the interactions in
    /// `registry`, using the given neighbor list `buffer`.
    pub fn new(
        system: ParticleSystem,
        registry: PotentialRegistry,
        buffer: f64,
    ) -> Result<Simulation, Error> {
        let manager = NeighborListManager::new(&system, &registry, buffer)?;
        let forces = AgentManager::new(ForceSource, system.size());

        Ok(Simulation {
            system: system,
            registry: registry,
            manager: manager,
            forces: forces,
        })
    }

    /// Get the particle system
    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    /// Get the potential registry
    pub fn registry(&self) -> &PotentialRegistry {
        &self.registry
    }

    /// Get the neighbor list manager
    pub fn manager(&self) -> &NeighborListManager {
        &self.manager
    }

    /// Get the neighbor list manager, mutably
    pub fn manager_mut(&mut self) -> &mut NeighborListManager {
        &mut self.manager
    }

    /// Get the forces computed by the last call to
    /// [`compute_forces`](Simulation::compute_forces)
    pub fn forces(&self) -> &[Vector3D] {
        self.forces.agents()
    }

    /// Add a particle, growing the neighbor list slots and force register
    pub fn add_particle(&mut self, species: i32, position: Vector3D) -> usize {
        let index = self.system.add_particle(species, position);
        self.manager.on_added(position);
        self.forces.on_added(index);
        return index;
    }

    /// Remove a particle, releasing its neighbor list slot and force
    /// register through the reindex event
    pub fn remove_particle(&mut self, index: usize) -> Removal {
        let removal = self.system.remove_particle(index);
        self.manager.on_removed(removal);
        self.forces.on_removed(removal);
        return removal;
    }

    /// Set the position of the particle at `index`
    pub fn set_position(&mut self, index: usize, position: Vector3D) {
        self.system.set_position(index, position);
    }

    /// Displace the particle at `index` by `delta`
    pub fn translate(&mut self, index: usize, delta: Vector3D) {
        self.system.translate(index, delta);
    }

    /// Set the velocity of the particle at `index`
    pub fn set_velocity(&mut self, index: usize, velocity: Vector3D) {
        self.system.set_velocity(index, velocity);
    }

    /// Set the mass of the particle at `index`
    pub fn set_mass(&mut self, index: usize, mass: f64) {
        self.system.set_mass(index, mass);
    }

    /// Rebuild the neighbor lists if stale, returning true if a rebuild
    /// happened. Integrators call this once per step.
    pub fn update_lists_if_needed(&mut self) -> bool {
        self.manager.update_if_needed(&self.system, &self.registry)
    }

    /// Compute the total potential energy, refreshing the neighbor lists
    /// first if needed
    pub fn compute_energy(&mut self) -> f64 {
        self.update_lists_if_needed();
        compute::energy(&self.system, &self.registry, &self.manager)
    }

    /// Compute the forces on all particles, refreshing the neighbor lists
    /// first if needed, and store them in the per-particle force registers.
    pub fn compute_forces(&mut self) -> &[Vector3D] {
        self.update_lists_if_needed();
        compute::forces(
            &self.system,
            &self.registry,
            &self.manager,
            self.forces.agents_mut(),
        );
        return self.forces.agents();
    }

    /// Compute the total virial, refreshing the neighbor lists first if
    /// needed
    pub fn compute_virial(&mut self) -> f64 {
        self.update_lists_if_needed();
        compute::virial(&self.system, &self.registry, &self.manager)
    }

    /// Get the interaction energy of a single particle with all of its
    /// current neighbors. The neighbor lists must be fresh.
    pub fn particle_energy(&self, particle: usize) -> f64 {
        compute::particle_energy(&self.system, &self.registry, &self.manager, particle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potentials::LennardJones;
    use crate::Boundary;

    pub(crate) fn lj_dimer(distance: f64) -> Simulation {
        let mut system = ParticleSystem::new(Boundary::cubic(10.0).unwrap());
        system.add_particle(1, Vector3D::zero());
        system.add_particle(1, Vector3D::new(distance, 0.0, 0.0));

        let mut registry = PotentialRegistry::new();
        let lj = LennardJones::shifted(1.0, 1.0, 2.5).unwrap();
        registry.add_pair(1, 1, Box::new(lj)).unwrap();

        return Simulation::new(system, registry, 0.5).unwrap();
    }

    #[test]
    fn lifecycle_keeps_tables_in_sync() {
        let mut simulation = lj_dimer(1.2);
        simulation.compute_forces();
        assert_eq!(simulation.forces().len(), 2);

        let index = simulation.add_particle(1, Vector3D::new(0.0, 1.2, 0.0));
        assert_eq!(index, 2);
        assert_eq!(simulation.forces().len(), 3);

        simulation.remove_particle(0);
        assert_eq!(simulation.forces().len(), 2);
        assert_eq!(simulation.system().size(), 2);

        // lists were invalidated by the structural change and rebuilt here
        assert!(simulation.update_lists_if_needed());
    }

    #[test]
    fn energy_entry_points_agree() {
        let mut simulation = lj_dimer(1.2);
        let total = simulation.compute_energy();

        let lj = LennardJones::shifted(1.0, 1.0, 2.5).unwrap();
        use crate::potentials::PairPotential;
        approx::assert_ulps_eq!(total, lj.energy(1.2 * 1.2));
        approx::assert_ulps_eq!(simulation.particle_energy(0), total);
    }
}
