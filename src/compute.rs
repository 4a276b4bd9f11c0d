//! Energy, force and virial summation over neighbor lists.
//!
//! All functions here walk up-lists only: every pair contributes exactly
//! once, and the down lists are never re-walked. The passes over particles
//! are data-parallel; forces accumulate into per-thread partial registers
//! merged after the parallel region, never into shared mutable state.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::neighbors::NeighborListManager;
use crate::potentials::PotentialRegistry;
use crate::system::ParticleSystem;
use crate::Vector3D;

/// Sum the potential energy of all pairs in the neighbor lists, including
/// the long-range tail corrections of the registered potentials.
///
/// The lists must be fresh; pairs that drifted beyond a potential's cutoff
/// but remain within the list buffer contribute zero.
#[time_graph::instrument(name = "compute::energy")]
pub fn energy(
    system: &ParticleSystem,
    registry: &PotentialRegistry,
    manager: &NeighborListManager,
) -> f64 {
    let positions = system.positions();
    let boundary = system.boundary();

    let pairs: f64 = (0..system.size())
        .into_par_iter()
        .map(|i| {
            let mut local = 0.0;
            for potential_i in 0..registry.len() {
                let potential = registry.potential(potential_i);
                for &j in manager.up_neighbors(potential_i, i) {
                    let r2 = boundary.distance2(positions[i], positions[j]);
                    local += potential.energy(r2);
                }
            }
            return local;
        })
        .sum();

    return pairs + tail_corrections(system, registry);
}

/// Accumulate the forces from all pairs in the neighbor lists into `forces`,
/// overwriting its previous content.
#[time_graph::instrument(name = "compute::forces")]
pub fn forces(
    system: &ParticleSystem,
    registry: &PotentialRegistry,
    manager: &NeighborListManager,
    forces: &mut [Vector3D],
) {
    let size = system.size();
    assert_eq!(forces.len(), size, "force register size does not match the system");

    let positions = system.positions();
    let boundary = system.boundary();

    let merged = (0..size)
        .into_par_iter()
        .fold(
            || vec![Vector3D::zero(); size],
            |mut partial, i| {
                for potential_i in 0..registry.len() {
                    let potential = registry.potential(potential_i);
                    for &j in manager.up_neighbors(potential_i, i) {
                        let rij = boundary.displacement(positions[i], positions[j]);
                        let force = potential.force_factor(rij.norm2()) * rij;
                        partial[j] += force;
                        partial[i] -= force;
                    }
                }
                return partial;
            },
        )
        .reduce(
            || vec![Vector3D::zero(); size],
            |mut left, right| {
                for (left, right) in left.iter_mut().zip(right) {
                    *left += right;
                }
                return left;
            },
        );

    forces.copy_from_slice(&merged);
}

/// Sum the pair virial `w = -r du/dr` of all pairs in the neighbor lists
#[time_graph::instrument(name = "compute::virial")]
pub fn virial(
    system: &ParticleSystem,
    registry: &PotentialRegistry,
    manager: &NeighborListManager,
) -> f64 {
    let positions = system.positions();
    let boundary = system.boundary();

    (0..system.size())
        .into_par_iter()
        .map(|i| {
            let mut local = 0.0;
            for potential_i in 0..registry.len() {
                let potential = registry.potential(potential_i);
                for &j in manager.up_neighbors(potential_i, i) {
                    let r2 = boundary.distance2(positions[i], positions[j]);
                    local += potential.force_factor(r2) * r2;
                }
            }
            return local;
        })
        .sum()
}

/// Sum the interaction energy of a single `particle` with all of its
/// neighbors, walking both its up and down lists.
///
/// This is the quantity a Monte Carlo displacement move needs to evaluate an
/// energy delta.
pub fn particle_energy(
    system: &ParticleSystem,
    registry: &PotentialRegistry,
    manager: &NeighborListManager,
    particle: usize,
) -> f64 {
    let positions = system.positions();
    let boundary = system.boundary();

    let mut energy = 0.0;
    for potential_i in 0..registry.len() {
        let potential = registry.potential(potential_i);
        let neighbors = manager
            .up_neighbors(potential_i, particle)
            .iter()
            .chain(manager.down_neighbors(potential_i, particle));
        for &j in neighbors {
            let r2 = boundary.distance2(positions[particle], positions[j]);
            energy += potential.energy(r2);
        }
    }
    return energy;
}

/// Sum the potential energy of all pairs by brute-force enumeration,
/// without neighbor lists. O(N^2): for small systems and initial setup.
pub fn energy_all_pairs(system: &ParticleSystem, registry: &PotentialRegistry) -> f64 {
    let positions = system.positions();
    let species = system.species();
    let boundary = system.boundary();

    let mut energy = 0.0;
    for i in 0..system.size() {
        for j in (i + 1)..system.size() {
            if let Some(potential_i) = registry.index_for(species[i], species[j]) {
                let r2 = boundary.distance2(positions[i], positions[j]);
                energy += registry.potential(potential_i).energy(r2);
            }
        }
    }
    return energy + tail_corrections(system, registry);
}

/// Accumulate the forces of all pairs by brute-force enumeration, without
/// neighbor lists. O(N^2): for small systems and initial setup.
pub fn forces_all_pairs(
    system: &ParticleSystem,
    registry: &PotentialRegistry,
    forces: &mut [Vector3D],
) {
    assert_eq!(forces.len(), system.size(), "force register size does not match the system");

    let positions = system.positions();
    let species = system.species();
    let boundary = system.boundary();

    for force in forces.iter_mut() {
        *force = Vector3D::zero();
    }

    for i in 0..system.size() {
        for j in (i + 1)..system.size() {
            if let Some(potential_i) = registry.index_for(species[i], species[j]) {
                let rij = boundary.displacement(positions[i], positions[j]);
                let force = registry.potential(potential_i).force_factor(rij.norm2()) * rij;
                forces[j] += force;
                forces[i] -= force;
            }
        }
    }
}

/// Sum the long-range tail corrections of all registered potentials, from
/// the current per-species particle counts and box volume.
pub fn tail_corrections(system: &ParticleSystem, registry: &PotentialRegistry) -> f64 {
    let mut counts = BTreeMap::new();
    for &species in system.species() {
        *counts.entry(species).or_insert(0_usize) += 1;
    }

    let volume = system.boundary().volume();
    let mut correction = 0.0;
    for potential_i in 0..registry.len() {
        let (a, b) = registry.species_for(potential_i);
        let n_a = counts.get(&a).copied().unwrap_or(0) as f64;
        let n_b = counts.get(&b).copied().unwrap_or(0) as f64;
        let n_pairs = if a == b { n_a * (n_a - 1.0) / 2.0 } else { n_a * n_b };
        if n_pairs > 0.0 {
            correction += registry.potential(potential_i).tail_correction(volume, n_pairs);
        }
    }
    return correction;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_relative_eq, assert_ulps_eq};

    use crate::potentials::{LennardJones, PairPotential};
    use crate::Boundary;

    fn lj_dimer(distance: f64) -> (ParticleSystem, PotentialRegistry, NeighborListManager) {
        let mut system = ParticleSystem::new(Boundary::cubic(10.0).unwrap());
        system.add_particle(1, Vector3D::zero());
        system.add_particle(1, Vector3D::new(distance, 0.0, 0.0));

        let mut registry = PotentialRegistry::new();
        let lj = LennardJones::shifted(1.0, 1.0, 2.5).unwrap();
        registry.add_pair(1, 1, Box::new(lj)).unwrap();

        let mut manager = NeighborListManager::new(&system, &registry, 0.5).unwrap();
        manager.update_if_needed(&system, &registry);
        return (system, registry, manager);
    }

    #[test]
    fn dimer_energy() {
        let (system, registry, manager) = lj_dimer(1.2);

        let lj = LennardJones::shifted(1.0, 1.0, 2.5).unwrap();
        let expected = lj.energy(1.2 * 1.2);

        assert_ulps_eq!(energy(&system, &registry, &manager), expected);
        assert_ulps_eq!(energy_all_pairs(&system, &registry), expected);

        // each particle sees the full pair energy
        assert_ulps_eq!(particle_energy(&system, &registry, &manager, 0), expected);
        assert_ulps_eq!(particle_energy(&system, &registry, &manager, 1), expected);
    }

    #[test]
    fn dimer_forces() {
        let (system, registry, manager) = lj_dimer(1.2);

        let mut computed = vec![Vector3D::zero(); 2];
        forces(&system, &registry, &manager, &mut computed);

        // action equals reaction
        assert_ulps_eq!(computed[0], -computed[1]);

        // attractive at r > 2^(1/6) sigma: particle 0 is pulled towards +x
        assert!(computed[0][0] > 0.0);
        assert_eq!(computed[0][1], 0.0);
        assert_eq!(computed[0][2], 0.0);

        let mut brute_force = vec![Vector3D::zero(); 2];
        forces_all_pairs(&system, &registry, &mut brute_force);
        assert_ulps_eq!(computed[0], brute_force[0]);
        assert_ulps_eq!(computed[1], brute_force[1]);
    }

    #[test]
    fn forces_match_numerical_gradient() {
        let (mut system, registry, mut manager) = lj_dimer(1.2);

        let mut computed = vec![Vector3D::zero(); 2];
        forces(&system, &registry, &manager, &mut computed);

        // central difference along x for particle 1
        let step = 1e-6;
        system.set_position(1, Vector3D::new(1.2 + step, 0.0, 0.0));
        manager.rebuild(&system, &registry);
        let above = energy(&system, &registry, &manager);

        system.set_position(1, Vector3D::new(1.2 - step, 0.0, 0.0));
        manager.rebuild(&system, &registry);
        let below = energy(&system, &registry, &manager);

        let gradient = (above - below) / (2.0 * step);
        assert_relative_eq!(computed[1][0], -gradient, max_relative = 1e-6);
    }

    #[test]
    fn dimer_virial() {
        let (system, registry, manager) = lj_dimer(1.2);

        let lj = LennardJones::shifted(1.0, 1.0, 2.5).unwrap();
        let r2 = 1.2 * 1.2;
        assert_ulps_eq!(virial(&system, &registry, &manager), lj.force_factor(r2) * r2);
    }

    #[test]
    fn tail_correction_is_added_once() {
        let mut system = ParticleSystem::new(Boundary::cubic(10.0).unwrap());
        system.add_particle(1, Vector3D::zero());
        system.add_particle(1, Vector3D::new(1.2, 0.0, 0.0));

        // unshifted LJ has an analytic tail
        let mut registry = PotentialRegistry::new();
        let lj = LennardJones::new(1.0, 1.0, 2.5).unwrap();
        registry.add_pair(1, 1, Box::new(lj)).unwrap();

        let mut manager = NeighborListManager::new(&system, &registry, 0.5).unwrap();
        manager.update_if_needed(&system, &registry);

        let lj = LennardJones::new(1.0, 1.0, 2.5).unwrap();
        let expected_tail = lj.tail_correction(1000.0, 1.0);
        assert!(expected_tail != 0.0);

        let expected = lj.energy(1.2 * 1.2) + expected_tail;
        assert_ulps_eq!(energy(&system, &registry, &manager), expected);
    }

    #[test]
    fn pairs_across_species() {
        let mut system = ParticleSystem::new(Boundary::cubic(10.0).unwrap());
        system.add_particle(1, Vector3D::zero());
        system.add_particle(2, Vector3D::new(1.1, 0.0, 0.0));
        system.add_particle(3, Vector3D::new(0.0, 1.1, 0.0));

        // only the 1-2 pair interacts; species 3 has no potential
        let mut registry = PotentialRegistry::new();
        let lj = LennardJones::shifted(1.0, 1.0, 2.5).unwrap();
        registry.add_pair(1, 2, Box::new(lj)).unwrap();

        let mut manager = NeighborListManager::new(&system, &registry, 0.5).unwrap();
        manager.update_if_needed(&system, &registry);

        let lj = LennardJones::shifted(1.0, 1.0, 2.5).unwrap();
        let expected = lj.energy(1.1 * 1.1);
        assert_ulps_eq!(energy(&system, &registry, &manager), expected);
        assert_eq!(particle_energy(&system, &registry, &manager, 2), 0.0);
    }
}
