use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use atomica::neighbors::NeighborListManager;
use atomica::potentials::{LennardJones, PotentialRegistry};
use atomica::{Boundary, ParticleSystem, Vector3D};

fn random_system(n: usize, box_length: f64, seed: u64) -> ParticleSystem {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut system = ParticleSystem::new(Boundary::cubic(box_length).unwrap());
    for _ in 0..n {
        let position = Vector3D::new(
            rng.gen_range(-box_length / 2.0..box_length / 2.0),
            rng.gen_range(-box_length / 2.0..box_length / 2.0),
            rng.gen_range(-box_length / 2.0..box_length / 2.0),
        );
        system.add_particle(1, position);
    }
    return system;
}

fn lj_registry(cutoff: f64) -> PotentialRegistry {
    let mut registry = PotentialRegistry::new();
    let lj = LennardJones::shifted(1.0, 1.0, cutoff).unwrap();
    registry.add_pair(1, 1, Box::new(lj)).unwrap();
    return registry;
}

/// All pairs within the list range, found by an O(N^2) scan
fn brute_force_pairs(system: &ParticleSystem, list_range: f64) -> Vec<(usize, usize)> {
    let positions = system.positions();
    let boundary = system.boundary();

    let mut pairs = Vec::new();
    for i in 0..system.size() {
        for j in (i + 1)..system.size() {
            if boundary.distance2(positions[i], positions[j]) < list_range * list_range {
                pairs.push((i, j));
            }
        }
    }
    return pairs;
}

#[test]
fn cell_rebuild_matches_brute_force() {
    let system = random_system(1000, 10.0, 0xdeadbeef);
    let registry = lj_registry(2.0);

    let mut manager = NeighborListManager::new(&system, &registry, 0.5).unwrap();
    manager.update_if_needed(&system, &registry);

    let expected = brute_force_pairs(&system, manager.criterion(0).list_range());
    assert!(!expected.is_empty());

    let mut actual = Vec::new();
    for i in 0..system.size() {
        for &j in manager.up_neighbors(0, i) {
            actual.push((i, j));
        }
    }
    actual.sort_unstable();

    assert_eq!(actual, expected);
}

#[test]
fn no_pair_is_counted_twice() {
    let system = random_system(500, 8.0, 42);
    let registry = lj_registry(2.0);

    let mut manager = NeighborListManager::new(&system, &registry, 0.5).unwrap();
    manager.update_if_needed(&system, &registry);

    for i in 0..system.size() {
        for &j in manager.up_neighbors(0, i) {
            // up entries always point to a higher index, and are mirrored in
            // exactly one down list
            assert!(j > i);
            let mirrored = manager.down_neighbors(0, j).iter().filter(|&&k| k == i).count();
            assert_eq!(mirrored, 1);
            // never duplicated in the other direction
            assert!(!manager.up_neighbors(0, j).contains(&i));
        }
    }
}

#[test]
fn rebuild_is_idempotent_at_scale() {
    let system = random_system(300, 6.0, 7);
    let registry = lj_registry(1.5);

    let mut manager = NeighborListManager::new(&system, &registry, 0.3).unwrap();
    manager.rebuild(&system, &registry);

    let first: Vec<Vec<usize>> = (0..system.size())
        .map(|i| manager.up_neighbors(0, i).to_vec())
        .collect();

    manager.rebuild(&system, &registry);
    for i in 0..system.size() {
        assert_eq!(manager.up_neighbors(0, i), first[i].as_slice());
    }
}

#[test]
fn neighbors_found_across_periodic_boundaries() {
    let mut system = ParticleSystem::new(Boundary::cubic(10.0).unwrap());
    system.add_particle(1, Vector3D::new(4.9, 0.0, 0.0));
    system.add_particle(1, Vector3D::new(-4.9, 0.0, 0.0));
    // this one drifted out of the box entirely; its image sits at -4.8
    system.add_particle(1, Vector3D::new(5.2, 0.0, 0.0));

    let registry = lj_registry(2.0);
    let mut manager = NeighborListManager::new(&system, &registry, 0.5).unwrap();
    manager.update_if_needed(&system, &registry);

    // the pair 0-1 spans the boundary at distance 0.2, and the wrapped
    // particle 2 is at 0.1 from particle 1 and 0.3 from particle 0
    assert_eq!(manager.up_neighbors(0, 0), &[1, 2]);
    assert_eq!(manager.up_neighbors(0, 1), &[2]);
    assert_eq!(manager.neighbor_count(2), 2);
}

#[test]
fn two_particle_scenario() {
    // 10 x 10 x 10 periodic box, pair at distance 1.0, interaction range 2.0
    let mut system = ParticleSystem::new(Boundary::cubic(10.0).unwrap());
    system.add_particle(1, Vector3D::new(0.0, 0.0, 0.0));
    system.add_particle(1, Vector3D::new(1.0, 0.0, 0.0));
    let registry = lj_registry(2.0);

    let mut manager = NeighborListManager::new(&system, &registry, 0.1).unwrap();
    manager.update_if_needed(&system, &registry);
    assert_eq!(manager.up_neighbors(0, 0), &[1]);
    assert_eq!(manager.down_neighbors(0, 1), &[0]);

    // moving by 0.05 stays within half the 0.1 buffer: no rebuild
    for direction in 0..3 {
        let mut delta = Vector3D::zero();
        delta[direction] = 0.05;
        system.set_position(0, delta);
        assert!(!manager.update_if_needed(&system, &registry));
        assert_eq!(manager.safety_exceeded_count(), 0);
    }

    // moving by 3.0 blows through the full safety margin
    system.set_position(0, Vector3D::new(3.0, 0.0, 0.0));
    assert!(manager.update_if_needed(&system, &registry));
    assert_eq!(manager.safety_exceeded_count(), 1);
}

#[test]
fn removed_slots_are_not_inherited() {
    let mut system = ParticleSystem::new(Boundary::cubic(10.0).unwrap());
    system.add_particle(1, Vector3D::new(0.0, 0.0, 0.0));
    system.add_particle(1, Vector3D::new(1.0, 0.0, 0.0));
    system.add_particle(1, Vector3D::new(0.0, 1.0, 0.0));
    let registry = lj_registry(2.0);

    let mut manager = NeighborListManager::new(&system, &registry, 0.5).unwrap();
    manager.update_if_needed(&system, &registry);
    assert_eq!(manager.neighbor_count(0), 2);

    let removal = system.remove_particle(1);
    manager.on_removed(removal);
    manager.update_if_needed(&system, &registry);

    // re-add a particle far away from the others: its recycled slot must
    // start empty
    let index = system.add_particle(1, Vector3D::new(-4.0, -4.0, -4.0));
    manager.on_added(system.positions()[index]);
    manager.update_if_needed(&system, &registry);

    assert_eq!(manager.neighbor_count(index), 0);
    assert_eq!(manager.neighbor_count(0), 1);
    assert_eq!(manager.neighbor_count(1), 1);
}
