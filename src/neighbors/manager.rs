use log::warn;

use super::{CellGrid, NeighborCriterion};
use crate::potentials::PotentialRegistry;
use crate::system::{ParticleSystem, Removal};
use crate::{Error, Vector3D};

/// Validity of the neighbor lists held by a [`NeighborListManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Lists reflect the current particle positions
    Fresh,
    /// Some particle moved too far, or the topology changed: lists must be
    /// rebuilt before the next use
    Stale,
}

/// Up/down neighbor lists for one potential, indexed by particle
#[derive(Debug, Clone, Default)]
struct PotentialLists {
    /// neighbors with a higher particle index
    up: Vec<Vec<usize>>,
    /// neighbors with a lower particle index
    down: Vec<Vec<usize>>,
}

/// The `NeighborListManager` maintains per-particle neighbor lists for every
/// registered potential, rebuilding them through the cell grid when the
/// criteria report them stale.
///
/// Each pair within a potential's list range appears exactly once in the up
/// direction (on the lower-index particle) and once in the down direction
/// (on the higher-index particle): walking up lists alone enumerates every
/// pair once, and walking `up ∪ down` of a single particle enumerates all of
/// that particle's interactions.
///
/// The manager is a two-state machine. Lists are FRESH after a rebuild, and
/// become STALE when any particle moved beyond its criterion's threshold
/// since the last rebuild, or when a particle was added or removed. Cell
/// membership and the lists themselves are only mutated inside
/// [`rebuild`](NeighborListManager::rebuild); everything else is read-only.
pub struct NeighborListManager {
    grid: CellGrid,
    /// one criterion per registered potential, same indexing as the registry
    criteria: Vec<NeighborCriterion>,
    /// one set of lists per registered potential
    lists: Vec<PotentialLists>,
    state: ListState,
    /// how often (in calls to `update_if_needed`) staleness is checked
    update_interval: u32,
    countdown: u32,
    rebuilds: u64,
    safety_exceeded: u64,
}

impl NeighborListManager {
    /// Create a manager for `system`, with one criterion per potential in
    /// `registry` using the given safety `buffer` on top of each potential's
    /// interaction range. Cells are sized from the largest list range.
    ///
    /// The initial state is STALE: the first call to
    /// [`update_if_needed`](NeighborListManager::update_if_needed) builds
    /// the lists.
    pub fn new(
        system: &ParticleSystem,
        registry: &PotentialRegistry,
        buffer: f64,
    ) -> Result<NeighborListManager, Error> {
        if registry.is_empty() {
            return Err(Error::InvalidParameter(
                "can not build neighbor lists without registered potentials".into()
            ));
        }

        let mut criteria = Vec::new();
        for index in 0..registry.len() {
            let range = registry.potential(index).range();
            let mut criterion = NeighborCriterion::new(range, buffer)?;
            // snapshots must track the particles from the start, so that
            // add/remove before the first rebuild stays in sync
            criterion.reset(system.positions());
            criteria.push(criterion);
        }

        let max_list_range = criteria
            .iter()
            .map(|criterion| criterion.list_range())
            .fold(f64::MIN, f64::max);
        let grid = CellGrid::new(system.boundary(), max_list_range)?;

        let size = system.size();
        let lists = (0..registry.len())
            .map(|_| PotentialLists {
                up: vec![Vec::new(); size],
                down: vec![Vec::new(); size],
            })
            .collect();

        Ok(NeighborListManager {
            grid: grid,
            criteria: criteria,
            lists: lists,
            state: ListState::Stale,
            update_interval: 1,
            countdown: 1,
            rebuilds: 0,
            safety_exceeded: 0,
        })
    }

    /// Set how many calls to `update_if_needed` elapse between staleness
    /// checks. The default of 1 checks on every call.
    pub fn set_update_interval(&mut self, interval: u32) -> Result<(), Error> {
        if interval == 0 {
            return Err(Error::InvalidParameter(
                "neighbor update interval must be at least 1".into()
            ));
        }
        self.update_interval = interval;
        self.countdown = interval;
        Ok(())
    }

    /// Get the current state of the lists
    pub fn state(&self) -> ListState {
        self.state
    }

    /// Get the cell grid used for rebuilds
    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Get the criterion associated with the potential at `potential` index
    pub fn criterion(&self, potential: usize) -> &NeighborCriterion {
        &self.criteria[potential]
    }

    /// Get how many rebuilds this manager performed
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Get how many times a particle exceeded the full safety margin before
    /// a scheduled rebuild caught it
    pub fn safety_exceeded_count(&self) -> u64 {
        self.safety_exceeded
    }

    /// Get the up-list (higher-index neighbors) of `particle` for the given
    /// `potential` index
    pub fn up_neighbors(&self, potential: usize, particle: usize) -> &[usize] {
        &self.lists[potential].up[particle]
    }

    /// Get the down-list (lower-index neighbors) of `particle` for the given
    /// `potential` index
    pub fn down_neighbors(&self, potential: usize, particle: usize) -> &[usize] {
        &self.lists[potential].down[particle]
    }

    /// Get the total number of neighbors of `particle`, all potentials
    /// combined. Diagnostic only.
    pub fn neighbor_count(&self, particle: usize) -> usize {
        self.lists
            .iter()
            .map(|lists| lists.up[particle].len() + lists.down[particle].len())
            .sum()
    }

    /// Check the criteria and rebuild the lists if any particle moved too
    /// far since the last rebuild, or if the topology changed. Returns true
    /// if a rebuild happened.
    ///
    /// Staleness is only checked every `update_interval` calls; a STALE
    /// state from a structural change short-circuits the countdown.
    pub fn update_if_needed(
        &mut self,
        system: &ParticleSystem,
        registry: &PotentialRegistry,
    ) -> bool {
        if self.state == ListState::Stale {
            self.rebuild(system, registry);
            return true;
        }

        self.countdown -= 1;
        if self.countdown > 0 {
            return false;
        }
        self.countdown = self.update_interval;

        let boundary = system.boundary();
        let positions = system.positions();
        let species = system.species();

        let mut need_rebuild = false;
        let mut exceeded = 0;
        for (potential, criterion) in self.criteria.iter().enumerate() {
            let (a, b) = registry.species_for(potential);
            for (particle, &position) in positions.iter().enumerate() {
                // only particles this potential applies to can invalidate
                // its lists
                if species[particle] != a && species[particle] != b {
                    continue;
                }
                if criterion.need_update(particle, position, &boundary) {
                    need_rebuild = true;
                    if criterion.exceeded_safety(particle, position, &boundary) {
                        exceeded += 1;
                    }
                }
            }
        }

        if exceeded > 0 {
            // recoverable: the forces of the current step were computed from
            // a list missing at most a grazing interaction, and the rebuild
            // below corrects the lists
            self.safety_exceeded += exceeded;
            warn!(
                "{} particle(s) moved beyond the neighbor list safety margin \
                since the last rebuild, forcing an immediate rebuild",
                exceeded
            );
        }

        if need_rebuild {
            self.rebuild(system, registry);
        }
        return need_rebuild;
    }

    /// Rebuild all neighbor lists from scratch: re-assign every particle to
    /// its cell, then scan each cell's stencil for pairs within each
    /// potential's list range.
    ///
    /// Pairs are enumerated in the up direction only (`j > i`), so each pair
    /// is tested exactly once per rebuild. Cost is O(N) at bounded density.
    #[time_graph::instrument(name = "NeighborListManager::rebuild")]
    pub fn rebuild(&mut self, system: &ParticleSystem, registry: &PotentialRegistry) {
        let size = system.size();
        let positions = system.positions();
        let species = system.species();
        let boundary = system.boundary();

        for lists in &mut self.lists {
            lists.up.resize_with(size, Vec::new);
            lists.down.resize_with(size, Vec::new);
            for list in &mut lists.up {
                list.clear();
            }
            for list in &mut lists.down {
                list.clear();
            }
        }

        self.grid.rebuild(positions);

        let grid = &self.grid;
        let criteria = &self.criteria;
        let lists = &mut self.lists;
        for (cell, cell_particles) in grid.iter() {
            for neighbor_cell in grid.neighbor_cells(cell) {
                for &i in cell_particles {
                    for &j in grid.particles(neighbor_cell) {
                        // up direction only: every pair is tested once
                        if j <= i {
                            continue;
                        }

                        let potential = match registry.index_for(species[i], species[j]) {
                            Some(potential) => potential,
                            None => continue,
                        };

                        let r2 = boundary.distance2(positions[i], positions[j]);
                        if criteria[potential].in_range(r2) {
                            if r2 < 1e-6 {
                                warn!(
                                    "particles {} and {} are very close to one another ({})",
                                    i, j, r2.sqrt()
                                );
                            }
                            lists[potential].up[i].push(j);
                            lists[potential].down[j].push(i);
                        }
                    }
                }
            }
        }

        for criterion in &mut self.criteria {
            criterion.reset(positions);
        }

        self.state = ListState::Fresh;
        self.countdown = self.update_interval;
        self.rebuilds += 1;
    }

    /// Grow the list slots and criteria snapshots for a particle just added
    /// to the system at `position`. The lists become STALE until the next
    /// rebuild.
    pub fn on_added(&mut self, position: Vector3D) {
        for criterion in &mut self.criteria {
            criterion.on_added(position);
        }
        for lists in &mut self.lists {
            lists.up.push(Vec::new());
            lists.down.push(Vec::new());
        }
        self.state = ListState::Stale;
    }

    /// Release the list slots and criteria snapshots of a removed particle,
    /// mirroring the swap-remove compaction of the particle arrays. The
    /// lists become STALE until the next rebuild.
    pub fn on_removed(&mut self, removal: Removal) {
        for criterion in &mut self.criteria {
            criterion.on_removed(removal);
        }
        for lists in &mut self.lists {
            assert!(
                removal.removed < lists.up.len(),
                "neighbor list slots out of sync with the particle system"
            );
            lists.up.swap_remove(removal.removed);
            lists.down.swap_remove(removal.removed);
        }
        self.state = ListState::Stale;
    }
}
