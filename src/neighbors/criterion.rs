use crate::{Boundary, Error, Removal, Vector3D};

/// A `NeighborCriterion` decides which pairs belong in a neighbor list, and
/// when accumulated particle motion has made the list stale.
///
/// Pairs are accepted up to `list_range = interaction_range + buffer`; the
/// buffer is the safety margin that lets the lists stay valid for several
/// steps of motion. Each criterion snapshots every particle's position when
/// the lists are rebuilt and compares minimum-image displacement from that
/// snapshot against two thresholds:
///
/// - half the buffer: the lists *might* be missing an interaction soon, a
///   rebuild is needed (two particles moving towards each other each
///   contribute up to half the margin);
/// - the full buffer: a single particle moved so far that the lists may
///   *already* be wrong. Recoverable, but worth reporting.
///
/// One criterion exists per registered potential, with independently tunable
/// range and buffer.
#[derive(Debug, Clone)]
pub struct NeighborCriterion {
    interaction_range: f64,
    list_range: f64,
    /// positions snapshot from the last reset
    reference: Vec<Vector3D>,
}

impl NeighborCriterion {
    /// Create a criterion for a potential with the given `interaction_range`,
    /// accepting pairs up to `interaction_range + buffer`.
    pub fn new(interaction_range: f64, buffer: f64) -> Result<NeighborCriterion, Error> {
        if !(interaction_range > 0.0) || !interaction_range.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "interaction range must be positive and finite, got {}", interaction_range
            )));
        }
        if !(buffer > 0.0) || !buffer.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "buffer must be positive and finite, got {}", buffer
            )));
        }

        Ok(NeighborCriterion {
            interaction_range: interaction_range,
            list_range: interaction_range + buffer,
            reference: Vec::new(),
        })
    }

    /// Get the interaction range of the associated potential
    pub fn interaction_range(&self) -> f64 {
        self.interaction_range
    }

    /// Get the range below which pairs are kept in the neighbor list
    pub fn list_range(&self) -> f64 {
        self.list_range
    }

    /// Get the safety margin between list range and interaction range
    pub fn buffer(&self) -> f64 {
        self.list_range - self.interaction_range
    }

    /// Check whether a pair at squared distance `r2` belongs in the list
    #[inline]
    pub fn in_range(&self, r2: f64) -> bool {
        r2 < self.list_range * self.list_range
    }

    /// Snapshot all current `positions` as the new reference point,
    /// restoring `need_update` to false for every particle.
    pub fn reset(&mut self, positions: &[Vector3D]) {
        self.reference.clear();
        self.reference.extend_from_slice(positions);
    }

    /// Record a snapshot for a particle just appended to the system
    pub fn on_added(&mut self, position: Vector3D) {
        self.reference.push(position);
    }

    /// Drop the snapshot of a removed particle, mirroring the swap-remove
    /// compaction of the particle arrays.
    pub fn on_removed(&mut self, removal: Removal) {
        assert!(
            removal.removed < self.reference.len(),
            "criterion snapshots out of sync with the particle system"
        );
        self.reference.swap_remove(removal.removed);
    }

    /// Check whether the particle at `index` moved far enough since the last
    /// reset that the neighbor list might be missing an interaction.
    pub fn need_update(&self, index: usize, position: Vector3D, boundary: &Boundary) -> bool {
        let threshold = 0.5 * self.buffer();
        return self.displacement2(index, position, boundary) > threshold * threshold;
    }

    /// Check whether the particle at `index` moved beyond the full safety
    /// margin, meaning the list may already be wrong.
    pub fn exceeded_safety(&self, index: usize, position: Vector3D, boundary: &Boundary) -> bool {
        let buffer = self.buffer();
        return self.displacement2(index, position, boundary) > buffer * buffer;
    }

    #[inline]
    fn displacement2(&self, index: usize, position: Vector3D, boundary: &Boundary) -> f64 {
        boundary.distance2(self.reference[index], position)
    }
}
