//! Spatial acceleration for pairwise interactions: cell-based partitioning
//! of the simulation box, per-potential staleness criteria, and the neighbor
//! list manager tying both together.

mod cell_grid;
pub use self::cell_grid::CellGrid;

mod criterion;
pub use self::criterion::NeighborCriterion;

mod manager;
pub use self::manager::{NeighborListManager, ListState};
