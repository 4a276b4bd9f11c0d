use ndarray::Array3;

use crate::{Boundary, Error, Vector3D};

/// The `CellGrid` partitions the simulation box into rectangular cells at
/// least as large as the interaction range, and sorts particles into them.
///
/// True neighbors of a particle are then guaranteed to live in the particle's
/// own cell or one of the adjacent cells, so pair search scans a fixed
/// stencil instead of every other particle.
#[derive(Debug, Clone)]
pub struct CellGrid {
    boundary: Boundary,
    /// number of cells along each axis
    n_cells: [usize; 3],
    /// actual cell edge lengths, always >= the requested size
    cell_lengths: Vector3D,
    /// particle indices sorted per cell
    cells: Array3<Vec<usize>>,
}

impl CellGrid {
    /// Create a new grid over `boundary` with cells at least `target_size`
    /// on every edge.
    pub fn new(boundary: Boundary, target_size: f64) -> Result<CellGrid, Error> {
        if !(target_size > 0.0) || !target_size.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "cell size must be positive and finite, got {}", target_size
            )));
        }

        let lengths = boundary.lengths();
        let mut n_cells = [1; 3];
        let mut cell_lengths = Vector3D::zero();
        for axis in 0..3 {
            // a box smaller than one cell degenerates to a single cell
            n_cells[axis] = usize::max(1, f64::floor(lengths[axis] / target_size) as usize);
            cell_lengths[axis] = lengths[axis] / n_cells[axis] as f64;
        }

        Ok(CellGrid {
            boundary: boundary,
            n_cells: n_cells,
            cell_lengths: cell_lengths,
            cells: Array3::from_elem(n_cells, Default::default()),
        })
    }

    /// Get the number of cells along each axis
    pub fn n_cells(&self) -> [usize; 3] {
        self.n_cells
    }

    /// Get the actual cell edge lengths
    pub fn cell_lengths(&self) -> Vector3D {
        self.cell_lengths
    }

    /// Get the cell owning the given `position`, in O(1).
    ///
    /// The position is wrapped inside the box first, so a particle that
    /// drifted across a periodic boundary still maps to an in-range cell.
    pub fn cell_index(&self, position: Vector3D) -> [usize; 3] {
        let mut wrapped = position;
        self.boundary.wrap(&mut wrapped);

        let lengths = self.boundary.lengths();
        let mut index = [0; 3];
        for axis in 0..3 {
            // from [-L/2, L/2) to a fractional coordinate in [0, 1)
            let fractional = wrapped[axis] / lengths[axis] + 0.5;
            let cell = f64::floor(fractional * self.n_cells[axis] as f64) as i64;
            // clamp guards against floating point roundoff at the seam, and
            // against positions outside a non-periodic box
            index[axis] = i64::clamp(cell, 0, self.n_cells[axis] as i64 - 1) as usize;
        }
        return index;
    }

    /// Clear the grid and re-assign every particle, in O(N)
    pub fn rebuild(&mut self, positions: &[Vector3D]) {
        for cell in self.cells.iter_mut() {
            cell.clear();
        }
        for (particle, &position) in positions.iter().enumerate() {
            let index = self.cell_index(position);
            self.cells[index].push(particle);
        }
    }

    /// Get the particles currently assigned to the given `cell`
    pub fn particles(&self, cell: [usize; 3]) -> &[usize] {
        &self.cells[cell]
    }

    /// Iterate over all cells and the particles they contain
    pub fn iter(&self) -> impl Iterator<Item = ([usize; 3], &[usize])> + '_ {
        self.cells
            .indexed_iter()
            .map(|((x, y, z), particles)| ([x, y, z], particles.as_slice()))
    }

    /// Get the stencil of cells adjacent to `cell`, including `cell` itself.
    ///
    /// Offsets wrap around periodic axes and are clipped on open axes. With
    /// fewer than three cells along an axis different offsets can land on
    /// the same cell, so the result is deduplicated: scanning the stencil
    /// visits every neighboring cell exactly once.
    pub fn neighbor_cells(&self, cell: [usize; 3]) -> Vec<[usize; 3]> {
        let mut stencil = Vec::with_capacity(27);

        for delta_x in -1..=1_i64 {
            for delta_y in -1..=1_i64 {
                for delta_z in -1..=1_i64 {
                    let mut neighbor = [0; 3];
                    let mut in_range = true;
                    for (axis, delta) in [delta_x, delta_y, delta_z].into_iter().enumerate() {
                        let n = self.n_cells[axis] as i64;
                        let index = cell[axis] as i64 + delta;
                        if self.boundary.is_periodic(axis) {
                            neighbor[axis] = index.rem_euclid(n) as usize;
                        } else if index < 0 || index >= n {
                            in_range = false;
                            break;
                        } else {
                            neighbor[axis] = index as usize;
                        }
                    }

                    if in_range {
                        stencil.push(neighbor);
                    }
                }
            }
        }

        stencil.sort_unstable();
        stencil.dedup();
        return stencil;
    }
}
