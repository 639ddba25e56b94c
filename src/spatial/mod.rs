use glam::DVec2;

use crate::entity::Entity;

/// Smallest allowed cell edge. Keeps `cols`/`rows` finite.
pub const MIN_CELL_SIZE: f64 = 1.0;

/// How cells past the grid edge are addressed during a neighbor query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Cell coordinates wrap modulo `cols`/`rows` (toroidal world).
    Wrap,
    /// Cell coordinates outside the grid are skipped.
    Clamp,
}

/// Uniform bucket grid over `[0, width] x [0, height]`.
///
/// Cell size should be at least the largest interaction radius so the 3x3
/// block around a query cell covers the whole interaction circle.
/// Buckets hold entity indices, not copies. They are cleared each tick but
/// keep their allocation, so a warm grid repopulates without touching the heap.
///
/// Under [`Addressing::Clamp`] cells are square and the last column/row may
/// be ragged. Under [`Addressing::Wrap`] each axis is split into a whole
/// number of equal cells no smaller than the requested size, so cell
/// adjacency across the seam matches distance across it.
pub struct SpatialGrid {
    cell_size: f64,
    /// Actual cell extent per axis.
    cell: DVec2,
    inv_cell: DVec2,
    cols: usize,
    rows: usize,
    addressing: Addressing,
    /// Row-major, `rows * cols` buckets.
    cells: Vec<Vec<u32>>,
}

impl SpatialGrid {
    pub fn new(width: f64, height: f64, cell_size: f64, addressing: Addressing) -> Self {
        let cell_size = floor_cell_size(cell_size);
        let (cols, rows, cell) = layout(width, height, cell_size, addressing);
        let mut cells = Vec::with_capacity(cols * rows);
        for _ in 0..cols * rows {
            // Pre-allocate each bucket to avoid allocs during the first populate.
            cells.push(Vec::with_capacity(8));
        }
        Self {
            cell_size,
            cell,
            inv_cell: cell.recip(),
            cols,
            rows,
            addressing,
            cells,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Requested cell size after flooring.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Width and height of one cell. Equal to `cell_size` on both axes
    /// unless the grid wraps.
    pub fn cell_extent(&self) -> DVec2 {
        self.cell
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// Whether a grid for these dimensions would have a different shape
    /// under this grid's addressing.
    pub fn needs_rebuild(&self, width: f64, height: f64, cell_size: f64) -> bool {
        let cell_size = floor_cell_size(cell_size);
        let (cols, rows, cell) = layout(width, height, cell_size, self.addressing);
        self.cols != cols || self.rows != rows || self.cell_size != cell_size || self.cell != cell
    }

    /// Clear every bucket and re-bucket all entities by current position.
    pub fn populate(&mut self, entities: &[Entity]) {
        for bucket in &mut self.cells {
            bucket.clear(); // Keeps allocation.
        }
        for (i, entity) in entities.iter().enumerate() {
            let (col, row) = self.cell_of(entity.pos);
            self.cells[row * self.cols + col].push(i as u32);
        }
    }

    /// Cell containing `pos`, clamped into the grid so off-world positions
    /// land in the nearest border cell.
    pub fn cell_of(&self, pos: DVec2) -> (usize, usize) {
        let cx = (pos.x * self.inv_cell.x).floor() as i64;
        let cy = (pos.y * self.inv_cell.y).floor() as i64;
        (
            cx.clamp(0, self.cols as i64 - 1) as usize,
            cy.clamp(0, self.rows as i64 - 1) as usize,
        )
    }

    /// Entity indices bucketed in one cell.
    pub fn bucket(&self, col: usize, row: usize) -> &[u32] {
        &self.cells[row * self.cols + col]
    }

    /// Collect every entity in the 3x3 block of cells around `pos`, except
    /// `exclude`, into `out`. `out` is cleared first and keeps its capacity.
    ///
    /// Grids narrower than three cells alias the same cell more than once
    /// under wrapping, so visited cells are deduplicated.
    pub fn neighbors(&self, pos: DVec2, exclude: usize, entities: &[Entity], out: &mut Vec<Entity>) {
        out.clear();
        let (col, row) = self.cell_of(pos);
        let cols = self.cols as i64;
        let rows = self.rows as i64;

        let mut visited = [0usize; 9];
        let mut visit_count = 0;

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let (nc, nr) = match self.addressing {
                    Addressing::Wrap => (
                        (col as i64 + dx).rem_euclid(cols),
                        (row as i64 + dy).rem_euclid(rows),
                    ),
                    Addressing::Clamp => {
                        let nc = col as i64 + dx;
                        let nr = row as i64 + dy;
                        if nc < 0 || nc >= cols || nr < 0 || nr >= rows {
                            continue;
                        }
                        (nc, nr)
                    }
                };
                let cell_idx = nr as usize * self.cols + nc as usize;

                if visited[..visit_count].contains(&cell_idx) {
                    continue;
                }
                visited[visit_count] = cell_idx;
                visit_count += 1;

                for &entity_index in &self.cells[cell_idx] {
                    let ei = entity_index as usize;
                    if ei != exclude {
                        out.push(entities[ei]);
                    }
                }
            }
        }
    }
}

fn floor_cell_size(cell_size: f64) -> f64 {
    // `max` also maps NaN to the floor.
    cell_size.max(MIN_CELL_SIZE)
}

/// Columns, rows and per-axis cell extent.
fn layout(width: f64, height: f64, cell_size: f64, addressing: Addressing) -> (usize, usize, DVec2) {
    let (cols, cell_w) = split_axis(width, cell_size, addressing);
    let (rows, cell_h) = split_axis(height, cell_size, addressing);
    (cols, rows, DVec2::new(cell_w, cell_h))
}

fn split_axis(extent: f64, cell_size: f64, addressing: Addressing) -> (usize, f64) {
    match addressing {
        Addressing::Clamp => {
            let count = (extent / cell_size).ceil() as usize;
            (count.max(1), cell_size)
        }
        Addressing::Wrap => {
            let count = (extent / cell_size).floor() as usize;
            if count <= 1 {
                // One cell covers the whole axis.
                (1, cell_size.max(extent))
            } else {
                (count, extent / count as f64)
            }
        }
    }
}
