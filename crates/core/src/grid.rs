//! Uniform-cell spatial grid for neighbour queries.
//!
//! Particles are bucketed by `(floor(x / cell_size), floor(y / cell_size))`.
//! Cell coordinates are packed into a single `u64` key; buckets are runs of a
//! key-sorted index array, so a rebuild is one sort over reused buffers and a
//! lookup is a binary search. Iteration order is fully determined by the
//! particle positions, which keeps collision resolution reproducible.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// Default cell edge length, in surface units.
pub const DEFAULT_CELL_SIZE: f64 = 50.0;

/// Offsets of a cell and its 8 neighbours.
const NEIGHBOURHOOD: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// How candidate pairs are enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairPolicy {
    /// Every unordered pair in adjacent cells is produced exactly once.
    #[default]
    Unique,
    /// Every cell is scanned against all 9 cells of its neighbourhood and
    /// every ordered pair is produced, so each unordered pair appears twice.
    Revisit,
}

/// Packs signed cell coordinates into one key.
pub fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u32 as u64) << 32) | cy as u32 as u64
}

#[derive(Debug, Clone)]
struct Cell {
    key: u64,
    coords: (i32, i32),
    members: Range<usize>,
}

/// Spatial hash grid, rebuilt from scratch each frame.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    keyed: Vec<(u64, usize)>,
    indices: Vec<usize>,
    cells: Vec<Cell>,
    particle_cells: Vec<(i32, i32)>,
}

impl SpatialGrid {
    /// Creates an empty grid. Non-positive or non-finite sizes fall back to
    /// [`DEFAULT_CELL_SIZE`].
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: sanitize_cell_size(cell_size),
            keyed: Vec::new(),
            indices: Vec::new(),
            cells: Vec::new(),
            particle_cells: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of particles bucketed by the last rebuild.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Cell coordinates containing `(x, y)`.
    pub fn cell_of(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Discards the previous contents and buckets `particles` by position.
    ///
    /// Buffers are reused across calls. Each particle lands in exactly one
    /// bucket; within a bucket indices are ascending.
    pub fn rebuild(&mut self, particles: &[Particle], cell_size: f64) {
        self.cell_size = sanitize_cell_size(cell_size);
        self.keyed.clear();
        self.indices.clear();
        self.cells.clear();
        self.particle_cells.clear();

        for (index, p) in particles.iter().enumerate() {
            let coords = self.cell_of(p.position.x, p.position.y);
            self.particle_cells.push(coords);
            self.keyed.push((cell_key(coords.0, coords.1), index));
        }
        self.keyed.sort_unstable();

        let mut start = 0;
        while start < self.keyed.len() {
            let key = self.keyed[start].0;
            let coords = self.particle_cells[self.keyed[start].1];
            let end = start
                + self.keyed[start..]
                    .iter()
                    .take_while(|(k, _)| *k == key)
                    .count();
            self.cells.push(Cell {
                key,
                coords,
                members: start..end,
            });
            start = end;
        }
        self.indices.extend(self.keyed.iter().map(|&(_, index)| index));
    }

    /// Particle indices in cell `(cx, cy)`, ascending.
    pub fn bucket(&self, cx: i32, cy: i32) -> &[usize] {
        self.find(cell_key(cx, cy))
            .map(|cell| &self.indices[cell.members.clone()])
            .unwrap_or(&[])
    }

    /// The cell particle `index` was placed in at the last rebuild.
    pub fn cell_of_particle(&self, index: usize) -> Option<(i32, i32)> {
        self.particle_cells.get(index).copied()
    }

    /// Indices of particles in the same or the 8 adjacent cells as
    /// particle `index`, excluding `index` itself.
    pub fn neighbors_of(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let cells = self
            .cell_of_particle(index)
            .map(|(cx, cy)| neighbourhood(cx, cy))
            .into_iter()
            .flatten();
        cells
            .flat_map(move |(nx, ny)| self.bucket(nx, ny).iter().copied())
            .filter(move |&other| other != index)
    }

    /// Calls `visit(i, j)` for every candidate pair under `policy`.
    ///
    /// Candidates are particles whose cells are equal or adjacent (Chebyshev
    /// distance of at most one cell). The visit order is deterministic.
    pub fn for_each_candidate_pair(&self, policy: PairPolicy, mut visit: impl FnMut(usize, usize)) {
        for cell in &self.cells {
            let own = &self.indices[cell.members.clone()];
            for (nx, ny) in neighbourhood(cell.coords.0, cell.coords.1) {
                let other_key = cell_key(nx, ny);
                if policy == PairPolicy::Unique && other_key < cell.key {
                    continue;
                }
                let Some(other_cell) = self.find(other_key) else {
                    continue;
                };
                let other = &self.indices[other_cell.members.clone()];

                match policy {
                    PairPolicy::Unique if other_key == cell.key => {
                        for (a, &i) in own.iter().enumerate() {
                            for &j in &own[a + 1..] {
                                visit(i, j);
                            }
                        }
                    }
                    PairPolicy::Unique => {
                        for &i in own {
                            for &j in other {
                                visit(i, j);
                            }
                        }
                    }
                    PairPolicy::Revisit => {
                        for &i in own {
                            for &j in other.iter().filter(|&&j| j != i) {
                                visit(i, j);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Collects candidate pairs into a vector. See
    /// [`SpatialGrid::for_each_candidate_pair`].
    pub fn candidate_pairs(&self, policy: PairPolicy) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        self.for_each_candidate_pair(policy, |i, j| pairs.push((i, j)));
        pairs
    }

    fn find(&self, key: u64) -> Option<&Cell> {
        self.cells
            .binary_search_by_key(&key, |cell| cell.key)
            .ok()
            .map(|pos| &self.cells[pos])
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

/// The 3x3 block of cells around `(cx, cy)`, skipping offsets that would
/// overflow the cell coordinate range.
fn neighbourhood(cx: i32, cy: i32) -> impl Iterator<Item = (i32, i32)> {
    NEIGHBOURHOOD
        .iter()
        .filter_map(move |&(dx, dy)| Some((cx.checked_add(dx)?, cy.checked_add(dy)?)))
}

fn sanitize_cell_size(cell_size: f64) -> f64 {
    if cell_size.is_finite() && cell_size > 0.0 {
        cell_size
    } else {
        DEFAULT_CELL_SIZE
    }
}
