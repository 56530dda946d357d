use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Whether `coords` lies inside a board of `size`.
pub const fn in_bounds(coords: Coord2, size: Coord2) -> bool {
    coords.0 < size.0 && coords.1 < size.1
}

/// Row-major flat index, `row * cols + col`.
pub const fn flat_index((row, col): Coord2, (_, cols): Coord2) -> usize {
    row as usize * cols as usize + col as usize
}

/// Inverse of [`flat_index`], `None` when `index` is past the end of the board.
pub fn coords_of(index: usize, (rows, cols): Coord2) -> Option<Coord2> {
    if cols == 0 || index >= rows as usize * cols as usize {
        return None;
    }
    let row = (index / cols as usize).try_into().ok()?;
    let col = (index % cols as usize).try_into().ok()?;
    Some((row, col))
}

pub trait NeighborIterExt {
    /// The up to 8 Moore neighbors of `center`, clipped to the board.
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter;

    /// `center` followed by its neighbors, the 3×3 block clipped to the board.
    fn iter_block(&self, center: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter {
        NeighborIter::new(center, board_size(self), false)
    }

    fn iter_block(&self, center: Coord2) -> NeighborIter {
        NeighborIter::new(center, board_size(self), true)
    }
}

/// Dimensions of an ndarray board as `(rows, cols)`.
///
/// Boards are always built from a [`Coord2`] so both axes fit.
pub(crate) fn board_size<T>(board: &Array2<T>) -> Coord2 {
    let (rows, cols) = board.dim();
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

// the center comes first so `iter_block` can start one step earlier
const DISPLACEMENTS: [(i8, i8); 9] = [
    (0, 0),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;

    let next_row = row.checked_add_signed(d_row)?;
    let next_col = col.checked_add_signed(d_col)?;
    let next = (next_row, next_col);

    in_bounds(next, bounds).then_some(next)
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2, include_center: bool) -> Self {
        Self {
            center,
            bounds,
            index: if include_center { 0 } else { 1 },
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *DISPLACEMENTS.get(usize::from(self.index))?;
            self.index += 1;

            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
    }
}
