//! Grid bounds with an optional per-cell payload.
//!
//! A [`Lattice`] answers two questions for the grid graph: which cells exist,
//! and what (if anything) each cell carries. [`Range`] is the payload-free
//! lattice; [`CellGrid`] stores one value per cell.

use gridwise_core::{Point, Range};

/// Bounds of a grid graph plus per-cell payload access.
pub trait Lattice {
    /// Payload stored in each cell; `()` for bounds-only lattices.
    type Cell;

    /// The cells that exist.
    fn range(&self) -> Range;

    /// Payload at `p`, or `None` outside [`range`](Self::range).
    fn cell(&self, p: Point) -> Option<&Self::Cell>;

    #[inline]
    fn contains(&self, p: Point) -> bool {
        self.range().contains(p)
    }
}

impl Lattice for Range {
    type Cell = ();

    #[inline]
    fn range(&self) -> Range {
        *self
    }

    #[inline]
    fn cell(&self, p: Point) -> Option<&()> {
        if Range::contains(*self, p) {
            Some(&())
        } else {
            None
        }
    }
}

/// A dense, row-major 2D array of cell payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid<T> {
    range: Range,
    cells: Vec<T>,
}

impl<T: Clone> CellGrid<T> {
    /// A `width × height` grid anchored at the origin, filled with `fill`.
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        Self::with_range(Range::sized(width, height), fill)
    }

    /// A grid covering `range`, filled with `fill`.
    pub fn with_range(range: Range, fill: T) -> Self {
        Self {
            range,
            cells: vec![fill; range.len()],
        }
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> CellGrid<T> {
    /// Wrap row-major `cells` covering `range`. Returns `None` if the length
    /// does not match the range.
    pub fn from_vec(range: Range, cells: Vec<T>) -> Option<Self> {
        (cells.len() == range.len()).then_some(Self { range, cells })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.range.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.range.height()
    }

    #[inline]
    pub fn get(&self, p: Point) -> Option<&T> {
        self.range.index_of(p).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, p: Point) -> Option<&mut T> {
        self.range.index_of(p).map(|i| &mut self.cells[i])
    }

    /// Store `value` at `p`, returning the previous payload. Out-of-range
    /// writes are ignored.
    pub fn set(&mut self, p: Point, value: T) -> Option<T> {
        self.get_mut(p).map(|slot| std::mem::replace(slot, value))
    }

    /// Row-major iteration over `(position, payload)`.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        self.range.iter().zip(self.cells.iter())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

impl CellGrid<char> {
    /// Parse a rectangular block of text, one row per line. Returns `None`
    /// if the lines have different widths.
    pub fn parse(text: &str) -> Option<Self> {
        let rows: Vec<Vec<char>> = text.lines().map(|l| l.chars().collect()).collect();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let range = Range::sized(width as i32, rows.len() as i32);
        Self::from_vec(range, rows.into_iter().flatten().collect())
    }
}

impl<T> Lattice for CellGrid<T> {
    type Cell = T;

    #[inline]
    fn range(&self) -> Range {
        self.range
    }

    #[inline]
    fn cell(&self, p: Point) -> Option<&T> {
        self.get(p)
    }
}
