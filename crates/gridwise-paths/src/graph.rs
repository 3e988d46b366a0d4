//! The implicit weighted grid graph.

use std::fmt;

use gridwise_core::{Point, Range};

use crate::diagonal::DiagonalWeight;
use crate::error::PathError;
use crate::lattice::Lattice;
use crate::traits::{Edge, Graph};

type BlockedFn<'a, C> = Box<dyn Fn(Point, &C) -> bool + 'a>;
type WeightFn<'a, C> = Box<dyn Fn(Point, &C) -> f32 + 'a>;

/// A grid graph whose edges are computed on demand.
///
/// The only state is a [`Lattice`] (bounds plus per-cell payload), an
/// optional blocked predicate, an optional weight function and the
/// [`DiagonalWeight`]. Predicates receive the cell position and its payload;
/// for a plain [`Range`] lattice the payload is `()`.
///
/// ```ignore
/// let walls = CellGrid::parse(MAP).unwrap();
/// let graph = GridGraph::new(walls)
///     .with_blocked(|_, &c| c == '#')
///     .with_weight(|_, &c| if c == '~' { 3.0 } else { 1.0 })
///     .with_diagonal_weight(std::f32::consts::SQRT_2)?;
/// ```
pub struct GridGraph<'a, L: Lattice = Range> {
    lattice: L,
    blocked: Option<BlockedFn<'a, L::Cell>>,
    weight: Option<WeightFn<'a, L::Cell>>,
    diagonal: DiagonalWeight,
}

impl GridGraph<'_, Range> {
    /// An open `width × height` grid anchored at the origin.
    pub fn bounded(width: i32, height: i32) -> Self {
        Self::new(Range::sized(width, height))
    }
}

impl<'a, L: Lattice> GridGraph<'a, L> {
    /// A graph over `lattice` with nothing blocked, unit weights and
    /// diagonals disabled.
    pub fn new(lattice: L) -> Self {
        Self {
            lattice,
            blocked: None,
            weight: None,
            diagonal: DiagonalWeight::Disabled,
        }
    }

    pub fn with_blocked(mut self, blocked: impl Fn(Point, &L::Cell) -> bool + 'a) -> Self {
        self.set_blocked(blocked);
        self
    }

    /// Per-cell movement cost, applied to edges entering the cell. Weights
    /// should be at least `1.0`.
    pub fn with_weight(mut self, weight: impl Fn(Point, &L::Cell) -> f32 + 'a) -> Self {
        self.set_weight(weight);
        self
    }

    /// See [`DiagonalWeight::from_value`] for the accepted values.
    pub fn with_diagonal_weight(mut self, value: f32) -> Result<Self, PathError> {
        self.set_diagonal_weight(value)?;
        Ok(self)
    }

    pub fn set_blocked(&mut self, blocked: impl Fn(Point, &L::Cell) -> bool + 'a) {
        self.blocked = Some(Box::new(blocked));
    }

    pub fn set_weight(&mut self, weight: impl Fn(Point, &L::Cell) -> f32 + 'a) {
        self.weight = Some(Box::new(weight));
    }

    /// Set the diagonal multiplier from a raw value. On error the previous
    /// setting is kept.
    pub fn set_diagonal_weight(&mut self, value: f32) -> Result<(), PathError> {
        self.diagonal = DiagonalWeight::from_value(value)?;
        Ok(())
    }

    pub fn set_diagonal(&mut self, diagonal: DiagonalWeight) -> Result<(), PathError> {
        self.diagonal = diagonal.validate()?;
        Ok(())
    }

    #[inline]
    pub fn diagonal_weight(&self) -> DiagonalWeight {
        self.diagonal
    }

    #[inline]
    pub fn lattice(&self) -> &L {
        &self.lattice
    }

    /// Mutable access to the lattice, e.g. to edit cell payloads between
    /// queries.
    #[inline]
    pub fn lattice_mut(&mut self) -> &mut L {
        &mut self.lattice
    }

    /// Cost of entering `p`; `1.0` without a weight function or outside the
    /// lattice.
    pub fn weight(&self, p: Point) -> f32 {
        match self.lattice.cell(p) {
            Some(cell) => self.cell_weight(p, cell),
            None => 1.0,
        }
    }

    #[inline]
    fn cell_blocked(&self, p: Point, cell: &L::Cell) -> bool {
        self.blocked.as_ref().is_some_and(|f| f(p, cell))
    }

    #[inline]
    fn cell_weight(&self, p: Point, cell: &L::Cell) -> f32 {
        self.weight.as_ref().map_or(1.0, |f| f(p, cell))
    }
}

impl<'a, L: Lattice> Graph for GridGraph<'a, L> {
    type Edges<'g>
        = Adjacent<'g, 'a, L>
    where
        Self: 'g;

    #[inline]
    fn range(&self) -> Range {
        self.lattice.range()
    }

    fn is_blocked(&self, p: Point) -> bool {
        match self.lattice.cell(p) {
            Some(cell) => self.cell_blocked(p, cell),
            None => true,
        }
    }

    fn adjacent(&self, p: Point) -> Adjacent<'_, 'a, L> {
        let step = if self.is_blocked(p) { STEPS } else { 0 };
        Adjacent {
            graph: self,
            from: p,
            step,
            diagonal: self.diagonal.multiplier(),
        }
    }
}

impl<L: Lattice + fmt::Debug> fmt::Debug for GridGraph<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridGraph")
            .field("lattice", &self.lattice)
            .field("blocked", &self.blocked.is_some())
            .field("weight", &self.weight.is_some())
            .field("diagonal", &self.diagonal)
            .finish()
    }
}

const STEPS: usize = 8;

/// Outgoing edges of one vertex: orthogonal neighbours (N, E, S, W) first,
/// then diagonal ones (NE, SE, SW, NW) when enabled.
pub struct Adjacent<'g, 'a, L: Lattice> {
    graph: &'g GridGraph<'a, L>,
    from: Point,
    step: usize,
    diagonal: Option<f32>,
}

impl<L: Lattice> Iterator for Adjacent<'_, '_, L> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        while self.step < STEPS {
            let i = self.step;
            self.step += 1;
            let (delta, multiplier) = if i < 4 {
                (Point::ORTHOGONAL[i], 1.0)
            } else if let Some(m) = self.diagonal {
                (Point::DIAGONAL[i - 4], m)
            } else {
                self.step = STEPS;
                break;
            };
            let to = self.from + delta;
            let Some(cell) = self.graph.lattice.cell(to) else {
                continue;
            };
            if self.graph.cell_blocked(to, cell) {
                continue;
            }
            return Some(Edge {
                from: self.from,
                to,
                weight: self.graph.cell_weight(to, cell) * multiplier,
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let max = if self.diagonal.is_some() { STEPS } else { 4 };
        (0, Some(max.saturating_sub(self.step)))
    }
}
