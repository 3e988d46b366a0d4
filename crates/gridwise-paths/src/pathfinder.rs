use std::collections::VecDeque;
use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;

use gridwise_core::{Point, Range};

use crate::distance::manhattan;
use crate::queue::IndexedMinQueue;

pub(crate) const NO_PARENT: u32 = u32::MAX;

/// Per-cell search record. Only meaningful when `generation` matches the
/// pathfinder's current generation; anything else is left over from an
/// earlier query and reads as "unvisited".
#[derive(Clone, Copy)]
pub(crate) struct Node {
    pub(crate) g: f32,
    pub(crate) parent: u32,
    pub(crate) generation: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: f32::INFINITY,
            parent: NO_PARENT,
            generation: 0,
        }
    }
}

type Visitor = Box<dyn FnMut(Point) -> ControlFlow<()>>;
pub(crate) type SharedHeuristic = Rc<dyn Fn(Point, Point) -> f32>;

/// Reusable search state for A* and reachability queries.
///
/// `Pathfinder` owns its node table, open list and BFS frontier and resizes
/// them to the queried graph's range on demand, so repeated queries on the
/// same grid do not allocate. A generation counter invalidates the previous
/// query's records in O(1).
///
/// ```ignore
/// let graph = GridGraph::bounded(20, 20);
/// let mut pf = Pathfinder::new().with_heuristic(distance::chebyshev);
/// let path = pf.find_path(&graph, Point::new(0, 0), Point::new(9, 4))?;
/// ```
pub struct Pathfinder {
    pub(crate) range: Range,
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    pub(crate) queue: IndexedMinQueue,
    pub(crate) frontier: VecDeque<(u32, u32)>,
    pub(crate) heuristic: SharedHeuristic,
    pub(crate) visitor: Option<Visitor>,
    pub(crate) last_cost: f32,
    pub(crate) last_visited: usize,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Pathfinder {
    /// An empty pathfinder using the Manhattan heuristic.
    pub fn new() -> Self {
        Self {
            range: Range::default(),
            nodes: Vec::new(),
            generation: 0,
            queue: IndexedMinQueue::default(),
            frontier: VecDeque::new(),
            heuristic: Rc::new(manhattan),
            visitor: None,
            last_cost: f32::INFINITY,
            last_visited: 0,
        }
    }

    /// Any `Fn(Point, Point) -> f32` works, including closures that
    /// capture state such as a minimum terrain weight to scale by.
    pub fn with_heuristic(mut self, heuristic: impl Fn(Point, Point) -> f32 + 'static) -> Self {
        self.set_heuristic(heuristic);
        self
    }

    pub fn set_heuristic(&mut self, heuristic: impl Fn(Point, Point) -> f32 + 'static) {
        self.heuristic = Rc::new(heuristic);
    }

    #[inline]
    pub fn heuristic(&self) -> &dyn Fn(Point, Point) -> f32 {
        &*self.heuristic
    }

    /// Install a callback invoked with every cell popped from the open list
    /// or the BFS frontier. Returning [`ControlFlow::Break`] aborts the
    /// running query.
    ///
    /// The callback is stored, hence `'static`. For a borrowing callback use
    /// [`find_path_with`](Self::find_path_with) or
    /// [`reachable_with`](Self::reachable_with).
    pub fn set_visitor(&mut self, visitor: impl FnMut(Point) -> ControlFlow<()> + 'static) {
        self.visitor = Some(Box::new(visitor));
    }

    pub fn clear_visitor(&mut self) {
        self.visitor = None;
    }

    /// Run `query` with the installed visitor, or a passive one if there is
    /// none.
    pub(crate) fn with_installed_visitor<R>(
        &mut self,
        query: impl FnOnce(&mut Self, &mut dyn FnMut(Point) -> ControlFlow<()>) -> R,
    ) -> R {
        let mut visitor = self.visitor.take();
        let result = match visitor.as_mut() {
            Some(v) => query(self, &mut **v),
            None => query(self, &mut |_: Point| ControlFlow::Continue(())),
        };
        self.visitor = visitor;
        result
    }

    /// Cost of the last path found, or infinity if the last query failed.
    #[inline]
    pub fn last_cost(&self) -> f32 {
        self.last_cost
    }

    /// Number of cells popped by the last A* query.
    #[inline]
    pub fn last_visited(&self) -> usize {
        self.last_visited
    }

    /// The range the scratch tables were last sized for.
    #[inline]
    pub fn range(&self) -> Range {
        self.range
    }

    /// Ready the scratch tables for a query over `range`.
    ///
    /// Tables only ever grow. A smaller or shifted range reuses them and
    /// bumps the generation so stale records are ignored.
    pub(crate) fn prepare(&mut self, range: Range) {
        let len = range.len();
        if self.nodes.len() < len {
            self.nodes.resize(len, Node::default());
        }
        self.range = range;
        self.queue.reset(len);
        self.frontier.clear();
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Counter wrapped: old stamps could collide with new ones.
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
    }

    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        self.range.index_of(p)
    }

    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        self.range.point_at(idx)
    }

    /// Recorded cost of `idx` in the current query.
    #[inline]
    pub(crate) fn g(&self, idx: usize) -> f32 {
        let n = &self.nodes[idx];
        if n.generation == self.generation {
            n.g
        } else {
            f32::INFINITY
        }
    }

    #[inline]
    pub(crate) fn record(&mut self, idx: usize, g: f32, parent: u32) {
        self.nodes[idx] = Node {
            g,
            parent,
            generation: self.generation,
        };
    }

    #[inline]
    pub(crate) fn seen(&self, idx: usize) -> bool {
        self.nodes[idx].generation == self.generation
    }

    /// Walk predecessors back from `goal`.
    pub(crate) fn reconstruct(&self, goal: usize) -> Vec<Point> {
        let mut cells = Vec::new();
        let mut i = goal as u32;
        while i != NO_PARENT {
            cells.push(self.point(i as usize));
            i = self.nodes[i as usize].parent;
        }
        cells.reverse();
        cells
    }
}

impl fmt::Debug for Pathfinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pathfinder")
            .field("range", &self.range)
            .field("capacity", &self.nodes.len())
            .field("generation", &self.generation)
            .field("visitor", &self.visitor.is_some())
            .field("last_cost", &self.last_cost)
            .field("last_visited", &self.last_visited)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smaller_range_preserves_capacity() {
        let mut pf = Pathfinder::new();
        pf.prepare(Range::sized(20, 20));
        assert_eq!(pf.nodes.len(), 400);
        pf.prepare(Range::sized(5, 5));
        assert_eq!(pf.nodes.len(), 400);
        assert_eq!(pf.range(), Range::sized(5, 5));
    }

    #[test]
    fn larger_range_grows_tables() {
        let mut pf = Pathfinder::new();
        pf.prepare(Range::sized(5, 5));
        pf.prepare(Range::new(3, 3, 23, 23));
        assert_eq!(pf.nodes.len(), 400);
        assert_eq!(pf.idx(Point::new(3, 3)), Some(0));
        assert_eq!(pf.point(21), Point::new(4, 4));
    }

    #[test]
    fn generation_bump_forgets_records() {
        let mut pf = Pathfinder::new();
        pf.prepare(Range::sized(4, 4));
        pf.record(5, 2.0, NO_PARENT);
        assert!(pf.seen(5));
        assert_eq!(pf.g(5), 2.0);
        pf.prepare(Range::sized(4, 4));
        assert!(!pf.seen(5));
        assert_eq!(pf.g(5), f32::INFINITY);
    }

    #[test]
    fn generation_wrap_resets_nodes() {
        let mut pf = Pathfinder::new();
        pf.prepare(Range::sized(2, 2));
        pf.record(0, 1.0, NO_PARENT);
        pf.generation = u32::MAX;
        pf.nodes[1].generation = 1;
        pf.prepare(Range::sized(2, 2));
        assert_eq!(pf.generation, 1);
        assert!(!pf.seen(1));
    }

    #[test]
    fn reconstruct_follows_parents() {
        let mut pf = Pathfinder::new();
        pf.prepare(Range::sized(3, 1));
        pf.record(0, 0.0, NO_PARENT);
        pf.record(1, 1.0, 0);
        pf.record(2, 2.0, 1);
        assert_eq!(
            pf.reconstruct(2),
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)]
        );
    }
}
