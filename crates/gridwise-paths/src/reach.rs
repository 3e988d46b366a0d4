use std::ops::ControlFlow;

use gridwise_core::Point;

use crate::pathfinder::{NO_PARENT, Pathfinder};
use crate::traits::Graph;

/// Bound on a reachability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReachLimit {
    /// Stop after this many cells have been collected, start included.
    Nodes(usize),
    /// Collect every cell at most this many steps from the start.
    Distance(u32),
}

impl Pathfinder {
    /// Cells reachable from `start` by breadth-first expansion, ignoring
    /// edge weights.
    ///
    /// Cells are returned in visit order: layer by layer, and within a layer
    /// in adjacency order, so results are deterministic. The start comes
    /// first. A blocked start yields nothing.
    ///
    /// The installed visitor sees each cell as it leaves the frontier. If it
    /// breaks, expansion stops and the cells collected so far are returned.
    pub fn reachable<G: Graph>(&mut self, graph: &G, start: Point, limit: ReachLimit) -> Vec<Point> {
        self.with_installed_visitor(|pf, visit| pf.breadth_first(graph, start, limit, visit))
    }

    /// [`reachable`](Self::reachable) with a one-off visitor in place of the
    /// installed one.
    pub fn reachable_with<G: Graph>(
        &mut self,
        graph: &G,
        start: Point,
        limit: ReachLimit,
        mut visit: impl FnMut(Point) -> ControlFlow<()>,
    ) -> Vec<Point> {
        self.breadth_first(graph, start, limit, &mut visit)
    }

    fn breadth_first<G: Graph>(
        &mut self,
        graph: &G,
        start: Point,
        limit: ReachLimit,
        visit: &mut dyn FnMut(Point) -> ControlFlow<()>,
    ) -> Vec<Point> {
        let mut cells = Vec::new();
        if graph.is_blocked(start) || limit == ReachLimit::Nodes(0) {
            return cells;
        }
        self.prepare(graph.range());
        let Some(si) = self.idx(start) else {
            return cells;
        };
        let (max_nodes, max_depth) = match limit {
            ReachLimit::Nodes(n) => (n, u32::MAX),
            ReachLimit::Distance(d) => (usize::MAX, d),
        };

        self.record(si, 0.0, NO_PARENT);
        self.frontier.push_back((si as u32, 0));
        cells.push(start);

        while cells.len() < max_nodes {
            let Some((ci, depth)) = self.frontier.pop_front() else {
                break;
            };
            let cp = self.point(ci as usize);
            if visit(cp).is_break() {
                log::debug!("reachable from {start}: aborted at {cp}");
                break;
            }
            if depth >= max_depth {
                continue;
            }
            for edge in graph.adjacent(cp) {
                let Some(ni) = self.idx(edge.to) else {
                    continue;
                };
                if self.seen(ni) {
                    continue;
                }
                self.record(ni, (depth + 1) as f32, ci);
                cells.push(edge.to);
                if cells.len() >= max_nodes {
                    break;
                }
                self.frontier.push_back((ni as u32, depth + 1));
            }
        }
        self.frontier.clear();
        log::debug!("reachable from {start} ({limit:?}): {} cells", cells.len());
        cells
    }
}
