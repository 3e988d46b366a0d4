use std::ops::ControlFlow;
use std::rc::Rc;

use gridwise_core::Point;

use crate::error::PathError;
use crate::path::Path;
use crate::pathfinder::{NO_PARENT, Pathfinder};
use crate::traits::Graph;

impl Pathfinder {
    /// Shortest weighted path from `start` to `goal` using A*.
    ///
    /// Both endpoints must be walkable, otherwise
    /// [`PathError::NotWalkable`] is returned. An unreachable goal yields
    /// `Ok(Path::unreachable())`. With an admissible heuristic the path is
    /// optimal; inadmissible heuristics are accepted and trade optimality
    /// for fewer expansions.
    ///
    /// There is no closed set: a cell popped earlier is queued again if a
    /// strictly cheaper route to it turns up later.
    pub fn find_path<G: Graph>(
        &mut self,
        graph: &G,
        start: Point,
        goal: Point,
    ) -> Result<Path, PathError> {
        self.with_installed_visitor(|pf, visit| pf.search(graph, start, goal, visit))
    }

    /// [`find_path`](Self::find_path) with a one-off visitor in place of the
    /// installed one. The visitor may borrow from the caller.
    pub fn find_path_with<G: Graph>(
        &mut self,
        graph: &G,
        start: Point,
        goal: Point,
        mut visit: impl FnMut(Point) -> ControlFlow<()>,
    ) -> Result<Path, PathError> {
        self.search(graph, start, goal, &mut visit)
    }

    fn search<G: Graph>(
        &mut self,
        graph: &G,
        start: Point,
        goal: Point,
        visit: &mut dyn FnMut(Point) -> ControlFlow<()>,
    ) -> Result<Path, PathError> {
        let range = graph.range();
        for p in [start, goal] {
            if graph.is_blocked(p) || !range.contains(p) {
                return Err(PathError::NotWalkable(p));
            }
        }
        self.last_visited = 0;
        if start == goal {
            self.last_cost = 0.0;
            return Ok(Path::new(vec![start], 0.0));
        }

        self.prepare(range);
        let (Some(si), Some(gi)) = (self.idx(start), self.idx(goal)) else {
            return Err(PathError::NotWalkable(start));
        };
        let h = Rc::clone(&self.heuristic);
        self.record(si, 0.0, NO_PARENT);
        self.queue.push(si, h(start, goal));

        let mut visited = 0;
        let mut found = false;
        while let Some((ci, _)) = self.queue.pop() {
            visited += 1;
            let cp = self.point(ci);
            if visit(cp).is_break() {
                self.last_visited = visited;
                self.last_cost = f32::INFINITY;
                log::debug!("astar {start} -> {goal}: aborted after {visited} cells");
                return Err(PathError::Aborted);
            }
            if ci == gi {
                found = true;
                break;
            }
            let g = self.g(ci);
            for edge in graph.adjacent(cp) {
                let Some(ni) = self.idx(edge.to) else {
                    continue;
                };
                let candidate = g + edge.weight;
                if candidate >= self.g(ni) {
                    continue;
                }
                self.record(ni, candidate, ci as u32);
                self.queue.push_or_decrease(ni, candidate + h(edge.to, goal));
            }
        }

        self.last_visited = visited;
        if !found {
            self.last_cost = f32::INFINITY;
            log::debug!("astar {start} -> {goal}: unreachable, {visited} cells visited");
            return Ok(Path::unreachable());
        }
        let cost = self.g(gi);
        self.last_cost = cost;
        let cells = self.reconstruct(gi);
        log::debug!(
            "astar {start} -> {goal}: {} cells, cost {cost}, {visited} cells visited",
            cells.len()
        );
        Ok(Path::new(cells, cost))
    }
}
