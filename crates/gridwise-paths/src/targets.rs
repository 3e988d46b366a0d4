//! Multi-target path queries.
//!
//! Two strategies with different guarantees:
//!
//! - [`Pathfinder::find_path_to_nearest`] picks the target closest to the
//!   start by heuristic distance, ignoring obstacles, and searches only for
//!   that one. It is cheap but can return a long detour when the nearest
//!   target sits behind a wall while another is reachable directly.
//! - [`Pathfinder::find_shortest_path_to_any`] searches for every target and
//!   keeps the cheapest. It is exact but costs one A* run per target.

use gridwise_core::Point;

use crate::error::PathError;
use crate::path::Path;
use crate::pathfinder::Pathfinder;
use crate::traits::Graph;

/// A candidate goal. Higher weights make a target more attractive: ranking
/// divides distance or cost by the weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pub pos: Point,
    pub weight: f32,
}

impl Target {
    pub fn new(pos: Point, weight: f32) -> Self {
        Self { pos, weight }
    }

    fn validate(&self) -> Result<(), PathError> {
        if self.weight > 0.0 && self.weight.is_finite() {
            Ok(())
        } else {
            Err(PathError::InvalidTargetWeight(self.weight))
        }
    }
}

impl From<Point> for Target {
    fn from(pos: Point) -> Self {
        Self { pos, weight: 1.0 }
    }
}

/// The winning target of a multi-target query and the path to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPath {
    /// Index of the target in the slice passed to the query.
    pub index: usize,
    pub target: Target,
    pub path: Path,
}

impl Pathfinder {
    /// Path to the target with the smallest `heuristic(start, pos) / weight`.
    ///
    /// Blocked targets are skipped; the first target wins ties. Returns
    /// `Ok(None)` if no target is walkable or the chosen one cannot be
    /// reached. The choice ignores obstacles, so the result is not
    /// necessarily the cheapest path to any target.
    pub fn find_path_to_nearest<G: Graph>(
        &mut self,
        graph: &G,
        start: Point,
        targets: &[Target],
    ) -> Result<Option<TargetPath>, PathError> {
        check(graph, start, targets)?;
        let h = self.heuristic();
        let mut best: Option<(usize, f32)> = None;
        for (i, t) in targets.iter().enumerate() {
            if graph.is_blocked(t.pos) {
                continue;
            }
            let score = h(start, t.pos) / t.weight;
            if best.is_none_or(|(_, s)| score < s) {
                best = Some((i, score));
            }
        }
        let Some((index, _)) = best else {
            log::debug!("nearest target from {start}: no walkable target");
            return Ok(None);
        };
        let target = targets[index];
        let path = self.find_path(graph, start, target.pos)?;
        if path.is_empty() {
            return Ok(None);
        }
        Ok(Some(TargetPath {
            index,
            target,
            path,
        }))
    }

    /// Cheapest path to any target, ranked by `cost / weight`.
    ///
    /// Runs A* once per walkable target. The first target wins ties. Returns
    /// `Ok(None)` if no target can be reached.
    pub fn find_shortest_path_to_any<G: Graph>(
        &mut self,
        graph: &G,
        start: Point,
        targets: &[Target],
    ) -> Result<Option<TargetPath>, PathError> {
        check(graph, start, targets)?;
        let mut best: Option<(TargetPath, f32)> = None;
        let mut visited = 0;
        for (index, &target) in targets.iter().enumerate() {
            if graph.is_blocked(target.pos) {
                continue;
            }
            let path = self.find_path(graph, start, target.pos)?;
            visited += self.last_visited;
            if path.is_empty() {
                continue;
            }
            let score = path.cost() / target.weight;
            if best.as_ref().is_none_or(|(_, s)| score < *s) {
                best = Some((
                    TargetPath {
                        index,
                        target,
                        path,
                    },
                    score,
                ));
            }
        }
        self.last_visited = visited;
        self.last_cost = best
            .as_ref()
            .map_or(f32::INFINITY, |(tp, _)| tp.path.cost());
        log::debug!(
            "shortest of {} targets from {start}: {}",
            targets.len(),
            match &best {
                Some((tp, _)) => format!("target {} at cost {}", tp.index, tp.path.cost()),
                None => "none reachable".to_string(),
            }
        );
        Ok(best.map(|(tp, _)| tp))
    }
}

fn check<G: Graph>(graph: &G, start: Point, targets: &[Target]) -> Result<(), PathError> {
    targets.iter().try_for_each(Target::validate)?;
    if graph.is_blocked(start) {
        return Err(PathError::NotWalkable(start));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GridGraph;
    use crate::lattice::CellGrid;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    // A wall runs down column one with a gap only in the bottom row. The
    // target at (2,0) is two steps away as the crow flies but fourteen on
    // foot; (0,5) is farther by heuristic yet only five steps away.
    const MAP: &str = "\
        .#.....\n\
        .#.....\n\
        .#.....\n\
        .#.....\n\
        .#.....\n\
        .#.....\n\
        .......";

    fn graph() -> GridGraph<'static, CellGrid<char>> {
        GridGraph::new(CellGrid::parse(MAP).unwrap()).with_blocked(|_, &c| c == '#')
    }

    #[test]
    fn nearest_ignores_obstacles() {
        let g = graph();
        let mut pf = Pathfinder::new();
        let targets = [Target::from(p(0, 5)), Target::from(p(2, 0))];
        let best = pf
            .find_path_to_nearest(&g, p(0, 0), &targets)
            .unwrap()
            .unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.path.last(), Some(p(2, 0)));
        assert_eq!(best.path.cost(), 14.0);
    }

    #[test]
    fn shortest_compares_real_costs() {
        let g = graph();
        let mut pf = Pathfinder::new();
        let targets = [Target::from(p(2, 0)), Target::from(p(0, 5))];
        let best = pf
            .find_shortest_path_to_any(&g, p(0, 0), &targets)
            .unwrap()
            .unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.path.cost(), 5.0);
        assert_eq!(pf.last_cost(), 5.0);
    }

    #[test]
    fn weights_scale_the_ranking() {
        let g = GridGraph::bounded(10, 1);
        let mut pf = Pathfinder::new();
        let targets = [Target::new(p(2, 0), 1.0), Target::new(p(8, 0), 5.0)];
        let near = pf.find_path_to_nearest(&g, p(0, 0), &targets).unwrap().unwrap();
        assert_eq!(near.index, 1);
        let short = pf
            .find_shortest_path_to_any(&g, p(0, 0), &targets)
            .unwrap()
            .unwrap();
        assert_eq!(short.index, 1);
        assert_eq!(short.path.cost(), 8.0);
    }

    #[test]
    fn ties_go_to_the_first_target() {
        let g = GridGraph::bounded(5, 5);
        let mut pf = Pathfinder::new();
        let targets = [Target::from(p(2, 0)), Target::from(p(0, 2))];
        let near = pf.find_path_to_nearest(&g, p(0, 0), &targets).unwrap().unwrap();
        assert_eq!(near.index, 0);
        let short = pf
            .find_shortest_path_to_any(&g, p(0, 0), &targets)
            .unwrap()
            .unwrap();
        assert_eq!(short.index, 0);
    }

    #[test]
    fn blocked_and_unreachable_targets() {
        let g = graph();
        let mut pf = Pathfinder::new();
        let targets = [Target::from(p(1, 0)), Target::from(p(99, 99))];
        assert_eq!(pf.find_path_to_nearest(&g, p(0, 0), &targets), Ok(None));
        assert_eq!(pf.find_shortest_path_to_any(&g, p(0, 0), &targets), Ok(None));
        assert_eq!(pf.last_cost(), f32::INFINITY);
        assert_eq!(pf.find_shortest_path_to_any(&g, p(0, 0), &[]), Ok(None));
    }

    #[test]
    fn invalid_weights_and_start() {
        let g = graph();
        let mut pf = Pathfinder::new();
        let bad = [Target::new(p(1, 1), 0.0)];
        assert_eq!(
            pf.find_path_to_nearest(&g, p(0, 0), &bad),
            Err(PathError::InvalidTargetWeight(0.0))
        );
        let bad = [Target::from(p(0, 2)), Target::new(p(1, 1), -2.0)];
        assert_eq!(
            pf.find_shortest_path_to_any(&g, p(0, 0), &bad),
            Err(PathError::InvalidTargetWeight(-2.0))
        );
        assert_eq!(
            pf.find_shortest_path_to_any(&g, p(1, 1), &[Target::from(p(0, 0))]),
            Err(PathError::NotWalkable(p(1, 1)))
        );
    }
}
