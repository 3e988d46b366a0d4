//! Shared world model for the terminal demo.
//!
//! Demonstrates: scattering circle and rectangle obstacles into a
//! [`SpatialIndex`], deriving a grid graph from it, A* pathfinding, nearest
//! target selection, accumulated field of view and heat-gradient chasing.
//! Obstacles drift a little every turn through the index's mutation guard.

use glam::Vec2;
use gridwise_core::{IndexConfig, ObstacleId, Point, Range, Shape, SpatialIndex};
use gridwise_paths::{
    DiagonalWeight, Graph, GridGraph, Path, PathError, Pathfinder, ReachLimit, Target, distance,
};
use gridwise_rl::{Decay, Fov, FovConfig, Heatmap, HeatmapConfig};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const WIDTH: i32 = 60;
pub const HEIGHT: i32 = 20;
const OBSTACLES: usize = 45;
const SIGHT: i32 = 8;
const COINS: usize = 5;

/// World-space centre of a grid cell.
#[inline]
pub fn cell_center(p: Point) -> Vec2 {
    Vec2::new(p.x as f32 + 0.5, p.y as f32 + 0.5)
}

/// The movement graph: a cell is blocked when its centre lies inside any
/// obstacle.
pub fn graph(obstacles: &SpatialIndex) -> Result<GridGraph<'_>, PathError> {
    let mut g = GridGraph::bounded(WIDTH, HEIGHT)
        .with_blocked(move |p, _| obstacles.contains_point(cell_center(p)));
    g.set_diagonal(DiagonalWeight::Euclidean)?;
    Ok(g)
}

/// Outcome of one simulated turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Moved,
    Collected,
    Caught,
    Stuck,
    Done,
}

pub struct World {
    rng: StdRng,
    obstacles: SpatialIndex,
    drifting: Vec<ObstacleId>,
    pathfinder: Pathfinder,
    fov: Fov,
    heat: Heatmap,
    player: Point,
    hunter: Point,
    coins: Vec<Point>,
    route: Path,
    turns: u32,
}

impl World {
    pub fn generate(seed: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut obstacles = SpatialIndex::from_config(&IndexConfig {
            min_radius: 0.5,
            max_radius: 2.5,
        })?;
        let mut drifting = Vec::new();
        for i in 0..OBSTACLES {
            let at = Vec2::new(
                rng.random_range(0.0..WIDTH as f32),
                rng.random_range(0.0..HEIGHT as f32),
            );
            let id = if i % 3 == 0 {
                let size = Vec2::new(rng.random_range(1.0..6.0), rng.random_range(1.0..3.0));
                obstacles.add_rect(at, size)
            } else {
                obstacles.add_circle(at, rng.random_range(0.5..2.5))
            };
            if i % 5 == 0 {
                drifting.push(id);
            }
        }

        let player = Point::new(1, HEIGHT / 2);
        let hunter = Point::new(WIDTH - 2, HEIGHT / 2);
        for spot in [player, hunter] {
            for id in obstacles.obstacles_at(cell_center(spot)) {
                obstacles.remove(id);
            }
        }
        drifting.retain(|&id| obstacles.contains(id));

        // Coins go on cells the player can actually reach.
        let mut pathfinder = Pathfinder::new().with_heuristic(distance::octile);
        let open = pathfinder.reachable(&graph(&obstacles)?, player, ReachLimit::Nodes(usize::MAX));
        let mut coins = Vec::new();
        while coins.len() < COINS.min(open.len().saturating_sub(1)) {
            let p = open[rng.random_range(1..open.len())];
            if !coins.contains(&p) {
                coins.push(p);
            }
        }

        let range = Range::sized(WIDTH, HEIGHT);
        let mut world = Self {
            rng,
            obstacles,
            drifting,
            pathfinder,
            fov: Fov::with_config(range, FovConfig { light_walls: true }),
            heat: Heatmap::with_config(
                range,
                HeatmapConfig {
                    decay: Decay::Exponential,
                    base_heat: None,
                },
            ),
            player,
            hunter,
            coins,
            route: Path::unreachable(),
            turns: 0,
        };
        world.look()?;
        log::info!(
            "world {seed}: {} obstacles, {} coins, {} reachable cells",
            world.obstacles.len(),
            world.coins.len(),
            open.len()
        );
        Ok(world)
    }

    #[inline]
    pub fn player(&self) -> Point {
        self.player
    }

    #[inline]
    pub fn hunter(&self) -> Point {
        self.hunter
    }

    #[inline]
    pub fn coins(&self) -> &[Point] {
        &self.coins
    }

    #[inline]
    pub fn obstacles(&self) -> &SpatialIndex {
        &self.obstacles
    }

    #[inline]
    pub fn route(&self) -> &Path {
        &self.route
    }

    #[inline]
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn is_blocked(&self, p: Point) -> bool {
        self.obstacles.contains_point(cell_center(p))
    }

    /// Advance one turn: obstacles drift, the player walks toward the
    /// nearest coin and the hunter follows the player's heat trail.
    pub fn step(&mut self) -> Result<Turn, Box<dyn std::error::Error>> {
        if self.coins.is_empty() {
            return Ok(Turn::Done);
        }
        self.turns += 1;
        self.drift();

        let g = graph(&self.obstacles)?;
        let targets: Vec<Target> = self.coins.iter().copied().map(Target::from).collect();
        let best = match self.pathfinder.find_path_to_nearest(&g, self.player, &targets)? {
            Some(best) => Some(best),
            None => self
                .pathfinder
                .find_shortest_path_to_any(&g, self.player, &targets)?,
        };
        let Some(best) = best else {
            log::warn!("turn {}: no coin reachable from {}", self.turns, self.player);
            self.route = Path::unreachable();
            return Ok(Turn::Stuck);
        };
        self.route = best.path;
        if let Some(next) = self.route.as_slice().get(1).copied() {
            self.player = next;
        }

        let mut outcome = Turn::Moved;
        if let Some(i) = self.coins.iter().position(|&c| c == self.player) {
            self.coins.swap_remove(i);
            log::info!("turn {}: coin at {}, {} left", self.turns, self.player, self.coins.len());
            outcome = Turn::Collected;
        }

        self.heat.clear_sources();
        self.heat.add_heat_source(self.player, 10.0, 25.0);
        self.heat.update(&g);
        if let Some(next) = self.heat.best_direction(&g, self.hunter) {
            if self.heat.heat(next) > self.heat.heat(self.hunter) {
                self.hunter = next;
            }
        }
        drop(g);
        self.look()?;

        if self.hunter == self.player {
            log::info!("turn {}: caught at {}", self.turns, self.player);
            return Ok(Turn::Caught);
        }
        if self.coins.is_empty() {
            return Ok(Turn::Done);
        }
        Ok(outcome)
    }

    /// Nudge the drifting obstacles, undoing any move that would bury the
    /// player or the hunter.
    fn drift(&mut self) {
        let keep_clear = [cell_center(self.player), cell_center(self.hunter)];
        for &id in &self.drifting {
            let delta = Vec2::new(
                self.rng.random_range(-0.5..=0.5),
                self.rng.random_range(-0.5..=0.5),
            );
            let Some(mut obstacle) = self.obstacles.get_mut(id) else {
                continue;
            };
            obstacle.translate(delta);
            if keep_clear.iter().any(|&c| obstacle.contains_point(c)) {
                obstacle.translate(-delta);
            }
        }
        let crowded = self
            .drifting
            .iter()
            .filter(|&&id| self.obstacles.obstacle_overlaps(id))
            .count();
        log::debug!("turn {}: {crowded} drifting obstacles touch another", self.turns);
    }

    fn look(&mut self) -> Result<(), PathError> {
        let g = graph(&self.obstacles)?;
        self.fov.accumulate(self.player, SIGHT, |p| g.is_blocked(p));
        Ok(())
    }

    pub fn seen(&self, p: Point) -> bool {
        self.fov.visible(p)
    }

    /// ASCII frame: `@` player, `H` hunter, `$` coin, `#` obstacle,
    /// `*` route, `.` explored floor, blank for unexplored.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(((WIDTH + 1) * HEIGHT) as usize);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let p = Point::new(x, y);
                let ch = if p == self.player {
                    '@'
                } else if p == self.hunter {
                    'H'
                } else if self.coins.contains(&p) {
                    '$'
                } else if !self.seen(p) {
                    ' '
                } else if self.is_blocked(p) {
                    '#'
                } else if self.route.as_slice().contains(&p) {
                    '*'
                } else {
                    '.'
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    /// Shapes currently in the index, for a summary line.
    pub fn shape_counts(&self) -> (usize, usize) {
        self.obstacles
            .iter()
            .fold((0, 0), |(c, r), (_, s)| match s {
                Shape::Circle(_) => (c + 1, r),
                Shape::Rect(_) => (c, r + 1),
                Shape::Point(_) => (c, r),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::SQRT_2;

    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let a = World::generate(7).unwrap();
        let b = World::generate(7).unwrap();
        assert_eq!(a.coins(), b.coins());
        assert_eq!(a.render(), b.render());
        assert_eq!(a.obstacles().len(), b.obstacles().len());
    }

    #[test]
    fn spawn_points_are_clear() {
        for seed in 0..10 {
            let w = World::generate(seed).unwrap();
            assert!(!w.is_blocked(w.player()), "seed {seed}");
            assert!(!w.is_blocked(w.hunter()), "seed {seed}");
            assert!(w.coins().iter().all(|&c| !w.is_blocked(c)));
        }
    }

    #[test]
    fn graph_follows_the_index() {
        let mut index = SpatialIndex::new(1.0).unwrap();
        let id = index.add_rect(Vec2::new(2.0, 2.0), Vec2::new(2.0, 1.0));
        {
            let g = graph(&index).unwrap();
            assert!(g.is_blocked(Point::new(2, 2)));
            assert!(g.is_blocked(Point::new(3, 2)));
            assert!(!g.is_blocked(Point::new(4, 2)));
            assert_eq!(g.diagonal_weight().multiplier(), Some(SQRT_2));
        }
        if let Some(mut o) = index.get_mut(id) {
            o.translate(Vec2::new(0.0, 5.0));
        }
        let g = graph(&index).unwrap();
        assert!(!g.is_blocked(Point::new(2, 2)));
        assert!(g.is_blocked(Point::new(2, 7)));
    }

    #[test]
    fn turns_keep_everyone_on_open_ground() {
        let mut w = World::generate(3).unwrap();
        for _ in 0..200 {
            let turn = w.step().unwrap();
            assert!(w.route().iter().all(|p| !w.is_blocked(p)));
            assert!(!w.is_blocked(w.player()));
            assert!(!w.is_blocked(w.hunter()));
            if matches!(turn, Turn::Done | Turn::Caught | Turn::Stuck) {
                break;
            }
        }
        assert!(w.turns() > 0 || w.coins().is_empty());
        assert!(w.seen(w.player()));
        let frame = w.render();
        assert_eq!(frame.lines().count(), HEIGHT as usize);
        assert!(frame.lines().all(|l| l.chars().count() == WIDTH as usize));
    }
}
