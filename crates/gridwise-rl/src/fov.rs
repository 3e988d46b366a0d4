//! Field of view by recursive symmetric shadow casting.
//!
//! The plane around the origin is split into four quadrants. Each quadrant
//! is scanned row by row moving away from the origin, tracking the interval
//! of slopes `[start, end]` that is still lit. A run of floor cells ending
//! in a wall continues as a recursive scan of the next row, narrowed to the
//! run's slopes.
//!
//! An opaque cell is revealed as soon as any part of it is lit. A floor
//! cell is revealed only if its centre lies inside the lit interval. That
//! rule makes sight symmetric: if `b` is visible from `a`, then `a` is
//! visible from `b` whenever both are floor.
//!
//! Visible cells are kept both as a bitmap (for [`Fov::visible`]) and as a
//! list in reveal order (for [`Fov::iter_visible`]). [`Fov::compute`] starts
//! from an empty set while [`Fov::accumulate`] adds to the existing one, so
//! several origins can be merged.

use gridwise_core::{Point, Range};
use gridwise_paths::Graph;

/// Field of view settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FovConfig {
    /// Whether opaque cells in view are themselves reported visible.
    pub light_walls: bool,
}

impl Default for FovConfig {
    fn default() -> Self {
        Self { light_walls: true }
    }
}

#[derive(Clone, Copy)]
enum Quadrant {
    North,
    East,
    South,
    West,
}

impl Quadrant {
    const ALL: [Quadrant; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Map column `col` of the row at `depth` to a grid cell.
    #[inline]
    fn apply(self, origin: Point, depth: i32, col: i32) -> Point {
        match self {
            Self::North => origin.shift(col, -depth),
            Self::East => origin.shift(depth, col),
            Self::South => origin.shift(col, depth),
            Self::West => origin.shift(-depth, col),
        }
    }
}

/// An exact slope `num / den` with `den > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slope {
    num: i64,
    den: i64,
}

impl Slope {
    const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Slope of the left edge of the cell at `col` in the row at `depth`.
    fn edge(depth: i32, col: i32) -> Self {
        Self::new(2 * i64::from(col) - 1, 2 * i64::from(depth))
    }
}

/// One row of a quadrant with its lit slope interval.
#[derive(Clone, Copy, Debug)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
}

impl Row {
    /// First and last columns touched by the interval: `depth * start`
    /// rounded half up, `depth * end` rounded half down.
    fn columns(&self) -> (i32, i32) {
        let d = i64::from(self.depth);
        let lo = (2 * d * self.start.num + self.start.den).div_euclid(2 * self.start.den);
        let hi = -(self.end.den - 2 * d * self.end.num).div_euclid(2 * self.end.den);
        (lo as i32, hi as i32)
    }

    /// Whether the centre of `col` lies within `[start, end]`.
    fn is_symmetric(&self, col: i32) -> bool {
        let (c, d) = (i64::from(col), i64::from(self.depth));
        c * self.start.den >= d * self.start.num && c * self.end.den <= d * self.end.num
    }

    fn next(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// Per-call parameters shared by every recursive scan.
struct Cast<'f, F> {
    origin: Point,
    radius: i32,
    quadrant: Quadrant,
    opaque: &'f F,
}

/// Field of view over a fixed rectangle of cells.
///
/// Cells outside the rectangle are treated as opaque and are never
/// reported.
#[derive(Debug, Clone)]
pub struct Fov {
    range: Range,
    config: FovConfig,
    lit: Vec<bool>,
    visibles: Vec<Point>,
}

impl Fov {
    pub fn new(range: Range) -> Self {
        Self::with_config(range, FovConfig::default())
    }

    pub fn with_config(range: Range, config: FovConfig) -> Self {
        Self {
            range,
            config,
            lit: vec![false; range.len()],
            visibles: Vec::new(),
        }
    }

    #[inline]
    pub fn range(&self) -> Range {
        self.range
    }

    /// Change the rectangle. Clears the visible set.
    pub fn set_range(&mut self, range: Range) {
        self.range = range;
        self.lit.clear();
        self.lit.resize(range.len(), false);
        self.visibles.clear();
    }

    #[inline]
    pub fn config(&self) -> FovConfig {
        self.config
    }

    pub fn set_config(&mut self, config: FovConfig) {
        self.config = config;
    }

    /// Forget every visible cell.
    pub fn clear(&mut self) {
        for p in self.visibles.drain(..) {
            if let Some(i) = self.range.index_of(p) {
                self.lit[i] = false;
            }
        }
    }

    /// Cells visible from `origin` within `radius`, where `opaque` tells
    /// which cells block sight. Replaces the previous result.
    pub fn compute(&mut self, origin: Point, radius: i32, opaque: impl Fn(Point) -> bool) -> &[Point] {
        self.clear();
        self.cast(origin, radius, &opaque);
        &self.visibles
    }

    /// Like [`compute`](Self::compute) but adds to the current visible set
    /// instead of replacing it.
    pub fn accumulate(
        &mut self,
        origin: Point,
        radius: i32,
        opaque: impl Fn(Point) -> bool,
    ) -> &[Point] {
        self.cast(origin, radius, &opaque);
        &self.visibles
    }

    /// [`compute`](Self::compute) with blocked graph cells as the opaque
    /// ones.
    pub fn compute_on<G: Graph>(&mut self, graph: &G, origin: Point, radius: i32) -> &[Point] {
        self.compute(origin, radius, |p| graph.is_blocked(p))
    }

    /// Whether `p` is in the current visible set.
    pub fn visible(&self, p: Point) -> bool {
        self.range.index_of(p).is_some_and(|i| self.lit[i])
    }

    /// Visible cells in reveal order.
    pub fn iter_visible(&self) -> impl Iterator<Item = Point> + '_ {
        self.visibles.iter().copied()
    }

    #[inline]
    pub fn visibles(&self) -> &[Point] {
        &self.visibles
    }

    fn cast<F: Fn(Point) -> bool>(&mut self, origin: Point, radius: i32, opaque: &F) {
        if !self.range.contains(origin) {
            log::debug!("fov: origin {origin} outside {:?}", self.range);
            return;
        }
        let before = self.visibles.len();
        self.reveal(origin);
        let radius = radius.max(0);
        for quadrant in Quadrant::ALL {
            let cast = Cast {
                origin,
                radius,
                quadrant,
                opaque,
            };
            let row = Row {
                depth: 1,
                start: Slope::new(-1, 1),
                end: Slope::new(1, 1),
            };
            self.scan(&cast, row);
        }
        log::debug!(
            "fov from {origin} radius {radius}: {} new cells, {} total",
            self.visibles.len() - before,
            self.visibles.len()
        );
    }

    fn scan<F: Fn(Point) -> bool>(&mut self, cast: &Cast<'_, F>, mut row: Row) {
        if row.depth > cast.radius {
            return;
        }
        let r2 = i64::from(cast.radius) * i64::from(cast.radius);
        let d2 = i64::from(row.depth) * i64::from(row.depth);
        let (lo, hi) = row.columns();
        let mut prev_wall = None;
        for col in lo..=hi {
            let p = cast.quadrant.apply(cast.origin, row.depth, col);
            let wall = !self.range.contains(p) || (cast.opaque)(p);
            let in_radius = d2 + i64::from(col) * i64::from(col) <= r2;
            let lit = if wall {
                self.config.light_walls
            } else {
                row.is_symmetric(col)
            };
            if in_radius && lit {
                self.reveal(p);
            }
            match (prev_wall, wall) {
                (Some(true), false) => row.start = Slope::edge(row.depth, col),
                (Some(false), true) => {
                    let mut next = row.next();
                    next.end = Slope::edge(row.depth, col);
                    self.scan(cast, next);
                }
                _ => {}
            }
            prev_wall = Some(wall);
        }
        if prev_wall == Some(false) {
            self.scan(cast, row.next());
        }
    }

    #[inline]
    fn reveal(&mut self, p: Point) {
        if let Some(i) = self.range.index_of(p) {
            if !self.lit[i] {
                self.lit[i] = true;
                self.visibles.push(p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use gridwise_paths::{CellGrid, GridGraph};
    use rand::{RngExt, SeedableRng};

    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn dist2(a: Point, b: Point) -> i64 {
        (a - b).length_squared()
    }

    #[test]
    fn open_field_is_a_disc() {
        let range = Range::sized(21, 21);
        let mut fov = Fov::new(range);
        let origin = p(10, 10);
        let seen: HashSet<Point> = fov.compute(origin, 6, |_| false).iter().copied().collect();
        let disc: HashSet<Point> = range.iter().filter(|&q| dist2(q, origin) <= 36).collect();
        assert_eq!(seen, disc);
        assert_eq!(fov.visibles().len(), seen.len());
    }

    #[test]
    fn never_reveals_beyond_radius() {
        let range = Range::sized(30, 30);
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let walls: HashSet<Point> = (0..150)
            .map(|_| p(rng.random_range(0..30), rng.random_range(0..30)))
            .collect();
        let mut fov = Fov::new(range);
        for radius in [0, 1, 3, 7, 12] {
            let origin = p(rng.random_range(0..30), rng.random_range(0..30));
            fov.compute(origin, radius, |q| walls.contains(&q));
            let r2 = i64::from(radius * radius);
            assert!(fov.iter_visible().all(|q| dist2(q, origin) <= r2));
            assert!(fov.visible(origin));
        }
    }

    #[test]
    fn wall_casts_a_shadow() {
        let mut fov = Fov::new(Range::sized(11, 11));
        let wall = p(6, 5);
        fov.compute(p(5, 5), 5, |q| q == wall);
        assert!(fov.visible(p(5, 5)));
        assert!(fov.visible(wall));
        assert!(!fov.visible(p(7, 5)));
        assert!(!fov.visible(p(8, 5)));
        // The other side is unaffected.
        assert!(fov.visible(p(1, 5)));
    }

    #[test]
    fn light_walls_off_hides_opaque_cells() {
        let mut fov = Fov::with_config(Range::sized(11, 11), FovConfig { light_walls: false });
        let wall = p(5, 3);
        fov.compute(p(5, 5), 5, |q| q == wall);
        assert!(!fov.visible(wall));
        assert!(fov.visible(p(5, 4)));
        assert!(!fov.visible(p(5, 2)));
    }

    #[test]
    fn origin_is_always_visible() {
        let mut fov = Fov::new(Range::sized(5, 5));
        let seen = fov.compute(p(2, 2), 3, |_| true).to_vec();
        // Everything around is opaque: only the origin and its lit neighbours.
        assert_eq!(seen[0], p(2, 2));
        assert!(seen.iter().all(|&q| dist2(q, p(2, 2)) <= 2));

        let mut dark = Fov::with_config(Range::sized(5, 5), FovConfig { light_walls: false });
        assert_eq!(dark.compute(p(2, 2), 3, |_| true), &[p(2, 2)]);
    }

    #[test]
    fn out_of_range_is_never_revealed() {
        let range = Range::sized(6, 6);
        let mut fov = Fov::new(range);
        fov.compute(p(0, 0), 8, |_| false);
        assert!(fov.iter_visible().all(|q| range.contains(q)));
        assert!(!fov.visible(p(-1, 0)));
        assert!(fov.compute(p(-3, 2), 4, |_| false).is_empty());
    }

    #[test]
    fn accumulate_is_a_union() {
        let range = Range::sized(25, 25);
        let walls: HashSet<Point> = [p(10, 10), p(11, 10), p(12, 10), p(5, 15), p(18, 4)]
            .into_iter()
            .collect();
        let opaque = |q: Point| walls.contains(&q);
        let origins = [p(3, 3), p(12, 12), p(20, 20)];

        let mut single = Fov::new(range);
        let mut union = HashSet::new();
        for &o in &origins {
            union.extend(single.compute(o, 6, opaque).iter().copied());
        }

        let mut acc = Fov::new(range);
        for &o in &origins {
            acc.accumulate(o, 6, opaque);
        }
        let merged: HashSet<Point> = acc.iter_visible().collect();
        assert_eq!(merged, union);
        assert_eq!(acc.visibles().len(), merged.len());

        acc.clear();
        assert!(acc.visibles().is_empty());
        assert!(!acc.visible(p(3, 3)));
    }

    #[test]
    fn graph_blocked_cells_are_opaque() {
        let map = CellGrid::parse(".......\n...#...\n.......").unwrap();
        let graph = GridGraph::new(map).with_blocked(|_, &c| c == '#');
        let mut fov = Fov::new(graph.range());
        fov.compute_on(&graph, p(3, 2), 5);
        assert!(fov.visible(p(3, 1)));
        assert!(!fov.visible(p(3, 0)));
        assert!(fov.visible(p(0, 2)));
    }

    #[test]
    fn sight_is_symmetric_between_floor_cells() {
        let range = Range::sized(25, 25);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut from_a = Fov::new(range);
        let mut from_b = Fov::new(range);
        for _ in 0..6 {
            let walls: HashSet<Point> = (0..120)
                .map(|_| p(rng.random_range(0..25), rng.random_range(0..25)))
                .collect();
            let opaque = |q: Point| walls.contains(&q);
            for _ in 0..8 {
                let a = p(rng.random_range(0..25), rng.random_range(0..25));
                if opaque(a) {
                    continue;
                }
                let seen = from_a.compute(a, 10, opaque).to_vec();
                for b in seen.into_iter().filter(|&b| !opaque(b)) {
                    from_b.compute(b, 10, opaque);
                    assert!(from_b.visible(a), "{b} sees {a} fails, {a} sees {b} holds");
                }
            }
        }
    }

    #[test]
    fn floor_beside_a_pillar_is_visible_both_ways() {
        let range = Range::sized(9, 9);
        let pillar = p(5, 4);
        let opaque = |q: Point| q == pillar;
        let mut fov = Fov::new(range);
        fov.compute(p(3, 4), 8, opaque);
        assert!(fov.visible(p(7, 3)));
        fov.compute(p(7, 3), 8, opaque);
        assert!(fov.visible(p(3, 4)));
        // Straight behind the pillar stays dark.
        fov.compute(p(3, 4), 8, opaque);
        assert!(!fov.visible(p(6, 4)));
    }

    #[test]
    fn row_columns_round_towards_the_interval() {
        let full = Row {
            depth: 3,
            start: Slope::new(-1, 1),
            end: Slope::new(1, 1),
        };
        assert_eq!(full.columns(), (-3, 3));
        // Products landing on a half column round inwards on both sides.
        let halves = Row {
            depth: 2,
            start: Slope::edge(2, 1),
            end: Slope::edge(2, 3),
        };
        assert_eq!(halves.columns(), (1, 2));
        // Column 1 is touched but its centre slope 1/2 is below 3/5.
        let partial = Row {
            depth: 2,
            start: Slope::new(3, 5),
            end: Slope::new(1, 1),
        };
        assert_eq!(partial.columns(), (1, 2));
        assert!(!partial.is_symmetric(1));
        assert!(partial.is_symmetric(2));
    }

    #[test]
    fn set_range_resets() {
        let mut fov = Fov::new(Range::sized(4, 4));
        fov.compute(p(1, 1), 2, |_| false);
        fov.set_range(Range::sized(8, 8));
        assert!(fov.visibles().is_empty());
        fov.compute(p(7, 7), 1, |_| false);
        assert!(fov.visible(p(6, 7)));
    }
}
