//! Broad-phase spatial index over a uniform grid of square cells.
//!
//! Every registered obstacle is filed under each cell its bounding region
//! touches, so overlap queries only test obstacles sharing a cell with the
//! query shape. Mutation goes through [`ObstacleMut`], which re-files the
//! obstacle when it is dropped; an obstacle is therefore always reachable
//! from exactly the cells covering its current bounds.

use std::collections::HashMap;
use std::f32::consts::SQRT_2;
use std::fmt;
use std::ops::{Deref, DerefMut};

use glam::Vec2;

use crate::error::SpatialError;
use crate::geom::{Point, Range};
use crate::shape::{Bounds, Shape, ShapeKind};

/// Derives a cell size from the expected obstacle radius range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexConfig {
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_radius: 0.5,
            max_radius: 1.5,
        }
    }
}

impl IndexConfig {
    /// `(min_radius + max_radius) / 2 / √2`: the side of the square inscribed
    /// in a circle of average radius.
    pub fn cell_size(&self) -> f32 {
        (self.min_radius + self.max_radius) / 2.0 / SQRT_2
    }
}

/// Generational handle to an obstacle registered in a [`SpatialIndex`].
///
/// Handles of removed obstacles never alias newer ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    shape: Shape,
    cells: Range,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Uniform-grid spatial hash for points, circles and rectangles.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    cells: HashMap<Point, Vec<ObstacleId>>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl SpatialIndex {
    /// Create an empty index with square cells of side `cell_size`.
    pub fn new(cell_size: f32) -> Result<Self, SpatialError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SpatialError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        })
    }

    /// Create an index whose cell size is derived from a radius range.
    pub fn from_config(config: &IndexConfig) -> Result<Self, SpatialError> {
        Self::new(config.cell_size())
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of registered obstacles.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Obstacles filed under `cell`.
    pub fn cell_occupants(&self, cell: Point) -> &[ObstacleId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The cell containing a world position.
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> Point {
        Point::new(
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Cells covered by `bounds`: `floor(min / size)` to `ceil(max / size)`,
    /// inclusive on both axes.
    pub fn cells_for(&self, bounds: &Bounds) -> Range {
        let min = self.cell_of(bounds.min);
        let max = Point::new(
            (bounds.max.x / self.cell_size).ceil() as i32,
            (bounds.max.y / self.cell_size).ceil() as i32,
        );
        Range::new(min.x, min.y, max.x + 1, max.y + 1)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register `shape` and return its handle.
    pub fn add(&mut self, shape: Shape) -> ObstacleId {
        let cells = self.cells_for(&shape.bounds());
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(Entry { shape, cells });
        let id = ObstacleId {
            index,
            generation: slot.generation,
        };
        self.file(id, cells);
        self.len += 1;
        log::trace!("spatial index: added {id} over {cells}");
        id
    }

    pub fn add_point(&mut self, pos: Vec2) -> ObstacleId {
        self.add(Shape::point(pos))
    }

    pub fn add_circle(&mut self, center: Vec2, radius: f32) -> ObstacleId {
        self.add(Shape::circle(center, radius))
    }

    pub fn add_rect(&mut self, origin: Vec2, size: Vec2) -> ObstacleId {
        self.add(Shape::rect(origin, size))
    }

    /// Unregister an obstacle, returning its last shape. Stale handles
    /// return `None`.
    pub fn remove(&mut self, id: ObstacleId) -> Option<Shape> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.unfile(id, entry.cells);
        self.len -= 1;
        log::trace!("spatial index: removed {id}");
        Some(entry.shape)
    }

    /// Remove every obstacle. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(i as u32);
        }
        log::debug!("spatial index: cleared {} obstacles", self.len);
        self.len = 0;
    }

    #[inline]
    pub fn contains(&self, id: ObstacleId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Shape> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref().map(|e| &e.shape)
    }

    /// Borrow an obstacle for mutation. Changes are re-indexed when the
    /// returned guard is dropped.
    pub fn get_mut(&mut self, id: ObstacleId) -> Option<ObstacleMut<'_>> {
        let shape = *self.get(id)?;
        Some(ObstacleMut {
            index: self,
            id,
            shape,
        })
    }

    /// Iterate over every registered obstacle.
    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Shape)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry.as_ref().map(|e| {
                (
                    ObstacleId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    &e.shape,
                )
            })
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether any registered obstacle overlaps `shape`.
    pub fn overlaps(&self, shape: &Shape) -> bool {
        self.first_overlap(shape, None).is_some()
    }

    /// Whether the registered obstacle `id` overlaps any other obstacle.
    /// Stale handles never overlap.
    pub fn obstacle_overlaps(&self, id: ObstacleId) -> bool {
        match self.get(id) {
            Some(shape) => self.first_overlap(shape, Some(id)).is_some(),
            None => false,
        }
    }

    /// Every distinct obstacle overlapping `shape`, in handle order.
    pub fn query(&self, shape: &Shape) -> Vec<ObstacleId> {
        let mut hits = Vec::new();
        for cell in self.cells_for(&shape.bounds()) {
            for &id in self.cell_occupants(cell) {
                if self.get(id).is_some_and(|other| other.overlaps(shape)) {
                    hits.push(id);
                }
            }
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Whether any registered obstacle contains the world position `pos`.
    pub fn contains_point(&self, pos: Vec2) -> bool {
        self.overlaps(&Shape::point(pos))
    }

    /// Every obstacle containing the world position `pos`.
    pub fn obstacles_at(&self, pos: Vec2) -> Vec<ObstacleId> {
        self.query(&Shape::point(pos))
    }

    fn first_overlap(&self, shape: &Shape, skip: Option<ObstacleId>) -> Option<ObstacleId> {
        let kind = shape.kind();
        for cell in self.cells_for(&shape.bounds()) {
            let bucket = self.cell_occupants(cell);
            if bucket.is_empty() {
                continue;
            }
            // Same-kind tests are the cheap ones, so run them first.
            let same = bucket.iter().filter(|&&id| self.kind_of(id) == Some(kind));
            let mixed = bucket.iter().filter(|&&id| self.kind_of(id) != Some(kind));
            for &id in same.chain(mixed) {
                if Some(id) == skip {
                    continue;
                }
                if self.get(id).is_some_and(|other| other.overlaps(shape)) {
                    return Some(id);
                }
            }
        }
        None
    }

    #[inline]
    fn kind_of(&self, id: ObstacleId) -> Option<ShapeKind> {
        self.get(id).map(Shape::kind)
    }

    // -----------------------------------------------------------------------
    // Bucket maintenance
    // -----------------------------------------------------------------------

    fn file(&mut self, id: ObstacleId, cells: Range) {
        for cell in cells {
            self.cells.entry(cell).or_default().push(id);
        }
    }

    fn unfile(&mut self, id: ObstacleId, cells: Range) {
        for cell in cells {
            let Some(bucket) = self.cells.get_mut(&cell) else {
                continue;
            };
            if let Some(pos) = bucket.iter().position(|&o| o == id) {
                bucket.swap_remove(pos);
            }
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    fn refile(&mut self, id: ObstacleId, shape: Shape) {
        let cells = self.cells_for(&shape.bounds());
        let Some(entry) = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
        else {
            return;
        };
        entry.shape = shape;
        if entry.cells == cells {
            return;
        }
        let old = std::mem::replace(&mut entry.cells, cells);
        self.unfile(id, old);
        self.file(id, cells);
        log::trace!("spatial index: moved {id} from {old} to {cells}");
    }
}

/// Mutable access to a registered obstacle.
///
/// Derefs to the obstacle's [`Shape`]. When the guard is dropped the
/// obstacle is moved to the cells covering its new bounds.
pub struct ObstacleMut<'a> {
    index: &'a mut SpatialIndex,
    id: ObstacleId,
    shape: Shape,
}

impl ObstacleMut<'_> {
    #[inline]
    pub fn id(&self) -> ObstacleId {
        self.id
    }
}

impl fmt::Debug for ObstacleMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObstacleMut")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .finish()
    }
}

impl Deref for ObstacleMut<'_> {
    type Target = Shape;

    fn deref(&self) -> &Shape {
        &self.shape
    }
}

impl DerefMut for ObstacleMut<'_> {
    fn deref_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }
}

impl Drop for ObstacleMut<'_> {
    fn drop(&mut self) {
        self.index.refile(self.id, self.shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngExt, SeedableRng};

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn random_shape(rng: &mut StdRng, allow_points: bool) -> Shape {
        let pos = v(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
        let kinds = if allow_points { 3 } else { 2 };
        match rng.random_range(0..kinds) {
            0 => Shape::circle(pos, rng.random_range(0.2..3.0)),
            1 => Shape::rect(
                pos,
                v(rng.random_range(0.2..6.0), rng.random_range(0.2..6.0)),
            ),
            _ => Shape::point(pos),
        }
    }

    #[test]
    fn rejects_bad_cell_size() {
        assert_eq!(
            SpatialIndex::new(0.0).unwrap_err(),
            SpatialError::InvalidCellSize(0.0)
        );
        assert!(SpatialIndex::new(-1.0).is_err());
        assert!(SpatialIndex::new(f32::NAN).is_err());
    }

    #[test]
    fn cell_size_from_radius_range() {
        let cfg = IndexConfig {
            min_radius: 1.0,
            max_radius: 3.0,
        };
        let index = SpatialIndex::from_config(&cfg).unwrap();
        assert!((index.cell_size() - 2.0 / SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn cells_span_floor_to_ceil() {
        let index = SpatialIndex::new(1.0).unwrap();
        let cells = index.cells_for(&Shape::rect(v(0.5, 0.5), v(1.0, 1.0)).bounds());
        assert_eq!(cells, Range::new(0, 0, 3, 3));
        let cells = index.cells_for(&Shape::point(v(-0.5, 2.0)).bounds());
        assert_eq!(cells, Range::new(-1, 2, 1, 3));
    }

    #[test]
    fn add_remove_prunes_buckets() {
        let mut index = SpatialIndex::new(1.0).unwrap();
        let a = index.add_circle(v(0.0, 0.0), 1.0);
        let b = index.add_rect(v(5.0, 5.0), v(1.0, 1.0));
        assert_eq!(index.len(), 2);
        assert!(index.cell_occupants(Point::new(0, 0)).contains(&a));

        assert!(index.remove(a).is_some());
        assert!(index.remove(a).is_none(), "double remove is a no-op");
        assert!(!index.contains(a));
        assert!(index.cell_occupants(Point::new(0, 0)).is_empty());
        assert_eq!(index.len(), 1);
        // Only the rectangle's cells remain.
        let remaining = index.cells_for(&index.get(b).unwrap().bounds());
        assert_eq!(index.occupied_cells(), remaining.len());
    }

    #[test]
    fn handles_do_not_alias_after_reuse() {
        let mut index = SpatialIndex::new(1.0).unwrap();
        let a = index.add_point(v(1.0, 1.0));
        index.remove(a);
        let b = index.add_point(v(2.0, 2.0));
        assert_ne!(a, b);
        assert!(index.get(a).is_none());
        assert_eq!(index.get(b), Some(&Shape::point(v(2.0, 2.0))));
    }

    #[test]
    fn clear_empties_everything() {
        let mut index = SpatialIndex::new(2.0).unwrap();
        let ids: Vec<_> = (0..10)
            .map(|i| index.add_circle(v(i as f32 * 3.0, 0.0), 1.0))
            .collect();
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.occupied_cells(), 0);
        assert!(ids.iter().all(|&id| !index.contains(id)));
        assert!(!index.overlaps(&Shape::circle(v(0.0, 0.0), 100.0)));
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn point_containment() {
        let mut index = SpatialIndex::new(1.0).unwrap();
        let c = index.add_circle(v(3.0, 3.0), 1.0);
        index.add_rect(v(10.0, 0.0), v(2.0, 2.0));
        assert!(index.contains_point(v(3.5, 3.5)));
        assert!(index.contains_point(v(11.0, 1.0)));
        assert!(!index.contains_point(v(6.0, 6.0)));
        assert_eq!(index.obstacles_at(v(3.0, 2.0)), vec![c]);
    }

    #[test]
    fn obstacle_overlaps_skips_itself() {
        let mut index = SpatialIndex::new(1.0).unwrap();
        let a = index.add_circle(v(0.0, 0.0), 1.0);
        assert!(!index.obstacle_overlaps(a));
        let b = index.add_rect(v(0.5, -0.5), v(2.0, 1.0));
        assert!(index.obstacle_overlaps(a));
        assert!(index.obstacle_overlaps(b));
        assert_eq!(index.query(&Shape::point(v(0.75, 0.0))), vec![a, b]);
    }

    #[test]
    fn moving_a_shape_reindexes_it() {
        let mut index = SpatialIndex::new(1.0).unwrap();
        let id = index.add_circle(v(0.0, 0.0), 0.5);
        let old_probe = Shape::circle(v(0.0, 0.0), 0.25);
        let new_probe = Shape::circle(v(20.0, 20.0), 0.25);
        assert!(index.overlaps(&old_probe));
        assert!(!index.overlaps(&new_probe));

        {
            let mut obstacle = index.get_mut(id).unwrap();
            obstacle.set_position(v(20.0, 20.0));
        }

        assert!(!index.overlaps(&old_probe), "stale hit at old position");
        assert!(index.overlaps(&new_probe), "missed hit at new position");
        assert!(index.cell_occupants(Point::new(0, 0)).is_empty());
        assert!(index.cell_occupants(Point::new(20, 20)).contains(&id));
    }

    #[test]
    fn resizing_a_shape_reindexes_it() {
        let mut index = SpatialIndex::new(1.0).unwrap();
        let c = index.add_circle(v(0.0, 0.0), 0.5);
        let r = index.add_rect(v(0.0, 0.0), v(1.0, 1.0));
        let probe = Shape::point(v(4.0, 0.0));
        assert!(!index.overlaps(&probe));

        assert!(index.get_mut(c).unwrap().set_radius(4.0));
        assert!(index.overlaps(&probe));
        assert_eq!(index.query(&probe), vec![c]);

        assert!(index.get_mut(c).unwrap().set_radius(0.5));
        assert!(index.get_mut(r).unwrap().set_size(v(5.0, 1.0)));
        assert_eq!(index.query(&probe), vec![r]);
    }

    #[test]
    fn agrees_with_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut index = SpatialIndex::from_config(&IndexConfig {
            min_radius: 0.2,
            max_radius: 3.0,
        })
        .unwrap();
        let mut shapes = Vec::new();
        for _ in 0..1000 {
            let s = random_shape(&mut rng, false);
            index.add(s);
            shapes.push(s);
        }
        for i in 0..1000 {
            let q = random_shape(&mut rng, true);
            let expected = shapes.iter().any(|s| s.overlaps(&q));
            assert_eq!(index.overlaps(&q), expected, "query {i}: {q:?}");
        }
    }

    #[test]
    fn agrees_with_brute_force_after_moves() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut index = SpatialIndex::new(1.5).unwrap();
        let ids: Vec<_> = (0..300)
            .map(|_| index.add(random_shape(&mut rng, false)))
            .collect();
        for &id in ids.iter().step_by(2) {
            let delta = v(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
            index.get_mut(id).unwrap().translate(delta);
        }
        for &id in ids.iter().step_by(3) {
            index.remove(id);
        }
        let live: Vec<Shape> = index.iter().map(|(_, s)| *s).collect();
        for _ in 0..500 {
            let q = random_shape(&mut rng, true);
            assert_eq!(index.overlaps(&q), live.iter().any(|s| s.overlaps(&q)));
        }
    }
}
