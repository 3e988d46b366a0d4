//! Obstacle shapes and their overlap predicates.
//!
//! Three kinds of shape are supported: zero-area points, circles and
//! axis-aligned rectangles. Every pairing has a symmetric overlap test.
//! All tests are boundary-inclusive, so shapes that merely touch overlap.

use glam::Vec2;

/// Axis-aligned bounding region in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    #[inline]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    #[inline]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        let r = Vec2::splat(self.radius);
        Bounds::new(self.center - r, self.center + r)
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }
}

/// An axis-aligned rectangle; `origin` is its minimum corner.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// A rectangle from its minimum corner and size. Negative extents are
    /// folded back so that `origin` stays the minimum corner.
    #[inline]
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        let b = Bounds::new(origin, origin + size);
        Self {
            origin: b.min,
            size: b.max - b.min,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.origin, self.origin + self.size)
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.bounds().contains(p)
    }

    /// Closest point of the rectangle to `p`.
    #[inline]
    fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.origin, self.origin + self.size)
    }
}

/// Discriminant of a [`Shape`], used to batch same-kind overlap tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Circle,
    Rect,
}

/// An obstacle shape.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Point(Vec2),
    Circle(Circle),
    Rect(Rect),
}

impl Shape {
    #[inline]
    pub fn point(p: Vec2) -> Self {
        Self::Point(p)
    }

    #[inline]
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle(Circle::new(center, radius))
    }

    #[inline]
    pub fn rect(origin: Vec2, size: Vec2) -> Self {
        Self::Rect(Rect::new(origin, size))
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Point(_) => ShapeKind::Point,
            Self::Circle(_) => ShapeKind::Circle,
            Self::Rect(_) => ShapeKind::Rect,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Point(p) => Bounds::new(*p, *p),
            Self::Circle(c) => c.bounds(),
            Self::Rect(r) => r.bounds(),
        }
    }

    /// The shape's anchor: the point itself, the circle's center or the
    /// rectangle's minimum corner.
    #[inline]
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Point(p) => *p,
            Self::Circle(c) => c.center,
            Self::Rect(r) => r.origin,
        }
    }

    /// Move the anchor to `pos`.
    pub fn set_position(&mut self, pos: Vec2) {
        match self {
            Self::Point(p) => *p = pos,
            Self::Circle(c) => c.center = pos,
            Self::Rect(r) => r.origin = pos,
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        let pos = self.position() + delta;
        self.set_position(pos);
    }

    /// Change a circle's radius. Returns `false` for other kinds.
    pub fn set_radius(&mut self, radius: f32) -> bool {
        match self {
            Self::Circle(c) => {
                c.radius = radius.abs();
                true
            }
            _ => false,
        }
    }

    /// Change a rectangle's size, keeping its origin. Returns `false` for
    /// other kinds.
    pub fn set_size(&mut self, size: Vec2) -> bool {
        match self {
            Self::Rect(r) => {
                *r = Rect::new(r.origin, size);
                true
            }
            _ => false,
        }
    }

    /// Whether `p` lies inside (or on the boundary of) the shape.
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        match self {
            Self::Point(q) => *q == p,
            Self::Circle(c) => c.contains_point(p),
            Self::Rect(r) => r.contains_point(p),
        }
    }

    /// Symmetric overlap test against any other shape.
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (self, other) {
            (Self::Point(p), s) | (s, Self::Point(p)) => s.contains_point(*p),
            (Self::Circle(a), Self::Circle(b)) => {
                let r = a.radius + b.radius;
                a.center.distance_squared(b.center) <= r * r
            }
            (Self::Rect(a), Self::Rect(b)) => a.bounds().intersects(&b.bounds()),
            (Self::Circle(c), Self::Rect(r)) | (Self::Rect(r), Self::Circle(c)) => {
                c.contains_point(r.clamp(c.center))
            }
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Rect> for Shape {
    fn from(r: Rect) -> Self {
        Self::Rect(r)
    }
}
