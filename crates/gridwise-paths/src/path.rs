use gridwise_core::Point;

/// Result of a path query: the cells from start to goal (both inclusive)
/// and the summed edge cost.
///
/// An unreachable goal yields an empty path with infinite cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    cells: Vec<Point>,
    cost: f32,
}

impl Path {
    pub(crate) fn new(cells: Vec<Point>, cost: f32) -> Self {
        Self { cells, cost }
    }

    /// The empty path returned when the goal cannot be reached.
    pub fn unreachable() -> Self {
        Self {
            cells: Vec::new(),
            cost: f32::INFINITY,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Number of cells, endpoints included.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    #[inline]
    pub fn first(&self) -> Option<Point> {
        self.cells.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<Point> {
        self.cells.last().copied()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, Point>> {
        self.cells.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Point] {
        &self.cells
    }

    pub fn into_vec(self) -> Vec<Point> {
        self.cells
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::unreachable()
    }
}

impl AsRef<[Point]> for Path {
    fn as_ref(&self) -> &[Point] {
        &self.cells
    }
}

impl IntoIterator for Path {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = Point;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Point>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_is_empty_and_infinite() {
        let p = Path::unreachable();
        assert!(p.is_empty());
        assert!(!p.is_reachable());
        assert_eq!(p.cost(), f32::INFINITY);
        assert_eq!(p.first(), None);
        assert_eq!(Path::default(), p);
    }

    #[test]
    fn accessors() {
        let cells = vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)];
        let p = Path::new(cells.clone(), 2.0);
        assert_eq!(p.len(), 3);
        assert_eq!(p.first(), Some(Point::new(0, 0)));
        assert_eq!(p.last(), Some(Point::new(1, 1)));
        assert_eq!(p.iter().collect::<Vec<_>>(), cells);
        assert_eq!((&p).into_iter().count(), 3);
        assert_eq!(p.into_vec(), cells);
    }
}
