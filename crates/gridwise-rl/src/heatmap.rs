//! Heat diffusion over a grid graph.
//!
//! Sources are registered first and the field is rebuilt in one go by
//! [`Heatmap::update`]. Each source spreads heat by a Dijkstra expansion
//! over the graph's edge weights, so walls and expensive terrain shorten
//! its reach. Overlapping sources combine by maximum: a cell's heat is that
//! of its hottest source, never a sum.

use std::ops::ControlFlow;

use gridwise_core::{Point, Range};
use gridwise_paths::{Graph, IndexedMinQueue};

/// How heat falls off with normalised distance `d = distance / radius`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decay {
    /// `intensity × (1 − d)`: reaches zero at the radius.
    #[default]
    Linear,
    /// `intensity / (1 + d)`: half the intensity at the radius.
    Inverse,
    /// `intensity × e^(−2d)`.
    Exponential,
}

impl Decay {
    #[inline]
    pub fn apply(self, intensity: f32, d: f32) -> f32 {
        match self {
            Self::Linear => intensity * (1.0 - d),
            Self::Inverse => intensity / (1.0 + d),
            Self::Exponential => intensity * (-2.0 * d).exp(),
        }
    }
}

/// Heatmap settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeatmapConfig {
    pub decay: Decay,
    /// Floor value given to every cell in range before sources are applied.
    /// Without it, cells no source reaches have no recorded heat.
    pub base_heat: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeatSource {
    pub pos: Point,
    pub intensity: f32,
    /// Maximum path cost the heat travels.
    pub radius: f32,
}

/// A scalar heat field over a rectangle of cells.
#[derive(Debug, Clone)]
pub struct Heatmap {
    range: Range,
    config: HeatmapConfig,
    sources: Vec<HeatSource>,
    heat: Vec<Option<f32>>,
    // Dijkstra scratch, reset per source.
    dist: Vec<f32>,
    touched: Vec<usize>,
    queue: IndexedMinQueue,
}

impl Heatmap {
    pub fn new(range: Range) -> Self {
        Self::with_config(range, HeatmapConfig::default())
    }

    pub fn with_config(range: Range, config: HeatmapConfig) -> Self {
        let len = range.len();
        Self {
            range,
            config,
            sources: Vec::new(),
            heat: vec![None; len],
            dist: vec![f32::INFINITY; len],
            touched: Vec::new(),
            queue: IndexedMinQueue::new(len),
        }
    }

    #[inline]
    pub fn range(&self) -> Range {
        self.range
    }

    /// Change the rectangle. Recorded heat is dropped; sources are kept.
    pub fn set_range(&mut self, range: Range) {
        let len = range.len();
        self.range = range;
        self.heat.clear();
        self.heat.resize(len, None);
        self.dist.clear();
        self.dist.resize(len, f32::INFINITY);
        self.queue.reset(len);
    }

    #[inline]
    pub fn config(&self) -> HeatmapConfig {
        self.config
    }

    /// Takes effect on the next [`update`](Self::update).
    pub fn set_config(&mut self, config: HeatmapConfig) {
        self.config = config;
    }

    /// Register a heat source. Nothing is computed until
    /// [`update`](Self::update).
    pub fn add_heat_source(&mut self, pos: Point, intensity: f32, radius: f32) {
        self.sources.push(HeatSource {
            pos,
            intensity,
            radius,
        });
    }

    pub fn clear_sources(&mut self) {
        self.sources.clear();
    }

    #[inline]
    pub fn sources(&self) -> &[HeatSource] {
        &self.sources
    }

    /// Rebuild the field from the registered sources.
    ///
    /// Sources outside the range are skipped. A source with a non-positive
    /// radius heats only its own cell.
    pub fn update<G: Graph>(&mut self, graph: &G) {
        let _ = self.update_with(graph, |_| ControlFlow::Continue(()));
    }

    /// [`update`](Self::update), calling `visit` with every cell as it is
    /// settled, once per source reaching it. Breaking stops the rebuild
    /// before that cell is heated and leaves the field partly built.
    pub fn update_with<G: Graph>(
        &mut self,
        graph: &G,
        mut visit: impl FnMut(Point) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.heat.fill(self.config.base_heat);
        let mut reached = 0;
        for i in 0..self.sources.len() {
            let src = self.sources[i];
            let Some(si) = self.range.index_of(src.pos) else {
                log::debug!("heatmap: source at {} outside {:?}, skipped", src.pos, self.range);
                continue;
            };
            match self.spread(graph, si, src, &mut visit) {
                ControlFlow::Continue(settled) => reached += settled,
                ControlFlow::Break(()) => {
                    log::debug!("heatmap rebuild aborted at source {i}");
                    return ControlFlow::Break(());
                }
            }
        }
        log::debug!(
            "heatmap rebuilt: {} sources, {reached} cell updates",
            self.sources.len()
        );
        ControlFlow::Continue(())
    }

    /// Dijkstra expansion from one source up to its radius. Yields the
    /// number of cells settled.
    fn spread<G: Graph>(
        &mut self,
        graph: &G,
        si: usize,
        src: HeatSource,
        visit: &mut dyn FnMut(Point) -> ControlFlow<()>,
    ) -> ControlFlow<(), usize> {
        let decay = self.config.decay;
        if src.radius <= 0.0 {
            if visit(src.pos).is_break() {
                return ControlFlow::Break(());
            }
            self.raise(si, decay.apply(src.intensity, 0.0));
            return ControlFlow::Continue(1);
        }

        for i in self.touched.drain(..) {
            self.dist[i] = f32::INFINITY;
        }
        self.queue.clear();
        self.dist[si] = 0.0;
        self.touched.push(si);
        self.queue.push(si, 0.0);

        let mut settled = 0;
        while let Some((ci, d)) = self.queue.pop() {
            let cp = self.range.point_at(ci);
            if visit(cp).is_break() {
                return ControlFlow::Break(());
            }
            settled += 1;
            self.raise(ci, decay.apply(src.intensity, d / src.radius));
            for edge in graph.adjacent(cp) {
                let Some(ni) = self.range.index_of(edge.to) else {
                    continue;
                };
                let nd = d + edge.weight;
                if nd > src.radius || nd >= self.dist[ni] {
                    continue;
                }
                if self.dist[ni].is_infinite() {
                    self.touched.push(ni);
                }
                self.dist[ni] = nd;
                self.queue.push_or_decrease(ni, nd);
            }
        }
        ControlFlow::Continue(settled)
    }

    #[inline]
    fn raise(&mut self, idx: usize, value: f32) {
        let cell = &mut self.heat[idx];
        *cell = Some(cell.map_or(value, |h| h.max(value)));
    }

    /// Recorded heat at `p`, or `None` if no source reached it and there is
    /// no base heat.
    pub fn heat_at(&self, p: Point) -> Option<f32> {
        self.range.index_of(p).and_then(|i| self.heat[i])
    }

    /// Heat at `p`, `0.0` where nothing is recorded.
    pub fn heat(&self, p: Point) -> f32 {
        self.heat_at(p).unwrap_or(0.0)
    }

    /// The adjacent cell with the highest recorded heat, for moving up the
    /// gradient. Ties go to the first neighbour in adjacency order. `None`
    /// if no neighbour has recorded heat.
    pub fn best_direction<G: Graph>(&self, graph: &G, pos: Point) -> Option<Point> {
        let mut best: Option<(Point, f32)> = None;
        for edge in graph.adjacent(pos) {
            let Some(h) = self.heat_at(edge.to) else {
                continue;
            };
            if best.is_none_or(|(_, b)| h > b) {
                best = Some((edge.to, h));
            }
        }
        best.map(|(p, _)| p)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use gridwise_paths::GridGraph;

    use super::*;

    #[test]
    fn config_from_json() {
        let c: HeatmapConfig =
            serde_json::from_str("{\"decay\":\"Exponential\",\"base_heat\":0.5}").unwrap();
        assert_eq!(c.decay, Decay::Exponential);
        assert_eq!(c.base_heat, Some(0.5));
        let c: HeatmapConfig =
            serde_json::from_str("{\"decay\":\"Linear\",\"base_heat\":null}").unwrap();
        assert_eq!(c, HeatmapConfig::default());
    }

    #[test]
    fn saved_sources_rebuild_the_same_field() {
        let graph = GridGraph::bounded(8, 8);
        let mut hm = Heatmap::new(graph.range());
        hm.add_heat_source(Point::new(1, 1), 5.0, 4.0);
        hm.add_heat_source(Point::new(6, 5), 3.0, 2.5);
        hm.update(&graph);

        let json = serde_json::to_string(hm.sources()).unwrap();
        let sources: Vec<HeatSource> = serde_json::from_str(&json).unwrap();
        assert_eq!(sources, hm.sources());

        let mut copy = Heatmap::new(graph.range());
        for s in sources {
            copy.add_heat_source(s.pos, s.intensity, s.radius);
        }
        copy.update(&graph);
        for p in graph.range().iter() {
            assert_eq!(copy.heat_at(p), hm.heat_at(p));
        }
    }
}
