//! # World Streaming
//!
//! Keeps the live entity set in sync with a window around the moving anchor.
//!
//! ## Rules
//!
//! 1. When the anchor's lookahead crosses an edge, the window changes by one
//!    increment: both sides grow ([`WindowMode::Symmetric`]) or the window
//!    moves toward the anchor ([`WindowMode::Sliding`]).
//! 2. Newly exposed columns are generated before the eviction scan runs, so
//!    fresh content at the boundary is never evicted by the same tick.
//! 3. Columns that are still populated are never handed to a generator again.
//! 4. Ground cells and trunks belong to their column. A leaf belongs to the x
//!    of its anchor, whichever column its trunk stands on: it is live exactly
//!    while that anchor is inside the window.
//! 5. Eviction is unconditional: nothing is cached. Content that leaves the
//!    window and comes back is regenerated from the seed.

use std::collections::BTreeMap;

use tracing::debug;
use verdant_core::{EntityId, Layer, Scene, Tag, Vec2};

use crate::config::{LayerConfig, WorldConfig};
use crate::foliage::{PlantReport, TreePlanter, TREE_TAG};
use crate::grid::{column_x, ColumnSpan};
use crate::leaf::{Behaviour, Leaf, LEAF_TAG};
use crate::terrain::{TerrainGenerator, FILL_TAG, SURFACE_TAG};

pub use crate::config::WindowMode;

/// The live horizontal range. Both bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    /// Left bound.
    pub min_x: f32,
    /// Right bound.
    pub max_x: f32,
}

impl Window {
    /// Creates a window.
    #[must_use]
    pub const fn new(min_x: f32, max_x: f32) -> Self {
        Self { min_x, max_x }
    }

    /// `[-half_width, half_width]`.
    #[must_use]
    pub fn centered(half_width: f32) -> Self {
        Self::new(-half_width, half_width)
    }

    /// Returns true if `x` lies in the window, bounds included.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f32) -> bool {
        self.min_x <= x && x <= self.max_x
    }

    /// Window width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Grid columns whose x lies in the window.
    #[must_use]
    pub fn columns(&self) -> ColumnSpan {
        ColumnSpan::within(self.min_x, self.max_x)
    }
}

/// Entities removed by one eviction pass, per category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Removed count per tag name.
    pub removed: BTreeMap<&'static str, usize>,
    /// Leaves that drifted out while their anchor stayed inside, replaced
    /// by fresh ones at the anchor.
    pub recalled: usize,
}

impl EvictionReport {
    /// Total entities removed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.removed.values().sum()
    }

    /// Entities removed with `tag`.
    #[must_use]
    pub fn count(&self, tag: Tag) -> usize {
        self.removed.get(tag.name()).copied().unwrap_or(0)
    }
}

/// What one streaming tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// The window before the tick, if it changed.
    pub previous: Option<Window>,
    /// Column spans handed to the generators, in order.
    pub generated: Vec<ColumnSpan>,
    /// Ground cells added.
    pub blocks: usize,
    /// Trees and leaves added.
    pub planted: PlantReport,
    /// Eviction results.
    pub evicted: EvictionReport,
}

impl TickReport {
    /// Returns true if the window moved or grew.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous.is_some()
    }
}

/// Owns the window and the generators that fill it.
#[derive(Debug)]
pub struct WorldStreamer {
    /// Current window.
    window: Window,
    /// Amount the window changes by.
    increment: f32,
    /// Growth behaviour.
    mode: WindowMode,
    /// Columns whose content is currently registered.
    populated: ColumnSpan,
    /// Ground.
    terrain: TerrainGenerator,
    /// Trees and leaves.
    planter: TreePlanter,
    /// Removal layer per category.
    layers: LayerConfig,
}

impl WorldStreamer {
    /// Creates a streamer over the initial window. Nothing is generated
    /// until [`WorldStreamer::populate_initial`].
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        let terrain = TerrainGenerator::new(config.seed, &config.viewport, &config.terrain, config.layers);
        let planter = TreePlanter::new(config.seed, config.foliage, config.leaf, config.layers);

        Self {
            window: Window::centered(config.window.half_width),
            increment: config.window.half_width,
            mode: config.window.mode,
            populated: ColumnSpan::EMPTY,
            terrain,
            planter,
            layers: config.layers,
        }
    }

    /// Current window.
    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Columns currently populated.
    #[must_use]
    pub fn populated(&self) -> ColumnSpan {
        self.populated
    }

    /// Growth behaviour.
    #[must_use]
    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Ground generator.
    #[must_use]
    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    /// Tree generator.
    #[must_use]
    pub fn planter(&self) -> &TreePlanter {
        &self.planter
    }

    /// Generates the initial window, then prunes everything that landed
    /// outside it.
    ///
    /// Ground includes the margin columns. Trunks grow on the window's own
    /// columns; leaves grow wherever their anchor is inside the window, also
    /// from trunks standing outside it.
    pub fn populate_initial(&mut self, scene: &mut Scene<Behaviour>) -> TickReport {
        let window = self.window;
        let columns = window.columns();
        let blocks = self.terrain.generate_range(window.min_x, window.max_x, scene);
        let mut planted = self.plant_trunks(columns, scene);
        planted += self.plant_exposed_leaves(None, window, scene);
        let evicted = self.evict_outside(scene, window);
        self.populated = columns;

        debug!(
            min_x = window.min_x,
            max_x = window.max_x,
            blocks,
            trees = planted.trees,
            leaves = planted.leaves,
            evicted = evicted.total(),
            "initial window populated"
        );

        TickReport {
            previous: None,
            generated: vec![ColumnSpan::covering(window.min_x, window.max_x)],
            blocks,
            planted,
            evicted,
        }
    }

    /// Reacts to the anchor: at most one change per edge, generation first,
    /// then eviction.
    ///
    /// `view_half_width` is how far beyond the anchor the world must exist.
    pub fn tick(&mut self, anchor_x: f32, view_half_width: f32, scene: &mut Scene<Behaviour>) -> TickReport {
        let mut report = TickReport::default();

        if anchor_x + view_half_width > self.window.max_x {
            let next = match self.mode {
                WindowMode::Symmetric => Window::new(self.window.min_x - self.increment, self.window.max_x + self.increment),
                WindowMode::Sliding => Window::new(self.window.min_x + self.increment, self.window.max_x + self.increment),
            };
            self.shift(next, scene, &mut report);
        }

        if anchor_x - view_half_width < self.window.min_x {
            let next = match self.mode {
                WindowMode::Symmetric => Window::new(self.window.min_x - self.increment, self.window.max_x + self.increment),
                WindowMode::Sliding => Window::new(self.window.min_x - self.increment, self.window.max_x - self.increment),
            };
            self.shift(next, scene, &mut report);
        }

        report
    }

    /// Removes every categorized entity outside `window`, from the layer
    /// its category is registered under. Leaves are judged by their anchor,
    /// everything else by its top-left x. Finally recalls stray leaves, see
    /// [`WorldStreamer::recall_strays`].
    ///
    /// Entities with an unknown tag are left alone. Removing twice is a no-op.
    pub fn evict_outside(&self, scene: &mut Scene<Behaviour>, window: Window) -> EvictionReport {
        let doomed: Vec<(EntityId, Tag)> = scene
            .iter()
            .filter(|(_, _, object)| {
                let x = object.behaviour.as_leaf().map_or(object.body.top_left.x, |leaf| leaf.anchor().x);
                !window.contains(x)
            })
            .map(|(id, _, object)| (id, object.tag))
            .collect();

        let mut report = EvictionReport::default();
        for (id, tag) in doomed {
            let Some(layer) = self.layer_for(tag) else {
                continue;
            };
            if scene.remove(id, layer) {
                *report.removed.entry(tag.name()).or_insert(0) += 1;
            }
        }
        report.recalled = self.recall_strays(scene, window);
        report
    }

    /// Replaces every leaf whose body has drifted out of `window` while its
    /// anchor is still inside with a fresh leaf at the anchor. Returns how
    /// many were replaced.
    pub fn recall_strays(&self, scene: &mut Scene<Behaviour>, window: Window) -> usize {
        let leaves = self.layers.leaves();
        let strays: Vec<EntityId> = scene
            .objects_in_layer(leaves)
            .filter(|(_, object)| !window.contains(object.body.top_left.x))
            .filter(|(_, object)| object.behaviour.as_leaf().is_some_and(|leaf| window.contains(leaf.anchor().x)))
            .map(|(id, _)| id)
            .collect();

        let mut recalled = 0;
        for id in strays {
            let Some(object) = scene.take(id, leaves) else {
                continue;
            };
            let Some(leaf) = object.behaviour.as_leaf() else {
                continue;
            };
            scene.add(Leaf::spawn(leaf.anchor(), leaf.rng(), self.planter.leaf_config()), leaves);
            recalled += 1;
        }
        recalled
    }

    /// Layer an entity of `tag` is removed from.
    #[must_use]
    pub fn layer_for(&self, tag: Tag) -> Option<Layer> {
        match tag {
            t if t == SURFACE_TAG => Some(self.layers.surface()),
            t if t == FILL_TAG => Some(self.layers.fill()),
            t if t == TREE_TAG => Some(self.layers.trees()),
            t if t == LEAF_TAG => Some(self.layers.leaves()),
            _ => None,
        }
    }

    fn plant_trunks(&self, span: ColumnSpan, scene: &mut Scene<Behaviour>) -> PlantReport {
        let mut report = PlantReport::default();
        for column in span.columns() {
            if let Some(plan) = self.planter.tree_at(column, &self.terrain) {
                self.planter.plant_trunk(&plan, scene);
                report.trees += 1;
            }
        }
        report
    }

    /// Plants the leaves whose anchor is inside `next` but was not inside
    /// `previous`, from every tree that can reach that range.
    fn plant_exposed_leaves(&self, previous: Option<Window>, next: Window, scene: &mut Scene<Behaviour>) -> PlantReport {
        let reach = self.planter.leaf_reach();
        let exposed: Vec<(f32, f32)> = match previous {
            None => vec![(next.min_x, next.max_x)],
            Some(old) => [
                (next.min_x, old.min_x.min(next.max_x)),
                (old.max_x.max(next.min_x), next.max_x),
            ]
            .into_iter()
            .filter(|(lo, hi)| lo < hi)
            .collect(),
        };

        let mut spans: Vec<ColumnSpan> = Vec::with_capacity(2);
        for (lo, hi) in exposed {
            let span = ColumnSpan::covering(lo - reach, hi + reach);
            match spans.last_mut() {
                Some(last) if span.first <= last.last + 1 => last.last = last.last.max(span.last),
                _ => spans.push(span),
            }
        }

        let admit = |anchor: Vec2| {
            next.contains(anchor.x) && !previous.is_some_and(|old| old.contains(anchor.x))
        };

        let mut report = PlantReport::default();
        for span in spans {
            for column in span.columns() {
                if let Some(old) = previous {
                    let x = column_x(column);
                    if old.min_x <= x - reach && x + reach <= old.max_x {
                        continue;
                    }
                }
                if let Some(plan) = self.planter.tree_at(column, &self.terrain) {
                    report.leaves += self.planter.plant_leaves(plan, admit, scene);
                }
            }
        }
        report
    }

    fn shift(&mut self, next: Window, scene: &mut Scene<Behaviour>, report: &mut TickReport) {
        let previous = self.window;
        let target = next.columns();

        for span in target.difference(self.populated) {
            if span.is_empty() {
                continue;
            }
            report.blocks += self.terrain.generate_span(span, scene);
            report.planted += self.plant_trunks(span, scene);
            report.generated.push(span);
        }
        report.planted += self.plant_exposed_leaves(Some(previous), next, scene);

        self.window = next;
        self.populated = target;

        let evicted = self.evict_outside(scene, next);
        for (tag, count) in &evicted.removed {
            *report.evicted.removed.entry(*tag).or_insert(0) += count;
        }
        report.evicted.recalled += evicted.recalled;
        if report.previous.is_none() {
            report.previous = Some(previous);
        }

        debug!(
            from_min = previous.min_x,
            from_max = previous.max_x,
            to_min = next.min_x,
            to_max = next.max_x,
            evicted = evicted.total(),
            "window changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_core::{GameObject, Vec2};

    fn config(mode: WindowMode) -> WorldConfig {
        let mut config = WorldConfig::default();
        config.window.half_width = 1500.0;
        config.window.lookahead = Some(300.0);
        config.window.mode = mode;
        config
    }

    #[test]
    fn test_window_contains_bounds() {
        let window = Window::new(-100.0, 100.0);
        assert!(window.contains(-100.0));
        assert!(window.contains(100.0));
        assert!(!window.contains(100.01));
        assert_eq!(window.width(), 200.0);
    }

    #[test]
    fn test_initial_population_stays_inside() {
        let config = config(WindowMode::Symmetric);
        let mut streamer = WorldStreamer::new(&config);
        let mut scene = Scene::new();

        let report = streamer.populate_initial(&mut scene);

        assert!(report.blocks > 0);
        assert!(report.evicted.count(SURFACE_TAG) >= 2, "margin columns must be pruned");
        assert!(scene.iter().all(|(_, _, o)| streamer.window().contains(o.body.top_left.x)));
        assert_eq!(streamer.populated(), ColumnSpan::new(-50, 50));
    }

    #[test]
    fn test_no_change_inside_window() {
        let config = config(WindowMode::Symmetric);
        let mut streamer = WorldStreamer::new(&config);
        let mut scene = Scene::new();
        streamer.populate_initial(&mut scene);
        let before = scene.len();

        let report = streamer.tick(0.0, 300.0, &mut scene);

        assert!(!report.changed());
        assert!(report.generated.is_empty());
        assert_eq!(scene.len(), before);
    }

    #[test]
    fn test_symmetric_grows_both_sides() {
        let config = config(WindowMode::Symmetric);
        let mut streamer = WorldStreamer::new(&config);
        let mut scene = Scene::new();
        streamer.populate_initial(&mut scene);

        let report = streamer.tick(1300.0, 300.0, &mut scene);

        assert!(report.changed());
        assert_eq!(streamer.window(), Window::new(-3000.0, 3000.0));
        assert_eq!(report.generated, vec![ColumnSpan::new(-100, -51), ColumnSpan::new(51, 100)]);
        assert_eq!(streamer.populated(), ColumnSpan::new(-100, 100));
    }

    #[test]
    fn test_sliding_moves_toward_anchor() {
        let config = config(WindowMode::Sliding);
        let mut streamer = WorldStreamer::new(&config);
        let mut scene = Scene::new();
        streamer.populate_initial(&mut scene);

        let report = streamer.tick(1300.0, 300.0, &mut scene);

        assert_eq!(streamer.window(), Window::new(0.0, 3000.0));
        assert_eq!(report.generated, vec![ColumnSpan::new(51, 100)]);
        assert!(report.evicted.count(SURFACE_TAG) == 50);
        assert!(scene.iter().all(|(_, _, o)| streamer.window().contains(o.body.top_left.x)));
    }

    #[test]
    fn test_eviction_is_idempotent_and_layer_aware() {
        let config = config(WindowMode::Symmetric);
        let streamer = WorldStreamer::new(&config);
        let mut scene = Scene::new();

        let far = Vec2::new(10_000.0, 0.0);
        let stray = Vec2::new(-10_000.0, 0.0);
        scene.add(
            GameObject::new(far, Vec2::ONES, SURFACE_TAG, Behaviour::Static),
            config.layers.surface(),
        );
        // unknown tags are not the streamer's to remove
        scene.add(
            GameObject::new(stray, Vec2::ONES, Tag::new("avatar"), Behaviour::Static),
            Layer::DEFAULT,
        );

        let window = streamer.window();
        let first = streamer.evict_outside(&mut scene, window);
        let second = streamer.evict_outside(&mut scene, window);

        assert_eq!(first.total(), 1);
        assert_eq!(second.total(), 0);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_leaves_are_judged_by_anchor() {
        use std::cell::RefCell;
        use std::rc::Rc;

        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        use crate::config::LeafConfig;

        let config = config(WindowMode::Symmetric);
        let streamer = WorldStreamer::new(&config);
        let mut scene = Scene::new();
        let rng = Rc::new(RefCell::new(ChaCha8Rng::seed_from_u64(1)));

        // anchor inside, body drifted past the edge
        let mut drifted = Leaf::spawn(Vec2::new(1490.0, 0.0), Rc::clone(&rng), &LeafConfig::default());
        drifted.body.top_left.x = 1600.0;
        let drifted = scene.add(drifted, config.layers.leaves());
        // anchor outside, body inside
        let mut outside = Leaf::spawn(Vec2::new(1600.0, 0.0), rng, &LeafConfig::default());
        outside.body.top_left.x = 1400.0;
        let outside = scene.add(outside, config.layers.leaves());

        let report = streamer.evict_outside(&mut scene, streamer.window());

        assert_eq!(report.count(LEAF_TAG), 1);
        assert_eq!(report.recalled, 1);
        assert!(!scene.is_alive(outside));
        assert!(!scene.is_alive(drifted));
        let (_, leaf) = scene.objects_in_layer(config.layers.leaves()).next().unwrap();
        assert_eq!(leaf.body.top_left, Vec2::new(1490.0, 0.0));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_growth_plants_leaves_of_trees_outside_new_columns() {
        let config = config(WindowMode::Symmetric);
        let mut streamer = WorldStreamer::new(&config);
        let mut scene = Scene::new();
        streamer.populate_initial(&mut scene);
        let before = scene.layer_len(config.layers.leaves());

        let report = streamer.tick(1300.0, 300.0, &mut scene);

        assert_eq!(scene.layer_len(config.layers.leaves()), before + report.planted.leaves);
        assert_eq!(report.evicted.count(LEAF_TAG), 0, "growing never evicts a leaf");
    }

    #[test]
    fn test_layer_for_known_tags() {
        let config = config(WindowMode::Symmetric);
        let streamer = WorldStreamer::new(&config);

        assert_eq!(streamer.layer_for(SURFACE_TAG), Some(config.layers.surface()));
        assert_eq!(streamer.layer_for(FILL_TAG), Some(config.layers.fill()));
        assert_eq!(streamer.layer_for(TREE_TAG), Some(config.layers.trees()));
        assert_eq!(streamer.layer_for(LEAF_TAG), Some(config.layers.leaves()));
        assert_eq!(streamer.layer_for(Tag::new("sun")), None);
    }
}
