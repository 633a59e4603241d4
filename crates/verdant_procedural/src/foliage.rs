//! # Foliage Placement
//!
//! Decides per grid column whether a tree grows there and builds its trunk
//! and leaf grid.
//!
//! Every column reseeds its own generator from `seed + x` before deciding
//! anything, so a column regenerated after eviction grows the same tree with
//! the same leaves no matter which range or order it was requested in.
//!
//! Leaves reach past their trunk's column. Trunks and leaves can therefore
//! be planted separately: the streamer plants a trunk with its column and a
//! leaf with the x of its anchor.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use verdant_core::{EntitySink, GameObject, Tag, Vec2};

use crate::config::{FoliageConfig, LayerConfig, LeafConfig};
use crate::grid::{column_x, normalize, ColumnSpan, CELL};
use crate::leaf::{Behaviour, Leaf, LEAF_SIZE};
use crate::noise::{HeightField, WorldSeed};

/// Tag of every trunk.
pub const TREE_TAG: Tag = Tag::new("tree");

/// A tree decided for one column, before it is registered.
#[derive(Clone, Debug)]
pub struct TreePlan {
    /// Column index.
    pub column: i64,
    /// Trunk top-left corner.
    pub trunk_top_left: Vec2,
    /// Trunk width and height.
    pub trunk_size: Vec2,
    /// Whether the trunk blocks movement.
    pub solid: bool,
    /// Leaf grid rows (horizontal count).
    pub rows: u32,
    /// Leaf grid columns (vertical count).
    pub cols: u32,
    /// The column's generator, positioned after the tree's own draws.
    /// Its leaves keep drawing from it.
    rng: ChaCha8Rng,
}

impl TreePlan {
    /// Top-left corners of every leaf, row by row.
    ///
    /// The grid is centered horizontally on the trunk's x and vertically on
    /// the trunk's top.
    pub fn leaf_anchors(&self) -> impl Iterator<Item = Vec2> {
        let half_rows = (self.rows.saturating_sub(1) / 2) as f32;
        let half_cols = (self.cols.saturating_sub(1) / 2) as f32;
        let start_x = (self.trunk_top_left.x - half_rows * LEAF_SIZE).trunc();
        let start_y = (self.trunk_top_left.y - half_cols * LEAF_SIZE).trunc();
        let cols = self.cols;

        (0..self.rows).flat_map(move |row| {
            (0..cols).map(move |col| {
                Vec2::new(start_x + row as f32 * LEAF_SIZE, start_y + col as f32 * LEAF_SIZE)
            })
        })
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        (self.rows * self.cols) as usize
    }
}

/// Counts of what a planting pass registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlantReport {
    /// Trunks added.
    pub trees: usize,
    /// Leaves added.
    pub leaves: usize,
}

impl std::ops::AddAssign for PlantReport {
    fn add_assign(&mut self, rhs: Self) {
        self.trees += rhs.trees;
        self.leaves += rhs.leaves;
    }
}

/// Places trees column by column.
#[derive(Clone, Debug)]
pub struct TreePlanter {
    /// World seed.
    seed: WorldSeed,
    /// Placement parameters.
    foliage: FoliageConfig,
    /// Life cycle of the leaves it spawns.
    leaf: LeafConfig,
    /// Trunk and leaf layers.
    layers: LayerConfig,
}

impl TreePlanter {
    /// Creates a planter.
    #[must_use]
    pub fn new(seed: WorldSeed, foliage: FoliageConfig, leaf: LeafConfig, layers: LayerConfig) -> Self {
        Self {
            seed,
            foliage,
            leaf,
            layers,
        }
    }

    /// Life cycle given to the leaves it spawns.
    #[must_use]
    pub fn leaf_config(&self) -> &LeafConfig {
        &self.leaf
    }

    /// Decides the tree of one column, if any.
    ///
    /// Pure in `(seed, column, heights)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tree_at<H>(&self, column: i64, heights: &H) -> Option<TreePlan>
    where
        H: HeightField + ?Sized,
    {
        let x = column_x(column);
        #[allow(clippy::cast_possible_truncation)]
        let mut rng = self.seed.column_rng(x as i64);

        if rng.gen_range(0..self.foliage.chance) != self.foliage.target {
            return None;
        }

        let extra = rng.gen_range(0..self.foliage.extra_height_bound) as f32 * CELL;
        let base = self.foliage.base_trunk_cells as f32 * CELL;
        let top = normalize(heights.height_at(x)) - base - extra;
        let solid = rng.gen_bool(0.5);
        let rows = self.foliage.min_leaf_rows + 2 * rng.gen_range(0..self.foliage.leaf_rows_bound);
        let cols = self.foliage.min_leaf_cols + 2 * rng.gen_range(0..self.foliage.leaf_cols_bound);

        Some(TreePlan {
            column,
            trunk_top_left: Vec2::new(x, top),
            trunk_size: Vec2::new(CELL, base + extra),
            solid,
            rows,
            cols,
            rng,
        })
    }

    /// Registers a planned tree: the trunk, then its leaves.
    ///
    /// The leaves share the column's generator for the rest of their lives.
    pub fn plant<S>(&self, plan: TreePlan, sink: &mut S) -> PlantReport
    where
        S: EntitySink<Behaviour> + ?Sized,
    {
        self.plant_trunk(&plan, sink);
        let leaves = self.plant_leaves(plan, |_| true, sink);
        PlantReport { trees: 1, leaves }
    }

    /// Registers the trunk of a planned tree.
    pub fn plant_trunk<S>(&self, plan: &TreePlan, sink: &mut S)
    where
        S: EntitySink<Behaviour> + ?Sized,
    {
        let trunk = GameObject::new(plan.trunk_top_left, plan.trunk_size, TREE_TAG, Behaviour::Static)
            .with_solid(plan.solid);
        sink.add(trunk, self.layers.trees());
    }

    /// Registers the leaves whose anchor passes `admit`, returning how many.
    ///
    /// A skipped leaf still consumes its draws, so each leaf's timing is the
    /// same whichever subset is planted.
    pub fn plant_leaves<S, F>(&self, plan: TreePlan, admit: F, sink: &mut S) -> usize
    where
        S: EntitySink<Behaviour> + ?Sized,
        F: Fn(Vec2) -> bool,
    {
        let anchors: Vec<Vec2> = plan.leaf_anchors().collect();
        let rng = Rc::new(RefCell::new(plan.rng));

        let mut planted = 0;
        for anchor in anchors {
            if admit(anchor) {
                sink.add(Leaf::spawn(anchor, Rc::clone(&rng), &self.leaf), self.layers.leaves());
                planted += 1;
            } else {
                Leaf::skip_spawn(&rng);
            }
        }
        planted
    }

    /// Farthest horizontal distance between a trunk's x and any of its
    /// leaf anchors, rounded up.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn leaf_reach(&self) -> f32 {
        let max_rows = self.foliage.min_leaf_rows + 2 * self.foliage.leaf_rows_bound.saturating_sub(1);
        (max_rows as f32 * LEAF_SIZE).ceil() + 1.0
    }

    /// Plants every tree in `span`.
    pub fn plant_span<S, H>(&self, span: ColumnSpan, heights: &H, sink: &mut S) -> PlantReport
    where
        S: EntitySink<Behaviour> + ?Sized,
        H: HeightField + ?Sized,
    {
        let mut report = PlantReport::default();
        for column in span.columns() {
            if let Some(plan) = self.tree_at(column, heights) {
                report += self.plant(plan, sink);
            }
        }
        report
    }

    /// Plants the columns covering `[min_x, max_x]` plus one margin column
    /// on each side. An inverted range plants nothing.
    pub fn generate_range<S, H>(&self, min_x: f32, max_x: f32, heights: &H, sink: &mut S) -> PlantReport
    where
        S: EntitySink<Behaviour> + ?Sized,
        H: HeightField + ?Sized,
    {
        self.plant_span(ColumnSpan::covering(min_x, max_x), heights, sink)
    }

    /// Columns in `span` that grow a tree.
    pub fn tree_columns<'a, H>(&'a self, span: ColumnSpan, heights: &'a H) -> impl Iterator<Item = i64> + 'a
    where
        H: HeightField + ?Sized,
    {
        span.columns()
            .filter(move |&column| self.tree_at(column, heights).is_some())
    }
}
