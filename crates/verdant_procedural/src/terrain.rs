//! # Terrain Generator
//!
//! Turns the height noise into stacked ground cells, one stack per grid column.
//!
//! A column's cells derive from nothing but the pure height function, so
//! generating the same range twice yields the same placements.

use verdant_core::{EntitySink, GameObject, Layer, Tag, Vec2};

use crate::config::{LayerConfig, TerrainConfig, ViewportConfig};
use crate::grid::{column_x, normalize, ColumnSpan, CELL};
use crate::leaf::Behaviour;
use crate::noise::{HeightField, HeightNoise, WorldSeed};

/// Tag of the topmost cell of every column.
pub const SURFACE_TAG: Tag = Tag::new("ground0");

/// Tag of every cell below the surface.
pub const FILL_TAG: Tag = Tag::new("ground");

/// Where a single ground cell goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockPlacement {
    /// Top-left corner.
    pub top_left: Vec2,
    /// Surface or fill.
    pub tag: Tag,
    /// Layer the cell is registered under.
    pub layer: Layer,
}

/// Generates ground cells from height noise.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    /// Height source.
    noise: HeightNoise,
    /// Cells per column.
    depth: u32,
    /// Surface and fill layers.
    layers: LayerConfig,
}

impl TerrainGenerator {
    /// Creates a terrain generator.
    ///
    /// The noise amplitude is `viewport.height * ground_fraction` and its
    /// wavelength reference is the viewport width.
    #[must_use]
    pub fn new(seed: WorldSeed, viewport: &ViewportConfig, terrain: &TerrainConfig, layers: LayerConfig) -> Self {
        let amplitude = f64::from(viewport.height * terrain.ground_fraction);
        let noise = HeightNoise::with_baseline(seed, amplitude, f64::from(viewport.width), terrain.baseline_factor);

        Self {
            noise,
            depth: terrain.depth,
            layers,
        }
    }

    /// Raw ground height at `x`.
    #[must_use]
    pub fn height_at(&self, x: f32) -> f32 {
        self.noise.height_at(x)
    }

    /// Grid-aligned y of the surface cell at `x`.
    #[must_use]
    pub fn surface_at(&self, x: f32) -> f32 {
        normalize(self.height_at(x))
    }

    /// Returns the underlying noise.
    #[must_use]
    pub fn noise(&self) -> &HeightNoise {
        &self.noise
    }

    /// Cells per column.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Placements of one column, surface first.
    pub fn column_blocks(&self, column: i64) -> impl Iterator<Item = BlockPlacement> + '_ {
        let x = column_x(column);
        let top = self.surface_at(x);

        (0..self.depth).map(move |row| {
            #[allow(clippy::cast_precision_loss)]
            let y = top + row as f32 * CELL;
            let (tag, layer) = if row == 0 {
                (SURFACE_TAG, self.layers.surface())
            } else {
                (FILL_TAG, self.layers.fill())
            };
            BlockPlacement {
                top_left: Vec2::new(x, y),
                tag,
                layer,
            }
        })
    }

    /// Registers every cell of every column in `span`.
    ///
    /// Returns the number of cells added.
    pub fn generate_span<S>(&self, span: ColumnSpan, sink: &mut S) -> usize
    where
        S: EntitySink<Behaviour> + ?Sized,
    {
        let mut added = 0;
        for column in span.columns() {
            for block in self.column_blocks(column) {
                let object = GameObject::new(block.top_left, Vec2::new(CELL, CELL), block.tag, Behaviour::Static)
                    .with_solid(true);
                sink.add(object, block.layer);
                added += 1;
            }
        }
        added
    }

    /// Registers the columns covering `[min_x, max_x]`, plus one margin
    /// column on each side. An inverted range adds nothing.
    ///
    /// Returns the number of cells added.
    pub fn generate_range<S>(&self, min_x: f32, max_x: f32, sink: &mut S) -> usize
    where
        S: EntitySink<Behaviour> + ?Sized,
    {
        self.generate_span(ColumnSpan::covering(min_x, max_x), sink)
    }
}

impl HeightField for TerrainGenerator {
    fn height_at(&self, x: f32) -> f32 {
        self.noise.height_at(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_core::Scene;

    fn generator() -> TerrainGenerator {
        TerrainGenerator::new(
            WorldSeed::new(100),
            &ViewportConfig::default(),
            &TerrainConfig::default(),
            LayerConfig::default(),
        )
    }

    #[test]
    fn test_column_layout() {
        let terrain = generator();
        let blocks: Vec<_> = terrain.column_blocks(4).collect();

        assert_eq!(blocks.len(), 20);
        assert_eq!(blocks[0].tag, SURFACE_TAG);
        assert_eq!(blocks[0].layer, LayerConfig::default().surface());
        assert_eq!(blocks[0].top_left, Vec2::new(120.0, terrain.surface_at(120.0)));
        assert!(blocks[1..].iter().all(|b| b.tag == FILL_TAG && b.layer == LayerConfig::default().fill()));

        for pair in blocks.windows(2) {
            assert_eq!(pair[1].top_left.y - pair[0].top_left.y, CELL);
            assert_eq!(pair[1].top_left.x, pair[0].top_left.x);
        }
    }

    #[test]
    fn test_surface_is_grid_aligned() {
        let terrain = generator();
        for i in -50..50 {
            let x = i as f32 * 41.0;
            let surface = terrain.surface_at(x);
            assert_eq!(surface % CELL, 0.0, "surface {surface} at {x} not aligned");
            assert!(surface <= terrain.height_at(x));
            assert!(terrain.height_at(x) - surface < CELL);
        }
    }

    #[test]
    fn test_generate_range_has_margin() {
        let terrain = generator();
        let mut scene: Scene<Behaviour> = Scene::new();

        let added = terrain.generate_range(0.0, 300.0, &mut scene);

        // columns -1..=11
        assert_eq!(added, 13 * 20);
        assert_eq!(scene.layer_len(LayerConfig::default().surface()), 13);
        assert_eq!(scene.layer_len(LayerConfig::default().fill()), 13 * 19);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let terrain = generator();
        let mut scene: Scene<Behaviour> = Scene::new();

        assert_eq!(terrain.generate_range(300.0, 0.0, &mut scene), 0);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_blocks_are_solid_cells() {
        let terrain = generator();
        let mut scene: Scene<Behaviour> = Scene::new();
        terrain.generate_span(ColumnSpan::new(0, 0), &mut scene);

        for (_, _, object) in scene.iter() {
            assert!(object.solid);
            assert_eq!(object.body.dimensions, Vec2::new(CELL, CELL));
            assert!(matches!(object.behaviour, Behaviour::Static));
        }
    }
}
