//! # World Configuration
//!
//! Every tunable of the generators, the leaf life cycle and the streaming
//! window, loaded from TOML. Each section falls back to its defaults, so an
//! empty file describes the stock world.
//!
//! ```toml
//! seed = 100
//!
//! [viewport]
//! width = 1600.0
//! height = 900.0
//!
//! [window]
//! half_width = 5000.0
//! mode = "sliding"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use verdant_core::Layer;

use crate::error::{WorldError, WorldResult};
use crate::noise::{WorldSeed, DEFAULT_BASELINE_FACTOR};

/// Complete world configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Root of all determinism.
    pub seed: WorldSeed,
    /// Observer's view size.
    pub viewport: ViewportConfig,
    /// Streaming window.
    pub window: WindowConfig,
    /// Ground generation.
    pub terrain: TerrainConfig,
    /// Tree placement.
    pub foliage: FoliageConfig,
    /// Leaf life cycle.
    pub leaf: LeafConfig,
    /// Layer assignment.
    pub layers: LayerConfig,
}

impl WorldConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema or
    /// fails [`WorldConfig::validate`].
    pub fn from_toml_str(text: &str) -> WorldResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> WorldResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Replaces the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = WorldSeed::new(seed);
        self
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> WorldResult<()> {
        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        positive("window.half_width", self.window.half_width)?;
        if let Some(lookahead) = self.window.lookahead {
            non_negative("window.lookahead", lookahead)?;
        }
        if self.window.mode == WindowMode::Sliding && self.window.half_width < 2.0 * self.lookahead() {
            return Err(invalid(format!(
                "window.half_width ({}) must be at least twice the lookahead ({}) when sliding",
                self.window.half_width,
                self.lookahead()
            )));
        }

        if self.terrain.depth == 0 {
            return Err(invalid("terrain.depth must be at least 1".to_owned()));
        }
        positive("terrain.ground_fraction", self.terrain.ground_fraction)?;
        non_negative("terrain.baseline_factor", self.terrain.baseline_factor)?;

        if self.foliage.chance == 0 {
            return Err(invalid("foliage.chance must be at least 1".to_owned()));
        }
        if self.foliage.target >= self.foliage.chance {
            return Err(invalid(format!(
                "foliage.target ({}) must be below foliage.chance ({})",
                self.foliage.target, self.foliage.chance
            )));
        }
        for (name, bound) in [
            ("foliage.extra_height_bound", self.foliage.extra_height_bound),
            ("foliage.leaf_rows_bound", self.foliage.leaf_rows_bound),
            ("foliage.leaf_cols_bound", self.foliage.leaf_cols_bound),
        ] {
            if bound == 0 {
                return Err(invalid(format!("{name} must be at least 1")));
            }
        }

        let leaf = &self.leaf;
        non_negative("leaf.max_life", leaf.max_life)?;
        non_negative("leaf.fade_out", leaf.fade_out)?;
        non_negative("leaf.dead_time", leaf.dead_time)?;
        non_negative("leaf.fall_speed", leaf.fall_speed)?;
        positive("leaf.wait_parameter", leaf.wait_parameter)?;
        positive("leaf.falling_sway_cycle", leaf.falling_sway_cycle)?;
        if leaf.sway_period_range == 0 || leaf.narrow_period_range == 0 {
            return Err(invalid("leaf period ranges must be at least 1".to_owned()));
        }
        if !(0.0..=1.0).contains(&leaf.narrow_fraction) {
            return Err(invalid(format!(
                "leaf.narrow_fraction ({}) must lie in [0, 1]",
                leaf.narrow_fraction
            )));
        }

        Ok(())
    }

    /// Horizontal distance from the anchor that must stay populated.
    #[must_use]
    pub fn lookahead(&self) -> f32 {
        self.window.lookahead.unwrap_or(self.viewport.width)
    }
}

fn invalid(message: String) -> WorldError {
    WorldError::InvalidConfig(message)
}

fn positive<T: Into<f64> + Copy + std::fmt::Display>(name: &str, value: T) -> WorldResult<()> {
    let raw: f64 = value.into();
    if raw.is_finite() && raw > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative<T: Into<f64> + Copy + std::fmt::Display>(name: &str, value: T) -> WorldResult<()> {
    let raw: f64 = value.into();
    if raw.is_finite() && raw >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be non-negative, got {value}")))
    }
}

/// Observer's view size in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// View width; also the terrain's wavelength reference.
    pub width: f32,
    /// View height; the terrain's amplitude derives from it.
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
        }
    }
}

/// How the window reacts when the anchor nears one of its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Grow by the increment on both sides.
    #[default]
    Symmetric,
    /// Move by the increment toward the trigger; the far side shrinks.
    Sliding,
}

/// Streaming window configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial window is `[-half_width, half_width]`; also the growth increment.
    pub half_width: f32,
    /// Distance ahead of the anchor that must stay populated.
    /// Defaults to the viewport width.
    pub lookahead: Option<f32>,
    /// Growth behaviour.
    pub mode: WindowMode,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            half_width: 5000.0,
            lookahead: None,
            mode: WindowMode::Symmetric,
        }
    }
}

/// Ground generation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Stacked cells per column, surface included.
    pub depth: u32,
    /// Noise amplitude as a fraction of the viewport height.
    pub ground_fraction: f32,
    /// Noise baseline as a multiple of the amplitude.
    pub baseline_factor: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            depth: 20,
            ground_fraction: 2.0 / 3.0,
            baseline_factor: DEFAULT_BASELINE_FACTOR,
        }
    }
}

/// Tree placement parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    /// A column draws from `[0, chance)`.
    pub chance: u32,
    /// A tree grows where the draw equals this value.
    pub target: u32,
    /// Trunk height above ground, in cells, before the extra term.
    pub base_trunk_cells: u32,
    /// Extra trunk height is `[0, bound)` cells.
    pub extra_height_bound: u32,
    /// Minimum leaf rows.
    pub min_leaf_rows: u32,
    /// Leaf rows are `min + 2 * [0, bound)`.
    pub leaf_rows_bound: u32,
    /// Minimum leaf columns.
    pub min_leaf_cols: u32,
    /// Leaf columns are `min + 2 * [0, bound)`.
    pub leaf_cols_bound: u32,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            chance: 10,
            target: 0,
            base_trunk_cells: 8,
            extra_height_bound: 7,
            min_leaf_rows: 5,
            leaf_rows_bound: 3,
            min_leaf_cols: 5,
            leaf_cols_bound: 3,
        }
    }
}

/// Leaf life-cycle timing, in time units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafConfig {
    /// Detach happens after `max_life * U[0, 1)`.
    pub max_life: f32,
    /// Fade-out duration once falling.
    pub fade_out: f32,
    /// Delay between fade completion and respawn.
    pub dead_time: f32,
    /// Vertical speed while falling.
    pub fall_speed: f32,
    /// Peak horizontal speed while falling.
    pub falling_sway_speed: f32,
    /// Duration of one horizontal swing while falling.
    pub falling_sway_cycle: f32,
    /// Sway starts after `anchor.y mod wait_parameter`.
    pub wait_parameter: f32,
    /// Lower sway angle bound, in degrees.
    pub min_angle: f32,
    /// Upper sway angle bound, in degrees.
    pub max_angle: f32,
    /// Shortest sway period.
    pub min_sway_period: f32,
    /// Sway period is `min + [0, range)`.
    pub sway_period_range: u32,
    /// Narrowest width as a fraction of the full leaf size.
    pub narrow_fraction: f32,
    /// Shortest narrow period.
    pub min_narrow_period: f32,
    /// Narrow period is `min + [0, range)`.
    pub narrow_period_range: u32,
}

impl Default for LeafConfig {
    fn default() -> Self {
        Self {
            max_life: 600.0,
            fade_out: 40.0,
            dead_time: 5.0,
            fall_speed: 20.0,
            falling_sway_speed: 15.0,
            falling_sway_cycle: 4.0,
            wait_parameter: 10.0,
            min_angle: -30.0,
            max_angle: 30.0,
            min_sway_period: 5.0,
            sway_period_range: 6,
            narrow_fraction: 0.8,
            min_narrow_period: 5.0,
            narrow_period_range: 6,
        }
    }
}

/// Layer assignment per entity category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Surface cells; leaves collide with this layer.
    pub ground_surface: i32,
    /// Cells below the surface.
    pub ground_fill: i32,
    /// Trunks.
    pub trees: i32,
    /// Leaves.
    pub leaves: i32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        let base = Layer::STATIC_OBJECTS;
        Self {
            ground_surface: base.0,
            ground_fill: base.offset(1).0,
            trees: base.offset(10).0,
            leaves: base.offset(50).0,
        }
    }
}

impl LayerConfig {
    /// Surface layer.
    #[must_use]
    pub const fn surface(&self) -> Layer {
        Layer(self.ground_surface)
    }

    /// Fill layer.
    #[must_use]
    pub const fn fill(&self) -> Layer {
        Layer(self.ground_fill)
    }

    /// Trunk layer.
    #[must_use]
    pub const fn trees(&self) -> Layer {
        Layer(self.trees)
    }

    /// Leaf layer.
    #[must_use]
    pub const fn leaves(&self) -> Layer {
        Layer(self.leaves)
    }
}
