//! # Verdant Procedural Generation
//!
//! Deterministic, streamed 2D world: terrain, trees and living leaves.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and column always produce the same content
//! 2. **Column keyed**: Every decision reseeds from `seed + x`, never from call order
//! 3. **Streamed**: Content exists only inside the window around the observer
//! 4. **Self-driven leaves**: Each leaf owns its timers; removing it cancels them
//!
//! ## Core Components
//!
//! - `HeightNoise`: smooth ground height from three seeded sine waves
//! - `TerrainGenerator`: stacked ground cells per column
//! - `TreePlanter`: trunks and leaf grids per column
//! - `Leaf`: attached, falling, dead, respawned
//! - `WorldStreamer`: window growth, generation and eviction
//! - `World`: one frame of all of the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_procedural::{World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default().with_seed(12345))?;
//!
//! // Observer walking right
//! for frame in 0..600 {
//!     world.step(1.0 / 60.0, frame as f32 * 5.0);
//! }
//! assert!(world.window().contains(3000.0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod foliage;
pub mod grid;
pub mod leaf;
pub mod noise;
pub mod streaming;
pub mod terrain;
pub mod world;

pub use config::{
    FoliageConfig, LayerConfig, LeafConfig, TerrainConfig, ViewportConfig, WindowConfig, WindowMode, WorldConfig,
};
pub use error::{WorldError, WorldResult};
pub use foliage::{PlantReport, TreePlan, TreePlanter, TREE_TAG};
pub use grid::{column_of, normalize, ColumnSpan, CELL};
pub use leaf::{Behaviour, Leaf, LeafEvent, LeafOutcome, LeafPhase, SharedRng, LEAF_SIZE, LEAF_TAG};
pub use noise::{HeightField, HeightNoise, WorldSeed};
pub use streaming::{EvictionReport, TickReport, Window, WorldStreamer};
pub use terrain::{BlockPlacement, TerrainGenerator, FILL_TAG, SURFACE_TAG};
pub use world::{FrameReport, World, WorldStats};
