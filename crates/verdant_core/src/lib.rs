//! # Verdant Core
//!
//! Engine-neutral plumbing shared by the world generators and the frame driver:
//! - Layered entity collection with generational ids
//! - Deferred per-entity tasks and value transitions
//! - 2D geometry and broad-phase contact queries
//!
//! ## Architecture Rules
//!
//! 1. **Single-threaded** - The scene is mutated only from the frame tick
//! 2. **Owned timers** - Every pending task lives inside the entity that scheduled it,
//!    so destroying the entity cancels the task
//! 3. **Idempotent removal** - Removing an absent entity is a no-op
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_core::{GameObject, Layer, Scene, Tag, Vec2};
//!
//! let mut scene: Scene<()> = Scene::new();
//! let id = scene.add(GameObject::new(Vec2::ZERO, Vec2::ONES, Tag::new("rock"), ()), Layer::STATIC_OBJECTS);
//! assert!(scene.remove(id, Layer::STATIC_OBJECTS));
//! assert!(!scene.remove(id, Layer::STATIC_OBJECTS));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod geometry;
pub mod timing;

pub use ecs::{Body, EntityId, EntitySink, GameObject, Layer, Scene, Tag};
pub use geometry::{BroadPhase, Rect, Vec2};
pub use timing::{Interpolator, TaskList, Transition, TransitionKind, TransitionStep};
