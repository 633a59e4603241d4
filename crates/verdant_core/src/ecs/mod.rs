//! # Entity Collection
//!
//! A layered collection of game objects addressed by generational ids.
//!
//! ## Design Philosophy
//!
//! - Entity IDs are slot indices with generation counters
//! - Every object belongs to exactly one layer and carries one tag
//! - Behaviour is a caller-owned payload stored next to the object;
//!   dropping the object drops its behaviour
//! - Removal is idempotent and never panics

mod component;
mod entity;
mod scene;

pub use component::{Body, GameObject, Layer, Tag};
pub use entity::EntityId;
pub use scene::{EntitySink, Scene};
