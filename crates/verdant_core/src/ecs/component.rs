//! # Components
//!
//! Plain data attached to every entity: where it is, what it is,
//! and which layer owns it.

use crate::geometry::{Rect, Vec2};

/// Rendering/collision layer an entity is registered under.
///
/// Layers are opaque integers to the scene. The constants mirror the
/// conventional ordering used by the driver: lower layers are drawn first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer(pub i32);

impl Layer {
    /// Sky and other backdrops.
    pub const BACKGROUND: Self = Self(-200);
    /// Terrain, trees, leaves.
    pub const STATIC_OBJECTS: Self = Self(-100);
    /// Moving actors.
    pub const DEFAULT: Self = Self(0);
    /// Overlays drawn over everything else.
    pub const FOREGROUND: Self = Self(100);

    /// Returns a layer offset from this one.
    #[inline]
    #[must_use]
    pub const fn offset(self, delta: i32) -> Self {
        Self(self.0 + delta)
    }
}

/// Category tag attached to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(&'static str);

impl Tag {
    /// Creates a tag from a static name.
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the tag name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

/// Kinematic state of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Top-left corner in world coordinates (y grows downward).
    pub top_left: Vec2,
    /// Width and height.
    pub dimensions: Vec2,
    /// Velocity in world units per time unit.
    pub velocity: Vec2,
    /// Render angle in degrees.
    pub angle: f32,
    /// Render opacity in [0, 1].
    pub opacity: f32,
}

impl Body {
    /// Creates a resting, fully opaque body.
    #[inline]
    #[must_use]
    pub const fn new(top_left: Vec2, dimensions: Vec2) -> Self {
        Self {
            top_left,
            dimensions,
            velocity: Vec2::ZERO,
            angle: 0.0,
            opacity: 1.0,
        }
    }

    /// Returns the bounding rectangle.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.top_left, self.dimensions)
    }

    /// Moves the body along its velocity.
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.top_left += self.velocity * dt;
    }
}

/// An entity placed in the world.
///
/// `B` is the caller-owned behaviour payload. It is dropped together
/// with the object when the object leaves the scene.
#[derive(Clone, Debug)]
pub struct GameObject<B> {
    /// Kinematic state.
    pub body: Body,
    /// Category tag.
    pub tag: Tag,
    /// Whether actors are blocked by this object.
    pub solid: bool,
    /// Behaviour payload.
    pub behaviour: B,
}

impl<B> GameObject<B> {
    /// Creates a passable object.
    #[must_use]
    pub fn new(top_left: Vec2, dimensions: Vec2, tag: Tag, behaviour: B) -> Self {
        Self {
            body: Body::new(top_left, dimensions),
            tag,
            solid: false,
            behaviour,
        }
    }

    /// Marks the object as blocking.
    #[must_use]
    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Returns the top-left corner.
    #[inline]
    #[must_use]
    pub fn top_left(&self) -> Vec2 {
        self.body.top_left
    }
}
