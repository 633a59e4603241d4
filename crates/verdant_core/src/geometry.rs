//! # Geometry
//!
//! 2D vectors, axis-aligned rectangles and a bucketed broad phase
//! for overlap queries between one moving object and a static layer.

use std::collections::HashMap;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::ecs::EntityId;

/// 2D Vector - position, size, velocity
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component (grows downward)
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// (1, 1)
    pub const ONES: Self = Self::new(1.0, 1.0);

    /// Creates a new Vec2
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns a copy with a different x.
    #[inline]
    #[must_use]
    pub const fn with_x(self, x: f32) -> Self {
        Self::new(x, self.y)
    }

    /// Returns a copy with a different y.
    #[inline]
    #[must_use]
    pub const fn with_y(self, y: f32) -> Self {
        Self::new(self.x, y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub top_left: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle.
    #[inline]
    #[must_use]
    pub const fn new(top_left: Vec2, size: Vec2) -> Self {
        Self { top_left, size }
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.top_left.x + self.size.x
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top_left.y + self.size.y
    }

    /// Returns true if the two rectangles overlap.
    ///
    /// Rectangles that only share an edge do not overlap.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.top_left.x < other.right()
            && other.top_left.x < self.right()
            && self.top_left.y < other.bottom()
            && other.top_left.y < self.bottom()
    }
}

/// Horizontal bucket grid over a set of rectangles.
///
/// Built once per frame from a static layer, then queried by every
/// moving object. Rectangles wider than a bucket are entered into
/// every bucket they touch.
#[derive(Debug)]
pub struct BroadPhase {
    /// Bucket width in world units.
    bucket_width: f32,
    /// Entries per bucket index.
    buckets: HashMap<i64, Vec<(EntityId, Rect)>>,
}

impl BroadPhase {
    /// Creates an empty broad phase.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_width` is not strictly positive.
    #[must_use]
    pub fn new(bucket_width: f32) -> Self {
        assert!(bucket_width > 0.0, "Bucket width must be greater than zero");
        Self {
            bucket_width,
            buckets: HashMap::new(),
        }
    }

    /// Builds a broad phase from `(id, rect)` pairs.
    #[must_use]
    pub fn from_rects(bucket_width: f32, rects: impl IntoIterator<Item = (EntityId, Rect)>) -> Self {
        let mut phase = Self::new(bucket_width);
        for (id, rect) in rects {
            phase.insert(id, rect);
        }
        phase
    }

    /// Indexes one rectangle.
    pub fn insert(&mut self, id: EntityId, rect: Rect) {
        for bucket in self.bucket_range(&rect) {
            self.buckets.entry(bucket).or_default().push((id, rect));
        }
    }

    /// Returns the number of distinct buckets in use.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns every indexed entity overlapping `rect`, without duplicates.
    #[must_use]
    pub fn query(&self, rect: &Rect) -> Vec<EntityId> {
        let mut hits: Vec<EntityId> = Vec::new();
        for bucket in self.bucket_range(rect) {
            let Some(entries) = self.buckets.get(&bucket) else {
                continue;
            };
            for (id, candidate) in entries {
                if candidate.intersects(rect) && !hits.contains(id) {
                    hits.push(*id);
                }
            }
        }
        hits
    }

    #[allow(clippy::cast_possible_truncation)]
    fn bucket_range(&self, rect: &Rect) -> std::ops::RangeInclusive<i64> {
        let first = (rect.top_left.x / self.bucket_width).floor() as i64;
        let last = (rect.right() / self.bucket_width).floor() as i64;
        first..=last.max(first)
    }
}
