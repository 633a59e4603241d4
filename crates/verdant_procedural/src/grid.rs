//! # Grid
//!
//! Every generated position is aligned to a square cell grid.
//! Columns are addressed by integer index; column `c` starts at world x `c * CELL`.

/// Cell side length in world units.
pub const CELL: f32 = 30.0;

/// Snaps a coordinate down to the cell grid: `floor(x / CELL) * CELL`.
#[inline]
#[must_use]
pub fn normalize(x: f32) -> f32 {
    (x / CELL).floor() * CELL
}

/// Index of the column containing world `x`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn column_of(x: f32) -> i64 {
    (x / CELL).floor() as i64
}

/// World x of a column's left edge.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn column_x(column: i64) -> f32 {
    column as f32 * CELL
}

/// Inclusive range of column indices.
///
/// A span with `first > last` is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColumnSpan {
    /// First column index.
    pub first: i64,
    /// Last column index (inclusive).
    pub last: i64,
}

impl ColumnSpan {
    /// The empty span.
    pub const EMPTY: Self = Self { first: 0, last: -1 };

    /// Creates a span from inclusive bounds.
    #[inline]
    #[must_use]
    pub const fn new(first: i64, last: i64) -> Self {
        Self { first, last }
    }

    /// Columns needed to fully cover `[min_x, max_x]`, plus one margin
    /// column on each side so partially covered edges are materialized.
    ///
    /// `min_x > max_x` or a non-finite bound yields the empty span.
    #[must_use]
    pub fn covering(min_x: f32, max_x: f32) -> Self {
        if !min_x.is_finite() || !max_x.is_finite() || min_x > max_x {
            return Self::EMPTY;
        }
        Self::new(column_of(min_x) - 1, column_of(max_x) + 1)
    }

    /// Columns whose left edge lies inside the closed interval `[min_x, max_x]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn within(min_x: f32, max_x: f32) -> Self {
        if !min_x.is_finite() || !max_x.is_finite() || min_x > max_x {
            return Self::EMPTY;
        }
        Self::new((min_x / CELL).ceil() as i64, column_of(max_x))
    }

    /// Returns true if the span holds no columns.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.first > self.last
    }

    /// Number of columns in the span.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn len(self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.last - self.first) as u64 + 1
        }
    }

    /// Returns true if `column` lies in the span.
    #[inline]
    #[must_use]
    pub const fn contains(self, column: i64) -> bool {
        self.first <= column && column <= self.last
    }

    /// Iterates over the column indices.
    pub fn columns(self) -> impl Iterator<Item = i64> {
        self.first..=self.last
    }

    /// Iterates over the columns' world x.
    pub fn xs(self) -> impl Iterator<Item = f32> {
        self.columns().map(column_x)
    }

    /// Overlap of two spans.
    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        let span = Self::new(self.first.max(other.first), self.last.min(other.last));
        if span.is_empty() {
            Self::EMPTY
        } else {
            span
        }
    }

    /// Columns of `self` not in `other`: at most one span on each side.
    #[must_use]
    pub fn difference(self, other: Self) -> [Self; 2] {
        if self.is_empty() {
            return [Self::EMPTY, Self::EMPTY];
        }
        if other.is_empty() || other.last < self.first || other.first > self.last {
            return [self, Self::EMPTY];
        }

        let left = Self::new(self.first, other.first - 1);
        let right = Self::new(other.last + 1, self.last);
        [
            if left.is_empty() { Self::EMPTY } else { left },
            if right.is_empty() { Self::EMPTY } else { right },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_floors() {
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(29.9), 0.0);
        assert_eq!(normalize(30.0), 30.0);
        assert_eq!(normalize(-0.1), -30.0);
        assert_eq!(normalize(-30.0), -30.0);
        assert_eq!(normalize(-31.0), -60.0);
    }

    #[test]
    fn test_column_of() {
        assert_eq!(column_of(0.0), 0);
        assert_eq!(column_of(59.0), 1);
        assert_eq!(column_of(-1.0), -1);
        assert_eq!(column_x(-2), -60.0);
    }

    #[test]
    fn test_covering_adds_margin() {
        let span = ColumnSpan::covering(0.0, 300.0);
        assert_eq!(span, ColumnSpan::new(-1, 11));
        assert_eq!(span.len(), 13);

        let span = ColumnSpan::covering(-45.0, 45.0);
        assert_eq!(span, ColumnSpan::new(-3, 2));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(ColumnSpan::covering(10.0, -10.0).is_empty());
        assert!(ColumnSpan::within(10.0, -10.0).is_empty());
        assert!(ColumnSpan::covering(f32::NAN, 10.0).is_empty());
        assert_eq!(ColumnSpan::EMPTY.len(), 0);
        assert_eq!(ColumnSpan::EMPTY.columns().count(), 0);
    }

    #[test]
    fn test_within_is_inclusive() {
        assert_eq!(ColumnSpan::within(-5000.0, 5000.0), ColumnSpan::new(-166, 166));
        assert_eq!(ColumnSpan::within(-60.0, 60.0), ColumnSpan::new(-2, 2));
        assert_eq!(ColumnSpan::within(1.0, 29.0).len(), 0);
    }

    #[test]
    fn test_difference() {
        let window = ColumnSpan::new(-10, 10);

        assert_eq!(window.difference(ColumnSpan::new(-5, 5)), [ColumnSpan::new(-10, -6), ColumnSpan::new(6, 10)]);
        assert_eq!(window.difference(ColumnSpan::new(-10, 5)), [ColumnSpan::EMPTY, ColumnSpan::new(6, 10)]);
        assert_eq!(window.difference(ColumnSpan::new(-20, 20)), [ColumnSpan::EMPTY, ColumnSpan::EMPTY]);
        assert_eq!(window.difference(ColumnSpan::new(30, 40)), [window, ColumnSpan::EMPTY]);
        assert_eq!(window.difference(ColumnSpan::EMPTY), [window, ColumnSpan::EMPTY]);
    }

    #[test]
    fn test_intersection() {
        let a = ColumnSpan::new(0, 10);
        assert_eq!(a.intersection(ColumnSpan::new(5, 20)), ColumnSpan::new(5, 10));
        assert!(a.intersection(ColumnSpan::new(11, 20)).is_empty());
    }
}
