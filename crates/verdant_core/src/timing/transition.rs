//! Value transitions: animate a float from A to B over a period.
//!
//! A transition either runs once and reports completion (the hook for
//! "do this when the fade ends"), loops, or swings back and forth forever.

/// Interpolation curve over normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolator {
    /// Constant rate.
    #[default]
    Linear,
    /// Cubic ease-in-out (slow at both ends).
    Cubic,
}

impl Interpolator {
    /// Applies the curve to a t value (0-1).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Cubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// How a transition behaves after reaching its end value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Stop at the end value and report completion.
    Once,
    /// Jump back to the start value and repeat.
    Loop,
    /// Reverse direction and repeat forever.
    BackAndForth,
}

/// Result of advancing a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStep {
    /// Current value.
    pub value: f32,
    /// True exactly once, on the step a `Once` transition completes.
    pub finished: bool,
    /// Time past the end on the finishing step; zero otherwise.
    pub overshoot: f32,
}

/// A single animated value.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Start value.
    from: f32,
    /// End value.
    to: f32,
    /// Duration of one pass.
    period: f32,
    /// Interpolation curve.
    interpolator: Interpolator,
    /// Repeat behaviour.
    kind: TransitionKind,
    /// Progress through the current pass (0-1).
    progress: f32,
    /// Direction of the current pass (back-and-forth only).
    forward: bool,
    /// Whether a `Once` transition has completed.
    done: bool,
}

impl Transition {
    /// Creates a transition.
    ///
    /// A non-positive period completes the first pass immediately.
    #[must_use]
    pub fn new(from: f32, to: f32, period: f32, interpolator: Interpolator, kind: TransitionKind) -> Self {
        Self {
            from,
            to,
            period,
            interpolator,
            kind,
            progress: 0.0,
            forward: true,
            done: false,
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        let eased = self.interpolator.apply(self.progress);
        let eased = if self.forward { eased } else { 1.0 - eased };
        self.from + (self.to - self.from) * eased
    }

    /// Returns true once a `Once` transition has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done
    }

    /// Returns the repeat behaviour.
    #[must_use]
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Advances the transition by `dt`.
    pub fn advance(&mut self, dt: f32) -> TransitionStep {
        if self.done {
            return TransitionStep {
                value: self.value(),
                finished: false,
                overshoot: 0.0,
            };
        }

        self.progress += if self.period > 0.0 { dt / self.period } else { 1.0 };

        let mut finished = false;
        let mut overshoot = 0.0;
        while self.progress >= 1.0 {
            match self.kind {
                TransitionKind::Once => {
                    overshoot = if self.period > 0.0 { (self.progress - 1.0) * self.period } else { dt.max(0.0) };
                    self.progress = 1.0;
                    self.done = true;
                    finished = true;
                    break;
                }
                TransitionKind::Loop => {
                    self.progress -= 1.0;
                }
                TransitionKind::BackAndForth => {
                    self.progress -= 1.0;
                    self.forward = !self.forward;
                }
            }
            if self.period <= 0.0 {
                self.progress = 0.0;
                break;
            }
        }

        TransitionStep {
            value: self.value(),
            finished,
            overshoot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_cubic_is_symmetric() {
        let curve = Interpolator::Cubic;
        assert!(approx(curve.apply(0.0), 0.0));
        assert!(approx(curve.apply(0.5), 0.5));
        assert!(approx(curve.apply(1.0), 1.0));
        assert!(approx(curve.apply(0.25) + curve.apply(0.75), 1.0));
        assert!(curve.apply(0.1) < Interpolator::Linear.apply(0.1));
    }

    #[test]
    fn test_once_reports_completion_exactly_once() {
        let mut fade = Transition::new(1.0, 0.0, 4.0, Interpolator::Linear, TransitionKind::Once);

        let step = fade.advance(2.0);
        assert!(approx(step.value, 0.5));
        assert!(!step.finished);
        assert_eq!(step.overshoot, 0.0);

        let step = fade.advance(2.5);
        assert!(approx(step.value, 0.0));
        assert!(step.finished);
        assert!(approx(step.overshoot, 0.5));
        assert!(fade.is_complete());

        assert!(!fade.advance(1.0).finished);
    }

    #[test]
    fn test_back_and_forth_reverses() {
        let mut sway = Transition::new(-10.0, 10.0, 2.0, Interpolator::Linear, TransitionKind::BackAndForth);

        assert!(approx(sway.advance(1.0).value, 0.0));
        assert!(approx(sway.advance(1.0).value, 10.0));
        assert!(approx(sway.advance(1.0).value, 0.0));
        assert!(approx(sway.advance(1.0).value, -10.0));
        assert!(!sway.advance(100.0).finished);
    }

    #[test]
    fn test_loop_restarts() {
        let mut spin = Transition::new(0.0, 360.0, 1.0, Interpolator::Linear, TransitionKind::Loop);

        assert!(approx(spin.advance(0.5).value, 180.0));
        assert!(approx(spin.advance(0.75).value, 90.0));
    }

    #[test]
    fn test_zero_period_does_not_spin() {
        let mut snap = Transition::new(0.0, 1.0, 0.0, Interpolator::Linear, TransitionKind::BackAndForth);
        let _ = snap.advance(1.0);
        assert_eq!(snap.kind(), TransitionKind::BackAndForth);
    }
}
