//! # Scripted Anchor
//!
//! The observer the world streams around. A real game would read the
//! avatar's position; the headless driver moves a point along a script.

use verdant_core::Vec2;
use verdant_procedural::World;

/// How the anchor moves over time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnchorScript {
    /// Stays where it is.
    Idle,
    /// Walks forever at `speed` units per second; negative walks left.
    Walk {
        /// Units per second.
        speed: f32,
    },
    /// Paces between `-amplitude` and `amplitude` at `speed` units per second.
    Oscillate {
        /// Units per second.
        speed: f32,
        /// Turning points are `±amplitude`.
        amplitude: f32,
    },
}

/// A point moved by an [`AnchorScript`].
#[derive(Clone, Debug)]
pub struct ScriptedAnchor {
    script: AnchorScript,
    x: f32,
    /// +1 or -1 while oscillating.
    heading: f32,
}

impl ScriptedAnchor {
    /// Creates an anchor at the origin.
    #[must_use]
    pub fn new(script: AnchorScript) -> Self {
        Self {
            script,
            x: 0.0,
            heading: 1.0,
        }
    }

    /// Builds a script from the CLI's speed and optional oscillation amplitude.
    #[must_use]
    pub fn from_speed(speed: f32, oscillate: Option<f32>) -> Self {
        let script = match oscillate {
            Some(amplitude) if amplitude > 0.0 && speed != 0.0 => AnchorScript::Oscillate {
                speed: speed.abs(),
                amplitude,
            },
            _ if speed == 0.0 => AnchorScript::Idle,
            _ => AnchorScript::Walk { speed },
        };
        Self::new(script)
    }

    /// Current horizontal position.
    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// The script being followed.
    #[must_use]
    pub fn script(&self) -> AnchorScript {
        self.script
    }

    /// Moves the anchor by `dt` seconds and returns the new x.
    pub fn advance(&mut self, dt: f32) -> f32 {
        match self.script {
            AnchorScript::Idle => {}
            AnchorScript::Walk { speed } => self.x += speed * dt,
            AnchorScript::Oscillate { amplitude, .. } if amplitude <= 0.0 => self.x = 0.0,
            AnchorScript::Oscillate { speed, amplitude } => {
                let mut remaining = speed * dt;
                // a long dt may bounce more than once
                while remaining > 0.0 {
                    let edge = amplitude * self.heading;
                    let room = (edge - self.x).abs();
                    if remaining < room {
                        self.x += remaining * self.heading;
                        break;
                    }
                    self.x = edge;
                    remaining -= room;
                    self.heading = -self.heading;
                }
            }
        }
        self.x
    }

    /// Where an observer of `size` stands in `world` at the current x.
    #[must_use]
    pub fn position(&self, world: &World, size: Vec2) -> Vec2 {
        world.spawn_point(self.x, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_never_moves() {
        let mut anchor = ScriptedAnchor::from_speed(0.0, None);
        for _ in 0..10 {
            assert_eq!(anchor.advance(1.0), 0.0);
        }
        assert_eq!(anchor.script(), AnchorScript::Idle);
    }

    #[test]
    fn test_walk_is_linear() {
        let mut anchor = ScriptedAnchor::from_speed(-120.0, None);
        anchor.advance(0.5);
        anchor.advance(0.5);
        assert_eq!(anchor.x(), -120.0);
    }

    #[test]
    fn test_oscillation_turns_at_amplitude() {
        let mut anchor = ScriptedAnchor::from_speed(100.0, Some(250.0));

        assert_eq!(anchor.advance(2.0), 200.0);
        // 50 to the edge, 50 back
        assert_eq!(anchor.advance(1.0), 200.0);
        assert_eq!(anchor.advance(4.0), -200.0);

        let mut max = f32::MIN;
        let mut min = f32::MAX;
        for _ in 0..1_000 {
            let x = anchor.advance(0.37);
            max = max.max(x);
            min = min.min(x);
        }
        assert!(max <= 250.0 && min >= -250.0);
    }

    #[test]
    fn test_long_step_bounces_twice() {
        let mut anchor = ScriptedAnchor::from_speed(100.0, Some(100.0));
        // 100 right, 200 left, 50 right
        assert_eq!(anchor.advance(3.5), -50.0);
    }
}
