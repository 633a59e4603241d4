//! # Leaf Life Cycle
//!
//! Every leaf runs its own timer-driven state machine:
//!
//! ```text
//! Attached --(detach timer)--> Falling --(fade done)--> Dead --(dead time)--> respawn
//!                                 |
//!                          ground contact: rest (velocity zeroed, still fading)
//! ```
//!
//! A respawn is a new entity at the original anchor. The world removes the
//! dead one and spawns the replacement; nothing of the old leaf's timing is
//! carried over except the tree's shared generator.
//!
//! All pending timers live in the leaf's own [`TaskList`], so removing the
//! leaf entity from the scene cancels them.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use verdant_core::{Body, GameObject, Interpolator, TaskList, Tag, Transition, TransitionKind, Vec2};

use crate::config::LeafConfig;
use crate::grid::CELL;

/// Tag of every leaf entity.
pub const LEAF_TAG: Tag = Tag::new("leaf");

/// Side length of a leaf.
pub const LEAF_SIZE: f32 = CELL * 0.9;

/// Generator shared by all leaves of one tree, respawns included.
pub type SharedRng = Rc<RefCell<ChaCha8Rng>>;

/// Per-entity behaviour stored in the scene.
#[derive(Debug)]
pub enum Behaviour {
    /// Ground cells and trunks: no behaviour.
    Static,
    /// A leaf and its life cycle.
    Leaf(Box<Leaf>),
}

impl Behaviour {
    /// Returns the leaf, if this is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Static => None,
        }
    }

    /// Returns the leaf mutably, if this is one.
    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Static => None,
        }
    }
}

/// Deferred leaf events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafEvent {
    /// Start swaying and narrowing.
    BeginSway,
    /// Let go of the tree.
    Detach,
    /// Replace this leaf with a fresh one.
    Respawn,
}

/// Life-cycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafPhase {
    /// Hanging on the tree.
    Attached,
    /// Detached and fading.
    Falling {
        /// Came to rest on the ground.
        resting: bool,
    },
    /// Faded out, waiting to respawn.
    Dead,
}

/// What the world has to do after a leaf update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafOutcome {
    /// Nothing.
    Alive,
    /// Remove this leaf and spawn a new one at its anchor.
    Respawn,
}

/// One leaf's life-cycle state.
#[derive(Debug)]
pub struct Leaf {
    /// Where the leaf hangs (and respawns).
    anchor: Vec2,
    /// Current phase.
    phase: LeafPhase,
    /// Pending events.
    tasks: TaskList<LeafEvent>,
    /// Render angle swing.
    sway: Option<Transition>,
    /// Width swing.
    narrow: Option<Transition>,
    /// Horizontal velocity swing while falling.
    fall_sway: Option<Transition>,
    /// Opacity fade while falling.
    fade: Option<Transition>,
    /// The tree's generator.
    rng: SharedRng,
}

impl Leaf {
    /// Builds a leaf game object at `anchor` and schedules its life cycle.
    ///
    /// Sway starts after `anchor.y mod wait_parameter`; the leaf detaches
    /// after `max_life * U[0, 1)`, drawn from the tree's generator.
    #[must_use]
    pub fn spawn(anchor: Vec2, rng: SharedRng, config: &LeafConfig) -> GameObject<Behaviour> {
        let mut tasks = TaskList::new();
        tasks.schedule(anchor.y % config.wait_parameter, LeafEvent::BeginSway);
        let detach_after = config.max_life * rng.borrow_mut().gen::<f32>();
        tasks.schedule(detach_after, LeafEvent::Detach);

        let leaf = Self {
            anchor,
            phase: LeafPhase::Attached,
            tasks,
            sway: None,
            narrow: None,
            fall_sway: None,
            fade: None,
            rng,
        };

        GameObject::new(anchor, Vec2::new(LEAF_SIZE, LEAF_SIZE), LEAF_TAG, Behaviour::Leaf(Box::new(leaf)))
    }

    /// Consumes the draws [`Leaf::spawn`] would make, so the leaves planted
    /// after a skipped one keep the timing they have in a full planting.
    pub fn skip_spawn(rng: &SharedRng) {
        let _: f32 = rng.borrow_mut().gen();
    }

    /// Where the leaf hangs and respawns.
    #[must_use]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> LeafPhase {
        self.phase
    }

    /// Returns true while falling and not yet resting.
    #[must_use]
    pub fn is_airborne(&self) -> bool {
        self.phase == LeafPhase::Falling { resting: false }
    }

    /// Returns true once the sway animations run.
    #[must_use]
    pub fn is_swaying(&self) -> bool {
        self.sway.is_some()
    }

    /// Pending events.
    #[must_use]
    pub fn tasks(&self) -> &TaskList<LeafEvent> {
        &self.tasks
    }

    /// Handle to the tree's generator, for the replacement leaf.
    #[must_use]
    pub fn rng(&self) -> SharedRng {
        Rc::clone(&self.rng)
    }

    /// Advances timers and animations by `dt`, writing their values into `body`.
    ///
    /// A timer that falls due part-way through the step starts its
    /// animations with only the time left in the step, so stage lengths do
    /// not depend on the frame rate.
    pub fn update(&mut self, dt: f32, body: &mut Body, config: &LeafConfig) -> LeafOutcome {
        let fired = self.tasks.advance_timed(dt);

        // animations already running see the whole step
        self.apply_sway(dt, body);
        let mut respawn = self.apply_fall(dt, body, config);

        for (event, late) in fired {
            match event {
                LeafEvent::BeginSway => {
                    self.begin_sway(config);
                    self.apply_sway(late, body);
                }
                LeafEvent::Detach => {
                    if self.detach(body, config) {
                        respawn |= self.apply_fall(late, body, config);
                    }
                }
                LeafEvent::Respawn => respawn = true,
            }
        }

        if respawn {
            LeafOutcome::Respawn
        } else {
            LeafOutcome::Alive
        }
    }

    /// Ground contact: a falling leaf stops and stops swinging sideways.
    ///
    /// Returns true if the leaf came to rest.
    pub fn on_ground_contact(&mut self, body: &mut Body) -> bool {
        if !self.is_airborne() {
            return false;
        }
        body.velocity = Vec2::ZERO;
        self.fall_sway = None;
        self.phase = LeafPhase::Falling { resting: true };
        true
    }

    fn begin_sway(&mut self, config: &LeafConfig) {
        let mut rng = self.rng.borrow_mut();

        let from = config.min_angle * rng.gen::<f32>();
        let to = config.max_angle * rng.gen::<f32>();
        let period = config.min_sway_period + period_offset(&mut rng, config.sway_period_range);
        self.sway = Some(Transition::new(
            from,
            to,
            period,
            Interpolator::Linear,
            TransitionKind::BackAndForth,
        ));

        let period = config.min_narrow_period + period_offset(&mut rng, config.narrow_period_range);
        self.narrow = Some(Transition::new(
            LEAF_SIZE,
            LEAF_SIZE * config.narrow_fraction,
            period,
            Interpolator::Linear,
            TransitionKind::BackAndForth,
        ));
    }

    fn apply_sway(&mut self, elapsed: f32, body: &mut Body) {
        if let Some(sway) = self.sway.as_mut() {
            body.angle = sway.advance(elapsed).value;
        }
        if let Some(narrow) = self.narrow.as_mut() {
            body.dimensions.x = narrow.advance(elapsed).value;
        }
    }

    /// Returns true if the leaf died long enough ago to respawn already.
    fn apply_fall(&mut self, elapsed: f32, body: &mut Body, config: &LeafConfig) -> bool {
        if let Some(fall_sway) = self.fall_sway.as_mut() {
            body.velocity.x = fall_sway.advance(elapsed).value;
        }
        let Some(fade) = self.fade.as_mut() else {
            return false;
        };
        let step = fade.advance(elapsed);
        body.opacity = step.value;
        step.finished && self.die(step.overshoot, config)
    }

    /// Returns false if the leaf was no longer attached.
    fn detach(&mut self, body: &mut Body, config: &LeafConfig) -> bool {
        if self.phase != LeafPhase::Attached {
            return false;
        }
        self.phase = LeafPhase::Falling { resting: false };
        body.velocity.y = config.fall_speed;
        self.fall_sway = Some(Transition::new(
            config.falling_sway_speed,
            -config.falling_sway_speed,
            config.falling_sway_cycle,
            Interpolator::Cubic,
            TransitionKind::BackAndForth,
        ));
        self.fade = Some(Transition::new(
            1.0,
            0.0,
            config.fade_out,
            Interpolator::Linear,
            TransitionKind::Once,
        ));
        true
    }

    /// `overshoot` is how long ago the fade ended. Returns true if the
    /// dead time has already run out.
    fn die(&mut self, overshoot: f32, config: &LeafConfig) -> bool {
        self.phase = LeafPhase::Dead;
        self.fade = None;
        let wait = config.dead_time - overshoot;
        if wait <= 0.0 {
            return true;
        }
        self.tasks.schedule(wait, LeafEvent::Respawn);
        false
    }
}

#[allow(clippy::cast_precision_loss)]
fn period_offset(rng: &mut ChaCha8Rng, range: u32) -> f32 {
    rng.gen_range(0..range.max(1)) as f32
}
