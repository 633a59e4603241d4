//! # World
//!
//! One frame of the living world, in a fixed order:
//!
//! 1. Leaf timers and animations advance
//! 2. Velocities integrate
//! 3. Falling leaves touching a surface cell come to rest
//! 4. Dead leaves are replaced by fresh ones at their anchors
//! 5. The streaming window follows the anchor
//! 6. Leaves that drifted out of the window are put back on their anchors
//!
//! Everything runs on the calling thread; nothing suspends.

use tracing::{info, trace};
use verdant_core::{BroadPhase, EntityId, Scene, Vec2};

use crate::config::WorldConfig;
use crate::error::WorldResult;
use crate::grid::{normalize, CELL};
use crate::leaf::{Behaviour, Leaf, LeafOutcome, SharedRng};
use crate::noise::HeightField;
use crate::streaming::{TickReport, Window, WorldStreamer};

/// Broad-phase bucket width for surface contacts.
const CONTACT_BUCKET: f32 = CELL * 4.0;

/// What happened during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Leaves that came to rest on the ground.
    pub landed: usize,
    /// Leaves replaced by a fresh one.
    pub respawned: usize,
    /// Leaves put back on their anchor after drifting out of the window.
    pub recalled: usize,
    /// Streaming results.
    pub tick: TickReport,
}

/// Running totals since the world was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Frames stepped.
    pub frames: u64,
    /// Leaves that came to rest.
    pub landings: u64,
    /// Leaves respawned.
    pub respawns: u64,
    /// Leaves recalled to their anchor.
    pub recalls: u64,
    /// Window changes.
    pub window_changes: u64,
    /// Columns handed to the generators.
    pub columns_generated: u64,
    /// Entities evicted.
    pub evicted: u64,
}

/// The streamed world and its live entities.
#[derive(Debug)]
pub struct World {
    /// Validated configuration.
    config: WorldConfig,
    /// Live entities.
    scene: Scene<Behaviour>,
    /// Window and generators.
    streamer: WorldStreamer,
    /// Time since creation.
    elapsed: f32,
    /// Running totals.
    stats: WorldStats,
}

impl World {
    /// Validates `config`, then generates the initial window.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: WorldConfig) -> WorldResult<Self> {
        config.validate()?;

        let mut scene = Scene::with_capacity(8_192);
        scene.set_layers_collide(config.layers.leaves(), config.layers.surface(), true);

        let mut streamer = WorldStreamer::new(&config);
        let initial = streamer.populate_initial(&mut scene);

        let stats = WorldStats {
            columns_generated: initial.generated.iter().map(|span| span.len()).sum(),
            evicted: initial.evicted.total() as u64,
            ..WorldStats::default()
        };

        info!(
            seed = config.seed.value(),
            mode = ?config.window.mode,
            entities = scene.len(),
            trees = initial.planted.trees,
            "world created"
        );

        Ok(Self {
            config,
            scene,
            streamer,
            elapsed: 0.0,
            stats,
        })
    }

    /// Advances the world by `dt` with the observer at `anchor_x`.
    pub fn step(&mut self, dt: f32, anchor_x: f32) -> FrameReport {
        let mut report = FrameReport::default();
        let leaves = self.config.layers.leaves();
        let leaf_config = self.config.leaf;

        let leaf_ids: Vec<EntityId> = self.scene.objects_in_layer(leaves).map(|(id, _)| id).collect();

        let mut respawns: Vec<(EntityId, Vec2, SharedRng)> = Vec::new();
        for &id in &leaf_ids {
            let Some(object) = self.scene.get_mut(id) else {
                continue;
            };
            let Some(leaf) = object.behaviour.as_leaf_mut() else {
                continue;
            };
            if leaf.update(dt, &mut object.body, &leaf_config) == LeafOutcome::Respawn {
                respawns.push((id, leaf.anchor(), leaf.rng()));
            }
        }

        for &id in &leaf_ids {
            if let Some(object) = self.scene.get_mut(id) {
                object.body.integrate(dt);
            }
        }

        report.landed = self.resolve_ground_contacts(&leaf_ids);

        for (id, anchor, rng) in respawns {
            if self.scene.remove(id, leaves) {
                let new_id = self.scene.add(Leaf::spawn(anchor, rng, &leaf_config), leaves);
                trace!(old = ?id, new = ?new_id, x = anchor.x, y = anchor.y, "leaf respawned");
                report.respawned += 1;
            }
        }

        report.tick = self.streamer.tick(anchor_x, self.config.lookahead(), &mut self.scene);
        let window = self.streamer.window();
        report.recalled = report.tick.evicted.recalled + self.streamer.recall_strays(&mut self.scene, window);

        self.elapsed += dt;
        self.stats.frames += 1;
        self.stats.landings += report.landed as u64;
        self.stats.respawns += report.respawned as u64;
        self.stats.recalls += report.recalled as u64;
        if report.tick.changed() {
            self.stats.window_changes += 1;
        }
        self.stats.columns_generated += report.tick.generated.iter().map(|span| span.len()).sum::<u64>();
        self.stats.evicted += report.tick.evicted.total() as u64;

        report
    }

    /// Airborne leaves overlapping a surface cell come to rest.
    fn resolve_ground_contacts(&mut self, leaf_ids: &[EntityId]) -> usize {
        let leaves = self.config.layers.leaves();
        let surface = self.config.layers.surface();
        if !self.scene.layers_collide(leaves, surface) {
            return 0;
        }

        let airborne: Vec<EntityId> = leaf_ids
            .iter()
            .copied()
            .filter(|&id| {
                self.scene
                    .get(id)
                    .and_then(|object| object.behaviour.as_leaf())
                    .is_some_and(Leaf::is_airborne)
            })
            .collect();
        if airborne.is_empty() {
            return 0;
        }

        let ground = BroadPhase::from_rects(
            CONTACT_BUCKET,
            self.scene
                .objects_in_layer(surface)
                .map(|(id, object)| (id, object.body.rect())),
        );

        let mut landed = 0;
        for id in airborne {
            let Some(object) = self.scene.get_mut(id) else {
                continue;
            };
            if ground.query(&object.body.rect()).is_empty() {
                continue;
            }
            if let Some(leaf) = object.behaviour.as_leaf_mut() {
                if leaf.on_ground_contact(&mut object.body) {
                    landed += 1;
                }
            }
        }
        landed
    }

    /// Top-left corner where a body of `size` stands on the ground at `x`.
    #[must_use]
    pub fn spawn_point(&self, x: f32, size: Vec2) -> Vec2 {
        Vec2::new(x, normalize(self.height_at(x)) - CELL - size.y)
    }

    /// Raw ground height at `x`.
    #[must_use]
    pub fn height_at(&self, x: f32) -> f32 {
        self.streamer.terrain().height_at(x)
    }

    /// Live entities.
    #[must_use]
    pub fn scene(&self) -> &Scene<Behaviour> {
        &self.scene
    }

    /// Live entities, for callers that register their own objects.
    pub fn scene_mut(&mut self) -> &mut Scene<Behaviour> {
        &mut self.scene
    }

    /// Current window.
    #[must_use]
    pub fn window(&self) -> Window {
        self.streamer.window()
    }

    /// Window and generators.
    #[must_use]
    pub fn streamer(&self) -> &WorldStreamer {
        &self.streamer
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Time stepped since creation.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Running totals.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        self.stats
    }
}

impl HeightField for World {
    fn height_at(&self, x: f32) -> f32 {
        self.streamer.terrain().height_at(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorldError;
    use crate::leaf::LEAF_TAG;

    fn small() -> WorldConfig {
        let mut config = WorldConfig::default();
        config.window.half_width = 1200.0;
        config.window.lookahead = Some(400.0);
        config
    }

    #[test]
    fn test_new_populates_window() {
        let world = World::new(small()).unwrap();

        assert!(!world.scene().is_empty());
        assert!(world
            .scene()
            .layers_collide(world.config().layers.surface(), world.config().layers.leaves()));
        assert!(world.stats().columns_generated > 0);
        assert_eq!(world.elapsed(), 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small();
        config.terrain.depth = 0;
        assert!(matches!(World::new(config), Err(WorldError::InvalidConfig(_))));
    }

    #[test]
    fn test_spawn_point_sits_above_surface() {
        let world = World::new(small()).unwrap();
        let size = Vec2::new(40.0, 60.0);

        let spawn = world.spawn_point(95.0, size);

        assert_eq!(spawn.x, 95.0);
        assert_eq!(spawn.y + size.y + CELL, normalize(world.height_at(95.0)));
    }

    #[test]
    fn test_step_counts_frames() {
        let mut world = World::new(small()).unwrap();
        for _ in 0..10 {
            world.step(0.5, 0.0);
        }

        assert_eq!(world.stats().frames, 10);
        assert!((world.elapsed() - 5.0).abs() < 1e-5);
        assert_eq!(world.stats().window_changes, 0);
    }

    #[test]
    fn test_drifting_leaves_never_leave_window() {
        let mut config = small();
        config.leaf.max_life = 10.0;
        config.leaf.fade_out = 300.0;
        config.leaf.falling_sway_speed = 200.0;
        let mut world = World::new(config).unwrap();

        for _ in 0..200 {
            world.step(0.25, 0.0);
            let window = world.window();
            assert!(world
                .scene()
                .iter()
                .all(|(_, _, object)| window.contains(object.body.top_left.x)));
        }
        assert!(world.stats().recalls > 0);
    }

    #[test]
    fn test_fallen_leaves_rest_on_ground() {
        let mut config = small();
        config.leaf.max_life = 1.0;
        config.leaf.fade_out = 1_000.0;
        let mut world = World::new(config).unwrap();

        let mut landed = 0;
        for _ in 0..400 {
            landed += world.step(0.25, 0.0).landed;
        }

        assert!(landed > 0, "no leaf ever reached the ground");
        let resting = world
            .scene()
            .objects_in_layer(world.config().layers.leaves())
            .filter(|(_, object)| object.tag == LEAF_TAG && object.body.velocity == Vec2::ZERO)
            .count();
        assert!(resting > 0);
    }
}
