//! # Scene
//!
//! The central container for every live entity.
//! Slots are recycled through a free list; generations make stale ids harmless.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::component::{GameObject, Layer};
use super::entity::EntityId;

/// Registration sink the generators write into.
///
/// Layer and tag values are opaque to the sink.
pub trait EntitySink<B> {
    /// Registers an object under `layer` and returns its id.
    fn add(&mut self, object: GameObject<B>, layer: Layer) -> EntityId;

    /// Removes an object from `layer`.
    ///
    /// Returns `false` if the entity is absent or not in `layer`; never fails.
    fn remove(&mut self, id: EntityId, layer: Layer) -> bool;
}

/// One entity slot.
#[derive(Debug)]
struct Slot<B> {
    /// Generation of the current (or last) occupant.
    generation: u32,
    /// Layer of the current occupant.
    layer: Layer,
    /// The occupant, if alive.
    object: Option<GameObject<B>>,
}

/// The scene - container for all live entities.
///
/// # Example
///
/// ```rust,ignore
/// let mut scene: Scene<()> = Scene::new();
/// let id = scene.add(object, Layer::STATIC_OBJECTS);
/// assert!(scene.is_alive(id));
/// ```
#[derive(Debug)]
pub struct Scene<B> {
    /// All entity slots.
    slots: Vec<Slot<B>>,
    /// Free list of slot indices for reuse.
    free_indices: Vec<u32>,
    /// Slot indices per layer, kept sorted for deterministic iteration.
    layers: BTreeMap<Layer, BTreeSet<u32>>,
    /// Unordered layer pairs whose members collide.
    colliding: HashSet<(Layer, Layer)>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl<B> Default for Scene<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Scene<B> {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty scene with room for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            layers: BTreeMap::new(),
            colliding: HashSet::new(),
            alive_count: 0,
        }
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.alive_count
    }

    /// Returns true if the scene holds no entities.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Adds an object to `layer`, returning its id.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX - 1` slots are ever allocated.
    pub fn add(&mut self, object: GameObject<B>, layer: Layer) -> EntityId {
        let index = if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            // Increment generation to invalidate old references
            slot.generation = slot.generation.wrapping_add(1);
            slot.layer = layer;
            slot.object = Some(object);
            index
        } else {
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|index| *index != u32::MAX)
                .expect("scene slot space exhausted");
            self.slots.push(Slot {
                generation: 0,
                layer,
                object: Some(object),
            });
            index
        };

        self.layers.entry(layer).or_default().insert(index);
        self.alive_count += 1;

        EntityId::new(index, self.slots[index as usize].generation)
    }

    /// Removes an entity from `layer`.
    ///
    /// Returns `false` if the id is null, stale, already removed, or the
    /// entity lives in a different layer.
    pub fn remove(&mut self, id: EntityId, layer: Layer) -> bool {
        self.take(id, layer).is_some()
    }

    /// Removes an entity from `layer` and hands the object back.
    pub fn take(&mut self, id: EntityId, layer: Layer) -> Option<GameObject<B>> {
        let index = self.live_index(id)?;
        let slot = &mut self.slots[index];
        if slot.layer != layer {
            return None;
        }

        let object = slot.object.take()?;
        if let Some(members) = self.layers.get_mut(&layer) {
            members.remove(&id.index());
        }
        self.free_indices.push(id.index());
        self.alive_count -= 1;

        Some(object)
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.live_index(id).is_some()
    }

    /// Gets an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&GameObject<B>> {
        let index = self.live_index(id)?;
        self.slots[index].object.as_ref()
    }

    /// Gets an entity mutably by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GameObject<B>> {
        let index = self.live_index(id)?;
        self.slots[index].object.as_mut()
    }

    /// Returns the layer an entity is registered under.
    #[must_use]
    pub fn layer_of(&self, id: EntityId) -> Option<Layer> {
        let index = self.live_index(id)?;
        Some(self.slots[index].layer)
    }

    /// Iterates over every live entity in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Layer, &GameObject<B>)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let object = slot.object.as_ref()?;
            let index = u32::try_from(index).ok()?;
            Some((EntityId::new(index, slot.generation), slot.layer, object))
        })
    }

    /// Iterates over the live entities of one layer.
    pub fn objects_in_layer(&self, layer: Layer) -> impl Iterator<Item = (EntityId, &GameObject<B>)> {
        self.layers
            .get(&layer)
            .into_iter()
            .flatten()
            .filter_map(move |&index| {
                let slot = &self.slots[index as usize];
                slot.object
                    .as_ref()
                    .map(|object| (EntityId::new(index, slot.generation), object))
            })
    }

    /// Returns the number of live entities in `layer`.
    #[must_use]
    pub fn layer_len(&self, layer: Layer) -> usize {
        self.layers.get(&layer).map_or(0, BTreeSet::len)
    }

    /// Snapshot of every live id, for loops that mutate the scene.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _, _)| id).collect()
    }

    /// Sets whether members of two layers collide with each other.
    pub fn set_layers_collide(&mut self, a: Layer, b: Layer, collide: bool) {
        let key = ordered(a, b);
        if collide {
            self.colliding.insert(key);
        } else {
            self.colliding.remove(&key);
        }
    }

    /// Returns true if members of the two layers collide.
    #[must_use]
    pub fn layers_collide(&self, a: Layer, b: Layer) -> bool {
        self.colliding.contains(&ordered(a, b))
    }

    /// Resolves an id to its slot index if the id is current.
    fn live_index(&self, id: EntityId) -> Option<usize> {
        if id.is_null() {
            return None;
        }
        let index = id.index() as usize;
        let slot = self.slots.get(index)?;
        (slot.object.is_some() && slot.generation == id.generation()).then_some(index)
    }
}

impl<B> EntitySink<B> for Scene<B> {
    fn add(&mut self, object: GameObject<B>, layer: Layer) -> EntityId {
        Scene::add(self, object, layer)
    }

    fn remove(&mut self, id: EntityId, layer: Layer) -> bool {
        Scene::remove(self, id, layer)
    }
}

const fn ordered(a: Layer, b: Layer) -> (Layer, Layer) {
    if a.0 <= b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Tag;
    use crate::geometry::Vec2;

    const ROCK: Tag = Tag::new("rock");

    fn rock(x: f32) -> GameObject<u32> {
        GameObject::new(Vec2::new(x, 0.0), Vec2::ONES, ROCK, 7)
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = Scene::new();
        let id = scene.add(rock(1.0), Layer::STATIC_OBJECTS);

        assert!(scene.is_alive(id));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.layer_of(id), Some(Layer::STATIC_OBJECTS));
        assert_eq!(scene.get(id).map(|o| o.behaviour), Some(7));

        assert!(scene.remove(id, Layer::STATIC_OBJECTS));
        assert!(!scene.is_alive(id));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut scene = Scene::new();
        let id = scene.add(rock(1.0), Layer::STATIC_OBJECTS);

        assert!(scene.remove(id, Layer::STATIC_OBJECTS));
        assert!(!scene.remove(id, Layer::STATIC_OBJECTS));
        assert!(!scene.remove(EntityId::NULL, Layer::STATIC_OBJECTS));
        assert!(!scene.remove(EntityId::new(99, 0), Layer::STATIC_OBJECTS));
    }

    #[test]
    fn test_remove_from_wrong_layer_is_rejected() {
        let mut scene = Scene::new();
        let id = scene.add(rock(1.0), Layer::STATIC_OBJECTS);

        assert!(!scene.remove(id, Layer::DEFAULT));
        assert!(scene.is_alive(id));
    }

    #[test]
    fn test_stale_id_does_not_alias_reused_slot() {
        let mut scene = Scene::new();
        let old = scene.add(rock(1.0), Layer::STATIC_OBJECTS);
        scene.remove(old, Layer::STATIC_OBJECTS);

        let new = scene.add(rock(2.0), Layer::STATIC_OBJECTS);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(scene.get(old).is_none());
        assert!(!scene.remove(old, Layer::STATIC_OBJECTS));
        assert!(scene.is_alive(new));
    }

    #[test]
    fn test_layer_iteration() {
        let mut scene = Scene::new();
        scene.add(rock(1.0), Layer::STATIC_OBJECTS);
        scene.add(rock(2.0), Layer::STATIC_OBJECTS);
        scene.add(rock(3.0), Layer::FOREGROUND);

        assert_eq!(scene.layer_len(Layer::STATIC_OBJECTS), 2);
        assert_eq!(scene.objects_in_layer(Layer::FOREGROUND).count(), 1);
        assert_eq!(scene.objects_in_layer(Layer::DEFAULT).count(), 0);
        assert_eq!(scene.ids().len(), 3);
    }

    #[test]
    fn test_collision_matrix_is_symmetric() {
        let mut scene: Scene<()> = Scene::new();
        scene.set_layers_collide(Layer::DEFAULT, Layer::STATIC_OBJECTS, true);

        assert!(scene.layers_collide(Layer::STATIC_OBJECTS, Layer::DEFAULT));
        scene.set_layers_collide(Layer::STATIC_OBJECTS, Layer::DEFAULT, false);
        assert!(!scene.layers_collide(Layer::DEFAULT, Layer::STATIC_OBJECTS));
    }
}
