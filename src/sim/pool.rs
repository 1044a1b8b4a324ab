//! Bounded entity pool for hazards and collectibles
//!
//! A fixed set of slots with a free list. Releasing a slot bumps nothing;
//! acquiring one bumps its generation, so an `EntityId` held by the host goes
//! stale the moment its slot is recycled.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::error::SpawnError;

/// What touching an entity does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ends the run
    Hazard,
    /// Scores and disappears
    Collectible,
}

/// Stable handle to a pooled entity (slot + generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub slot: u32,
    pub generation: u32,
}

/// A falling hazard or collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Asset key the host draws this entity with
    pub key: String,
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    /// Degrees
    pub angle: f32,
    /// Degrees per second
    pub angular_vel: f32,
    pub scale: f32,
    /// Half the hitbox edge (base size * scale / 2)
    pub half_size: f32,
    pub active: bool,
}

impl Entity {
    fn vacant(slot: u32) -> Self {
        Self {
            id: EntityId {
                slot,
                generation: 0,
            },
            kind: EntityKind::Hazard,
            key: String::new(),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            angle: 0.0,
            angular_vel: 0.0,
            scale: 1.0,
            half_size: 0.0,
            active: false,
        }
    }

    /// Advance position and spin by `dt` seconds
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.angle = (self.angle + self.angular_vel * dt).rem_euclid(360.0);
    }

    /// Stop all motion in place
    pub fn freeze(&mut self) {
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.half_size))
    }
}

/// Fixed-capacity storage with O(1) acquire/release
#[derive(Debug, Clone)]
pub struct EntityPool {
    slots: Vec<Entity>,
    /// Vacant slot indices; popped from the back
    free: Vec<u32>,
}

impl EntityPool {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity as u32).map(Entity::vacant).collect();
        // Reversed so slot 0 is handed out first
        let free = (0..capacity as u32).rev().collect();
        Self { slots, free }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Activate a vacant slot as a fresh entity of `kind`.
    ///
    /// The caller fills in position, velocity and the rest.
    pub fn acquire(&mut self, kind: EntityKind, key: &str) -> Result<&mut Entity, SpawnError> {
        let slot = self.free.pop().ok_or(SpawnError::PoolExhausted)?;
        let entity = &mut self.slots[slot as usize];
        let generation = entity.id.generation.wrapping_add(1);
        *entity = Entity::vacant(slot);
        entity.id.generation = generation;
        entity.kind = kind;
        entity.key.push_str(key);
        entity.active = true;
        Ok(entity)
    }

    /// Deactivate an entity and return its slot to the free list.
    ///
    /// Returns false (and changes nothing) for stale or already released ids.
    pub fn release(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.active = false;
                entity.freeze();
                self.free.push(id.slot);
                true
            }
            None => false,
        }
    }

    /// Look up a live entity
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.slot as usize)
            .filter(|e| e.active && e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|e| e.active && e.id == id)
    }

    /// Live entities in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|e| e.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter(|e| e.active)
    }

    /// Zero the velocity and spin of every live entity
    pub fn freeze_all(&mut self) {
        for entity in self.iter_active_mut() {
            entity.freeze();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_until_exhausted() {
        let mut pool = EntityPool::new(2);
        assert!(pool.acquire(EntityKind::Hazard, "asteroid").is_ok());
        assert!(pool.acquire(EntityKind::Collectible, "star").is_ok());
        assert_eq!(
            pool.acquire(EntityKind::Hazard, "asteroid").err(),
            Some(SpawnError::PoolExhausted)
        );
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = EntityPool::new(4);
        let id = pool.acquire(EntityKind::Collectible, "fish").unwrap().id;

        assert!(pool.release(id));
        assert!(!pool.release(id));
        assert_eq!(pool.free_count(), 4);
        assert!(pool.get(id).is_none());
    }

    #[test]
    fn test_recycled_slot_gets_new_identity() {
        let mut pool = EntityPool::new(1);
        let first = pool.acquire(EntityKind::Hazard, "asteroid").unwrap().id;
        pool.release(first);
        let second = pool.acquire(EntityKind::Collectible, "bacon").unwrap().id;

        assert_eq!(first.slot, second.slot);
        assert_ne!(first, second);
        // The old handle must not reach the new occupant
        assert!(!pool.release(first));
        assert_eq!(pool.get(second).map(|e| e.key.as_str()), Some("bacon"));
    }

    #[test]
    fn test_active_ids_unique() {
        let mut pool = EntityPool::new(8);
        for _ in 0..8 {
            pool.acquire(EntityKind::Hazard, "asteroid").unwrap();
        }
        let mut ids: Vec<_> = pool.iter_active().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_freeze_all() {
        let mut pool = EntityPool::new(3);
        for _ in 0..3 {
            let e = pool.acquire(EntityKind::Hazard, "asteroid").unwrap();
            e.vel = Vec2::new(20.0, 200.0);
            e.angular_vel = 45.0;
        }
        pool.freeze_all();
        assert!(pool
            .iter_active()
            .all(|e| e.vel == Vec2::ZERO && e.angular_vel == 0.0));
    }

    #[test]
    fn test_integrate() {
        let mut pool = EntityPool::new(1);
        let e = pool.acquire(EntityKind::Hazard, "asteroid").unwrap();
        e.vel = Vec2::new(-60.0, 120.0);
        e.angular_vel = 90.0;
        e.integrate(0.5);
        assert_eq!(e.pos, Vec2::new(-30.0, 60.0));
        assert!((e.angle - 45.0).abs() < 0.001);
    }
}
