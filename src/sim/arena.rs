//! Bounded storage for transient kinematic bodies
//!
//! Bodies are addressed by generational handles. When the arena is full,
//! inserting recycles the oldest live body, so a long session never grows
//! past the configured capacity.

use glam::Vec3;

/// Generational index into a [`BodyArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

/// A point mass advanced under gravity with a simple ground response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Spawn order (lower = older)
    pub seq: u64,
    /// Ground contacts so far
    pub bounces: u32,
}

impl KinematicBody {
    pub fn new(pos: Vec3, vel: Vec3) -> Self {
        Self {
            pos,
            vel,
            seq: 0,
            bounces: 0,
        }
    }

    /// `vy -= g·dt; pos += v·dt`
    #[inline]
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        self.vel.y -= gravity * dt;
        self.pos += self.vel * dt;
    }

    /// Reflect off the ground when below `floor`, resting the body at `rest_y`.
    /// Returns true on contact.
    #[inline]
    pub fn bounce(&mut self, floor: f32, rest_y: f32, restitution: f32) -> bool {
        if self.pos.y < floor {
            self.pos.y = rest_y;
            self.vel.y = -self.vel.y * restitution;
            self.bounces += 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<KinematicBody>,
}

#[derive(Debug, Clone)]
pub struct BodyArena {
    slots: Vec<Slot>,
    capacity: usize,
    next_seq: u64,
    live: usize,
}

impl BodyArena {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            next_seq: 0,
            live: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert a body, recycling the oldest one if full.
    /// Returns the new handle and the evicted body, if any.
    pub fn insert(&mut self, mut body: KinematicBody) -> (BodyHandle, Option<KinematicBody>) {
        body.seq = self.next_seq;
        self.next_seq += 1;

        let (index, evicted) = if let Some(free) = self.slots.iter().position(|s| s.body.is_none()) {
            (free, None)
        } else if self.slots.len() < self.capacity {
            self.slots.push(Slot {
                generation: 0,
                body: None,
            });
            (self.slots.len() - 1, None)
        } else {
            let oldest = self
                .slots
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.body.map(|b| (i, b.seq)))
                .min_by_key(|&(_, seq)| seq)
                .map(|(i, _)| i)
                .unwrap_or(0);
            let slot = &mut self.slots[oldest];
            slot.generation = slot.generation.wrapping_add(1);
            self.live -= 1;
            (oldest, slot.body.take())
        };

        let slot = &mut self.slots[index];
        slot.body = Some(body);
        self.live += 1;

        let handle = BodyHandle {
            index: index as u32,
            generation: slot.generation,
        };
        (handle, evicted)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&KinematicBody> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_ref())
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut KinematicBody> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_mut())
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<KinematicBody> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)?;
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        Some(body)
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.body.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.live = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &KinematicBody> {
        self.slots.iter().filter_map(|s| s.body.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut KinematicBody> {
        self.slots.iter_mut().filter_map(|s| s.body.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32) -> KinematicBody {
        KinematicBody::new(Vec3::new(x, 1.0, 0.0), Vec3::ZERO)
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = BodyArena::new(4);
        let (h, evicted) = arena.insert(body(1.0));
        assert!(evicted.is_none());
        assert_eq!(arena.get(h).unwrap().pos.x, 1.0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_full_arena_recycles_oldest() {
        let mut arena = BodyArena::new(3);
        let (first, _) = arena.insert(body(0.0));
        arena.insert(body(1.0));
        arena.insert(body(2.0));
        let (newest, evicted) = arena.insert(body(3.0));

        assert_eq!(evicted.unwrap().pos.x, 0.0);
        assert_eq!(arena.len(), 3);
        // stale handle no longer resolves
        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(newest).unwrap().pos.x, 3.0);
    }

    #[test]
    fn test_eviction_order_follows_spawn_order() {
        let mut arena = BodyArena::new(2);
        for i in 0..10 {
            arena.insert(body(i as f32));
        }
        let mut xs: Vec<f32> = arena.iter().map(|b| b.pos.x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![8.0, 9.0]);
    }

    #[test]
    fn test_remove_invalidates_handle() {
        let mut arena = BodyArena::new(2);
        let (h, _) = arena.insert(body(0.0));
        assert!(arena.remove(h).is_some());
        assert!(arena.remove(h).is_none());
        assert!(arena.get(h).is_none());
        let (h2, evicted) = arena.insert(body(5.0));
        assert!(evicted.is_none());
        assert_ne!(h, h2);
    }

    #[test]
    fn test_bounce_reflects_and_rests() {
        let mut b = KinematicBody::new(Vec3::new(0.0, -0.02, 0.0), Vec3::new(0.0, -2.0, 0.0));
        assert!(b.bounce(0.0, 0.01, 0.5));
        assert_eq!(b.pos.y, 0.01);
        assert_eq!(b.vel.y, 1.0);
        assert_eq!(b.bounces, 1);
        assert!(!b.bounce(0.0, 0.01, 0.5));
    }
}
