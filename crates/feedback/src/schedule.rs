use blockspace_common::EntityId;
use blockspace_kernel::Scene;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Expiry {
    due: Duration,
    seq: u64,
    entity: EntityId,
}

/// Pending marker removals ordered by due time.
///
/// Entries reference entities by id only. Ties on `due` fire in
/// scheduling order.
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    heap: BinaryHeap<Reverse<Expiry>>,
    next_seq: u64,
}

impl ExpiryQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `entity` once the clock reaches `due`.
    pub fn schedule(&mut self, entity: EntityId, due: Duration) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Expiry { due, seq, entity }));
    }

    /// Entries not yet taken.
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    /// Earliest scheduled removal time.
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(e)| e.due)
    }

    /// Pop every entry due at or before `now`.
    pub fn take_due(&mut self, now: Duration) -> Vec<EntityId> {
        let mut due = Vec::new();
        while let Some(Reverse(head)) = self.heap.peek() {
            if head.due > now {
                break;
            }
            due.push(head.entity);
            self.heap.pop();
        }
        due
    }

    /// Despawn every due entity still present in `scene`.
    ///
    /// Returns how many were actually removed.
    pub fn expire(&mut self, scene: &mut Scene, now: Duration) -> usize {
        let mut removed = 0;
        for entity in self.take_due(now) {
            if scene.despawn(entity).is_some() {
                tracing::trace!(entity = %entity.short(), "feedback expired");
                removed += 1;
            } else {
                tracing::trace!(entity = %entity.short(), "feedback already gone");
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockspace_common::{BlockType, Transform};
    use blockspace_kernel::EntityKind;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn take_due_respects_time_and_order() {
        let mut q = ExpiryQueue::new();
        let a = EntityId::new();
        let b = EntityId::new();
        let c = EntityId::new();
        q.schedule(a, ms(500));
        q.schedule(b, ms(300));
        q.schedule(c, ms(300));

        assert_eq!(q.next_due(), Some(ms(300)));
        assert!(q.take_due(ms(299)).is_empty());
        assert_eq!(q.take_due(ms(300)), vec![b, c]);
        assert_eq!(q.pending(), 1);
        assert_eq!(q.take_due(ms(10_000)), vec![a]);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn expire_skips_entities_already_removed() {
        let mut scene = Scene::new();
        let kept = scene
            .spawn(EntityKind::Block(BlockType::Grass), Transform::default())
            .unwrap();
        let gone = scene
            .spawn(EntityKind::Block(BlockType::Stone), Transform::default())
            .unwrap();
        let mut q = ExpiryQueue::new();
        q.schedule(kept, ms(100));
        q.schedule(gone, ms(100));
        scene.despawn(gone);

        assert_eq!(q.expire(&mut scene, ms(100)), 1);
        assert_eq!(scene.entity_count(), 0);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn expire_on_torn_down_scene_is_harmless() {
        let mut q = ExpiryQueue::new();
        q.schedule(EntityId::new(), ms(1));
        let mut empty = Scene::new();
        assert_eq!(q.expire(&mut empty, ms(5)), 0);
    }
}
