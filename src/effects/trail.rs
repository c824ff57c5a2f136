use std::collections::VecDeque;

use bevy::prelude::*;

use crate::{
    config::EffectsConfig,
    input::{PointerEvent, PointerEventKind},
};

/// Default number of breadcrumbs kept
pub const DEFAULT_TRAIL_CAPACITY: usize = 16;

/// Stable identifier of a breadcrumb for the lifetime of its buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrailId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailEntry {
    pub position: Vec2,
    pub id: TrailId,
}

/// Bounded, insertion-ordered history of pointer samples.
///
/// Appending is a pure value transformation: the id counter travels with
/// the buffer, so two equal buffers always produce equal successors.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    entries: VecDeque<TrailEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRAIL_CAPACITY)
    }
}

impl TrailBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// New buffer with `sample` appended and the oldest entries evicted
    #[must_use]
    pub fn append(&self, sample: PointerSample) -> TrailBuffer {
        let mut next = self.clone();
        next.push(sample);
        next
    }

    /// In-place form of [`TrailBuffer::append`]
    pub fn push(&mut self, sample: PointerSample) -> TrailId {
        let id = TrailId(self.next_id);
        self.next_id += 1;

        self.entries.push_back(TrailEntry {
            position: sample.position,
            id,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        id
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TrailEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position_of(&self, id: TrailId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn contains(&self, id: TrailId) -> bool {
        self.position_of(id).is_some()
    }
}

/// The cursor's breadcrumb trail
#[derive(Resource, Debug, Clone, Default)]
pub struct CursorTrail {
    pub buffer: TrailBuffer,
}

impl CursorTrail {
    pub fn from_config(config: &EffectsConfig) -> Self {
        Self {
            buffer: TrailBuffer::with_capacity(config.trail.capacity),
        }
    }
}

/// System: record every pointer move into the trail
pub fn record_trail(mut pointer_events: MessageReader<PointerEvent>, mut trail: ResMut<CursorTrail>) {
    for event in pointer_events.read() {
        if event.kind == PointerEventKind::Move {
            let sample = PointerSample::new(event.position.x, event.position.y);
            trail.buffer = trail.buffer.append(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(buffer: &TrailBuffer) -> Vec<Vec2> {
        buffer.iter().map(|e| e.position).collect()
    }

    #[test]
    fn test_three_moves_keep_order() {
        let buffer = TrailBuffer::default()
            .append(PointerSample::new(100.0, 100.0))
            .append(PointerSample::new(120.0, 100.0))
            .append(PointerSample::new(140.0, 100.0));

        assert_eq!(buffer.len(), 3);
        assert_eq!(
            positions(&buffer),
            vec![
                Vec2::new(100.0, 100.0),
                Vec2::new(120.0, 100.0),
                Vec2::new(140.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_twenty_moves_keep_last_sixteen() {
        let mut buffer = TrailBuffer::default();
        for i in 0..20 {
            buffer = buffer.append(PointerSample::new(i as f32, 0.0));
        }

        assert_eq!(buffer.len(), 16);
        let expected: Vec<Vec2> = (4..20).map(|i| Vec2::new(i as f32, 0.0)).collect();
        assert_eq!(positions(&buffer), expected);
    }

    #[test]
    fn test_length_is_min_of_appends_and_capacity() {
        for n in 0..40 {
            let mut buffer = TrailBuffer::default();
            for i in 0..n {
                buffer = buffer.append(PointerSample::new(i as f32, i as f32));
            }
            assert_eq!(buffer.len(), n.min(16));
        }
    }

    #[test]
    fn test_ids_unique_and_relative_order_preserved() {
        let mut buffer = TrailBuffer::with_capacity(4);
        let mut seen = Vec::new();
        for i in 0..10 {
            buffer = buffer.append(PointerSample::new(i as f32, 0.0));
            let ids: Vec<TrailId> = buffer.iter().map(|e| e.id).collect();

            // surviving ids keep their order from the previous step
            let survivors: Vec<TrailId> =
                seen.iter().copied().filter(|id| ids.contains(id)).collect();
            assert_eq!(&ids[..survivors.len()], survivors.as_slice());

            seen = ids;
        }

        let ids: Vec<TrailId> = buffer.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![TrailId(6), TrailId(7), TrailId(8), TrailId(9)]);
    }

    #[test]
    fn test_append_leaves_original_untouched() {
        let original = TrailBuffer::default().append(PointerSample::new(1.0, 1.0));
        let next = original.append(PointerSample::new(2.0, 2.0));

        assert_eq!(original.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(original.append(PointerSample::new(2.0, 2.0)), next);
    }
}
