use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::{
    config::MagneticConfig,
    input::{PointerEvent, PointerEventKind, PointerState, ScrollState},
    page::{ElementOffset, PageElement},
};

/// One registered magnetic element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticTarget {
    /// Layout box in page coordinates
    pub bounds: Rect,
    /// Currently applied displacement
    pub offset: Vec2,
}

/// Displacement of a target toward the pointer.
///
/// The pull is `rel * strength`, damped by `min(1, radius / (d + 1))` so it
/// fades smoothly beyond `radius` without ever reaching zero. The `+ 1`
/// keeps the pointer sitting exactly on a target center finite.
pub fn magnetic_offset(pointer: Vec2, bounds: Rect, params: MagneticConfig) -> Vec2 {
    let rel = pointer - bounds.center();
    let dist = rel.x.hypot(rel.y);
    let damp = (params.radius / (dist + 1.0)).min(1.0);
    rel * params.strength * damp
}

/// Pulls registered elements toward the pointer.
///
/// Targets are registered explicitly rather than discovered by scanning
/// the page, so the engine works without any display surface.
#[derive(Resource, Debug, Clone, Default)]
pub struct MagneticEngine {
    targets: HashMap<Entity, MagneticTarget>,
    params: MagneticConfig,
}

impl MagneticEngine {
    pub fn new(params: MagneticConfig) -> Self {
        Self {
            targets: HashMap::default(),
            params,
        }
    }

    pub fn register(&mut self, entity: Entity, bounds: Rect) {
        self.targets.insert(
            entity,
            MagneticTarget {
                bounds,
                offset: Vec2::ZERO,
            },
        );
    }

    pub fn unregister(&mut self, entity: Entity) -> Option<MagneticTarget> {
        self.targets.remove(&entity)
    }

    pub fn unregister_all(&mut self) {
        self.targets.clear();
    }

    /// Layout changed (resize); keeps the current offset
    pub fn update_bounds(&mut self, entity: Entity, bounds: Rect) {
        if let Some(target) = self.targets.get_mut(&entity) {
            target.bounds = bounds;
        }
    }

    #[cfg(test)]
    pub fn target(&self, entity: Entity) -> Option<&MagneticTarget> {
        self.targets.get(&entity)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// `pointer` is in page coordinates, like the target bounds
    pub fn pointer_moved(&mut self, pointer: Vec2) {
        let params = self.params;
        for target in self.targets.values_mut() {
            target.offset = magnetic_offset(pointer, target.bounds, params);
        }
    }

    /// Pointer left the surface: everything snaps home
    pub fn pointer_left(&mut self) {
        for target in self.targets.values_mut() {
            target.offset = Vec2::ZERO;
        }
    }

    pub fn offsets(&self) -> impl Iterator<Item = (Entity, Vec2)> + '_ {
        self.targets.iter().map(|(entity, target)| (*entity, target.offset))
    }
}

/// System: pull targets toward the pointer as it moves or the page scrolls
pub fn drive_magnetic_engine(
    mut pointer_events: MessageReader<PointerEvent>,
    scroll: Res<ScrollState>,
    pointer: Res<PointerState>,
    mut engine: ResMut<MagneticEngine>,
) {
    let mut moved = false;
    for event in pointer_events.read() {
        if event.kind == PointerEventKind::Move {
            engine.pointer_moved(scroll.to_page(event.position));
            moved = true;
        }
    }

    // A still pointer over a scrolling page lands on new page coordinates
    if !moved && scroll.is_changed() && pointer.inside {
        if let Some(position) = pointer.position {
            engine.pointer_moved(scroll.to_page(position));
        }
    }
}

/// System: everything snaps home when the pointer leaves the window
pub fn release_magnetic_on_leave(
    mut pointer_events: MessageReader<PointerEvent>,
    mut engine: ResMut<MagneticEngine>,
) {
    if pointer_events
        .read()
        .any(|event| event.kind == PointerEventKind::Leave)
    {
        engine.pointer_left();
    }
}

/// System: keep registrations in step with the page
pub fn sync_magnetic_registrations(
    mut engine: ResMut<MagneticEngine>,
    added: Query<(Entity, &PageElement), Added<PageElement>>,
    changed: Query<(Entity, &PageElement), Changed<PageElement>>,
    mut removed: RemovedComponents<PageElement>,
) {
    for (entity, element) in &added {
        if element.magnetic {
            engine.register(entity, element.bounds);
        }
    }
    for (entity, element) in &changed {
        engine.update_bounds(entity, element.bounds);
    }
    for entity in removed.read() {
        engine.unregister(entity);
    }
}

/// System: mirror engine offsets onto the elements
pub fn apply_magnetic_offsets(
    engine: Res<MagneticEngine>,
    mut offsets: Query<&mut ElementOffset>,
) {
    if !engine.is_changed() {
        return;
    }
    for (entity, offset) in engine.offsets() {
        if let Ok(mut element_offset) = offsets.get_mut(entity) {
            element_offset.0 = offset;
        }
    }
}
