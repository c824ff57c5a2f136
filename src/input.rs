use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved};

use crate::effects::lifecycle::{SubscriptionKind, subscribed};
use crate::page::PageElement;
use crate::page::elements::hit_test;

/// Pixels scrolled per wheel "line"
const LINE_HEIGHT_PX: f32 = 40.0;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .init_resource::<ScrollState>()
            .add_message::<PointerEvent>()
            .add_systems(
                Update,
                (
                    track_pointer.run_if(subscribed(SubscriptionKind::PointerMove)),
                    track_scroll.run_if(subscribed(SubscriptionKind::Scroll)),
                )
                    .in_set(PointerSystems),
            );
    }
}

/// Systems producing [`PointerEvent`]s; consumers run after this set
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerSystems;

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Client coordinates: pixels from the top-left of the window
    pub position: Vec2,
    pub kind: PointerEventKind,
    /// 0 = mouse, >0 = touch id
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Move,
    /// The element under the pointer changed (`None` = bare page)
    Over(Option<Entity>),
    Leave,
}

impl PointerEvent {
    pub fn moved(position: Vec2) -> Self {
        Self {
            position,
            kind: PointerEventKind::Move,
            id: 0,
        }
    }

    pub fn over(position: Vec2, target: Option<Entity>) -> Self {
        Self {
            position,
            kind: PointerEventKind::Over(target),
            id: 0,
        }
    }

    pub fn left(position: Vec2) -> Self {
        Self {
            position,
            kind: PointerEventKind::Leave,
            id: 0,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }
}

/// Latest pointer sample and the element it is over
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PointerState {
    pub position: Option<Vec2>,
    pub over: Option<Entity>,
    pub inside: bool,
}

/// Vertical scroll position of the page.
///
/// Layout boxes live in page coordinates (top of the document at y = 0);
/// pointer events arrive in viewport coordinates. `offset` links the two.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub offset: f32,
    /// Height of the laid-out content
    pub content_height: f32,
}

impl ScrollState {
    /// Viewport point -> page point
    pub fn to_page(&self, client: Vec2) -> Vec2 {
        Vec2::new(client.x, client.y + self.offset)
    }

    /// Page point -> viewport point
    pub fn to_viewport(&self, page: Vec2) -> Vec2 {
        Vec2::new(page.x, page.y - self.offset)
    }

    /// Where a layout box currently sits on screen
    pub fn visible(&self, bounds: Rect) -> Rect {
        Rect::from_corners(self.to_viewport(bounds.min), self.to_viewport(bounds.max))
    }

    pub fn max_offset(&self, viewport_height: f32) -> f32 {
        (self.content_height - viewport_height).max(0.0)
    }

    pub fn scroll_by(&mut self, delta: f32, viewport_height: f32) {
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset(viewport_height));
    }
}

fn track_pointer(
    mut ev_cursor: MessageReader<CursorMoved>,
    mut ev_left: MessageReader<CursorLeft>,
    mut touch_events: MessageReader<TouchInput>,
    elements: Query<(Entity, &PageElement)>,
    scroll: Res<ScrollState>,
    mut state: ResMut<PointerState>,
    mut out: MessageWriter<PointerEvent>,
) {
    let mut samples: Vec<(Vec2, u64)> = ev_cursor.read().map(|e| (e.position, 0)).collect();

    for ev in touch_events.read() {
        if matches!(ev.phase, TouchPhase::Started | TouchPhase::Moved) {
            samples.push((ev.position, ev.id));
        }
    }

    // Scrolling under a still pointer can put a new element beneath it
    if samples.is_empty() && scroll.is_changed() && state.inside {
        if let Some(position) = state.position {
            let target = hit_test(scroll.to_page(position), elements.iter());
            if target != state.over {
                state.over = target;
                out.write(PointerEvent::over(position, target));
            }
        }
    }

    for (position, id) in samples {
        state.position = Some(position);
        state.inside = true;
        out.write(PointerEvent::moved(position).with_id(id));

        // mouseover only fires when the target changes
        let target = hit_test(scroll.to_page(position), elements.iter());
        if target != state.over {
            state.over = target;
            out.write(PointerEvent::over(position, target).with_id(id));
        }
    }

    if ev_left.read().last().is_some() && state.inside {
        state.inside = false;
        state.over = None;
        out.write(PointerEvent::left(state.position.unwrap_or_default()));
    }
}

fn track_scroll(
    mut wheel: MessageReader<MouseWheel>,
    windows: Query<&Window>,
    mut scroll: ResMut<ScrollState>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    for ev in wheel.read() {
        let dy = match ev.unit {
            MouseScrollUnit::Line => ev.y * LINE_HEIGHT_PX,
            MouseScrollUnit::Pixel => ev.y,
        };
        // wheel up scrolls toward the top
        scroll.scroll_by(-dy, window.height());
    }
}
