use bevy::prelude::*;

use crate::{
    input::{PointerEvent, PointerEventKind},
    page::{ContainedBy, PageElement, ancestor_chain, elements::closest_interactive},
};

/// Whether the pointer is over something clickable.
///
/// Transitions are immediate on every pointer-over; there is no debounce.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering,
}

impl HoverState {
    pub fn is_hovering(self) -> bool {
        self == HoverState::Hovering
    }

    /// Next state after a pointer-over whose target chain is or isn't interactive
    pub fn on_pointer_over(self, interactive: bool) -> HoverState {
        if interactive {
            HoverState::Hovering
        } else {
            HoverState::Idle
        }
    }
}

/// System: update the hover state from pointer-over events
pub fn update_hover_state(
    mut pointer_events: MessageReader<PointerEvent>,
    elements: Query<(&PageElement, Option<&ContainedBy>)>,
    mut hover: ResMut<HoverState>,
) {
    for event in pointer_events.read() {
        let PointerEventKind::Over(target) = event.kind else {
            continue;
        };

        let interactive = target
            .map(|entity| closest_interactive(ancestor_chain(entity, &elements)))
            .unwrap_or(false);

        let next = hover.on_pointer_over(interactive);
        if next != *hover {
            debug!("Hover {:?} -> {:?}", *hover, next);
            *hover = next;
        }
    }
}
