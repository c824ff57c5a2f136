pub mod elements;
pub mod layout;

use bevy::prelude::*;

pub use elements::{AriaRole, ContainedBy, ElementKind, PageElement, ancestor_chain, hit_test};
pub use layout::{DoodlePanel, ElementOffset, LayoutSlot, RoleText};

use crate::{
    camera::ScreenSystems,
    input::ScrollState,
    page::layout::{measure_content_height, relayout_on_resize, spawn_page, sync_element_transforms},
};

/// Static page composition. No effect logic lives here.
pub struct PagePlugin;

impl Plugin for PagePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.98, 0.98, 0.98)))
            .init_resource::<ScrollState>()
            .add_systems(Startup, spawn_page.after(ScreenSystems))
            .add_systems(
                PostUpdate,
                (relayout_on_resize, measure_content_height, sync_element_transforms)
                    .chain()
                    .before(TransformSystems::Propagate),
            );
    }
}

#[cfg(test)]
mod tests {
    use bevy::window::{PrimaryWindow, WindowResolution};

    use super::*;
    use crate::camera::{ScreenSpace, sync_screen_space};

    #[test]
    fn test_first_layout_uses_the_real_window_size() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ScreenSpace>()
            // page plugin added first; set ordering still runs the screen sync before layout
            .add_plugins(PagePlugin)
            .add_systems(Startup, sync_screen_space.in_set(ScreenSystems));

        app.world_mut().spawn((
            Window {
                resolution: WindowResolution::new(1000, 700),
                ..default()
            },
            PrimaryWindow,
        ));
        app.update();

        let mut slots = app.world_mut().query::<(&LayoutSlot, &PageElement)>();
        let hero = slots
            .iter(app.world())
            .find(|(slot, e)| e.kind == ElementKind::Section && slot.anchor.y == 0.5)
            .map(|(slot, e)| (slot.size, e.bounds))
            .unwrap();
        assert_eq!(hero.0, Vec2::new(1000.0, 700.0));
        assert_eq!(hero.1, Rect::new(0.0, 0.0, 1000.0, 700.0));
    }
}
