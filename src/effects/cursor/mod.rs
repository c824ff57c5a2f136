pub mod hover;
pub mod outline;
pub mod renderer;
pub mod spring;

use bevy::prelude::*;
use bevy::window::{CursorOptions, PrimaryWindow};

use crate::{
    camera::ScreenSpace,
    config::EffectsConfig,
    effects::{
        lifecycle::{EffectView, SubscriptionKind, Subscriptions},
        magnetic::MagneticEngine,
        trail::CursorTrail,
    },
    page::{ElementOffset, PageElement},
};

pub use hover::{HoverState, update_hover_state};
pub use renderer::{CursorVisuals, animate_cursor, draw_cursor};

/// The custom cursor overlay: breadcrumbs, orb, highlight, magnetic pull
#[derive(Component)]
pub struct CursorView;

const CURSOR_SUBSCRIPTIONS: [SubscriptionKind; 4] = [
    SubscriptionKind::PointerMove,
    SubscriptionKind::PointerOver,
    SubscriptionKind::PointerLeave,
    SubscriptionKind::AnimationFrame,
];

/// System: mount the cursor view and take its subscriptions
pub fn activate_cursor(
    mut commands: Commands,
    mut subs: ResMut<Subscriptions>,
    config: Res<EffectsConfig>,
    screen: Res<ScreenSpace>,
    elements: Query<(Entity, &PageElement)>,
    mut cursor_options: Query<&mut CursorOptions, With<PrimaryWindow>>,
) {
    let view = commands
        .spawn((EffectView { name: "cursor" }, CursorView))
        .id();
    let held = subs.subscribe_all(view, &CURSOR_SUBSCRIPTIONS);
    commands.entity(view).insert(held);

    let mut engine = MagneticEngine::new(config.magnetic);
    for (entity, element) in &elements {
        if element.magnetic {
            engine.register(entity, element.bounds);
        }
    }
    if engine.is_empty() {
        debug!("No magnetic elements on the page");
    } else {
        info!("Cursor view active, {} magnetic targets", engine.len());
    }

    commands.insert_resource(engine);
    commands.insert_resource(CursorTrail::from_config(&config));
    commands.insert_resource(CursorVisuals::new(&config, &screen));
    commands.insert_resource(HoverState::default());

    // The orb replaces the system pointer
    if let Ok(mut options) = cursor_options.single_mut() {
        options.visible = false;
    }
}

/// System: undo everything the cursor view changed once it is gone
pub fn release_cursor(
    mut removed: RemovedComponents<CursorView>,
    mut commands: Commands,
    engine: Option<ResMut<MagneticEngine>>,
    mut offsets: Query<&mut ElementOffset>,
    mut cursor_options: Query<&mut CursorOptions, With<PrimaryWindow>>,
) {
    if removed.read().count() == 0 {
        return;
    }

    if let Some(mut engine) = engine {
        engine.unregister_all();
    }
    for mut offset in &mut offsets {
        offset.0 = Vec2::ZERO;
    }
    commands.remove_resource::<CursorVisuals>();

    if let Ok(mut options) = cursor_options.single_mut() {
        options.visible = true;
    }
    debug!("Cursor view released");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::lifecycle::{
        TeardownView, ViewSubscriptions, prune_cancelled, teardown_views, view_subscribed,
    };
    use crate::effects::trail::record_trail;
    use crate::input::PointerEvent;
    use crate::page::ElementKind;

    fn cursor_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(EffectsConfig::default())
            .insert_resource(ScreenSpace::new(800.0, 600.0))
            .init_resource::<Subscriptions>()
            .add_message::<PointerEvent>()
            .add_message::<TeardownView>()
            .add_systems(PostStartup, activate_cursor)
            .add_systems(
                Update,
                record_trail.run_if(view_subscribed::<CursorView>(SubscriptionKind::PointerMove)),
            )
            .add_systems(Last, (teardown_views, prune_cancelled, release_cursor).chain());
        app
    }

    fn cursor_view(app: &mut App) -> Entity {
        let mut views = app.world_mut().query_filtered::<Entity, With<CursorView>>();
        views.single(app.world()).unwrap()
    }

    #[test]
    fn test_activation_registers_magnetic_elements() {
        let mut app = cursor_app();
        let bounds = Rect::new(0.0, 0.0, 100.0, 40.0);
        app.world_mut()
            .spawn(PageElement::new(ElementKind::Anchor, bounds).magnetic());
        app.world_mut()
            .spawn(PageElement::new(ElementKind::Anchor, bounds));
        app.update();

        assert_eq!(app.world().resource::<MagneticEngine>().len(), 1);
        assert_eq!(app.world().resource::<Subscriptions>().live_count(), 4);

        let view = cursor_view(&mut app);
        let held = app.world().get::<ViewSubscriptions>(view).unwrap();
        assert_eq!(held.0.len(), 4);
    }

    #[test]
    fn test_teardown_stops_trail_and_releases_everything() {
        let mut app = cursor_app();
        app.update();

        app.world_mut()
            .write_message(PointerEvent::moved(Vec2::new(10.0, 10.0)));
        app.update();
        assert_eq!(app.world().resource::<CursorTrail>().buffer.len(), 1);

        let view = cursor_view(&mut app);
        app.world_mut().write_message(TeardownView(view));
        app.update();

        assert_eq!(app.world().resource::<Subscriptions>().live_count(), 0);
        assert_eq!(app.world().resource::<Subscriptions>().len(), 0);
        assert!(app.world().get_resource::<CursorVisuals>().is_none());
        assert!(app.world().resource::<MagneticEngine>().is_empty());

        app.world_mut()
            .write_message(PointerEvent::moved(Vec2::new(50.0, 50.0)));
        app.update();
        assert_eq!(app.world().resource::<CursorTrail>().buffer.len(), 1);
    }
}
