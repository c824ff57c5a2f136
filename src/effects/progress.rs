use bevy::prelude::*;

use crate::{
    camera::ScreenSpace,
    effects::lifecycle::{EffectView, SubscriptionKind, Subscriptions},
    input::ScrollState,
};

const BAR_HEIGHT: f32 = 3.0;
const BAR_COLOR: Color = Color::srgb(0.07, 0.07, 0.08);

/// Percentage of the page scrolled past, 0 when the page fits the viewport
pub fn scroll_progress(offset: f32, content_height: f32, viewport_height: f32) -> f32 {
    let scrollable = content_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (offset / scrollable * 100.0).clamp(0.0, 100.0)
}

/// The bar pinned to the top edge
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ProgressBar;

const PROGRESS_SUBSCRIPTIONS: [SubscriptionKind; 2] =
    [SubscriptionKind::Scroll, SubscriptionKind::Resize];

pub fn activate_progress_bar(mut commands: Commands, mut subs: ResMut<Subscriptions>) {
    let view = commands
        .spawn((
            EffectView { name: "progress" },
            ProgressBar,
            Sprite::from_color(BAR_COLOR, Vec2::new(0.0, BAR_HEIGHT)),
            Transform::from_xyz(0.0, 0.0, 5.0),
        ))
        .id();
    let held = subs.subscribe_all(view, &PROGRESS_SUBSCRIPTIONS);
    commands.entity(view).insert(held);
}

/// Pins the bar to the top edge, growing left to right
pub fn update_progress_bar(
    scroll: Res<ScrollState>,
    screen: Res<ScreenSpace>,
    mut bars: Query<(&mut Sprite, &mut Transform), With<ProgressBar>>,
) {
    if !scroll.is_changed() && !screen.is_changed() {
        return;
    }

    let percent = scroll_progress(scroll.offset, scroll.content_height, screen.height());
    let width = screen.width() * percent / 100.0;
    let left_center = Vec2::new(width * 0.5, BAR_HEIGHT * 0.5);

    for (mut sprite, mut transform) in &mut bars {
        sprite.custom_size = Some(Vec2::new(width, BAR_HEIGHT));
        let world = screen.to_world(left_center);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
    }
}
