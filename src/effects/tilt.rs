use bevy::prelude::*;

use crate::{
    config::{EffectsConfig, TiltConfig},
    effects::lifecycle::{EffectView, SubscriptionKind, Subscriptions},
    input::{PointerEvent, PointerEventKind, ScrollState},
    page::{DoodlePanel, PageElement},
};

/// Perspective tilt of the doodle panel following the pointer.
///
/// `target` is the pointer offset from the panel center in panel sizes
/// (so roughly -0.5..0.5 while inside); rotation eases toward it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ParallaxTilt {
    pub target: Vec2,
    /// Degrees: x = pitch (rotateX), y = yaw (rotateY)
    pub rotation: Vec2,
    pub hovered: bool,
    pub params: TiltConfig,
}

impl ParallaxTilt {
    pub fn new(params: TiltConfig) -> Self {
        Self {
            target: Vec2::ZERO,
            rotation: Vec2::ZERO,
            hovered: false,
            params,
        }
    }

    pub fn pointer_moved(&mut self, pointer: Vec2, panel: Rect) {
        self.hovered = panel.contains(pointer);
        if self.params.reduced_motion {
            return;
        }
        let size = panel.size().max(Vec2::ONE);
        self.target = (pointer - panel.center()) / size;
    }

    pub fn pointer_left(&mut self) {
        self.hovered = false;
    }

    /// One animation frame
    pub fn tick(&mut self) {
        if self.params.reduced_motion {
            return;
        }
        let goal = Vec2::new(
            self.target.y * self.params.max_pitch_deg,
            self.target.x * self.params.max_yaw_deg,
        );
        self.rotation += (goal - self.rotation) * self.params.ease;
    }

    pub fn scale(&self) -> f32 {
        if self.hovered {
            self.params.hover_scale
        } else {
            1.0
        }
    }

    pub fn to_transform(&self) -> Transform {
        Transform {
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x.to_radians(),
                self.rotation.y.to_radians(),
                0.0,
            ),
            scale: Vec3::splat(self.scale()),
            ..default()
        }
    }
}

/// The transform the tilt is written to
#[derive(Component)]
pub struct TiltTarget;

const TILT_SUBSCRIPTIONS: [SubscriptionKind; 3] = [
    SubscriptionKind::PointerMove,
    SubscriptionKind::PointerLeave,
    SubscriptionKind::AnimationFrame,
];

/// System: mount the tilt controller for the doodle panel
pub fn activate_tilt(
    mut commands: Commands,
    mut subs: ResMut<Subscriptions>,
    config: Res<EffectsConfig>,
    panels: Query<(), With<DoodlePanel>>,
) {
    if panels.is_empty() {
        debug!("No doodle panel on the page, tilt stays off");
        return;
    }

    let view = commands
        .spawn((EffectView { name: "tilt" }, ParallaxTilt::new(config.tilt)))
        .id();
    let held = subs.subscribe_all(view, &TILT_SUBSCRIPTIONS);
    commands.entity(view).insert(held);
}

/// System: aim the tilt at the pointer, compared in page space
pub fn track_tilt_pointer(
    mut pointer_events: MessageReader<PointerEvent>,
    scroll: Res<ScrollState>,
    panels: Query<&PageElement, With<DoodlePanel>>,
    mut tilts: Query<&mut ParallaxTilt>,
) {
    let Ok(panel) = panels.single() else {
        return;
    };

    for event in pointer_events.read() {
        if event.kind != PointerEventKind::Move {
            continue;
        }
        let pointer = scroll.to_page(event.position);
        for mut tilt in &mut tilts {
            tilt.pointer_moved(pointer, panel.bounds);
        }
    }
}

pub fn release_tilt_on_leave(
    mut pointer_events: MessageReader<PointerEvent>,
    mut tilts: Query<&mut ParallaxTilt>,
) {
    if !pointer_events
        .read()
        .any(|event| event.kind == PointerEventKind::Leave)
    {
        return;
    }
    for mut tilt in &mut tilts {
        tilt.pointer_left();
    }
}

pub fn animate_tilt(
    mut tilts: Query<&mut ParallaxTilt>,
    mut targets: Query<&mut Transform, With<TiltTarget>>,
) {
    let Some(mut tilt) = tilts.iter_mut().next() else {
        return;
    };
    tilt.tick();

    let tilted = tilt.to_transform();
    for mut transform in &mut targets {
        transform.rotation = tilted.rotation;
        transform.scale = tilted.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Rect {
        Rect::from_center_size(Vec2::new(500.0, 400.0), Vec2::new(200.0, 100.0))
    }

    #[test]
    fn test_target_is_normalised_offset() {
        let mut tilt = ParallaxTilt::new(TiltConfig::default());
        tilt.pointer_moved(Vec2::new(600.0, 450.0), panel());

        assert_eq!(tilt.target, Vec2::new(0.5, 0.5));
        assert!(tilt.hovered);
    }

    #[test]
    fn test_rotation_eases_toward_goal() {
        let mut tilt = ParallaxTilt::new(TiltConfig::default());
        tilt.pointer_moved(Vec2::new(600.0, 450.0), panel());

        tilt.tick();
        // goal = (0.5 * 8, 0.5 * -10) = (4, -5), first step covers 8%
        assert!((tilt.rotation.x - 0.32).abs() < 1e-5);
        assert!((tilt.rotation.y + 0.4).abs() < 1e-5);

        for _ in 0..400 {
            tilt.tick();
        }
        assert!((tilt.rotation - Vec2::new(4.0, -5.0)).length() < 1e-3);
    }

    #[test]
    fn test_hover_scale() {
        let mut tilt = ParallaxTilt::new(TiltConfig::default());
        assert_eq!(tilt.scale(), 1.0);

        tilt.pointer_moved(Vec2::new(500.0, 400.0), panel());
        assert_eq!(tilt.scale(), 1.02);

        tilt.pointer_moved(Vec2::new(10.0, 10.0), panel());
        assert_eq!(tilt.scale(), 1.0);

        tilt.pointer_moved(Vec2::new(500.0, 400.0), panel());
        tilt.pointer_left();
        assert_eq!(tilt.scale(), 1.0);
    }

    #[test]
    fn test_reduced_motion_freezes_rotation() {
        let params = TiltConfig {
            reduced_motion: true,
            ..TiltConfig::default()
        };
        let mut tilt = ParallaxTilt::new(params);
        tilt.pointer_moved(Vec2::new(600.0, 450.0), panel());
        for _ in 0..10 {
            tilt.tick();
        }

        assert_eq!(tilt.rotation, Vec2::ZERO);
        // hover scaling still applies
        assert_eq!(tilt.scale(), 1.02);
    }

    fn tilt_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ScrollState>()
            .add_message::<PointerEvent>()
            .add_systems(Update, (track_tilt_pointer, release_tilt_on_leave).chain());

        app.world_mut().spawn((
            PageElement::new(crate::page::ElementKind::Div, panel()),
            DoodlePanel,
        ));
        app.world_mut().spawn(ParallaxTilt::new(TiltConfig::default()));
        app
    }

    fn tilt(app: &mut App) -> ParallaxTilt {
        let mut tilts = app.world_mut().query::<&ParallaxTilt>();
        *tilts.single(app.world()).unwrap()
    }

    #[test]
    fn test_panel_hover_follows_scroll() {
        let mut app = tilt_app();
        app.world_mut().resource_mut::<ScrollState>().offset = 300.0;

        // the panel center is 400 px down the page, 100 px down the screen
        app.world_mut()
            .write_message(PointerEvent::moved(Vec2::new(500.0, 100.0)));
        app.update();
        let tilt = tilt(&mut app);
        assert!(tilt.hovered);
        assert_eq!(tilt.target, Vec2::ZERO);
    }

    #[test]
    fn test_leave_message_drops_hover() {
        let mut app = tilt_app();
        app.world_mut()
            .write_message(PointerEvent::moved(Vec2::new(500.0, 400.0)));
        app.update();
        assert!(tilt(&mut app).hovered);

        app.world_mut()
            .write_message(PointerEvent::left(Vec2::new(500.0, 400.0)));
        app.update();
        assert!(!tilt(&mut app).hovered);
    }
}
