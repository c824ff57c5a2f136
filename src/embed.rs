//! The hosted 3D doodle and its static fallback.
//!
//! The scene is an opaque widget loaded by reference through the asset
//! server. Only three states are observable: loading, loaded and errored.
//! Until the scene is loaded, or forever once it has errored, a line-art
//! fallback (cloud, server, stack) is drawn over the doodle panel instead.
//! The panel scrolls with the page; the scene camera's viewport follows it.

use bevy::asset::LoadState;
use bevy::camera::Viewport;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::{
    camera::{SceneCamera, ScreenSpace},
    config::EffectsConfig,
    effects::tilt::TiltTarget,
    input::ScrollState,
    page::{DoodlePanel, PageElement},
};

const FALLBACK_INK: Color = Color::srgba(0.0, 0.0, 0.0, 0.5);

pub struct EmbedPlugin;

impl Plugin for EmbedPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<EmbedSignal>()
            .add_systems(Startup, load_scene_embed)
            .add_systems(
                Update,
                (poll_scene_load, apply_embed_signals, draw_fallback).chain(),
            )
            .add_systems(PostUpdate, fit_scene_viewport);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedStatus {
    #[default]
    Loading,
    Loaded,
    Errored,
}

impl EmbedStatus {
    /// `Errored` is terminal: a late load does not bring the scene back
    pub fn on_load(self) -> Self {
        match self {
            EmbedStatus::Errored => EmbedStatus::Errored,
            _ => EmbedStatus::Loaded,
        }
    }

    pub fn on_error(self) -> Self {
        EmbedStatus::Errored
    }

    pub fn shows_fallback(self) -> bool {
        self != EmbedStatus::Loaded
    }
}

/// What the loader reported about the scene this frame
#[derive(Message, Debug, Clone, PartialEq)]
pub enum EmbedSignal {
    Loaded(Entity),
    Failed(Entity, String),
}

#[derive(Component, Debug)]
pub struct SceneEmbed {
    pub handle: Handle<Scene>,
    pub status: EmbedStatus,
}

fn load_scene_embed(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<EffectsConfig>,
) {
    let source = config.embed.source.clone();
    let handle: Handle<Scene> = asset_server.load(source.clone());
    info!("Loading 3D doodle from {}", source);

    commands.spawn((
        SceneRoot(handle.clone()),
        SceneEmbed {
            handle,
            status: EmbedStatus::Loading,
        },
        Transform::default(),
        TiltTarget,
    ));

    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(3.0, 6.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Translate asset server state into [`EmbedSignal`]s while loading
fn poll_scene_load(
    asset_server: Res<AssetServer>,
    embeds: Query<(Entity, &SceneEmbed)>,
    mut signals: MessageWriter<EmbedSignal>,
) {
    for (entity, embed) in &embeds {
        if embed.status != EmbedStatus::Loading {
            continue;
        }

        match asset_server.get_load_state(&embed.handle) {
            Some(LoadState::Failed(err)) => {
                signals.write(EmbedSignal::Failed(entity, err.to_string()));
            }
            Some(LoadState::Loaded) if asset_server.is_loaded_with_dependencies(&embed.handle) => {
                signals.write(EmbedSignal::Loaded(entity));
            }
            _ => {}
        }
    }
}

pub fn apply_embed_signals(
    mut signals: MessageReader<EmbedSignal>,
    mut embeds: Query<&mut SceneEmbed>,
    mut commands: Commands,
) {
    for signal in signals.read() {
        match signal {
            EmbedSignal::Loaded(entity) => {
                let Ok(mut embed) = embeds.get_mut(*entity) else {
                    continue;
                };
                embed.status = embed.status.on_load();
                if embed.status == EmbedStatus::Loaded {
                    info!("3D doodle loaded");
                }
            }
            EmbedSignal::Failed(entity, reason) => {
                let Ok(mut embed) = embeds.get_mut(*entity) else {
                    continue;
                };
                if embed.status == EmbedStatus::Errored {
                    continue;
                }
                embed.status = embed.status.on_error();
                warn!("3D doodle failed to load, showing fallback: {}", reason);

                // Never render a half-loaded scene
                if let Ok(mut entity) = commands.get_entity(*entity) {
                    entity.remove::<SceneRoot>();
                }
            }
        }
    }
}

/// Cloud, server and stack line art centred in the panel
fn draw_fallback(
    embeds: Query<&SceneEmbed>,
    panels: Query<&PageElement, With<DoodlePanel>>,
    screen: Res<ScreenSpace>,
    scroll: Res<ScrollState>,
    mut gizmos: Gizmos,
) {
    let Ok(panel) = panels.single() else {
        return;
    };
    let showing = embeds.iter().all(|embed| embed.status.shows_fallback());
    if !showing {
        return;
    }

    let center = screen.to_world(scroll.to_viewport(panel.bounds.center()));
    let gap = 80.0;

    // cloud
    let cloud = center + Vec2::new(-gap, 0.0);
    gizmos.line_2d(
        cloud + Vec2::new(-20.0, -8.0),
        cloud + Vec2::new(20.0, -8.0),
        FALLBACK_INK,
    );
    gizmos.arc_2d(
        Isometry2d::from_translation(cloud + Vec2::new(-10.0, -2.0)),
        std::f32::consts::PI,
        8.0,
        FALLBACK_INK,
    );
    gizmos.arc_2d(
        Isometry2d::from_translation(cloud + Vec2::new(4.0, 0.0)),
        std::f32::consts::PI,
        12.0,
        FALLBACK_INK,
    );

    // server
    gizmos.rect_2d(center, Vec2::new(30.0, 22.0), FALLBACK_INK);
    gizmos.rect_2d(center + Vec2::new(-6.5, 0.0), Vec2::new(9.0, 14.0), FALLBACK_INK);
    gizmos.rect_2d(center + Vec2::new(6.5, 0.0), Vec2::new(9.0, 14.0), FALLBACK_INK);

    // stack
    let stack = center + Vec2::new(gap, 0.0);
    for i in 0..3 {
        let y = 10.0 - i as f32 * 10.0;
        gizmos.line_2d(
            stack + Vec2::new(-14.0, y),
            stack + Vec2::new(14.0, y),
            FALLBACK_INK,
        );
    }
}

/// Restrict the scene camera to the doodle panel, in physical pixels.
/// The camera sleeps while the panel is scrolled out of view.
fn fit_scene_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    scroll: Res<ScrollState>,
    panels: Query<&PageElement, With<DoodlePanel>>,
    mut cameras: Query<&mut Camera, With<SceneCamera>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok(panel) = panels.single() else {
        return;
    };

    let visible = scroll.visible(panel.bounds);
    let on_screen = visible.max.y > 0.0 && visible.min.y < window.height();
    let scale = window.scale_factor();
    let window_size = UVec2::new(window.physical_width(), window.physical_height());
    let (position, size) = panel_viewport(visible, scale, window_size);

    for mut camera in &mut cameras {
        if camera.is_active != on_screen {
            camera.is_active = on_screen;
        }
        if !on_screen {
            continue;
        }
        let unchanged = camera
            .viewport
            .as_ref()
            .is_some_and(|v| v.physical_position == position && v.physical_size == size);
        if unchanged {
            continue;
        }
        camera.viewport = Some(Viewport {
            physical_position: position,
            physical_size: size,
            ..default()
        });
    }
}

/// Panel rect in logical pixels -> (position, size) clamped to the window
pub fn panel_viewport(bounds: Rect, scale: f32, window: UVec2) -> (UVec2, UVec2) {
    let min = (bounds.min * scale).max(Vec2::ZERO).as_uvec2().min(window);
    let max = (bounds.max * scale).max(Vec2::ZERO).as_uvec2().min(window);
    let size = (max - min).max(UVec2::ONE);
    (min.min(window.saturating_sub(UVec2::ONE)), size)
}
