use bevy::prelude::*;

mod camera;
mod config;
mod effects;
mod embed;
mod input;
mod page;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use config::ConfigPlugin;
use embed::EmbedPlugin;
use input::InputPlugin;
use page::PagePlugin;

use crate::effects::plugin::EffectsPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Vedant Patil · Portfolio".into(),
            resolution: WindowResolution::new(1280, 800),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(ConfigPlugin)
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(PagePlugin)
    .add_plugins(EffectsPlugin)
    .add_plugins(EmbedPlugin);

    app.run();
}
