use bevy::camera::ClearColorConfig;
use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScreenSpace>()
            .add_systems(
                Startup,
                (sync_screen_space.in_set(ScreenSystems), setup_cameras, route_gizmos).chain(),
            )
            .add_systems(PreUpdate, track_window_resize.in_set(ScreenSystems));
    }
}

/// Systems that write [`ScreenSpace`]; layout runs after them
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenSystems;

/// Logical size of the display surface.
///
/// Everything in the effects layer works in client coordinates
/// (top-left origin, y down) like a browser viewport. The overlay camera
/// is centered on the window, so conversion is a flip and a shift.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ScreenSpace {
    pub size: Vec2,
}

impl Default for ScreenSpace {
    fn default() -> Self {
        Self {
            size: Vec2::new(1280.0, 800.0),
        }
    }
}

impl ScreenSpace {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Client position -> overlay world position
    pub fn to_world(&self, client: Vec2) -> Vec2 {
        Vec2::new(client.x - self.size.x * 0.5, self.size.y * 0.5 - client.y)
    }
}

// Render layers, back to front: backdrop, canvas, page content, effects.
// Page content stays on the default layer 0.

/// Cursor gizmos, seen only by [`EffectsCamera`]
pub const EFFECTS_LAYER: usize = 1;
/// Section backgrounds
pub const BACKDROP_LAYER: usize = 2;
/// Node canvas gizmos, between the backdrop and the page content
pub const CANVAS_LAYER: usize = 3;

/// Camera drawing section backgrounds, clears the frame
#[derive(Component)]
pub struct BackdropCamera;

/// Camera drawing the node canvas over the backdrop
#[derive(Component)]
pub struct CanvasCamera;

/// Camera drawing page elements (sprites and text)
#[derive(Component)]
pub struct PageCamera;

/// Camera drawing the embedded 3D scene inside the doodle panel
#[derive(Component)]
pub struct SceneCamera;

/// Camera drawing the cursor gizmos on top of everything
#[derive(Component)]
pub struct EffectsCamera;

fn overlay_camera(order: isize, layer: usize) -> (Camera2d, Camera, RenderLayers) {
    (
        Camera2d,
        Camera {
            order,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        RenderLayers::layer(layer),
    )
}

pub fn setup_cameras(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            order: 0,
            ..default()
        },
        RenderLayers::layer(BACKDROP_LAYER),
        BackdropCamera,
    ));

    commands.spawn((overlay_camera(1, CANVAS_LAYER), CanvasCamera));
    commands.spawn((overlay_camera(2, 0), PageCamera));

    // Viewport is fitted to the doodle panel once layout is known
    commands.spawn((
        Camera3d::default(),
        Camera {
            order: 3,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        Transform::from_xyz(0.0, 1.5, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        SceneCamera,
    ));

    commands.spawn((overlay_camera(4, EFFECTS_LAYER), EffectsCamera));
}

/// Keep gizmos off the page and scene cameras
fn route_gizmos(store: Option<ResMut<GizmoConfigStore>>) {
    let Some(mut store) = store else {
        return;
    };
    let (config, _) = store.config_mut::<DefaultGizmoConfigGroup>();
    config.render_layers = RenderLayers::layer(EFFECTS_LAYER);
}

pub fn sync_screen_space(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut screen: ResMut<ScreenSpace>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    *screen = ScreenSpace::new(window.width(), window.height());
}

/// Update the screen resource when the window is resized
fn track_window_resize(
    mut resized: MessageReader<WindowResized>,
    mut screen: ResMut<ScreenSpace>,
) {
    // last event wins
    let Some(event) = resized.read().last() else {
        return;
    };

    let next = ScreenSpace::new(event.width, event.height);
    if next != *screen {
        *screen = next;
        debug!("Screen resized to {}x{}", event.width, event.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_world_conversion() {
        let screen = ScreenSpace::new(800.0, 600.0);

        assert_eq!(screen.to_world(Vec2::new(400.0, 300.0)), Vec2::ZERO);
        assert_eq!(screen.to_world(Vec2::ZERO), Vec2::new(-400.0, 300.0));
        assert_eq!(screen.to_world(Vec2::new(800.0, 600.0)), Vec2::new(400.0, -300.0));
    }

    fn order_of<M: Component>(app: &mut App) -> isize {
        let mut cameras = app.world_mut().query_filtered::<&Camera, With<M>>();
        cameras.single(app.world()).unwrap().order
    }

    fn layers_of<M: Component>(app: &mut App) -> RenderLayers {
        let mut cameras = app.world_mut().query_filtered::<&RenderLayers, With<M>>();
        cameras.single(app.world()).unwrap().clone()
    }

    #[test]
    fn test_canvas_draws_between_backdrop_and_page() {
        let mut app = App::new();
        app.add_systems(Startup, setup_cameras);
        app.update();

        let backdrop = order_of::<BackdropCamera>(&mut app);
        let canvas = order_of::<CanvasCamera>(&mut app);
        let page = order_of::<PageCamera>(&mut app);
        let scene = order_of::<SceneCamera>(&mut app);
        let effects = order_of::<EffectsCamera>(&mut app);
        assert!(backdrop < canvas && canvas < page && page < scene && scene < effects);

        assert!(layers_of::<CanvasCamera>(&mut app).intersects(&RenderLayers::layer(CANVAS_LAYER)));
        assert!(!layers_of::<PageCamera>(&mut app).intersects(&RenderLayers::layer(CANVAS_LAYER)));
        assert!(!layers_of::<EffectsCamera>(&mut app).intersects(&RenderLayers::layer(CANVAS_LAYER)));
        assert!(!layers_of::<CanvasCamera>(&mut app).intersects(&RenderLayers::layer(BACKDROP_LAYER)));
    }
}
