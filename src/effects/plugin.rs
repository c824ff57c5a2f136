use crate::effects::cursor::{
    CursorView, activate_cursor, animate_cursor, draw_cursor, release_cursor, update_hover_state,
};
use crate::effects::lifecycle::{
    SubscriptionKind as Kind, Subscriptions, TeardownView, prune_cancelled, teardown_on_exit,
    teardown_views, view_subscribed,
};
use crate::camera::CANVAS_LAYER;
use crate::effects::magnetic::{
    apply_magnetic_offsets, drive_magnetic_engine, release_magnetic_on_leave,
    sync_magnetic_registrations,
};
use crate::effects::node_canvas::{
    CanvasGizmos, NodeCanvas, activate_node_canvas, draw_node_canvas, resize_node_canvas,
    track_canvas_pointer,
};
use crate::effects::progress::{ProgressBar, activate_progress_bar, update_progress_bar};
use crate::effects::tilt::{
    ParallaxTilt, activate_tilt, animate_tilt, release_tilt_on_leave, track_tilt_pointer,
};
use crate::effects::trail::record_trail;
use crate::effects::typewriter::{RoleTypewriter, activate_typewriter, run_typewriter};
use crate::input::PointerSystems;
use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Subscriptions>()
            .add_message::<TeardownView>()
            .insert_gizmo_config(
                CanvasGizmos,
                GizmoConfig {
                    render_layers: RenderLayers::layer(CANVAS_LAYER),
                    ..default()
                },
            )
            // Views mount once the page exists
            .add_systems(
                PostStartup,
                (
                    activate_cursor,
                    activate_node_canvas,
                    activate_tilt,
                    activate_progress_bar,
                    activate_typewriter,
                ),
            )
            .add_systems(
                Update,
                (
                    // Cursor overlay
                    (
                        record_trail.run_if(view_subscribed::<CursorView>(Kind::PointerMove)),
                        update_hover_state.run_if(view_subscribed::<CursorView>(Kind::PointerOver)),
                        sync_magnetic_registrations
                            .run_if(view_subscribed::<CursorView>(Kind::PointerMove)),
                        drive_magnetic_engine.run_if(view_subscribed::<CursorView>(Kind::PointerMove)),
                        release_magnetic_on_leave
                            .run_if(view_subscribed::<CursorView>(Kind::PointerLeave)),
                        apply_magnetic_offsets.run_if(view_subscribed::<CursorView>(Kind::PointerMove)),
                        animate_cursor.run_if(view_subscribed::<CursorView>(Kind::AnimationFrame)),
                        draw_cursor.run_if(view_subscribed::<CursorView>(Kind::AnimationFrame)),
                    )
                        .chain(),
                    // Node canvas
                    (
                        resize_node_canvas.run_if(view_subscribed::<NodeCanvas>(Kind::Resize)),
                        track_canvas_pointer.run_if(view_subscribed::<NodeCanvas>(Kind::PointerMove)),
                        draw_node_canvas.run_if(view_subscribed::<NodeCanvas>(Kind::AnimationFrame)),
                    )
                        .chain(),
                    // Doodle tilt
                    (
                        track_tilt_pointer.run_if(view_subscribed::<ParallaxTilt>(Kind::PointerMove)),
                        release_tilt_on_leave
                            .run_if(view_subscribed::<ParallaxTilt>(Kind::PointerLeave)),
                        animate_tilt.run_if(view_subscribed::<ParallaxTilt>(Kind::AnimationFrame)),
                    )
                        .chain(),
                    update_progress_bar.run_if(
                        view_subscribed::<ProgressBar>(Kind::Scroll)
                            .or(view_subscribed::<ProgressBar>(Kind::Resize)),
                    ),
                    run_typewriter.run_if(view_subscribed::<RoleTypewriter>(Kind::Timer)),
                )
                    .after(PointerSystems),
            )
            .add_systems(
                Last,
                (teardown_views, prune_cancelled, release_cursor, teardown_on_exit).chain(),
            );
    }
}
