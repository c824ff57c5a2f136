use bevy::prelude::*;

use crate::{
    camera::ScreenSpace,
    config::EffectsConfig,
    effects::{
        cursor::{hover::HoverState, outline::OutlineFollower, spring::Spring},
        trail::{CursorTrail, TrailBuffer, TrailId},
        utils::{ease_out_cubic, keyframes},
    },
    input::PointerState,
};

const CRUMB_OPACITY: [f32; 3] = [0.8, 0.4, 0.0];
const CRUMB_SCALE: [f32; 3] = [1.0, 0.9, 0.6];
const CRUMB_RADIUS: f32 = 3.0;

/// Concentric rings used to fake a filled, soft-edged disc
const GLOW_LAYERS: usize = 8;

/// Idle glow: cyan, blur 35 spread 12
const IDLE_GLOW: GlowStyle = GlowStyle {
    color: Color::srgba(14.0 / 255.0, 165.0 / 255.0, 233.0 / 255.0, 0.35),
    blur: 35.0,
    spread: 12.0,
};

/// Hover glow: violet, blur 60 spread 22
const HOVER_GLOW: GlowStyle = GlowStyle {
    color: Color::srgba(107.0 / 255.0, 70.0 / 255.0, 193.0 / 255.0, 0.45),
    blur: 60.0,
    spread: 22.0,
};

const ORB_CORE: Color = Color::srgba(14.0 / 255.0, 165.0 / 255.0, 233.0 / 255.0, 0.9);
const ORB_RIM: Color = Color::srgba(107.0 / 255.0, 70.0 / 255.0, 193.0 / 255.0, 0.85);
const CRUMB_COLOR: Color = Color::srgb(103.0 / 255.0, 232.0 / 255.0, 249.0 / 255.0);
const HIGHLIGHT_COLOR: Color = CRUMB_COLOR;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowStyle {
    pub color: Color,
    pub blur: f32,
    pub spread: f32,
}

impl GlowStyle {
    /// Colour travels around the hue wheel rather than through grey
    pub fn mix(a: GlowStyle, b: GlowStyle, t: f32) -> GlowStyle {
        GlowStyle {
            color: Color::Hsva(Hsva::from(a.color).mix(&Hsva::from(b.color), t)),
            blur: a.blur + (b.blur - a.blur) * t,
            spread: a.spread + (b.spread - a.spread) * t,
        }
    }
}

/// A fading mark left at a past pointer position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breadcrumb {
    pub id: TrailId,
    pub position: Vec2,
    pub age: f32,
    /// Fade length, fixed when the crumb first appears
    pub duration: f32,
}

impl Breadcrumb {
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.age / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn opacity(&self) -> f32 {
        keyframes(&CRUMB_OPACITY, self.progress())
    }

    pub fn scale(&self) -> f32 {
        keyframes(&CRUMB_SCALE, self.progress())
    }

    pub fn is_faded(&self) -> bool {
        self.progress() >= 1.0
    }
}

/// Fade duration of the crumb at trail `index`
pub fn crumb_duration(index: usize, base_secs: f32, step_secs: f32) -> f32 {
    base_secs + index as f32 * step_secs
}

/// Everything the cursor draws, advanced once per frame
#[derive(Resource, Debug, Clone)]
pub struct CursorVisuals {
    pub crumbs: Vec<Breadcrumb>,
    pub position: Option<Vec2>,
    pub size: Spring,
    /// 0 = idle glow, 1 = hover glow
    pub glow: Spring,
    pub highlight: f32,
    pub outline: OutlineFollower,
}

impl CursorVisuals {
    pub fn new(config: &EffectsConfig, screen: &ScreenSpace) -> Self {
        let orb = config.orb;
        Self {
            crumbs: Vec::new(),
            position: None,
            size: Spring::new(orb.idle_size, orb.stiffness, orb.damping),
            glow: Spring::new(0.0, orb.stiffness, orb.damping),
            highlight: 0.0,
            outline: OutlineFollower::new(screen.center(), config.outline.ease),
        }
    }

    /// Match crumbs to the trail: new entries appear, evicted ones vanish
    pub fn sync_crumbs(&mut self, trail: &TrailBuffer, base_secs: f32, step_secs: f32) {
        self.crumbs.retain(|crumb| trail.contains(crumb.id));

        for (index, entry) in trail.iter().enumerate() {
            if self.crumbs.iter().any(|c| c.id == entry.id) {
                continue;
            }
            self.crumbs.push(Breadcrumb {
                id: entry.id,
                position: entry.position,
                age: 0.0,
                duration: crumb_duration(index, base_secs, step_secs),
            });
        }
    }

    pub fn advance(&mut self, dt: f32, hover: HoverState, config: &EffectsConfig) {
        for crumb in &mut self.crumbs {
            crumb.age += dt;
        }

        let hovering = hover.is_hovering();
        self.size.set_target(if hovering {
            config.orb.hover_size
        } else {
            config.orb.idle_size
        });
        self.glow.set_target(if hovering { 1.0 } else { 0.0 });
        self.size.step(dt);
        self.glow.step(dt);

        // The highlight box only exists while hovering
        self.highlight = if hovering {
            let fade = config.highlight.fade_secs.max(f32::EPSILON);
            (self.highlight + dt / fade).min(1.0)
        } else {
            0.0
        };

        self.outline.outlined = hovering;
        if let Some(position) = self.position {
            self.outline.set_target(position);
        }
        self.outline.tick();
    }

    pub fn glow_style(&self) -> GlowStyle {
        GlowStyle::mix(IDLE_GLOW, HOVER_GLOW, self.glow.value.clamp(0.0, 1.0))
    }

    pub fn highlight_opacity(&self, config: &EffectsConfig) -> f32 {
        ease_out_cubic(self.highlight) * config.highlight.opacity
    }
}

/// System: advance the cursor's animation state
pub fn animate_cursor(
    time: Res<Time>,
    trail: Res<CursorTrail>,
    hover: Res<HoverState>,
    pointer: Res<PointerState>,
    config: Res<EffectsConfig>,
    visuals: Option<ResMut<CursorVisuals>>,
) {
    let Some(mut visuals) = visuals else {
        return;
    };

    visuals.position = pointer.position;
    visuals.sync_crumbs(
        &trail.buffer,
        config.trail.base_fade_secs,
        config.trail.fade_step_secs,
    );
    visuals.advance(time.delta_secs(), *hover, &config);
}

/// System: draw breadcrumbs, orb, highlight box and outline
pub fn draw_cursor(
    visuals: Option<Res<CursorVisuals>>,
    config: Res<EffectsConfig>,
    screen: Res<ScreenSpace>,
    mut gizmos: Gizmos,
) {
    let Some(visuals) = visuals else {
        return;
    };

    for crumb in &visuals.crumbs {
        if crumb.is_faded() {
            continue;
        }
        let center = screen.to_world(crumb.position);
        let color = CRUMB_COLOR.with_alpha(crumb.opacity() * 0.7);
        draw_disc(&mut gizmos, center, CRUMB_RADIUS * crumb.scale(), color, 3);
    }

    let Some(position) = visuals.position else {
        return;
    };
    let center = screen.to_world(position);

    // Glow halo first, orb on top
    let radius = visuals.size.value.max(0.0) * 0.5;
    let glow = visuals.glow_style();
    let halo = radius + glow.spread + glow.blur * 0.5;
    for i in 0..GLOW_LAYERS {
        let t = (i + 1) as f32 / GLOW_LAYERS as f32;
        let r = radius + (halo - radius) * t;
        let alpha = glow.color.alpha() * (1.0 - t * t);
        gizmos.circle_2d(center, r, glow.color.with_alpha(alpha));
    }

    for i in 0..GLOW_LAYERS {
        let t = i as f32 / GLOW_LAYERS as f32;
        let color = ORB_CORE.mix(&ORB_RIM, t);
        gizmos.circle_2d(center, radius * (1.0 - t * 0.9), color);
    }

    let highlight = visuals.highlight_opacity(&config);
    if highlight > 0.0 {
        let size = Vec2::new(config.highlight.width, config.highlight.height);
        gizmos
            .rounded_rect_2d(center, size, HIGHLIGHT_COLOR.with_alpha(highlight))
            .corner_radius(12.0);
    }

    let outline_center = screen.to_world(visuals.outline.current);
    if visuals.outline.outlined {
        gizmos.circle_2d(outline_center, 18.0, Color::srgba(0.0, 0.0, 0.0, 0.6));
    } else {
        gizmos.circle_2d(outline_center, 6.0, Color::srgba(0.0, 0.0, 0.0, 0.3));
    }
}

fn draw_disc(gizmos: &mut Gizmos, center: Vec2, radius: f32, color: Color, rings: usize) {
    for i in 0..rings {
        let r = radius * (1.0 - i as f32 / rings as f32);
        gizmos.circle_2d(center, r, color);
    }
}
