use bevy::prelude::*;
use serde::Deserialize;

const EFFECTS_JSON: &str = include_str!("../assets/effects.json");

/// Every tuning constant of the effects layer.
///
/// Defaults are the values the site shipped with; `assets/effects.json`
/// may override any subset of them.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct EffectsConfig {
    pub trail: TrailConfig,
    pub magnetic: MagneticConfig,
    pub orb: OrbConfig,
    pub highlight: HighlightConfig,
    pub outline: OutlineConfig,
    pub canvas: CanvasConfig,
    pub tilt: TiltConfig,
    pub typewriter: TypewriterConfig,
    pub embed: EmbedConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Maximum breadcrumbs kept (oldest evicted first)
    pub capacity: usize,
    /// Fade duration of the breadcrumb at index 0
    pub base_fade_secs: f32,
    /// Extra fade time per trail index
    pub fade_step_secs: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            base_fade_secs: 0.6,
            fade_step_secs: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    pub strength: f32,
    /// Distance (px) inside which the pull is undamped
    pub radius: f32,
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            strength: 0.25,
            radius: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub idle_size: f32,
    pub hover_size: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            idle_size: 22.0,
            hover_size: 44.0,
            stiffness: 250.0,
            damping: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
    pub fade_secs: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            width: 72.0,
            height: 48.0,
            opacity: 0.35,
            fade_secs: 0.18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Fraction of the remaining distance covered per frame
    pub ease: f32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self { ease: 0.12 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub node_count: usize,
    /// Max pixel distance for both node pairs and pointer proximity
    pub link_distance: f32,
    pub max_link_alpha: f32,
    pub dot_radius: f32,
    pub dot_alpha: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            node_count: 28,
            link_distance: 140.0,
            max_link_alpha: 0.12,
            dot_radius: 1.2,
            dot_alpha: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub max_pitch_deg: f32,
    pub max_yaw_deg: f32,
    pub ease: f32,
    pub hover_scale: f32,
    /// Freeze rotation (prefers-reduced-motion)
    pub reduced_motion: bool,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_pitch_deg: 8.0,
            max_yaw_deg: -10.0,
            ease: 0.08,
            hover_scale: 1.02,
            reduced_motion: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub words: Vec<String>,
    pub type_ms: u64,
    pub delete_ms: u64,
    pub hold_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            words: vec![
                "DevOps Engineer".to_string(),
                "Edge Computing Specialist".to_string(),
            ],
            type_ms: 60,
            delete_ms: 40,
            hold_ms: 1200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Asset path or URL of the hosted 3D scene. The bundled
    /// `assets/scenes/doodle.gltf` is the default; a path that fails to load
    /// leaves the line-art fallback up for good.
    pub source: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            source: "scenes/doodle.gltf#Scene0".to_string(),
        }
    }
}

impl EffectsConfig {
    /// Load the configuration embedded at build time
    pub fn load() -> Result<Self, String> {
        Self::from_json(EFFECTS_JSON)
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: EffectsConfig =
            serde_json::from_str(json).map_err(|e| format!("Invalid effects config: {}", e))?;

        if config.trail.capacity == 0 {
            return Err("trail.capacity must be at least 1".to_string());
        }
        if config.canvas.link_distance <= 0.0 {
            return Err(format!(
                "canvas.link_distance must be positive, got {}",
                config.canvas.link_distance
            ));
        }

        Ok(config)
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        let config = match EffectsConfig::load() {
            Ok(config) => config,
            Err(err) => {
                warn!("{} - falling back to built-in defaults", err);
                EffectsConfig::default()
            }
        };
        app.insert_resource(config);
    }
}
