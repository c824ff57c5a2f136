//! Easing and keyframe sampling for the cursor animations.

/// Ease-out cubic: fast at start, decelerates at end
/// Used for fades that should be visible right away
pub fn ease_out_cubic(t: f32) -> f32 {
    let x = 1.0 - t.clamp(0.0, 1.0);
    1.0 - x * x * x
}

/// Sample evenly spaced keyframes at `progress` in [0, 1].
///
/// `[0.8, 0.4, 0.0]` at 0.25 lies halfway between the first two stops.
pub fn keyframes(stops: &[f32], progress: f32) -> f32 {
    match stops {
        [] => 0.0,
        [only] => *only,
        _ => {
            let t = progress.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
            let i = (t.floor() as usize).min(stops.len() - 2);
            let local = t - i as f32;
            stops[i] + (stops[i + 1] - stops[i]) * local
        }
    }
}
