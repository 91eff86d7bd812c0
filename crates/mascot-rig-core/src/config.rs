//! Compositor tuning knobs.
//!
//! Every numeric the per-frame state machine uses lives here so hosts can
//! reshape the ambient behavior without touching the tick code. Defaults are
//! tuned for a desktop mascot rendered at roughly 60 Hz.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub breath: BreathConfig,
    pub wind: WindConfig,
    pub blink: BlinkConfig,
    pub lip: LipConfig,
    pub idle: IdleConfig,
}

/// Pointer tracking: where the head sits on the render surface and how the
/// look vector chases the pointer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Head anchor as a fraction of the surface, x from left, y from top.
    pub head_anchor: [f32; 2],
    /// Gain applied to the normalized pointer offset before clamping.
    pub gain: f32,
    /// Exponential smoothing factor per tick while tracking is enabled.
    pub smoothing: f32,
    /// Smoothing factor per tick while decaying back to center.
    pub release: f32,
    /// Degrees of head turn at full look deflection.
    pub head_angle_scale: f32,
    /// Degrees of body lean at full look deflection.
    pub body_angle_scale: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BreathConfig {
    /// Angular speed of the breathing sinusoid in rad/s. Period is
    /// independent of the tick rate.
    pub speed: f32,
    /// Peak-to-peak is twice this value; the parameter stays in [0, 2a].
    pub amplitude: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindConfig {
    /// Phase advance in rad/s for the composite sine noise.
    pub speed: f32,
    /// Head tilt degrees at full noise deflection.
    pub tilt_scale: f32,
    /// Blend weight of the sway write.
    pub weight: f32,
    /// Sway is held off unless |target look x| is below this, so it never
    /// fights a deliberate head turn.
    pub center_guard: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlinkConfig {
    /// Per-tick chance of starting a blink.
    pub chance: f32,
    /// Seconds from open to closed to open.
    pub duration: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LipConfig {
    /// Chance that a retarget lands on a closed-mouth pause.
    pub pause_chance: f32,
    /// Open-mouth target range while speaking.
    pub open_range: [f32; 2],
    /// Seconds between retargets, drawn uniformly.
    pub retarget_interval: [f32; 2],
    /// Approach factor toward the target per tick while speaking.
    pub attack: f32,
    /// Retained fraction per tick while silent.
    pub decay: f32,
    /// Below this the mouth snaps to exactly zero.
    pub epsilon: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Per-tick chance of starting an idle motion while silent.
    pub chance: f32,
    /// Motion group the idle trigger draws from.
    pub group: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig {
                head_anchor: [0.5, 0.3],
                gain: 1.5,
                smoothing: 0.1,
                release: 0.05,
                head_angle_scale: 30.0,
                body_angle_scale: 10.0,
            },
            breath: BreathConfig {
                speed: 0.3,
                amplitude: 0.2,
            },
            wind: WindConfig {
                speed: 1.2,
                tilt_scale: 1.0,
                weight: 0.5,
                center_guard: 0.2,
            },
            blink: BlinkConfig {
                chance: 0.01,
                duration: 0.25,
            },
            lip: LipConfig {
                pause_chance: 0.2,
                open_range: [0.3, 1.0],
                retarget_interval: [0.05, 0.15],
                attack: 0.4,
                decay: 0.8,
                epsilon: 0.01,
            },
            idle: IdleConfig {
                chance: 0.01,
                group: "Idle".to_string(),
            },
        }
    }
}
