//! The per-frame animation compositor.
//!
//! One `tick` per render frame composites ambient behavior (breathing,
//! blinking, sway), pointer tracking, an optional posture override, and
//! lip-sync into one set of parameter writes plus discrete play commands.
//! Precedence per tick, highest first, winner per touched parameter:
//!
//! 1. posture override (suspends tracking and wind outright, masks any
//!    parameter it sets from the layers below)
//! 2. pointer tracking (head angle, eye ball, body lean)
//! 3. breathing (never suppressed by anything)
//! 4. wind sway (only while tracking, near center, no override)
//! 5. blink envelope (held off for emotions with authored eye shapes)
//! 6. lip-sync (hard zero while silent)
//! 7. idle motion trigger (lowest playback priority)
//!
//! The tick never blocks, never panics, and reads the cross-thread speaking
//! flag exactly once per frame.

use std::f32::consts::PI;
use std::sync::Arc;

use hashbrown::HashMap;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::inputs::TickInputs;
use crate::outputs::{Frame, MotionPriority, ParamWrite, RigCommand};
use crate::params::{self, legacy_alias};
use crate::posture::PostureCommand;
use crate::voice::VoiceSignal;

/// Emotions whose authored expressions already narrow or close the eyes;
/// blinking over them would pop the lids open.
const BLINK_HOLD_EMOTIONS: &[&str] = &["happy", "smile", "sleeping"];

/// How much ambience a character gets. Some rigs ship idle motions that
/// wrench the whole body around; `EyesOnly` keeps blink and breath but stops
/// triggering those.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdleStrategy {
    #[default]
    Full,
    EyesOnly,
}

#[derive(Clone, Debug)]
struct TrackingState {
    target: [f32; 2],
    current: [f32; 2],
    enabled: bool,
    /// The user's menu toggle. Survives transient posture suspensions.
    user_preference: bool,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0],
            current: [0.0, 0.0],
            enabled: true,
            user_preference: true,
        }
    }
}

#[derive(Clone, Debug)]
struct ActiveOverride {
    params: HashMap<String, f32>,
    expires_at: f32,
    /// Whether tracking was user-enabled when the override began. An
    /// override must never permanently clear the user's preference.
    resume_tracking: bool,
}

#[derive(Clone, Debug, Default)]
struct LipState {
    value: f32,
    target: f32,
    next_retarget: f32,
}

pub struct Compositor {
    cfg: Config,
    clock: f32,
    frame: Frame,
    tracking: TrackingState,
    wind_phase: f32,
    blink_timer: f32,
    lip: LipState,
    voice: Arc<VoiceSignal>,
    emotion: String,
    posture: Option<ActiveOverride>,
    pending: Vec<RigCommand>,
    idle_strategy: IdleStrategy,
    rng: StdRng,
}

impl Compositor {
    pub fn new(cfg: Config) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy())
    }

    /// Seeded construction for reproducible ambience in tests.
    pub fn with_seed(cfg: Config, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: Config, rng: StdRng) -> Self {
        Self {
            cfg,
            clock: 0.0,
            frame: Frame::default(),
            tracking: TrackingState::default(),
            wind_phase: 0.0,
            blink_timer: 0.0,
            lip: LipState::default(),
            voice: Arc::new(VoiceSignal::new()),
            emotion: "normal".to_string(),
            posture: None,
            pending: Vec::new(),
            idle_strategy: IdleStrategy::Full,
            rng,
        }
    }

    /// Handle for the audio collaborator; the only cross-thread input.
    pub fn voice(&self) -> Arc<VoiceSignal> {
        Arc::clone(&self.voice)
    }

    /// Reset per-character state. The user's tracking preference carries
    /// over; everything else starts fresh.
    pub fn reset(&mut self) {
        self.clock = 0.0;
        self.frame.clear();
        self.pending.clear();
        self.posture = None;
        self.tracking.target = [0.0, 0.0];
        self.tracking.current = [0.0, 0.0];
        self.tracking.enabled = self.tracking.user_preference;
        self.wind_phase = 0.0;
        self.blink_timer = 0.0;
        self.lip = LipState::default();
        self.emotion = "normal".to_string();
    }

    /// The user's tracking toggle. Takes effect immediately unless a posture
    /// override currently has tracking suspended, in which case it is only
    /// recorded for the resume decision.
    pub fn set_tracking_preference(&mut self, enabled: bool) {
        self.tracking.user_preference = enabled;
        if self.posture.is_none() {
            self.tracking.enabled = enabled;
        }
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking.enabled
    }

    pub fn tracking_preference(&self) -> bool {
        self.tracking.user_preference
    }

    pub fn set_idle_strategy(&mut self, strategy: IdleStrategy) {
        self.idle_strategy = strategy;
    }

    /// Current emotion label, used to hold blinking off while an authored
    /// expression owns the eyes.
    pub fn set_emotion(&mut self, emotion: &str) {
        self.emotion = emotion.to_lowercase();
    }

    pub fn emotion(&self) -> &str {
        &self.emotion
    }

    /// Queue a discrete command for the next tick's frame.
    pub fn queue_command(&mut self, command: RigCommand) {
        self.pending.push(command);
    }

    /// Install a posture override. Last call wins outright; there is no
    /// priority arbitration between temporally separate calls.
    pub fn apply_posture(&mut self, command: &PostureCommand) {
        debug!(
            "posture override: {} param(s) for {:.1}s",
            command.params.len(),
            command.duration
        );
        self.posture = Some(ActiveOverride {
            params: command.params.clone(),
            expires_at: self.clock + command.duration,
            resume_tracking: self.tracking.user_preference,
        });
        // Tracking is suspended for the duration so the head cannot fight
        // the override. The user preference itself is untouched.
        self.tracking.enabled = false;
    }

    pub fn posture_active(&self) -> bool {
        self.posture.is_some()
    }

    pub fn lip_value(&self) -> f32 {
        self.lip.value
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Advance one frame. `dt` is the elapsed time in seconds since the
    /// previous tick.
    pub fn tick(&mut self, dt: f32, inputs: &TickInputs) -> &Frame {
        self.clock += dt;
        self.frame.clear();

        // Explicit commands queued since the last tick ship first.
        self.frame.commands.append(&mut self.pending);

        // 1. Posture override window.
        let expired = self
            .posture
            .as_ref()
            .is_some_and(|active| self.clock >= active.expires_at);
        if expired {
            if let Some(active) = self.posture.take() {
                // Resume only if the user had tracking on when the override
                // began; never resurrect a preference the user turned off.
                self.tracking.enabled = active.resume_tracking;
            }
        }
        let posture_active = self.posture.is_some();
        if let Some(active) = &self.posture {
            for (id, value) in &active.params {
                self.frame.writes.push(ParamWrite {
                    id: id.clone(),
                    value: *value,
                    weight: 1.0,
                });
                self.frame.writes.push(ParamWrite {
                    id: legacy_alias(id),
                    value: *value,
                    weight: 1.0,
                });
            }
        }

        // 2. Pointer tracking. Skipped wholesale while a posture is active.
        if !posture_active {
            self.step_tracking(inputs);
        }

        // 3. Breathing. Fixed angular speed, so the period does not depend
        // on the tick rate. Never suppressed.
        let breath =
            ((self.clock * self.cfg.breath.speed).sin() + 1.0) * self.cfg.breath.amplitude;
        self.write(params::BREATH, breath, 1.0);

        // 4. Wind sway, only near center look with tracking live.
        if self.tracking.enabled && !posture_active {
            self.wind_phase += self.cfg.wind.speed * dt;
            let noise = self.wind_phase.sin() * 0.5 + (self.wind_phase * 0.5).sin() * 0.3;
            if self.tracking.target[0].abs() < self.cfg.wind.center_guard {
                self.write(
                    params::ANGLE_Z,
                    noise * self.cfg.wind.tilt_scale,
                    self.cfg.wind.weight,
                );
            }
        }

        // 5. Blink.
        self.step_blink(dt);

        // 6. Lip-sync. One atomic read per frame.
        let speaking = self.voice.is_speaking();
        self.step_lip(speaking);

        // 7. Idle motion trigger, lowest playback priority.
        if !speaking
            && self.idle_strategy == IdleStrategy::Full
            && self.rng.gen::<f32>() < self.cfg.idle.chance
        {
            self.frame.push_command(RigCommand::StartRandomMotion {
                group: self.cfg.idle.group.clone(),
                priority: MotionPriority::Idle,
            });
        }

        &self.frame
    }

    fn step_tracking(&mut self, inputs: &TickInputs) {
        let t = self.cfg.tracking.clone();
        if self.tracking.enabled {
            if let Some(pointer) = inputs.pointer {
                let head_x = inputs.surface.width * t.head_anchor[0];
                let head_y = inputs.surface.height * t.head_anchor[1];
                let half_w = (inputs.surface.width * 0.5).max(1.0);
                let half_h = (inputs.surface.height * 0.5).max(1.0);
                // Screen y grows downward; the rig's look-up is positive.
                let raw_x = ((pointer.x - head_x) / half_w).clamp(-1.0, 1.0);
                let raw_y = (-(pointer.y - head_y) / half_h).clamp(-1.0, 1.0);
                self.tracking.target = [
                    (raw_x * t.gain).clamp(-1.0, 1.0),
                    (raw_y * t.gain).clamp(-1.0, 1.0),
                ];
            }
            self.tracking.current[0] +=
                (self.tracking.target[0] - self.tracking.current[0]) * t.smoothing;
            self.tracking.current[1] +=
                (self.tracking.target[1] - self.tracking.current[1]) * t.smoothing;
        } else {
            // Drift back to center, slower than the chase.
            self.tracking.current[0] -= self.tracking.current[0] * t.release;
            self.tracking.current[1] -= self.tracking.current[1] * t.release;
        }

        let [x, y] = self.tracking.current;
        self.write(params::ANGLE_X, x * t.head_angle_scale, 1.0);
        self.write(params::ANGLE_Y, y * t.head_angle_scale, 1.0);
        self.write(params::EYE_BALL_X, x, 1.0);
        self.write(params::EYE_BALL_Y, y, 1.0);
        self.write(params::BODY_ANGLE_X, x * t.body_angle_scale, 1.0);
    }

    fn step_blink(&mut self, dt: f32) {
        if BLINK_HOLD_EMOTIONS.contains(&self.emotion.as_str()) {
            return;
        }
        if self.blink_timer <= 0.0 {
            if self.rng.gen::<f32>() < self.cfg.blink.chance {
                self.blink_timer = self.cfg.blink.duration;
            }
            return;
        }
        self.blink_timer -= dt;
        let t = self.blink_timer.max(0.0);
        // Bell envelope: open -> closed -> open over the blink duration.
        let eye = (1.0 - ((t / self.cfg.blink.duration) * PI).sin()).clamp(0.0, 1.0);
        self.write(params::EYE_L_OPEN, eye, 1.0);
        self.write(params::EYE_R_OPEN, eye, 1.0);
    }

    fn step_lip(&mut self, speaking: bool) {
        let lip = self.cfg.lip.clone();
        if speaking {
            if self.clock >= self.lip.next_retarget {
                self.lip.target = if self.rng.gen::<f32>() < lip.pause_chance {
                    0.0
                } else {
                    self.rng.gen_range(lip.open_range[0]..=lip.open_range[1])
                };
                self.lip.next_retarget = self.clock
                    + self
                        .rng
                        .gen_range(lip.retarget_interval[0]..=lip.retarget_interval[1]);
            }
            self.lip.value = self.lip.value * (1.0 - lip.attack) + self.lip.target * lip.attack;
        } else {
            // Decay to a hard zero so no authored motion can keep the mouth
            // moving while silent.
            self.lip.value *= lip.decay;
            if self.lip.value < lip.epsilon {
                self.lip.value = 0.0;
            }
        }
        self.write(params::MOUTH_OPEN_Y, self.lip.value, 1.0);
    }

    /// Emit a write under both parameter spellings unless an active posture
    /// override already owns the id this tick.
    fn write(&mut self, id: &str, value: f32, weight: f32) {
        if let Some(active) = &self.posture {
            if active.params.contains_key(id) {
                return;
            }
        }
        self.frame.push_write(id, value, weight);
        self.frame.push_write(legacy_alias(id), value, weight);
    }
}
