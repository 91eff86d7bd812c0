//! Output contracts from the compositor.
//!
//! A `Frame` carries only the numeric writes for this tick, keyed by rig
//! parameter id, plus the discrete play commands. The render backend applies
//! writes best-effort: an id the loaded rig does not expose is silently
//! dropped there, never an error here.

use serde::{Deserialize, Serialize};

/// One parameter write for this tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamWrite {
    pub id: String,
    pub value: f32,
    /// Blend weight in [0,1]; ambient sway uses a partial weight.
    pub weight: f32,
}

/// Playback priority ladder. Idle triggers sit at the bottom so an explicit
/// command in flight is never preempted by ambience.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum MotionPriority {
    Idle = 1,
    Normal = 2,
    Force = 3,
}

/// Discrete playback commands emitted alongside parameter writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RigCommand {
    /// Play a specific motion addressed by group and index.
    StartMotion {
        group: String,
        index: usize,
        priority: MotionPriority,
    },
    /// Let the backend pick any motion from a group.
    StartRandomMotion {
        group: String,
        priority: MotionPriority,
    },
    /// Fallback for motion files the manifest assigns to no group.
    StartMotionFile {
        file: String,
        priority: MotionPriority,
    },
    /// Apply an authored expression by name.
    SetExpression { name: String },
}

/// Everything the compositor produced for one tick. Cleared and reused.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub writes: Vec<ParamWrite>,
    #[serde(default)]
    pub commands: Vec<RigCommand>,
}

impl Frame {
    #[inline]
    pub fn clear(&mut self) {
        self.writes.clear();
        self.commands.clear();
    }

    #[inline]
    pub fn push_write(&mut self, id: impl Into<String>, value: f32, weight: f32) {
        self.writes.push(ParamWrite {
            id: id.into(),
            value,
            weight,
        });
    }

    #[inline]
    pub fn push_command(&mut self, command: RigCommand) {
        self.commands.push(command);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.commands.is_empty()
    }

    /// Last write for an id this tick, if any. Test and tooling helper.
    pub fn write_for(&self, id: &str) -> Option<&ParamWrite> {
        self.writes.iter().rev().find(|w| w.id == id)
    }
}
