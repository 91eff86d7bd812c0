//! Render backend seam.
//!
//! The core never draws; hosts implement `RigBackend` and replay each tick's
//! `Frame` onto it. Optional features are modeled as explicit capability
//! traits so callers ask the type system, not the object, what a backend
//! can do.

use crate::outputs::{Frame, MotionPriority, RigCommand};

/// Minimal surface every render backend provides. Parameter writes are
/// best-effort: an id the loaded rig lacks is simply dropped.
pub trait RigBackend {
    fn set_parameter(&mut self, id: &str, value: f32, weight: f32);
    fn start_motion(&mut self, group: &str, index: usize, priority: MotionPriority);
    fn start_random_motion(&mut self, group: &str, priority: MotionPriority);
    fn start_motion_file(&mut self, file: &str, priority: MotionPriority);
    fn set_expression(&mut self, name: &str);
}

/// Backends with their own audio-driven mouth animation implement this;
/// everyone else gets the compositor's procedural lip-sync writes.
pub trait SupportsLipSync: RigBackend {
    fn set_lip_sync(&mut self, active: bool);
}

/// Replay one tick's output onto a backend, writes first, then commands in
/// emission order.
pub fn apply_frame<B: RigBackend + ?Sized>(backend: &mut B, frame: &Frame) {
    for write in &frame.writes {
        backend.set_parameter(&write.id, write.value, write.weight);
    }
    for command in &frame.commands {
        match command {
            RigCommand::StartMotion {
                group,
                index,
                priority,
            } => backend.start_motion(group, *index, *priority),
            RigCommand::StartRandomMotion { group, priority } => {
                backend.start_random_motion(group, *priority)
            }
            RigCommand::StartMotionFile { file, priority } => {
                backend.start_motion_file(file, *priority)
            }
            RigCommand::SetExpression { name } => backend.set_expression(name),
        }
    }
}
