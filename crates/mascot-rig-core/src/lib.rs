//! Mascot rig core (renderer-agnostic)
//!
//! Drives an on-screen character rig at two levels: a fuzzy resolver that
//! turns natural-language action tags into concrete rig resources discovered
//! from the character's asset folder, and a fixed-rate compositor that blends
//! ambient behavior, pointer tracking, posture overrides, and lip-sync into
//! one set of parameter values per frame. Rendering, audio, and text
//! generation live in host crates behind small trait seams.

pub mod backend;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod error;
pub mod index;
pub mod inputs;
pub mod manifest;
pub mod outputs;
pub mod params;
pub mod posture;
pub mod resolver;
pub mod voice;

// Re-exports for consumers (hosts)
pub use backend::{apply_frame, RigBackend, SupportsLipSync};
pub use compositor::{Compositor, IdleStrategy};
pub use config::Config;
pub use controller::{Controller, RigSettings};
pub use error::ResourceError;
pub use index::{Capabilities, ResourceIndex};
pub use inputs::{PointerSample, Surface, TickInputs};
pub use manifest::{Manifest, AUTO_MANIFEST_FILE};
pub use outputs::{Frame, MotionPriority, ParamWrite, RigCommand};
pub use posture::{PostureCommand, PostureMapper, PostureRule, DEFAULT_DURATION};
pub use resolver::{Resolution, TagResolver};
pub use voice::VoiceSignal;
