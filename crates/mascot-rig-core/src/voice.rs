//! Speaking flag shared with the audio collaborator.
//!
//! The compositor tick runs on the render thread while the voice engine
//! toggles speech from its own thread. A single atomic bool is the whole
//! cross-thread surface; the tick reads it once per frame so a toggle can
//! never tear a frame in half.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct VoiceSignal {
    speaking: AtomicBool,
}

impl VoiceSignal {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Relaxed)
    }
}
