//! Controller: character load, tag dispatch, pointer interaction.
//!
//! Owns the per-character resource index and the compositor, and turns
//! resolver/mapper answers into playback commands. All context comes in
//! through `RigSettings` at construction; there are no process-wide
//! singletons to reach for.

use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::compositor::{Compositor, IdleStrategy};
use crate::config::Config;
use crate::error::ResourceError;
use crate::index::ResourceIndex;
use crate::inputs::TickInputs;
use crate::manifest;
use crate::outputs::{Frame, MotionPriority, RigCommand};
use crate::posture::PostureMapper;
use crate::resolver::{Resolution, TagResolver};

/// Explicitly injected context for a controller instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RigSettings {
    /// Initial pointer-tracking preference.
    pub tracking_enabled: bool,
    pub idle_strategy: IdleStrategy,
    /// Opt-in: write deep-scanned, manifest-unreferenced motions back into
    /// the manifest. Off by default; discovery stays ephemeral.
    pub persist_discovered: bool,
    /// Fixed seed for reproducible random picks. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            tracking_enabled: true,
            idle_strategy: IdleStrategy::Full,
            persist_discovered: false,
            seed: None,
        }
    }
}

pub struct Controller {
    settings: RigSettings,
    index: Option<ResourceIndex>,
    resolver: TagResolver,
    mapper: PostureMapper,
    compositor: Compositor,
}

impl Controller {
    pub fn new(cfg: Config, settings: RigSettings) -> Self {
        let (resolver, mut compositor) = match settings.seed {
            Some(seed) => (
                TagResolver::with_seed(seed),
                Compositor::with_seed(cfg, seed),
            ),
            None => (TagResolver::new(), Compositor::new(cfg)),
        };
        compositor.set_tracking_preference(settings.tracking_enabled);
        compositor.set_idle_strategy(settings.idle_strategy);
        Self {
            settings,
            index: None,
            resolver,
            mapper: PostureMapper::new(),
            compositor,
        }
    }

    /// Load the character under `dir`, replacing any current one. On error
    /// the previously loaded character stays fully active.
    pub fn load_character(&mut self, dir: &Path) -> Result<(), ResourceError> {
        let mut index = ResourceIndex::build(dir)?;

        if self.settings.persist_discovered {
            let orphans = index.unregistered_motions();
            if !orphans.is_empty() {
                if let Some(path) = manifest::find_manifest_file(dir) {
                    match manifest::persist_discovered_motions(&path, &orphans) {
                        // Rebuild so the new groups are addressable right away.
                        Ok(true) => index = ResourceIndex::build(dir)?,
                        Ok(false) => {}
                        Err(e) => warn!("could not persist discovered motions: {e}"),
                    }
                }
            }
        }

        self.resolver.rebind(&index);
        self.compositor.reset();
        self.index = Some(index);
        info!("character loaded from '{}'", dir.display());
        Ok(())
    }

    /// One-line health report for the loaded character.
    pub fn diagnostics(&self) -> String {
        match &self.index {
            Some(index) => {
                let caps = index.capabilities();
                let status = if caps.auto_generated {
                    "Auto-Generated (Basic)"
                } else {
                    "Healthy"
                };
                format!(
                    "Status: {status} | Physics: {} | Motions: {}",
                    caps.physics,
                    index.motion_count()
                )
            }
            None => "Status: No character loaded".to_string(),
        }
    }

    /// Dispatch a semantic tag from the conversation layer. Unresolved tags
    /// are a defined no-op.
    pub fn apply_tag(&mut self, tag: &str) {
        let resolution = match &self.index {
            Some(index) => self.resolver.resolve(index, tag),
            None => {
                warn!("tag '{tag}' ignored: no character loaded");
                return;
            }
        };
        match resolution {
            Resolution::Motion(file) => self.dispatch_motion_file(&file, MotionPriority::Force),
            Resolution::Expression(file) => self.dispatch_expression_file(&file),
            Resolution::None => debug!("tag '{tag}' not handled"),
        }
    }

    /// Map roleplay text to a posture and install it. A new posture replaces
    /// any active one outright.
    pub fn apply_posture(&mut self, text: &str) {
        let Some(command) = self.mapper.map(text) else {
            return;
        };
        if let Some(expression) = command.expression.clone() {
            self.set_expression(&expression);
        }
        if let Some(motion) = command.motion.clone() {
            self.trigger_motion(&motion);
        }
        if !command.params.is_empty() {
            self.compositor.apply_posture(&command);
        }
    }

    /// Pointer interaction in normalized coordinates, top = +1. The upper
    /// band of the character counts as the head.
    pub fn on_pointer_interaction(&mut self, x: f32, y: f32) {
        debug!("pointer interaction at ({x:.2}, {y:.2})");
        let region = if y > 0.4 { "tap_head" } else { "tap_body" };

        let pool = self.resolver.pool(region).to_vec();
        if let Some(file) = self.resolver.pick(&pool) {
            self.dispatch_motion_file(&file, MotionPriority::Force);
            return;
        }
        let shake = self.resolver.pool("shake").to_vec();
        if let Some(file) = self.resolver.pick(&shake) {
            self.dispatch_motion_file(&file, MotionPriority::Force);
            return;
        }
        let fallback = self.index.as_ref().and_then(|index| {
            index
                .find_expression("surprised")
                .or_else(|| index.find_expression("shock"))
                .map(str::to_string)
        });
        match fallback {
            Some(file) => self.dispatch_expression_file(&file),
            None => debug!("no interaction response registered"),
        }
    }

    /// Manual expression override by emotion name.
    pub fn set_expression(&mut self, emotion: &str) {
        let found = self
            .index
            .as_ref()
            .and_then(|index| index.find_expression(emotion))
            .map(str::to_string);
        match found {
            Some(file) => self.dispatch_expression_file(&file),
            None => warn!("expression '{emotion}' not found"),
        }
    }

    /// Manual motion trigger by logical name.
    pub fn trigger_motion(&mut self, name: &str) {
        let files = self
            .index
            .as_ref()
            .and_then(|index| index.find_motion(name))
            .map(|files| files.to_vec());
        match files.and_then(|files| self.resolver.pick(&files)) {
            Some(file) => self.dispatch_motion_file(&file, MotionPriority::Force),
            None => warn!("motion '{name}' not found"),
        }
    }

    /// Advance the compositor one frame.
    pub fn tick(&mut self, dt: f32, inputs: &TickInputs) -> &Frame {
        self.compositor.tick(dt, inputs)
    }

    pub fn index(&self) -> Option<&ResourceIndex> {
        self.index.as_ref()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Play a motion file through its group when the manifest covers it,
    /// by file otherwise.
    fn dispatch_motion_file(&mut self, file: &str, priority: MotionPriority) {
        let located = self
            .index
            .as_ref()
            .and_then(|index| index.locate(file))
            .map(|(group, i)| (group.to_string(), i));
        match located {
            Some((group, index)) => {
                debug!("playing '{file}' via group '{group}' [{index}]");
                self.compositor.queue_command(RigCommand::StartMotion {
                    group,
                    index,
                    priority,
                });
            }
            None => {
                debug!("'{file}' is in no group, playing by file");
                self.compositor.queue_command(RigCommand::StartMotionFile {
                    file: file.to_string(),
                    priority,
                });
            }
        }
    }

    fn dispatch_expression_file(&mut self, file: &str) {
        let name = ResourceIndex::expression_name(file).to_string();
        // Keep the blink suppressor in sync with what the rig shows.
        self.compositor.set_emotion(&name);
        self.compositor
            .queue_command(RigCommand::SetExpression { name });
    }
}
