//! Resource index: logical-name lookup tables for one loaded character.
//!
//! Built once per character load from the manifest plus a deep directory
//! scan, then owned read-only by the controller. Lookup keys are normalized
//! logical names: lowercased, with trailing numeric suffixes stripped for
//! motions, so `Tap_01.motion3.json` answers to `tap`.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use log::{debug, info, warn};

use crate::error::ResourceError;
use crate::manifest::{
    self, file_name_of, Manifest, EXPRESSION_SUFFIX, MOTION_SUFFIX, PHYSICS_SUFFIX,
};

/// What the loaded character supports, probed at index build time.
#[derive(Copy, Clone, Debug, Default)]
pub struct Capabilities {
    pub physics: bool,
    pub lip_sync: bool,
    pub eye_blink: bool,
    /// The manifest was synthesized, not authored.
    pub auto_generated: bool,
}

/// Keyword table used by the expression fuzzy lookup.
const EMOTION_ALIASES: &[(&str, &[&str])] = &[
    ("happy", &["smile", "joy", "laugh", "happy"]),
    ("sad", &["cry", "tear", "sad", "depressed", "grief"]),
    ("angry", &["mad", "rage", "angry", "furious"]),
    ("surprised", &["shock", "wow", "surprise"]),
    ("shy", &["blush", "shy", "embarrassed"]),
    ("neutral", &["normal", "idle", "default"]),
];

#[derive(Debug)]
pub struct ResourceIndex {
    root: PathBuf,
    manifest: Manifest,
    /// logical name -> relative file path
    expressions: HashMap<String, String>,
    /// logical name (suffix-stripped) -> relative file paths
    motions: HashMap<String, Vec<String>>,
    /// group name -> ordered relative file paths
    groups: HashMap<String, Vec<String>>,
    /// relative file path -> (group, index), for playback addressing
    locate: HashMap<String, (String, usize)>,
    capabilities: Capabilities,
}

impl ResourceIndex {
    /// Build the index for the character under `dir`.
    ///
    /// A missing manifest is synthesized; a malformed one is logged and
    /// replaced by synthesis. Only the absence of core rig data is fatal.
    pub fn build(dir: &Path) -> Result<ResourceIndex, ResourceError> {
        let manifest = match manifest::find_manifest_file(dir) {
            Some(path) => match Manifest::load(&path) {
                Ok(m) => m,
                Err(e) => {
                    warn!("{e}; regenerating manifest for '{}'", dir.display());
                    Manifest::synthesize(dir)?
                }
            },
            None => {
                info!("no manifest in '{}', synthesizing one", dir.display());
                Manifest::synthesize(dir)?
            }
        };

        let mut index = ResourceIndex {
            root: dir.to_path_buf(),
            capabilities: Capabilities {
                physics: manifest.file_references.physics.is_some(),
                lip_sync: true,
                eye_blink: true,
                auto_generated: manifest.auto_generated,
            },
            manifest,
            expressions: HashMap::new(),
            motions: HashMap::new(),
            groups: HashMap::new(),
            locate: HashMap::new(),
        };

        index.register_manifest();
        index.deep_scan();

        let orphans = index.unregistered_motions();
        if !orphans.is_empty() {
            debug!("{} motion file(s) outside any manifest group", orphans.len());
        }
        info!(
            "indexed {} expressions, {} motions, {} groups under '{}'",
            index.expressions.len(),
            index.motions.len(),
            index.groups.len(),
            dir.display()
        );
        Ok(index)
    }

    /// Register everything the manifest references.
    fn register_manifest(&mut self) {
        let refs = self.manifest.file_references.clone();
        for exp in &refs.expressions {
            self.register_expression(&exp.name, &exp.file);
        }
        for (group, entries) in &refs.motions {
            let files: Vec<String> = entries.iter().map(|m| normalize(&m.file)).collect();
            for (i, file) in files.iter().enumerate() {
                self.locate.insert(file.clone(), (group.clone(), i));
                self.register_motion(group, file);
            }
            self.groups.insert(group.clone(), files);
        }
    }

    /// Re-walk the tree for resources the manifest does not mention and
    /// register them as additional discoverable entries. Nothing is written
    /// back to the manifest here.
    fn deep_scan(&mut self) {
        let root = self.root.clone();
        let mut expressions: Vec<(String, String)> = Vec::new();
        let mut motions: Vec<(String, String)> = Vec::new();
        let mut physics = false;
        manifest::walk_tree(&root, &mut |rel, _abs| {
            let name = file_name_of(rel);
            if let Some(stem) = name.strip_suffix(EXPRESSION_SUFFIX) {
                expressions.push((stem.to_string(), rel.to_string()));
            } else if let Some(stem) = name.strip_suffix(MOTION_SUFFIX) {
                motions.push((stem.to_string(), rel.to_string()));
            } else if name.ends_with(PHYSICS_SUFFIX) {
                physics = true;
            }
        });
        for (stem, rel) in expressions {
            self.register_expression(&stem, &rel);
        }
        for (stem, rel) in motions {
            self.register_motion(&stem, &rel);
        }
        self.capabilities.physics |= physics;
    }

    fn register_expression(&mut self, name: &str, path: &str) {
        let key = name.to_lowercase();
        let path = normalize(path);
        if self.expressions.contains_key(&key) {
            return;
        }
        self.expressions.insert(key.clone(), path.clone());

        // Canonical emotion aliases so "happy" finds a smile even when the
        // author named it something else.
        if key.contains("smile") {
            self.expressions.insert("happy".into(), path.clone());
        }
        if key.contains("sad") {
            self.expressions.insert("cry".into(), path.clone());
        }
        if key.contains("angry") {
            self.expressions.insert("mad".into(), path);
        }
    }

    fn register_motion(&mut self, name: &str, path: &str) {
        let key = strip_numeric_suffix(&name.to_lowercase());
        let path = normalize(path);
        let files = self.motions.entry(key).or_default();
        if !files.contains(&path) {
            files.push(path);
        }
    }

    // ---- lookups ----

    /// Motion files registered under an exact logical name.
    pub fn motion_files(&self, logical: &str) -> Option<&[String]> {
        self.motions.get(logical).map(|v| v.as_slice())
    }

    /// Ordered files of a group, matched case-insensitively.
    pub fn group_files(&self, group: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(group))
            .map(|(_, files)| files.as_slice())
    }

    /// Reverse lookup: which group and index a motion file plays as.
    pub fn locate(&self, file: &str) -> Option<(&str, usize)> {
        self.locate
            .get(&normalize(file))
            .map(|(group, index)| (group.as_str(), *index))
    }

    /// Fuzzy motion lookup: exact logical name, group name, a few verbal
    /// shortcuts, then partial key-in-tag match.
    pub fn find_motion(&self, tag: &str) -> Option<&[String]> {
        let tag = tag.to_lowercase();
        let clean = clean_tag(&tag);

        if let Some(files) = self.motions.get(clean) {
            return Some(files.as_slice());
        }
        if let Some(files) = self.group_files(clean) {
            return Some(files);
        }

        if tag.contains("wave") || tag.contains("hello") {
            if let Some(files) = self.motions.get("wave").or_else(|| self.motions.get("flickleft")) {
                return Some(files.as_slice());
            }
        }
        if tag.contains("nod") || tag.contains("yes") {
            if let Some(files) = self.motions.get("nod").or_else(|| self.motions.get("flickright")) {
                return Some(files.as_slice());
            }
        }
        if (tag.contains("shake") || tag.contains("no")) && self.motions.contains_key("shake") {
            return self.motions.get("shake").map(|v| v.as_slice());
        }

        // Partial match over sorted keys so the pick is stable; hash order
        // is not.
        let mut partial: Vec<&String> = self
            .motions
            .keys()
            .filter(|key| !key.is_empty() && tag.contains(key.as_str()))
            .collect();
        partial.sort();
        partial
            .first()
            .and_then(|key| self.motions.get(*key))
            .map(|files| files.as_slice())
    }

    /// Fuzzy expression lookup: exact logical name, registered-name-in-tag,
    /// then the canonical emotion keyword table.
    pub fn find_expression(&self, tag: &str) -> Option<&str> {
        let tag = tag.to_lowercase();

        if let Some(path) = self.expressions.get(&tag) {
            return Some(path);
        }
        if let Some(path) = self.scan_expressions(|key| !key.is_empty() && tag.contains(key)) {
            return Some(path);
        }

        for (emotion, aliases) in EMOTION_ALIASES {
            for alias in *aliases {
                if !tag.contains(alias) {
                    continue;
                }
                if let Some(path) = self.expressions.get(*emotion) {
                    return Some(path);
                }
                if let Some(path) = self.scan_expressions(|key| key.contains(alias)) {
                    return Some(path);
                }
            }
        }
        None
    }

    /// First expression (by sorted logical name, for stability) whose key
    /// satisfies the predicate.
    fn scan_expressions(&self, pred: impl Fn(&str) -> bool) -> Option<&str> {
        let mut keys: Vec<&String> = self
            .expressions
            .keys()
            .filter(|k| pred(k.as_str()))
            .collect();
        keys.sort();
        keys.first()
            .and_then(|key| self.expressions.get(*key))
            .map(|path| path.as_str())
    }

    /// Motion files the deep scan found that no manifest group covers.
    /// Kept ephemeral unless the host opted into persistence.
    pub fn unregistered_motions(&self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .motions
            .values()
            .flatten()
            .filter(|file| !self.locate.contains_key(*file))
            .cloned()
            .collect();
        orphans.sort();
        orphans.dedup();
        orphans
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn expression_count(&self) -> usize {
        self.expressions.len()
    }

    pub fn motion_count(&self) -> usize {
        self.motions.len()
    }

    /// Logical expression name for a file path, derived from its stem.
    pub fn expression_name(file: &str) -> &str {
        let name = file_name_of(file);
        name.split('.').next().unwrap_or(name)
    }
}

/// Strip conversational filler so "looks happy" matches like "happy".
pub(crate) fn clean_tag(tag: &str) -> &str {
    let mut t = tag;
    for prefix in ["looks ", "look ", "is "] {
        if let Some(rest) = t.strip_prefix(prefix) {
            t = rest;
        }
    }
    t.trim()
}

/// Strip a trailing numeric suffix and its separator: `tap_01` -> `tap`,
/// `wave2` -> `wave`. Names that are nothing but digits are kept as-is.
fn strip_numeric_suffix(key: &str) -> String {
    let digits_start = key
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + key[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    if digits_start == 0 || digits_start == key.len() {
        return key.to_string();
    }
    let stem = key[..digits_start].trim_end_matches(['_', '-', ' ']);
    if stem.is_empty() {
        key.to_string()
    } else {
        stem.to_string()
    }
}

/// Manifests written on Windows sometimes carry backslashes.
fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_suffix_stripping() {
        assert_eq!(strip_numeric_suffix("tap_01"), "tap");
        assert_eq!(strip_numeric_suffix("wave2"), "wave");
        assert_eq!(strip_numeric_suffix("idle-3"), "idle");
        assert_eq!(strip_numeric_suffix("shake"), "shake");
        assert_eq!(strip_numeric_suffix("007"), "007");
    }

    #[test]
    fn tag_cleaning() {
        assert_eq!(clean_tag("looks happy"), "happy");
        assert_eq!(clean_tag("is sad"), "sad");
        assert_eq!(clean_tag("wave"), "wave");
    }
}
