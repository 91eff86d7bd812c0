//! Character manifest: parse, synthesis, and the directory walk behind both.
//!
//! A manifest is a `*.model3.json` document describing one character's
//! resource files. Folders shipped without one are repaired on the fly: the
//! tree is scanned and a minimal manifest is synthesized and persisted under
//! a reserved name, so the next load finds it like an authored file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// Suffix every manifest file carries.
pub const MANIFEST_SUFFIX: &str = ".model3.json";
/// Reserved filename for synthesized manifests.
pub const AUTO_MANIFEST_FILE: &str = "auto_generated.model3.json";

pub const CORE_SUFFIX: &str = ".moc3";
pub const MOTION_SUFFIX: &str = ".motion3.json";
pub const EXPRESSION_SUFFIX: &str = ".exp3.json";
pub const PHYSICS_SUFFIX: &str = "physics3.json";
const TEXTURE_SUFFIX: &str = ".png";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MotionEntry {
    #[serde(rename = "File")]
    pub file: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpressionEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "File")]
    pub file: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileReferences {
    /// The single core rig data file. A manifest without one is unusable.
    #[serde(rename = "Moc")]
    pub moc: String,
    /// Texture load order is significant; kept exactly as listed.
    #[serde(rename = "Textures", default)]
    pub textures: Vec<String>,
    #[serde(rename = "Physics", default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<String>,
    /// Group name to ordered motion list. Playback addresses a motion by
    /// group plus index, so list order is part of the contract.
    #[serde(rename = "Motions", default)]
    pub motions: BTreeMap<String, Vec<MotionEntry>>,
    #[serde(rename = "Expressions", default)]
    pub expressions: Vec<ExpressionEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "Version", default = "default_version")]
    pub version: u32,
    #[serde(rename = "FileReferences")]
    pub file_references: FileReferences,
    /// True when this manifest was synthesized rather than authored.
    #[serde(skip)]
    pub auto_generated: bool,
}

fn default_version() -> u32 {
    3
}

impl Manifest {
    /// Parse a manifest file. A parse failure is reported, not repaired;
    /// the index builder decides whether to fall back to synthesis.
    pub fn load(path: &Path) -> Result<Manifest, ResourceError> {
        let text = fs::read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|e| ResourceError::ManifestParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(manifest)
    }

    /// Scan `dir` and synthesize a manifest from the raw files, persisting it
    /// under [`AUTO_MANIFEST_FILE`]. Fails only when no core rig data exists.
    pub fn synthesize(dir: &Path) -> Result<Manifest, ResourceError> {
        let mut moc: Option<String> = None;
        let mut textures: Vec<String> = Vec::new();
        let mut physics: Option<String> = None;
        let mut motions: BTreeMap<String, Vec<MotionEntry>> = BTreeMap::new();
        let mut expressions: Vec<ExpressionEntry> = Vec::new();

        walk_tree(dir, &mut |rel, _abs| {
            let name = file_name_of(rel);
            if name.ends_with(CORE_SUFFIX) {
                moc = Some(rel.to_string());
            } else if name.ends_with(TEXTURE_SUFFIX) && dir_mentions_texture(rel) {
                textures.push(rel.to_string());
            } else if name.ends_with(PHYSICS_SUFFIX) {
                physics = Some(rel.to_string());
            } else if let Some(stem) = name.strip_suffix(MOTION_SUFFIX) {
                motions
                    .entry(stem.to_string())
                    .or_default()
                    .push(MotionEntry {
                        file: rel.to_string(),
                    });
            } else if let Some(stem) = name.strip_suffix(EXPRESSION_SUFFIX) {
                expressions.push(ExpressionEntry {
                    name: stem.to_string(),
                    file: rel.to_string(),
                });
            }
        });

        let moc = moc.ok_or_else(|| ResourceError::NoCoreData(dir.to_path_buf()))?;
        textures.sort();

        let manifest = Manifest {
            version: 3,
            file_references: FileReferences {
                moc,
                textures,
                physics,
                motions,
                expressions,
            },
            auto_generated: true,
        };

        let out_path = dir.join(AUTO_MANIFEST_FILE);
        match serde_json::to_string_pretty(&manifest) {
            Ok(json) => {
                if let Err(e) = fs::write(&out_path, json) {
                    // The in-memory manifest still works; only reload speed
                    // suffers without the persisted copy.
                    warn!("could not persist synthesized manifest to '{}': {e}", out_path.display());
                } else {
                    info!("synthesized manifest written to '{}'", out_path.display());
                }
            }
            Err(e) => warn!("could not serialize synthesized manifest: {e}"),
        }
        Ok(manifest)
    }
}

/// Locate a manifest in `dir` (non-recursive). Lexically first wins so the
/// pick is stable across platforms.
pub fn find_manifest_file(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(MANIFEST_SUFFIX))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Opt-in persistence of deep-scanned motions (see `RigSettings`). Edits the
/// manifest JSON in place at the `Motions` key so authored fields the typed
/// schema does not model survive the rewrite. Returns whether anything
/// changed.
pub fn persist_discovered_motions(
    manifest_path: &Path,
    new_motion_files: &[String],
) -> Result<bool, ResourceError> {
    let text = fs::read_to_string(manifest_path).map_err(|source| ResourceError::Io {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    let mut doc: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| ResourceError::ManifestParse {
            path: manifest_path.to_path_buf(),
            message: e.to_string(),
        })?;

    let motions = doc
        .pointer_mut("/FileReferences")
        .and_then(|refs| Some(refs.as_object_mut()?.entry("Motions").or_insert_with(|| serde_json::json!({}))))
        .and_then(|m| m.as_object_mut());
    let Some(motions) = motions else {
        return Ok(false);
    };

    let mut changed = false;
    for file in new_motion_files {
        let group = file_name_of(file)
            .strip_suffix(MOTION_SUFFIX)
            .unwrap_or(file_name_of(file))
            .to_string();
        let list = motions
            .entry(group)
            .or_insert_with(|| serde_json::json!([]));
        let Some(list) = list.as_array_mut() else {
            continue;
        };
        let present = list
            .iter()
            .any(|m| m.get("File").and_then(|f| f.as_str()) == Some(file.as_str()));
        if !present {
            list.push(serde_json::json!({ "File": file }));
            changed = true;
        }
    }

    if changed {
        let json =
            serde_json::to_string_pretty(&doc).map_err(|e| ResourceError::ManifestParse {
                path: manifest_path.to_path_buf(),
                message: e.to_string(),
            })?;
        fs::write(manifest_path, json).map_err(|source| ResourceError::Io {
            path: manifest_path.to_path_buf(),
            source,
        })?;
        info!("persisted {} discovered motion(s) into '{}'", new_motion_files.len(), manifest_path.display());
    }
    Ok(changed)
}

/// Depth-first walk with entries sorted by name, so every derived artifact
/// (synthesized manifests in particular) is deterministic regardless of the
/// platform's directory order. Per-entry failures are logged and skipped.
pub(crate) fn walk_tree(root: &Path, visit: &mut dyn FnMut(&str, &Path)) {
    fn recurse(root: &Path, dir: &Path, visit: &mut dyn FnMut(&str, &Path)) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot scan '{}': {e}", dir.display());
                return;
            }
        };
        let mut entries: Vec<_> = entries
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("unreadable entry under '{}': {err}", dir.display());
                    None
                }
            })
            .collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let is_dir = match entry.file_type() {
                Ok(t) => t.is_dir(),
                Err(e) => {
                    warn!("cannot stat '{}': {e}", path.display());
                    continue;
                }
            };
            if is_dir {
                recurse(root, &path, visit);
            } else {
                visit(&rel_string(root, &path), &path);
            }
        }
    }
    recurse(root, root, visit);
}

/// Relative path with forward slashes, the form manifests store.
fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Final component of a slash-separated relative path.
pub(crate) fn file_name_of(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// Whether any directory component of the path mentions "texture". Rig
/// exports keep textures under such a folder; stray images elsewhere (icons,
/// previews) are not rig textures.
fn dir_mentions_texture(rel: &str) -> bool {
    match rel.rfind('/') {
        Some(idx) => rel[..idx].to_lowercase().contains("texture"),
        None => false,
    }
}
