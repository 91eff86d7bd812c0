mod common;

use common::{bare_character, fixture_dir};
use mascot_rig_core::{Manifest, ResourceError, ResourceIndex, AUTO_MANIFEST_FILE};

const AUTHORED_MANIFEST: &str = r#"{
  "Version": 3,
  "FileReferences": {
    "Moc": "model.moc3",
    "Textures": ["textures/00.png"],
    "Motions": {
      "wave": [
        { "File": "motions/wave_a.motion3.json" },
        { "File": "motions/wave_b.motion3.json" }
      ]
    },
    "Expressions": [
      { "Name": "Smile", "File": "expressions/smile.exp3.json" }
    ]
  }
}"#;

/// it should synthesize a manifest with lexically sorted textures and one
/// group per motion stem when none exists
#[test]
fn synthesis_is_deterministic() {
    let dir = bare_character("synth");
    // Creation order is deliberately not lexical.
    dir.write("textures/c.png", "png");
    dir.write("textures/a.png", "png");
    dir.write("textures/b.png", "png");
    dir.write("wave.motion3.json", "{}");
    dir.write("tap.motion3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    let refs = &index.manifest().file_references;

    assert_eq!(
        refs.textures,
        vec!["textures/a.png", "textures/b.png", "textures/c.png"]
    );
    assert_eq!(refs.motions.len(), 2);
    assert!(refs.motions.contains_key("wave"));
    assert!(refs.motions.contains_key("tap"));
    assert!(index.manifest().auto_generated);
    assert!(dir.exists(AUTO_MANIFEST_FILE));
}

/// it should load a manifest-less character and expose groups per motion stem
#[test]
fn manifest_less_character_end_to_end() {
    let dir = bare_character("noman");
    dir.write("wave.motion3.json", "{}");
    dir.write("tap.motion3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    assert!(index.group_files("wave").is_some());
    assert!(index.group_files("tap").is_some());
    assert!(index.capabilities().auto_generated);
    assert_eq!(index.locate("wave.motion3.json"), Some(("wave", 0)));
}

/// it should fail with NoCoreData when no core rig file exists anywhere
#[test]
fn missing_core_data_is_fatal() {
    let dir = fixture_dir("nocore");
    dir.write("wave.motion3.json", "{}");

    match ResourceIndex::build(dir.as_path()) {
        Err(ResourceError::NoCoreData(_)) => {}
        other => panic!("expected NoCoreData, got {other:?}"),
    }
}

/// it should fall back to synthesis when the manifest is malformed
#[test]
fn malformed_manifest_falls_back_to_synthesis() {
    let dir = bare_character("broken");
    dir.write("broken.model3.json", "{ not json");
    dir.write("smile.exp3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    assert!(index.capabilities().auto_generated);
    assert!(index.find_expression("smile").is_some());
}

/// it should alias smile stems under the canonical happy key
#[test]
fn alias_synthesis_for_emotions() {
    let dir = bare_character("alias");
    dir.write("MySmile.exp3.json", "{}");
    dir.write("SoSad.exp3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    assert_eq!(index.find_expression("happy"), Some("MySmile.exp3.json"));
    assert_eq!(index.find_expression("cry"), Some("SoSad.exp3.json"));
}

/// it should deep-merge unreferenced motions without touching the manifest
#[test]
fn deep_merge_stays_ephemeral() {
    let dir = bare_character("merge");
    dir.write("char.model3.json", AUTHORED_MANIFEST);
    dir.write("textures/00.png", "png");
    dir.write("motions/wave_a.motion3.json", "{}");
    dir.write("motions/wave_b.motion3.json", "{}");
    dir.write("expressions/smile.exp3.json", "{}");
    dir.write("motions/extra_01.motion3.json", "{}");

    let before = dir.read("char.model3.json");
    let index = ResourceIndex::build(dir.as_path()).expect("build");

    // Discoverable by logical name, but in no group and not persisted.
    assert!(index.motion_files("extra").is_some());
    assert_eq!(index.locate("motions/extra_01.motion3.json"), None);
    assert_eq!(
        index.unregistered_motions(),
        vec!["motions/extra_01.motion3.json".to_string()]
    );
    assert_eq!(dir.read("char.model3.json"), before);
    assert!(!index.capabilities().auto_generated);
}

/// it should group numeric-suffixed motion files under one logical name
#[test]
fn numeric_suffixes_share_a_logical_name() {
    let dir = bare_character("suffix");
    dir.write("tap_01.motion3.json", "{}");
    dir.write("tap_02.motion3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    let files = index.motion_files("tap").expect("tap registered");
    assert_eq!(files.len(), 2);
}

/// it should answer reverse lookups with group and index from the manifest
#[test]
fn reverse_lookup_preserves_group_order() {
    let dir = bare_character("reverse");
    dir.write("char.model3.json", AUTHORED_MANIFEST);
    dir.write("motions/wave_a.motion3.json", "{}");
    dir.write("motions/wave_b.motion3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    assert_eq!(index.locate("motions/wave_a.motion3.json"), Some(("wave", 0)));
    assert_eq!(index.locate("motions/wave_b.motion3.json"), Some(("wave", 1)));
}

/// it should probe physics capability from anywhere in the tree
#[test]
fn physics_capability_probe() {
    let dir = bare_character("physics");
    dir.write("sub/char.physics3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    assert!(index.capabilities().physics);

    let plain = bare_character("nophysics");
    let index = ResourceIndex::build(plain.as_path()).expect("build");
    assert!(!index.capabilities().physics);
}

/// it should persist discovered motions into the manifest only when asked
#[test]
fn opt_in_persistence_rewrites_groups() {
    let dir = bare_character("persist");
    dir.write("char.model3.json", AUTHORED_MANIFEST);
    dir.write("motions/wave_a.motion3.json", "{}");
    dir.write("motions/wave_b.motion3.json", "{}");
    dir.write("motions/orphan.motion3.json", "{}");

    let index = ResourceIndex::build(dir.as_path()).expect("build");
    let orphans = index.unregistered_motions();
    assert_eq!(orphans, vec!["motions/orphan.motion3.json".to_string()]);

    let manifest_path = dir.path.join("char.model3.json");
    let changed =
        mascot_rig_core::manifest::persist_discovered_motions(&manifest_path, &orphans)
            .expect("persist");
    assert!(changed);

    // Second run is idempotent.
    let changed_again =
        mascot_rig_core::manifest::persist_discovered_motions(&manifest_path, &orphans)
            .expect("persist again");
    assert!(!changed_again);

    let index = ResourceIndex::build(dir.as_path()).expect("rebuild");
    assert_eq!(
        index.locate("motions/orphan.motion3.json"),
        Some(("orphan", 0))
    );
    // Authored entries survived the rewrite.
    assert_eq!(index.locate("motions/wave_b.motion3.json"), Some(("wave", 1)));
}

/// it should reload its own synthesized manifest as an authored one
#[test]
fn synthesized_manifest_satisfies_the_search() {
    let dir = bare_character("reload");
    dir.write("wave.motion3.json", "{}");

    let first = ResourceIndex::build(dir.as_path()).expect("first build");
    assert!(first.capabilities().auto_generated);

    let manifest = Manifest::load(&dir.path.join(AUTO_MANIFEST_FILE)).expect("parse");
    assert_eq!(manifest.file_references.moc, "model.moc3");

    // The second load finds the persisted file and no longer synthesizes.
    let second = ResourceIndex::build(dir.as_path()).expect("second build");
    assert!(!second.capabilities().auto_generated);
    assert!(second.group_files("wave").is_some());
}
