use hashbrown::HashMap;
use mascot_rig_core::posture::{
    outranks, Pattern, PostureMapper, PosturePayload, PostureRule, DEFAULT_DURATION,
};

fn rule(keywords: &'static [&'static str], priority: i32, marker: &str) -> PostureRule {
    let mut params = HashMap::new();
    params.insert(marker.to_string(), 1.0);
    PostureRule {
        pattern: Pattern::AnyOf(keywords),
        priority,
        payload: PosturePayload {
            params,
            ..Default::default()
        },
    }
}

/// it should map "looks down" to the downward gaze bundle with default
/// duration and no expression or motion
#[test]
fn looks_down_end_to_end() {
    let mapper = PostureMapper::new();
    let command = mapper.map("looks down").expect("rule match");

    assert_eq!(command.params.get("ParamAngleY"), Some(&-30.0));
    assert_eq!(command.params.get("ParamEyeBallY"), Some(&-0.8));
    assert_eq!(command.params.get("ParamBodyAngleX"), Some(&-5.0));
    assert_eq!(command.params.len(), 3);
    assert_eq!(command.expression, None);
    assert_eq!(command.motion, None);
    assert_eq!(command.duration, DEFAULT_DURATION);
}

/// it should always pick the higher-priority rule regardless of order
#[test]
fn priority_determinism() {
    let both = "the trigger word";
    for flipped in [false, true] {
        let mut rules = vec![
            rule(&["trigger"], 20, "High"),
            rule(&["trigger"], 10, "Low"),
        ];
        if flipped {
            rules.reverse();
        }
        let mapper = PostureMapper::with_rules(rules);
        let command = mapper.map(both).expect("match");
        assert!(command.params.contains_key("High"), "flipped={flipped}");
    }
}

/// it should break priority ties toward the earliest-registered rule
#[test]
fn stable_tie_break() {
    let mapper = PostureMapper::with_rules(vec![
        rule(&["trigger"], 15, "First"),
        rule(&["trigger"], 15, "Second"),
    ]);
    let command = mapper.map("trigger").expect("match");
    assert!(command.params.contains_key("First"));
    assert!(!command.params.contains_key("Second"));
}

/// it should expose the strict comparison the scan relies on
#[test]
fn outranks_is_strictly_greater() {
    let high = rule(&["a"], 20, "H");
    let low = rule(&["a"], 10, "L");
    let peer = rule(&["a"], 20, "P");
    assert!(outranks(&high, &low));
    assert!(!outranks(&low, &high));
    assert!(!outranks(&peer, &high));
}

/// it should let one cue set overrides, expression, and motion together
#[test]
fn sigh_sets_all_three() {
    let mapper = PostureMapper::new();
    let command = mapper.map("she sighs and looks away").expect("match");

    // sigh (15) outranks the directional look (10)
    assert_eq!(command.expression.as_deref(), Some("Sad"));
    assert_eq!(command.motion.as_deref(), Some("sigh"));
    assert_eq!(command.params.get("ParamAngleY"), Some(&-20.0));
}

/// it should keep an explicit rule duration instead of the default
#[test]
fn explicit_duration_is_kept() {
    let mut timed = rule(&["trigger"], 10, "T");
    timed.payload.duration = Some(1.5);
    let mapper = PostureMapper::with_rules(vec![timed]);
    assert_eq!(mapper.map("trigger").expect("match").duration, 1.5);
}

/// it should return None when no rule matches
#[test]
fn no_match_is_none() {
    let mapper = PostureMapper::new();
    assert!(mapper.map("qqq zzz").is_none());
}

/// it should resolve the happy/surprised overlap on "wow" to the earlier
/// happy rule
#[test]
fn wow_prefers_happy() {
    let mapper = PostureMapper::new();
    let command = mapper.map("wow").expect("match");
    assert_eq!(command.expression.as_deref(), Some("Happy"));
}

/// it should match emotion keywords anywhere in free text
#[test]
fn emotion_beats_directional_look() {
    let mapper = PostureMapper::new();
    // sad (20) must beat the directional look (10) in the same sentence
    let command = mapper.map("looks down sadly").expect("match");
    assert_eq!(command.expression.as_deref(), Some("Sad"));
    assert_eq!(command.params.get("ParamAngleZ"), Some(&-5.0));
}
