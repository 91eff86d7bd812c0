//! Posture mapping: free-form roleplay text to parameter override bundles.
//!
//! A static, ordered rule table is compiled at construction and never
//! mutated. Mapping evaluates every rule against the lowercased input and
//! applies an explicit priority comparison with a stable tie-break, so two
//! rules at the same priority always settle in registration order.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::params;

/// Applied when a matched payload does not set its own duration.
pub const DEFAULT_DURATION: f32 = 3.0;

/// Text pattern over lowercased input.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Any keyword occurs anywhere in the text.
    AnyOf(&'static [&'static str]),
    /// Keywords occur left to right, with anything in between.
    Sequence(&'static [&'static str]),
}

impl Pattern {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Pattern::AnyOf(keywords) => keywords.iter().any(|kw| text.contains(kw)),
            Pattern::Sequence(keywords) => {
                let mut pos = 0;
                for kw in *keywords {
                    match text[pos..].find(kw) {
                        Some(i) => pos += i + kw.len(),
                        None => return false,
                    }
                }
                true
            }
        }
    }
}

/// What a matched rule applies. Overrides, expression, and motion are not
/// mutually exclusive; a single cue like "sigh" legitimately sets all three.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PosturePayload {
    pub params: HashMap<String, f32>,
    pub expression: Option<String>,
    pub motion: Option<String>,
    pub duration: Option<f32>,
}

#[derive(Debug)]
pub struct PostureRule {
    pub pattern: Pattern,
    pub priority: i32,
    pub payload: PosturePayload,
}

/// Strict priority comparison used during rule selection. The challenger
/// only displaces the incumbent on strictly higher priority, which is what
/// makes ties resolve to the earliest-registered rule.
pub fn outranks(challenger: &PostureRule, incumbent: &PostureRule) -> bool {
    challenger.priority > incumbent.priority
}

/// A selected payload with its duration defaulted, ready to install.
#[derive(Clone, Debug, PartialEq)]
pub struct PostureCommand {
    pub params: HashMap<String, f32>,
    pub expression: Option<String>,
    pub motion: Option<String>,
    pub duration: f32,
}

pub struct PostureMapper {
    rules: Vec<PostureRule>,
}

impl PostureMapper {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Custom table, mostly for tests.
    pub fn with_rules(rules: Vec<PostureRule>) -> Self {
        Self { rules }
    }

    /// Match `text` against the table. The highest-priority matching rule
    /// wins; ties break to registration order. `None` when nothing matches,
    /// which is not an error.
    pub fn map(&self, text: &str) -> Option<PostureCommand> {
        let text = text.to_lowercase();
        let mut best: Option<&PostureRule> = None;
        for rule in &self.rules {
            if !rule.pattern.matches(&text) {
                continue;
            }
            match best {
                Some(incumbent) if !outranks(rule, incumbent) => {}
                _ => best = Some(rule),
            }
        }
        best.map(|rule| PostureCommand {
            params: rule.payload.params.clone(),
            expression: rule.payload.expression.clone(),
            motion: rule.payload.motion.clone(),
            duration: rule.payload.duration.unwrap_or(DEFAULT_DURATION),
        })
    }
}

impl Default for PostureMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn overrides(entries: &[(&str, f32)]) -> HashMap<String, f32> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// The built-in rule table: directional looks, core emotions, and secondary
/// conversational cues.
fn default_rules() -> Vec<PostureRule> {
    vec![
        PostureRule {
            pattern: Pattern::Sequence(&["look", "down"]),
            priority: 10,
            payload: PosturePayload {
                params: overrides(&[
                    (params::ANGLE_Y, -30.0),
                    (params::EYE_BALL_Y, -0.8),
                    (params::BODY_ANGLE_X, -5.0),
                ]),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::Sequence(&["look", "up"]),
            priority: 10,
            payload: PosturePayload {
                params: overrides(&[
                    (params::ANGLE_Y, 20.0),
                    (params::EYE_BALL_Y, 0.8),
                    (params::BODY_ANGLE_X, 5.0),
                ]),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::Sequence(&["look", "left"]),
            priority: 10,
            payload: PosturePayload {
                params: overrides(&[
                    (params::ANGLE_X, -25.0),
                    (params::EYE_BALL_X, -0.8),
                    (params::BODY_ANGLE_X, -10.0),
                ]),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::Sequence(&["look", "right"]),
            priority: 10,
            payload: PosturePayload {
                params: overrides(&[
                    (params::ANGLE_X, 25.0),
                    (params::EYE_BALL_X, 0.8),
                    (params::BODY_ANGLE_X, 10.0),
                ]),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::Sequence(&["look", "away"]),
            priority: 10,
            payload: PosturePayload {
                params: overrides(&[
                    (params::ANGLE_X, 30.0),
                    (params::ANGLE_Y, -10.0),
                    (params::EYE_BALL_X, 0.8),
                ]),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&[
                "sad", "cry", "tear", "upset", "sorry", "apolog", "trouble", "difficult", "fail",
                "bad", "hurt", "pain", "lonely", "alone", "miss",
            ]),
            priority: 20,
            payload: PosturePayload {
                params: overrides(&[(params::ANGLE_Z, -5.0)]),
                expression: Some("Sad".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&[
                "happy", "smile", "laugh", "joy", "glad", "good", "great", "awesome", "love",
                "like", "enjoy", "fun", "exciting", "cool", "wow",
            ]),
            priority: 20,
            payload: PosturePayload {
                params: overrides(&[(params::ANGLE_Z, 2.0)]),
                expression: Some("Happy".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&[
                "angry", "mad", "hate", "furious", "stupid", "idiot", "annoy", "irritat",
            ]),
            priority: 20,
            payload: PosturePayload {
                expression: Some("Angry".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&[
                "surprise", "shock", "gasp", "omg", "wow", "unexpected", "sudden",
            ]),
            priority: 20,
            payload: PosturePayload {
                params: overrides(&[(params::EYE_L_OPEN, 1.5), (params::EYE_R_OPEN, 1.5)]),
                expression: Some("Surprised".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&["think", "ponder", "wonder", "hmm", "idea", "maybe", "guess"]),
            priority: 15,
            payload: PosturePayload {
                params: overrides(&[
                    (params::ANGLE_Z, 8.0),
                    (params::EYE_BALL_X, -0.4),
                    (params::EYE_BALL_Y, 0.4),
                ]),
                expression: Some("Thinking".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&[
                "shy", "blush", "embarrass", "cute", "sweet", "flatter", "thank",
            ]),
            priority: 15,
            payload: PosturePayload {
                params: overrides(&[(params::ANGLE_Y, -15.0), (params::ANGLE_X, -5.0)]),
                expression: Some("Shy".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&["sigh"]),
            priority: 15,
            payload: PosturePayload {
                params: overrides(&[
                    (params::ANGLE_Y, -20.0),
                    (params::EYE_L_OPEN, 0.8),
                    (params::EYE_R_OPEN, 0.8),
                ]),
                expression: Some("Sad".to_string()),
                motion: Some("sigh".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&[
                "nod", "agree", "yes", "okay", "sure", "fine", "correct", "right",
            ]),
            priority: 15,
            payload: PosturePayload {
                params: overrides(&[(params::ANGLE_Y, -10.0)]),
                motion: Some("tap".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&[
                "shake", "deny", "no", "disagree", "wrong", "false", "never", "not",
            ]),
            priority: 15,
            payload: PosturePayload {
                params: overrides(&[(params::ANGLE_Z, 0.0), (params::ANGLE_X, -10.0)]),
                expression: Some("Sad".to_string()),
                motion: Some("shake".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&["wave", "hello", "hi", "greet", "bye", "hey"]),
            priority: 15,
            payload: PosturePayload {
                motion: Some("wave".to_string()),
                ..Default::default()
            },
        },
        PostureRule {
            pattern: Pattern::AnyOf(&["tilt", "curious", "confused", "what", "question", "ask"]),
            priority: 15,
            payload: PosturePayload {
                params: overrides(&[(params::ANGLE_Z, 15.0)]),
                expression: Some("Thinking".to_string()),
                ..Default::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_requires_order() {
        let p = Pattern::Sequence(&["look", "down"]);
        assert!(p.matches("looks down"));
        assert!(p.matches("look way down"));
        assert!(!p.matches("down low"));
        assert!(!p.matches("down, then look"));
    }

    #[test]
    fn any_of_matches_substrings() {
        let p = Pattern::AnyOf(&["sigh"]);
        assert!(p.matches("she sighs heavily"));
        assert!(!p.matches("sings"));
    }
}
