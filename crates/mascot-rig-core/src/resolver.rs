//! Fuzzy tag resolution: semantic tag strings to registered resources.
//!
//! The resolver owns per-character category pools rebuilt on every load, so
//! any rig's naming scheme maps onto the canonical categories up front and
//! `resolve` itself stays cheap. Resolution never fabricates a path: every
//! answer is something the index registered.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::index::ResourceIndex;

/// Canonical categories and the keywords that select them. Scanned in order;
/// the first keyword hit decides the category.
const KEYWORDS: &[(&str, &[&str])] = &[
    ("happy", &["happy", "smile", "joy", "laugh", "excited"]),
    ("sad", &["sad", "cry", "depressed", "sorrow", "grief"]),
    ("angry", &["angry", "mad", "rage", "furious", "annoyed"]),
    ("surprised", &["surprised", "shock", "gasp", "wow"]),
    ("shy", &["shy", "blush", "embarrassed"]),
    ("love", &["love", "heart", "kiss", "romance"]),
    ("wave", &["wave", "hello", "hi", "bye", "greeting"]),
    ("nod", &["nod", "agree", "yes", "affirmative"]),
    ("shake", &["shake", "no", "deny", "disagree", "reject"]),
    ("tap_body", &["tap_body", "poke", "touch", "interact"]),
    ("tap_head", &["tap_head", "pat", "pet", "head"]),
    ("idle", &["idle", "wait", "stand"]),
];

/// Substitute categories tried when the primary one has no resources.
const FALLBACKS: &[(&str, &[&str])] = &[
    ("happy", &["wave", "nod"]),
    ("smile", &["wave"]),
    ("excited", &["wave", "shake"]),
    ("sad", &["idle"]),
    ("angry", &["shake"]),
    ("surprised", &["shake"]),
    ("love", &["wave"]),
    ("shy", &["idle"]),
];

/// Outcome of resolving one tag. `None` is a defined no-op, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Relative path of a motion file to play.
    Motion(String),
    /// Relative path of an expression file to apply.
    Expression(String),
    None,
}

pub struct TagResolver {
    /// category name -> motion files collected for it, first-seen order.
    pools: Vec<(&'static str, Vec<String>)>,
    rng: StdRng,
}

impl TagResolver {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeded construction for reproducible tie-breaks.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            pools: Vec::new(),
            rng,
        }
    }

    /// Rebuild category pools against a freshly loaded character. Each
    /// category probes the index with all of its keywords and keeps every
    /// distinct hit.
    pub fn rebind(&mut self, index: &ResourceIndex) {
        self.pools.clear();
        for (category, keywords) in KEYWORDS {
            let mut pool: Vec<String> = Vec::new();
            for keyword in *keywords {
                if let Some(files) = index.find_motion(keyword) {
                    for file in files {
                        if !pool.contains(file) {
                            pool.push(file.clone());
                        }
                    }
                }
            }
            self.pools.push((category, pool));
        }
        debug!(
            "resolver pools: {} categories populated",
            self.pools.iter().filter(|(_, p)| !p.is_empty()).count()
        );
    }

    /// Motion pool for a category; empty when the character offers nothing
    /// for it.
    pub fn pool(&self, category: &str) -> &[String] {
        self.pools
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, pool)| pool.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a tag against the loaded index. First success wins:
    /// exact motion name, group name, keyword category, expression,
    /// category fallback chain, then `Resolution::None`.
    pub fn resolve(&mut self, index: &ResourceIndex, tag: &str) -> Resolution {
        let tag = tag.trim().to_lowercase();

        // 1. Exact logical motion name.
        if let Some(files) = index.motion_files(crate::index::clean_tag(&tag)) {
            if let Some(file) = self.pick(files) {
                return Resolution::Motion(file);
            }
        }

        // 2. Exact group name.
        if let Some(files) = index.group_files(crate::index::clean_tag(&tag)) {
            if let Some(file) = self.pick(files) {
                return Resolution::Motion(file);
            }
        }

        // 3. Keyword category with a populated pool.
        let category = KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| tag.contains(kw)))
            .map(|(category, _)| *category);
        if let Some(category) = category {
            let pool = self.pool(category).to_vec();
            if let Some(file) = self.pick(&pool) {
                return Resolution::Motion(file);
            }
        }

        // 4. Expression by name or alias.
        if let Some(path) = index.find_expression(&tag) {
            return Resolution::Expression(path.to_string());
        }

        // 5. Fallback chain for the identified category.
        if let Some(category) = category {
            if let Some((_, chain)) = FALLBACKS.iter().find(|(name, _)| *name == category) {
                for substitute in *chain {
                    let pool = self.pool(substitute).to_vec();
                    if let Some(file) = self.pick(&pool) {
                        debug!("tag '{tag}': category '{category}' empty, using '{substitute}'");
                        return Resolution::Motion(file);
                    }
                }
            }
        }

        debug!("tag '{tag}' did not resolve");
        Resolution::None
    }

    /// Uniform pick among candidates; the resolver's seeded rng is the only
    /// source of nondeterminism in resolution.
    pub(crate) fn pick(&mut self, files: &[String]) -> Option<String> {
        files.choose(&mut self.rng).cloned()
    }
}

impl Default for TagResolver {
    fn default() -> Self {
        Self::new()
    }
}
