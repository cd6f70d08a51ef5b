//! Keyword classifier for cognitive levels
//!
//! Scores question text against weighted keyword lists per Bloom's level.
//! Each keyword is tested once by substring containment; primary keywords
//! weigh 3, secondary keywords weigh 1. A handful of compound phrases add
//! bonuses on top. The highest total wins, first level on ties.

use crate::types::CognitiveLevel;
use std::sync::OnceLock;

const PRIMARY_WEIGHT: u32 = 3;
const SECONDARY_WEIGHT: u32 = 1;

const CONFIDENCE_PRIMARY: u32 = 30;
const CONFIDENCE_SECONDARY: u32 = 15;

/// Keyword lists for one level
#[derive(Debug, Clone)]
pub struct LevelKeywords {
    pub level: CognitiveLevel,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

impl LevelKeywords {
    fn new(level: CognitiveLevel, primary: &[&str], secondary: &[&str]) -> Self {
        Self {
            level,
            primary: primary.iter().map(|k| k.to_string()).collect(),
            secondary: secondary.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn primary_hits(&self, text: &str) -> u32 {
        self.primary.iter().filter(|kw| text.contains(kw.as_str())).count() as u32
    }

    fn secondary_hits(&self, text: &str) -> u32 {
        self.secondary.iter().filter(|kw| text.contains(kw.as_str())).count() as u32
    }
}

/// Classifies question text into L1..L6
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    tables: Vec<LevelKeywords>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            tables: vec![
                LevelKeywords::new(
                    CognitiveLevel::L1,
                    &["define", "list", "name", "state", "recall", "identify", "what is"],
                    &["label", "recognize", "mention", "memorize", "repeat", "who", "when", "where"],
                ),
                LevelKeywords::new(
                    CognitiveLevel::L2,
                    &["explain", "describe", "discuss", "summarize", "interpret", "classify"],
                    &["illustrate", "outline", "paraphrase", "understand", "review", "express", "translate"],
                ),
                LevelKeywords::new(
                    CognitiveLevel::L3,
                    &["calculate", "solve", "apply", "implement", "demonstrate", "compute"],
                    &["use", "show", "find", "execute", "determine", "operate"],
                ),
                LevelKeywords::new(
                    CognitiveLevel::L4,
                    &["analyze", "analyse", "compare", "contrast", "differentiate", "distinguish", "examine"],
                    &["investigate", "break down", "categorize", "organize", "inspect", "infer", "separate"],
                ),
                LevelKeywords::new(
                    CognitiveLevel::L5,
                    &["evaluate", "assess", "justify", "critique", "judge"],
                    &["recommend", "conclude", "defend", "argue", "appraise", "prioritize", "validate"],
                ),
                LevelKeywords::new(
                    CognitiveLevel::L6,
                    &["design", "create", "develop", "formulate", "construct", "compose"],
                    &["generate", "produce", "invent", "plan", "propose", "devise", "build", "draw", "sketch"],
                ),
            ],
        }
    }
}

impl KeywordClassifier {
    /// Build from custom tables. Levels missing from `tables` score zero.
    pub fn from_tables(tables: Vec<LevelKeywords>) -> Self {
        let tables = tables
            .into_iter()
            .map(|t| LevelKeywords {
                level: t.level,
                primary: t.primary.iter().map(|k| k.to_lowercase()).collect(),
                secondary: t.secondary.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { tables }
    }

    fn table(&self, level: CognitiveLevel) -> Option<&LevelKeywords> {
        self.tables.iter().find(|t| t.level == level)
    }

    /// Weighted keyword score plus compound bonuses, per level in L1..L6 order
    pub fn scores(&self, text: &str) -> [(CognitiveLevel, u32); 6] {
        let q = text.to_lowercase();

        let mut scores = CognitiveLevel::ALL.map(|level| {
            let score = self
                .table(level)
                .map(|t| t.primary_hits(&q) * PRIMARY_WEIGHT + t.secondary_hits(&q) * SECONDARY_WEIGHT)
                .unwrap_or(0);
            (level, score)
        });

        for (level, bonus) in compound_bonuses(&q) {
            scores[level as usize].1 += bonus;
        }

        scores
    }

    /// Infer the cognitive level of a question
    pub fn classify(&self, text: &str) -> CognitiveLevel {
        let scores = self.scores(text);

        let mut best: Option<(CognitiveLevel, u32)> = None;
        for (level, score) in scores {
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((level, score));
            }
        }

        match best {
            Some((level, _)) => level,
            None => fallback_level(&text.to_lowercase()),
        }
    }

    /// 0..=100 confidence that `text` belongs to `level`, from that level's keywords only
    pub fn confidence(&self, text: &str, level: CognitiveLevel) -> u8 {
        let q = text.to_lowercase();
        let raw = self
            .table(level)
            .map(|t| t.primary_hits(&q) * CONFIDENCE_PRIMARY + t.secondary_hits(&q) * CONFIDENCE_SECONDARY)
            .unwrap_or(0);
        raw.min(100) as u8
    }
}

fn compound_bonuses(q: &str) -> Vec<(CognitiveLevel, u32)> {
    let mut bonuses = Vec::new();

    if q.contains("define") && q.contains("with example") {
        bonuses.push((CognitiveLevel::L2, 2));
    }
    if ["calculate", "find the", "solve for"].iter().any(|t| q.contains(t)) {
        bonuses.push((CognitiveLevel::L3, 3));
    }
    if q.contains("compare") && q.contains("contrast") {
        bonuses.push((CognitiveLevel::L4, 2));
    }
    if ["design", "create", "develop"].iter().any(|t| q.contains(t)) {
        bonuses.push((CognitiveLevel::L6, 3));
    }

    bonuses
}

/// Used only when no keyword matched at all
fn fallback_level(q: &str) -> CognitiveLevel {
    let q = q.trim_start();
    if ["what", "who", "when"].iter().any(|p| q.starts_with(p)) {
        CognitiveLevel::L1
    } else {
        // "how"/"why", a bare question mark, and everything else
        CognitiveLevel::L2
    }
}

fn default_classifier() -> &'static KeywordClassifier {
    static CLASSIFIER: OnceLock<KeywordClassifier> = OnceLock::new();
    CLASSIFIER.get_or_init(KeywordClassifier::default)
}

/// Classify with the built-in keyword tables
pub fn classify(text: &str) -> CognitiveLevel {
    default_classifier().classify(text)
}

/// Confidence with the built-in keyword tables
pub fn confidence(text: &str, level: CognitiveLevel) -> u8 {
    default_classifier().confidence(text, level)
}
