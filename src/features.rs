//! Feature Extraction - lexical triggers to weighted semantic features
//!
//! A [`FeatureVocabulary`] is a fixed list of [`FeatureDef`]s. Each definition
//! carries a base weight and a set of triggers:
//!
//! | Trigger | Matches |
//! |---------|---------|
//! | `Term`   | the whole lower-cased token |
//! | `Stem`   | a lower-cased prefix (`comput` → computer, computing) |
//! | `Phrase` | a word sequence; every token inside a matched occurrence fires |
//!
//! A matching trigger contributes `base_weight × strength`. Several triggers
//! of the same feature on one token add up. Phrases are the only reason the
//! surrounding tokens are consulted; extraction stays a pure function of the
//! token sequence.

use crate::error::{Result, RoutingError};
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A semantic signal detected on one token
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub label: String,
    /// Contribution strength (>= 0, not normalized)
    pub weight: f32,
}

/// What a trigger looks for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "camelCase")]
pub enum TriggerPattern {
    /// Exact word
    Term(String),
    /// Word prefix
    Stem(String),
    /// Consecutive words
    Phrase(Vec<String>),
}

impl TriggerPattern {
    fn is_empty(&self) -> bool {
        match self {
            Self::Term(t) | Self::Stem(t) => t.is_empty(),
            Self::Phrase(words) => words.is_empty() || words.iter().any(String::is_empty),
        }
    }
}

/// A pattern plus its strength multiplier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub pattern: TriggerPattern,
    pub strength: f32,
}

impl Trigger {
    /// Does this trigger fire on `token` within `context`?
    fn matches(&self, token: &Token, normalized: &str, context: &[Token]) -> bool {
        match &self.pattern {
            TriggerPattern::Term(term) => normalized == term,
            TriggerPattern::Stem(stem) => normalized.starts_with(stem.as_str()),
            TriggerPattern::Phrase(words) => phrase_covers(words, token, normalized, context),
        }
    }
}

/// True if some occurrence of `words` in `context` includes `token`.
fn phrase_covers(words: &[String], token: &Token, normalized: &str, context: &[Token]) -> bool {
    words.iter().enumerate().any(|(offset, word)| {
        if word != normalized || token.index < offset {
            return false;
        }
        let start = token.index - offset;
        words.iter().enumerate().all(|(j, expected)| {
            context
                .get(start + j)
                .is_some_and(|t| t.normalized() == *expected)
        })
    })
}

/// Vocabulary entry: one feature and the triggers that detect it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureDef {
    pub id: String,
    pub label: String,
    pub base_weight: f32,
    pub triggers: Vec<Trigger>,
}

impl FeatureDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, base_weight: f32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            base_weight,
            triggers: Vec::new(),
        }
    }

    /// Add exact-word triggers at strength 1.0
    pub fn terms(mut self, terms: &[&str]) -> Self {
        for term in terms {
            self = self.term(term, 1.0);
        }
        self
    }

    /// Add one exact-word trigger
    pub fn term(mut self, term: &str, strength: f32) -> Self {
        self.triggers.push(Trigger {
            pattern: TriggerPattern::Term(term.to_lowercase()),
            strength,
        });
        self
    }

    /// Add one prefix trigger
    pub fn stem(mut self, stem: &str, strength: f32) -> Self {
        self.triggers.push(Trigger {
            pattern: TriggerPattern::Stem(stem.to_lowercase()),
            strength,
        });
        self
    }

    /// Add one phrase trigger; `phrase` is split on whitespace
    pub fn phrase(mut self, phrase: &str, strength: f32) -> Self {
        let words = phrase.split_whitespace().map(str::to_lowercase).collect();
        self.triggers.push(Trigger {
            pattern: TriggerPattern::Phrase(words),
            strength,
        });
        self
    }

    /// Largest weight this feature can reach on one token (every trigger matching)
    pub fn peak_weight(&self) -> f32 {
        self.base_weight * self.triggers.iter().map(|t| t.strength).sum::<f32>()
    }

    fn validate(&self) -> Result<()> {
        check_weight(&format!("feature '{}'", self.id), self.base_weight)?;
        for trigger in &self.triggers {
            if trigger.pattern.is_empty() {
                return Err(RoutingError::EmptyTrigger {
                    feature: self.id.clone(),
                });
            }
            check_weight(&format!("trigger of feature '{}'", self.id), trigger.strength)?;
        }
        check_weight(&format!("peak weight of feature '{}'", self.id), self.peak_weight())
    }
}

pub(crate) fn check_weight(owner: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RoutingError::InvalidWeight {
            owner: owner.to_string(),
            value,
        })
    }
}

/// Fixed, validated feature vocabulary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureVocabulary {
    features: Vec<FeatureDef>,
}

impl FeatureVocabulary {
    /// Validate and wrap a list of feature definitions
    pub fn new(features: Vec<FeatureDef>) -> Result<Self> {
        let mut seen = HashSet::new();
        for def in &features {
            if !seen.insert(def.id.as_str()) {
                return Err(RoutingError::DuplicateFeature(def.id.clone()));
            }
            def.validate()?;
            if def.triggers.is_empty() {
                log::warn!("Feature '{}' has no triggers and can never be detected", def.id);
            }
        }
        Ok(Self { features })
    }

    /// Wrap compiled-in definitions without validation
    pub(crate) fn from_trusted(features: Vec<FeatureDef>) -> Self {
        Self { features }
    }

    pub fn get(&self, id: &str) -> Option<&FeatureDef> {
        self.features.iter().find(|def| def.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Label for a feature id, if declared
    pub fn label(&self, id: &str) -> Option<&str> {
        self.get(id).map(|def| def.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDef> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features detected on `token`, in vocabulary order.
    ///
    /// `context` is the full token sequence `token` belongs to.
    pub fn extract_features(&self, token: &Token, context: &[Token]) -> Vec<Feature> {
        let normalized = token.normalized();

        self.features
            .iter()
            .filter_map(|def| {
                let weight: f32 = def
                    .triggers
                    .iter()
                    .filter(|trigger| trigger.matches(token, &normalized, context))
                    .map(|trigger| def.base_weight * trigger.strength)
                    .sum();

                (weight > 0.0).then(|| Feature {
                    id: def.id.clone(),
                    label: def.label.clone(),
                    weight,
                })
            })
            .collect()
    }
}
