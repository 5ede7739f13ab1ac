//! Capability profile used by stage-1 scoring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured description of what an agent can handle.
///
/// All term sets are normalised to trimmed lowercase on construction so the
/// scorer can compare them against lowercase query tokens directly. Terms may
/// contain several words (`cost analytics`); such terms match when every word
/// appears in the query. Deserialised profiles are normalised the same way,
/// so a hand-edited snapshot listing `Tickets` still matches `tickets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProfile")]
pub struct CapabilityProfile {
    domains: BTreeSet<String>,
    entities: BTreeSet<String>,
    operations: BTreeSet<String>,
    keywords: BTreeSet<String>,
    priority: i32,
}

impl CapabilityProfile {
    /// Creates an empty profile with priority zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the domain terms.
    #[must_use]
    pub fn with_domains<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.domains = normalise_terms(terms);
        self
    }

    /// Sets the entity terms.
    #[must_use]
    pub fn with_entities<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entities = normalise_terms(terms);
        self
    }

    /// Sets the operation terms.
    #[must_use]
    pub fn with_operations<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.operations = normalise_terms(terms);
        self
    }

    /// Sets the free-form keyword terms.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = normalise_terms(terms);
        self
    }

    /// Sets the tie-breaking priority. Higher values sort first.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the domain terms.
    #[must_use]
    pub const fn domains(&self) -> &BTreeSet<String> {
        &self.domains
    }

    /// Returns the entity terms.
    #[must_use]
    pub const fn entities(&self) -> &BTreeSet<String> {
        &self.entities
    }

    /// Returns the operation terms.
    #[must_use]
    pub const fn operations(&self) -> &BTreeSet<String> {
        &self.operations
    }

    /// Returns the keyword terms.
    #[must_use]
    pub const fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    /// Returns the tie-breaking priority.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }
}

/// Persisted profile shape, normalised on the way in.
#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    domains: Vec<String>,
    #[serde(default)]
    entities: Vec<String>,
    #[serde(default)]
    operations: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    priority: i32,
}

impl From<RawProfile> for CapabilityProfile {
    fn from(raw: RawProfile) -> Self {
        Self {
            domains: normalise_terms(raw.domains),
            entities: normalise_terms(raw.entities),
            operations: normalise_terms(raw.operations),
            keywords: normalise_terms(raw.keywords),
            priority: raw.priority,
        }
    }
}

/// Normalises a term list to a set of trimmed, lowercase, non-empty terms.
pub(crate) fn normalise_terms<I, S>(terms: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms
        .into_iter()
        .map(|term| term.as_ref().trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}
