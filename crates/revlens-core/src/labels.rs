//! Review flags and the backend label vocabulary that maps onto them.
//!
//! Older backends report a review's classification as a list of string labels
//! (`["Rant (no visit)"]`), newer ones as one boolean per flag. Both resolve to
//! the same four [`FlagKind`]s. String labels are matched through an explicit
//! [`LabelTable`] so that a new backend variant is a one-line alias rather than
//! a silent miss.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Labels the classification backend is known to emit, with the flag each sets.
pub const DEFAULT_LABELS: &[(&str, FlagKind)] = &[
    ("Advertisement", FlagKind::Advertisement),
    ("Clean Review", FlagKind::Feedback),
    ("Irrelevant", FlagKind::Irrelevant),
    ("Rant", FlagKind::Rant),
    ("Rant (no visit)", FlagKind::Rant),
];

/// One of the four independent review flags, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Advertisement,
    Feedback,
    Irrelevant,
    Rant,
}

impl FlagKind {
    /// All flags in the fixed display order.
    pub const ALL: [FlagKind; 4] = [
        FlagKind::Advertisement,
        FlagKind::Feedback,
        FlagKind::Irrelevant,
        FlagKind::Rant,
    ];

    /// Human-readable label used in badges and synthesized evidence.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Advertisement => "Advertisement",
            Self::Feedback => "Feedback",
            Self::Irrelevant => "Irrelevant",
            Self::Rant => "Rant",
        }
    }

    /// Field name on the canonical record.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Advertisement => "Advertisement_Flag",
            Self::Feedback => "Feedback_Flag",
            Self::Irrelevant => "Irrelevant_Flag",
            Self::Rant => "Rant_Flag",
        }
    }

    /// Boolean fields on a raw backend result that set this flag.
    ///
    /// The first entry is the legacy backend name; the canonical name is also
    /// accepted so canonical records can be re-ingested unchanged.
    pub fn boolean_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Advertisement => &["Advertisement_Flag"],
            Self::Feedback => &["Clean_Review_Flag", "Feedback_Flag"],
            Self::Irrelevant => &["Irrelevant_Content_Flag", "Irrelevant_Flag"],
            Self::Rant => &["Review_without_Visit_Flag", "Rant_Flag"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Advertisement => "Contains promotional or advertising content",
            Self::Feedback => "Provides constructive feedback about the location",
            Self::Irrelevant => "Content is not relevant to the location",
            Self::Rant => "Emotional rant without constructive feedback",
        }
    }

    /// Badge colour for the results table.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Self::Advertisement => "red",
            Self::Feedback => "gray",
            Self::Irrelevant => "orange",
            Self::Rant => "purple",
        }
    }

    /// Whether the flag marks a policy violation (everything but feedback).
    pub fn is_violation(&self) -> bool {
        !matches!(self, Self::Feedback)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlag(pub String);

impl fmt::Display for UnknownFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown flag '{}' (expected advertisement, feedback, irrelevant or rant)",
            self.0
        )
    }
}

impl std::error::Error for UnknownFlag {}

impl FromStr for FlagKind {
    type Err = UnknownFlag;

    /// Parses a flag name case-insensitively: `rant`, `Rant`, `Rant_Flag`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        FlagKind::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(key) || k.field_name().eq_ignore_ascii_case(key))
            .ok_or_else(|| UnknownFlag(s.to_string()))
    }
}

/// A set of [`FlagKind`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagSet([bool; 4]);

impl FlagSet {
    pub fn only(kind: FlagKind) -> Self {
        let mut set = Self::default();
        set.insert(kind);
        set
    }

    pub fn insert(&mut self, kind: FlagKind) {
        self.0[kind.index()] = true;
    }

    pub fn contains(&self, kind: FlagKind) -> bool {
        self.0[kind.index()]
    }

    pub fn union(self, other: FlagSet) -> FlagSet {
        let mut out = self;
        for kind in FlagKind::ALL {
            if other.contains(kind) {
                out.insert(kind);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|b| *b)
    }

    /// Members in display order.
    pub fn iter(&self) -> impl Iterator<Item = FlagKind> + '_ {
        FlagKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl FromIterator<FlagKind> for FlagSet {
    fn from_iter<I: IntoIterator<Item = FlagKind>>(iter: I) -> Self {
        let mut set = FlagSet::default();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Flags resolved from a label list, plus the labels nothing matched.
#[derive(Debug, Default)]
pub struct LabelMatch<'a> {
    pub flags: FlagSet,
    pub unknown: Vec<&'a str>,
}

/// Exact label → flag lookup. Matching is case- and punctuation-sensitive.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: HashMap<String, FlagKind>,
}

impl Default for LabelTable {
    fn default() -> Self {
        let labels = DEFAULT_LABELS
            .iter()
            .map(|(label, kind)| (label.to_string(), *kind))
            .collect();
        Self { labels }
    }
}

impl LabelTable {
    /// A table that recognises no labels at all.
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Register (or remap) a backend label.
    pub fn with_alias(mut self, label: impl Into<String>, kind: FlagKind) -> Self {
        self.labels.insert(label.into(), kind);
        self
    }

    pub fn lookup(&self, label: &str) -> Option<FlagKind> {
        self.labels.get(label).copied()
    }

    /// Resolve every label in `labels`, collecting the ones with no mapping.
    pub fn resolve<'a>(&self, labels: &'a [String]) -> LabelMatch<'a> {
        let mut out = LabelMatch::default();
        for label in labels {
            match self.lookup(label) {
                Some(kind) => out.flags.insert(kind),
                None => out.unknown.push(label.as_str()),
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
