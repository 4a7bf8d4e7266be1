//! Report classification: raw analysis text → labelled sections.
//!
//! The text is cut into units by the configured [`SplitPolicy`], and each
//! unit is filed under the first [`Category`] whose keywords it contains
//! (case-insensitive substring match). Rules are evaluated top-down; the
//! table order *is* the precedence.
//!
//! Units are never dropped here, not even blank ones. Filtering blank units
//! is the caller's call, see [`Report::without_blank_paragraphs`].

use crate::config::SplitPolicy;
use crate::output::{Category, Report, ReportSection};

/// Ordered (category, keywords) rules. First match wins; no match falls
/// through to [`Category::OtherObservations`].
pub const RULES: &[(Category, &[&str])] = &[
    (Category::StructuralComponents, &["structural", "foundation"]),
    (Category::Materials, &["material"]),
    (Category::Condition, &["condition", "state"]),
    (Category::CodeCompliance, &["code", "compliance", "regulation"]),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportClassifier {
    policy: SplitPolicy,
}

impl ReportClassifier {
    pub fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Cut `raw` into units. Empty text yields no units.
    pub fn split<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        if raw.is_empty() {
            return Vec::new();
        }
        raw.split(self.policy.separator()).collect()
    }

    /// Partition `raw` into a report. Total: never fails.
    pub fn classify(&self, raw: &str) -> Report {
        let mut buckets: [Vec<String>; Category::ALL.len()] = Default::default();
        for unit in self.split(raw) {
            buckets[categorize(unit).index()].push(unit.to_string());
        }

        let sections = Category::ALL
            .iter()
            .zip(buckets)
            .filter(|(_, paragraphs)| !paragraphs.is_empty())
            .map(|(category, paragraphs)| ReportSection {
                title: category.title().to_string(),
                paragraphs,
            })
            .collect();

        Report { sections }
    }
}

/// The category a single unit belongs to.
pub fn categorize(unit: &str) -> Category {
    let lower = unit.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::OtherObservations)
}
