//! Result types handed to the caller: outcomes, submissions and reports.

use crate::error::Failure;
use serde::Serialize;
use std::fmt;

// ── Outcomes ─────────────────────────────────────────────────────────────

/// The normalized result of one submission.
///
/// Owned by exactly one submission and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The service returned its analysis text.
    Success { raw_text: String },
    /// The submission ended without a result.
    Failure(Failure),
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success { .. })
    }

    /// Convert into a `Result`, for callers who prefer `?`.
    pub fn into_result(self) -> Result<String, Failure> {
        match self {
            AnalysisOutcome::Success { raw_text } => Ok(raw_text),
            AnalysisOutcome::Failure(f) => Err(f),
        }
    }
}

impl From<Result<String, Failure>> for AnalysisOutcome {
    fn from(r: Result<String, Failure>) -> Self {
        match r {
            Ok(raw_text) => AnalysisOutcome::Success { raw_text },
            Err(f) => AnalysisOutcome::Failure(f),
        }
    }
}

/// Identifier of one submission, unique and increasing per [`crate::Analyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value tagged with the submission that produced it.
///
/// Callers that allow overlapping submissions compare `id` against
/// [`crate::Analyzer::is_latest`] before displaying a late result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission<T> {
    pub id: SubmissionId,
    pub value: T,
}

impl<T> Submission<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Submission<U> {
        Submission {
            id: self.id,
            value: f(self.value),
        }
    }
}

// ── Report ───────────────────────────────────────────────────────────────

/// The fixed, ordered set of report categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    StructuralComponents,
    Materials,
    Condition,
    CodeCompliance,
    OtherObservations,
}

impl Category {
    /// All categories in rendering order.
    pub const ALL: [Category; 5] = [
        Category::StructuralComponents,
        Category::Materials,
        Category::Condition,
        Category::CodeCompliance,
        Category::OtherObservations,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::StructuralComponents => "Structural Components",
            Category::Materials => "Materials",
            Category::Condition => "Condition",
            Category::CodeCompliance => "Code Compliance",
            Category::OtherObservations => "Other Observations",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One labelled group of paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub paragraphs: Vec<String>,
}

/// An ordered list of non-empty sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Every paragraph in section order, then paragraph order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.paragraphs.iter().map(String::as_str))
    }

    /// Drop whitespace-only paragraphs, then any section left empty.
    ///
    /// The classifier keeps blank units; this is the caller-side filter.
    pub fn without_blank_paragraphs(self) -> Report {
        let sections = self
            .sections
            .into_iter()
            .filter_map(|mut s| {
                s.paragraphs.retain(|p| !p.trim().is_empty());
                (!s.paragraphs.is_empty()).then_some(s)
            })
            .collect();
        Report { sections }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "## {}", section.title)?;
            for p in &section.paragraphs {
                writeln!(f)?;
                writeln!(f, "{}", p)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn section(title: &str, paragraphs: &[&str]) -> ReportSection {
        ReportSection {
            title: title.into(),
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn category_titles_follow_fixed_order() {
        let titles: Vec<_> = Category::ALL.iter().map(|c| c.title()).collect();
        assert_eq!(
            titles,
            [
                "Structural Components",
                "Materials",
                "Condition",
                "Code Compliance",
                "Other Observations"
            ]
        );
    }

    #[test]
    fn outcome_into_result() {
        let ok = AnalysisOutcome::Success {
            raw_text: "X".into(),
        };
        assert_eq!(ok.into_result().unwrap(), "X");

        let err = AnalysisOutcome::Failure(Failure::missing_input());
        assert_eq!(err.into_result().unwrap_err().kind, FailureKind::MissingInput);
    }

    #[test]
    fn without_blank_paragraphs_drops_empty_sections() {
        let report = Report {
            sections: vec![
                section("Materials", &["Steel beams."]),
                section("Other Observations", &["  ", ""]),
            ],
        };
        let filtered = report.without_blank_paragraphs();
        assert_eq!(filtered.sections.len(), 1);
        assert_eq!(filtered.sections[0].title, "Materials");
    }

    #[test]
    fn display_renders_headings_and_paragraphs() {
        let report = Report {
            sections: vec![
                section("Structural Components", &["Cracked footing."]),
                section("Materials", &["Brick.", "Timber."]),
            ],
        };
        assert_eq!(
            report.to_string(),
            "## Structural Components\n\nCracked footing.\n\n## Materials\n\nBrick.\n\nTimber.\n"
        );
    }

    #[test]
    fn submission_map_keeps_id() {
        let s = Submission {
            id: SubmissionId(7),
            value: 2,
        };
        let mapped = s.map(|v| v * 10);
        assert_eq!(mapped.id, SubmissionId(7));
        assert_eq!(mapped.value, 20);
    }
}
