//! Prompts embedded in JSON submission envelopes.
//!
//! Callers can override both via [`crate::config::AnalyzerConfig::prompt`]
//! and [`crate::config::AnalyzerConfig::system_prompt`]; the constants here
//! are used only when no override is provided.

/// Leading text element of every `JsonWithDataUri` user message.
///
/// It names the same four topics the report classifier sorts on, so the
/// returned text tends to fall into labelled sections.
pub const DEFAULT_ANALYSIS_PROMPT: &str = "Conduct a detailed analysis of this construction or property image. Identify key elements, potential issues, and notable features relevant to a professional inspection or appraisal. Include observations on structural components, materials used, condition of visible elements, and any apparent code compliance concerns.";

/// Inspector persona, sent as a system message only when opted into.
pub const INSPECTOR_SYSTEM_PROMPT: &str = "You are an expert in construction inspection and property appraisal. Analyze the provided image with a focus on professional assessment, safety concerns, and regulatory compliance. Provide a detailed, objective report suitable for official documentation.";
