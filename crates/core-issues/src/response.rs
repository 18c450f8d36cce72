//! Analyzer payload shapes.
//!
//! An analyzer either returns structured issues alongside its corrected
//! text, or only a rewritten text (issues are then synthesized from a diff).

use crate::issue::Issue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzerResponse {
    Structured {
        #[serde(rename = "correctedText", alias = "corrected_text", default)]
        corrected_text: String,
        issues: Vec<Issue>,
    },
    Rewrite(String),
}

impl AnalyzerResponse {
    pub fn corrected_text(&self) -> &str {
        match self {
            AnalyzerResponse::Structured { corrected_text, .. } => corrected_text,
            AnalyzerResponse::Rewrite(text) => text,
        }
    }

    /// Reported issues, if any were reported at all.
    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            AnalyzerResponse::Structured { issues, .. } => Some(issues),
            AnalyzerResponse::Rewrite(_) => None,
        }
    }
}
