//! Validated analysis input and the payload sent to the engine.

use serde::Serialize;

use crate::analysis::error::AnalysisError;

pub const CV_TEXT_MIN_CHARS: usize = 50;
pub const CV_TEXT_MAX_CHARS: usize = 10_000;
pub const ADDITIONAL_SKILLS_MAX_CHARS: usize = 500;

/// A résumé submission that already satisfies the input length constraints.
///
/// Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    cv_text: String,
    additional_skills: String,
}

impl AnalysisRequest {
    pub fn new(
        cv_text: impl Into<String>,
        additional_skills: Option<String>,
    ) -> Result<Self, AnalysisError> {
        let cv_text = cv_text.into();
        let additional_skills = additional_skills.unwrap_or_default();

        let cv_len = cv_text.chars().count();
        if cv_len < CV_TEXT_MIN_CHARS {
            return Err(AnalysisError::Validation(format!(
                "cvText must be at least {CV_TEXT_MIN_CHARS} characters (got {cv_len})"
            )));
        }
        if cv_len > CV_TEXT_MAX_CHARS {
            return Err(AnalysisError::Validation(format!(
                "cvText must be at most {CV_TEXT_MAX_CHARS} characters (got {cv_len})"
            )));
        }

        let skills_len = additional_skills.chars().count();
        if skills_len > ADDITIONAL_SKILLS_MAX_CHARS {
            return Err(AnalysisError::Validation(format!(
                "additionalSkills must be at most {ADDITIONAL_SKILLS_MAX_CHARS} characters (got {skills_len})"
            )));
        }

        Ok(Self {
            cv_text,
            additional_skills,
        })
    }

    pub fn cv_text(&self) -> &str {
        &self.cv_text
    }

    pub fn additional_skills(&self) -> &str {
        &self.additional_skills
    }
}

/// JSON body of one engine call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload<'a> {
    pub cv_text: &'a str,
    pub additional_skills: &'a str,
    pub prompt: &'a str,
}
