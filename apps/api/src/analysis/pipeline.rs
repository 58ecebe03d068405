//! Analysis pipeline: one run from validated request to decoded response.
//!
//! Flow: build_prompt → transport.send → decode → extract_sources.
//! Stages run strictly in order; only the transport call suspends.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analysis::decoder::decode;
use crate::analysis::error::AnalysisError;
use crate::analysis::prompts::build_prompt;
use crate::analysis::request::{AnalysisPayload, AnalysisRequest};
use crate::analysis::sources::extract_sources;
use crate::analysis::transport::AnalysisTransport;
use crate::models::AnalysisResponse;

/// Runs the pipeline once. No retries; the first failing stage ends the run.
///
/// When the engine reports grounding chunks, the extracted sources replace
/// whatever `insight.sources` the body carried.
pub async fn analyze(
    transport: &AnalysisTransport,
    request: &AnalysisRequest,
    cancel: Option<&CancellationToken>,
) -> Result<AnalysisResponse, AnalysisError> {
    let prompt = build_prompt(request.cv_text(), request.additional_skills());
    let payload = AnalysisPayload {
        cv_text: request.cv_text(),
        additional_skills: request.additional_skills(),
        prompt: &prompt,
    };

    let raw = transport.send(&payload, cancel).await?;

    let mut response = decode(&raw.body)?;

    if let Some(chunks) = raw.grounding_chunks {
        response.insight.sources = extract_sources(&chunks);
        info!(
            "Extracted {} sources from {} grounding chunks",
            response.insight.sources.len(),
            chunks.len()
        );
    }

    Ok(response)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::error::CancelReason;
    use crate::analysis::transport::tests::{Script, ScriptedEngine};
    use serde_json::json;

    pub(crate) const JEAN_DUPONT: &str = r#"{
        "updatedCV": {
            "fullName": "Jean Dupont",
            "email": "jean.dupont@email.com",
            "phone": "+33 6 12 34 56 78",
            "location": "Grenoble, France",
            "summary": "Jeune cadre dynamique avec un Master 2 en Management.",
            "experiences": [{
                "company": "Flex Cuisine",
                "role": "Adjoint Responsable",
                "location": "Grenoble",
                "period": "12/2021 - Présent",
                "description": ["Gestion opérationnelle de l'équipe de 15 personnes."]
            }],
            "education": [{
                "school": "Grenoble École de Management",
                "degree": "Master 2 Management",
                "year": "2023"
            }],
            "skills": ["Management", "Gestion de projet", "Leadership"]
        },
        "insight": {
            "jobTitle": "Business Unit Manager",
            "estimatedSalary": "38 000 - 45 000 € brut/an",
            "reasoning": "Le marché grenoblois valorise les profils Master 2.",
            "sources": [{"title": "Glassdoor Grenoble", "uri": "https://glassdoor.com"}]
        }
    }"#;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("A".repeat(60), Some("SQL".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_decodes_engine_response() {
        let engine = ScriptedEngine::new(Script::Body(JEAN_DUPONT.to_string()));
        let transport = AnalysisTransport::new(engine);

        let response = analyze(&transport, &request(), None).await.unwrap();

        assert_eq!(response.updated_cv.full_name, "Jean Dupont");
        assert_eq!(response.insight.job_title, "Business Unit Manager");
        assert_eq!(response.insight.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_grounding_chunks_replace_body_sources() {
        let chunks = vec![
            json!({"web": {"title": "APEC", "uri": "https://apec.fr"}}),
            json!({"web": {"title": ""}}),
            json!({"web": {"title": "Indeed", "uri": "https://indeed.fr"}}),
        ];
        let engine = ScriptedEngine::new(Script::Chunks(JEAN_DUPONT.to_string(), chunks));
        let transport = AnalysisTransport::new(engine);

        let response = analyze(&transport, &request(), None).await.unwrap();

        let titles: Vec<_> = response
            .insight
            .sources
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, ["APEC", "Indeed"]);
    }

    #[tokio::test]
    async fn test_not_json_fails_with_parse_error() {
        let engine = ScriptedEngine::new(Script::Body("not json".to_string()));
        let transport = AnalysisTransport::new(engine);

        let err = analyze(&transport, &request(), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_fails_without_engine_call() {
        let engine = ScriptedEngine::new(Script::Body(JEAN_DUPONT.to_string()));
        let transport = AnalysisTransport::new(engine.clone());
        let token = CancellationToken::new();
        token.cancel();

        let err = analyze(&transport, &request(), Some(&token)).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled(CancelReason::Caller)));
        assert_eq!(engine.call_count(), 0);
    }
}
