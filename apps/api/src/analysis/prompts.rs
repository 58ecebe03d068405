// Prompt template for the résumé analysis. Kept in French: it targets the
// Grenoble job market and changing its language changes the engine output.

pub const CV_TEXT_PLACEHOLDER: &str = "{{cvText}}";
pub const ADDITIONAL_SKILLS_PLACEHOLDER: &str = "{{additionalSkills}}";

/// Résumé analysis prompt. Replace `{{cvText}}` and `{{additionalSkills}}`
/// through [`build_prompt`].
pub const CV_ANALYSIS_PROMPT: &str = r#"
Tu es un expert en recrutement de haut niveau spécialisé dans le marché de l'emploi à Grenoble (Silicon Valley française).

IMPORTANT : L'utilisateur vient d'obtenir son Master 2. Il n'est plus étudiant. C'est un jeune cadre.

INSTRUCTIONS POUR LE CV :
1. Analyse le texte du CV fourni.
2. Supprime impérativement toute expérience liée à "Comfort Hotel Meylan".
3. Assure-toi que l'expérience chez "Flex" (ou "Flex Cuisine") est marquée comme le poste actuel (jusqu'à aujourd'hui).
4. RÉÉCRITURE DES MISSIONS : Transforme chaque point de description en une réalisation orientée "résultats" et "leadership".
   - Utilise des verbes d'action puissants.
   - Valorise la dimension stratégique, l'autonomie et la capacité à gérer des projets complexes.
5. Intègre les compétences additionnelles fournies.
6. Traduis le tout dans un format JSON structuré.

ANALYSE DE MARCHÉ (GRENOBLE) :
1. Identifie le métier le plus rémunérateur accessible pour un TITULAIRE de Master 2 Management/Commerce à Grenoble (ne propose plus de stages ou d'alternance).
2. Considère les leaders locaux (Schneider Electric, STMicroelectronics, Caterpillar, Rossignol, ou Business Units Tech).
3. Donne une fourchette de salaire de "Jeune Cadre" réaliste pour l'Isère.

CV Input :
{{cvText}}

Compétences additionnelles :
{{additionalSkills}}
"#;

/// Renders the analysis prompt.
///
/// Substitution is a single pass over the template: placeholder text that
/// appears inside either input is copied verbatim, never expanded. Inputs are
/// not escaped or truncated; length checks happen in `AnalysisRequest::new`.
pub fn build_prompt(cv_text: &str, additional_skills: &str) -> String {
    let mut prompt = String::with_capacity(
        CV_ANALYSIS_PROMPT.len() + cv_text.len() + additional_skills.len(),
    );
    let mut rest = CV_ANALYSIS_PROMPT;

    while let Some(start) = rest.find("{{") {
        prompt.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(CV_TEXT_PLACEHOLDER) {
            prompt.push_str(cv_text);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(ADDITIONAL_SKILLS_PLACEHOLDER) {
            prompt.push_str(additional_skills);
            rest = after;
        } else {
            prompt.push_str("{{");
            rest = &tail[2..];
        }
    }
    prompt.push_str(rest);

    prompt
}
