//! Occupation automation analysis on top of a generation backend.
//!
//! One prompt carries the occupation and all of its real tasks; the model is
//! asked for a single JSON document with a score per task, an overall score
//! and a short summary.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use metier_core::logging;
use metier_core::{
    AnalysisBackend, Error, GenerationBackend, Occupation, OccupationAnalysis, Result, TaskRef,
};

/// System message sent with every analysis request.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "Tu es un expert de l'automatisation des métiers. \
Tu réponds toujours avec un JSON valide, sans aucun texte autour.";

/// Build the user prompt for one occupation and its tasks.
pub fn build_analysis_prompt(occupation: &Occupation, tasks: &[TaskRef]) -> String {
    let mut prompt = String::with_capacity(1024 + tasks.len() * 160);

    prompt.push_str(
        "Évalue le potentiel d'automatisation du métier suivant, tâche par tâche.\n\n",
    );
    prompt.push_str("MÉTIER\n");
    let _ = writeln!(prompt, "- Code : {}", occupation.code);
    let _ = writeln!(prompt, "- Intitulé : {}", occupation.title);
    let _ = writeln!(
        prompt,
        "- Secteur : {}",
        occupation.sector.as_deref().unwrap_or("non précisé")
    );
    let _ = writeln!(
        prompt,
        "- Description : {}",
        occupation.description.as_deref().unwrap_or("non précisée")
    );

    prompt.push_str("\nTÂCHES\n");
    for task in tasks {
        let _ = writeln!(prompt, "- id {} : {}", task.id, task.label);
        if let Some(description) = task.description.as_deref() {
            let _ = writeln!(prompt, "  {}", description);
        }
    }

    prompt.push_str(
        "\nBARÈME (0 à 100)\n\
         - 0-20 : créativité, empathie ou jugement complexe\n\
         - 21-40 : interaction humaine, adaptation au contexte\n\
         - 41-60 : automatisable en partie, sous supervision\n\
         - 61-80 : répétitif, règles claires, données structurées\n\
         - 81-100 : purement mécanique ou calculatoire\n",
    );

    let _ = write!(
        prompt,
        "\nRéponds uniquement avec ce JSON :\n\
         {{\n\
         \x20 \"occupationCode\": \"{}\",\n\
         \x20 \"overallScore\": <nombre>,\n\
         \x20 \"summary\": \"<impact global en 2-3 phrases>\",\n\
         \x20 \"tasks\": [\n\
         \x20   {{\"taskId\": <id>, \"libelle\": \"<tâche>\", \"automationScore\": <nombre>, \
         \"analysis\": \"<1-2 phrases>\", \"reasoning\": \"<1 phrase>\"}}\n\
         \x20 ]\n\
         }}\n",
        occupation.code
    );

    prompt
}

/// Locate the JSON object in a model reply.
///
/// Tolerates Markdown code fences and chatter around the object by taking
/// the span from the first `{` to the last `}`.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse a model reply into an [`OccupationAnalysis`].
pub fn parse_analysis(raw: &str) -> Result<OccupationAnalysis> {
    let json = extract_json_object(raw)
        .ok_or_else(|| Error::Inference("Model reply contains no JSON object".to_string()))?;
    serde_json::from_str::<OccupationAnalysis>(json)
        .map_err(|e| Error::Inference(format!("Malformed analysis JSON: {}", e)))
}

/// [`AnalysisBackend`] that prompts a [`GenerationBackend`].
pub struct OccupationAnalyzer {
    backend: Arc<dyn GenerationBackend>,
}

impl OccupationAnalyzer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AnalysisBackend for OccupationAnalyzer {
    async fn analyze_occupation(
        &self,
        occupation: &Occupation,
        tasks: &[TaskRef],
    ) -> Result<OccupationAnalysis> {
        let start = Instant::now();
        let prompt = build_analysis_prompt(occupation, tasks);

        let reply = self
            .backend
            .generate_with_system(ANALYSIS_SYSTEM_PROMPT, &prompt)
            .await?;
        if reply.trim().is_empty() {
            return Err(Error::Inference("Model returned an empty reply".to_string()));
        }

        let analysis = parse_analysis(&reply)?;
        if analysis.occupation_code != occupation.code {
            warn!(
                subsystem = logging::SUBSYSTEM_INFERENCE,
                component = logging::COMPONENT_ANALYZER,
                occupation_code = %occupation.code,
                returned_code = %analysis.occupation_code,
                "Model echoed a different occupation code"
            );
        }

        debug!(
            subsystem = logging::SUBSYSTEM_INFERENCE,
            component = logging::COMPONENT_ANALYZER,
            op = "analyze",
            occupation_code = %occupation.code,
            model = self.backend.model_name(),
            task_count = tasks.len(),
            result_count = analysis.tasks.len(),
            prompt_len = prompt.len(),
            response_len = reply.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Occupation analysis parsed"
        );
        Ok(analysis)
    }

    fn model_name(&self) -> &str {
        self.backend.model_name()
    }
}
