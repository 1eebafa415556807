//! Entity extraction over caller questions.
//!
//! The pipeline is rule-based first: a direct state mention short-circuits
//! everything else, a district mention implies its parent state, and a city
//! mention is folded in last. An optional zero-shot classifier can be
//! plugged in behind [`EntityClassifier`] for queries the rules miss.

use crate::gazetteer::{matcher, Gazetteer};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const CLASSIFIER_DISEASE_THRESHOLD: f64 = 0.50;
const CLASSIFIER_STATE_THRESHOLD: f64 = 0.40;

/// Entities recognized in a single question.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedEntities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.disease.is_none() && self.state.is_none() && self.district.is_none()
    }

    /// Renders the entities as prompt context. Last populated line carries
    /// no trailing comma.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(disease) = &self.disease {
            lines.push(format!("disease: {}", disease));
        }
        if let Some(district) = &self.district {
            lines.push(format!("District: {}", district));
        }
        if let Some(state) = &self.state {
            lines.push(format!("State: {}", state));
        }
        if lines.is_empty() {
            return "No relevant health entities found in the query.".to_string();
        }
        let mut output = lines.join(",\n");
        output.push('\n');
        output
    }
}

/// Candidate label scored by an external classifier.
pub struct ScoredLabel {
    pub label: String,
    pub score: f64,
}

/// External zero-shot classification capability. Implementations rank the
/// given labels against the query; the pipeline applies its own thresholds.
pub trait EntityClassifier: Send + Sync {
    fn classify(&self, query: &str, labels: &[String]) -> Option<ScoredLabel>;
}

pub struct EntityExtractionPipeline {
    gazetteer: Arc<Gazetteer>,
    classifier: Option<Box<dyn EntityClassifier>>,
}

impl EntityExtractionPipeline {
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self {
            gazetteer,
            classifier: None,
        }
    }

    pub fn with_classifier(
        gazetteer: Arc<Gazetteer>,
        classifier: Box<dyn EntityClassifier>,
    ) -> Self {
        Self {
            gazetteer,
            classifier: Some(classifier),
        }
    }

    pub fn extract(&self, query: &str) -> ExtractedEntities {
        let upper = query.to_uppercase();
        let mut entities = ExtractedEntities::default();

        // Disease matching is independent of location resolution
        entities.disease = matcher::match_disease(&self.gazetteer, query);

        if let Some(state) = matcher::match_state(&self.gazetteer, &upper) {
            // A direct state mention is authoritative, skip the weaker paths
            entities.state = Some(state);
        } else {
            if let Some((district, state)) = matcher::scan_districts(&self.gazetteer, &upper) {
                entities.district = Some(district);
                entities.state = Some(state);
            }

            if let Some(classifier) = &self.classifier {
                if entities.disease.is_none() {
                    if let Some(hit) = classifier.classify(query, self.gazetteer.diseases()) {
                        if hit.score >= CLASSIFIER_DISEASE_THRESHOLD {
                            entities.disease = Some(hit.label);
                        }
                    }
                }
                if entities.state.is_none() {
                    if let Some(hit) = classifier.classify(query, &self.gazetteer.state_names()) {
                        if hit.score >= CLASSIFIER_STATE_THRESHOLD {
                            entities.state = Some(hit.label);
                        }
                    }
                }
            }
        }

        // City names settle the state last, even over an earlier match
        if let Some((city, state)) = matcher::infer_city(&self.gazetteer, &upper) {
            entities.state = Some(state);
            if entities.district.is_none() {
                entities.district = Some(city);
            }
        }

        debug!(?entities, "extracted entities");
        entities
    }
}
