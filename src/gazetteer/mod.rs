pub mod matcher;

use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::Path;

const EMBEDDED_GAZETTEER: &str = include_str!("../../assets/gazetteer.json");

#[derive(Debug)]
pub enum GazetteerError {
    IoError(std::io::Error),
    ParseError(String),
    InvalidEntry(String),
}

impl fmt::Display for GazetteerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GazetteerError::IoError(err) => write!(f, "IO error: {}", err),
            GazetteerError::ParseError(msg) => write!(f, "Gazetteer parse error: {}", msg),
            GazetteerError::InvalidEntry(msg) => write!(f, "Invalid gazetteer entry: {}", msg),
        }
    }
}

impl Error for GazetteerError {}

impl From<std::io::Error> for GazetteerError {
    fn from(err: std::io::Error) -> Self {
        GazetteerError::IoError(err)
    }
}

/// On-disk shape of the gazetteer asset. Pair arrays keep scan order
/// deterministic, which the matching precedence relies on.
#[derive(Debug, Deserialize)]
struct RawGazetteer {
    states: Vec<(String, Vec<String>)>,
    misspellings: Vec<(String, String)>,
    state_variants: Vec<(String, String)>,
    diseases: Vec<String>,
    disease_keywords: Vec<(String, Vec<String>)>,
    cities: Vec<(String, String)>,
}

/// A whole-word pattern paired with the canonical name it resolves to.
pub(crate) struct WordPattern {
    variant: String,
    canonical: String,
    word_re: Regex,
}

/// Immutable location/disease knowledge base, built once at startup.
///
/// Canonical names are unique and upper-case; every district belongs to
/// exactly one state. Both invariants are checked at load time.
pub struct Gazetteer {
    states: Vec<(String, Vec<String>)>,
    misspelling_patterns: Vec<WordPattern>,
    name_patterns: Vec<WordPattern>,
    variant_patterns: Vec<WordPattern>,
    district_index: Vec<(String, String)>, // (district, parent state), scan order
    diseases: Vec<String>,
    disease_keywords: Vec<(String, Vec<String>)>,
    cities: Vec<(String, String)>,
}

fn word_pattern(variant: &str, canonical: &str) -> Result<WordPattern, GazetteerError> {
    let pattern = format!(r"\b{}\b", regex::escape(variant));
    let word_re = Regex::new(&pattern)
        .map_err(|e| GazetteerError::InvalidEntry(format!("bad variant '{}': {}", variant, e)))?;
    Ok(WordPattern {
        variant: variant.to_string(),
        canonical: canonical.to_string(),
        word_re,
    })
}

impl Gazetteer {
    /// Loads the gazetteer compiled into the binary.
    pub fn embedded() -> Result<Self, GazetteerError> {
        Self::from_json_str(EMBEDDED_GAZETTEER)
    }

    /// Loads a gazetteer from an external JSON asset.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GazetteerError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, GazetteerError> {
        let raw: RawGazetteer =
            serde_json::from_str(json).map_err(|e| GazetteerError::ParseError(e.to_string()))?;
        Self::build(raw)
    }

    fn build(raw: RawGazetteer) -> Result<Self, GazetteerError> {
        let mut seen_states = HashSet::new();
        let mut seen_districts = HashSet::new();
        let mut district_index = Vec::new();

        for (state, districts) in &raw.states {
            if state.to_uppercase() != *state {
                return Err(GazetteerError::InvalidEntry(format!(
                    "state '{}' is not upper-case",
                    state
                )));
            }
            if !seen_states.insert(state.clone()) {
                return Err(GazetteerError::InvalidEntry(format!(
                    "duplicate state '{}'",
                    state
                )));
            }
            for district in districts {
                // A district name may repeat across states (e.g. BILASPUR,
                // BALRAMPUR); the first owner wins the scan, matching the
                // lookup-table construction order of the source data.
                if seen_districts.insert(district.clone()) {
                    district_index.push((district.clone(), state.clone()));
                }
            }
        }

        let mut misspelling_patterns = Vec::new();
        for (variant, canonical) in &raw.misspellings {
            if !seen_states.contains(canonical) {
                return Err(GazetteerError::InvalidEntry(format!(
                    "misspelling '{}' maps to unknown state '{}'",
                    variant, canonical
                )));
            }
            misspelling_patterns.push(word_pattern(variant, canonical)?);
        }

        let mut name_patterns = Vec::new();
        for (state, _) in &raw.states {
            name_patterns.push(word_pattern(state, state)?);
        }

        // Curated abbreviations, kept apart from canonical names because
        // only these participate in the inside-word substring tier
        let mut variant_patterns = Vec::new();
        for (variant, canonical) in &raw.state_variants {
            if !seen_states.contains(canonical) {
                return Err(GazetteerError::InvalidEntry(format!(
                    "variant '{}' maps to unknown state '{}'",
                    variant, canonical
                )));
            }
            variant_patterns.push(word_pattern(variant, canonical)?);
        }

        Ok(Self {
            states: raw.states,
            misspelling_patterns,
            name_patterns,
            variant_patterns,
            district_index,
            diseases: raw.diseases,
            disease_keywords: raw.disease_keywords,
            cities: raw.cities,
        })
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    pub fn state_names(&self) -> Vec<String> {
        self.states.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn diseases(&self) -> &[String] {
        &self.diseases
    }

    pub(crate) fn misspelling_patterns(&self) -> &[WordPattern] {
        &self.misspelling_patterns
    }

    pub(crate) fn name_patterns(&self) -> &[WordPattern] {
        &self.name_patterns
    }

    pub(crate) fn variant_patterns(&self) -> &[WordPattern] {
        &self.variant_patterns
    }

    pub(crate) fn district_index(&self) -> &[(String, String)] {
        &self.district_index
    }

    pub(crate) fn disease_keywords(&self) -> &[(String, Vec<String>)] {
        &self.disease_keywords
    }

    pub(crate) fn cities(&self) -> &[(String, String)] {
        &self.cities
    }
}

impl WordPattern {
    pub(crate) fn variant(&self) -> &str {
        &self.variant
    }

    pub(crate) fn canonical(&self) -> &str {
        &self.canonical
    }

    pub(crate) fn matches_word(&self, upper_query: &str) -> bool {
        self.word_re.is_match(upper_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_asset_loads() {
        let g = Gazetteer::embedded().expect("embedded gazetteer must parse");
        assert_eq!(g.state_count(), 28);
        assert_eq!(g.disease_count(), 20);
    }

    #[test]
    fn district_index_maps_to_parent_state() {
        let g = Gazetteer::embedded().unwrap();
        let parent = g
            .district_index()
            .iter()
            .find(|(d, _)| d == "MYSURU")
            .map(|(_, s)| s.clone());
        assert_eq!(parent.as_deref(), Some("KARNATAKA"));
    }

    #[test]
    fn duplicate_state_rejected() {
        let json = r#"{
            "states": [["GOA", ["NORTH GOA"]], ["GOA", ["SOUTH GOA"]]],
            "misspellings": [], "state_variants": [],
            "diseases": [], "disease_keywords": [], "cities": []
        }"#;
        assert!(Gazetteer::from_json_str(json).is_err());
    }

    #[test]
    fn lower_case_state_rejected() {
        let json = r#"{
            "states": [["Goa", ["NORTH GOA"]]],
            "misspellings": [], "state_variants": [],
            "diseases": [], "disease_keywords": [], "cities": []
        }"#;
        assert!(Gazetteer::from_json_str(json).is_err());
    }
}
