use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::ReportError;

#[derive(Debug, Deserialize)]
struct MappingRow {
    actual: String,
    mapping: String,
}

/// Translates raw tmc codes into dashboard display names. Codes without a
/// mapping pass through unchanged.
#[derive(Debug, Default)]
pub struct DisplayNameMapper {
    lookup: HashMap<String, String>,
}

impl DisplayNameMapper {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut lookup = HashMap::new();
        for row in reader.deserialize() {
            let row: MappingRow = row?;
            lookup.insert(row.actual, row.mapping);
        }
        Ok(Self { lookup })
    }

    pub fn map(&self, code: &str) -> String {
        self.lookup
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn map_list<S: AsRef<str>>(&self, codes: &[S]) -> Vec<String> {
        codes.iter().map(|c| self.map(c.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> DisplayNameMapper {
        let mut lookup = HashMap::new();
        lookup.insert("KA01_TMC".to_string(), "Karnataka".to_string());
        DisplayNameMapper { lookup }
    }

    #[test]
    fn mapped_code_translates() {
        assert_eq!(mapper().map("KA01_TMC"), "Karnataka");
    }

    #[test]
    fn unmapped_code_passes_through() {
        assert_eq!(mapper().map("XX_TMC"), "XX_TMC");
    }
}
