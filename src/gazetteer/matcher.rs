//! Matching rules over the gazetteer tables.
//!
//! Location resolution runs in precedence tiers: known misspellings first,
//! then whole-word canonical names and abbreviations, then longer variants
//! embedded inside query words, and finally a district scan. City names are
//! applied as a post-processing step by the extraction pipeline.

use super::Gazetteer;

/// Resolves the state mentioned in a query, if any.
///
/// The query must already be upper-cased. Misspellings outrank correct
/// names so that e.g. "CHATTISGARH" is never shadowed by a district hit.
pub fn match_state(gazetteer: &Gazetteer, upper_query: &str) -> Option<String> {
    for pattern in gazetteer.misspelling_patterns() {
        if pattern.matches_word(upper_query) {
            return Some(pattern.canonical().to_string());
        }
    }

    for pattern in gazetteer
        .name_patterns()
        .iter()
        .chain(gazetteer.variant_patterns())
    {
        if pattern.matches_word(upper_query) {
            return Some(pattern.canonical().to_string());
        }
    }

    // Longer abbreviations may be glued to other characters ("KTAKA?",
    // "in-MAHA"). Canonical names stay out of this tier so that ordinary
    // words containing one ("GOALS") never resolve to a state.
    for word in upper_query.split_whitespace() {
        for pattern in gazetteer.variant_patterns() {
            if pattern.variant().len() > 2 && word.contains(pattern.variant()) {
                return Some(pattern.canonical().to_string());
            }
        }
    }

    None
}

/// Scans for a district name and returns it with its parent state.
pub fn scan_districts(gazetteer: &Gazetteer, upper_query: &str) -> Option<(String, String)> {
    for (district, state) in gazetteer.district_index() {
        if upper_query.contains(district.as_str()) {
            return Some((district.clone(), state.clone()));
        }
    }
    None
}

/// Resolves a disease mention. Canonical names are checked against the
/// upper-cased query first, then colloquial keywords against the
/// lower-cased one ("mosquito" resolves to MALARIA).
pub fn match_disease(gazetteer: &Gazetteer, query: &str) -> Option<String> {
    let upper = query.to_uppercase();
    for disease in gazetteer.diseases() {
        if upper.contains(disease.as_str()) {
            return Some(disease.clone());
        }
    }

    let lower = query.to_lowercase();
    for (disease, keywords) in gazetteer.disease_keywords() {
        if keywords.iter().any(|kw| lower.contains(kw.as_str())) {
            return Some(disease.clone());
        }
    }

    None
}

/// Finds a city mention and the state it implies. When several cities
/// appear, the last one in table order wins.
pub fn infer_city(gazetteer: &Gazetteer, upper_query: &str) -> Option<(String, String)> {
    let mut hit = None;
    for (city, state) in gazetteer.cities() {
        if upper_query.contains(city.as_str()) {
            hit = Some((city.clone(), state.clone()));
        }
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::Gazetteer;

    fn gazetteer() -> Gazetteer {
        Gazetteer::embedded().unwrap()
    }

    #[test]
    fn whole_word_state_match() {
        let g = gazetteer();
        assert_eq!(
            match_state(&g, "HOW MANY CALLS FROM KERALA LAST MONTH"),
            Some("KERALA".to_string())
        );
    }

    #[test]
    fn no_partial_word_state_match() {
        let g = gazetteer();
        // "GOALS" must not match GOA
        assert_eq!(match_state(&g, "WHAT ARE OUR GOALS FOR Q3"), None);
    }

    #[test]
    fn misspellings_resolve_to_chhattisgarh() {
        let g = gazetteer();
        for variant in [
            "CHATTISGARH",
            "CHHATISGARH",
            "CHHATTISHGARH",
            "CHATTISHGARH",
            "CHATTISGARH STATE",
        ] {
            assert_eq!(
                match_state(&g, variant),
                Some("CHHATTISGARH".to_string()),
                "variant {variant} did not resolve"
            );
        }
    }

    #[test]
    fn abbreviation_matches() {
        let g = gazetteer();
        assert_eq!(
            match_state(&g, "CALLS IN TN THIS WEEK"),
            Some("TAMIL NADU".to_string())
        );
    }

    #[test]
    fn embedded_variant_matches_inside_word() {
        let g = gazetteer();
        assert_eq!(
            match_state(&g, "ANYTHING FROM KTAKA?"),
            Some("KARNATAKA".to_string())
        );
    }

    #[test]
    fn district_scan_returns_parent_state() {
        let g = gazetteer();
        assert_eq!(
            scan_districts(&g, "CALLS FROM MYSURU"),
            Some(("MYSURU".to_string(), "KARNATAKA".to_string()))
        );
    }

    #[test]
    fn disease_by_canonical_name() {
        let g = gazetteer();
        assert_eq!(
            match_disease(&g, "dengue cases reported"),
            Some("DENGUE".to_string())
        );
    }

    #[test]
    fn disease_by_keyword() {
        let g = gazetteer();
        assert_eq!(
            match_disease(&g, "complaints about mosquito bites"),
            Some("MALARIA".to_string())
        );
        assert_eq!(
            match_disease(&g, "coronavirus symptoms"),
            Some("COVID-19".to_string())
        );
    }

    #[test]
    fn city_implies_state() {
        let g = gazetteer();
        assert_eq!(
            infer_city(&g, "CALLS FROM MUMBAI"),
            Some(("MUMBAI".to_string(), "MAHARASHTRA".to_string()))
        );
    }
}
