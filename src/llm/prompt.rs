//! Prompt assembly for the SQL generation backends.
//!
//! The prompt is a fixed instruction block with worked examples, followed by
//! the live schema hint, the extracted-entity summary, and the question. The
//! examples steer small code models toward GROUP BY/COUNT aggregations,
//! ALL-CAPS state literals, and backtick-quoting of the hyphenated age
//! column.

use crate::extract::ExtractedEntities;

const INSTRUCTIONS: &str = r#"You are an expert SQL assistant. Convert the following natural language question into a syntactically correct SQL query.

IMPORTANT: You need to give ONLY the exact SQL command needed for the current question. Do not include any previous conversations, results, or additional SQL statements. Do not include any text like 'Question:', 'Result:', or previous answers. Return ONLY a single valid SQL statement without any additional text.

For questions asking to 'show', 'list', 'display', or asking about distribution/counts, ALWAYS use GROUP BY and COUNT to provide aggregated data:

Example 1:
SELECT gender, COUNT(telemanasid) AS gender_count FROM table1 GROUP BY gender ORDER BY gender_count DESC;

Example 2:
SELECT state_name, COUNT(telemanasid) AS state_count FROM table1 WHERE state_name IS NOT NULL GROUP BY state_name ORDER BY state_count DESC;

Natural Language: How many males are there in Telangana
SQL: SELECT COUNT(telemanasid) AS male_count FROM table1 WHERE state_name = 'TELANGANA' AND gender = 'MALE';

Natural Language: In Karnataka State, get the gender count distribution
SQL: SELECT state_name, gender, COUNT(telemanasid) AS gender_count FROM table1 WHERE state_name = 'KARNATAKA' GROUP BY state_name, gender ORDER BY gender_count DESC;

Natural Language: Show data for Maharashtra
SQL: SELECT * FROM table1 WHERE state_name = 'MAHARASHTRA';

Natural Language: Count of calls from Maharashtra by gender
SQL: SELECT gender, COUNT(telemanasid) AS call_count FROM table1 WHERE state_name = 'MAHARASHTRA' GROUP BY gender ORDER BY call_count DESC;

Natural Language: Show states where age is greater than 30
SQL: SELECT state_name, COUNT(telemanasid) AS count FROM table1 WHERE `patient - telemanas_id__age` > 30 GROUP BY state_name ORDER BY count DESC;

IMPORTANT:
- For visualization queries, NEVER use SELECT DISTINCT.
- ALWAYS use GROUP BY with COUNT for proper data aggregation.
- Indian state names should be in ALL CAPS (e.g., 'MAHARASHTRA', 'KARNATAKA', 'TAMIL NADU').
- When matching state names, always use EXACT matches like state_name = 'MAHARASHTRA'.
- CRITICAL: ALWAYS wrap column names with hyphens or spaces in BACKTICKS, for example: `patient - telemanas_id__age`. Without backticks, SQL will interpret it as a subtraction operation and fail.
- NEVER FORGET BACKTICKS around column names with hyphens: `patient - telemanas_id__age`
- The age information is stored in the `patient - telemanas_id__age` column.
- Patient ID information is stored in the `telemanasid` column.
- State information is stored in the state_name column (no backticks needed).

- CRITICAL: Without backticks around hyphenated column names, queries will fail with 'no such column' errors.

WRONG: SELECT * FROM table1 WHERE patient - telemanas_id__age > 30;
CORRECT: SELECT * FROM table1 WHERE `patient - telemanas_id__age` > 30;

WRONG: SELECT DISTINCT state_name FROM table1;
CORRECT: SELECT state_name, COUNT(telemanasid) as count FROM table1 GROUP BY state_name;

IMPORTANT FOR COUNTING:
- ALWAYS use COUNT(telemanasid) instead of COUNT(*) for accurate patient counts
- For unique patient counts, use COUNT(DISTINCT telemanasid)
- Each telemanas_id represents a unique patient/record
"#;

pub struct PromptBuilder<'a> {
    question: &'a str,
    schema_hint: &'a str,
    entities: &'a ExtractedEntities,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(question: &'a str, schema_hint: &'a str, entities: &'a ExtractedEntities) -> Self {
        Self {
            question,
            schema_hint,
            entities,
        }
    }

    /// The question, widened with the extracted state when the question
    /// itself does not mention it.
    fn enhanced_question(&self) -> String {
        match &self.entities.state {
            Some(state) if !self.question.to_lowercase().contains(&state.to_lowercase()) => {
                format!("{} in {}", self.question, state)
            }
            _ => self.question.to_string(),
        }
    }

    pub fn build(&self) -> String {
        format!(
            "{}\nDatabase Schema:\n{}\nBelow is the processed data from user query:  {}\nQuestion: {}\nSQL:",
            INSTRUCTIONS,
            self.schema_hint,
            self.entities.summary(),
            self.enhanced_question()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_enhanced_with_missing_state() {
        let entities = ExtractedEntities {
            disease: None,
            state: Some("CHHATTISGARH".to_string()),
            district: None,
        };
        let prompt = PromptBuilder::new("calls from Chattisgarh", "Table table1:", &entities)
            .build();
        assert!(prompt.contains("Question: calls from Chattisgarh in CHHATTISGARH\nSQL:"));
    }

    #[test]
    fn question_unchanged_when_state_already_present() {
        let entities = ExtractedEntities {
            disease: None,
            state: Some("KERALA".to_string()),
            district: None,
        };
        let prompt = PromptBuilder::new("calls from kerala", "Table table1:", &entities).build();
        assert!(prompt.contains("Question: calls from kerala\nSQL:"));
    }

    #[test]
    fn prompt_ends_with_sql_marker() {
        let prompt = PromptBuilder::new("anything", "", &ExtractedEntities::default()).build();
        assert!(prompt.ends_with("SQL:"));
        assert!(prompt.contains("No relevant health entities found in the query."));
    }
}
