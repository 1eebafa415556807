//! Best-effort repair of model-generated SQL.
//!
//! Small code models echo prompt structure, emit several statements, wrap
//! output in markdown fences, and drop the backticks around hyphenated
//! column names. The sanitizer trims all of that down to a single statement
//! without ever failing; text it cannot repair is passed through and the
//! error surfaces at execution time. Every transform is idempotent, so
//! re-sanitizing already-clean SQL is a no-op.

use regex::Regex;

const IDENTIFIER_PLACEHOLDER: char = '\u{0}';

struct IdentifierRule {
    bare: String,
    quoted: String,
}

pub struct SqlSanitizer {
    identifier_rules: Vec<IdentifierRule>,
    count_star_re: Regex,
    count_replacement: String,
}

impl Default for SqlSanitizer {
    fn default() -> Self {
        Self::new(&["patient - telemanas_id__age"], "telemanasid")
    }
}

impl SqlSanitizer {
    /// `quoted_identifiers` are column names that must be backtick-quoted
    /// wherever they appear bare; `count_column` replaces the `*` in bare
    /// `COUNT(*)` aggregates.
    pub fn new(quoted_identifiers: &[&str], count_column: &str) -> Self {
        let identifier_rules = quoted_identifiers
            .iter()
            .map(|id| IdentifierRule {
                bare: id.to_string(),
                quoted: format!("`{}`", id),
            })
            .collect();

        // The pattern is fixed and valid by construction
        let count_star_re = Regex::new(r"(?i)COUNT\(\s*\*\s*\)")
            .unwrap_or_else(|_| unreachable!("static pattern"));

        Self {
            identifier_rules,
            count_star_re,
            count_replacement: format!("COUNT({})", count_column),
        }
    }

    pub fn sanitize(&self, raw: &str) -> String {
        let sql = raw.trim();
        let sql = self.truncate_first_statement(sql);
        let sql = Self::truncate_prompt_echo(&sql);
        let sql = Self::strip_code_fences(&sql);
        let sql = self.quote_identifiers(&sql);
        self.rewrite_count_star(&sql)
    }

    /// Keeps everything before the first statement separator that sits
    /// outside quoted literals. The separator itself is dropped, so clean
    /// single statements lose their trailing semicolon too.
    fn truncate_first_statement(&self, sql: &str) -> String {
        let mut in_single = false;
        let mut in_double = false;
        let mut in_backtick = false;

        for (idx, ch) in sql.char_indices() {
            match ch {
                '\'' if !in_double && !in_backtick => in_single = !in_single,
                '"' if !in_single && !in_backtick => in_double = !in_double,
                '`' if !in_single && !in_double => in_backtick = !in_backtick,
                ';' if !in_single && !in_double && !in_backtick => {
                    return sql[..idx].trim().to_string();
                }
                _ => {}
            }
        }
        sql.trim().to_string()
    }

    fn truncate_prompt_echo(sql: &str) -> String {
        let mut sql = sql;
        if let Some(idx) = sql.find("Question:") {
            sql = &sql[..idx];
        }
        if let Some(idx) = sql.find("Result:") {
            sql = &sql[..idx];
        }
        sql.trim().to_string()
    }

    fn strip_code_fences(sql: &str) -> String {
        let mut sql = sql.trim();
        if let Some(rest) = sql.strip_prefix("```sql") {
            sql = rest;
        } else if let Some(rest) = sql.strip_prefix("```") {
            sql = rest;
        }
        if let Some(rest) = sql.strip_suffix("```") {
            sql = rest;
        }
        sql.trim().to_string()
    }

    /// Quotes configured identifiers wherever they appear bare. Occurrences
    /// that are already quoted are shielded behind a placeholder first, the
    /// regex crate has no lookbehind to express this directly.
    fn quote_identifiers(&self, sql: &str) -> String {
        let mut sql = sql.to_string();
        for rule in &self.identifier_rules {
            if !sql.contains(&rule.bare) {
                continue;
            }
            let placeholder = IDENTIFIER_PLACEHOLDER.to_string();
            sql = sql.replace(&rule.quoted, &placeholder);
            sql = sql.replace(&rule.bare, &rule.quoted);
            sql = sql.replace(&placeholder, &rule.quoted);
        }
        sql
    }

    fn rewrite_count_star(&self, sql: &str) -> String {
        self.count_star_re
            .replace_all(sql, self.count_replacement.as_str())
            .into_owned()
    }
}
