pub mod prompt;
pub mod providers;

use crate::config::LlmConfig;
use crate::extract::ExtractedEntities;
use crate::sql::sanitize::SqlSanitizer;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum LlmError {
    ConnectionError(String),
    ResponseError(String),
    ConfigError(String),
}

impl LlmError {
    /// The bare message without the error-class prefix. Used when the
    /// failure is surfaced inside a generated-SQL payload.
    pub fn message(&self) -> &str {
        match self {
            LlmError::ConnectionError(msg)
            | LlmError::ResponseError(msg)
            | LlmError::ConfigError(msg) => msg,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ConnectionError(msg) => write!(f, "LLM connection error: {}", msg),
            LlmError::ResponseError(msg) => write!(f, "LLM response error: {}", msg),
            LlmError::ConfigError(msg) => write!(f, "LLM configuration error: {}", msg),
        }
    }
}

impl Error for LlmError {}

#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Result of a generation attempt. A failure still renders as SQL text so
/// callers that echo the statement back to the client keep working, but it
/// can never reach the database.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedSql {
    Statement(String),
    Failed(String),
}

impl GeneratedSql {
    pub fn render(&self) -> String {
        match self {
            GeneratedSql::Statement(sql) => sql.clone(),
            GeneratedSql::Failed(msg) => format!("-- ERROR: {}", msg),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, GeneratedSql::Failed(_))
    }
}

pub struct LlmManager {
    generator: Box<dyn SqlGenerator + Send + Sync>,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let generator: Box<dyn SqlGenerator + Send + Sync> = match config.backend.as_str() {
            "remote" => Box::new(providers::remote::RemoteLlmProvider::new(config)?),
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(config)?),
            _ => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        Ok(Self { generator })
    }

    /// Wraps an arbitrary generator, bypassing backend configuration.
    pub fn from_generator(generator: Box<dyn SqlGenerator + Send + Sync>) -> Self {
        Self { generator }
    }

    /// Builds the prompt, runs the model, and sanitizes the output. Model
    /// failures are folded into [`GeneratedSql::Failed`] rather than
    /// propagated, so a broken backend degrades to an error comment.
    pub async fn generate_sql(
        &self,
        question: &str,
        schema_hint: &str,
        entities: &ExtractedEntities,
        sanitizer: &SqlSanitizer,
    ) -> GeneratedSql {
        let prompt = prompt::PromptBuilder::new(question, schema_hint, entities).build();
        debug!("Prepared LLM prompt: {}", prompt);

        match self.generator.complete(&prompt).await {
            Ok(raw) => {
                let sql = sanitizer.sanitize(&raw);
                debug!("Sanitized SQL: {}", sql);
                GeneratedSql::Statement(sql)
            }
            Err(e) => {
                warn!("SQL generation failed: {}", e);
                GeneratedSql::Failed(e.message().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingGenerator;

    #[async_trait]
    impl SqlGenerator for FailingGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::ResponseError("model not found".to_string()))
        }
    }

    struct EchoGenerator(&'static str);

    #[async_trait]
    impl SqlGenerator for EchoGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn backend_failure_becomes_error_comment() {
        let manager = LlmManager::from_generator(Box::new(FailingGenerator));
        let result = manager
            .generate_sql(
                "how many calls",
                "Table table1:",
                &ExtractedEntities::default(),
                &SqlSanitizer::default(),
            )
            .await;
        assert_eq!(result, GeneratedSql::Failed("model not found".to_string()));
        assert_eq!(result.render(), "-- ERROR: model not found");
        assert!(result.is_failed());
    }

    #[tokio::test]
    async fn successful_generation_is_sanitized() {
        let manager = LlmManager::from_generator(Box::new(EchoGenerator(
            "SELECT COUNT(*) FROM table1; SELECT 1;",
        )));
        let result = manager
            .generate_sql(
                "how many calls",
                "Table table1:",
                &ExtractedEntities::default(),
                &SqlSanitizer::default(),
            )
            .await;
        assert_eq!(
            result,
            GeneratedSql::Statement("SELECT COUNT(telemanasid) FROM table1".to_string())
        );
    }

    #[test]
    fn unknown_backend_rejected() {
        let config = LlmConfig {
            backend: "mystery".to_string(),
            model: "m".to_string(),
            api_key: None,
            api_url: None,
        };
        assert!(matches!(
            LlmManager::new(&config),
            Err(LlmError::ConfigError(_))
        ));
    }
}
