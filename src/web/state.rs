use crate::config::AppConfig;
use crate::db::db_pool::ReadOnlyDuckDbManager;
use crate::extract::EntityExtractionPipeline;
use crate::llm::LlmManager;
use crate::sql::SqlSanitizer;
use r2d2::Pool;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: Pool<ReadOnlyDuckDbManager>,
    pub llm_manager: LlmManager,
    pub pipeline: EntityExtractionPipeline,
    pub sanitizer: SqlSanitizer,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db_pool: Pool<ReadOnlyDuckDbManager>,
        llm_manager: LlmManager,
        pipeline: EntityExtractionPipeline,
    ) -> Self {
        Self {
            config,
            db_pool,
            llm_manager,
            pipeline,
            sanitizer: SqlSanitizer::default(),
            startup_time: chrono::Utc::now(),
        }
    }
}
