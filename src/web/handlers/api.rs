use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::executor::{self, QueryOutcome};
use crate::db::schema_hint::schema_hint;
use crate::extract::ExtractedEntities;
use crate::llm::GeneratedSql;
use crate::reports;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub entities: ExtractedEntities,
    pub sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub schema: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub llm_backend: String,
    pub database: String,
}

fn internal<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    error!("Internal error: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

async fn live_schema_hint(state: &Arc<AppState>) -> Result<String, (StatusCode, String)> {
    let pool = state.db_pool.clone();
    // DuckDB calls are synchronous, keep them off the async workers
    tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| e.to_string())?;
        schema_hint(&conn).map_err(|e| e.to_string())
    })
    .await
    .map_err(internal)?
    .map_err(internal)
}

/// Natural-language chat endpoint: extract entities, generate SQL, run it.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    info!("Received question: {}", payload.question);

    let entities = state.pipeline.extract(&payload.question);
    let hint = live_schema_hint(&state).await?;

    let generated = state
        .llm_manager
        .generate_sql(&payload.question, &hint, &entities, &state.sanitizer)
        .await;
    let sql = generated.render();

    let statement = match generated {
        // A failed generation is echoed back as an SQL comment and never
        // reaches the database
        GeneratedSql::Failed(_) => {
            return Ok(Json(AskResponse {
                question: payload.question,
                entities,
                sql,
                columns: None,
                rows: None,
            }));
        }
        GeneratedSql::Statement(statement) => statement,
    };

    let pool = state.db_pool.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| e.to_string())?;
        executor::execute(&conn, &statement).map_err(|e| e.to_string())
    })
    .await
    .map_err(internal)?
    .map_err(|e| {
        error!("Query execution failed: {}", e);
        (StatusCode::BAD_REQUEST, format!("Query failed: {}", e))
    })?;

    let (columns, rows) = match outcome {
        QueryOutcome::Rows { columns, rows } => (Some(columns), Some(rows)),
        QueryOutcome::NonRowReturning => (None, None),
    };

    Ok(Json(AskResponse {
        question: payload.question,
        entities,
        sql,
        columns,
        rows,
    }))
}

pub async fn get_schema(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let schema = live_schema_hint(&state).await?;
    Ok(Json(SchemaResponse { schema }))
}

/// Regenerates every chart artifact from the current CSV snapshots.
pub async fn refresh_reports(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let config = state.config.reports.clone();
    tokio::task::spawn_blocking(move || reports::run_all(&config))
        .await
        .map_err(internal)?
        .map_err(internal)?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

pub async fn system_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = chrono::Utc::now() - state.startup_time;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds(),
        llm_backend: state.config.llm.backend.clone(),
        database: state.config.database.connection_string.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::db_pool::ReadOnlyDuckDbManager;
    use crate::extract::EntityExtractionPipeline;
    use crate::gazetteer::Gazetteer;
    use crate::llm::{LlmError, LlmManager, SqlGenerator};
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use r2d2::Pool;
    use std::path::PathBuf;

    struct FailingGenerator;

    #[async_trait]
    impl SqlGenerator for FailingGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::ResponseError("model not found".to_string()))
        }
    }

    fn seeded_db(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}.duckdb", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        let conn = duckdb::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE table1 (telemanasid VARCHAR, state_name VARCHAR);
             INSERT INTO table1 VALUES ('t1', 'KERALA');",
        )
        .unwrap();
        path
    }

    fn app_state(db_path: &PathBuf) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.database.connection_string = db_path.display().to_string();

        let pool = Pool::builder()
            .max_size(1)
            .build(ReadOnlyDuckDbManager::new(config.database.connection_string.clone()))
            .unwrap();
        let pipeline =
            EntityExtractionPipeline::new(std::sync::Arc::new(Gazetteer::embedded().unwrap()));
        Arc::new(AppState::new(
            config,
            pool,
            LlmManager::from_generator(Box::new(FailingGenerator)),
            pipeline,
        ))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn failed_generation_returns_error_comment_without_executing() {
        let db_path = seeded_db("careline_ask_failed");
        let state = app_state(&db_path);

        let result = ask(
            State(state),
            Json(AskRequest {
                question: "how many calls from Kerala".to_string(),
            }),
        )
        .await;

        // The broken backend still yields a 200 with the error rendered as
        // SQL; columns/rows stay absent because nothing reached the database
        let body = body_json(result.unwrap().into_response()).await;
        assert_eq!(body["sql"], "-- ERROR: model not found");
        assert_eq!(body["question"], "how many calls from Kerala");
        assert!(body.get("columns").is_none());
        assert!(body.get("rows").is_none());

        let _ = std::fs::remove_file(&db_path);
    }
}
