//! Axum route handlers for the Assembly API.
//!
//! Each handler validates at the boundary, then runs the CPU-bound engine call inside
//! `tokio::task::spawn_blocking` under the configured request timeout.

use std::time::Duration;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::assembly::assembler::assemble_with;
use crate::assembly::balance::{check_content_balance, BalanceReport};
use crate::assembly::blueprint::{constraints_from_blueprint, Blueprint};
use crate::assembly::length::{optimize_test_length, LengthRecommendation};
use crate::assembly::parallel::{generate_parallel_forms_with, ParallelForms};
use crate::assembly::validation::{
    validate_blueprint, validate_constraints, validate_count, validate_pool, validate_reliability,
};
use crate::errors::AppError;
use crate::models::assembly::AssemblyResult;
use crate::models::constraint::Constraint;
use crate::models::item::Item;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleRequest {
    pub pool: Vec<Item>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub target_size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleResponse {
    pub assembly_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub strategy: String,
    pub result: AssemblyResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelFormsRequest {
    pub pool: Vec<Item>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub target_size: usize,
    pub number_of_forms: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelFormsResponse {
    pub assembly_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub strategy: String,
    #[serde(flatten)]
    pub forms: ParallelForms,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeLengthRequest {
    #[serde(default)]
    pub pool: Vec<Item>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub min_length: usize,
    pub max_length: usize,
    pub target_reliability: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBalanceRequest {
    pub selection: Vec<Item>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintResponse {
    pub constraints: Vec<Constraint>,
    pub target_size: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assembly/assemble
///
/// Assembles one form with the configured selection strategy.
pub async fn handle_assemble(
    State(state): State<AppState>,
    Json(request): Json<AssembleRequest>,
) -> Result<Json<AssembleResponse>, AppError> {
    validate_pool(&request.pool, state.config.max_pool_size)?;
    validate_constraints(&request.constraints)?;
    validate_count("targetSize", request.target_size)?;

    let strategy = state.strategy.clone();
    let strategy_name = strategy.name().to_string();

    let result = run_blocking(state.config.request_timeout(), move || {
        assemble_with(
            strategy.as_ref(),
            &request.pool,
            &request.constraints,
            request.target_size,
        )
    })
    .await?;

    Ok(Json(AssembleResponse {
        assembly_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        strategy: strategy_name,
        result,
    }))
}

/// POST /api/v1/assembly/parallel-forms
///
/// Generates disjoint forms from one pool. Fewer forms than requested is a normal
/// outcome; compare `forms.length` with `requestedForms`.
pub async fn handle_parallel_forms(
    State(state): State<AppState>,
    Json(request): Json<ParallelFormsRequest>,
) -> Result<Json<ParallelFormsResponse>, AppError> {
    validate_pool(&request.pool, state.config.max_pool_size)?;
    validate_constraints(&request.constraints)?;
    validate_count("targetSize", request.target_size)?;
    validate_count("numberOfForms", request.number_of_forms)?;

    let strategy = state.strategy.clone();
    let strategy_name = strategy.name().to_string();

    let forms = run_blocking(state.config.request_timeout(), move || {
        generate_parallel_forms_with(
            strategy.as_ref(),
            &request.pool,
            &request.constraints,
            request.target_size,
            request.number_of_forms,
        )
    })
    .await?;

    Ok(Json(ParallelFormsResponse {
        assembly_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        strategy: strategy_name,
        forms,
    }))
}

/// POST /api/v1/assembly/optimize-length
pub async fn handle_optimize_length(
    State(state): State<AppState>,
    Json(request): Json<OptimizeLengthRequest>,
) -> Result<Json<LengthRecommendation>, AppError> {
    validate_pool(&request.pool, state.config.max_pool_size)?;
    validate_constraints(&request.constraints)?;
    validate_count("maxLength", request.max_length.max(request.min_length))?;
    validate_reliability(request.target_reliability)?;

    let recommendation = run_blocking(state.config.request_timeout(), move || {
        optimize_test_length(
            &request.pool,
            &request.constraints,
            request.min_length,
            request.max_length,
            request.target_reliability,
        )
    })
    .await?;

    Ok(Json(recommendation))
}

/// POST /api/v1/assembly/content-balance
///
/// Reports shortfalls against the constraints; the selection is left untouched.
pub async fn handle_content_balance(
    State(state): State<AppState>,
    Json(request): Json<ContentBalanceRequest>,
) -> Result<Json<BalanceReport>, AppError> {
    validate_pool(&request.selection, state.config.max_pool_size)?;
    validate_constraints(&request.constraints)?;

    let report = run_blocking(state.config.request_timeout(), move || {
        check_content_balance(&request.selection, &request.constraints)
    })
    .await?;

    Ok(Json(report))
}

/// POST /api/v1/assembly/blueprint
///
/// Derives a constraint list and target size from a topic × cognitive-level matrix.
pub async fn handle_blueprint(
    Json(blueprint): Json<Blueprint>,
) -> Result<Json<BlueprintResponse>, AppError> {
    validate_blueprint(&blueprint)?;

    let constraints = constraints_from_blueprint(&blueprint);

    Ok(Json(BlueprintResponse {
        constraints,
        target_size: blueprint.total_items(),
    }))
}

/// Runs `work` on the blocking pool, giving up after `budget`.
/// A timed-out task is detached and still runs to completion.
async fn run_blocking<T, F>(budget: Duration, work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::time::timeout(budget, tokio::task::spawn_blocking(work)).await {
        Ok(joined) => joined.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in assembly: {e}"))
        }),
        Err(_) => {
            warn!(budget_secs = budget.as_secs_f64(), "Assembly exceeded request timeout");
            Err(AppError::Timeout(format!(
                "assembly did not finish within {:.1}s",
                budget.as_secs_f64()
            )))
        }
    }
}
