//! Executor for `trends.refresh` jobs.

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use postpilot_db::models::job::Job;
use postpilot_db::models::trend::UpsertTrend;
use postpilot_db::repositories::TrendRepo;
use postpilot_events::{names, PlatformEvent};

use super::JobFailure;
use crate::state::AppState;

/// Outcome of one trend pull, shared by the job executor and the
/// scheduled collector.
pub struct TrendHarvest {
    pub source: &'static str,
    pub collected: usize,
    pub collected_on: NaiveDate,
}

/// Pull today's trending keywords and upsert them into the shared pool.
/// Re-running on the same day updates ranks in place via the
/// `(keyword, source, collected_on)` conflict target.
pub async fn pull_and_store(state: &AppState) -> Result<TrendHarvest, JobFailure> {
    let keywords = state.trend_source.trending_keywords().await.map_err(|e| {
        JobFailure::new("트렌드 수집에 실패했습니다")
            .with_details(json!({ "error": e.to_string() }))
    })?;

    if keywords.is_empty() {
        return Err(JobFailure::new("수집된 트렌드 키워드가 없습니다"));
    }

    let source = state.trend_source.source_name();
    let today = Utc::now().date_naive();
    let mut collected = 0usize;

    for keyword in &keywords {
        TrendRepo::upsert(
            &state.pool,
            &UpsertTrend {
                keyword: keyword.keyword.clone(),
                source: source.to_string(),
                category: keyword.category.clone(),
                rank: keyword.rank,
                collected_on: today,
            },
        )
        .await?;
        collected += 1;
    }

    tracing::info!(collected, source, "Trend pool refreshed");
    Ok(TrendHarvest {
        source,
        collected,
        collected_on: today,
    })
}

/// Run one admin-requested trend refresh.
pub async fn execute(state: &AppState, job: &Job) -> Result<Value, JobFailure> {
    let harvest = pull_and_store(state).await?;

    state.event_bus.publish(
        PlatformEvent::new(names::TRENDS_REFRESHED)
            .with_actor(job.submitted_by)
            .with_payload(json!({
                "submitted_by": job.submitted_by,
                "source": harvest.source,
                "collected": harvest.collected,
                "collected_on": harvest.collected_on,
            })),
    );

    Ok(json!({
        "source": harvest.source,
        "collected": harvest.collected,
        "collected_on": harvest.collected_on,
    }))
}
