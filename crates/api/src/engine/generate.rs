//! Executor for `content.bulk_generate` jobs.
//!
//! Crosses every requested advertiser with every requested channel and
//! drafts one content row per pair. Pairs fail independently; the job
//! completes when at least one row was inserted.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use postpilot_core::template::{render, TemplateVars};
use postpilot_core::types::{first_of_month, DbId};
use postpilot_db::models::advertiser::Advertiser;
use postpilot_db::models::content::{
    BulkGenerationFailure, BulkGenerationRequest, BulkGenerationResult, Content, GeneratedContent,
};
use postpilot_db::models::job::Job;
use postpilot_db::models::status::TopicStatus;
use postpilot_db::models::template::Template;
use postpilot_db::models::topic::Topic;
use postpilot_db::repositories::{AdvertiserRepo, ContentRepo, JobRepo, TemplateRepo, TopicRepo};
use postpilot_events::{names, PlatformEvent};

use super::JobFailure;
use crate::state::AppState;

/// Token budget for one draft completion.
const MAX_DRAFT_TOKENS: u32 = 2048;

/// The JSON shape the LLM is asked to answer with.
#[derive(Debug, Deserialize)]
struct Draft {
    title: String,
    body: String,
    #[serde(default)]
    hashtags: Vec<String>,
}

/// Run one bulk generation job.
pub async fn execute(state: &AppState, job: &Job) -> Result<Value, JobFailure> {
    let request: BulkGenerationRequest =
        serde_json::from_value(job.parameters.clone()).map_err(|e| {
            JobFailure::new("잘못된 작업 파라미터입니다")
                .with_details(json!({ "error": e.to_string() }))
        })?;

    let month = first_of_month(request.month.unwrap_or_else(|| Utc::now().date_naive()));

    // An explicit template drives every pair; otherwise each channel
    // falls back to its default template.
    let pinned_template = match request.template_id {
        Some(id) => Some(
            TemplateRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| JobFailure::new(format!("템플릿을 찾을 수 없습니다 (id: {id})")))?,
        ),
        None => None,
    };

    let total = request.advertiser_ids.len() * request.channels.len();
    let mut result = BulkGenerationResult::default();
    let mut done = 0usize;

    'pairs: for &advertiser_id in &request.advertiser_ids {
        let Some(advertiser) = AdvertiserRepo::find_by_id(&state.pool, advertiser_id).await? else {
            for channel in &request.channels {
                result.failed.push(BulkGenerationFailure {
                    advertiser_id,
                    channel: channel.clone(),
                    error: "광고주를 찾을 수 없습니다".into(),
                });
                done += 1;
            }
            continue;
        };

        let topic = resolve_topic(state, &advertiser, month, request.topic_id).await?;

        for channel in &request.channels {
            let outcome = generate_one(
                state,
                job,
                &advertiser,
                topic.as_ref(),
                channel,
                pinned_template.as_ref(),
                request.prompt.as_deref(),
                month,
            )
            .await;
            match outcome {
                Ok(content) => {
                    tracing::debug!(
                        advertiser_id,
                        channel = %channel,
                        content_id = content.id,
                        "Draft created",
                    );
                    result.created += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        advertiser_id,
                        channel = %channel,
                        error = %error,
                        "Draft generation failed",
                    );
                    result.failed.push(BulkGenerationFailure {
                        advertiser_id,
                        channel: channel.clone(),
                        error,
                    });
                }
            }

            done += 1;
            let percent = ((done * 100) / total.max(1)) as i16;
            // The progress write doubles as the cancellation checkpoint:
            // zero rows touched means the job is no longer running.
            let live = JobRepo::update_progress(
                &state.pool,
                job.id,
                percent,
                Some(&format!("{done}/{total}")),
            )
            .await?;
            if !live {
                tracing::info!(job_id = job.id, done, total, "Job cancelled mid-run");
                break 'pairs;
            }
        }
    }

    if result.created == 0 {
        return Err(JobFailure::new("콘텐츠 생성에 모두 실패했습니다")
            .with_details(serde_json::to_value(&result).unwrap_or(Value::Null)));
    }

    state.event_bus.publish(
        PlatformEvent::new(names::CONTENT_BULK_GENERATED)
            .with_source("job", job.id)
            .with_actor(job.submitted_by)
            .with_payload(json!({
                "submitted_by": job.submitted_by,
                "created": result.created,
                "failed": result.failed.len(),
                "month": month,
            })),
    );

    serde_json::to_value(&result).map_err(|e| {
        JobFailure::new("결과 기록에 실패했습니다").with_details(json!({ "error": e.to_string() }))
    })
}

/// Pick the topic driving an advertiser's drafts.
///
/// A pinned topic must belong to the advertiser (the handler already
/// limited pinning to single-advertiser requests). Without a pin, the
/// month's first approved topic wins, then any topic, then none.
async fn resolve_topic(
    state: &AppState,
    advertiser: &Advertiser,
    month: NaiveDate,
    pinned: Option<DbId>,
) -> Result<Option<Topic>, JobFailure> {
    if let Some(topic_id) = pinned {
        let topic = TopicRepo::find_by_id(&state.pool, topic_id)
            .await?
            .filter(|t| t.advertiser_id == advertiser.id)
            .ok_or_else(|| JobFailure::new(format!("주제를 찾을 수 없습니다 (id: {topic_id})")))?;
        return Ok(Some(topic));
    }

    let topics = TopicRepo::list_by_advertiser(&state.pool, advertiser.id, Some(month)).await?;
    let picked = topics
        .iter()
        .find(|t| t.status_id == TopicStatus::Approved.id())
        .or_else(|| topics.first())
        .cloned();
    Ok(picked)
}

/// Draft one advertiser × channel pair. Errors are per-pair and reported
/// in the job result instead of failing the whole job.
#[allow(clippy::too_many_arguments)]
async fn generate_one(
    state: &AppState,
    job: &Job,
    advertiser: &Advertiser,
    topic: Option<&Topic>,
    channel: &str,
    pinned_template: Option<&Template>,
    steering: Option<&str>,
    month: NaiveDate,
) -> Result<Content, String> {
    let template = match pinned_template {
        Some(t) => t.clone(),
        None => TemplateRepo::find_default_for_channel(&state.pool, channel)
            .await
            .map_err(|e| format!("템플릿 조회에 실패했습니다: {e}"))?
            .ok_or_else(|| format!("{channel} 채널의 기본 템플릿이 없습니다"))?,
    };

    let vars = template_vars(advertiser, topic, channel, month);
    let mut prompt = render(&template.prompt, &vars);
    if let Some(extra) = steering {
        if !extra.trim().is_empty() {
            prompt.push_str("\n\n추가 지시사항: ");
            prompt.push_str(extra.trim());
        }
    }

    let draft: Draft = state
        .llm
        .ask_json(&prompt, template.system_prompt.as_deref(), Some(MAX_DRAFT_TOKENS))
        .await
        .map_err(|e| format!("생성 요청에 실패했습니다: {e}"))?;

    if draft.title.trim().is_empty() || draft.body.trim().is_empty() {
        return Err("생성 결과가 비어 있습니다".into());
    }

    ContentRepo::create_generated(
        &state.pool,
        &GeneratedContent {
            advertiser_id: advertiser.id,
            topic_id: topic.map(|t| t.id),
            channel: channel.to_string(),
            title: draft.title.trim().to_string(),
            body: draft.body,
            hashtags: draft.hashtags,
            created_by: job.submitted_by,
            model: state.llm.model().to_string(),
            generation_job_id: job.id,
        },
    )
    .await
    .map_err(|e| format!("저장에 실패했습니다: {e}"))
}

/// Substitution map for `{{placeholder}}` slots. Absent fields insert
/// nothing, leaving the slot visible in the rendered prompt.
fn template_vars(
    advertiser: &Advertiser,
    topic: Option<&Topic>,
    channel: &str,
    month: NaiveDate,
) -> TemplateVars {
    let mut vars = TemplateVars::new();
    vars.insert("advertiser_name", advertiser.name.clone());
    if let Some(category) = &advertiser.business_category {
        vars.insert("business_category", category.clone());
    }
    if let Some(description) = &advertiser.description {
        vars.insert("advertiser_description", description.clone());
    }
    vars.insert("channel", channel.to_string());
    vars.insert("month", month.format("%Y-%m").to_string());

    if let Some(topic) = topic {
        vars.insert("topic_title", topic.title.clone());
        if let Some(description) = &topic.description {
            vars.insert("topic_description", description.clone());
        }
        let keywords = topic
            .keywords
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        if !keywords.is_empty() {
            vars.insert("topic_keywords", keywords);
        }
    }

    vars
}
