//! Executor for `advertiser.sync` jobs.

use futures::future::join_all;
use serde_json::{json, Map, Value};

use postpilot_core::channels::Channel;
use postpilot_core::merge::merge_profile;
use postpilot_db::models::job::Job;
use postpilot_db::repositories::AdvertiserRepo;
use postpilot_events::{names, PlatformEvent};

use super::JobFailure;
use crate::state::AppState;

/// Run one sync job: scrape every registered channel in parallel and fold
/// the fragments into the advertiser's profile blob.
///
/// Partial success still completes the sync (the profile keeps whatever
/// the failed channels had before); only a full wipeout fails it.
pub async fn execute(state: &AppState, job: &Job) -> Result<Value, JobFailure> {
    let advertiser_id = job
        .parameters
        .get("advertiser_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            JobFailure::new("잘못된 작업 파라미터입니다")
                .with_details(json!({ "parameters": job.parameters }))
        })?;

    let advertiser = AdvertiserRepo::find_by_id(&state.pool, advertiser_id)
        .await?
        .ok_or_else(|| {
            JobFailure::new(format!("광고주를 찾을 수 없습니다 (id: {advertiser_id})"))
        })?;

    if !AdvertiserRepo::begin_sync(&state.pool, advertiser.id).await? {
        return Err(JobFailure::new("이미 동기화가 진행 중입니다"));
    }

    let targets = sync_targets(&advertiser.channels);
    if targets.is_empty() {
        let message = "등록된 채널이 없습니다";
        AdvertiserRepo::fail_sync(&state.pool, advertiser.id, message).await?;
        return Err(JobFailure::new(message));
    }

    let finished = join_all(targets.iter().map(|(channel, handle)| async move {
        (*channel, state.scraper.scrape(*channel, handle).await)
    }))
    .await;

    let mut profile = advertiser.profile.clone();
    if !profile.is_object() {
        profile = json!({});
    }
    let mut report = Map::new();
    let mut synced = 0usize;
    let mut errors: Vec<String> = Vec::new();

    for (channel, result) in finished {
        match result {
            Ok(fragment) => {
                merge_profile(&mut profile, &json!({ channel.as_str(): fragment }));
                report.insert(channel.as_str().to_string(), json!("ok"));
                synced += 1;
            }
            Err(e) => {
                tracing::warn!(
                    advertiser_id,
                    channel = channel.as_str(),
                    error = %e,
                    "Channel scrape failed",
                );
                report.insert(channel.as_str().to_string(), json!(e.to_string()));
                errors.push(format!("{}: {e}", channel.as_str()));
            }
        }
    }
    let failed = targets.len() - synced;

    if synced == 0 {
        AdvertiserRepo::fail_sync(&state.pool, advertiser.id, &errors.join("; ")).await?;
        state.event_bus.publish(
            PlatformEvent::new(names::ADVERTISER_SYNC_FAILED)
                .with_source("advertiser", advertiser.id)
                .with_actor(job.submitted_by)
                .with_payload(json!({
                    "advertiser_name": advertiser.name,
                    "owner_id": advertiser.owner_id,
                    "channels": Value::Object(report.clone()),
                })),
        );
        return Err(
            JobFailure::new("모든 채널 수집에 실패했습니다")
                .with_details(json!({ "channels": Value::Object(report) })),
        );
    }

    AdvertiserRepo::complete_sync(&state.pool, advertiser.id, &profile).await?;
    state.event_bus.publish(
        PlatformEvent::new(names::ADVERTISER_SYNCED)
            .with_source("advertiser", advertiser.id)
            .with_actor(job.submitted_by)
            .with_payload(json!({
                "advertiser_name": advertiser.name,
                "owner_id": advertiser.owner_id,
                "synced": synced,
                "failed": failed,
            })),
    );

    Ok(json!({
        "advertiser_id": advertiser.id,
        "synced": synced,
        "failed": failed,
        "channels": Value::Object(report),
    }))
}

/// Parse `(channel, handle)` pairs out of the channels JSONB. Unknown
/// names were rejected at registration; stragglers are skipped.
fn sync_targets(channels: &Value) -> Vec<(Channel, String)> {
    channels
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(name, handle)| {
                    let channel = Channel::parse(name)?;
                    let handle = handle.as_str()?.trim();
                    (!handle.is_empty()).then(|| (channel, handle.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_skip_unknown_channels_and_blank_handles() {
        let channels = json!({
            "instagram": "daily.cafe",
            "tiktok": "nope",
            "blog": "   ",
            "youtube": "https://youtube.com/@daily",
        });
        let mut got = sync_targets(&channels);
        got.sort_by_key(|(c, _)| c.as_str());
        assert_eq!(
            got,
            vec![
                (Channel::Instagram, "daily.cafe".to_string()),
                (Channel::Youtube, "https://youtube.com/@daily".to_string()),
            ]
        );
    }

    #[test]
    fn non_object_channels_give_no_targets() {
        assert!(sync_targets(&json!(null)).is_empty());
        assert!(sync_targets(&json!(["instagram"])).is_empty());
    }
}
