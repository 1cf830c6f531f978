//! Park data commands backed by a JSON feed.

use std::path::Path;
use std::sync::Arc;

use themeparks_cache::Cache;
use themeparks_parks::{FeedAdapter, Park, Settings};
use tracing::info;

use crate::error::CliResult;
use crate::output;

async fn open(feed: &Path, settings: Settings) -> CliResult<Park> {
    let cache = Cache::in_memory(settings.cache_config())?;
    let adapter = FeedAdapter::open(feed, settings.timezone()?).await?;
    let park = Park::new(Arc::new(adapter), &cache, settings)?;
    info!(park = %park.name(), feed = %feed.display(), "Loaded park feed");
    Ok(park)
}

/// Renders current wait times for the park in `feed`.
pub async fn wait_times(settings: &Settings, feed: &Path, json: bool) -> CliResult<String> {
    let park = open(feed, settings.clone()).await?;
    let rides = park.get_wait_times().await?;
    if json {
        return output::json(&rides);
    }
    Ok(format!(
        "{}\n\n{}",
        park.info().title(),
        output::wait_times_table(&rides)
    ))
}

/// Renders opening times for the park in `feed`, `days` days past today.
pub async fn opening_times(
    settings: &Settings,
    feed: &Path,
    days: Option<u32>,
    json: bool,
) -> CliResult<String> {
    let mut settings = settings.clone();
    if let Some(days) = days {
        settings = settings.with_schedule_days(days);
    }
    let park = open(feed, settings).await?;
    let schedule = park.get_opening_times().await?;
    if json {
        return output::json(&schedule);
    }
    Ok(format!(
        "{} ({})\n\n{}",
        park.info().title(),
        park.timezone(),
        output::opening_times_table(&schedule)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use chrono::Days;
    use themeparks_core::today_in;
    use themeparks_parks::ParkError;

    fn write_feed(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("park.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn wait_times_table() {
        let dir = tempfile::tempdir().unwrap();
        let feed = write_feed(
            dir.path(),
            r#"{
                "park": {"name": "Coastal", "displayName": "Coastal Park"},
                "rides": [
                    {"id": "1", "name": "Wave", "waitTime": 20},
                    {"id": "2", "name": "Anchor", "status": "Down"}
                ]
            }"#,
        );

        let out = wait_times(&Settings::default(), &feed, false).await.unwrap();
        assert!(out.starts_with("Coastal Park\n\n"));
        assert!(out.contains("Anchor  Down"));
        assert!(out.contains("Wave    Operating  20 min"));
    }

    #[tokio::test]
    async fn wait_times_json() {
        let dir = tempfile::tempdir().unwrap();
        let feed = write_feed(
            dir.path(),
            r#"{"park": {"name": "Coastal"}, "rides": [{"id": "1", "name": "Wave", "waitTime": 20}]}"#,
        );

        let out = wait_times(&Settings::default(), &feed, true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["id"], "Coastal_1");
        assert_eq!(value[0]["waitTime"], 20);
        assert_eq!(value[0]["active"], true);
    }

    #[tokio::test]
    async fn opening_times_honour_days() {
        let tz = chrono_tz::Tz::Europe__Paris;
        let today = today_in(&tz);
        let tomorrow = today + Days::new(1);
        let body = format!(
            r#"{{
                "park": {{"name": "Coastal", "timezone": "Europe/Paris"}},
                "schedule": [
                    {{"openingTime": "{today}T10:00", "closingTime": "{today}T18:00"}},
                    {{"openingTime": "{tomorrow}T10:00", "closingTime": "{tomorrow}T20:00"}}
                ]
            }}"#
        );
        let dir = tempfile::tempdir().unwrap();
        let feed = write_feed(dir.path(), &body);

        let out = opening_times(&Settings::default(), &feed, Some(3), true)
            .await
            .unwrap();
        let days: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0]["type"], "Operating");
        assert_eq!(days[1]["type"], "Operating");
        assert_eq!(days[2]["type"], "Closed");
    }

    #[tokio::test]
    async fn unsupported_operation_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let feed = write_feed(dir.path(), r#"{"park": {"name": "Coastal"}}"#);

        let err = wait_times(&Settings::default(), &feed, false)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Park(ParkError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn missing_feed_is_an_adapter_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = opening_times(
            &Settings::default(),
            &dir.path().join("missing.json"),
            None,
            false,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Adapter(_)));
    }
}
