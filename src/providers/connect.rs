// ABOUTME: Authenticated Garmin Connect API client used by every data tool
// ABOUTME: Thin typed/JSON GET layer over connectapi.garmin.com endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Account Data Provider
//!
//! [`ConnectClient`] is the opaque client handle the session store holds once
//! authentication completes. It issues bearer-authenticated GETs against the
//! Connect API (the endpoints the python-garminconnect library documents).
//! Each call either returns structured data or a [`ProviderError`] local to
//! that call; provider failures never touch the auth state.

use crate::auth::tokens::TokenBundle;
use crate::errors::{ProviderError, ProviderResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

const API_BASE: &str = "https://connectapi.garmin.com";

/// Activity list entry, the subset the activity tools format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Numeric activity identifier.
    pub activity_id: u64,
    /// Name the athlete gave the activity.
    pub activity_name: Option<String>,
    /// Local start time, `YYYY-MM-DD HH:MM:SS`.
    pub start_time_local: Option<String>,
    /// Activity type descriptor.
    pub activity_type: Option<ActivityType>,
    /// Distance in meters.
    pub distance: Option<f64>,
    /// Duration in seconds.
    pub duration: Option<f64>,
}

/// Activity type descriptor nested in activity responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    /// Machine-readable type key, e.g. `trail_running`.
    pub type_key: Option<String>,
}

/// Authenticated Garmin Connect API client.
pub struct ConnectClient {
    http: Client,
    api_base: String,
    access_token: String,
    // socialProfile is fetched once and cached; several endpoints key on the
    // display name or profile PK it carries.
    profile: OnceCell<Value>,
}

impl ConnectClient {
    /// Build a client from a freshly obtained token bundle.
    pub fn new(bundle: &TokenBundle) -> ProviderResult<Self> {
        Self::with_base(bundle, API_BASE)
    }

    /// Build a client against a custom API base (tests).
    pub fn with_base(bundle: &TokenBundle, api_base: &str) -> ProviderResult<Self> {
        let http = Client::builder()
            .user_agent("com.garmin.android.apps.connectmobile")
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_owned(),
            access_token: bundle.oauth2.access_token.clone(),
            profile: OnceCell::new(),
        })
    }

    /// GET `endpoint` and decode into `T`.
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> ProviderResult<T> {
        let url = format!("{}/{}", self.api_base, endpoint.trim_start_matches('/'));
        debug!(%url, "Garmin Connect request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::AuthExpired),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound {
                resource: endpoint.to_owned(),
            }),
            _ => {
                let response = response.error_for_status()?;
                response
                    .json()
                    .await
                    .map_err(|e| ProviderError::Decode(e.to_string()))
            }
        }
    }

    /// GET `endpoint` as untyped JSON.
    pub async fn get_json(&self, endpoint: &str) -> ProviderResult<Value> {
        self.get(endpoint).await
    }

    async fn profile(&self) -> ProviderResult<&Value> {
        self.profile
            .get_or_try_init(|| self.get_json("userprofile-service/socialProfile"))
            .await
    }

    async fn display_name(&self) -> ProviderResult<String> {
        let profile = self.profile().await?;
        profile
            .get("displayName")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::Decode("socialProfile has no displayName".into()))
    }

    async fn profile_pk(&self) -> ProviderResult<i64> {
        let profile = self.profile().await?;
        profile
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| ProviderError::Decode("socialProfile has no id".into()))
    }

    /// Recent activities, newest first.
    pub async fn get_activities(
        &self,
        start: usize,
        limit: usize,
    ) -> ProviderResult<Vec<ActivitySummary>> {
        self.get(&format!(
            "activitylist-service/activities/search/activities?start={start}&limit={limit}"
        ))
        .await
    }

    /// Full detail for one activity.
    pub async fn get_activity(&self, activity_id: u64) -> ProviderResult<Value> {
        self.get_json(&format!("activity-service/activity/{activity_id}"))
            .await
    }

    /// Lap/split data for one activity.
    pub async fn get_activity_splits(&self, activity_id: u64) -> ProviderResult<Value> {
        self.get_json(&format!("activity-service/activity/{activity_id}/splits"))
            .await
    }

    /// Daily heart rate series for `date` (`YYYY-MM-DD`).
    pub async fn get_heart_rate(&self, date: &str) -> ProviderResult<Value> {
        let display_name = self.display_name().await?;
        self.get_json(&format!(
            "wellness-service/wellness/dailyHeartRate/{display_name}?date={date}"
        ))
        .await
    }

    /// Daily step chart for `date`.
    pub async fn get_steps(&self, date: &str) -> ProviderResult<Value> {
        let display_name = self.display_name().await?;
        self.get_json(&format!(
            "wellness-service/wellness/dailySummaryChart/{display_name}?date={date}"
        ))
        .await
    }

    /// Sleep data for the night ending on `date`.
    pub async fn get_sleep(&self, date: &str) -> ProviderResult<Value> {
        let display_name = self.display_name().await?;
        self.get_json(&format!(
            "wellness-service/wellness/dailySleepData/{display_name}?date={date}&nonSleepBucketsEnabled=true"
        ))
        .await
    }

    /// Daily stress detail for `date`.
    pub async fn get_stress(&self, date: &str) -> ProviderResult<Value> {
        self.get_json(&format!("wellness-service/wellness/dailyStress/{date}"))
            .await
    }

    /// Body Battery report covering `start..=end`.
    pub async fn get_body_battery(&self, start: &str, end: &str) -> ProviderResult<Value> {
        self.get_json(&format!(
            "wellness-service/wellness/bodyBattery/reports/daily?startDate={start}&endDate={end}"
        ))
        .await
    }

    /// The athlete's social profile.
    pub async fn get_user_profile(&self) -> ProviderResult<Value> {
        self.profile().await.cloned()
    }

    /// All registered devices.
    pub async fn get_devices(&self) -> ProviderResult<Value> {
        self.get_json("device-service/deviceregistration/devices")
            .await
    }

    /// The most recently used device.
    pub async fn get_device_last_used(&self) -> ProviderResult<Value> {
        self.get_json("device-service/deviceservice/mylastused")
            .await
    }

    /// All gear registered to the account.
    pub async fn get_gear(&self) -> ProviderResult<Value> {
        let pk = self.profile_pk().await?;
        self.get_json(&format!("gear-service/gear/filterGear?userProfilePk={pk}"))
            .await
    }

    /// Accumulated stats for one piece of gear.
    pub async fn get_gear_stats(&self, gear_uuid: &str) -> ProviderResult<Value> {
        self.get_json(&format!("gear-service/gear/stats/{gear_uuid}"))
            .await
    }

    /// Body composition over `start..=end`.
    pub async fn get_body_composition(&self, start: &str, end: &str) -> ProviderResult<Value> {
        self.get_json(&format!(
            "weight-service/weight/dateRange?startDate={start}&endDate={end}"
        ))
        .await
    }

    /// Weigh-ins over `start..=end`.
    pub async fn get_weigh_ins(&self, start: &str, end: &str) -> ProviderResult<Value> {
        self.get_json(&format!(
            "weight-service/weight/range/{start}/{end}?includeAll=true"
        ))
        .await
    }

    /// Aggregated training status for `date`.
    pub async fn get_training_status(&self, date: &str) -> ProviderResult<Value> {
        self.get_json(&format!(
            "metrics-service/metrics/trainingstatus/aggregated?date={date}"
        ))
        .await
    }

    /// Training readiness for `date`.
    pub async fn get_training_readiness(&self, date: &str) -> ProviderResult<Value> {
        self.get_json(&format!("metrics-service/metrics/trainingreadiness/{date}"))
            .await
    }

    /// Saved workouts.
    pub async fn get_workouts(&self, start: usize, limit: usize) -> ProviderResult<Value> {
        self.get_json(&format!("workout-service/workouts?start={start}&limit={limit}"))
            .await
    }

    /// Historical ad-hoc challenges.
    pub async fn get_adhoc_challenges(&self, start: usize, limit: usize) -> ProviderResult<Value> {
        self.get_json(&format!(
            "adhocchallenge-service/adHocChallenge/historical?start={start}&limit={limit}"
        ))
        .await
    }

    /// Completed badge challenges.
    pub async fn get_badge_challenges(&self, start: usize, limit: usize) -> ProviderResult<Value> {
        self.get_json(&format!(
            "badgechallenge-service/badgeChallenge/completed?start={start}&limit={limit}"
        ))
        .await
    }

    /// Badge challenges open for joining.
    pub async fn get_available_badge_challenges(
        &self,
        start: usize,
        limit: usize,
    ) -> ProviderResult<Value> {
        self.get_json(&format!(
            "badgechallenge-service/badgeChallenge/available?start={start}&limit={limit}"
        ))
        .await
    }

    /// Menstrual cycle data for `date`.
    pub async fn get_menstrual_data(&self, date: &str) -> ProviderResult<Value> {
        self.get_json(&format!(
            "periodichealth-service/menstrualcycle/dayview/{date}"
        ))
        .await
    }

    /// Menstrual cycle calendar over `start..=end`.
    pub async fn get_menstrual_calendar(&self, start: &str, end: &str) -> ProviderResult<Value> {
        self.get_json(&format!(
            "periodichealth-service/menstrualcycle/calendar/{start}/{end}"
        ))
        .await
    }

    /// Pregnancy snapshot, when tracking is active.
    pub async fn get_pregnancy_summary(&self) -> ProviderResult<Value> {
        self.get_json("periodichealth-service/menstrualcycle/pregnancysnapshot")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tokens::{OAuth1Token, OAuth2Token};

    fn bundle() -> TokenBundle {
        TokenBundle {
            oauth1: OAuth1Token {
                oauth_token: "ot".into(),
                oauth_token_secret: "ots".into(),
                mfa_token: None,
                domain: "garmin.com".into(),
            },
            oauth2: OAuth2Token {
                access_token: "at".into(),
                refresh_token: "rt".into(),
                token_type: "Bearer".into(),
                expires_at: i64::MAX,
                refresh_token_expires_at: None,
                scope: None,
            },
        }
    }

    #[test]
    fn activity_summary_deserializes_from_connect_shape() {
        let raw = serde_json::json!({
            "activityId": 123_456,
            "activityName": "Morning Run",
            "startTimeLocal": "2025-06-01 07:12:00",
            "activityType": {"typeKey": "running"},
            "distance": 10_000.0,
            "duration": 3000.0
        });
        let summary: ActivitySummary = serde_json::from_value(raw).unwrap();
        assert_eq!(summary.activity_id, 123_456);
        assert_eq!(summary.activity_name.as_deref(), Some("Morning Run"));
        assert_eq!(
            summary.activity_type.and_then(|t| t.type_key).as_deref(),
            Some("running")
        );
    }

    #[test]
    fn client_builds_without_network() {
        let client = ConnectClient::new(&bundle()).unwrap();
        assert!(client.profile.get().is_none());
    }
}
