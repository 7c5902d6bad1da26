use crate::config::SupabaseConfig;
use crate::datasources::UserStore;
use crate::error::{Result, SwellCheckError};
use crate::models::UserPreference;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::time::Duration;

/// Subscriber store backed by the Supabase REST interface.
pub struct SupabaseClient {
    client: reqwest::Client,
    config: SupabaseConfig,
}

#[derive(Debug, Serialize)]
struct LastAlertUpdate {
    last_alert_at: String,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    fn users_url(&self) -> String {
        format!("{}/rest/v1/users", self.config.url.trim_end_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    async fn fetch_users(&self, filter: (&str, &str)) -> Result<Vec<UserPreference>> {
        let request = self
            .client
            .get(self.users_url())
            .query(&[filter, ("select", "*")]);

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| SwellCheckError::DataSourceUnavailable(format!("Supabase: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SwellCheckError::DataSourceUnavailable(format!(
                "Supabase returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SwellCheckError::DataSourceUnavailable(format!("Supabase: {}", e)))?;
        parse_users(&body)
    }

    /// Look up one user by e-mail address, active or not.
    pub async fn find_user_by_email(&self, email: &str) -> Result<UserPreference> {
        let filter = format!("eq.{}", email);
        self.fetch_users(("email", &filter))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SwellCheckError::NotFound(format!("User {}", email)))
    }
}

impl UserStore for SupabaseClient {
    async fn list_active_users(&self) -> Result<Vec<UserPreference>> {
        self.fetch_users(("is_active", "eq.true")).await
    }

    async fn mark_alerted(&self, user_id: &str, at: DateTime<FixedOffset>) -> Result<()> {
        let filter = format!("eq.{}", user_id);
        let request = self
            .client
            .patch(self.users_url())
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&LastAlertUpdate {
                last_alert_at: at.to_rfc3339(),
            });

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| SwellCheckError::DataSourceUnavailable(format!("Supabase: {}", e)))?;

        if !response.status().is_success() {
            return Err(SwellCheckError::DataSourceUnavailable(format!(
                "Supabase update returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Parse a user listing row by row; a row that does not map to a user is
/// logged and skipped.
fn parse_users(body: &str) -> Result<Vec<UserPreference>> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let total = rows.len();

    let users: Vec<UserPreference> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let id = row.get("id").cloned().unwrap_or_default();
            match serde_json::from_value(row) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Skipping user row {} (id {}): {}", idx, id, e);
                    None
                }
            }
        })
        .collect();

    if users.len() < total {
        tracing::warn!("Skipped {} of {} user row(s)", total - users.len(), total);
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> SupabaseConfig {
        SupabaseConfig {
            url: "https://example.supabase.co/".to_string(),
            key: "service-key".to_string(),
        }
    }

    #[test]
    fn users_url_trims_slash() {
        let client = SupabaseClient::new(sample_config(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.users_url(), "https://example.supabase.co/rest/v1/users");
    }

    #[test]
    fn debug_hides_key() {
        let client = SupabaseClient::new(sample_config(), Duration::from_secs(5)).unwrap();
        assert!(!format!("{:?}", client).contains("service-key"));
    }

    #[test]
    fn rows_with_nulls_take_defaults() {
        let body = r#"[
            {"id": "6f1c", "email": "kai@example.com", "name": "Kai", "beach_id": 18159,
             "beach_name": "Noosa Main Beach", "min_swell": 0.8, "max_swell": null,
             "is_active": true, "last_alert_at": "2026-02-28T06:00:05+10:00"},
            {"id": 42, "email": "sam@example.com", "beach_id": null}
        ]"#;
        let users = parse_users(body).unwrap();
        assert_eq!(users.len(), 2);

        assert_eq!(users[0].min_swell, 0.8);
        assert_eq!(users[0].max_swell, 3.0);
        assert!(users[0].last_alert_at.is_some());

        assert_eq!(users[1].id, "42");
        assert_eq!(users[1].beach_id, None);
        assert_eq!(users[1].name, "Surfer");
        assert_eq!(users[1].onshore_max_wind, 5.0);
    }

    #[test]
    fn bad_row_skipped_others_kept() {
        let body = r#"[
            {"id": "good", "email": "kai@example.com", "beach_id": 18159},
            {"id": "bad", "email": "sam@example.com", "beach_id": 18159, "start_hour": -1},
            {"id": null, "email": "ash@example.com"},
            {"id": "late", "email": "lee@example.com", "last_alert_at": "2026-03-01T06:30:00.123456"}
        ]"#;
        let users = parse_users(body).unwrap();
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["good", "late"]);
        assert!(users[1].last_alert_at.is_some());
    }

    #[test]
    fn malformed_body_is_error() {
        assert!(parse_users(r#"{"message": "JWT expired"}"#).is_err());
    }

    #[test]
    fn update_body_shape() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T06:00:05+10:00").unwrap();
        let body = serde_json::to_value(LastAlertUpdate {
            last_alert_at: at.to_rfc3339(),
        })
        .unwrap();
        assert_eq!(body["last_alert_at"], "2026-03-01T06:00:05+10:00");
    }
}
