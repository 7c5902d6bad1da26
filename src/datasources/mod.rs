pub mod resend;
pub mod supabase;
pub mod willyweather;

pub use resend::ResendClient;
pub use supabase::SupabaseClient;
pub use willyweather::WillyWeatherClient;

use crate::error::Result;
use crate::models::{ForecastBundle, UserPreference, WindReading};
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Source of subscriber preferences.
#[allow(async_fn_in_trait)]
pub trait UserStore {
    async fn list_active_users(&self) -> Result<Vec<UserPreference>>;

    /// Record that `user_id` was alerted at `at`.
    async fn mark_alerted(&self, user_id: &str, at: DateTime<FixedOffset>) -> Result<()>;
}

/// Forecast series and live observations for a beach.
#[allow(async_fn_in_trait)]
pub trait WeatherSource {
    async fn get_forecast(&self, beach_id: u32, days: u32, start: NaiveDate)
        -> Result<ForecastBundle>;

    /// Latest observed wind, `None` when the station reports nothing.
    async fn get_live_wind(&self, beach_id: u32) -> Result<Option<WindReading>>;
}

/// Delivery channel for alerts.
#[allow(async_fn_in_trait)]
pub trait NotificationSink {
    /// True when the message was accepted for delivery.
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool;
}
