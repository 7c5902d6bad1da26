use crate::config::AlarmConfig;
use crate::datasources::WeatherSource;
use crate::error::Result;
use crate::logic::ledger::AlertLedger;
use crate::logic::registry::BeachRegistry;
use crate::logic::{wind, windows};
use crate::models::{Decision, ForecastWindow, SkipReason, UserPreference, WindReading};
use chrono::{DateTime, Duration, FixedOffset, Timelike};

/// Tunables for a single user check.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Days of forecast to request
    pub forecast_days: u32,
    /// How far ahead forecast windows are considered at all
    pub horizon: Duration,
    /// Windows further out than this wait for a later poll
    pub lookahead: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            forecast_days: 1,
            horizon: Duration::hours(24),
            lookahead: Duration::minutes(120),
        }
    }
}

impl From<&AlarmConfig> for EngineSettings {
    fn from(config: &AlarmConfig) -> Self {
        Self {
            forecast_days: config.forecast_days,
            horizon: Duration::hours(config.horizon_hours as i64),
            lookahead: Duration::minutes(config.lookahead_minutes as i64),
        }
    }
}

/// Turns one user's preferences plus weather data into a [`Decision`].
pub struct DecisionOrchestrator<W> {
    weather: W,
    registry: BeachRegistry,
    ledger: AlertLedger,
    settings: EngineSettings,
}

impl<W: WeatherSource> DecisionOrchestrator<W> {
    pub fn new(weather: W, registry: BeachRegistry, settings: EngineSettings) -> Self {
        Self {
            weather,
            registry,
            ledger: AlertLedger::new(),
            settings,
        }
    }

    #[cfg(test)]
    pub fn weather(&self) -> &W {
        &self.weather
    }

    #[cfg(test)]
    pub fn ledger(&self) -> &AlertLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut AlertLedger {
        &mut self.ledger
    }

    /// Evaluate `user` at local time `now`.
    ///
    /// Precondition failures return `Skipped` before any data source is
    /// touched. A forecast fetch failure is returned as `Err` for this user
    /// only; live wind failures fall back to the forecast.
    pub async fn decide(
        &self,
        user: &UserPreference,
        now: DateTime<FixedOffset>,
    ) -> Result<Decision> {
        let Some(beach_id) = user.beach_id else {
            return Ok(Decision::Skipped(SkipReason::NoBeach));
        };

        let today = now.date_naive();
        if self.ledger.contains(&user.id, today) {
            return Ok(Decision::Skipped(SkipReason::AlreadyAlerted));
        }

        if !user.in_alert_hours(now.hour()) {
            return Ok(Decision::Skipped(SkipReason::OutsideAlertHours));
        }

        tracing::info!("Checking {} ({}) - {}", user.name, user.email, user.beach_name);

        let bundle = self
            .weather
            .get_forecast(beach_id, self.settings.forecast_days, today)
            .await?;

        let candidates = windows::find_windows(&bundle, user, now, self.settings.horizon);
        if candidates.is_empty() {
            tracing::info!("No matching swell/tide windows");
            return Ok(Decision::NoWindow);
        }
        tracing::info!("Found {} potential window(s)", candidates.len());

        // Fetched on first use and reused for every window in this check
        let mut live: Option<Option<WindReading>> = None;
        let mut rationales = Vec::new();

        for window in candidates {
            let until = window.time - now;
            if until > self.settings.lookahead {
                tracing::debug!(
                    "Window at {} is {} min away, waiting",
                    window.time.format("%H:%M"),
                    until.num_minutes()
                );
                continue;
            }

            let observed = match &live {
                Some(reading) => reading.clone(),
                None => match self.fetch_live_wind(beach_id).await {
                    Ok(reading) => {
                        live = Some(reading.clone());
                        reading
                    }
                    // Not cached, so the next window asks the station again
                    Err(()) => None,
                },
            };
            let wind = observed.unwrap_or_else(|| forecast_fallback(&window));
            tracing::info!("Wind ({}): {}", wind.source, wind);

            let verdict = wind::evaluate(&wind, user, beach_id, &self.registry);
            if verdict.accepted {
                tracing::info!("Conditions met: {}", verdict.rationale);
                return Ok(Decision::Sent {
                    window,
                    wind,
                    rationale: verdict.rationale,
                });
            }

            tracing::info!("Wind not ideal: {}", verdict.rationale);
            rationales.push(verdict.rationale);
        }

        Ok(Decision::WindRejected(rationales))
    }

    /// Complete live reading, or `Ok(None)` when the station answered
    /// without speed or direction. `Err` when the request itself failed.
    async fn fetch_live_wind(&self, beach_id: u32) -> std::result::Result<Option<WindReading>, ()> {
        match self.weather.get_live_wind(beach_id).await {
            Ok(Some(reading)) if reading.is_complete() => Ok(Some(reading)),
            Ok(Some(reading)) => {
                tracing::warn!("Incomplete wind observation ({}), using forecast", reading);
                Ok(None)
            }
            Ok(None) => {
                tracing::debug!("No wind observation for beach {}", beach_id);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Could not get wind observations: {}", e);
                Err(())
            }
        }
    }
}

fn forecast_fallback(window: &ForecastWindow) -> WindReading {
    window
        .wind_forecast
        .as_ref()
        .map(WindReading::from_forecast)
        .unwrap_or_else(WindReading::unavailable)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SwellCheckError;
    use crate::models::{
        ForecastBundle, SeriesEntry, WindDirection, WindForecast, WindSource,
    };
    use chrono::{NaiveDate, TimeZone};
    use std::cell::{Cell, RefCell};

    pub(crate) const NOOSA: u32 = 18159;

    #[derive(Default)]
    pub(crate) struct FakeWeather {
        pub bundle: RefCell<Option<ForecastBundle>>,
        pub live: RefCell<Option<WindReading>>,
        pub live_fails: Cell<bool>,
        pub forecast_calls: Cell<usize>,
        pub live_calls: Cell<usize>,
    }

    impl WeatherSource for FakeWeather {
        async fn get_forecast(
            &self,
            _beach_id: u32,
            _days: u32,
            _start: NaiveDate,
        ) -> Result<ForecastBundle> {
            self.forecast_calls.set(self.forecast_calls.get() + 1);
            self.bundle
                .borrow()
                .clone()
                .ok_or_else(|| SwellCheckError::DataSourceUnavailable("forecast down".into()))
        }

        async fn get_live_wind(&self, _beach_id: u32) -> Result<Option<WindReading>> {
            self.live_calls.set(self.live_calls.get() + 1);
            if self.live_fails.get() {
                return Err(SwellCheckError::DataSourceUnavailable("station down".into()));
            }
            Ok(self.live.borrow().clone())
        }
    }

    pub(crate) fn aest(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(10 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 1, h, m, 0)
            .unwrap()
    }

    pub(crate) fn key(h: u32, m: u32) -> String {
        format!("2026-03-01 {:02}:{:02}:00", h, m)
    }

    pub(crate) fn forecast_wind(speed: f64, dir: &str) -> WindForecast {
        WindForecast {
            speed_kmh: Some(speed),
            direction: Some(WindDirection::Compass(dir.into())),
        }
    }

    pub(crate) fn user() -> UserPreference {
        let mut user = UserPreference::new("u1", "kai@example.com", NOOSA)
            .with_swell(1.0, 3.0)
            .with_tide(0.0, 2.0)
            .with_wind_limits(25.0, 10.0, 5.0)
            .with_hours(5, 18);
        user.name = "Kai".into();
        user.beach_name = "Noosa Main Beach".into();
        user
    }

    /// Good swell and tide at 07:00 and 08:00 with the given forecast winds.
    pub(crate) fn bundle(w7: Option<WindForecast>, w8: Option<WindForecast>) -> ForecastBundle {
        let mut wind = Vec::new();
        if let Some(w) = w7 {
            wind.push(SeriesEntry::new(key(7, 0), w));
        }
        if let Some(w) = w8 {
            wind.push(SeriesEntry::new(key(8, 0), w));
        }
        ForecastBundle {
            swell: vec![
                SeriesEntry::new(key(7, 0), 1.5),
                SeriesEntry::new(key(8, 0), 1.8),
            ],
            tide: vec![
                SeriesEntry::new(key(7, 0), 1.0),
                SeriesEntry::new(key(8, 0), 1.1),
            ],
            wind,
        }
    }

    fn orchestrator(weather: FakeWeather) -> DecisionOrchestrator<FakeWeather> {
        DecisionOrchestrator::new(
            weather,
            BeachRegistry::builtin().unwrap(),
            EngineSettings::default(),
        )
    }

    #[tokio::test]
    async fn already_alerted_touches_nothing() {
        let mut engine = orchestrator(FakeWeather::default());
        engine.ledger_mut().mark("u1", aest(6, 0).date_naive());

        let decision = engine.decide(&user(), aest(6, 0)).await.unwrap();
        assert_eq!(decision, Decision::Skipped(SkipReason::AlreadyAlerted));
        assert_eq!(engine.weather.forecast_calls.get(), 0);
        assert_eq!(engine.weather.live_calls.get(), 0);
    }

    #[tokio::test]
    async fn no_beach_skips() {
        let engine = orchestrator(FakeWeather::default());
        let mut u = user();
        u.beach_id = None;

        let decision = engine.decide(&u, aest(6, 0)).await.unwrap();
        assert_eq!(decision, Decision::Skipped(SkipReason::NoBeach));
        assert_eq!(engine.weather.forecast_calls.get(), 0);
    }

    #[tokio::test]
    async fn outside_hours_skips() {
        let engine = orchestrator(FakeWeather::default());

        let decision = engine.decide(&user(), aest(4, 30)).await.unwrap();
        assert_eq!(decision, Decision::Skipped(SkipReason::OutsideAlertHours));
        let decision = engine.decide(&user(), aest(18, 0)).await.unwrap();
        assert_eq!(decision, Decision::Skipped(SkipReason::OutsideAlertHours));
        assert_eq!(engine.weather.forecast_calls.get(), 0);
    }

    #[tokio::test]
    async fn forecast_failure_is_error() {
        let engine = orchestrator(FakeWeather::default());
        assert!(engine.decide(&user(), aest(6, 0)).await.is_err());
    }

    #[tokio::test]
    async fn no_window() {
        let weather = FakeWeather::default();
        let mut flat = bundle(None, None);
        for entry in &mut flat.swell {
            entry.value = 0.3;
        }
        *weather.bundle.borrow_mut() = Some(flat);
        let engine = orchestrator(weather);

        let decision = engine.decide(&user(), aest(6, 0)).await.unwrap();
        assert_eq!(decision, Decision::NoWindow);
        assert_eq!(engine.weather.live_calls.get(), 0);
    }

    #[tokio::test]
    async fn live_wind_accepted() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(Some(forecast_wind(30.0, "N")), None));
        *weather.live.borrow_mut() = Some(WindReading::live(
            20.0,
            WindDirection::Compass("S".into()),
            Some(28.0),
        ));
        let engine = orchestrator(weather);

        match engine.decide(&user(), aest(6, 0)).await.unwrap() {
            Decision::Sent {
                window,
                wind,
                rationale,
            } => {
                assert_eq!(window.time, aest(7, 0));
                assert_eq!(wind.source, WindSource::Live);
                assert_eq!(rationale, "Offshore (ideal): 20 km/h S (max: 25)");
            }
            other => panic!("expected Sent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn station_failure_falls_back_to_forecast() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(Some(forecast_wind(8.0, "SSW")), None));
        weather.live_fails.set(true);
        let engine = orchestrator(weather);

        match engine.decide(&user(), aest(6, 0)).await.unwrap() {
            Decision::Sent { wind, .. } => assert_eq!(wind.source, WindSource::Forecast),
            other => panic!("expected Sent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn incomplete_observation_falls_back() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(Some(forecast_wind(3.0, "N")), None));
        *weather.live.borrow_mut() = Some(WindReading {
            speed_kmh: None,
            direction: Some(WindDirection::Compass("S".into())),
            gust_kmh: None,
            source: WindSource::Live,
        });
        let engine = orchestrator(weather);

        match engine.decide(&user(), aest(6, 0)).await.unwrap() {
            Decision::Sent { wind, rationale, .. } => {
                assert_eq!(wind.source, WindSource::Forecast);
                assert_eq!(rationale, "Onshore (avoid): 3 km/h N (max: 5)");
            }
            other => panic!("expected Sent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn no_wind_anywhere_rejects() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(None, None));
        let engine = orchestrator(weather);

        match engine.decide(&user(), aest(6, 30)).await.unwrap() {
            Decision::WindRejected(reasons) => {
                assert_eq!(reasons.len(), 2);
                assert!(reasons.iter().all(|r| r == "Unknown wind direction: N/A"));
            }
            other => panic!("expected WindRejected, got {:?}", other),
        }
        // One observation fetch serves both windows
        assert_eq!(engine.weather.live_calls.get(), 1);
    }

    #[tokio::test]
    async fn failed_observation_retried_for_next_window() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(None, None));
        weather.live_fails.set(true);
        let engine = orchestrator(weather);

        match engine.decide(&user(), aest(6, 30)).await.unwrap() {
            Decision::WindRejected(reasons) => assert_eq!(reasons.len(), 2),
            other => panic!("expected WindRejected, got {:?}", other),
        }
        assert_eq!(engine.weather.live_calls.get(), 2);
    }

    #[tokio::test]
    async fn later_window_can_win() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(
            Some(forecast_wind(12.0, "N")),
            Some(forecast_wind(10.0, "S")),
        ));
        let engine = orchestrator(weather);

        match engine.decide(&user(), aest(6, 30)).await.unwrap() {
            Decision::Sent { window, .. } => assert_eq!(window.time, aest(8, 0)),
            other => panic!("expected Sent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn far_windows_wait() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(Some(forecast_wind(1.0, "S")), None));
        let engine = orchestrator(weather);

        // 07:00 is 121 minutes out
        let decision = engine
            .decide(&user().with_hours(4, 18), aest(4, 59))
            .await
            .unwrap();
        assert_eq!(decision, Decision::WindRejected(vec![]));
        assert_eq!(engine.weather.live_calls.get(), 0);
    }

    #[tokio::test]
    async fn lookahead_boundary_is_inclusive() {
        let weather = FakeWeather::default();
        *weather.bundle.borrow_mut() = Some(bundle(Some(forecast_wind(1.0, "S")), None));
        let engine = orchestrator(weather);

        let decision = engine.decide(&user(), aest(5, 0)).await.unwrap();
        assert!(decision.is_sent());
    }
}
