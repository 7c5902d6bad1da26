use crate::config::WillyWeatherConfig;
use crate::datasources::WeatherSource;
use crate::error::{Result, SwellCheckError};
use crate::models::{
    ForecastBundle, SeriesEntry, WindDirection, WindForecast, WindReading, WindSource,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

pub struct WillyWeatherClient {
    client: reqwest::Client,
    config: WillyWeatherConfig,
}

// WillyWeather API response structures
#[derive(Debug, Deserialize)]
struct WwForecastResponse {
    #[serde(default)]
    forecasts: WwForecasts,
}

#[derive(Debug, Default, Deserialize)]
struct WwForecasts {
    #[serde(default)]
    swell: Option<WwSeries<WwHeightEntry>>,
    #[serde(default)]
    tides: Option<WwSeries<WwHeightEntry>>,
    #[serde(default)]
    wind: Option<WwSeries<WwWindEntry>>,
}

#[derive(Debug, Deserialize)]
struct WwSeries<E> {
    #[serde(default = "Vec::new")]
    days: Vec<WwDay<E>>,
}

#[derive(Debug, Deserialize)]
struct WwDay<E> {
    #[serde(default = "Vec::new")]
    entries: Vec<E>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WwHeightEntry {
    date_time: Option<String>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WwWindEntry {
    date_time: Option<String>,
    speed: Option<f64>,
    direction: Option<f64>,
    direction_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WwObservationResponse {
    #[serde(default)]
    observational: Option<WwObservational>,
}

#[derive(Debug, Deserialize)]
struct WwObservational {
    #[serde(default)]
    observations: Option<WwObservations>,
}

#[derive(Debug, Deserialize)]
struct WwObservations {
    #[serde(default)]
    wind: Option<WwObservedWind>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WwObservedWind {
    speed: Option<f64>,
    gust_speed: Option<f64>,
    direction: Option<f64>,
    direction_text: Option<String>,
}

impl WillyWeatherClient {
    pub fn new(config: WillyWeatherConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    fn weather_url(&self, beach_id: u32) -> String {
        format!(
            "{}/{}/locations/{}/weather.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_key,
            beach_id
        )
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        beach_id: u32,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(self.weather_url(beach_id))
            .query(query)
            .send()
            .await
            .map_err(|e| SwellCheckError::DataSourceUnavailable(format!("WillyWeather: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SwellCheckError::DataSourceUnavailable(format!(
                "WillyWeather returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            SwellCheckError::DataSourceUnavailable(format!(
                "Failed to parse WillyWeather response: {}",
                e
            ))
        })
    }
}

impl WeatherSource for WillyWeatherClient {
    async fn get_forecast(
        &self,
        beach_id: u32,
        days: u32,
        start: NaiveDate,
    ) -> Result<ForecastBundle> {
        let query = [
            ("forecasts", "swell,tides,wind".to_string()),
            ("days", days.to_string()),
            ("startDate", start.format("%Y-%m-%d").to_string()),
        ];
        let response: WwForecastResponse = self.fetch_json(beach_id, &query).await?;
        let bundle = convert_forecast(response);
        tracing::debug!(
            "Beach {}: {} swell, {} tide, {} wind entries",
            beach_id,
            bundle.swell.len(),
            bundle.tide.len(),
            bundle.wind.len()
        );
        Ok(bundle)
    }

    async fn get_live_wind(&self, beach_id: u32) -> Result<Option<WindReading>> {
        let query = [("observational", "true".to_string())];
        let response: WwObservationResponse = self.fetch_json(beach_id, &query).await?;
        Ok(convert_observation(response))
    }
}

fn convert_forecast(response: WwForecastResponse) -> ForecastBundle {
    let forecasts = response.forecasts;
    ForecastBundle {
        swell: heights(forecasts.swell),
        tide: heights(forecasts.tides),
        wind: forecasts
            .wind
            .map(|series| {
                entries(series)
                    .filter_map(|e| {
                        let date_time = e.date_time?;
                        Some(SeriesEntry::new(
                            date_time,
                            WindForecast {
                                speed_kmh: e.speed,
                                direction: direction(e.direction_text, e.direction),
                            },
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn heights(series: Option<WwSeries<WwHeightEntry>>) -> Vec<SeriesEntry<f64>> {
    let Some(series) = series else {
        return Vec::new();
    };
    entries(series)
        .filter_map(|e| Some(SeriesEntry::new(e.date_time?, e.height?)))
        .collect()
}

fn entries<E>(series: WwSeries<E>) -> impl Iterator<Item = E> {
    series.days.into_iter().flat_map(|day| day.entries)
}

/// Compass label when present, otherwise the raw bearing.
fn direction(text: Option<String>, degrees: Option<f64>) -> Option<WindDirection> {
    match text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        Some(label) => Some(WindDirection::Compass(label)),
        None => degrees.map(WindDirection::Degrees),
    }
}

fn convert_observation(response: WwObservationResponse) -> Option<WindReading> {
    let wind = response.observational?.observations?.wind?;
    Some(WindReading {
        speed_kmh: wind.speed,
        direction: direction(wind.direction_text, wind.direction),
        gust_kmh: wind.gust_speed,
        source: WindSource::Live,
    })
}
