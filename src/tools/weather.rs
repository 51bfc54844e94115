//! Current-weather lookup through the OpenWeather HTTP API.

use crate::config::WeatherSettings;
use crate::error::{Result, ToolError, ToolchatError};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Raw HTTP reply from the weather provider.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Transport used to reach the weather provider.
#[async_trait]
pub trait WeatherTransport: Send + Sync {
    /// Perform a GET request against a fully built URL.
    async fn get(&self, url: &Url) -> Result<HttpReply>;
}

/// reqwest-backed transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolchatError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WeatherTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpReply> {
        // The query string carries the API key; keep it out of error text.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        Ok(HttpReply { status, body })
    }
}

/// Parsed current-weather report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: i64,
    pub wind_speed_mps: f64,
}

impl WeatherReport {
    /// Render the fixed multi-line summary.
    pub fn render(&self, city: &str) -> String {
        format!(
            "{} current weather:\n\
             - Conditions: {}\n\
             - Temperature: {}°C (feels like {}°C)\n\
             - Humidity: {}%\n\
             - Wind speed: {} m/s",
            city,
            self.description,
            self.temperature_c,
            self.feels_like_c,
            self.humidity_pct,
            self.wind_speed_mps
        )
    }
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    weather: Vec<ProviderCondition>,
    main: ProviderMain,
    wind: ProviderWind,
}

#[derive(Debug, Deserialize)]
struct ProviderCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ProviderMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct ProviderWind {
    speed: f64,
}

impl TryFrom<ProviderResponse> for WeatherReport {
    type Error = ToolError;

    fn try_from(response: ProviderResponse) -> std::result::Result<Self, Self::Error> {
        let condition = response
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::WeatherQuery("response has no weather conditions".to_string()))?;

        Ok(Self {
            description: condition.description,
            temperature_c: response.main.temp,
            feels_like_c: response.main.feels_like,
            humidity_pct: response.main.humidity,
            wind_speed_mps: response.wind.speed,
        })
    }
}

/// Weather lookup tool.
pub struct WeatherClient {
    transport: Arc<dyn WeatherTransport>,
    base_url: String,
    units: String,
    api_key: Option<String>,
}

impl WeatherClient {
    /// Create a weather client from settings, using the reqwest transport.
    pub fn new(settings: &WeatherSettings) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(settings.timeout_secs))?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    /// Create a weather client with a custom transport.
    pub fn with_transport(settings: &WeatherSettings, transport: Arc<dyn WeatherTransport>) -> Self {
        Self {
            transport,
            base_url: settings.base_url.clone(),
            units: settings.units.clone(),
            api_key: settings
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        }
    }

    /// Whether a provider key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Look up the current weather for a city.
    #[instrument(skip(self))]
    pub async fn get_weather(&self, city: &str) -> std::result::Result<String, ToolError> {
        let api_key = self.api_key.as_deref().ok_or(ToolError::MissingWeatherKey)?;

        let city = city.trim();
        if city.is_empty() {
            return Err(ToolError::InvalidArguments("city must not be empty".to_string()));
        }

        let url = self.build_url(city, api_key)?;
        debug!("Requesting weather for {}", city);

        let reply = self
            .transport
            .get(&url)
            .await
            .map_err(|e| ToolError::WeatherQuery(e.to_string().replace(api_key, "***")))?;

        if reply.status != 200 {
            let message = serde_json::from_str::<serde_json::Value>(&reply.body)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string));

            debug!("Weather provider returned {}: {:?}", reply.status, message);

            return Err(match message.as_deref() {
                Some("city not found") => ToolError::CityNotFound(city.to_string()),
                Some(msg) => ToolError::WeatherProvider(msg.to_string()),
                None => ToolError::WeatherProvider("unknown error".to_string()),
            });
        }

        let response: ProviderResponse = serde_json::from_str(&reply.body)
            .map_err(|e| ToolError::WeatherQuery(e.to_string()))?;
        let report = WeatherReport::try_from(response)?;

        Ok(report.render(city))
    }

    fn build_url(&self, city: &str, api_key: &str) -> std::result::Result<Url, ToolError> {
        Url::parse_with_params(
            &self.base_url,
            &[("q", city), ("appid", api_key), ("units", self.units.as_str())],
        )
        .map_err(|e| ToolError::WeatherQuery(format!("invalid provider URL: {}", e)))
    }
}
