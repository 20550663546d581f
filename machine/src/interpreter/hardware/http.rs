use super::{Error, Hardware};
use serde::Deserialize;
use serde_json::{json, Value as Json};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct CarSettings {
    pub api_url: String,
    pub timeout: Duration,
    pub cm_per_unit: f64,
    /// Motor speed, 0-255.
    pub speed: u8,
}

impl Default for CarSettings {
    fn default() -> CarSettings {
        CarSettings {
            api_url: String::from("http://192.168.88.9"),
            timeout: Duration::from_secs(15),
            cm_per_unit: 10.0,
            speed: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CarResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<Json>,
    #[serde(default)]
    success_result: Option<Json>,
    #[serde(default)]
    error: String,
}

/// Drives the ESP32 car over its REST API.
#[derive(Debug, Clone)]
pub struct CarHardware {
    client: reqwest::Client,
    base_url: String,
    settings: CarSettings,
}

impl CarHardware {
    pub fn new(settings: CarSettings) -> Result<CarHardware, Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let base_url = settings.api_url.trim_end_matches('/').to_owned();
        info!(%base_url, timeout = ?settings.timeout, "car client ready");

        Ok(CarHardware { client, base_url, settings })
    }

    async fn post(&self, operation: &'static str, endpoint: &str, body: Json) -> Result<Option<Json>, Error> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, %body, "sending {}", operation);

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout { operation, timeout: self.settings.timeout }
            } else {
                Error::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                operation,
                reason: format!("HTTP {}: {}", status.as_u16(), text),
            });
        }

        let payload: CarResponse = response.json().await.map_err(|e| Error::InvalidResponse {
            operation,
            detail: e.to_string(),
        })?;
        debug!(success = payload.success, "{} answered", operation);

        if !payload.success {
            return Err(Error::Rejected { operation, reason: payload.error });
        }

        Ok(payload.result.or(payload.success_result))
    }
}

fn as_distance(operation: &'static str, result: Option<Json>) -> Result<f64, Error> {
    let invalid = |detail: String| Error::InvalidResponse { operation, detail };
    match result {
        Some(Json::Number(num)) => num.as_f64().ok_or_else(|| invalid(num.to_string())),
        Some(Json::String(text)) => text.trim().parse().map_err(|_| invalid(text)),
        other => Err(invalid(format!("{:?}", other))),
    }
}

fn as_flag(operation: &'static str, result: Option<Json>) -> Result<bool, Error> {
    match result {
        Some(Json::Bool(flag)) => Ok(flag),
        other => Err(Error::InvalidResponse { operation, detail: format!("{:?}", other) }),
    }
}

impl Hardware for CarHardware {
    async fn move_by(&mut self, units: f64) -> Result<(), Error> {
        let speed = if units < 0.0 { -i32::from(self.settings.speed) } else { i32::from(self.settings.speed) };
        let body = json!({
            "speed": speed,
            "distance": units.abs() * self.settings.cm_per_unit,
            "checkUltrasonic": true,
        });
        self.post("move", "/api/move", body).await.map(|_| ())
    }

    async fn turn_by(&mut self, degrees: f64) -> Result<(), Error> {
        let body = json!({
            "angle": degrees,
            "speed": self.settings.speed,
            "absolute": false,
        });
        self.post("rotate", "/api/rotate", body).await.map(|_| ())
    }

    async fn read_distance(&mut self) -> Result<f64, Error> {
        let result = self.post("read distance", "/api/sensor", json!({ "action": "distance" })).await?;
        as_distance("read distance", result)
    }

    async fn read_line_sensor(&mut self) -> Result<bool, Error> {
        let result = self.post("read line sensor", "/api/ir", json!({ "action": "black_obstacle" })).await?;
        as_flag("read line sensor", result)
    }

    async fn pen(&mut self, down: bool) -> Result<(), Error> {
        let action = if down { "down" } else { "up" };
        self.post("pen", "/api/pen", json!({ "action": action })).await.map(|_| ())
    }

    async fn alert(&mut self, on: bool) -> Result<(), Error> {
        let action = if on { "on" } else { "off" };
        self.post("buzzer", "/api/buzzer", json!({ "action": action })).await.map(|_| ())
    }
}
