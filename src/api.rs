use crate::config::ApiConfig;
use crate::core::{
    DashboardSummary, FanReading, HardwareInventory, HardwareIssue, MetricsPage, MetricsSample,
    MetricsStatistics, TrainingRecord,
};
use crate::monitor;
use crate::util::error::{ApiError, PayloadError};
use chrono::{SecondsFormat, TimeDelta, Utc};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::time::Duration;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Default number of samples the backend trains its anomaly model on.
pub const DEFAULT_TRAINING_SAMPLES: u32 = 300;

/// Read side of the monitoring backend, as consumed by analysis and the daemon.
pub trait TelemetrySource {
    fn latest_metrics(&self) -> Result<MetricsSample>;
    fn system_info(&self) -> Result<HardwareInventory>;
    fn fans(&self) -> Result<Vec<FanReading>>;
    fn dashboard(&self) -> Result<DashboardSummary>;
    fn issues(&self, only_unresolved: bool) -> Result<Vec<HardwareIssue>>;
}

/// Blocking HTTP client for the hardware-monitor REST API.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .user_agent(concat!("rigscope/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, url: &str, request: RequestBuilder) -> Result<Value> {
        let response = self.authorize(request).send()?;
        let status = response.status();
        let body = response.text()?;
        debug!("{url} -> {status} ({} bytes)", body.len());

        if !status.is_success() {
            let detail = error_detail(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Payload {
            url: url.to_string(),
            source: PayloadError::Json(e),
        })
    }

    fn get(&self, path: &str) -> Result<(String, Value)> {
        let url = self.url(path);
        let value = self.send(&url, self.http.get(&url))?;
        Ok((url, value))
    }

    fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<(String, Value)> {
        let url = self.url(path);
        let value = self.send(&url, self.http.get(&url).query(query))?;
        Ok((url, value))
    }

    fn post(&self, path: &str, body: Option<Value>) -> Result<(String, Value)> {
        let url = self.url(path);
        let request = match body {
            Some(body) => self.http.post(&url).json(&body),
            None => self.http.post(&url),
        };
        let value = self.send(&url, request)?;
        Ok((url, value))
    }

    /// Ask the backend to take a fresh metrics sample right now.
    pub fn collect_metrics(&self) -> Result<MetricsSample> {
        let (url, value) = self.post("/metrics/collect/", None)?;
        decode(url, &value, monitor::parse_metrics)
    }

    pub fn resolve_issue(&self, id: u64) -> Result<HardwareIssue> {
        let (url, value) = self.post(&format!("/issues/{id}/resolve/"), None)?;
        decode(url, &value, monitor::parse_issue)
    }

    /// Retrain the backend's anomaly model on the most recent `samples` metrics.
    pub fn train_model(&self, samples: u32) -> Result<TrainingRecord> {
        let (url, value) = self.post("/training/train/", Some(json!({ "samples": samples })))?;
        decode(url, &value, monitor::parse_training_record)
    }

    pub fn statistics(&self, days: u32) -> Result<MetricsStatistics> {
        let (url, value) = self.get(&format!("/metrics/statistics/?days={days}"))?;
        decode(url, &value, monitor::parse_statistics)
    }

    /// One page (1-based) of the samples stored over the last `days` days.
    pub fn metrics_history(&self, days: u32, page: u32) -> Result<MetricsPage> {
        let start_date = Utc::now() - TimeDelta::days(i64::from(days));
        let query = [
            ("page", page.max(1).to_string()),
            (
                "start_date",
                start_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];
        let (url, value) = self.get_with_query("/metrics/", &query)?;
        decode(url, &value, monitor::parse_metrics_page)
    }
}

// DRF puts a human-readable reason in `detail`; some views use `error` instead
fn error_detail(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    ["detail", "error"]
        .iter()
        .find_map(|key| value[*key].as_str().map(str::to_string))
}

fn decode<T>(
    url: String,
    value: &Value,
    parse: impl FnOnce(&Value) -> Result<T, PayloadError>,
) -> Result<T> {
    parse(value).map_err(|source| ApiError::Payload { url, source })
}

impl TelemetrySource for ApiClient {
    fn latest_metrics(&self) -> Result<MetricsSample> {
        let (url, value) = self.get("/metrics/latest/")?;
        decode(url, &value, monitor::parse_metrics)
    }

    fn system_info(&self) -> Result<HardwareInventory> {
        let (url, value) = self.get("/system-info/")?;
        decode(url, &value, monitor::parse_system_info)
    }

    fn fans(&self) -> Result<Vec<FanReading>> {
        let (url, value) = self.get("/fans/")?;
        decode(url, &value, monitor::parse_fans)
    }

    fn dashboard(&self) -> Result<DashboardSummary> {
        let (url, value) = self.get("/dashboard/")?;
        decode(url, &value, monitor::parse_dashboard)
    }

    fn issues(&self, only_unresolved: bool) -> Result<Vec<HardwareIssue>> {
        let path = if only_unresolved {
            "/issues/unresolved/"
        } else {
            "/issues/"
        };
        let (url, value) = self.get(path)?;
        decode(url, &value, monitor::parse_issues)
    }
}
