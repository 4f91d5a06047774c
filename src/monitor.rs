use crate::advice;
use crate::api::TelemetrySource;
use crate::core::{
    CpuInfo, DashboardSummary, FanReading, FanStatus, GpuInfo, HardwareInventory, HardwareIssue,
    HourlyUsage, MemoryInfo, MetricsPage, MetricsSample, MetricsStatistics, StorageInfo,
    SystemReport, TrainingRecord, Trends, UsageStats,
};
use crate::engine;
use crate::fan;
use crate::util::error::{ApiError, PayloadError};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub type Result<T, E = PayloadError> = std::result::Result<T, E>;

// Fallbacks used when the backend cannot identify a device
const UNKNOWN: &str = "Unknown";
const INTEGRATED_GPU: &str = "Integrated Graphics";
const INTEGRATED_GPU_MEMORY_GB: f64 = 1.0;

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Deserialize a nested section, falling back to its default when it has the wrong shape
fn lenient<T: DeserializeOwned + Default>(value: &Value) -> T {
    T::deserialize(value).unwrap_or_default()
}

fn expect_object(value: &Value) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(PayloadError::UnexpectedShape {
            expected: "object",
            found: kind_of(value),
        })
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Split "1.20TB" into (1.2, "TB")
fn leading_number(s: &str) -> Option<(f64, &str)> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);

    let number = s[..end].parse::<f64>().ok().filter(|n| n.is_finite())?;
    Some((number, s[end..].trim()))
}

/// Read a plain numeric field such as `45.2` or `"45.2%"`.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => leading_number(s).map(|(n, _)| n),
        _ => None,
    }
}

/// Read a size such as `"16.00GB"`, `"1.20TB"` or `"8192MB"` as gigabytes.
///
/// Units use a factor of 1024. A bare number is taken to be gigabytes.
pub fn parse_size_gb(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => {
            let (number, unit) = leading_number(s)?;
            let scale = match unit.to_ascii_uppercase().as_str() {
                "" | "G" | "GB" | "GIB" => 1.0,
                "T" | "TB" | "TIB" => 1024.0,
                "P" | "PB" | "PIB" => 1024.0 * 1024.0,
                "M" | "MB" | "MIB" => 1.0 / 1024.0,
                "K" | "KB" | "KIB" => 1.0 / (1024.0 * 1024.0),
                "B" => 1.0 / (1024.0 * 1024.0 * 1024.0),
                _ => return None,
            };
            Some(number * scale)
        }
        _ => None,
    }
}

/// Read a fan speed such as `1200`, `"1200 RPM"` or `"1,200 RPM"`.
pub fn parse_rpm(value: &Value) -> Option<u32> {
    let rpm = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_number(&s.replace(',', ""))?.0,
        _ => return None,
    };

    if !rpm.is_finite() || rpm < 0.0 {
        return None;
    }

    // saturating cast
    Some(rpm.round() as u32)
}

fn parse_timestamp(value: &Value) -> Option<DateTime<chrono::FixedOffset>> {
    let raw = value.as_str()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts),
        Err(e) => {
            debug!("Ignoring unparseable timestamp '{raw}': {e}");
            None
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawMetrics {
    cpu_percent: Value,
    memory_percent: Value,
    disk_usage_percent: Value,
    cpu_temp: Value,
    is_anomaly: Value,
    anomaly_score: Value,
    timestamp: Value,
}

impl From<RawMetrics> for MetricsSample {
    fn from(raw: RawMetrics) -> Self {
        Self {
            cpu_percent: parse_number(&raw.cpu_percent),
            memory_percent: parse_number(&raw.memory_percent),
            disk_usage_percent: parse_number(&raw.disk_usage_percent),
            // the backend stores 0 when no sensor is present
            cpu_temp_celsius: parse_number(&raw.cpu_temp).filter(|t| *t > 0.0),
            is_anomaly: raw.is_anomaly.as_bool().unwrap_or(false),
            anomaly_score: parse_number(&raw.anomaly_score),
            timestamp: parse_timestamp(&raw.timestamp),
        }
    }
}

/// Normalize a `/metrics/latest/` payload.
pub fn parse_metrics(value: &Value) -> Result<MetricsSample> {
    expect_object(value)?;
    let raw = RawMetrics::deserialize(value)?;
    Ok(raw.into())
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawFan {
    name: Value,
    value: Value,
    speed: Value,
    status: Value,
    temperature: Value,
    hardware: Value,
}

impl From<RawFan> for FanReading {
    fn from(raw: RawFan) -> Self {
        let status = text(&raw.status).unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            name: text(&raw.name).unwrap_or_else(|| "Unknown Fan".to_string()),
            status: FanStatus::from_label(&status),
            // the numeric field wins over the formatted one
            speed_rpm: parse_rpm(&raw.value).or_else(|| parse_rpm(&raw.speed)),
            temperature_celsius: parse_number(&raw.temperature),
            hardware: text(&raw.hardware),
        }
    }
}

fn fans_from_array(items: &[Value]) -> Vec<FanReading> {
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| FanReading::from(lenient::<RawFan>(item)))
        .collect()
}

/// Normalize a `/fans/` payload: either a bare array or `{ "fans": [...] }`.
pub fn parse_fans(value: &Value) -> Result<Vec<FanReading>> {
    match value {
        Value::Array(items) => Ok(fans_from_array(items)),
        Value::Object(map) => match map.get("fans") {
            Some(Value::Array(items)) => Ok(fans_from_array(items)),
            Some(other) => Err(PayloadError::UnexpectedShape {
                expected: "array of fans",
                found: kind_of(other),
            }),
            None => Ok(Vec::new()),
        },
        other => Err(PayloadError::UnexpectedShape {
            expected: "array of fans",
            found: kind_of(other),
        }),
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawCpu {
    processor: Value,
    physical_cores: Value,
    total_cores: Value,
    min_frequency: Value,
    max_frequency: Value,
    current_frequency: Value,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSystemInfo {
    system: Value,
    cpu: Value,
    memory: Value,
    gpu: Value,
    disks: Value,
    fans: Value,
}

fn count(value: &Value) -> Option<u32> {
    parse_number(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u32)
}

fn first_object(value: &Value) -> Option<&Value> {
    value.as_array()?.iter().find(|v| v.is_object())
}

/// Normalize a `/system-info/` payload into the inventory the engines score against.
///
/// Only the first GPU and the first disk are considered. A system without a
/// detected GPU is treated as integrated graphics with 1 GB of shared memory.
pub fn parse_system_info(value: &Value) -> Result<HardwareInventory> {
    expect_object(value)?;
    let raw = RawSystemInfo::deserialize(value)?;
    let cpu: RawCpu = lenient(&raw.cpu);

    let model = text(&cpu.processor)
        .or_else(|| text(&raw.system["processor"]))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let gpu = match first_object(&raw.gpu) {
        Some(primary) => GpuInfo {
            model: text(&primary["name"]).unwrap_or_else(|| "Unknown GPU".to_string()),
            memory_gb: parse_size_gb(&primary["total_memory"])
                .filter(|gb| *gb > 0.0)
                .or(Some(INTEGRATED_GPU_MEMORY_GB)),
        },
        None => GpuInfo {
            model: INTEGRATED_GPU.to_string(),
            memory_gb: Some(INTEGRATED_GPU_MEMORY_GB),
        },
    };

    let storage = match first_object(&raw.disks) {
        Some(primary) => StorageInfo {
            total_gb: parse_size_gb(&primary["total_size"]),
            free_gb: parse_size_gb(&primary["free"]),
            kind: text(&primary["file_system_type"]).unwrap_or_else(|| "HDD".to_string()),
        },
        None => StorageInfo {
            total_gb: None,
            free_gb: None,
            kind: UNKNOWN.to_string(),
        },
    };

    let fans = if raw.fans.is_null() {
        Vec::new()
    } else {
        parse_fans(&raw.fans).unwrap_or_else(|e| {
            warn!("Ignoring malformed fan section in system info: {e}");
            Vec::new()
        })
    };

    Ok(HardwareInventory {
        cpu: CpuInfo {
            model,
            cores: count(&cpu.physical_cores),
            threads: count(&cpu.total_cores),
            base_clock: text(&cpu.min_frequency),
            boost_clock: text(&cpu.max_frequency),
        },
        memory: MemoryInfo {
            total_gb: parse_size_gb(&raw.memory["total"]),
            kind: "RAM".to_string(),
            speed: text(&cpu.current_frequency),
        },
        storage,
        gpu,
        fans,
    })
}

/// Normalize a single issue record.
pub fn parse_issue(value: &Value) -> Result<HardwareIssue> {
    expect_object(value)?;
    Ok(HardwareIssue::deserialize(value)?)
}

// List endpoints answer with a bare array, or with a page `{ count, results: [...] }`
fn list_items<'a>(value: &'a Value, expected: &'static str) -> Result<&'a [Value]> {
    let items = match value {
        Value::Object(map) => map.get("results").unwrap_or(&Value::Null),
        other => other,
    };

    match items {
        Value::Array(items) => Ok(items),
        other => Err(PayloadError::UnexpectedShape {
            expected,
            found: kind_of(other),
        }),
    }
}

/// Normalize an issues listing, skipping entries that do not carry an id.
pub fn parse_issues(value: &Value) -> Result<Vec<HardwareIssue>> {
    let items = list_items(value, "array of issues")?;

    Ok(items
        .iter()
        .filter_map(|item| match HardwareIssue::deserialize(item) {
            Ok(issue) => Some(issue),
            Err(e) => {
                warn!("Skipping malformed issue entry: {e}");
                None
            }
        })
        .collect())
}

fn series(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(parse_number).collect())
        .unwrap_or_default()
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawDashboard {
    current_state: Value,
    recent_anomalies: Value,
    unresolved_issues: Value,
    trends: Value,
    model_status: Value,
}

/// Normalize a `/dashboard/` summary.
pub fn parse_dashboard(value: &Value) -> Result<DashboardSummary> {
    expect_object(value)?;
    let raw = RawDashboard::deserialize(value)?;

    let current = if raw.current_state.is_object() {
        parse_metrics(&raw.current_state)?
    } else {
        MetricsSample::default()
    };

    let unresolved_issues = if raw.unresolved_issues.is_null() {
        Vec::new()
    } else {
        parse_issues(&raw.unresolved_issues)?
    };

    Ok(DashboardSummary {
        current,
        recent_anomaly_count: raw.recent_anomalies.as_array().map_or(0, Vec::len),
        unresolved_issues,
        trends: Trends {
            cpu: series(&raw.trends["cpu"]),
            memory: series(&raw.trends["memory"]),
            disk: series(&raw.trends["disk"]),
        },
        model_trained: raw.model_status["trained"].as_bool().unwrap_or(false),
        last_training: text(&raw.model_status["last_training"]),
    })
}

fn usage_stats(value: &Value) -> UsageStats {
    UsageStats {
        avg: parse_number(&value["avg"]),
        max: parse_number(&value["max"]),
        min: parse_number(&value["min"]),
    }
}

fn whole(value: &Value) -> Option<u64> {
    parse_number(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64)
}

fn hourly_usage(value: &Value) -> HourlyUsage {
    HourlyUsage {
        hour: text(&value["hour"]),
        avg_cpu: parse_number(&value["avg_cpu"]),
        avg_memory: parse_number(&value["avg_memory"]),
        avg_disk: parse_number(&value["avg_disk"]),
        anomaly_count: whole(&value["anomaly_count"]).unwrap_or(0),
    }
}

/// Normalize a `/metrics/statistics/` payload.
pub fn parse_statistics(value: &Value) -> Result<MetricsStatistics> {
    expect_object(value)?;
    let hourly = value["hourly_data"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter(|row| row.is_object())
                .map(hourly_usage)
                .collect()
        })
        .unwrap_or_default();

    Ok(MetricsStatistics {
        total_metrics: whole(&value["total_metrics"]).unwrap_or(0),
        anomalies: whole(&value["anomalies"]).unwrap_or(0),
        cpu: usage_stats(&value["cpu"]),
        memory: usage_stats(&value["memory"]),
        disk: usage_stats(&value["disk"]),
        hourly,
    })
}

/// Normalize one page of `/metrics/` history.
pub fn parse_metrics_page(value: &Value) -> Result<MetricsPage> {
    let items = list_items(value, "array of metrics")?;

    let mut samples = Vec::with_capacity(items.len());
    for item in items {
        match parse_metrics(item) {
            Ok(sample) => samples.push(sample),
            Err(e) => warn!("Skipping malformed metrics entry: {e}"),
        }
    }

    Ok(MetricsPage {
        count: whole(&value["count"]),
        samples,
    })
}

/// Normalize a training-history record returned by `/training/train/`.
pub fn parse_training_record(value: &Value) -> Result<TrainingRecord> {
    expect_object(value)?;
    Ok(TrainingRecord {
        trained_at: text(&value["trained_at"]),
        training_samples: whole(&value["training_samples"]),
        performance_score: parse_number(&value["performance_score"]),
        notes: text(&value["notes"]).unwrap_or_default(),
    })
}

/// Run every engine over one metrics sample and inventory.
pub fn build_system_report(
    metrics: MetricsSample,
    inventory: HardwareInventory,
    timestamp: DateTime<Utc>,
) -> SystemReport {
    let gaming = engine::classify_gaming_suitability(&metrics, &inventory);
    let development = engine::classify_development_suitability(&metrics, &inventory);
    let fan_anomaly = fan::detect_anomaly(&inventory.fans);
    let recommendations =
        advice::system_recommendations(&metrics, &inventory, &gaming, &development);

    SystemReport {
        metrics,
        inventory,
        gaming,
        development,
        fan_anomaly,
        recommendations,
        timestamp,
    }
}

/// Fetch metrics and hardware info and analyze them.
///
/// When the system-info payload carries no fans, the dedicated fan endpoint is
/// queried and merged in; a failure there only loses the fan section.
pub fn collect_system_report(source: &dyn TelemetrySource) -> Result<SystemReport, ApiError> {
    let metrics = source.latest_metrics()?;
    let mut inventory = source.system_info()?;

    if inventory.fans.is_empty() {
        match source.fans() {
            Ok(fans) => {
                debug!("Merged {} fan readings from the fan endpoint", fans.len());
                inventory.fans = fans;
            }
            Err(e) => warn!("Error fetching fan data, continuing without it: {e}"),
        }
    }

    Ok(build_system_report(metrics, inventory, Utc::now()))
}
