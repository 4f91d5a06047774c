use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Score at or above which a requirement tier counts as met.
pub const SUITABLE_SCORE: u8 = 80;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuInfo {
    pub model: String,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub base_clock: Option<String>,
    pub boost_clock: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total_gb: Option<f64>,
    pub kind: String, // e.g., "RAM", "DDR4"
    pub speed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageInfo {
    pub total_gb: Option<f64>,
    pub free_gb: Option<f64>,
    pub kind: String, // filesystem type as reported by the backend
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GpuInfo {
    pub model: String,
    pub memory_gb: Option<f64>,
}

/// Static hardware description, rebuilt on every system-info fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HardwareInventory {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub storage: StorageInfo,
    pub gpu: GpuInfo,
    pub fans: Vec<FanReading>,
}

/// One "current" telemetry sample from the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSample {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_usage_percent: Option<f64>,
    pub cpu_temp_celsius: Option<f64>,
    pub is_anomaly: bool,
    pub anomaly_score: Option<f64>,
    pub timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FanStatus {
    Active,
    Inactive,
    Other(String),
}

impl FanStatus {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Active" => Self::Active,
            "Inactive" => Self::Inactive,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Other(s) => s,
        }
    }
}

/// Fan sensor reading. No identity survives across polls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanReading {
    pub name: String,
    pub status: FanStatus,
    pub speed_rpm: Option<u32>,
    pub temperature_celsius: Option<f64>,
    pub hardware: Option<String>,
}

/// Minimum hardware and maximum load for one workload tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequirementTier {
    pub cpu_percent_max: f64,
    pub memory_min_gb: f64,
    pub disk_free_min_gb: f64,
    pub gpu_memory_min_gb: Option<f64>, // only gaming tiers care about VRAM
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GamingTier {
    Basic,
    Medium,
    High,
}

impl GamingTier {
    pub const ALL: [Self; 3] = [Self::Basic, Self::Medium, Self::High];

    pub const fn requirement(self) -> RequirementTier {
        match self {
            Self::Basic => RequirementTier {
                cpu_percent_max: 85.0,
                memory_min_gb: 4.0,
                disk_free_min_gb: 50.0,
                gpu_memory_min_gb: Some(2.0),
            },
            Self::Medium => RequirementTier {
                cpu_percent_max: 75.0,
                memory_min_gb: 8.0,
                disk_free_min_gb: 100.0,
                gpu_memory_min_gb: Some(4.0),
            },
            Self::High => RequirementTier {
                cpu_percent_max: 60.0,
                memory_min_gb: 16.0,
                disk_free_min_gb: 200.0,
                gpu_memory_min_gb: Some(6.0),
            },
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic Gaming",
            Self::Medium => "Mid-Range Gaming",
            Self::High => "High-End Gaming",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DevTask {
    WebDev,
    MobileDev,
    DataScience,
}

impl DevTask {
    pub const ALL: [Self; 3] = [Self::WebDev, Self::MobileDev, Self::DataScience];

    pub const fn requirement(self) -> RequirementTier {
        match self {
            Self::WebDev => RequirementTier {
                cpu_percent_max: 80.0,
                memory_min_gb: 8.0,
                disk_free_min_gb: 50.0,
                gpu_memory_min_gb: None,
            },
            Self::MobileDev => RequirementTier {
                cpu_percent_max: 70.0,
                memory_min_gb: 16.0,
                disk_free_min_gb: 80.0,
                gpu_memory_min_gb: None,
            },
            Self::DataScience => RequirementTier {
                cpu_percent_max: 60.0,
                memory_min_gb: 16.0,
                disk_free_min_gb: 100.0,
                gpu_memory_min_gb: None,
            },
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WebDev => "Web Development",
            Self::MobileDev => "Mobile Development",
            Self::DataScience => "Data Science/ML",
        }
    }
}

/// Badge/gauge colors handed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Gray => "gray",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierScores {
    pub basic: u8,
    pub medium: u8,
    pub high: u8,
}

impl TierScores {
    pub const fn get(&self, tier: GamingTier) -> u8 {
        match tier {
            GamingTier::Basic => self.basic,
            GamingTier::Medium => self.medium,
            GamingTier::High => self.high,
        }
    }
}

/// Gaming verdict; `best_tier` is `None` when no tier reaches the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GamingAnalysis {
    pub label: String,
    pub best_tier: Option<GamingTier>,
    pub score: u8,
    pub color: Color,
    pub tiers: TierScores,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevelopmentFit {
    pub task: DevTask,
    pub score: u8,
    pub suitable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyReport {
    pub has_anomaly: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HardwareIssue {
    pub id: u64,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_resolved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trends {
    pub cpu: Vec<f64>,
    pub memory: Vec<f64>,
    pub disk: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub current: MetricsSample,
    pub recent_anomaly_count: usize,
    pub unresolved_issues: Vec<HardwareIssue>,
    pub trends: Trends,
    pub model_trained: bool,
    pub last_training: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageStats {
    pub avg: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

/// Averages for one hour of stored metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyUsage {
    pub hour: Option<String>,
    pub avg_cpu: Option<f64>,
    pub avg_memory: Option<f64>,
    pub avg_disk: Option<f64>,
    pub anomaly_count: u64,
}

/// Aggregates over the backend's stored metrics for a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsStatistics {
    pub total_metrics: u64,
    pub anomalies: u64,
    pub cpu: UsageStats,
    pub memory: UsageStats,
    pub disk: UsageStats,
    pub hourly: Vec<HourlyUsage>, // oldest hour first
}

/// Number of samples the backend puts on one history page.
pub const HISTORY_PAGE_SIZE: u64 = 10;

/// One page of stored metrics samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsPage {
    pub count: Option<u64>, // absent when the backend does not paginate
    pub samples: Vec<MetricsSample>,
}

impl MetricsPage {
    pub fn total_pages(&self) -> u64 {
        self.count
            .map_or(1, |count| count.div_ceil(HISTORY_PAGE_SIZE).max(1))
    }
}

/// Outcome of an anomaly-model training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingRecord {
    pub trained_at: Option<String>,
    pub training_samples: Option<u64>,
    pub performance_score: Option<f64>,
    pub notes: String,
}

/// Everything one analysis cycle produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemReport {
    pub metrics: MetricsSample,
    pub inventory: HardwareInventory,
    pub gaming: GamingAnalysis,
    pub development: Vec<DevelopmentFit>,
    pub fan_anomaly: AnomalyReport,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<chrono::Utc>, // when the report was generated
}
