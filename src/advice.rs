// Display heuristics and textual advice derived from an analysis
use crate::core::{
    Color, DevelopmentFit, GamingAnalysis, HardwareInventory, MetricsSample, SUITABLE_SCORE,
};

const USAGE_CRITICAL_PERCENT: f64 = 80.0;
const USAGE_WARNING_PERCENT: f64 = 60.0;
const LOW_STORAGE_GB: f64 = 50.0;
const FAIR_SCORE: u8 = 60;

/// Gauge color for a usage percentage. Missing usage reads as idle.
pub fn usage_color(percent: Option<f64>) -> Color {
    match percent.filter(|p| p.is_finite()) {
        Some(p) if p > USAGE_CRITICAL_PERCENT => Color::Red,
        Some(p) if p > USAGE_WARNING_PERCENT => Color::Orange,
        _ => Color::Green,
    }
}

pub const fn development_color(score: u8) -> Color {
    if score >= SUITABLE_SCORE {
        Color::Green
    } else if score >= FAIR_SCORE {
        Color::Orange
    } else {
        Color::Red
    }
}

pub const fn tier_color(score: u8) -> Color {
    if score >= SUITABLE_SCORE {
        Color::Green
    } else {
        Color::Orange
    }
}

fn exceeds(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v.is_finite() && v > limit)
}

/// Ordered upgrade and maintenance advice for the whole system.
pub fn system_recommendations(
    metrics: &MetricsSample,
    inventory: &HardwareInventory,
    gaming: &GamingAnalysis,
    development: &[DevelopmentFit],
) -> Vec<String> {
    let mut advice: Vec<&str> = Vec::new();

    if exceeds(metrics.cpu_percent, USAGE_CRITICAL_PERCENT) {
        advice.push(
            "Your CPU usage is high. Consider closing unused applications or upgrading your CPU.",
        );
    }

    if exceeds(metrics.memory_percent, USAGE_CRITICAL_PERCENT) {
        advice.push("Your memory usage is high. Adding more RAM would improve system performance.");
    }

    if inventory
        .storage
        .free_gb
        .is_some_and(|free| free < LOW_STORAGE_GB)
    {
        advice.push("Your storage space is low. Free up disk space or add additional storage.");
    }

    if gaming.score < FAIR_SCORE {
        advice.push(
            "Your system will struggle with modern games. Consider a significant hardware upgrade.",
        );
    } else if gaming.score < SUITABLE_SCORE {
        advice.push(
            "For better gaming performance, consider upgrading your GPU or adding more RAM.",
        );
    }

    if development.iter().any(|fit| !fit.suitable) {
        advice.push(
            "For better development performance, consider upgrading to at least 16GB RAM and an SSD with ample free space.",
        );
    }

    advice.push("Regular system maintenance can help keep your hardware running smoothly.");
    advice.push("Keep your drivers updated for optimal performance and compatibility.");

    advice.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DevTask, StorageInfo, TierScores};

    fn gaming(score: u8) -> GamingAnalysis {
        GamingAnalysis {
            label: "Basic Gaming".to_string(),
            best_tier: None,
            score,
            color: Color::Yellow,
            tiers: TierScores {
                basic: score,
                medium: score,
                high: score,
            },
        }
    }

    #[test]
    fn usage_thresholds_are_exclusive() {
        assert_eq!(usage_color(Some(80.0)), Color::Orange);
        assert_eq!(usage_color(Some(80.1)), Color::Red);
        assert_eq!(usage_color(Some(60.0)), Color::Green);
        assert_eq!(usage_color(None), Color::Green);
        assert_eq!(usage_color(Some(f64::NAN)), Color::Green);
    }

    #[test]
    fn score_colors() {
        assert_eq!(development_color(80), Color::Green);
        assert_eq!(development_color(60), Color::Orange);
        assert_eq!(development_color(59), Color::Red);
        assert_eq!(tier_color(79), Color::Orange);
        assert_eq!(tier_color(100), Color::Green);
    }

    #[test]
    fn healthy_system_gets_only_general_advice() {
        let advice = system_recommendations(
            &MetricsSample {
                cpu_percent: Some(20.0),
                memory_percent: Some(40.0),
                ..MetricsSample::default()
            },
            &HardwareInventory {
                storage: StorageInfo {
                    free_gb: Some(400.0),
                    ..StorageInfo::default()
                },
                ..HardwareInventory::default()
            },
            &gaming(100),
            &[DevelopmentFit {
                task: DevTask::WebDev,
                score: 100,
                suitable: true,
            }],
        );
        assert_eq!(advice.len(), 2);
        assert!(advice[0].starts_with("Regular system maintenance"));
    }

    #[test]
    fn strained_system_gets_advice_in_order() {
        let advice = system_recommendations(
            &MetricsSample {
                cpu_percent: Some(95.0),
                memory_percent: Some(85.0),
                ..MetricsSample::default()
            },
            &HardwareInventory {
                storage: StorageInfo {
                    free_gb: Some(20.0),
                    ..StorageInfo::default()
                },
                ..HardwareInventory::default()
            },
            &gaming(70),
            &[DevelopmentFit {
                task: DevTask::DataScience,
                score: 40,
                suitable: false,
            }],
        );
        // a 60..80 gaming score picks the milder of the two gaming lines
        assert_eq!(advice.len(), 7);
        assert!(advice[0].starts_with("Your CPU usage is high"));
        assert!(advice[1].starts_with("Your memory usage is high"));
        assert!(advice[2].starts_with("Your storage space is low"));
        assert!(advice[3].starts_with("For better gaming performance"));
        assert!(advice[4].starts_with("For better development performance"));
        assert!(advice[5].starts_with("Regular system maintenance"));
        assert!(advice[6].starts_with("Keep your drivers updated"));
    }

    #[test]
    fn weak_gaming_score_suggests_major_upgrade() {
        let advice = system_recommendations(
            &MetricsSample::default(),
            &HardwareInventory::default(),
            &gaming(0),
            &[],
        );
        assert!(advice[0].starts_with("Your system will struggle"));
    }
}
