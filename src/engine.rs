use crate::core::{
    Color, DevTask, DevelopmentFit, GamingAnalysis, GamingTier, HardwareInventory, MetricsSample,
    RequirementTier, SUITABLE_SCORE, TierScores,
};
use log::debug;

/// Relative weight of each sub-score in a tier score.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Weights {
    cpu: f64,
    memory: f64,
    disk: f64,
    gpu: f64,
}

const GAMING_WEIGHTS: Weights = Weights {
    cpu: 0.3,
    memory: 0.3,
    disk: 0.2,
    gpu: 0.2,
};

const DEVELOPMENT_WEIGHTS: Weights = Weights {
    cpu: 0.4,
    memory: 0.4,
    disk: 0.2,
    gpu: 0.0,
};

// Each point of CPU usage above the tier ceiling costs this many points
const CPU_OVERLOAD_PENALTY: f64 = 5.0;

const NOT_SUITABLE_FOR_GAMING: &str = "Not suitable for gaming";

/// Lower current usage is better. Missing usage scores 0.
fn cpu_sub_score(cpu_percent: Option<f64>, max_percent: f64) -> f64 {
    match cpu_percent.filter(|v| v.is_finite()) {
        Some(usage) if usage <= max_percent => 100.0,
        Some(usage) => 100.0 - (usage - max_percent) * CPU_OVERLOAD_PENALTY,
        None => 0.0,
    }
}

/// 100 when `have` meets `need`, otherwise the fraction of `need` that is present.
fn ratio_sub_score(have: Option<f64>, need: f64) -> f64 {
    let Some(have) = have.filter(|v| v.is_finite()) else {
        return 0.0;
    };

    if !need.is_finite() || need <= 0.0 || have >= need {
        100.0
    } else {
        have / need * 100.0
    }
}

/// Score how well the current system fits one requirement tier.
///
/// Tiers with a GPU minimum use the gaming weighting; tiers without one use the
/// development weighting, which drops the GPU term entirely. The result is
/// always an integer in `0..=100`.
pub fn compute_tier_score(
    metrics: &MetricsSample,
    inventory: &HardwareInventory,
    requirement: &RequirementTier,
) -> u8 {
    let cpu = cpu_sub_score(metrics.cpu_percent, requirement.cpu_percent_max);
    let memory = ratio_sub_score(inventory.memory.total_gb, requirement.memory_min_gb);
    let disk = ratio_sub_score(inventory.storage.free_gb, requirement.disk_free_min_gb);

    let (weights, gpu) = match requirement.gpu_memory_min_gb {
        Some(gpu_min) => (
            GAMING_WEIGHTS,
            ratio_sub_score(inventory.gpu.memory_gb, gpu_min),
        ),
        None => (DEVELOPMENT_WEIGHTS, 0.0),
    };

    let weighted =
        cpu * weights.cpu + memory * weights.memory + disk * weights.disk + gpu * weights.gpu;

    // cpu_percent_max is a constant, but a NaN here must never reach the cast
    if weighted.is_nan() {
        return 0;
    }

    weighted.clamp(0.0, 100.0).round() as u8
}

/// Pick the highest gaming tier whose score reaches the suitability threshold.
pub fn classify_gaming_suitability(
    metrics: &MetricsSample,
    inventory: &HardwareInventory,
) -> GamingAnalysis {
    let score_of = |tier: GamingTier| compute_tier_score(metrics, inventory, &tier.requirement());

    let tiers = TierScores {
        basic: score_of(GamingTier::Basic),
        medium: score_of(GamingTier::Medium),
        high: score_of(GamingTier::High),
    };

    let best_tier = GamingTier::ALL
        .iter()
        .rev()
        .copied()
        .find(|&tier| tiers.get(tier) >= SUITABLE_SCORE);

    debug!(
        "Gaming tier scores: basic={}, medium={}, high={}, best={best_tier:?}",
        tiers.basic, tiers.medium, tiers.high
    );

    match best_tier {
        Some(tier) => GamingAnalysis {
            label: tier.label().to_string(),
            best_tier: Some(tier),
            score: tiers.get(tier),
            color: match tier {
                GamingTier::High => Color::Green,
                GamingTier::Medium => Color::Blue,
                GamingTier::Basic => Color::Yellow,
            },
            tiers,
        },
        None => GamingAnalysis {
            label: NOT_SUITABLE_FOR_GAMING.to_string(),
            best_tier: None,
            score: 0,
            color: Color::Red,
            tiers,
        },
    }
}

/// Score each development workload, in declaration order.
pub fn classify_development_suitability(
    metrics: &MetricsSample,
    inventory: &HardwareInventory,
) -> Vec<DevelopmentFit> {
    DevTask::ALL
        .iter()
        .map(|&task| {
            let score = compute_tier_score(metrics, inventory, &task.requirement());
            DevelopmentFit {
                task,
                score,
                suitable: score >= SUITABLE_SCORE,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GpuInfo, MemoryInfo, StorageInfo};

    fn metrics(cpu: Option<f64>) -> MetricsSample {
        MetricsSample {
            cpu_percent: cpu,
            ..MetricsSample::default()
        }
    }

    fn inventory(
        memory_gb: Option<f64>,
        free_gb: Option<f64>,
        vram_gb: Option<f64>,
    ) -> HardwareInventory {
        HardwareInventory {
            memory: MemoryInfo {
                total_gb: memory_gb,
                ..MemoryInfo::default()
            },
            storage: StorageInfo {
                free_gb,
                ..StorageInfo::default()
            },
            gpu: GpuInfo {
                memory_gb: vram_gb,
                ..GpuInfo::default()
            },
            ..HardwareInventory::default()
        }
    }

    #[test]
    fn saturated_high_tier_scores_100() {
        let score = compute_tier_score(
            &metrics(Some(50.0)),
            &inventory(Some(32.0), Some(500.0), Some(8.0)),
            &GamingTier::High.requirement(),
        );
        assert_eq!(score, 100);
    }

    #[test]
    fn memory_ratio_is_proportional() {
        assert_eq!(ratio_sub_score(Some(4.0), 8.0), 50.0);
        assert_eq!(ratio_sub_score(Some(16.0), 8.0), 100.0);
        assert_eq!(ratio_sub_score(None, 8.0), 0.0);
        assert_eq!(ratio_sub_score(Some(f64::NAN), 8.0), 0.0);
    }

    #[test]
    fn non_positive_requirement_is_always_met() {
        assert_eq!(ratio_sub_score(Some(0.0), 0.0), 100.0);
        assert_eq!(ratio_sub_score(Some(1.0), -4.0), 100.0);
    }

    #[test]
    fn cpu_penalty_goes_negative_before_clamp() {
        assert_eq!(cpu_sub_score(Some(60.0), 60.0), 100.0);
        assert_eq!(cpu_sub_score(Some(70.0), 60.0), 50.0);
        assert_eq!(cpu_sub_score(Some(100.0), 60.0), -100.0);
        assert_eq!(cpu_sub_score(None, 60.0), 0.0);
    }

    #[test]
    fn development_weighting_ignores_gpu() {
        // cpu 100 * 0.4 + memory 50 * 0.4 + disk 100 * 0.2 = 80
        let score = compute_tier_score(
            &metrics(Some(10.0)),
            &inventory(Some(4.0), Some(500.0), None),
            &DevTask::WebDev.requirement(),
        );
        assert_eq!(score, 80);
    }

    #[test]
    fn score_stays_in_range_for_extreme_inputs() {
        let cases = [
            (Some(0.0), Some(0.0), Some(0.0), Some(0.0)),
            (Some(100.0), Some(0.0), Some(0.0), Some(0.0)),
            (Some(1e12), Some(1e12), Some(1e12), Some(1e12)),
            (Some(-1e12), Some(-1e12), Some(-1e12), Some(-1e12)),
            (None, None, None, None),
            (Some(f64::INFINITY), Some(f64::NAN), Some(f64::NEG_INFINITY), None),
        ];

        for (cpu, mem, disk, vram) in cases {
            for tier in GamingTier::ALL {
                let score = compute_tier_score(
                    &metrics(cpu),
                    &inventory(mem, disk, vram),
                    &tier.requirement(),
                );
                assert!(score <= 100, "score {score} out of range for {tier:?}");
            }
            for task in DevTask::ALL {
                let score = compute_tier_score(
                    &metrics(cpu),
                    &inventory(mem, disk, vram),
                    &task.requirement(),
                );
                assert!(score <= 100, "score {score} out of range for {task:?}");
            }
        }
    }

    #[test]
    fn missing_everything_scores_zero() {
        let score = compute_tier_score(
            &MetricsSample::default(),
            &HardwareInventory::default(),
            &GamingTier::Basic.requirement(),
        );
        assert_eq!(score, 0);
    }

    #[test]
    fn high_tier_wins_when_it_qualifies() {
        let analysis = classify_gaming_suitability(
            &metrics(Some(20.0)),
            &inventory(Some(32.0), Some(500.0), Some(8.0)),
        );
        assert_eq!(analysis.label, "High-End Gaming");
        assert_eq!(analysis.best_tier, Some(GamingTier::High));
        assert_eq!(analysis.score, analysis.tiers.high);
        assert_eq!(analysis.color, Color::Green);
    }

    #[test]
    fn mid_range_when_high_falls_short() {
        // 8 GB RAM, 4 GB VRAM: high = 30 + 15 + 20 + 13.3 = 78
        let analysis = classify_gaming_suitability(
            &metrics(Some(20.0)),
            &inventory(Some(8.0), Some(500.0), Some(4.0)),
        );
        assert_eq!(analysis.tiers.high, 78);
        assert_eq!(analysis.tiers.medium, 100);
        assert_eq!(analysis.label, "Mid-Range Gaming");
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.color, Color::Blue);
    }

    #[test]
    fn nothing_qualifies_reports_zero_but_keeps_breakdown() {
        let analysis = classify_gaming_suitability(
            &metrics(Some(99.0)),
            &inventory(Some(2.0), Some(10.0), Some(0.5)),
        );
        assert_eq!(analysis.label, "Not suitable for gaming");
        assert_eq!(analysis.best_tier, None);
        assert_eq!(analysis.score, 0);
        assert_eq!(analysis.color, Color::Red);
        assert!(analysis.tiers.basic < SUITABLE_SCORE);
    }

    #[test]
    fn development_results_keep_declaration_order() {
        let fits = classify_development_suitability(
            &metrics(Some(65.0)),
            &inventory(Some(16.0), Some(90.0), None),
        );
        let tasks: Vec<DevTask> = fits.iter().map(|f| f.task).collect();
        assert_eq!(tasks, DevTask::ALL.to_vec());

        // web: all met
        assert_eq!(fits[0].score, 100);
        assert!(fits[0].suitable);
        // mobile: all met (65 <= 70, 16 >= 16, 90 >= 80)
        assert_eq!(fits[1].score, 100);
        // data science: cpu 75 * 0.4 + 40 + disk 90 * 0.2 = 88
        assert_eq!(fits[2].score, 88);
        assert!(fits[2].suitable);
    }

    #[test]
    fn classification_is_idempotent() {
        let m = metrics(Some(72.5));
        let inv = inventory(Some(12.0), Some(150.0), Some(3.0));
        assert_eq!(
            classify_gaming_suitability(&m, &inv),
            classify_gaming_suitability(&m, &inv)
        );
        assert_eq!(
            classify_development_suitability(&m, &inv),
            classify_development_suitability(&m, &inv)
        );
    }
}
