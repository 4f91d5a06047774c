use crate::core::{AnomalyReport, Color, FanReading, FanStatus};

/// Fan speed that maps to a full progress ring.
pub const FAN_PROGRESS_MAX_RPM: u32 = 3000;

// Speed bands for the per-fan color badge
const FAN_SLOW_RPM: u32 = 800;
const FAN_FAST_RPM: u32 = 2500;

/// A CPU fan spinning below this is considered stalled
const CPU_FAN_MIN_RPM: u32 = 500;

/// Color for a fan's speed badge.
///
/// Speeds above 2500 RPM are yellow, not green: the dashboard treats them as
/// high-normal rather than healthy.
pub fn classify_fan_speed_color(rpm: Option<u32>) -> Color {
    match rpm {
        None => Color::Gray,
        Some(0) => Color::Red,
        Some(rpm) if rpm < FAN_SLOW_RPM => Color::Orange,
        Some(rpm) if rpm > FAN_FAST_RPM => Color::Yellow,
        Some(_) => Color::Green,
    }
}

/// Progress ring fill for a fan, as a percentage of 3000 RPM.
pub fn calculate_fan_progress(rpm: Option<u32>) -> f64 {
    rpm.map_or(0.0, |rpm| {
        (f64::from(rpm) / f64::from(FAN_PROGRESS_MAX_RPM) * 100.0).min(100.0)
    })
}

pub fn fan_status_color(status: &FanStatus) -> Color {
    match status {
        FanStatus::Active => Color::Green,
        FanStatus::Inactive => Color::Orange,
        FanStatus::Other(_) => Color::Gray,
    }
}

fn is_low_speed_cpu_fan(fan: &FanReading) -> bool {
    fan.status == FanStatus::Active
        && fan.speed_rpm.is_some_and(|rpm| rpm < CPU_FAN_MIN_RPM)
        && fan.name.contains("CPU")
}

fn is_anomalous(fan: &FanReading) -> bool {
    fan.status == FanStatus::Inactive || is_low_speed_cpu_fan(fan)
}

/// Classify a snapshot of fan readings.
///
/// Exactly one message is produced, chosen by priority: stopped fans first,
/// then a slow CPU fan, then a generic warning.
pub fn detect_anomaly(fans: &[FanReading]) -> AnomalyReport {
    let has_anomaly = fans.iter().any(is_anomalous);
    if !has_anomaly {
        return AnomalyReport::default();
    }

    let inactive = fans
        .iter()
        .filter(|fan| fan.status == FanStatus::Inactive)
        .count();

    let message = if inactive > 0 {
        format!("{inactive} cooling fan(s) are not spinning. This may lead to overheating issues.")
    } else if fans.iter().any(is_low_speed_cpu_fan) {
        "CPU fan is running at a very low speed. Check for obstructions or hardware issues."
            .to_string()
    } else {
        "Abnormal fan behavior detected. Monitor system temperatures.".to_string()
    };

    AnomalyReport {
        has_anomaly,
        message,
    }
}

/// True when there is at least one fan, nothing is anomalous and every fan reports Active.
pub fn all_fans_operational(fans: &[FanReading]) -> bool {
    !fans.is_empty()
        && !detect_anomaly(fans).has_anomaly
        && fans.iter().all(|fan| fan.status == FanStatus::Active)
}

/// Maintenance advice for the cooling system.
pub fn fan_recommendations(fans: &[FanReading]) -> Vec<&'static str> {
    let mut recommendations = Vec::new();

    if fans.iter().any(|fan| fan.status == FanStatus::Inactive) {
        recommendations.extend([
            "Check the connection of inactive fans. Ensure they're properly connected to the motherboard.",
            "Clean fans of dust and debris which can prevent proper operation.",
            "If fans still don't work after cleaning and checking connections, they may need to be replaced.",
        ]);
    }

    // Unlike anomaly detection, any fan counts here and 0 RPM is not "low"
    let has_slow_fan = fans.iter().any(|fan| {
        fan.status == FanStatus::Active
            && fan.speed_rpm.is_some_and(|rpm| rpm > 0 && rpm < FAN_SLOW_RPM)
    });
    if has_slow_fan {
        recommendations.extend([
            "Fans running at low speeds may indicate obstructions or aging bearings.",
            "Check BIOS settings for fan speed control and consider adjusting the fan curve.",
        ]);
    }

    if !fans.is_empty() {
        recommendations.extend([
            "Clean all fans and heat sinks every 3-6 months to maintain optimal cooling performance.",
            "Ensure proper airflow inside the case by managing cable routing and keeping vents clear.",
        ]);
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan(name: &str, status: FanStatus, rpm: Option<u32>) -> FanReading {
        FanReading {
            name: name.to_string(),
            status,
            speed_rpm: rpm,
            temperature_celsius: None,
            hardware: None,
        }
    }

    #[test]
    fn speed_color_bands() {
        assert_eq!(classify_fan_speed_color(None), Color::Gray);
        assert_eq!(classify_fan_speed_color(Some(0)), Color::Red);
        assert_eq!(classify_fan_speed_color(Some(799)), Color::Orange);
        assert_eq!(classify_fan_speed_color(Some(800)), Color::Green);
        assert_eq!(classify_fan_speed_color(Some(1500)), Color::Green);
        assert_eq!(classify_fan_speed_color(Some(2500)), Color::Green);
        assert_eq!(classify_fan_speed_color(Some(2501)), Color::Yellow);
    }

    #[test]
    fn progress_is_clamped_to_full() {
        assert_eq!(calculate_fan_progress(None), 0.0);
        assert_eq!(calculate_fan_progress(Some(0)), 0.0);
        assert_eq!(calculate_fan_progress(Some(1500)), 50.0);
        assert_eq!(calculate_fan_progress(Some(3000)), 100.0);
        assert_eq!(calculate_fan_progress(Some(6000)), 100.0);
    }

    #[test]
    fn inactive_fan_takes_priority() {
        let report = detect_anomaly(&[
            fan("CPU Fan", FanStatus::Inactive, None),
            fan("CPU Fan 2", FanStatus::Active, Some(300)),
        ]);
        assert!(report.has_anomaly);
        assert!(report.message.starts_with("1 cooling fan(s)"));
    }

    #[test]
    fn counts_every_inactive_fan() {
        let report = detect_anomaly(&[
            fan("Chassis Fan 1", FanStatus::Inactive, None),
            fan("Chassis Fan 2", FanStatus::Inactive, Some(0)),
            fan("CPU Fan", FanStatus::Active, Some(1200)),
        ]);
        assert_eq!(
            report.message,
            "2 cooling fan(s) are not spinning. This may lead to overheating issues."
        );
    }

    #[test]
    fn slow_cpu_fan_gets_specific_message() {
        let report = detect_anomaly(&[fan("CPU Fan", FanStatus::Active, Some(400))]);
        assert!(report.has_anomaly);
        assert_eq!(
            report.message,
            "CPU fan is running at a very low speed. Check for obstructions or hardware issues."
        );
    }

    #[test]
    fn slow_non_cpu_fan_is_not_an_anomaly() {
        let report = detect_anomaly(&[fan("Chassis Fan", FanStatus::Active, Some(400))]);
        assert!(!report.has_anomaly);
        assert!(report.message.is_empty());
    }

    #[test]
    fn cpu_match_is_case_sensitive() {
        let report = detect_anomaly(&[fan("cpu fan", FanStatus::Active, Some(100))]);
        assert!(!report.has_anomaly);
    }

    #[test]
    fn unknown_speed_is_not_slow() {
        let report = detect_anomaly(&[fan("CPU Fan", FanStatus::Active, None)]);
        assert!(!report.has_anomaly);
    }

    #[test]
    fn healthy_fans_are_operational() {
        let fans = [
            fan("CPU Fan", FanStatus::Active, Some(1200)),
            fan("Case Fan", FanStatus::Active, Some(900)),
        ];
        assert_eq!(detect_anomaly(&fans), AnomalyReport::default());
        assert!(all_fans_operational(&fans));
        assert!(!all_fans_operational(&[]));
        assert!(!all_fans_operational(&[fan(
            "Pump",
            FanStatus::Other("Unknown".to_string()),
            None
        )]));
    }

    #[test]
    fn detection_is_idempotent() {
        let fans = [
            fan("CPU Fan", FanStatus::Active, Some(450)),
            fan("Case Fan", FanStatus::Inactive, None),
        ];
        assert_eq!(detect_anomaly(&fans), detect_anomaly(&fans));
    }

    #[test]
    fn recommendations_follow_fan_state() {
        assert!(fan_recommendations(&[]).is_empty());

        let healthy = fan_recommendations(&[fan("CPU Fan", FanStatus::Active, Some(1200))]);
        assert_eq!(healthy.len(), 2);

        let slow = fan_recommendations(&[fan("Case Fan", FanStatus::Active, Some(700))]);
        assert_eq!(slow.len(), 4);
        assert!(slow[0].contains("low speeds"));

        let stopped = fan_recommendations(&[
            fan("Case Fan", FanStatus::Inactive, None),
            fan("CPU Fan", FanStatus::Active, Some(650)),
        ]);
        assert_eq!(stopped.len(), 7);
        assert!(stopped[0].starts_with("Check the connection"));
    }

    #[test]
    fn status_colors() {
        assert_eq!(fan_status_color(&FanStatus::Active), Color::Green);
        assert_eq!(fan_status_color(&FanStatus::Inactive), Color::Orange);
        assert_eq!(
            fan_status_color(&FanStatus::Other("Unknown".to_string())),
            Color::Gray
        );
    }
}
