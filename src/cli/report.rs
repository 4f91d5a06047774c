// Plain-text rendering of analysis results
use crate::advice;
use crate::core::{
    DashboardSummary, FanReading, HardwareIssue, MetricsPage, MetricsStatistics, SystemReport,
    TrainingRecord, UsageStats,
};
use crate::fan;
use std::fmt::Write;

fn or_na<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}%"))
}

fn gigabytes(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1} GB"))
}

/// Render the fan panel: one line per fan plus the anomaly banner.
pub fn render_fans(fans: &[FanReading]) -> String {
    let mut out = String::new();

    if fans.is_empty() {
        let _ = writeln!(out, "No cooling fan information available");
        let _ = writeln!(out, "Your system may not expose fan sensor data");
        return out;
    }

    let anomaly = fan::detect_anomaly(fans);
    if anomaly.has_anomaly {
        let _ = writeln!(out, "[!] Cooling Anomaly Detected: {}", anomaly.message);
    }

    for reading in fans {
        let _ = writeln!(
            out,
            "  {:<24} {:<10} [{}] {:>9} RPM [{}] {:>5.1}%{}",
            reading.name,
            reading.status.label(),
            fan::fan_status_color(&reading.status),
            or_na(reading.speed_rpm),
            fan::classify_fan_speed_color(reading.speed_rpm),
            fan::calculate_fan_progress(reading.speed_rpm),
            reading
                .temperature_celsius
                .map_or_else(String::new, |t| format!(" {t:.1}°C")),
        );
        if let Some(hardware) = &reading.hardware {
            let _ = writeln!(out, "    on {hardware}");
        }
    }

    if fan::all_fans_operational(fans) {
        let _ = writeln!(out, "All Fans Operational: all cooling fans are functioning properly.");
    }

    let recommendations = fan::fan_recommendations(fans);
    if !recommendations.is_empty() {
        let _ = writeln!(out, "\nCooling System Recommendations:");
        for rec in recommendations {
            let _ = writeln!(out, "  - {rec}");
        }
    }

    out
}

/// Render a full suitability analysis.
pub fn render_analysis(report: &SystemReport) -> String {
    let mut out = String::new();
    let inv = &report.inventory;
    let m = &report.metrics;

    let _ = writeln!(out, "--- System Specifications ---");
    let _ = writeln!(out, "CPU: {}", inv.cpu.model);
    let _ = writeln!(
        out,
        "Cores / Threads: {} / {}",
        or_na(inv.cpu.cores),
        or_na(inv.cpu.threads)
    );
    let _ = writeln!(
        out,
        "Clock Speed: {} (Boost: {})",
        inv.cpu.base_clock.as_deref().unwrap_or("Unknown"),
        inv.cpu.boost_clock.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        out,
        "Memory: {} {} (Speed: {})",
        gigabytes(inv.memory.total_gb),
        inv.memory.kind,
        inv.memory.speed.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        out,
        "Storage: {} {} (Free: {})",
        inv.storage.kind,
        gigabytes(inv.storage.total_gb),
        gigabytes(inv.storage.free_gb)
    );
    let _ = writeln!(
        out,
        "GPU: {} (VRAM: {})",
        inv.gpu.model,
        gigabytes(inv.gpu.memory_gb)
    );
    let _ = writeln!(
        out,
        "Usage: CPU {} [{}], Memory {} [{}], Disk {} [{}]",
        percent(m.cpu_percent),
        advice::usage_color(m.cpu_percent),
        percent(m.memory_percent),
        advice::usage_color(m.memory_percent),
        percent(m.disk_usage_percent),
        advice::usage_color(m.disk_usage_percent),
    );

    let gaming = &report.gaming;
    let _ = writeln!(out, "\n--- Gaming Suitability ---");
    let _ = writeln!(out, "{} [{}]", gaming.label, gaming.color);
    let _ = writeln!(out, "Overall Gaming Score: {}%", gaming.score);
    for (name, score) in [
        ("Basic", gaming.tiers.basic),
        ("Medium", gaming.tiers.medium),
        ("High", gaming.tiers.high),
    ] {
        let _ = writeln!(
            out,
            "  {name:<7} {score:>3}% [{}]",
            advice::tier_color(score)
        );
    }

    let _ = writeln!(out, "\n--- Development Tasks Compatibility ---");
    for fit in &report.development {
        let _ = writeln!(
            out,
            "  {:<20} {:>3}% [{}] Your system is {} for {}.",
            fit.task.label(),
            fit.score,
            advice::development_color(fit.score),
            if fit.suitable { "suitable" } else { "not optimal" },
            fit.task.label().to_lowercase()
        );
    }

    if !inv.fans.is_empty() {
        let _ = writeln!(out, "\n--- Cooling System ---");
        out.push_str(&render_fans(&inv.fans));
    } else if report.fan_anomaly.has_anomaly {
        let _ = writeln!(out, "\n[!] {}", report.fan_anomaly.message);
    }

    let _ = writeln!(out, "\n--- Recommendations ---");
    for rec in &report.recommendations {
        let _ = writeln!(out, "  - {rec}");
    }

    let _ = writeln!(out, "\nGenerated: {}", report.timestamp.to_rfc3339());
    out
}

fn render_issue_line(out: &mut String, issue: &HardwareIssue) {
    let _ = writeln!(
        out,
        "  #{} {} ({}){}",
        issue.id,
        issue.issue_type,
        issue.timestamp.as_deref().unwrap_or("unknown time"),
        if issue.is_resolved { " [resolved]" } else { "" }
    );
    if !issue.description.is_empty() {
        let _ = writeln!(out, "    {}", issue.description);
    }
    if !issue.recommendation.is_empty() {
        let _ = writeln!(out, "    Recommendation: {}", issue.recommendation);
    }
}

pub fn render_issues(issues: &[HardwareIssue]) -> String {
    let mut out = String::new();
    if issues.is_empty() {
        let _ = writeln!(out, "No Issues");
        return out;
    }

    let _ = writeln!(out, "{} Issues", issues.len());
    for issue in issues {
        render_issue_line(&mut out, issue);
    }
    out
}

// Latest value and average of a trend series
fn trend_summary(series: &[f64]) -> String {
    match series.first() {
        None => "no data".to_string(),
        Some(latest) => {
            let avg = series.iter().sum::<f64>() / series.len() as f64;
            format!(
                "latest {latest:.1}%, avg {avg:.1}% over {} samples",
                series.len()
            )
        }
    }
}

pub fn render_dashboard(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let m = &summary.current;

    let _ = writeln!(out, "--- Current State ---");
    for (name, value) in [
        ("CPU Usage", m.cpu_percent),
        ("Memory Usage", m.memory_percent),
        ("Disk Usage", m.disk_usage_percent),
    ] {
        let _ = writeln!(
            out,
            "{name:<13} {:>7} [{}]",
            percent(value),
            advice::usage_color(value)
        );
    }
    if let Some(temp) = m.cpu_temp_celsius {
        let _ = writeln!(out, "CPU Temperature: {temp:.1}°C");
    }

    // the backend returns newest first
    let _ = writeln!(out, "\n--- Trends ---");
    let _ = writeln!(out, "CPU:    {}", trend_summary(&summary.trends.cpu));
    let _ = writeln!(out, "Memory: {}", trend_summary(&summary.trends.memory));
    let _ = writeln!(out, "Disk:   {}", trend_summary(&summary.trends.disk));

    let _ = writeln!(out, "\n--- Anomaly Model ---");
    let _ = writeln!(
        out,
        "Trained: {} (last training: {})",
        if summary.model_trained { "yes" } else { "no" },
        summary.last_training.as_deref().unwrap_or("never")
    );
    let _ = writeln!(out, "Recent anomalies: {}", summary.recent_anomaly_count);

    let _ = writeln!(out, "\n--- Detected Issues ---");
    out.push_str(&render_issues(&summary.unresolved_issues));
    out
}

fn usage_line(name: &str, stats: &UsageStats) -> String {
    format!(
        "{name:<7} avg {:>7}  max {:>7}  min {:>7}",
        percent(stats.avg),
        percent(stats.max),
        percent(stats.min)
    )
}

pub fn render_statistics(stats: &MetricsStatistics, days: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Metrics over the last {days} day(s) ---");
    let _ = writeln!(out, "Total Measurements: {}", stats.total_metrics);
    let _ = writeln!(out, "Anomalies Detected: {}", stats.anomalies);
    let _ = writeln!(out, "{}", usage_line("CPU", &stats.cpu));
    let _ = writeln!(out, "{}", usage_line("Memory", &stats.memory));
    let _ = writeln!(out, "{}", usage_line("Disk", &stats.disk));

    if !stats.hourly.is_empty() {
        let _ = writeln!(out, "\n--- Hourly Averages ---");
        let _ = writeln!(
            out,
            "{:<26} {:>7} {:>7} {:>7} {:>9}",
            "Hour", "CPU", "Memory", "Disk", "Anomalies"
        );
        for row in &stats.hourly {
            let _ = writeln!(
                out,
                "{:<26} {:>7} {:>7} {:>7} {:>9}",
                row.hour.as_deref().unwrap_or("unknown"),
                percent(row.avg_cpu),
                percent(row.avg_memory),
                percent(row.avg_disk),
                row.anomaly_count
            );
        }
    }
    out
}

/// Render one page of stored metrics samples in the order the backend returns them.
pub fn render_history(history: &MetricsPage, page: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "--- Metrics History (page {page} of {}) ---",
        history.total_pages()
    );

    if history.samples.is_empty() {
        let _ = writeln!(out, "No metrics in the selected time range");
        return out;
    }

    for sample in &history.samples {
        let _ = writeln!(
            out,
            "  {:<25} CPU {:>6}  Memory {:>6}  Disk {:>6}{}",
            sample
                .timestamp
                .map_or_else(|| "unknown time".to_string(), |ts| ts.to_rfc3339()),
            percent(sample.cpu_percent),
            percent(sample.memory_percent),
            percent(sample.disk_usage_percent),
            if sample.is_anomaly { "  [anomaly]" } else { "" }
        );
    }
    out
}

pub fn render_training(record: &TrainingRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Model trained at {}",
        record.trained_at.as_deref().unwrap_or("unknown time")
    );
    let _ = writeln!(out, "Training samples: {}", or_na(record.training_samples));
    let _ = writeln!(
        out,
        "Performance score: {}",
        record
            .performance_score
            .map_or_else(|| "N/A".to_string(), |s| format!("{s:.3}"))
    );
    if !record.notes.is_empty() {
        let _ = writeln!(out, "Notes: {}", record.notes);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FanStatus, HardwareInventory, MetricsSample};
    use crate::monitor::build_system_report;
    use chrono::Utc;

    fn reading(name: &str, status: FanStatus, rpm: Option<u32>) -> FanReading {
        FanReading {
            name: name.to_string(),
            status,
            speed_rpm: rpm,
            temperature_celsius: None,
            hardware: None,
        }
    }

    #[test]
    fn empty_fan_panel_explains_itself() {
        assert!(render_fans(&[]).starts_with("No cooling fan information available"));
    }

    #[test]
    fn fan_panel_shows_banner_and_colors() {
        let out = render_fans(&[
            reading("CPU Fan", FanStatus::Active, Some(420)),
            reading("Case Fan", FanStatus::Active, Some(2700)),
        ]);
        assert!(out.starts_with("[!] Cooling Anomaly Detected: CPU fan is running"));
        assert!(out.contains("[yellow]"));
        assert!(out.contains("[orange]"));
        assert!(!out.contains("All Fans Operational"));
    }

    #[test]
    fn analysis_mentions_every_section() {
        let report = build_system_report(
            MetricsSample::default(),
            HardwareInventory::default(),
            Utc::now(),
        );
        let out = render_analysis(&report);
        assert!(out.contains("Not suitable for gaming"));
        assert!(out.contains("Data Science/ML"));
        assert!(out.contains("Keep your drivers updated"));
    }

    #[test]
    fn statistics_include_hourly_rows() {
        let stats = MetricsStatistics {
            total_metrics: 12,
            hourly: vec![crate::core::HourlyUsage {
                hour: Some("2024-05-01T12:00:00Z".to_string()),
                avg_cpu: Some(21.0),
                avg_memory: None,
                avg_disk: Some(70.0),
                anomaly_count: 2,
            }],
            ..MetricsStatistics::default()
        };
        let out = render_statistics(&stats, 1);
        assert!(out.contains("--- Hourly Averages ---"));
        assert!(out.contains("2024-05-01T12:00:00Z"));
        assert!(out.contains("21.0%"));
        assert!(!render_statistics(&MetricsStatistics::default(), 7).contains("Hourly"));
    }

    #[test]
    fn history_page_lists_samples() {
        let history = MetricsPage {
            count: Some(15),
            samples: vec![MetricsSample {
                cpu_percent: Some(33.3),
                is_anomaly: true,
                ..MetricsSample::default()
            }],
        };
        let out = render_history(&history, 2);
        assert!(out.starts_with("--- Metrics History (page 2 of 2) ---"));
        assert!(out.contains("33.3%"));
        assert!(out.contains("[anomaly]"));

        let empty = render_history(&MetricsPage::default(), 1);
        assert!(empty.contains("No metrics in the selected time range"));
    }

    #[test]
    fn trend_summary_handles_empty_series() {
        assert_eq!(trend_summary(&[]), "no data");
        assert_eq!(
            trend_summary(&[40.0, 20.0]),
            "latest 40.0%, avg 30.0% over 2 samples"
        );
    }
}
