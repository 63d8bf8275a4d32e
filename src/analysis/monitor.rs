//! @ai:module:intent Threshold-based regression detection between prompt versions
//! @ai:module:layer application
//! @ai:module:public_api RegressionMonitor, Alert, AlertType, AlertSeverity

use crate::config::ThresholdConfig;
use crate::error::{Error, Result};
use crate::metrics::types::Summary;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// @ai:intent Kind of metric that regressed
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Cost,
    Latency,
    Quality,
    Custom(String),
}

impl AlertType {
    /// @ai:intent Map a configured metric name to its alert type
    /// @ai:effects pure
    pub fn for_metric(metric: &str) -> AlertType {
        match metric {
            "cost" => AlertType::Cost,
            "latency" | "latency_ms" => AlertType::Latency,
            "quality" | "quality_score" => AlertType::Quality,
            other => AlertType::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertType::Cost => write!(f, "cost"),
            AlertType::Latency => write!(f, "latency"),
            AlertType::Quality => write!(f, "quality"),
            AlertType::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// @ai:intent How far past the threshold the regression landed
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    /// @ai:intent Convert severity to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// @ai:intent One detected regression between a baseline and current version
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub baseline_version: String,
    pub current_version: String,
    pub baseline_value: f64,
    pub current_value: f64,
    /// Relative change (fraction of baseline), or the absolute change when
    /// the baseline value is zero
    pub change: f64,
    pub threshold: f64,
}

/// Handler invoked synchronously for every produced alert, in
/// registration order.
pub type AlertHandler = Box<dyn Fn(&Alert) + Send + Sync>;

/// @ai:intent Compares version summaries against signed fractional thresholds
///
/// Each monitor owns its threshold map and handler list; there is no
/// process-wide registry. A positive threshold flags an increase beyond
/// that fraction (cost, latency), a negative threshold flags a decrease
/// beyond that magnitude (quality). The sign convention is never
/// normalized.
pub struct RegressionMonitor {
    thresholds: ThresholdConfig,
    handlers: Vec<AlertHandler>,
}

impl RegressionMonitor {
    /// @ai:intent Create a monitor owning the given thresholds
    /// @ai:effects pure
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self {
            thresholds,
            handlers: Vec::new(),
        }
    }

    /// @ai:intent Register an alert handler, appended in call order
    pub fn register<F>(&mut self, handler: F)
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// @ai:intent Look up the configured threshold for a metric
    /// @ai:post Err(UndefinedMetric) when the metric is not configured
    /// @ai:effects pure
    pub fn threshold_for(&self, metric: &str) -> Result<f64> {
        self.thresholds
            .get(metric)
            .ok_or_else(|| Error::UndefinedMetric(metric.to_string()))
    }

    /// @ai:intent Check a current summary against a baseline summary
    /// @ai:post zero call_count on either side produces no alerts;
    ///          metrics absent from either summary are skipped
    /// @ai:effects io (handler dispatch)
    pub fn check(
        &self,
        baseline_version: &str,
        current_version: &str,
        baseline: &Summary,
        current: &Summary,
    ) -> Vec<Alert> {
        if baseline.call_count == 0 || current.call_count == 0 {
            tracing::info!(
                baseline = baseline_version,
                current = current_version,
                "insufficient data for regression check (baseline: {} calls, current: {} calls)",
                baseline.call_count,
                current.call_count
            );
            return Vec::new();
        }

        let mut alerts = Vec::new();

        for (metric, &threshold) in self.thresholds.iter() {
            let (Some(baseline_value), Some(current_value)) =
                (baseline.metric_value(metric), current.metric_value(metric))
            else {
                continue;
            };

            let (change, absolute) = if baseline_value == 0.0 {
                // Relative change is undefined on a zero baseline; fall
                // back to comparing the absolute change
                (current_value - baseline_value, true)
            } else {
                ((current_value - baseline_value) / baseline_value, false)
            };

            let breached = if threshold >= 0.0 {
                change > threshold
            } else {
                change < threshold
            };

            if !breached {
                continue;
            }

            let severity = severity_for(change, threshold);
            let message = if absolute {
                format!(
                    "{} moved from {:.4} to {:.4} (absolute change {:+.4}, threshold {:+.4}) between {} and {}",
                    metric, baseline_value, current_value, change, threshold,
                    baseline_version, current_version
                )
            } else {
                format!(
                    "{} changed by {:+.1}% (threshold {:+.1}%) between {} and {}",
                    metric,
                    change * 100.0,
                    threshold * 100.0,
                    baseline_version,
                    current_version
                )
            };

            alerts.push(Alert {
                alert_type: AlertType::for_metric(metric),
                severity,
                message,
                baseline_version: baseline_version.to_string(),
                current_version: current_version.to_string(),
                baseline_value,
                current_value,
                change,
                threshold,
            });
        }

        self.dispatch(&alerts);
        alerts
    }

    /// @ai:intent Invoke every handler for every alert, isolating failures
    /// @ai:post a panicking handler never suppresses the remaining handlers
    /// @ai:effects io
    fn dispatch(&self, alerts: &[Alert]) {
        for alert in alerts {
            for (index, handler) in self.handlers.iter().enumerate() {
                if catch_unwind(AssertUnwindSafe(|| handler(alert))).is_err() {
                    tracing::error!(
                        handler = index,
                        alert = %alert.alert_type,
                        "alert handler panicked; continuing with remaining handlers"
                    );
                }
            }
        }
    }
}

/// @ai:intent Derive severity from threshold exceedance
/// @ai:post Critical at >= 2x the threshold magnitude, or any breach of a
///          zero threshold
/// @ai:effects pure
fn severity_for(change: f64, threshold: f64) -> AlertSeverity {
    if threshold == 0.0 || change.abs() >= 2.0 * threshold.abs() {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn thresholds(pairs: &[(&str, f64)]) -> ThresholdConfig {
        ThresholdConfig {
            metrics: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn summary(calls: u32, latency: f64, cost: f64, quality: Option<f64>) -> Summary {
        Summary {
            call_count: calls,
            success_rate: Some(1.0),
            avg_latency_ms: Some(latency),
            avg_cost_per_call: Some(cost),
            avg_quality: quality,
            ..Default::default()
        }
    }

    #[test]
    fn test_latency_regression_only() {
        // Latency 30% worse against a 20% threshold; cost improved
        let monitor = RegressionMonitor::new(thresholds(&[("latency", 0.20), ("cost", 0.15)]));
        let baseline = summary(100, 500.0, 0.01, None);
        let current = summary(100, 650.0, 0.009, None);

        let alerts = monitor.check("1.0.0", "1.1.0", &baseline, &current);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Latency);
        assert!((alerts[0].change - 0.30).abs() < 1e-12);
        assert_eq!(alerts[0].baseline_version, "1.0.0");
        assert_eq!(alerts[0].current_version, "1.1.0");
    }

    #[test]
    fn test_threshold_sign_discipline() {
        let monitor = RegressionMonitor::new(thresholds(&[("latency", 0.20)]));
        let baseline = summary(10, 400.0, 0.01, None);

        // 25% slower: breach
        let slower = summary(10, 500.0, 0.01, None);
        assert_eq!(monitor.check("a", "b", &baseline, &slower).len(), 1);

        // 10% slower: within threshold
        let slightly = summary(10, 440.0, 0.01, None);
        assert!(monitor.check("a", "b", &baseline, &slightly).is_empty());
    }

    #[test]
    fn test_negative_threshold_flags_decrease() {
        let monitor = RegressionMonitor::new(thresholds(&[("quality", -0.10)]));
        let baseline = summary(10, 400.0, 0.01, Some(0.90));

        let worse = summary(10, 400.0, 0.01, Some(0.70));
        let alerts = monitor.check("a", "b", &baseline, &worse);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Quality);
        assert!(alerts[0].change < 0.0);

        // Quality improvement never alerts on a negative threshold
        let better = summary(10, 400.0, 0.01, Some(0.99));
        assert!(monitor.check("a", "b", &baseline, &better).is_empty());
    }

    #[test]
    fn test_zero_baseline_falls_back_to_absolute() {
        let monitor = RegressionMonitor::new(thresholds(&[("cost", 0.15)]));
        let baseline = summary(10, 400.0, 0.0, None);
        let current = summary(10, 400.0, 0.50, None);

        let alerts = monitor.check("a", "b", &baseline, &current);
        assert_eq!(alerts.len(), 1);
        assert!((alerts[0].change - 0.50).abs() < 1e-12);
        assert!(alerts[0].message.contains("absolute"));
    }

    #[test]
    fn test_no_alerts_without_data() {
        let monitor = RegressionMonitor::new(thresholds(&[("latency", 0.20)]));
        let empty = Summary::default();
        let current = summary(10, 900.0, 0.01, None);

        assert!(monitor.check("a", "b", &empty, &current).is_empty());
        assert!(monitor.check("a", "b", &current, &empty).is_empty());
    }

    #[test]
    fn test_missing_metric_skipped() {
        // Quality threshold configured but neither summary has quality data
        let monitor = RegressionMonitor::new(thresholds(&[("quality", -0.10), ("latency", 0.20)]));
        let baseline = summary(10, 400.0, 0.01, None);
        let current = summary(10, 600.0, 0.01, None);

        let alerts = monitor.check("a", "b", &baseline, &current);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Latency);
    }

    #[test]
    fn test_custom_extra_metric() {
        let monitor = RegressionMonitor::new(thresholds(&[("accuracy", -0.05)]));
        let mut baseline = summary(10, 400.0, 0.01, None);
        baseline.avg_extras.insert("accuracy".to_string(), 0.90);
        let mut current = summary(10, 400.0, 0.01, None);
        current.avg_extras.insert("accuracy".to_string(), 0.70);

        let alerts = monitor.check("a", "b", &baseline, &current);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Custom("accuracy".to_string()));
    }

    #[test]
    fn test_severity_escalates_at_twice_threshold() {
        let monitor = RegressionMonitor::new(thresholds(&[("latency", 0.20)]));
        let baseline = summary(10, 400.0, 0.01, None);

        let warning = monitor.check("a", "b", &baseline, &summary(10, 520.0, 0.01, None));
        assert_eq!(warning[0].severity, AlertSeverity::Warning);

        let critical = monitor.check("a", "b", &baseline, &summary(10, 600.0, 0.01, None));
        assert_eq!(critical[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut monitor = RegressionMonitor::new(thresholds(&[("latency", 0.20)]));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        monitor.register(move |_alert| first.lock().unwrap().push("first"));
        let second = Arc::clone(&seen);
        monitor.register(move |_alert| second.lock().unwrap().push("second"));

        let baseline = summary(10, 400.0, 0.01, None);
        let current = summary(10, 600.0, 0.01, None);
        monitor.check("a", "b", &baseline, &current);

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_panicking_handler_does_not_suppress_others() {
        let mut monitor = RegressionMonitor::new(thresholds(&[("latency", 0.20)]));
        let delivered = Arc::new(AtomicUsize::new(0));

        monitor.register(|_alert| panic!("bad handler"));
        let counter = Arc::clone(&delivered);
        monitor.register(move |_alert| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let baseline = summary(10, 400.0, 0.01, None);
        let current = summary(10, 600.0, 0.01, None);
        let alerts = monitor.check("a", "b", &baseline, &current);

        assert_eq!(alerts.len(), 1);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_threshold_for_undefined_metric() {
        let monitor = RegressionMonitor::new(thresholds(&[("latency", 0.20)]));
        assert!((monitor.threshold_for("latency").unwrap() - 0.20).abs() < 1e-12);
        assert!(matches!(
            monitor.threshold_for("coherence"),
            Err(Error::UndefinedMetric(name)) if name == "coherence"
        ));
    }
}
