//! Run summary view: which zone, what status, how much was produced.

use crate::models::AnalysisResult;
use crate::views::ViewModel;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummaryView {
    /// Defaults to "selected zone".
    pub zone: String,
    /// Defaults to "unknown".
    pub status: String,
    /// Image entries with a non-empty value.
    pub images_generated: usize,
    /// Metrics sorted by key, values rendered as text.
    pub metrics: Vec<(String, String)>,
}

impl ViewModel for AnalysisSummaryView {
    const NAME: &'static str = "summary";

    fn derive(result: &AnalysisResult, _api_base: &str) -> Self {
        let images_generated = result
            .images()
            .map(|images| images.values().filter(|v| is_truthy(v)).count())
            .unwrap_or(0);

        let mut metrics: Vec<(String, String)> = result
            .metrics()
            .map(|metrics| {
                metrics
                    .iter()
                    .map(|(key, value)| (key.clone(), render_metric(value)))
                    .collect()
            })
            .unwrap_or_default();
        metrics.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            zone: result.zone().unwrap_or("selected zone").to_string(),
            status: result
                .status()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            images_generated,
            metrics,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_metric(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_counts_generated_images() {
        let result = AnalysisResult::new(json!({
            "status": "success",
            "zone": "Tifra",
            "images": {
                "industrial_area": "a.png",
                "satellite_past": null,
                "osm": ""
            },
            "metrics": { "match_percentage": 96.5, "status": "No Encroachment", "note": null }
        }));

        let view = AnalysisSummaryView::derive(&result, "");

        assert_eq!(view.zone, "Tifra");
        assert_eq!(view.status, "success");
        assert_eq!(view.images_generated, 1);
        assert_eq!(
            view.metrics,
            vec![
                ("match_percentage".to_string(), "96.5".to_string()),
                ("note".to_string(), "-".to_string()),
                ("status".to_string(), "No Encroachment".to_string()),
            ]
        );
    }

    #[test]
    fn test_summary_defaults() {
        let view = AnalysisSummaryView::derive(&AnalysisResult::new(json!({ "images": [] })), "");
        assert_eq!(view.zone, "selected zone");
        assert_eq!(view.status, "unknown");
        assert_eq!(view.images_generated, 0);
        assert!(view.metrics.is_empty());
    }
}
