//! AI insight panel view.

use crate::models::AnalysisResult;
use crate::views::{number, text, text_list, ViewModel};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl RiskLevel {
    fn classify(label: Option<&str>) -> Self {
        match label.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("high") => RiskLevel::High,
            Some("medium") => RiskLevel::Medium,
            Some("low") => RiskLevel::Low,
            _ => RiskLevel::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    Compliant,
    UnderReview,
    NonCompliant,
    Unknown,
}

impl ComplianceLevel {
    fn classify(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::to_lowercase) else {
            return ComplianceLevel::Unknown;
        };
        if label.contains("non-compliant") || label.contains("non compliant") {
            ComplianceLevel::NonCompliant
        } else if label.contains("compliant") {
            ComplianceLevel::Compliant
        } else if label.contains("review") {
            ComplianceLevel::UnderReview
        } else {
            ComplianceLevel::NonCompliant
        }
    }
}

/// One row of the plan-versus-ground comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeFinding {
    pub category: String,
    pub manual_plan: String,
    pub satellite_analysis: String,
    pub ground_reality: String,
    pub discrepancy: String,
    pub action: String,
}

impl ComparativeFinding {
    fn from_value(value: &Value) -> Option<Self> {
        let row = Some(value.as_object()?);
        let field = |key| text(row, key).unwrap_or_default();
        Some(Self {
            category: field("category"),
            manual_plan: field("manual_plan"),
            satellite_analysis: field("satellite_analysis"),
            ground_reality: field("ground_reality"),
            discrepancy: field("discrepancy"),
            action: field("action"),
        })
    }

    pub fn is_major_discrepancy(&self) -> bool {
        self.discrepancy.contains("Major")
    }
}

/// Site-level assessment from the image model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteAssessment {
    pub encroachment_status: Option<String>,
    /// Defaults to 0.
    pub construction_percentage: f64,
    /// Defaults to 0.
    pub vegetation_percentage: f64,
    /// Defaults to "Unknown".
    pub idle_status: String,
    pub explanation: Option<String>,
}

impl SiteAssessment {
    fn from_section(section: &Map<String, Value>) -> Self {
        let section = Some(section);
        Self {
            encroachment_status: text(section, "encroachment_status"),
            construction_percentage: number(section, "construction_percentage"),
            vegetation_percentage: number(section, "vegetation_percentage"),
            idle_status: text(section, "idle_status").unwrap_or_else(|| "Unknown".to_string()),
            explanation: text(section, "explanation"),
        }
    }
}

/// Everything the insight panel shows. Text fields are `None` and lists
/// are empty when the document lacks them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsView {
    pub zone: Option<String>,
    pub executive_summary: Option<String>,
    pub compliance_status: Option<String>,
    pub compliance: ComplianceLevel,
    pub risk_level: Option<String>,
    pub risk: RiskLevel,
    pub construction_trend: Option<String>,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub comparative_findings: Vec<ComparativeFinding>,
    pub site: Option<SiteAssessment>,
    pub encroachment_plots: Vec<String>,
    pub idle_plots: Vec<String>,
    pub low_vegetation_plots: Vec<String>,
}

impl InsightsView {
    /// False when the run produced neither insights nor a site assessment.
    pub fn has_content(&self) -> bool {
        self.executive_summary.is_some()
            || self.compliance_status.is_some()
            || self.risk_level.is_some()
            || self.construction_trend.is_some()
            || !self.key_findings.is_empty()
            || !self.recommendations.is_empty()
            || !self.comparative_findings.is_empty()
            || self.site.is_some()
            || !self.encroachment_plots.is_empty()
            || !self.idle_plots.is_empty()
            || !self.low_vegetation_plots.is_empty()
    }
}

impl ViewModel for InsightsView {
    const NAME: &'static str = "insights";

    fn derive(result: &AnalysisResult, _api_base: &str) -> Self {
        let insights = result.dashboard_insights();
        let plot_status = insights
            .and_then(|i| i.get("plot_status"))
            .and_then(Value::as_object);

        let compliance_status = text(insights, "compliance_status");
        let risk_level = text(insights, "risk_level");

        let comparative_findings = insights
            .and_then(|i| i.get("comparative_findings"))
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(ComparativeFinding::from_value).collect())
            .unwrap_or_default();

        Self {
            zone: result.zone().map(String::from),
            executive_summary: text(insights, "executive_summary"),
            compliance: ComplianceLevel::classify(compliance_status.as_deref()),
            compliance_status,
            risk: RiskLevel::classify(risk_level.as_deref()),
            risk_level,
            construction_trend: text(insights, "construction_trend"),
            key_findings: text_list(insights, "key_findings"),
            recommendations: text_list(insights, "recommendations"),
            comparative_findings,
            site: result.groq_analysis().map(SiteAssessment::from_section),
            encroachment_plots: text_list(plot_status, "encroachment_plots"),
            idle_plots: text_list(plot_status, "idle_plots"),
            low_vegetation_plots: text_list(plot_status, "low_vegetation_plots"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_has_no_content() {
        let view = InsightsView::derive(&AnalysisResult::new(json!({ "status": "success" })), "");
        assert!(!view.has_content());
        assert_eq!(view.risk, RiskLevel::Unknown);
        assert_eq!(view.compliance, ComplianceLevel::Unknown);
        assert!(view.site.is_none());
    }

    #[test]
    fn test_full_insights() {
        let result = AnalysisResult::new(json!({
            "zone": "Urla",
            "dashboard_insights": {
                "executive_summary": "Two plots show unapproved expansion.",
                "compliance_status": "Under Review",
                "risk_level": "High",
                "key_findings": ["Plot 45 expanded", 3],
                "recommendations": ["Deploy field team"],
                "comparative_findings": [
                    {
                        "category": "Built-up",
                        "manual_plan": "Open plot",
                        "discrepancy": "Major deviation",
                        "action": "Notice"
                    },
                    "not a row"
                ],
                "plot_status": {
                    "encroachment_plots": ["101", "102A"],
                    "idle_plots": ["105"]
                }
            },
            "groq_analysis": {
                "construction_percentage": 42.5,
                "explanation": "Dense construction in the north."
            }
        }));

        let view = InsightsView::derive(&result, "");

        assert!(view.has_content());
        assert_eq!(view.zone.as_deref(), Some("Urla"));
        assert_eq!(view.compliance, ComplianceLevel::UnderReview);
        assert_eq!(view.risk, RiskLevel::High);
        assert_eq!(view.key_findings, vec!["Plot 45 expanded", "3"]);
        assert_eq!(view.comparative_findings.len(), 1);
        assert!(view.comparative_findings[0].is_major_discrepancy());
        assert_eq!(view.comparative_findings[0].ground_reality, "");
        assert_eq!(view.encroachment_plots, vec!["101", "102A"]);
        assert_eq!(view.idle_plots, vec!["105"]);
        assert!(view.low_vegetation_plots.is_empty());

        let site = view.site.unwrap();
        assert_eq!(site.construction_percentage, 42.5);
        assert_eq!(site.vegetation_percentage, 0.0);
        assert_eq!(site.idle_status, "Unknown");
        assert_eq!(site.encroachment_status, None);
    }

    #[test]
    fn test_compliance_classification() {
        assert_eq!(ComplianceLevel::classify(Some("Compliant")), ComplianceLevel::Compliant);
        assert_eq!(
            ComplianceLevel::classify(Some("Non-Compliant")),
            ComplianceLevel::NonCompliant
        );
        assert_eq!(
            ComplianceLevel::classify(Some("Pending review")),
            ComplianceLevel::UnderReview
        );
        assert_eq!(ComplianceLevel::classify(Some("Violation")), ComplianceLevel::NonCompliant);
        assert_eq!(ComplianceLevel::classify(None), ComplianceLevel::Unknown);
    }

    #[test]
    fn test_risk_classification() {
        assert_eq!(RiskLevel::classify(Some(" LOW ")), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(Some("medium")), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(Some("severe")), RiskLevel::Unknown);
    }
}
