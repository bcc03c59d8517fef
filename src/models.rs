//! Data models for analysis runs.
//!
//! This module contains the zone enumeration and the opaque
//! analysis-result document shared between the trigger, the store
//! and every consumer view.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// An industrial area that can be selected for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Zone {
    #[default]
    Bhanpuri,
    Birkoni,
    Amaseoni,
    Borai,
    ElectronicEmc,
    Gogoan,
    Gondwara,
    Harinchhapara,
    Kapan,
    NayanpurGibarganj,
    RanidurgawatiAnjani,
    Rawabhata,
    SiltaraPhase1,
    SiltaraPhase2,
    Sirgitti,
    Sondongari,
    TenduaPhase1,
    TenduaPhase2,
    Tifra,
    Urla,
}

impl Zone {
    /// All zones, in selector order.
    pub const ALL: [Zone; 20] = [
        Zone::Bhanpuri,
        Zone::Birkoni,
        Zone::Amaseoni,
        Zone::Borai,
        Zone::ElectronicEmc,
        Zone::Gogoan,
        Zone::Gondwara,
        Zone::Harinchhapara,
        Zone::Kapan,
        Zone::NayanpurGibarganj,
        Zone::RanidurgawatiAnjani,
        Zone::Rawabhata,
        Zone::SiltaraPhase1,
        Zone::SiltaraPhase2,
        Zone::Sirgitti,
        Zone::Sondongari,
        Zone::TenduaPhase1,
        Zone::TenduaPhase2,
        Zone::Tifra,
        Zone::Urla,
    ];

    /// The name the backend expects in the request body.
    pub fn name(&self) -> &'static str {
        match self {
            Zone::Bhanpuri => "Bhanpuri",
            Zone::Birkoni => "Birkoni",
            Zone::Amaseoni => "Amaseoni",
            Zone::Borai => "Borai",
            Zone::ElectronicEmc => "Electronic EMC",
            Zone::Gogoan => "Gogoan",
            Zone::Gondwara => "Gondwara",
            Zone::Harinchhapara => "Harinchhapara",
            Zone::Kapan => "Kapan",
            Zone::NayanpurGibarganj => "Nayanpur-Gibarganj",
            Zone::RanidurgawatiAnjani => "Ranidurgawati Anjani",
            Zone::Rawabhata => "Rawabhata",
            Zone::SiltaraPhase1 => "Siltara Phase 1",
            Zone::SiltaraPhase2 => "Siltara Phase 2",
            Zone::Sirgitti => "Sirgitti",
            Zone::Sondongari => "Sondongari",
            Zone::TenduaPhase1 => "Tendua Phase 1",
            Zone::TenduaPhase2 => "Tendua Phase 2",
            Zone::Tifra => "Tifra",
            Zone::Urla => "Urla",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Zone::ALL
            .iter()
            .copied()
            .find(|z| z.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown zone '{}'. Use --list-zones to see valid zones", wanted))
    }
}

impl Serialize for Zone {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Status flag carried inside an analysis document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStatus {
    Success,
    Error,
    Other(String),
}

impl From<&str> for AnalysisStatus {
    fn from(s: &str) -> Self {
        match s {
            "success" => AnalysisStatus::Success,
            "error" => AnalysisStatus::Error,
            other => AnalysisStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStatus::Success => write!(f, "success"),
            AnalysisStatus::Error => write!(f, "error"),
            AnalysisStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// The document produced by one analysis run.
///
/// The shape is owned by the backend and carries no schema version, so
/// the document is kept as raw JSON. Accessors never fail: a missing or
/// mistyped field reads as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    /// Wrap a raw JSON document.
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// Zone identifier reported by the backend.
    pub fn zone(&self) -> Option<&str> {
        self.0.get("zone").and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<AnalysisStatus> {
        self.0.get("status").and_then(Value::as_str).map(AnalysisStatus::from)
    }

    /// Error message carried by an application-level failure.
    pub fn error_message(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn images(&self) -> Option<&Map<String, Value>> {
        self.section("images")
    }

    pub fn dashboard_insights(&self) -> Option<&Map<String, Value>> {
        self.section("dashboard_insights")
    }

    pub fn groq_analysis(&self) -> Option<&Map<String, Value>> {
        self.section("groq_analysis")
    }

    pub fn metrics(&self) -> Option<&Map<String, Value>> {
        self.section("metrics")
    }

    fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }
}

impl From<Value> for AnalysisResult {
    fn from(document: Value) -> Self {
        Self::new(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zone_parse_case_insensitive() {
        assert_eq!("tifra".parse::<Zone>().unwrap(), Zone::Tifra);
        assert_eq!("Electronic EMC".parse::<Zone>().unwrap(), Zone::ElectronicEmc);
        assert_eq!(" siltara phase 2 ".parse::<Zone>().unwrap(), Zone::SiltaraPhase2);
        assert!("Atlantis".parse::<Zone>().is_err());
    }

    #[test]
    fn test_zone_serializes_as_display_name() {
        let body = serde_json::to_value(json!({ "zone": Zone::NayanpurGibarganj })).unwrap();
        assert_eq!(body["zone"], "Nayanpur-Gibarganj");
        assert_eq!(Zone::default(), Zone::Bhanpuri);
        assert_eq!(Zone::ALL.len(), 20);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(AnalysisStatus::from("success"), AnalysisStatus::Success);
        assert_eq!(AnalysisStatus::from("error"), AnalysisStatus::Error);
        assert_eq!(
            AnalysisStatus::from("skipped"),
            AnalysisStatus::Other("skipped".to_string())
        );
    }

    #[test]
    fn test_accessors_tolerate_missing_and_mistyped_fields() {
        let result = AnalysisResult::new(json!({
            "zone": 42,
            "images": "not-an-object",
            "metrics": { "match_percentage": 96.5 }
        }));
        assert_eq!(result.zone(), None);
        assert_eq!(result.status(), None);
        assert!(result.images().is_none());
        assert!(result.dashboard_insights().is_none());
        assert_eq!(result.metrics().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_transparent_serialization() {
        let doc = json!({ "status": "success", "zone": "Tifra", "extra": [1, 2, 3] });
        let result = AnalysisResult::new(doc.clone());
        let text = serde_json::to_string(&result).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }
}
