//! Image-based views: the analysis gallery and the encroachment map.

use crate::models::AnalysisResult;
use crate::views::{image_url, text, ViewModel};
use serde::Serialize;

/// Map shown before any analysis provides one.
pub const PLACEHOLDER_MAP_URL: &str = "https://images.unsplash.com/photo-1546833998-07256bcc76ad?crop=entropy&cs=tinysrgb&fit=max&fm=jpg&q=80&w=1080";

/// Image slots in gallery order: (document key, label, description).
const GALLERY_SLOTS: [(&str, &str, &str); 7] = [
    (
        "industrial_area",
        "Industrial Area Map",
        "Official CSIDC approved layout map",
    ),
    (
        "satellite_past",
        "Past Satellite Image",
        "Satellite imagery from 2 years ago",
    ),
    (
        "satellite_present",
        "Present Satellite Image",
        "Current satellite imagery",
    ),
    (
        "encroachment_analysis",
        "Encroachment Analysis",
        "AI-detected boundary compliance (Green=Match, Yellow=Past, Blue=Present)",
    ),
    (
        "past_overlay",
        "Past Overlay",
        "Approved boundaries overlaid on past satellite",
    ),
    (
        "present_overlay",
        "Present Overlay",
        "Approved boundaries overlaid on current satellite",
    ),
    (
        "osm",
        "OpenStreetMap View",
        "OSM road and infrastructure overlay",
    ),
];

/// One generated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub filename: String,
    pub url: String,
}

impl GalleryImage {
    /// Suggested file name when saving the image for `zone`.
    pub fn download_name(&self, zone: &str) -> String {
        let label = self.label.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{}_{}.png", zone, label)
    }
}

/// The images produced by the last run. Slots without a filename are
/// left out; the zone defaults to "selected zone".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageGalleryView {
    pub zone: String,
    pub images: Vec<GalleryImage>,
}

impl ImageGalleryView {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ViewModel for ImageGalleryView {
    const NAME: &'static str = "image gallery";

    fn derive(result: &AnalysisResult, api_base: &str) -> Self {
        let images = result.images();
        let images = GALLERY_SLOTS
            .iter()
            .filter_map(|&(key, label, description)| {
                let filename = text(images, key)?;
                Some(GalleryImage {
                    key,
                    label,
                    description,
                    url: image_url(api_base, &filename),
                    filename,
                })
            })
            .collect();

        Self {
            zone: result.zone().unwrap_or("selected zone").to_string(),
            images,
        }
    }
}

/// Backdrop for the encroachment map: the superimposed image if present,
/// then the industrial-area map, then a fixed placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncroachmentMapView {
    pub image_url: String,
    pub is_placeholder: bool,
}

impl ViewModel for EncroachmentMapView {
    const NAME: &'static str = "encroachment map";

    fn derive(result: &AnalysisResult, api_base: &str) -> Self {
        let images = result.images();
        match text(images, "superimposed").or_else(|| text(images, "industrial_area")) {
            Some(filename) => Self {
                image_url: image_url(api_base, &filename),
                is_placeholder: false,
            },
            None => Self {
                image_url: PLACEHOLDER_MAP_URL.to_string(),
                is_placeholder: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://localhost:5000";

    #[test]
    fn test_gallery_keeps_order_and_skips_missing() {
        let result = AnalysisResult::new(json!({
            "zone": "Kapan",
            "images": {
                "osm": "kapan_osm.png",
                "industrial_area": "kapan_map.png",
                "satellite_past": null,
                "satellite_present": "",
                "past_overlay": 7
            }
        }));

        let view = ImageGalleryView::derive(&result, BASE);

        let keys: Vec<_> = view.images.iter().map(|i| i.key).collect();
        assert_eq!(keys, vec!["industrial_area", "osm"]);
        assert_eq!(view.images[0].url, "http://localhost:5000/api/images/kapan_map.png");
        assert_eq!(view.zone, "Kapan");
    }

    #[test]
    fn test_gallery_on_empty_document() {
        let view = ImageGalleryView::derive(&AnalysisResult::new(json!({})), BASE);
        assert!(view.is_empty());
        assert_eq!(view.zone, "selected zone");
    }

    #[test]
    fn test_download_name() {
        let result = AnalysisResult::new(json!({
            "images": { "encroachment_analysis": "x.png" }
        }));
        let view = ImageGalleryView::derive(&result, BASE);
        assert_eq!(
            view.images[0].download_name("Tifra"),
            "Tifra_Encroachment_Analysis.png"
        );
    }

    #[test]
    fn test_map_prefers_superimposed() {
        let result = AnalysisResult::new(json!({
            "images": { "superimposed": "sup.png", "industrial_area": "area.png" }
        }));
        let view = EncroachmentMapView::derive(&result, BASE);
        assert_eq!(view.image_url, "http://localhost:5000/api/images/sup.png");
        assert!(!view.is_placeholder);
    }

    #[test]
    fn test_map_falls_back() {
        let area_only = AnalysisResult::new(json!({ "images": { "industrial_area": "area.png" } }));
        assert_eq!(
            EncroachmentMapView::derive(&area_only, BASE).image_url,
            "http://localhost:5000/api/images/area.png"
        );

        let nothing = EncroachmentMapView::derive(&AnalysisResult::new(json!({ "images": null })), BASE);
        assert!(nothing.is_placeholder);
        assert_eq!(nothing.image_url, PLACEHOLDER_MAP_URL);
    }
}
