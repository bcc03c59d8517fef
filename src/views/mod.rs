//! Consumer views over the shared analysis result.
//!
//! Every view derives its own typed model from the opaque document, with
//! a documented default for each field it reads. [`MountedView`] wires a
//! view to the store and the broadcaster: it catches up from the store
//! when mounted and follows every publish until it is unmounted.

pub mod images;
pub mod insights;
pub mod summary;

pub use images::{EncroachmentMapView, ImageGalleryView};
pub use insights::{ComplianceLevel, InsightsView, RiskLevel};
pub use summary::AnalysisSummaryView;

use crate::broadcast::{Broadcaster, Subscription};
use crate::models::AnalysisResult;
use crate::store::ResultStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// A display model derived from an analysis document.
pub trait ViewModel: Clone + Send + 'static {
    /// Name used in logs.
    const NAME: &'static str;

    /// Build the model. Must not fail on any document shape.
    fn derive(result: &AnalysisResult, api_base: &str) -> Self;
}

/// What a mounted view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<V> {
    Empty,
    Populated(V),
}

/// A view attached to the result store and broadcaster.
pub struct MountedView<V: ViewModel> {
    state: Arc<Mutex<ViewState<V>>>,
    subscription: Subscription,
}

impl<V: ViewModel> MountedView<V> {
    /// Attach a view.
    ///
    /// The listener is registered before the store is read, so a result
    /// published in between is not missed; the stored value is only used
    /// if no publish has populated the view yet.
    pub fn mount(store: &ResultStore, broadcaster: &Broadcaster, api_base: &str) -> Self {
        let state = Arc::new(Mutex::new(ViewState::Empty));

        let listener_state = Arc::clone(&state);
        let base = api_base.to_string();
        let subscription = broadcaster.subscribe(move |result| {
            let model = V::derive(result, &base);
            *listener_state.lock().unwrap_or_else(PoisonError::into_inner) =
                ViewState::Populated(model);
            debug!("{} view updated", V::NAME);
        });

        if let Some(stored) = store.get() {
            let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(*current, ViewState::Empty) {
                *current = ViewState::Populated(V::derive(&stored, api_base));
                debug!("{} view populated from stored result", V::NAME);
            }
        }

        Self {
            state,
            subscription,
        }
    }

    pub fn state(&self) -> ViewState<V> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current model, if the view is populated.
    pub fn current(&self) -> Option<V> {
        match self.state() {
            ViewState::Populated(model) => Some(model),
            ViewState::Empty => None,
        }
    }

    /// Detach the view. No further updates reach it.
    pub fn unmount(self) -> ViewState<V> {
        let Self {
            state,
            subscription,
        } = self;
        subscription.unsubscribe();
        let last = state.lock().unwrap_or_else(PoisonError::into_inner).clone();
        last
    }
}

/// The dashboard's consumer views, mounted together.
pub struct Dashboard {
    summary: MountedView<AnalysisSummaryView>,
    gallery: MountedView<ImageGalleryView>,
    map: MountedView<EncroachmentMapView>,
    insights: MountedView<InsightsView>,
}

/// What every dashboard view shows at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub last_updated: Option<DateTime<Utc>>,
    pub summary: Option<AnalysisSummaryView>,
    pub gallery: Option<ImageGalleryView>,
    pub map: Option<EncroachmentMapView>,
    pub insights: Option<InsightsView>,
}

impl DashboardSnapshot {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
    }
}

impl Dashboard {
    pub fn mount(store: &ResultStore, broadcaster: &Broadcaster, api_base: &str) -> Self {
        Self {
            summary: MountedView::mount(store, broadcaster, api_base),
            gallery: MountedView::mount(store, broadcaster, api_base),
            map: MountedView::mount(store, broadcaster, api_base),
            insights: MountedView::mount(store, broadcaster, api_base),
        }
    }

    pub fn snapshot(&self, last_updated: Option<DateTime<Utc>>) -> DashboardSnapshot {
        DashboardSnapshot {
            last_updated,
            summary: self.summary.current(),
            gallery: self.gallery.current(),
            map: self.map.current(),
            insights: self.insights.current(),
        }
    }

    pub fn unmount(self) {
        self.summary.unmount();
        self.gallery.unmount();
        self.map.unmount();
        self.insights.unmount();
    }
}

/// `{base}/api/images/{filename}`.
pub fn image_url(api_base: &str, filename: &str) -> String {
    format!("{}/api/images/{}", api_base.trim_end_matches('/'), filename)
}

/// A non-empty string field.
fn text(section: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    section?
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// A numeric field, `0.0` when missing or not a number.
fn number(section: Option<&Map<String, Value>>, key: &str) -> f64 {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// The string entries of an array field; anything else is empty.
fn text_list(section: Option<&Map<String, Value>>, key: &str) -> Vec<String> {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use serde_json::json;

    fn setup() -> (ResultStore, Broadcaster) {
        (
            ResultStore::new(Arc::new(MemoryStorage::new())),
            Broadcaster::new(),
        )
    }

    fn result(zone: &str) -> AnalysisResult {
        AnalysisResult::new(json!({ "status": "success", "zone": zone, "images": {} }))
    }

    #[test]
    fn test_mount_without_stored_result_is_empty() {
        let (store, broadcaster) = setup();
        let view: MountedView<AnalysisSummaryView> =
            MountedView::mount(&store, &broadcaster, "http://localhost:5000");
        assert_eq!(view.state(), ViewState::Empty);
        assert!(view.current().is_none());
    }

    #[test]
    fn test_mount_catches_up_from_store() {
        let (store, broadcaster) = setup();
        store.put(&result("Tifra")).unwrap();

        let view: MountedView<AnalysisSummaryView> =
            MountedView::mount(&store, &broadcaster, "http://localhost:5000");
        assert_eq!(view.current().unwrap().zone, "Tifra");
    }

    #[test]
    fn test_publish_moves_view_to_new_result() {
        let (store, broadcaster) = setup();
        store.put(&result("Borai")).unwrap();
        let view: MountedView<AnalysisSummaryView> =
            MountedView::mount(&store, &broadcaster, "http://localhost:5000");

        let next = result("Urla");
        store.put(&next).unwrap();
        broadcaster.publish(&next);

        assert_eq!(view.current().unwrap().zone, "Urla");
    }

    #[test]
    fn test_unmounted_view_stops_listening() {
        let (store, broadcaster) = setup();
        let view: MountedView<AnalysisSummaryView> =
            MountedView::mount(&store, &broadcaster, "http://localhost:5000");
        assert_eq!(broadcaster.listener_count(), 1);

        broadcaster.publish(&result("Kapan"));
        let last = view.unmount();

        assert_eq!(broadcaster.listener_count(), 0);
        assert!(matches!(last, ViewState::Populated(ref v) if v.zone == "Kapan"));
        assert_eq!(broadcaster.publish(&result("Urla")), 0);
    }

    #[test]
    fn test_views_derive_independently() {
        let (store, broadcaster) = setup();
        let summary: MountedView<AnalysisSummaryView> =
            MountedView::mount(&store, &broadcaster, "http://api");
        let map: MountedView<EncroachmentMapView> =
            MountedView::mount(&store, &broadcaster, "http://api");

        broadcaster.publish(&AnalysisResult::new(json!({
            "zone": "Tifra",
            "images": { "industrial_area": "tifra.png" }
        })));

        assert_eq!(summary.current().unwrap().zone, "Tifra");
        assert_eq!(map.current().unwrap().image_url, "http://api/api/images/tifra.png");
    }

    #[test]
    fn test_dashboard_mount_and_unmount() {
        let (store, broadcaster) = setup();
        let dashboard = Dashboard::mount(&store, &broadcaster, "http://api");
        assert_eq!(broadcaster.listener_count(), 4);
        assert!(dashboard.snapshot(None).is_empty());

        let next = AnalysisResult::new(json!({
            "status": "success",
            "zone": "Tifra",
            "images": { "osm": "tifra_osm.png" }
        }));
        store.put(&next).unwrap();
        broadcaster.publish(&next);

        let snapshot = dashboard.snapshot(store.last_updated());
        assert_eq!(snapshot.summary.unwrap().zone, "Tifra");
        assert_eq!(snapshot.gallery.unwrap().images.len(), 1);
        assert!(snapshot.map.unwrap().is_placeholder);
        assert!(!snapshot.insights.unwrap().has_content());
        assert!(snapshot.last_updated.is_some());

        dashboard.unmount();
        assert_eq!(broadcaster.listener_count(), 0);
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("http://localhost:5000/", "a.png"),
            "http://localhost:5000/api/images/a.png"
        );
    }

    #[test]
    fn test_field_helpers_default() {
        let section = json!({
            "s": "  ",
            "n": "12",
            "list": ["101", 102, null, ""]
        });
        let map = section.as_object();
        assert_eq!(text(map, "s"), None);
        assert_eq!(text(None, "s"), None);
        assert_eq!(number(map, "n"), 0.0);
        assert_eq!(text_list(map, "list"), vec!["101", "102"]);
        assert!(text_list(map, "missing").is_empty());
    }
}
