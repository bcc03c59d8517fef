//! Terminal feedback for analysis runs.

use crate::models::Zone;
use crate::trigger::{RunOutcome, TriggerHooks};
use crate::views::{AnalysisSummaryView, ViewModel};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Shows a spinner while a run is in flight and a one-line verdict after.
pub struct ConsoleHooks {
    spinner: Mutex<Option<ProgressBar>>,
    show_progress: bool,
}

impl ConsoleHooks {
    pub fn new(show_progress: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            show_progress,
        }
    }

    fn finish_spinner(&self) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_and_clear();
        }
    }
}

impl TriggerHooks for ConsoleHooks {
    fn on_start(&self, zone: Zone) {
        if !self.show_progress {
            return;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("Analyzing {}...", zone));
        pb.enable_steady_tick(Duration::from_millis(120));

        *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_complete(&self, outcome: &RunOutcome) {
        self.finish_spinner();
        if !self.show_progress {
            return;
        }

        let summary = AnalysisSummaryView::derive(outcome.result(), "");
        if outcome.is_published() {
            println!("✅ Analysis Complete: {}", summary.zone);
            println!("   {} images generated", summary.images_generated);
        } else {
            println!(
                "⚠️  Analysis for {} finished after a newer run; result discarded",
                summary.zone
            );
        }
    }

    fn on_error(&self, _message: &str) {
        self.finish_spinner();
    }
}
