//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn SearchProgressCallback>`] via
//! [`crate::config::SearchConfigBuilder::progress_callback`] to be told when
//! each stage starts and finishes, and to receive every [`Notice`] as it is
//! raised. The CLI drives its spinner from these events; a web front end
//! could forward them over a socket just as well.

use crate::output::Notice;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// PDF → plain text.
    ExtractText,
    /// Resume text → language model → normalised skill list.
    ExtractSkills,
    /// Skills + filters → search URL.
    BuildQuery,
    /// Search URL → job listings.
    Scrape,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ExtractText => "Reading resume",
            Stage::ExtractSkills => "Extracting skills",
            Stage::BuildQuery => "Building query",
            Stage::Scrape => "Searching jobs",
        };
        f.write_str(s)
    }
}

/// Called by the search pipeline as it moves through its stages.
///
/// All methods default to no-ops so implementors override only what they
/// need.
pub trait SearchProgressCallback: Send + Sync {
    /// Called just before a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes, with a one-line summary
    /// (e.g. "12 skills", "25 listings").
    fn on_stage_complete(&self, stage: Stage, summary: &str) {
        let _ = (stage, summary);
    }

    /// Called for every soft failure the pipeline recovers from.
    fn on_notice(&self, notice: &Notice) {
        let _ = notice;
    }
}

/// A no-op implementation, the default when no callback is configured.
pub struct NoopProgressCallback;

impl SearchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SearchConfig`].
pub type ProgressCallback = Arc<dyn SearchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SearchProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage}"));
        }

        fn on_stage_complete(&self, stage: Stage, summary: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {stage}: {summary}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Scrape);
        cb.on_stage_complete(Stage::Scrape, "0 listings");
        cb.on_notice(&Notice::NoListings);
    }

    #[test]
    fn recorder_sees_events_in_order() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::ExtractSkills);
        rec.on_stage_complete(Stage::ExtractSkills, "3 skills");
        let events = rec.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "start Extracting skills".to_string(),
                "done Extracting skills: 3 skills".to_string()
            ]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(Stage::ExtractText);
    }
}
