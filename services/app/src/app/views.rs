//! services/app/src/app/views.rs
//!
//! Defines the view-transition boundary between the orchestrator and the
//! (out-of-scope) render layer. The orchestrator never renders; it only
//! requests one of a fixed set of named views through an injected sink.

use tracing::info;

/// The named view states the orchestrator can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The "please wait" screen shown while a course or project is synthesized.
    Generating,
    /// The main dashboard / canvas.
    Canvas,
    /// A single course with its modules and lessons.
    CourseDetail,
    /// The preloaded-test screen.
    Assessment,
    /// The project list.
    Projects,
    /// A single project with its steps.
    ProjectDetail,
}

/// The render layer's half of the contract: accept transition requests.
pub trait ViewSink: Send + Sync {
    fn transition(&self, view: View);
}

/// A sink that only logs transitions. Used by front ends that render from
/// polled snapshots rather than pushed transitions.
pub struct TracingViewSink;

impl ViewSink for TracingViewSink {
    fn transition(&self, view: View) {
        info!("View transition requested: {:?}", view);
    }
}
