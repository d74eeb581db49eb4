pub mod orchestrator;
pub mod state;
pub mod views;

// Re-export the main entry points to make them easily accessible
// to the binary and to integration tests.
pub use orchestrator::App;
pub use state::{AppData, DialogueSession, ExploreSession, GenerationPhase, Services};
pub use views::{TracingViewSink, View, ViewSink};
