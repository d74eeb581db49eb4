//! services/app/src/app/state.rs
//!
//! Defines the application's shared service handles and in-memory state.

use coursepilot_core::domain::{
    ChatTurn, Course, CourseProgress, CourseTest, Folder, Project, ProjectProgress, RelatedTopic,
};
use coursepilot_core::ports::{
    AssessmentGenerationService, CourseGenerationService, FlashcardGenerationService,
    StorageService, TopicExplorationService, TutorService,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// Services (Port Handles, Created Once at Startup)
//=========================================================================================

/// The bundle of port implementations the orchestrator works against.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn StorageService>,
    pub courses: Arc<dyn CourseGenerationService>,
    pub flashcards: Arc<dyn FlashcardGenerationService>,
    pub explore: Arc<dyn TopicExplorationService>,
    pub assessments: Arc<dyn AssessmentGenerationService>,
    pub tutor: Arc<dyn TutorService>,
}

//=========================================================================================
// In-Memory Application State
//=========================================================================================

/// Where the app currently is in a course/project generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Generating,
}

/// A live Socratic dialogue. Never persisted; closing the session discards it.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    /// The passage of course text the dialogue is anchored to.
    pub subject: String,
    /// Append-only within a session.
    pub turns: Vec<ChatTurn>,
    pub loading: bool,
}

/// A live "explore related topics" modal session.
#[derive(Debug, Clone)]
pub struct ExploreSession {
    pub topic: String,
    pub results: Vec<RelatedTopic>,
    pub loading: bool,
}

/// The canonical in-memory copy of every persisted collection, plus the
/// transient UI state. The orchestrator owns one of these behind a mutex;
/// the view layer reads cloned snapshots.
#[derive(Clone, Default)]
pub struct AppData {
    // --- Persisted collections ---
    /// Newest course first.
    pub courses: Vec<Course>,
    pub folders: Vec<Folder>,
    /// Newest project first.
    pub projects: Vec<Project>,
    pub course_progress: HashMap<Uuid, CourseProgress>,
    pub project_progress: HashMap<Uuid, ProjectProgress>,

    // --- Transient UI state (never persisted) ---
    pub active_course: Option<Uuid>,
    pub active_project: Option<Uuid>,
    pub current_topic: String,
    /// The shared error slot every generation failure is formatted into.
    pub error: Option<String>,
    /// Decorative trivia shown while a generation is in flight.
    pub fun_facts: Vec<String>,
    pub phase: GenerationPhase,
    /// The single "currently generating flashcards" marker. A second
    /// invocation overwrites it; last write wins.
    pub generating_flashcards_for: Option<Uuid>,
    pub dialogue: Option<DialogueSession>,
    pub explore: Option<ExploreSession>,
    /// A generated test awaiting consumption by the assessment view.
    pub pending_test: Option<CourseTest>,
}

impl AppData {
    pub fn find_course(&self, course_id: Uuid) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn find_course_mut(&mut self, course_id: Uuid) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == course_id)
    }

    pub fn find_project(&self, project_id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    /// The folder a course currently belongs to, if any. At most one, since
    /// every assignment strips prior memberships first.
    pub fn folder_of(&self, course_id: Uuid) -> Option<&Folder> {
        self.folders.iter().find(|f| f.course_ids.contains(&course_id))
    }
}
