//! crates/coursepilot_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the local
//! store or the generation backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ChatTurn, Course, CourseProgress, CourseTest, Flashcard, Folder, KnowledgeLevel, Lesson,
    Project, ProjectProgress, RelatedTopic,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the
/// store, the generation backend).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Port
//=========================================================================================

/// Key-value persistence of courses, folders, projects and their progress
/// records. Operations are per collection; there is no cross-collection
/// transactionality, so a cascading delete is a sequence of independent
/// writes.
#[async_trait]
pub trait StorageService: Send + Sync {
    // --- Courses ---
    async fn load_courses(&self) -> PortResult<Vec<Course>>;
    async fn save_course(&self, course: &Course) -> PortResult<()>;
    async fn delete_course(&self, course_id: Uuid) -> PortResult<()>;

    // --- Folders (always persisted as a whole set) ---
    async fn load_folders(&self) -> PortResult<Vec<Folder>>;
    async fn save_folders(&self, folders: &[Folder]) -> PortResult<()>;

    // --- Projects ---
    async fn load_projects(&self) -> PortResult<Vec<Project>>;
    async fn save_project(&self, project: &Project) -> PortResult<()>;
    async fn delete_project(&self, project_id: Uuid) -> PortResult<()>;

    // --- Course progress ---
    async fn load_course_progress(&self) -> PortResult<Vec<CourseProgress>>;

    /// Read-modify-write of a single progress record: inserts the lesson's
    /// completion timestamp if absent, removes it if present. Returns the
    /// updated record.
    async fn toggle_lesson(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> PortResult<CourseProgress>;

    async fn delete_course_progress(&self, course_id: Uuid) -> PortResult<()>;

    // --- Project progress ---
    async fn load_project_progress(&self) -> PortResult<Vec<ProjectProgress>>;

    /// Same toggle semantics as `toggle_lesson`, for project steps.
    async fn toggle_step(&self, project_id: Uuid, step_id: Uuid) -> PortResult<ProjectProgress>;

    async fn delete_project_progress(&self, project_id: Uuid) -> PortResult<()>;
}

//=========================================================================================
// Generation Ports
//=========================================================================================
// One attempt per call. No retry, backoff, or rate limiting lives behind
// these traits; a failure is reported once and the caller decides.
//=========================================================================================

#[async_trait]
pub trait CourseGenerationService: Send + Sync {
    /// Synthesizes a full course (modules and lessons) for a topic.
    async fn generate_course(&self, topic: &str, level: KnowledgeLevel) -> PortResult<Course>;

    /// Synthesizes a project scaffold (ordered steps) for a topic.
    async fn generate_project(&self, topic: &str) -> PortResult<Project>;
}

#[async_trait]
pub trait FlashcardGenerationService: Send + Sync {
    /// Generates a set of study cards from a single lesson's content.
    async fn generate_flashcards(&self, lesson: &Lesson) -> PortResult<Vec<Flashcard>>;
}

#[async_trait]
pub trait TopicExplorationService: Send + Sync {
    /// Suggests adjacent topics worth studying next.
    async fn related_topics(&self, topic: &str) -> PortResult<Vec<RelatedTopic>>;

    /// Decorative trivia shown while a generation is in flight. Callers are
    /// expected to swallow failures from this operation.
    async fn fun_facts(&self, topic: &str) -> PortResult<Vec<String>>;
}

#[async_trait]
pub trait AssessmentGenerationService: Send + Sync {
    /// Builds a multiple-choice test covering a whole course.
    async fn generate_test(&self, course: &Course) -> PortResult<CourseTest>;
}

#[async_trait]
pub trait TutorService: Send + Sync {
    /// Produces the model's next turn in a Socratic dialogue, seeded with
    /// the subject text and the full prior history (newest turn last).
    async fn next_turn(&self, subject: &str, history: &[ChatTurn]) -> PortResult<ChatTurn>;
}
