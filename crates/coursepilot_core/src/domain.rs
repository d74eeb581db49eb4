//! crates/coursepilot_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or generation
//! transport; serde derives exist because both the local store and the
//! generation adapters exchange them as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The learner's self-reported familiarity with a topic, used to pitch
/// generated course content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// A single front/back study card attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// One lesson inside a course module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Free-text notes the learner attaches after generation.
    pub notes: Option<String>,
    /// Generated on demand; `None` until the learner asks for cards.
    pub flashcards: Option<Vec<Flashcard>>,
}

/// An ordered group of lessons within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: Uuid,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

/// A generated learning unit composed of modules of lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub topic: String,
    pub level: KnowledgeLevel,
    pub modules: Vec<CourseModule>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Looks up a lesson anywhere in the course by id.
    pub fn find_lesson(&self, lesson_id: Uuid) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| l.id == lesson_id)
    }

    pub fn find_lesson_mut(&mut self, lesson_id: Uuid) -> Option<&mut Lesson> {
        self.modules
            .iter_mut()
            .flat_map(|m| m.lessons.iter_mut())
            .find(|l| l.id == lesson_id)
    }
}

/// A user-managed grouping of courses. Membership is by course id; a
/// course belongs to at most one folder (last assignment wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub course_ids: Vec<Uuid>,
}

/// One step of a project scaffold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStep {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

/// A generated project scaffold composed of ordered steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub topic: String,
    pub steps: Vec<ProjectStep>,
    pub created_at: DateTime<Utc>,
}

/// Per-course completion record: lesson id mapped to the moment it was
/// marked complete. Toggling a lesson inserts or removes its entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: Uuid,
    pub completed: BTreeMap<Uuid, DateTime<Utc>>,
}

impl CourseProgress {
    pub fn empty(course_id: Uuid) -> Self {
        Self {
            course_id,
            completed: BTreeMap::new(),
        }
    }

    /// The most recent completion timestamp in this record, if any.
    pub fn latest_activity(&self) -> Option<DateTime<Utc>> {
        self.completed.values().max().copied()
    }
}

/// Per-project completion record: step id mapped to its done flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub project_id: Uuid,
    pub completed: BTreeMap<Uuid, bool>,
}

impl ProjectProgress {
    pub fn empty(project_id: Uuid) -> Self {
        Self {
            project_id,
            completed: BTreeMap::new(),
        }
    }
}

/// Who authored a turn in a Socratic dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn in a Socratic dialogue session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A multiple-choice question in a generated assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    pub answer_index: usize,
}

/// A generated assessment for a whole course, handed to the assessment
/// view as a preloaded payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseTest {
    pub course_id: Uuid,
    pub questions: Vec<TestQuestion>,
}

/// A suggestion surfaced by the "explore related topics" session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTopic {
    pub title: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn latest_activity_picks_the_max_timestamp() {
        let mut progress = CourseProgress::empty(Uuid::new_v4());
        assert_eq!(progress.latest_activity(), None);

        let early = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        progress.completed.insert(Uuid::new_v4(), late);
        progress.completed.insert(Uuid::new_v4(), early);

        assert_eq!(progress.latest_activity(), Some(late));
    }

    #[test]
    fn find_lesson_walks_every_module() {
        let lesson_id = Uuid::new_v4();
        let course = Course {
            id: Uuid::new_v4(),
            title: "Photosynthesis".to_string(),
            topic: "Photosynthesis".to_string(),
            level: KnowledgeLevel::Beginner,
            modules: vec![
                CourseModule {
                    id: Uuid::new_v4(),
                    title: "Light reactions".to_string(),
                    lessons: vec![],
                },
                CourseModule {
                    id: Uuid::new_v4(),
                    title: "The Calvin cycle".to_string(),
                    lessons: vec![Lesson {
                        id: lesson_id,
                        title: "Carbon fixation".to_string(),
                        content: "...".to_string(),
                        notes: None,
                        flashcards: None,
                    }],
                },
            ],
            created_at: Utc::now(),
        };

        assert!(course.find_lesson(lesson_id).is_some());
        assert!(course.find_lesson(Uuid::new_v4()).is_none());
    }
}
