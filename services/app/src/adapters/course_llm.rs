//! services/app/src/adapters/course_llm.rs
//!
//! This module contains the adapter for the course and project synthesis LLM.
//! It implements the `CourseGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use chrono::Utc;
use coursepilot_core::{
    domain::{Course, CourseModule, KnowledgeLevel, Lesson, Project, ProjectStep},
    ports::{CourseGenerationService, PortError, PortResult},
};
use serde::Deserialize;
use uuid::Uuid;

use super::extract_json;

const COURSE_INSTRUCTIONS: &str = r#"You are a curriculum designer for a self-study app.
Given a topic and the learner's knowledge level, design a complete course.

Respond with ONLY a JSON object (no prose, no code fences) of this shape:
{
  "title": "course title",
  "modules": [
    {
      "title": "module title",
      "lessons": [
        { "title": "lesson title", "content": "2-4 paragraphs of lesson text in Markdown" }
      ]
    }
  ]
}

Guidelines:
- 3 to 5 modules, each with 2 to 4 lessons, ordered from fundamentals to depth.
- Pitch the prose to the stated knowledge level; a beginner gets plain language,
  an advanced learner gets precise terminology and fewer analogies.
- Lesson content must be self-contained study text, not an outline."#;

const PROJECT_INSTRUCTIONS: &str = r#"You are a project mentor for a self-study app.
Given a topic, design a hands-on project that exercises it.

Respond with ONLY a JSON object (no prose, no code fences) of this shape:
{
  "title": "project title",
  "steps": [
    { "title": "step title", "description": "what to do and what done looks like" }
  ]
}

Guidelines:
- 5 to 10 ordered steps, each independently checkable.
- The first step sets up, the last step reflects on the result."#;

//=========================================================================================
// "Impure" Draft Structs (LLM wire shape, ids assigned on conversion)
//=========================================================================================

#[derive(Deserialize)]
struct LessonDraft {
    title: String,
    content: String,
}

#[derive(Deserialize)]
struct ModuleDraft {
    title: String,
    lessons: Vec<LessonDraft>,
}

#[derive(Deserialize)]
struct CourseDraft {
    title: String,
    modules: Vec<ModuleDraft>,
}

impl CourseDraft {
    fn into_domain(self, topic: &str, level: KnowledgeLevel) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: self.title,
            topic: topic.to_string(),
            level,
            modules: self
                .modules
                .into_iter()
                .map(|m| CourseModule {
                    id: Uuid::new_v4(),
                    title: m.title,
                    lessons: m
                        .lessons
                        .into_iter()
                        .map(|l| Lesson {
                            id: Uuid::new_v4(),
                            title: l.title,
                            content: l.content,
                            notes: None,
                            flashcards: None,
                        })
                        .collect(),
                })
                .collect(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Deserialize)]
struct StepDraft {
    title: String,
    description: String,
}

#[derive(Deserialize)]
struct ProjectDraft {
    title: String,
    steps: Vec<StepDraft>,
}

impl ProjectDraft {
    fn into_domain(self, topic: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: self.title,
            topic: topic.to_string(),
            steps: self
                .steps
                .into_iter()
                .map(|s| ProjectStep {
                    id: Uuid::new_v4(),
                    title: s.title,
                    description: s.description,
                })
                .collect(),
            created_at: Utc::now(),
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CourseGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCourseAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCourseAdapter {
    /// Creates a new `OpenAiCourseAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn complete(&self, instructions: &str, user_input: String) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instructions)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Generation LLM returned no text content.".to_string())
            })
    }
}

//=========================================================================================
// `CourseGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CourseGenerationService for OpenAiCourseAdapter {
    async fn generate_course(&self, topic: &str, level: KnowledgeLevel) -> PortResult<Course> {
        let level_label = match level {
            KnowledgeLevel::Beginner => "beginner",
            KnowledgeLevel::Intermediate => "intermediate",
            KnowledgeLevel::Advanced => "advanced",
        };
        let user_input = format!("TOPIC: {topic}\nKNOWLEDGE LEVEL: {level_label}");

        let raw = self.complete(COURSE_INSTRUCTIONS, user_input).await?;
        let draft: CourseDraft = serde_json::from_str(extract_json(&raw)).map_err(|e| {
            PortError::Unexpected(format!("Course LLM returned malformed JSON: {e}"))
        })?;

        Ok(draft.into_domain(topic, level))
    }

    async fn generate_project(&self, topic: &str) -> PortResult<Project> {
        let user_input = format!("TOPIC: {topic}");

        let raw = self.complete(PROJECT_INSTRUCTIONS, user_input).await?;
        let draft: ProjectDraft = serde_json::from_str(extract_json(&raw)).map_err(|e| {
            PortError::Unexpected(format!("Project LLM returned malformed JSON: {e}"))
        })?;

        Ok(draft.into_domain(topic))
    }
}
