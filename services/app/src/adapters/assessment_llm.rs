//! services/app/src/adapters/assessment_llm.rs
//!
//! This module contains the adapter for the test-generating LLM.
//! It implements the `AssessmentGenerationService` port from the `core` crate.

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
use coursepilot_core::{
    domain::{Course, CourseTest, TestQuestion},
    ports::{AssessmentGenerationService, PortError, PortResult},
};
use serde::Deserialize;
use std::fmt::Write;

use super::extract_json;

const TEST_INSTRUCTIONS: &str = r#"You write end-of-course assessments.
Given a course outline, produce a multiple-choice test covering the whole course.

Respond with ONLY a JSON array (no prose, no code fences) of this shape:
[
  { "prompt": "the question", "choices": ["A", "B", "C", "D"], "answer_index": 0 }
]

Guidelines:
- 8 to 12 questions, spread across every module.
- Exactly 4 choices per question; answer_index is the 0-based index of the
  correct choice.
- Distractors must be plausible, not jokes."#;

#[derive(Deserialize)]
struct QuestionDraft {
    prompt: String,
    choices: Vec<String>,
    answer_index: usize,
}

/// An adapter that implements `AssessmentGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAssessmentAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAssessmentAdapter {
    /// Creates a new `OpenAiAssessmentAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Flattens a course into the outline the prompt expects. Lesson content
    /// is truncated; titles carry most of the signal for question coverage.
    fn outline(course: &Course) -> String {
        let mut out = format!("COURSE: {} (topic: {})\n", course.title, course.topic);
        for module in &course.modules {
            let _ = writeln!(out, "MODULE: {}", module.title);
            for lesson in &module.lessons {
                let preview: String = lesson.content.chars().take(400).collect();
                let _ = writeln!(out, "  LESSON: {}\n  {}", lesson.title, preview);
            }
        }
        out
    }
}

#[async_trait]
impl AssessmentGenerationService for OpenAiAssessmentAdapter {
    async fn generate_test(&self, course: &Course) -> PortResult<CourseTest> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(TEST_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::outline(course))
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

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Assessment LLM returned no text content.".to_string())
            })?;

        let drafts: Vec<QuestionDraft> = serde_json::from_str(extract_json(&raw)).map_err(|e| {
            PortError::Unexpected(format!("Assessment LLM returned malformed JSON: {e}"))
        })?;

        let questions = drafts
            .into_iter()
            .map(|q| {
                if q.answer_index >= q.choices.len() {
                    return Err(PortError::Unexpected(format!(
                        "Assessment LLM produced an out-of-range answer index for '{}'",
                        q.prompt
                    )));
                }
                Ok(TestQuestion {
                    prompt: q.prompt,
                    choices: q.choices,
                    answer_index: q.answer_index,
                })
            })
            .collect::<PortResult<Vec<_>>>()?;

        Ok(CourseTest {
            course_id: course.id,
            questions,
        })
    }
}
