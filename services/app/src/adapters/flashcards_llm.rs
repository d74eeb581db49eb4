//! services/app/src/adapters/flashcards_llm.rs
//!
//! This module contains the adapter for the flashcard-generating LLM.
//! It implements the `FlashcardGenerationService` port from the `core` crate.

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
    domain::{Flashcard, Lesson},
    ports::{FlashcardGenerationService, PortError, PortResult},
};

use super::extract_json;

const FLASHCARD_INSTRUCTIONS: &str = r#"You are a study-card author.
Given a lesson, produce flashcards that test its key facts and ideas.

Respond with ONLY a JSON array (no prose, no code fences) of this shape:
[
  { "front": "question or prompt", "back": "short answer" }
]

Guidelines:
- 4 to 8 cards per lesson, each testing one atomic fact.
- Fronts are questions a learner could be asked cold; backs are answers,
  not essays."#;

/// An adapter that implements `FlashcardGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiFlashcardAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiFlashcardAdapter {
    /// Creates a new `OpenAiFlashcardAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl FlashcardGenerationService for OpenAiFlashcardAdapter {
    /// Generates a set of study cards from a single lesson's content.
    async fn generate_flashcards(&self, lesson: &Lesson) -> PortResult<Vec<Flashcard>> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(FLASHCARD_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "LESSON TITLE: {}\n\nLESSON CONTENT:\n{}",
                    lesson.title, lesson.content
                ))
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
                PortError::Unexpected("Flashcard LLM returned no text content.".to_string())
            })?;

        serde_json::from_str(extract_json(&raw)).map_err(|e| {
            PortError::Unexpected(format!("Flashcard LLM returned malformed JSON: {e}"))
        })
    }
}
