//! services/app/src/adapters/tutor_llm.rs
//!
//! This module contains the adapter for the Socratic-dialogue LLM.
//! It implements the `TutorService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use coursepilot_core::{
    domain::{ChatRole, ChatTurn},
    ports::{PortError, PortResult, TutorService},
};

const SOCRATIC_INSTRUCTIONS: &str = r#"You are a Socratic tutor.
The learner has selected a passage of course material (the SUBJECT below) and
wants to understand it more deeply through guided questioning.

Your style:
- Never lecture. Respond to each learner message with a short reflection on
  their thinking, then ONE probing question that moves them forward.
- If the learner is stuck, narrow the question rather than answering it.
- If the learner reaches a correct conclusion, confirm it plainly and open
  the next line of inquiry.
- Stay anchored to the SUBJECT; decline tangents gently by steering back.
- Keep every reply under 120 words.

SUBJECT:
{subject}"#;

/// An adapter that implements `TutorService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTutorAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTutorAdapter {
    /// Creates a new `OpenAiTutorAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl TutorService for OpenAiTutorAdapter {
    /// Produces the model's next turn, replaying the full session history so
    /// the model sees the whole dialogue every time.
    async fn next_turn(&self, subject: &str, history: &[ChatTurn]) -> PortResult<ChatTurn> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 1);

        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SOCRATIC_INSTRUCTIONS.replace("{subject}", subject))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );

        for turn in history {
            let message = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
                ChatRole::Model => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

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

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Tutor LLM returned no text content.".to_string())
            })?;

        Ok(ChatTurn::model(content.trim().to_string()))
    }
}
