//! services/app/src/adapters/explore_llm.rs
//!
//! This module contains the adapter for the exploratory LLM calls: related
//! topic suggestions and the decorative fun facts shown while a generation
//! is in flight. It implements the `TopicExplorationService` port.

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
    domain::RelatedTopic,
    ports::{PortError, PortResult, TopicExplorationService},
};

use super::extract_json;

const RELATED_TOPICS_INSTRUCTIONS: &str = r#"You suggest what to study next.
Given a topic the learner just studied, suggest adjacent topics.

Respond with ONLY a JSON array (no prose, no code fences) of this shape:
[
  { "title": "topic name", "description": "one sentence on why it's a natural next step" }
]

Suggest 4 to 6 topics, ordered from most to least adjacent."#;

const FUN_FACTS_INSTRUCTIONS: &str = r#"You write trivia for a loading screen.
Given a topic, produce surprising, true, one-sentence facts about it.

Respond with ONLY a JSON array of strings (no prose, no code fences), e.g.:
["fact one", "fact two"]

Produce exactly 5 facts. Each must stand alone and fit on one line."#;

/// An adapter that implements `TopicExplorationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiExploreAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiExploreAdapter {
    /// Creates a new `OpenAiExploreAdapter`.
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
                PortError::Unexpected("Exploration LLM returned no text content.".to_string())
            })
    }
}

#[async_trait]
impl TopicExplorationService for OpenAiExploreAdapter {
    async fn related_topics(&self, topic: &str) -> PortResult<Vec<RelatedTopic>> {
        let raw = self
            .complete(RELATED_TOPICS_INSTRUCTIONS, format!("TOPIC: {topic}"))
            .await?;

        serde_json::from_str(extract_json(&raw)).map_err(|e| {
            PortError::Unexpected(format!("Related-topics LLM returned malformed JSON: {e}"))
        })
    }

    async fn fun_facts(&self, topic: &str) -> PortResult<Vec<String>> {
        let raw = self
            .complete(FUN_FACTS_INSTRUCTIONS, format!("TOPIC: {topic}"))
            .await?;

        serde_json::from_str(extract_json(&raw)).map_err(|e| {
            PortError::Unexpected(format!("Fun-fact LLM returned malformed JSON: {e}"))
        })
    }
}
