//! The external ranking model behind the candidate matcher.

use async_trait::async_trait;
use serde_json::json;

use crate::error::Result;
use crate::openai::OpenAiChat;

/// A model that answers a ranking prompt with free-form text.
///
/// The matcher builds the prompt and interprets the reply; the model is
/// only responsible for transport. Keeping the seam here means the
/// matcher stays deterministic given a fixed reply.
#[async_trait]
pub trait RankingModel: Send + Sync {
    /// Send the assembled ranking prompt and return the raw reply text.
    async fn rank(&self, prompt: &str) -> Result<String>;
}

/// [`RankingModel`] backed by the OpenAI chat completions API.
pub struct OpenAiRanker {
    chat: OpenAiChat,
}

impl OpenAiRanker {
    pub fn new(chat: OpenAiChat) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl RankingModel for OpenAiRanker {
    async fn rank(&self, prompt: &str) -> Result<String> {
        let messages = vec![json!({ "role": "user", "content": prompt })];
        self.chat.complete(messages, 300).await
    }
}
