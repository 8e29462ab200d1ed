//! Image identification through a vision-capable model.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use snapcart_core::ItemDescription;
use tracing::{info, warn};

use crate::error::Result;
use crate::json::extract_json_object;
use crate::openai::OpenAiChat;

/// Prompt instructing the model to answer with the item-description
/// JSON shape the rest of the pipeline consumes.
const IDENTIFY_PROMPT: &str = r#"Analyze this image and identify the item.

Return your response in this exact JSON format:
{
    "identified_item": "Specific product name (e.g., 'Red Bull Energy Drink', 'Erlenmeyer Flask 250ml', 'Beaker 500ml'), or 'Not Found' if unclear",
    "confidence": "High/Medium/Low",
    "item_type": "General category (e.g., Beverage, Flask, Bottle, Filter, etc.)",
    "key_features": ["feature1", "feature2", "feature3"],
    "notes": "Any additional observations"
}

Be specific and descriptive with the product name. Identify ANY item that could be sold in a store."#;

/// A model that turns image bytes into a structured item description.
///
/// This is an external, non-deterministic dependency; everything after
/// it in the pipeline is deterministic given its output.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Identify the item pictured in `image`.
    ///
    /// Implementations degrade to [`ItemDescription::not_found`] when
    /// the model answers but the answer cannot be interpreted; transport
    /// failures surface as errors for the caller to absorb.
    async fn identify(&self, image: &[u8]) -> Result<ItemDescription>;
}

/// [`VisionModel`] backed by the OpenAI chat completions API.
pub struct OpenAiVision {
    chat: OpenAiChat,
}

impl OpenAiVision {
    pub fn new(chat: OpenAiChat) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    async fn identify(&self, image: &[u8]) -> Result<ItemDescription> {
        let data_uri = format!("data:image/jpeg;base64,{}", BASE64.encode(image));

        let messages = vec![json!({
            "role": "user",
            "content": [
                { "type": "text", "text": IDENTIFY_PROMPT },
                { "type": "image_url", "image_url": { "url": data_uri } },
            ],
        })];

        let reply = self.chat.complete(messages, 500).await?;

        let description = match extract_json_object(&reply) {
            Some(object) => match serde_json::from_str::<ItemDescription>(object) {
                Ok(description) => description,
                Err(e) => {
                    warn!(error = %e, "vision reply JSON did not match the expected shape");
                    ItemDescription::not_found("Could not parse AI response")
                }
            },
            None => {
                warn!("no JSON object found in vision reply");
                ItemDescription::not_found("Could not parse AI response")
            }
        };

        info!(
            item = %description.name,
            confidence = ?description.confidence,
            "vision identification complete"
        );
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapcart_core::Confidence;

    // Reply interpretation is the deterministic half of `identify`;
    // exercise it the way the client does, without a live model.
    fn interpret(reply: &str) -> ItemDescription {
        match extract_json_object(reply) {
            Some(object) => serde_json::from_str(object)
                .unwrap_or_else(|_| ItemDescription::not_found("Could not parse AI response")),
            None => ItemDescription::not_found("Could not parse AI response"),
        }
    }

    #[test]
    fn well_formed_reply_parses() {
        let reply = r#"Here you go:
{"identified_item": "Beaker 500ml", "confidence": "High", "item_type": "Beaker", "key_features": ["graduated"], "notes": ""}"#;
        let description = interpret(reply);
        assert_eq!(description.name, "Beaker 500ml");
        assert_eq!(description.confidence, Confidence::High);
    }

    #[test]
    fn prose_only_reply_degrades_to_not_found() {
        let description = interpret("I see a glass container of some kind.");
        assert!(!description.is_identified());
        assert_eq!(description.confidence, Confidence::Low);
    }

    #[test]
    fn wrong_shape_reply_degrades_to_not_found() {
        let description = interpret(r#"{"identified_item": 42}"#);
        assert!(!description.is_identified());
    }
}
