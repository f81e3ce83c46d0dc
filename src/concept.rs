//! Concept generation against the chat-completions endpoint.

use serde::{Deserialize, Serialize};

use crate::config::{self, DEFAULT_BASE_URL};
use crate::error::{Result, ScreenforgeError};
use crate::types::GameConcept;

const DEFAULT_MODEL: &str = "Qwen/Qwen3-VL-235B-A22B-Instruct";

/// Builder for [`ConceptClient`].
#[derive(Debug, Clone)]
pub struct ConceptClientBuilder {
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl Default for ConceptClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
        }
    }
}

impl ConceptClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API token. Falls back to `MODELSCOPE_API_TOKEN` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Overrides the text model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builds the client, resolving the API token.
    pub fn build(self) -> Result<ConceptClient> {
        let token = config::resolve_token(self.api_key)?;

        Ok(ConceptClient {
            client: reqwest::Client::new(),
            token,
            base_url: self.base_url,
            model: self.model,
        })
    }
}

/// Client for turning a free-text game idea into a [`GameConcept`].
pub struct ConceptClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
    model: String,
}

impl ConceptClient {
    /// Creates a new [`ConceptClientBuilder`].
    pub fn builder() -> ConceptClientBuilder {
        ConceptClientBuilder::new()
    }

    /// Requests a structured game concept for the given idea.
    ///
    /// Single attempt, no retry: a failed request is reported to the caller,
    /// who decides whether to try again. The returned concept always has all
    /// six fields populated.
    pub async fn request_concept(&self, idea: &str) -> Result<GameConcept> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(ScreenforgeError::InvalidRequest(
                "game idea must not be empty".into(),
            ));
        }

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(idea),
            }],
            temperature: 0.7,
            max_tokens: 1000,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScreenforgeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ScreenforgeError::Validation("no content in completion response".into())
            })?;

        let concept = parse_concept(&content)?;
        tracing::debug!(title = %concept.title, "generated game concept");
        Ok(concept)
    }
}

/// Builds the game-designer prompt.
///
/// Art style and visual description are emphasized because every later
/// screenshot prompt reuses them for visual consistency.
fn build_prompt(idea: &str) -> String {
    format!(
        "You are a visionary game designer. Create a cohesive mobile game concept based on this idea: \"{idea}\".\n\
         If the idea is vague, fill in the details creatively.\n\
         Focus heavily on the 'artStyle' and 'visualDescription' as these will be used to generate images.\n\
         The visual description should be detailed enough to ensure consistency across multiple screenshots.\n\
         \n\
         Return the response in JSON format with these exact fields:\n\
         - title: Game title\n\
         - genre: Game genre\n\
         - artStyle: Art style (e.g., Low poly, Pixel art, Cyberpunk neon, Watercolor, Hyper-realistic)\n\
         - visualDescription: Detailed description of the visual atmosphere, lighting, and textures\n\
         - colorPalette: Color palette (e.g., Gold and Black, Pastel Pink and Blue)\n\
         - gameplayMechanic: Core gameplay mechanic"
    )
}

/// Parses the model's answer into a validated concept.
fn parse_concept(content: &str) -> Result<GameConcept> {
    let json = strip_code_fence(content);
    let concept: GameConcept = serde_json::from_str(json)
        .map_err(|e| ScreenforgeError::Validation(format!("unparseable concept JSON: {e}")))?;
    concept.validate()?;
    Ok(concept)
}

/// Extracts the JSON body from markdown code-fence markup, if any.
///
/// Models often wrap the JSON object in ```json fences even when asked for
/// bare JSON, and sometimes surround the fence with prose ("Here is your
/// concept: ..."). The first fenced block wins wherever it sits in the
/// answer; an unfenced or unterminated answer passes through trimmed.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    // Skip the opening fence line along with its language tag.
    let after_fence = &trimmed[start + 3..];
    let Some((_tag, body)) = after_fence.split_once('\n') else {
        return trimmed;
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => trimmed,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
