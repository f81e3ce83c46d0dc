//! Asynchronous image generation: submit, poll, resolve.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{self, DEFAULT_BASE_URL};
use crate::error::{Result, ScreenforgeError};
use crate::image::resolve::{ImageResolver, DEFAULT_RELAY_URL};
use crate::image::task::{decide, ImageOutput, PollDecision, TaskResponse};
use crate::image::types::Screenshot;
use crate::types::{GameConcept, ScreenType};

const DEFAULT_MODEL: &str = "Tongyi-MAI/Z-Image-Turbo";

/// 9:16 portrait, the vertical phone screen every screenshot uses.
const DEFAULT_SIZE: &str = "512x896";

/// Builder for [`ImageClient`].
#[derive(Debug, Clone)]
pub struct ImageClientBuilder {
    api_key: Option<String>,
    base_url: String,
    model: String,
    size: String,
    poll_interval: Duration,
    max_attempts: u32,
    relay_url: String,
}

impl Default for ImageClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            size: DEFAULT_SIZE.into(),
            poll_interval: Duration::from_secs(2),
            max_attempts: 30,
            relay_url: DEFAULT_RELAY_URL.into(),
        }
    }
}

impl ImageClientBuilder {
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

    /// Overrides the image model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the delay between status polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum number of status polls before timing out.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Overrides the relay endpoint used when direct image fetch fails.
    pub fn relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = url.into();
        self
    }

    /// Builds the client, resolving the API token.
    pub fn build(self) -> Result<ImageClient> {
        let token = config::resolve_token(self.api_key)?;
        let client = reqwest::Client::new();

        Ok(ImageClient {
            resolver: ImageResolver::new(client.clone(), self.relay_url),
            client,
            token,
            base_url: self.base_url,
            model: self.model,
            size: self.size,
            poll_interval: self.poll_interval,
            max_attempts: self.max_attempts,
        })
    }
}

/// Client for the asynchronous image-generation endpoint.
pub struct ImageClient {
    client: reqwest::Client,
    resolver: ImageResolver,
    token: String,
    base_url: String,
    model: String,
    size: String,
    poll_interval: Duration,
    max_attempts: u32,
}

impl ImageClient {
    /// Creates a new [`ImageClientBuilder`].
    pub fn builder() -> ImageClientBuilder {
        ImageClientBuilder::new()
    }

    /// Runs the full pipeline: submit, poll until done, resolve.
    pub async fn generate(
        &self,
        concept: &GameConcept,
        screen_type: ScreenType,
    ) -> Result<Screenshot> {
        let task_id = self.submit(concept, screen_type).await?;
        tracing::debug!(task_id = %task_id, screen = %screen_type, "submitted image task");

        let outputs = self.poll_until_done(&task_id).await?;
        tracing::debug!(task_id = %task_id, outputs = outputs.len(), "image task succeeded");

        self.resolver.resolve(&outputs).await
    }

    /// Submits an image task and returns its id without waiting for output.
    pub async fn submit(
        &self,
        concept: &GameConcept,
        screen_type: ScreenType,
    ) -> Result<String> {
        let body = ImageGenerationRequest {
            model: &self.model,
            prompt: build_prompt(concept, screen_type),
            size: &self.size,
            n: 1,
            response_format: "url",
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.token)
            .header("X-ModelScope-Async-Mode", "true")
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

        let submitted: SubmitResponse = response.json().await?;
        Ok(submitted.task_id)
    }

    /// Polls the task until it yields output, fails, or the budget runs out.
    pub async fn poll_until_done(&self, task_id: &str) -> Result<Vec<ImageOutput>> {
        let url = format!("{}/tasks/{}", self.base_url, task_id);
        let this = &*self;
        let url_ref = &url;

        run_poll_loop(
            move |attempt| this.fetch_task_status(url_ref, task_id, attempt),
            self.poll_interval,
            self.max_attempts,
        )
        .await
    }

    async fn fetch_task_status(
        &self,
        url: &str,
        task_id: &str,
        attempt: u32,
    ) -> Result<TaskResponse> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("X-ModelScope-Task-Type", "image_generation")
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

        let task: TaskResponse = response.json().await?;
        tracing::debug!(
            task_id = %task_id,
            attempt,
            status = %task.task_status,
            "polled image task"
        );
        Ok(task)
    }
}

/// Drives the poll loop over a status-fetching function.
///
/// Sleeps `poll_interval` before each query, the way the service expects.
/// `max_attempts` is a hard ceiling: a task stuck in a non-terminal state
/// cannot hang the caller past the budget. A transport or API error from
/// `fetch_status` aborts the loop immediately; there is no silent
/// continuation on a broken connection.
pub(crate) async fn run_poll_loop<F, Fut>(
    mut fetch_status: F,
    poll_interval: Duration,
    max_attempts: u32,
) -> Result<Vec<ImageOutput>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<TaskResponse>>,
{
    for attempt in 1..=max_attempts {
        tokio::time::sleep(poll_interval).await;

        let response = fetch_status(attempt).await?;
        match decide(&response) {
            PollDecision::Ready(outputs) => return Ok(outputs),
            PollDecision::Fail(status) => return Err(ScreenforgeError::JobFailed(status)),
            PollDecision::Wait => {}
        }
    }

    Err(ScreenforgeError::Timeout {
        attempts: max_attempts,
        waited: poll_interval * max_attempts,
    })
}

/// Builds the screenshot prompt from the concept and target screen.
///
/// Every concept field is embedded so all screens for one concept share the
/// same art direction.
fn build_prompt(concept: &GameConcept, screen_type: ScreenType) -> String {
    format!(
        "Mobile game screenshot for a game titled \"{title}\".\n\
         \n\
         Context:\n\
         - Genre: {genre}\n\
         - Screen Type: {screen}\n\
         - Art Style: {art_style}\n\
         - Visual Vibes: {visual}\n\
         - Color Palette: {palette}\n\
         - Core Mechanic: {mechanic}\n\
         \n\
         Specific Instructions:\n\
         - Aspect Ratio: 9:16 (Vertical Phone Screen)\n\
         - Ensure the UI elements (buttons, HUD, text) appropriate for a {screen} are visible and match the art style\n\
         - High quality, professional concept art, trending on ArtStation\n\
         - Make it look like a real, playable mobile game\n\
         - Clean, polished mobile game interface",
        title = concept.title,
        genre = concept.genre,
        screen = screen_type.label(),
        art_style = concept.art_style,
        visual = concept.visual_description,
        palette = concept.color_palette,
        mechanic = concept.gameplay_mechanic,
    )
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: String,
    size: &'a str,
    n: u32,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: String,
}
