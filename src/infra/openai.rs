use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::conversation::{Role, Transcript};
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;

const SNAPSHOT_PREAMBLE: &str = "Here is the current ticket state in JSON. \
Improve it; do not throw away useful information:\n";

pub struct OpenAiClient {
    http: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, model: String, base_url: String, temperature: f32) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model,
            base_url,
            temperature,
        }
    }

    fn completions_endpoint(base_url: &str) -> String {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModelService for OpenAiClient {
    async fn complete_turn(
        &self,
        instructions: &str,
        snapshot: &Ticket,
        transcript: &Transcript,
    ) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY not configured".to_string()))?;

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: build_messages(instructions, &snapshot.to_json()?, transcript),
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!(
            model = %self.model,
            messages = request_body.messages.len(),
            "requesting chat completion"
        );

        let response = self
            .http
            .post(Self::completions_endpoint(&self.base_url))
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::LanguageModel(format!("failed to call model API: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::LanguageModel(format!(
                "model API responded with {status}: {body}"
            )));
        }

        let payload: ChatCompletionResponse = response.json().await.map_err(|err| {
            AppError::LanguageModel(format!("failed to parse model API response: {err}"))
        })?;

        payload.into_content()
    }
}

fn build_messages<'a>(
    instructions: &'a str,
    snapshot_json: &str,
    transcript: &'a Transcript,
) -> Vec<ChatMessage<'a>> {
    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(ChatMessage {
        role: "system",
        content: instructions.into(),
    });
    messages.push(ChatMessage {
        role: "assistant",
        content: format!("{SNAPSHOT_PREAMBLE}{snapshot_json}").into(),
    });
    messages.extend(transcript.messages().iter().map(|message| ChatMessage {
        role: match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content: message.content.as_str().into(),
    }));
    messages
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: std::borrow::Cow<'a, str>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl ChatCompletionResponse {
    fn into_content(self) -> AppResult<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LanguageModel("model API returned no content".to_string()))
    }
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
