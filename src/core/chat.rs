/// Chat-completions oracle — talks to any OpenAI-compatible endpoint and
/// decodes structured JSON answers into the oracle exchange types.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::oracle::{
    ChatMessage, OptionSelection, OptionSelectionRequest, Oracle, OracleError, PhaseEnd,
    SituationResult, SituationSuggestion,
};
use crate::core::prompts;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection and sampling settings for `ChatOracle`.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout: Duration,
    /// Attempts per exchange when the answer is malformed.
    pub max_attempts: u32,
    /// Log full prompts and answers at info level.
    pub debug: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 0.3,
            timeout: Duration::from_secs(120),
            max_attempts: 3,
            debug: false,
        }
    }
}

impl OracleConfig {
    /// Read `ORACLE_BASE_URL`, `ORACLE_MODEL` and `ORACLE_API_KEY`
    /// (falling back to `OPENAI_API_KEY`), with defaults for the rest.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: non_empty("ORACLE_BASE_URL").unwrap_or(defaults.base_url),
            model: non_empty("ORACLE_MODEL").unwrap_or(defaults.model),
            api_key: non_empty("ORACLE_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")),
            ..defaults
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Oracle backed by a chat-completions API.
pub struct ChatOracle {
    client: Client,
    config: OracleConfig,
}

impl ChatOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        if config.base_url.trim().is_empty() {
            return Err(OracleError::Config("base URL is empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(OracleError::Config("model is empty".to_string()));
        }
        if config.max_attempts == 0 {
            return Err(OracleError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, OracleError> {
        Self::new(OracleConfig::from_env())
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// One round trip. Returns the raw JSON text of the first choice.
    fn complete(&self, messages: &[ChatMessage], response_format: &Value) -> Result<String, OracleError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            response_format: response_format.clone(),
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .map_err(|e| OracleError::Protocol(format!("undecodable completion: {e}")))?;
        first_content(body)
    }

    fn exchange<T, V>(
        &self,
        name: &str,
        messages: &[ChatMessage],
        schema: Value,
        validate: V,
    ) -> Result<T, OracleError>
    where
        T: DeserializeOwned + std::fmt::Debug,
        V: Fn(&T) -> Result<(), OracleError>,
    {
        if self.config.debug {
            for message in messages {
                info!(exchange = name, role = ?message.role, "{}", message.content);
            }
        }
        let format = response_format(name, schema);
        let answer = decode_with_retries(
            self.config.max_attempts,
            || self.complete(messages, &format),
            validate,
        )?;
        if self.config.debug {
            info!(exchange = name, ?answer, "oracle answered");
        }
        Ok(answer)
    }
}

impl Oracle for ChatOracle {
    fn select_option(
        &self,
        request: &OptionSelectionRequest,
    ) -> Result<OptionSelection, OracleError> {
        let messages = [
            ChatMessage::system(prompts::host_framing(request)),
            ChatMessage::user(prompts::player_action(&request.action)),
        ];
        let count = request.options.len();
        self.exchange(
            "option_selection",
            &messages,
            option_selection_schema(),
            |answer: &OptionSelection| answer.validate(count),
        )
    }

    fn suggest_situation(
        &self,
        history: &[ChatMessage],
    ) -> Result<SituationSuggestion, OracleError> {
        self.exchange(
            "situation_suggestion",
            history,
            situation_suggestion_schema(),
            SituationSuggestion::validate,
        )
    }

    fn resolve_result(&self, history: &[ChatMessage]) -> Result<SituationResult, OracleError> {
        self.exchange(
            "situation_result",
            history,
            situation_result_schema(),
            SituationResult::validate,
        )
    }

    fn check_phase_end(&self, history: &[ChatMessage]) -> Result<PhaseEnd, OracleError> {
        self.exchange("phase_end", history, phase_end_schema(), |_: &PhaseEnd| Ok(()))
    }
}

fn first_content(body: ChatCompletionResponse) -> Result<String, OracleError> {
    let message = body
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| OracleError::Protocol("completion has no choices".to_string()))?;
    if let Some(refusal) = message.refusal {
        return Err(OracleError::Protocol(format!("oracle refused: {refusal}")));
    }
    message
        .content
        .ok_or_else(|| OracleError::Protocol("completion has no content".to_string()))
}

fn parse_content<T: DeserializeOwned>(content: &str) -> Result<T, OracleError> {
    serde_json::from_str(content)
        .map_err(|e| OracleError::Protocol(format!("invalid JSON answer: {e}")))
}

/// Call `attempt` until its answer decodes and validates, up to
/// `max_attempts` times. Network and API errors end the loop at once.
fn decode_with_retries<T, A, V>(max_attempts: u32, mut attempt: A, validate: V) -> Result<T, OracleError>
where
    T: DeserializeOwned,
    A: FnMut() -> Result<String, OracleError>,
    V: Fn(&T) -> Result<(), OracleError>,
{
    let mut last_error = None;
    for n in 1..=max_attempts {
        let decoded = attempt().and_then(|content| {
            let value: T = parse_content(&content)?;
            validate(&value)?;
            Ok(value)
        });
        match decoded {
            Ok(value) => {
                debug!(attempt = n, "oracle answer accepted");
                return Ok(value);
            }
            Err(err @ (OracleError::Protocol(_) | OracleError::OptionOutOfRange { .. })) => {
                warn!(attempt = n, max_attempts, error = %err, "discarding malformed oracle answer");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(OracleError::Protocol(match last_error {
        Some(err) => format!("no valid answer after {max_attempts} attempts: {err}"),
        None => "no attempts made".to_string(),
    }))
}

fn response_format(name: &str, schema: Value) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "strict": true,
            "schema": schema,
        }
    })
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn option_selection_schema() -> Value {
    object_schema(
        json!({
            "option": { "type": "integer" },
            "reason": { "type": "string" },
            "narration": { "type": "string" },
        }),
        &["option", "reason", "narration"],
    )
}

fn situation_suggestion_schema() -> Value {
    object_schema(
        json!({
            "situation": { "type": "string" },
            "selections": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": SituationSuggestion::SELECTION_COUNT,
                "maxItems": SituationSuggestion::SELECTION_COUNT,
            },
        }),
        &["situation", "selections"],
    )
}

fn situation_result_schema() -> Value {
    let delta = json!({
        "type": "integer",
        "enum": SituationResult::DELTA_RANGE.collect::<Vec<i32>>(),
    });
    object_schema(
        json!({
            "narration": { "type": "string" },
            "health": delta,
            "mental": delta,
            "money": delta,
        }),
        &["narration", "health", "mental", "money"],
    )
}

fn phase_end_schema() -> Value {
    object_schema(
        json!({ "is_phase_over": { "type": "boolean" } }),
        &["is_phase_over"],
    )
}
