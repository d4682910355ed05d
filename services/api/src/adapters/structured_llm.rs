//! services/api/src/adapters/structured_llm.rs
//!
//! This module contains the adapter for schema-constrained generation.
//! It implements the `StructuredGenerationService` port from the `core` crate
//! on top of any OpenAI-compatible chat completion endpoint (OpenAI, or Gemini's
//! OpenAI compatibility layer).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use learning_core::ports::{PortError, PortResult, StructuredGenerationService, StructuredRequest};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Strict JSON-schema mode needs an object at the root, so array schemas travel
/// inside this property.
const ENVELOPE_FIELD: &str = "items";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
});

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StructuredGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiStructuredAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiStructuredAdapter {
    /// Creates a new `OpenAiStructuredAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }
}

//=========================================================================================
// Envelope helpers
//=========================================================================================

/// Wraps `schema` in the object envelope sent upstream.
pub fn envelope_schema(schema: Value) -> Value {
    json!({
        "type": "object",
        "properties": { ENVELOPE_FIELD: schema },
        "required": [ENVELOPE_FIELD],
        "additionalProperties": false
    })
}

/// Decodes model output into the payload the caller asked for.
///
/// Accepts the enveloped object, or a bare array when the provider ignored the
/// envelope. Markdown code fences around the JSON are removed first.
pub fn extract_payload(content: &str) -> PortResult<Value> {
    let text = CODE_FENCE
        .captures(content)
        .and_then(|c| c.get(1))
        .map_or(content, |m| m.as_str())
        .trim();
    if text.is_empty() {
        return Err(PortError::InvalidResponse(
            "structured response was empty".to_string(),
        ));
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| PortError::InvalidResponse(e.to_string()))?;
    match value {
        Value::Object(mut map) => map.remove(ENVELOPE_FIELD).ok_or_else(|| {
            PortError::InvalidResponse(format!("response object has no '{ENVELOPE_FIELD}' field"))
        }),
        Value::Array(_) => Ok(value),
        other => Err(PortError::InvalidResponse(format!(
            "expected a JSON object or array, got {other}"
        ))),
    }
}

//=========================================================================================
// `StructuredGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StructuredGenerationService for OpenAiStructuredAdapter {
    /// Sends the prompt with a strict JSON-schema response format and returns the payload.
    async fn generate_structured(&self, request: StructuredRequest) -> PortResult<Value> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content("You generate learning content. Reply only with JSON that matches the provided schema.")
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: request.name.clone(),
                schema: Some(envelope_schema(request.schema)),
                strict: Some(true),
            },
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(response_format)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(schema = %request.name, model = %self.model, "sending structured request");

        // The timeout is enforced here so that it resolves through the same error path
        // as any other upstream failure.
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| PortError::Timeout(self.timeout.as_secs()))?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                PortError::InvalidResponse("LLM returned no choices in its response.".to_string())
            })?;

        if let Some(refusal) = message.refusal {
            return Err(PortError::InvalidResponse(format!("model refused: {refusal}")));
        }
        let content = message.content.ok_or_else(|| {
            PortError::InvalidResponse("LLM response contained no text content.".to_string())
        })?;

        extract_payload(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn adapter(base_url: String, timeout: Duration) -> OpenAiStructuredAdapter {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(base_url);
        OpenAiStructuredAdapter::new(Client::with_config(config), "gpt-4o-mini".to_string(), timeout)
    }

    fn quiz_request() -> StructuredRequest {
        StructuredRequest {
            name: "quiz_questions".to_string(),
            prompt: "Three questions about Rust".to_string(),
            schema: json!({ "type": "array" }),
        }
    }

    fn completion(choices: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o-mini",
            "choices": choices
        })
    }

    /// Reads one HTTP request, headers and body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    /// Serves `body` as a 200 JSON response to every connection.
    async fn respond_with(body: Value) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let body = body.clone();
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn silent_upstream_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let result = adapter(format!("http://{addr}"), Duration::from_secs(1))
            .generate_structured(quiz_request())
            .await;
        assert!(matches!(result, Err(PortError::Timeout(1))), "got {result:?}");
    }

    #[tokio::test]
    async fn enveloped_reply_is_unwrapped() {
        let base = respond_with(completion(json!([{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"items\": [{\"id\": 1}]}" },
            "finish_reason": "stop"
        }])))
        .await;

        let payload = adapter(base, Duration::from_secs(5))
            .generate_structured(quiz_request())
            .await
            .unwrap();
        assert_eq!(payload, json!([{ "id": 1 }]));
    }

    #[tokio::test]
    async fn refusal_is_an_invalid_response() {
        let base = respond_with(completion(json!([{
            "index": 0,
            "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." },
            "finish_reason": "stop"
        }])))
        .await;

        let result = adapter(base, Duration::from_secs(5))
            .generate_structured(quiz_request())
            .await;
        assert!(
            matches!(&result, Err(PortError::InvalidResponse(msg)) if msg.contains("refused")),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn reply_without_choices_is_an_invalid_response() {
        let base = respond_with(completion(json!([]))).await;

        let result = adapter(base, Duration::from_secs(5))
            .generate_structured(quiz_request())
            .await;
        assert!(
            matches!(&result, Err(PortError::InvalidResponse(msg)) if msg.contains("no choices")),
            "got {result:?}"
        );
    }

    #[test]
    fn unwraps_the_envelope() {
        let payload = extract_payload(r#"{"items": [{"topic": "Rust"}]}"#).unwrap();
        assert_eq!(payload, json!([{ "topic": "Rust" }]));
    }

    #[test]
    fn strips_code_fences() {
        let content = "```json\n{\"items\": []}\n```";
        assert_eq!(extract_payload(content).unwrap(), json!([]));
    }

    #[test]
    fn accepts_a_bare_array() {
        assert_eq!(extract_payload("[1, 2]").unwrap(), json!([1, 2]));
    }

    #[test]
    fn rejects_unusable_content() {
        for content in ["", "   ", "not json", r#"{"questions": []}"#, "42"] {
            assert!(
                matches!(extract_payload(content), Err(PortError::InvalidResponse(_))),
                "accepted {content:?}"
            );
        }
    }

    #[test]
    fn envelope_requires_items() {
        let schema = envelope_schema(json!({ "type": "array" }));
        assert_eq!(schema["required"], json!(["items"]));
        assert_eq!(schema["properties"]["items"]["type"], "array");
    }
}
