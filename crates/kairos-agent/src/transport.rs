//! Transport abstraction for driving agent runs

use std::pin::Pin;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::Serialize;
use serde_json::Value;
use tokio_stream::Stream;

use crate::{
    error::{Error, Result},
    events::{AgentMessage, StreamEvent},
    input::{ResumePayload, TurnInput, UserMessage},
    interrupt::Interrupt,
};

/// Key under which an `updates` chunk carries interrupts
const INTERRUPT_KEY: &str = "__interrupt__";

/// Per-session values sent with every run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Session identifier; the agent keys its checkpoint on this
    pub thread_id: String,
    /// Who is authorizing tool access
    pub user_id: String,
    /// Model identifier handed to the agent
    pub model: String,
    /// System prompt for the agent
    pub system_prompt: Option<String>,
    /// Toolkits whose tools the agent may call
    pub toolkits: Vec<String>,
    /// Individual tools in addition to the toolkits
    pub tools: Vec<String>,
    /// Maximum number of tool definitions to load
    pub tool_limit: u32,
}

impl RunConfig {
    /// Create a config with a fresh random session identifier
    pub fn new(user_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            thread_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            model: model.into(),
            system_prompt: None,
            toolkits: Vec::new(),
            tools: Vec::new(),
            tool_limit: 100,
        }
    }

    /// Use a fixed session identifier
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = thread_id.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_toolkits(mut self, toolkits: Vec<String>) -> Self {
        self.toolkits = toolkits;
        self
    }

    pub fn with_tools(mut self, tools: Vec<String>, limit: u32) -> Self {
        self.tools = tools;
        self.tool_limit = limit;
        self
    }
}

/// A stream of events for one turn
pub type StreamEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Drives an agent one streaming call at a time
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Start (or resume) a run and stream its events until it finishes or pauses
    async fn stream(&self, input: TurnInput, config: &RunConfig) -> Result<StreamEventStream>;
}

/// Transport for agents served over the graph-runs HTTP API
pub struct GraphTransport {
    client: reqwest::Client,
    base_url: String,
    assistant_id: String,
    api_key: Option<String>,
}

impl GraphTransport {
    /// Create a transport for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            assistant_id: "agent".to_string(),
            api_key: None,
        }
    }

    /// Select which deployed graph runs the session
    pub fn with_assistant_id(mut self, assistant_id: impl Into<String>) -> Self {
        self.assistant_id = assistant_id.into();
        self
    }

    /// Authenticate against the server
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn stream_url(&self, thread_id: &str) -> String {
        format!("{}/threads/{}/runs/stream", self.base_url, thread_id)
    }

    fn build_request<'a>(&'a self, input: &'a TurnInput, config: &'a RunConfig) -> RunRequest<'a> {
        let (run_input, command) = match input {
            TurnInput::Message(message) => (
                Some(RunInput {
                    messages: std::slice::from_ref(message),
                }),
                None,
            ),
            TurnInput::Resume(payload) => (None, Some(ResumeCommand { resume: payload })),
        };

        RunRequest {
            assistant_id: &self.assistant_id,
            input: run_input,
            command,
            stream_mode: "updates",
            if_not_exists: "create",
            config: RunRequestConfig {
                configurable: Configurable {
                    thread_id: &config.thread_id,
                    user_id: &config.user_id,
                    model: &config.model,
                    system_prompt: config.system_prompt.as_deref(),
                    toolkits: &config.toolkits,
                    tools: &config.tools,
                    tool_limit: config.tool_limit,
                },
            },
        }
    }
}

#[async_trait]
impl AgentTransport for GraphTransport {
    async fn stream(&self, input: TurnInput, config: &RunConfig) -> Result<StreamEventStream> {
        let request = self.build_request(&input, config);
        let url = self.stream_url(&config.thread_id);
        tracing::debug!(
            "Streaming run on thread {} (resume: {})",
            config.thread_id,
            input.is_resume()
        );

        let mut request_builder = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request);
        if let Some(ref key) = self.api_key {
            request_builder = request_builder.header("x-api-key", key);
        }

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(event_source)))
    }
}

#[derive(Serialize)]
struct RunRequest<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<RunInput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<ResumeCommand<'a>>,
    stream_mode: &'static str,
    if_not_exists: &'static str,
    config: RunRequestConfig<'a>,
}

#[derive(Serialize)]
struct RunInput<'a> {
    messages: &'a [UserMessage],
}

#[derive(Serialize)]
struct ResumeCommand<'a> {
    resume: &'a ResumePayload,
}

#[derive(Serialize)]
struct RunRequestConfig<'a> {
    configurable: Configurable<'a>,
}

#[derive(Serialize)]
struct Configurable<'a> {
    thread_id: &'a str,
    user_id: &'a str,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<&'a str>,
    toolkits: &'a [String],
    tools: &'a [String],
    tool_limit: u32,
}

/// What one server-sent event means for the turn
#[derive(Debug, PartialEq)]
enum Frame {
    Events(Vec<StreamEvent>),
    Skip,
    End,
}

fn create_stream(mut event_source: EventSource) -> impl Stream<Item = Result<StreamEvent>> {
    stream! {
        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(message)) => match parse_frame(&message.event, &message.data) {
                    Ok(Frame::Events(events)) => {
                        for event in events {
                            yield Ok(event);
                        }
                    }
                    Ok(Frame::Skip) => {}
                    Ok(Frame::End) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                },
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(e) => {
                    yield Err(Error::Sse(e.to_string()));
                    break;
                }
            }
        }
        // Never let the event source reconnect: a replayed POST would re-run the turn.
        event_source.close();
    }
}

fn parse_frame(event: &str, data: &str) -> Result<Frame> {
    match event {
        "updates" => parse_updates(data).map(Frame::Events),
        "error" => Err(parse_error(data)),
        "end" => Ok(Frame::End),
        other => {
            tracing::trace!("Ignoring '{}' event", other);
            Ok(Frame::Skip)
        }
    }
}

/// Parse an `updates` chunk. A chunk carrying interrupts yields only the
/// interrupt event; otherwise each node's messages become one message event.
fn parse_updates(data: &str) -> Result<Vec<StreamEvent>> {
    let chunk: serde_json::Map<String, Value> = serde_json::from_str(data)?;

    if let Some(raw) = chunk.get(INTERRUPT_KEY) {
        let interrupts: Vec<Interrupt> = serde_json::from_value(raw.clone())?;
        return Ok(vec![StreamEvent::Interrupt { interrupts }]);
    }

    let mut events = Vec::with_capacity(chunk.len());
    for (node, update) in chunk {
        let messages = match update.get("messages") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|m| serde_json::from_value::<AgentMessage>(m.clone()))
                .collect::<std::result::Result<Vec<_>, _>>()?,
            Some(single @ Value::Object(_)) => vec![serde_json::from_value(single.clone())?],
            _ => Vec::new(),
        };
        events.push(StreamEvent::Messages { node, messages });
    }
    Ok(events)
}

fn parse_error(data: &str) -> Error {
    match serde_json::from_str::<Value>(data) {
        Ok(body) => {
            let error_type = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("error");
            let message = body
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or(data);
            Error::agent(error_type, message)
        }
        Err(_) => Error::agent("error", data),
    }
}
