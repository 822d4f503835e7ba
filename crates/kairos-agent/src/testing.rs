//! Scripted collaborators shared by the unit tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    auth::AuthorizationWaiter,
    console::{ApprovalPrompt, LineSource, Renderer},
    error::{Error, Result},
    events::{AgentMessage, StreamEvent},
    input::TurnInput,
    transport::{AgentTransport, RunConfig, StreamEventStream},
};

/// What happened on a [`ScriptedInput`]
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Read(String),
    Pause,
    Resume,
}

#[derive(Default)]
struct InputState {
    lines: VecDeque<String>,
    log: Vec<InputEvent>,
}

/// Line source that replays canned lines, then reports end of input.
/// Clones share state so a test can inspect it after handing one off.
#[derive(Clone, Default)]
pub struct ScriptedInput {
    state: Arc<Mutex<InputState>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = InputState {
            lines: lines.into_iter().map(Into::into).collect(),
            log: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn log(&self) -> Vec<InputEvent> {
        self.state.lock().log.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::Read(prompt) => Some(prompt),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl LineSource for ScriptedInput {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut state = self.state.lock();
        state.log.push(InputEvent::Read(prompt.to_string()));
        Ok(state.lines.pop_front())
    }

    fn pause(&mut self) {
        self.state.lock().log.push(InputEvent::Pause);
    }

    fn resume(&mut self) {
        self.state.lock().log.push(InputEvent::Resume);
    }
}

/// One entry written to a [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Message(String, String),
    Notice(String),
    Error(String),
}

/// Renderer that records instead of printing
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    entries: Arc<Mutex<Vec<Rendered>>>,
}

impl RecordingRenderer {
    pub fn entries(&self) -> Vec<Rendered> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Rendered::Message(node, text) => Some((node, text)),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Rendered::Notice(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Rendered::Error(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn message(&self, node: &str, message: &AgentMessage) {
        self.entries
            .lock()
            .push(Rendered::Message(node.to_string(), message.text()));
    }

    fn notice(&self, text: &str) {
        self.entries.lock().push(Rendered::Notice(text.to_string()));
    }

    fn error(&self, text: &str) {
        self.entries.lock().push(Rendered::Error(text.to_string()));
    }
}

/// What the scripted transport does on one call
pub enum Step {
    /// Stream these events, then end
    Events(Vec<StreamEvent>),
    /// Stream these events, then fail mid-stream
    FailAfter(Vec<StreamEvent>, String),
    /// Fail before any event is produced
    Refuse(String),
}

impl Step {
    pub fn events(events: Vec<StreamEvent>) -> Self {
        Step::Events(events)
    }

    pub fn fail_after(events: Vec<StreamEvent>, message: &str) -> Self {
        Step::FailAfter(events, message.to_string())
    }

    pub fn refuse(message: &str) -> Self {
        Step::Refuse(message.to_string())
    }
}

/// Transport that plays one [`Step`] per call and records every call as
/// `(input, thread_id)`. Once the script runs out every call streams nothing.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(TurnInput, String)>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(TurnInput, String)> {
        self.calls.lock().clone()
    }

    pub fn inputs(&self) -> Vec<TurnInput> {
        self.calls().into_iter().map(|(input, _)| input).collect()
    }
}

#[async_trait]
impl AgentTransport for ScriptedTransport {
    async fn stream(&self, input: TurnInput, config: &RunConfig) -> Result<StreamEventStream> {
        self.calls.lock().push((input, config.thread_id.clone()));
        let step = self
            .steps
            .lock()
            .pop_front()
            .unwrap_or(Step::Events(Vec::new()));

        let (events, failure) = match step {
            Step::Events(events) => (events, None),
            Step::FailAfter(events, message) => (events, Some(message)),
            Step::Refuse(message) => return Err(Error::Other(message)),
        };

        let stream: StreamEventStream = Box::pin(async_stream::stream! {
            for event in events {
                yield Ok(event);
            }
            if let Some(message) = failure {
                yield Err(Error::Sse(message));
            }
        });
        Ok(stream)
    }
}

/// Waiter that answers from a script (default: success) and records ids
#[derive(Default)]
pub struct StubWaiter {
    outcomes: Mutex<VecDeque<std::result::Result<(), String>>>,
    calls: Mutex<Vec<String>>,
}

impl StubWaiter {
    pub fn new(outcomes: Vec<std::result::Result<(), String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl AuthorizationWaiter for StubWaiter {
    async fn wait_for_completion(&self, authorization_id: &str) -> Result<()> {
        self.calls.lock().push(authorization_id.to_string());
        match self.outcomes.lock().pop_front().unwrap_or(Ok(())) {
            Ok(()) => Ok(()),
            Err(message) => Err(Error::Authorization(message)),
        }
    }
}

/// Approval prompt that answers from a script (default: decline) and
/// records the questions asked
#[derive(Default)]
pub struct StubPrompt {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl StubPrompt {
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }
}

#[async_trait]
impl ApprovalPrompt for StubPrompt {
    async fn confirm(&self, question: &str, _input: &mut dyn LineSource) -> Result<bool> {
        self.questions.lock().push(question.to_string());
        Ok(self.answers.lock().pop_front().unwrap_or(false))
    }
}
