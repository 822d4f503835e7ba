//! The interactive session loop

use std::sync::Arc;

use crate::{
    console::{LineSource, Renderer},
    error::{Error, Result},
    handle::SessionHandle,
    input::{ResumePayload, TurnInput},
    resolver::InterruptResolver,
    streamer::stream_turn,
    transport::{AgentTransport, RunConfig},
};

/// Prompt shown when waiting for the next line
pub const PROMPT: &str = "> ";

/// Session configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Values sent with every run
    pub run: RunConfig,
    /// Typed alone (any case) to end the session
    pub exit_keyword: String,
    /// Resume rounds allowed for one line before it is abandoned
    pub max_resumes: usize,
}

impl SessionConfig {
    pub fn new(run: RunConfig) -> Self {
        Self {
            run,
            exit_keyword: "exit".to_string(),
            max_resumes: 32,
        }
    }

    pub fn with_max_resumes(mut self, max_resumes: usize) -> Self {
        self.max_resumes = max_resumes;
        self
    }

    /// Whether `line` is the exit keyword
    pub fn is_exit(&self, line: &str) -> bool {
        line.trim().eq_ignore_ascii_case(&self.exit_keyword)
    }
}

/// Reads lines, runs turns and resumes interrupted runs until the user exits
pub struct SessionLoop {
    config: SessionConfig,
    transport: Arc<dyn AgentTransport>,
    resolver: InterruptResolver,
    input: Box<dyn LineSource>,
    renderer: Arc<dyn Renderer>,
    handle: SessionHandle,
}

impl SessionLoop {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn AgentTransport>,
        resolver: InterruptResolver,
        input: Box<dyn LineSource>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            transport,
            resolver,
            input,
            renderer,
            handle: SessionHandle::new(),
        }
    }

    /// Get the session config
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get a cloneable handle for cancelling turns from outside the loop
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Run until the exit keyword or end of input.
    ///
    /// Failures inside a line are reported and do not end the loop; only a
    /// failure to read the next line does.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(line) = self.input.read_line(PROMPT).await? else {
                tracing::debug!("End of input");
                break;
            };
            if self.config.is_exit(&line) {
                break;
            }
            self.handle_line(&line).await;
        }
        Ok(())
    }

    /// Process one line with input paused. Returns whether it succeeded.
    pub async fn handle_line(&mut self, text: &str) -> bool {
        self.input.pause();
        let result = self.process_line(text).await;
        if let Err(ref e) = result {
            if e.is_cancelled() {
                tracing::info!("Line cancelled on thread {}", self.config.run.thread_id);
            } else {
                tracing::error!("Turn failed on thread {}: {}", self.config.run.thread_id, e);
            }
            self.renderer.error(&e.to_string());
        }
        self.input.resume();
        result.is_ok()
    }

    async fn process_line(&mut self, text: &str) -> Result<()> {
        let cancel = self.handle.begin();
        let result = tokio::select! {
            result = drive_line(
                self.transport.as_ref(),
                &self.resolver,
                self.input.as_mut(),
                self.renderer.as_ref(),
                &self.config,
                text,
            ) => result,
            _ = cancel.cancelled() => Err(Error::Cancelled),
        };
        self.handle.finish();

        let resumes = result?;
        tracing::debug!("Line settled after {} resume(s)", resumes);
        Ok(())
    }
}

/// Stream turns for one line until a turn raises no interrupts.
/// Returns how many times the run was resumed.
async fn drive_line(
    transport: &dyn AgentTransport,
    resolver: &InterruptResolver,
    input: &mut dyn LineSource,
    renderer: &dyn Renderer,
    config: &SessionConfig,
    text: &str,
) -> Result<usize> {
    let mut turn_input = TurnInput::user(text);
    let mut resumes = 0;

    loop {
        let interrupts = stream_turn(transport, turn_input, &config.run, renderer).await?;
        if interrupts.is_empty() {
            return Ok(resumes);
        }
        if resumes >= config.max_resumes {
            tracing::warn!(
                "Thread {} still has {} pending interrupt(s) after {} resumes",
                config.run.thread_id,
                interrupts.len(),
                resumes
            );
            return Err(Error::ResumeLimit(config.max_resumes));
        }

        let decisions = resolver.resolve_all(&interrupts, input, renderer).await?;
        let payload = ResumePayload::from_decisions(decisions)
            .ok_or_else(|| Error::Other("No decisions to resume with".to_string()))?;
        tracing::debug!("Resuming with {} decision(s)", payload.decisions().len());
        turn_input = TurnInput::Resume(payload);
        resumes += 1;
    }
}
