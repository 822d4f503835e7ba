//! Draining one agent turn

use futures::StreamExt;

use crate::{
    console::Renderer,
    error::Result,
    events::StreamEvent,
    input::TurnInput,
    interrupt::Interrupt,
    transport::{AgentTransport, RunConfig},
};

/// Run one turn to the end of its event stream.
///
/// Messages are rendered as they arrive; interrupts from every interrupt
/// event are collected in arrival order and returned. A stream error aborts
/// the turn and is returned as-is.
pub async fn stream_turn(
    transport: &dyn AgentTransport,
    input: TurnInput,
    config: &RunConfig,
    renderer: &dyn Renderer,
) -> Result<Vec<Interrupt>> {
    let mut events = transport.stream(input, config).await?;
    let mut interrupts = Vec::new();

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Messages { node, messages } => {
                for message in &messages {
                    renderer.message(&node, message);
                }
            }
            StreamEvent::Interrupt { interrupts: batch } => {
                tracing::debug!("Turn raised {} interrupt(s)", batch.len());
                interrupts.extend(batch);
            }
        }
    }

    Ok(interrupts)
}
