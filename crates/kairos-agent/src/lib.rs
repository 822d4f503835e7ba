//! kairos-agent: Interactive session runtime for a remote calendar agent
//!
//! This crate drives the conversation with a graph agent server: it streams
//! each turn, renders what the agent says, and settles tool-call interrupts
//! (out-of-band authorization and human approval) before resuming the run.

pub mod auth;
pub mod console;
pub mod error;
pub mod events;
pub mod handle;
pub mod input;
pub mod interrupt;
pub mod resolver;
pub mod session;
pub mod streamer;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::AuthorizationWaiter;
pub use console::{ApprovalPrompt, LineSource, Renderer, YesNoPrompt};
pub use error::{Error, Result};
pub use events::{AgentMessage, MessageKind, StreamEvent};
pub use handle::SessionHandle;
pub use input::{Decision, ResumePayload, TurnInput};
pub use interrupt::{AuthorizationResponse, Interrupt, InterruptKind};
pub use resolver::InterruptResolver;
pub use session::{SessionConfig, SessionLoop};
pub use streamer::stream_turn;
pub use transport::{AgentTransport, GraphTransport, RunConfig};
