//! Turning interrupts into authorization decisions

use std::sync::Arc;

use crate::{
    auth::AuthorizationWaiter,
    console::{ApprovalPrompt, LineSource, Renderer},
    error::Result,
    input::Decision,
    interrupt::{Interrupt, InterruptKind},
};

const APPROVAL_QUESTION: &str = "Do you approve this tool call?";

/// Produces exactly one [`Decision`] per interrupt
pub struct InterruptResolver {
    waiter: Arc<dyn AuthorizationWaiter>,
    prompt: Arc<dyn ApprovalPrompt>,
}

impl InterruptResolver {
    pub fn new(waiter: Arc<dyn AuthorizationWaiter>, prompt: Arc<dyn ApprovalPrompt>) -> Self {
        Self { waiter, prompt }
    }

    /// Resolve one interrupt.
    ///
    /// Authorization failures and malformed requests become a declined
    /// decision. The only error returned is a failure to read the human's
    /// answer.
    pub async fn resolve(
        &self,
        interrupt: &Interrupt,
        input: &mut dyn LineSource,
        renderer: &dyn Renderer,
    ) -> Result<Decision> {
        match interrupt.kind() {
            InterruptKind::Authorization {
                tool_name,
                authorization,
            } => {
                renderer.notice(&format!(
                    "Authorization required for tool call {}",
                    tool_name
                ));
                renderer.notice(&format!(
                    "Please authorize in your browser {}",
                    authorization.url.as_deref().unwrap_or("(no URL provided)")
                ));
                renderer.notice("Waiting for you to complete authorization...");

                match self.waiter.wait_for_completion(&authorization.id).await {
                    Ok(()) => {
                        renderer.notice("Authorization granted. Resuming execution...");
                        Ok(Decision::approve())
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Authorization {} for {} did not complete: {}",
                            authorization.id,
                            tool_name,
                            e
                        );
                        renderer.error(&format!(
                            "Error waiting for authorization to complete: {}",
                            e
                        ));
                        Ok(Decision::deny())
                    }
                }
            }
            InterruptKind::HumanApproval { tool_name, input: tool_input } => {
                renderer.notice(&format!(
                    "Human in the loop required for tool call {}",
                    tool_name
                ));
                let pretty = serde_json::to_string_pretty(&tool_input)
                    .unwrap_or_else(|_| tool_input.to_string());
                renderer.notice(&format!("Please approve the tool call {}", pretty));

                let approved = self.prompt.confirm(APPROVAL_QUESTION, input).await?;
                Ok(Decision::new(approved))
            }
            InterruptKind::Malformed => {
                tracing::warn!(
                    "Declining interrupt {} with no recognizable request: {}",
                    interrupt.id.as_deref().unwrap_or("-"),
                    interrupt.value
                );
                Ok(Decision::deny())
            }
        }
    }

    /// Resolve interrupts one at a time, keeping their order.
    pub async fn resolve_all(
        &self,
        interrupts: &[Interrupt],
        input: &mut dyn LineSource,
        renderer: &dyn Renderer,
    ) -> Result<Vec<Decision>> {
        let mut decisions = Vec::with_capacity(interrupts.len());
        for interrupt in interrupts {
            decisions.push(self.resolve(interrupt, input, renderer).await?);
        }
        Ok(decisions)
    }
}
