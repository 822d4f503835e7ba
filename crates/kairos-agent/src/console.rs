//! Terminal-facing seams: output rendering, line input and yes/no prompts

use async_trait::async_trait;

use crate::{error::Result, events::AgentMessage};

/// Sink for everything the session shows the user
pub trait Renderer: Send + Sync {
    /// Render one agent message produced by `node`
    fn message(&self, node: &str, message: &AgentMessage);

    /// Render a status line from the orchestrator
    fn notice(&self, text: &str);

    /// Render a recoverable error
    fn error(&self, text: &str);
}

/// Source of user-typed lines
#[async_trait]
pub trait LineSource: Send {
    /// Show `prompt` and wait for the next line. `None` at end of input.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Stop accepting new lines while a turn is in flight.
    ///
    /// Sources that only read when asked already satisfy this; the hook
    /// exists for sources that read ahead.
    fn pause(&mut self) {}

    /// Accept new lines again
    fn resume(&mut self) {}
}

/// Asks the human a yes/no question
#[async_trait]
pub trait ApprovalPrompt: Send + Sync {
    async fn confirm(&self, question: &str, input: &mut dyn LineSource) -> Result<bool>;
}

/// Reads the answer as a line: `y` or `yes` (any case) approves, anything
/// else (including end of input) declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct YesNoPrompt;

#[async_trait]
impl ApprovalPrompt for YesNoPrompt {
    async fn confirm(&self, question: &str, input: &mut dyn LineSource) -> Result<bool> {
        let answer = input.read_line(&format!("{} (y/n): ", question)).await?;
        Ok(answer.as_deref().map(is_yes).unwrap_or(false))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedInput;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
        assert!(!is_yes(""));
    }

    #[tokio::test]
    async fn test_yes_no_prompt_reads_one_line() {
        let mut input = ScriptedInput::new(["Yes", "no"]);
        assert!(YesNoPrompt.confirm("Do you approve?", &mut input).await.unwrap());
        assert!(!YesNoPrompt.confirm("Do you approve?", &mut input).await.unwrap());
        assert_eq!(
            input.prompts(),
            vec!["Do you approve? (y/n): ", "Do you approve? (y/n): "]
        );
    }

    #[tokio::test]
    async fn test_yes_no_prompt_declines_at_end_of_input() {
        let mut input = ScriptedInput::new(Vec::<String>::new());
        assert!(!YesNoPrompt.confirm("Proceed?", &mut input).await.unwrap());
    }
}
