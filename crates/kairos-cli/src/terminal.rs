//! Console rendering and stdin line input

use std::io::{self, Write};

use async_trait::async_trait;
use crossterm::style::Stylize;
use kairos_agent::{AgentMessage, LineSource, Renderer};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const WELCOME: &str = "Welcome to the chatbot! Type 'exit' to quit.";
const FAREWELL: &str = "👋 Bye...";

/// Print the green welcome banner
pub fn print_welcome() {
    println!("{}", WELCOME.green());
}

/// Print the red farewell line
pub fn print_farewell() {
    println!("{}", FAREWELL.red());
}

fn message_line(message: &AgentMessage) -> String {
    format!("🤖: {}", message.formatted())
}

fn notice_line(text: &str) -> String {
    format!("⚙️: {}", text)
}

/// Prints agent output to stdout and errors to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn message(&self, node: &str, message: &AgentMessage) {
        tracing::debug!("Rendering {:?} message from {}", message.kind, node);
        println!("{}", message_line(message));
    }

    fn notice(&self, text: &str) {
        println!("{}", notice_line(text));
    }

    fn error(&self, text: &str) {
        eprintln!("{} {}", "Error:".red(), text);
    }
}

/// Reads lines from stdin on demand
pub struct StdinLines {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinLines {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for StdinLines {
    async fn read_line(&mut self, prompt: &str) -> kairos_agent::Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}
