//! kairos - natural-language calendar assistant for the terminal

mod arcade;
mod config;
mod prompt;
mod terminal;

use std::sync::Arc;

use kairos_agent::{GraphTransport, InterruptResolver, SessionHandle, SessionLoop, YesNoPrompt};
use tracing_subscriber::EnvFilter;

use crate::arcade::ArcadeAuthWaiter;
use crate::config::{Config, ConfigError, Settings};
use crate::terminal::{ConsoleRenderer, StdinLines};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let settings = match Settings::resolve(Config::load(), |key| std::env::var(key).ok()) {
        Ok(settings) => settings,
        Err(e) => fatal(e),
    };
    let system_prompt = match prompt::load_system_prompt(settings.system_prompt_file.as_deref()) {
        Ok(prompt) => prompt,
        Err(e) => fatal(e),
    };

    let mut transport =
        GraphTransport::new(&settings.agent_url).with_assistant_id(&settings.assistant_id);
    if let Some(ref key) = settings.agent_api_key {
        transport = transport.with_api_key(key);
    }
    let waiter = ArcadeAuthWaiter::new(&settings.arcade_base_url, settings.arcade_api_key.clone())
        .with_timeout(settings.auth_timeout);

    let mut session = SessionLoop::new(
        settings.session_config(system_prompt),
        Arc::new(transport),
        InterruptResolver::new(Arc::new(waiter), Arc::new(YesNoPrompt)),
        Box::new(StdinLines::new()),
        Arc::new(ConsoleRenderer),
    );
    tracing::info!(
        "Starting session {} against {}",
        session.config().run.thread_id,
        settings.agent_url
    );
    spawn_interrupt_listener(session.handle());

    terminal::print_welcome();
    let result = session.run().await;
    terminal::print_farewell();

    result?;
    Ok(())
}

/// Report a setup error and exit
fn fatal(error: ConfigError) -> ! {
    eprintln!("Error: {}", error);
    if matches!(error, ConfigError::Missing { .. }) {
        eprintln!("\nExample config:\n{}", config::example_config());
    }
    std::process::exit(1);
}

/// Ctrl-C cancels the line in flight, or quits when idle at the prompt
fn spawn_interrupt_listener(handle: SessionHandle) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if handle.is_running() {
                handle.abort();
            } else {
                println!();
                terminal::print_farewell();
                std::process::exit(0);
            }
        }
    });
}
