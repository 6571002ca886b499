//! `parley chat`: Interactive or single-message terminal chat.
//!
//! The conversation lives in a [`ChatSession`]: created when the command
//! starts, updated on every exchange, cleared by `/clear`.

use std::io::Write;

use parley_chat::{ActionResult, Completer};
use parley_config::AppConfig;
use parley_core::ChatSession;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::debug;

/// What one line of terminal input amounts to.
#[derive(Debug)]
pub(crate) enum LineOutcome {
    /// Blank input
    Skip,
    Exit,
    Cleared,
    Reply(ActionResult),
}

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    PARLEY_API_KEY   = 'sk-...'");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = parley_providers::build_from_config(&config)?;
    let completer = Completer::from_config(provider, &config)?;
    let mut session = ChatSession::new();
    debug!(session = %session.id(), "Terminal chat session started");

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let result = completer.respond_in(&mut session, &msg).await;
        eprint!("\r              \r");
        return match result.error {
            Some(error) => Err(error.into()),
            None => {
                println!("{}", result.answer);
                Ok(())
            }
        };
    }

    println!();
    println!("  Parley — Interactive Mode");
    println!();
    println!("  Provider:  {}", config.provider);
    println!("  Model:     {}", config.model);
    println!("  Context:   {}", super::serve::context_label(&config));
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/clear' to start over, 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        eprint!("  ...");
        let outcome = handle_line(&completer, &mut session, &line).await;
        eprint!("\r     \r");

        match outcome {
            LineOutcome::Skip => continue,
            LineOutcome::Exit => break,
            LineOutcome::Cleared => println!("  (conversation cleared)\n"),
            LineOutcome::Reply(result) => {
                println!();
                match &result.error {
                    Some(error) => eprintln!("  [Error] {error}"),
                    None => {
                        for line in result.answer.lines() {
                            println!("  Assistant > {line}");
                        }
                    }
                }
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

/// Apply one line of input to the session.
pub(crate) async fn handle_line(
    completer: &Completer,
    session: &mut ChatSession,
    line: &str,
) -> LineOutcome {
    let line = line.trim();
    match line {
        "" => LineOutcome::Skip,
        "exit" | "quit" | "/exit" | "/quit" | ":q" => LineOutcome::Exit,
        "/clear" => {
            session.clear();
            debug!(session = %session.id(), "Session cleared");
            LineOutcome::Cleared
        }
        message => LineOutcome::Reply(completer.respond_in(session, message).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::error::ProviderError;
    use parley_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use parley_core::{ContextPreset, Turn};
    use std::sync::{Arc, Mutex};

    struct CountingProvider {
        calls: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl Provider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            Ok(ProviderResponse {
                message: Turn::assistant(format!("reply {}", *calls)),
                usage: None,
                model: request.model,
            })
        }
    }

    fn setup() -> (Arc<CountingProvider>, Completer) {
        let provider = Arc::new(CountingProvider {
            calls: Mutex::new(0),
        });
        let completer = Completer::new(
            provider.clone(),
            "gpt-3.5-turbo",
            ContextPreset::PunGenerator.prefix(),
        );
        (provider, completer)
    }

    #[tokio::test]
    async fn messages_accumulate_in_session() {
        let (_, completer) = setup();
        let mut session = ChatSession::new();

        let first = handle_line(&completer, &mut session, "Tell me a pun").await;
        assert!(matches!(first, LineOutcome::Reply(ref r) if r.answer == "reply 1"));

        handle_line(&completer, &mut session, "  another  ").await;
        assert_eq!(session.history().len(), 4);
        assert_eq!(session.history().turns()[2].content(), "another");
    }

    #[tokio::test]
    async fn clear_empties_the_session() {
        let (provider, completer) = setup();
        let mut session = ChatSession::new();
        let id = session.id().clone();

        handle_line(&completer, &mut session, "Hi").await;
        let outcome = handle_line(&completer, &mut session, "/clear").await;

        assert!(matches!(outcome, LineOutcome::Cleared));
        assert!(session.history().is_empty());
        assert_eq!(session.id(), &id);
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn blank_and_exit_lines_do_not_call_provider() {
        let (provider, completer) = setup();
        let mut session = ChatSession::new();

        assert!(matches!(
            handle_line(&completer, &mut session, "   ").await,
            LineOutcome::Skip
        ));
        for exit in ["exit", "quit", "/quit"] {
            assert!(matches!(
                handle_line(&completer, &mut session, exit).await,
                LineOutcome::Exit
            ));
        }
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }
}
