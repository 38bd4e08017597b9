//! Interactive terminal chat with the portfolio assistant.
//!
//! Replies are revealed a few characters per frame, the way the website
//! widget types them out.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local endpoint
//! portfolio-chat --base-url http://localhost:3000/api/
//!
//! # Spanish, with a display name
//! portfolio-chat --language es --name Ada
//!
//! # Replace the built-in persona
//! portfolio-chat --system "You are a terse guide to my projects."
//!
//! # Disable colors (useful for piping output)
//! portfolio-chat --no-color
//! ```
//!
//! Set `PORTFOLIO_CHAT_API_KEY` if the endpoint requires a bearer token and
//! `RUST_LOG=portfolio_chat=debug` to see request logs on stderr.
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/lang en|es` - Switch the display language
//! - `/name [name]` - Set or clear your display name
//! - `/cancel` - Abandon the pending reply
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application
//!
//! Ctrl+C while a reply is pending abandons it; while a reply is being
//! revealed it shows the rest at once.

use std::sync::{Arc, Mutex};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use portfolio_chat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, SendOutcome,
    help_text, parse_command,
};
use portfolio_chat::{
    ChatMessage, CompletionClient, IntervalClock, RevealAnimator, RevealExit, play_reveal,
};

/// Main entry point for the portfolio-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("portfolio-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = CompletionClient::new(&config.base_url, None)?;
    let session = Arc::new(ChatSession::new(Arc::new(client), config.clone()));
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut animator = RevealAnimator::new(config.reveal_step);
    animator.mount(&session.messages());
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C skips the running reveal, or abandons the pending reply.
    let reveal_cancel: Arc<Mutex<Option<CancellationToken>>> = Arc::default();
    {
        let session = Arc::clone(&session);
        let reveal_cancel = Arc::clone(&reveal_cancel);
        ctrlc::set_handler(move || {
            let reveal = reveal_cancel.lock().ok().and_then(|mut slot| slot.take());
            match reveal {
                Some(token) => token.cancel(),
                None => {
                    session.cancel();
                }
            }
        })?;
    }

    println!("Portfolio Chat ({})", config.base_url);
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let prompt = match session.display_name() {
            Some(name) => format!("{name}> "),
            None => "you> ".to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear_messages();
                            animator.observe(&session.messages());
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Language(language) => {
                            session.set_language(language);
                            renderer.print_info(&format!("Language set to {language}."));
                        }
                        ChatCommand::Name(name) => {
                            session.set_display_name(name);
                            match session.display_name() {
                                Some(name) => {
                                    renderer.print_info(&format!("Display name set to {name}."))
                                }
                                None => renderer.print_info("Display name cleared."),
                            }
                        }
                        ChatCommand::Cancel => {
                            if session.cancel() {
                                renderer.print_interrupted();
                            } else {
                                renderer.print_info("Nothing to cancel.");
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                let Some(pending) = session.send_message(line) else {
                    continue;
                };
                renderer.print_waiting();
                match pending.settle().await {
                    SendOutcome::Replied(message) => {
                        animator.observe(&session.messages());
                        reveal(&config, &mut animator, &mut renderer, &reveal_cancel, &message)
                            .await;
                    }
                    SendOutcome::Failed(notice) => renderer.print_failure(&notice),
                    SendOutcome::Superseded => renderer.print_interrupted(),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

async fn reveal(
    config: &ChatConfig,
    animator: &mut RevealAnimator,
    renderer: &mut PlainTextRenderer,
    reveal_cancel: &Mutex<Option<CancellationToken>>,
    message: &ChatMessage,
) {
    let token = CancellationToken::new();
    if let Ok(mut slot) = reveal_cancel.lock() {
        *slot = Some(token.clone());
    }

    renderer.start_reply();
    let mut printed = 0;
    let exit = play_reveal(
        animator,
        message,
        IntervalClock::new(config.frame_interval),
        &token,
        |_, delta| {
            renderer.print_text(delta);
            printed += delta.len();
        },
    )
    .await;

    if let Ok(mut slot) = reveal_cancel.lock() {
        slot.take();
    }

    match exit {
        RevealExit::Completed => {}
        RevealExit::Idle | RevealExit::Cancelled => {
            animator.finish_all();
            let rest = animator.visible_text(message).get(printed..).unwrap_or_default();
            renderer.print_text(rest);
        }
    }
    renderer.finish_reply();
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Language: {}", stats.language);
    match stats.display_name.as_deref() {
        Some(name) => println!("      Display name: {}", name),
        None => println!("      Display name: (none)"),
    }
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Requests: {} ({} replies, {} failed, {} superseded)",
        stats.requests, stats.replies, stats.failures, stats.superseded
    );
    println!("      Ignored sends: {}", stats.ignored);
    println!(
        "      Total tokens: {} in / {} out",
        stats.prompt_tokens, stats.completion_tokens
    );
    println!(
        "      Reply pending: {}",
        if stats.is_loading { "yes" } else { "no" }
    );
}
