//! Interactive chat about world conflicts and emergency preparation.
//!
//! This binary streams answers from an OpenAI-compatible Responses endpoint, shows the model's
//! thinking as it arrives, and runs the built-in tools on the model's behalf.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage; OPENAI_API_KEY must be set
//! warbot
//!
//! # Ask one question up front, then keep chatting
//! warbot --question "What major conflicts are active right now?"
//!
//! # Point at a compatible endpoint and echo raw chunks
//! warbot --base-url http://localhost:8080/v1 --debug
//! ```
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/tools` - List the tools the model may call
//! - `/model <name>` - Change the model
//! - `/debug on|off` - Echo raw stream chunks
//! - `/stats` - Show session statistics
//! - `exit`, `quit`, `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use warbot::OpenAi;
use warbot::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("warbot [OPTIONS]");
    let config = match ChatConfig::from_env(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("warbot: {err}");
            std::process::exit(2);
        }
    };
    let use_color = config.use_color;

    let mut session = match ChatSession::from_config(config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("warbot: {err}");
            std::process::exit(2);
        }
    };
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C while a turn streams ends the whole session.
    ctrlc::set_handler(|| {
        println!("\nInterrupted");
        std::process::exit(0);
    })?;

    println!("Warbot - type 'exit' or Ctrl+C to quit");
    println!("Model: {} (type /help for commands)\n", session.model());

    if let Some(question) = args.question.as_deref() {
        println!("You: {question}");
        ask(&mut session, question, &mut renderer).await;
    }

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => break,
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Tools => {
                            for tool in session.registry().describe_all() {
                                println!("    {}: {}", tool.name, tool.description);
                            }
                        }
                        ChatCommand::Stats => print_stats(&session),
                        ChatCommand::Model(model) => match session.set_model(&model) {
                            Ok(()) => renderer.print_info(&format!("Model changed to: {model}")),
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Debug(debug) => {
                            session.set_debug(debug);
                            if debug {
                                renderer.print_info("Raw chunk logging enabled.");
                            } else {
                                renderer.print_info("Raw chunk logging disabled.");
                            }
                        }
                        ChatCommand::Invalid(message) => renderer.print_error(&message),
                    }
                    continue;
                }

                ask(&mut session, line, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!();
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

async fn ask(session: &mut ChatSession<OpenAi>, input: &str, renderer: &mut PlainTextRenderer) {
    println!("Assistant:");
    // The session renders its own errors and rolls the history back.
    if let Err(err) = session.send_message(input, renderer).await
        && err.is_retryable()
    {
        renderer.print_info("The service may recover; send the message again to retry.");
    }
}

fn print_stats(session: &ChatSession<OpenAi>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Turns: {} completed, {} failed",
        stats.completed_turns, stats.failed_turns
    );
    println!(
        "      Requests: {} ({} retried)",
        stats.total_requests, stats.retries
    );
    println!(
        "      Tool calls: {} ({} errors)",
        stats.tool_calls, stats.tool_errors
    );
}
