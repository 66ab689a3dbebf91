//! Command parsing for the chat application.
//!
//! Input that starts with `/`, or is exactly `exit` or `quit`, controls the session and is not
//! sent to the model.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Exit the chat application.
    Quit,

    /// Display help information.
    Help,

    /// List the registered tools.
    Tools,

    /// Display session statistics.
    Stats,

    /// Change the model.
    Model(String),

    /// Turn raw-chunk echo on or off.
    Debug(bool),

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it should be sent as a
/// regular message.
///
/// # Examples
///
/// ```
/// # use warbot::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("quit"), Some(ChatCommand::Quit));
/// assert!(parse_command("/model gpt-5").is_some());
/// assert!(parse_command("What conflicts are active?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        return Some(ChatCommand::Quit);
    }
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "help" | "?" => ChatCommand::Help,
        "tools" => ChatCommand::Tools,
        "stats" | "status" => ChatCommand::Stats,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "debug" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Debug(value),
            None => ChatCommand::Invalid("/debug expects 'on' or 'off'".to_string()),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /tools                 List the tools the model may call
  /model <name>          Change the model (e.g., /model gpt-5-mini)
  /debug on|off          Echo raw stream chunks to stderr
  /stats                 Show session statistics
  /help                  Show this help message
  /quit, exit, quit      Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages_are_not_commands() {
        assert_eq!(parse_command("Is Tallinn at risk?"), None);
        assert_eq!(parse_command("exit the building safely"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn bare_exit_words_quit() {
        assert_eq!(parse_command("exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  QUIT "), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn model_command() {
        assert_eq!(
            parse_command("/model gpt-5"),
            Some(ChatCommand::Model("gpt-5".to_string()))
        );
        assert!(matches!(
            parse_command("/model"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn debug_command() {
        assert_eq!(parse_command("/debug on"), Some(ChatCommand::Debug(true)));
        assert_eq!(parse_command("/debug OFF"), Some(ChatCommand::Debug(false)));
        assert!(matches!(
            parse_command("/debug maybe"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/tools"), Some(ChatCommand::Tools));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/clear"),
            Some(ChatCommand::Invalid("Unknown command: /clear".to_string()))
        );
    }
}
