//! Terminal output for a chat session.
//!
//! The [`Renderer`] trait is what a [`ChatSession`](crate::chat::ChatSession) writes to while a
//! turn streams.  [`PlainTextRenderer`] styles thinking text dim and italic and tool traffic in
//! color, or falls back to bracketed labels when color is off.

use std::io::{self, Stdout, Write};

const ANSI_DIM: &str = "\x1b[2m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_MAGENTA: &str = "\x1b[35m";

/// Tool results longer than this many characters are cut short on screen.
pub const MAX_TOOL_RESULT_CHARS: usize = 600;

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print a chunk of response text.
    fn print_text(&mut self, text: &str);

    /// Print a chunk of thinking text.
    ///
    /// Thinking is displayed apart from the response and is never stored in history.
    fn print_thinking(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when the model begins a tool call.
    fn start_tool_use(&mut self, name: &str, id: &str);

    /// Print a fragment of tool-call arguments.
    fn print_tool_input(&mut self, partial_json: &str);

    /// Called when a tool call's arguments are complete.
    fn finish_tool_use(&mut self);

    /// Called before a tool result is printed.
    fn start_tool_result(&mut self, call_id: &str, is_error: bool);

    /// Print tool result text.
    fn print_tool_result_text(&mut self, text: &str);

    /// Called when a tool result is complete.
    fn finish_tool_result(&mut self);

    /// Called when a response is complete.
    fn finish_response(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    in_thinking: bool,
    in_tool_use: bool,
    in_tool_result: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a renderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a renderer on stdout with the given color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer on an arbitrary writer.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            in_thinking: false,
            in_tool_use: false,
            in_tool_result: false,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    // Terminal writes are best effort; a closed stdout must not end the session.
    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn reset_styles(&mut self) {
        if self.in_thinking {
            if self.use_color {
                self.emit(ANSI_RESET);
            }
            self.emit("\n");
            self.in_thinking = false;
        }
        if self.in_tool_result {
            if self.use_color {
                self.emit(ANSI_RESET);
            }
            self.in_tool_result = false;
        }
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_text(&mut self, text: &str) {
        self.reset_styles();
        self.emit(text);
    }

    fn print_thinking(&mut self, text: &str) {
        if !self.in_thinking {
            if self.use_color {
                self.emit(&format!("{ANSI_DIM}{ANSI_ITALIC}"));
            } else {
                self.emit("[thinking] ");
            }
            self.in_thinking = true;
        }
        self.emit(text);
    }

    fn print_error(&mut self, error: &str) {
        self.reset_styles();
        if self.use_color {
            self.emit(&format!("\n{ANSI_RED}Error: {error}{ANSI_RESET}\n"));
        } else {
            self.emit(&format!("\nError: {error}\n"));
        }
    }

    fn print_info(&mut self, info: &str) {
        self.reset_styles();
        self.emit(&format!("{info}\n"));
    }

    fn start_tool_use(&mut self, name: &str, id: &str) {
        self.reset_styles();
        self.in_tool_use = true;
        if self.use_color {
            self.emit(&format!(
                "\n{ANSI_CYAN}[tool: {name}]{ANSI_RESET} {ANSI_DIM}({id}){ANSI_RESET}\n{ANSI_YELLOW}"
            ));
        } else {
            self.emit(&format!("\n[tool: {name}] ({id})\n"));
        }
    }

    fn print_tool_input(&mut self, partial_json: &str) {
        self.emit(partial_json);
    }

    fn finish_tool_use(&mut self) {
        if !self.in_tool_use {
            return;
        }
        if self.use_color {
            self.emit(ANSI_RESET);
        }
        self.emit("\n");
        self.in_tool_use = false;
    }

    fn start_tool_result(&mut self, call_id: &str, is_error: bool) {
        self.reset_styles();
        self.in_tool_result = true;
        let status = if is_error { "error" } else { "ok" };
        if self.use_color {
            let label_color = if is_error { ANSI_RED } else { ANSI_GREEN };
            self.emit(&format!(
                "{label_color}[tool result: {call_id} ({status})]{ANSI_RESET}\n{ANSI_MAGENTA}"
            ));
        } else {
            self.emit(&format!("[tool result: {call_id} ({status})]\n"));
        }
    }

    fn print_tool_result_text(&mut self, text: &str) {
        let shown = truncate_chars(text, MAX_TOOL_RESULT_CHARS);
        self.emit(&shown);
    }

    fn finish_tool_result(&mut self) {
        self.reset_styles();
        self.emit("\n");
    }

    fn finish_response(&mut self) {
        self.reset_styles();
        self.emit("\n");
    }
}

/// Cut `text` to at most `max` characters, marking the cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
