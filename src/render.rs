//! Minimal colored terminal output for the CLI.

use crossterm::style::Stylize;

/// Writes CLI output, with optional color.
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Plain informational line.
    pub fn info(&self, msg: &str) {
        println!("{msg}");
    }

    /// Confirmation of a completed action.
    pub fn success(&self, msg: &str) {
        if self.color {
            println!("{}", msg.to_string().green());
        } else {
            println!("{msg}");
        }
    }

    /// Non-fatal warning, written to stderr.
    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{}", msg.to_string().yellow());
        } else {
            eprintln!("{msg}");
        }
    }

    /// Error line, written to stderr.
    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", "error:".red());
        } else {
            eprintln!("error: {msg}");
        }
    }
}
