//! Line-oriented operator console.
//!
//! Generic over its reader and writer so the whole session can be driven from
//! a script in tests. Every read trims the line; end of input is
//! [`Error::InputClosed`].

use std::io::{BufRead, Write};

use colored::Colorize;

use crate::error::{Error, Result};
use crate::validate::ValidationError;

/// Severity of a console message, which picks its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// A recoverable problem or cancellation.
    Warning,
    /// A failed action.
    Error,
}

/// Words that cancel a confirmation prompt.
const CANCEL_WORDS: [&str; 3] = ["esc", "c", "cancel"];

/// Prompts and messages over a reader/writer pair.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Write a line of plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Write pre-rendered text without adding a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn show(&mut self, rendered: &str) -> Result<()> {
        self.output.write_all(rendered.as_bytes())?;
        Ok(())
    }

    /// Write a colored message line.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn message(&mut self, level: MessageLevel, text: &str) -> Result<()> {
        let line = match level {
            MessageLevel::Info => text.cyan(),
            MessageLevel::Success => text.green(),
            MessageLevel::Warning => text.yellow(),
            MessageLevel::Error => text.red(),
        };
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Print `label`, then read one trimmed line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    /// Prompt until `validate` accepts the input, printing each diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn read_field<T>(
        &mut self,
        label: &str,
        validate: impl Fn(&str) -> std::result::Result<T, ValidationError>,
    ) -> Result<T> {
        loop {
            let raw = self.prompt(label)?;
            match validate(&raw) {
                Ok(value) => return Ok(value),
                Err(err) => self.message(MessageLevel::Error, &err.to_string())?,
            }
        }
    }

    /// Like [`Console::read_field`], but blank input returns `None` so the
    /// caller can keep the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn read_optional_field<T>(
        &mut self,
        label: &str,
        validate: impl Fn(&str) -> std::result::Result<T, ValidationError>,
    ) -> Result<Option<T>> {
        loop {
            let raw = self.prompt(label)?;
            if raw.is_empty() {
                return Ok(None);
            }
            match validate(&raw) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => self.message(MessageLevel::Error, &err.to_string())?,
            }
        }
    }

    /// Ask to confirm an action. An empty line confirms, a cancel word
    /// declines, anything else asks again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn confirm(&mut self, action: &str) -> Result<bool> {
        loop {
            let answer = self.prompt(&format!(
                "Press Enter to {action} or type 'esc' to cancel: "
            ))?;
            if answer.is_empty() {
                return Ok(true);
            }
            if CANCEL_WORDS.contains(&answer.to_lowercase().as_str()) {
                return Ok(false);
            }
        }
    }

    /// Ask a Y/N question until answered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        loop {
            let answer = self.prompt(&format!("{question} (Y/N): "))?;
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.message(MessageLevel::Error, "Invalid choice! Please enter Y or N.")?,
            }
        }
    }

    /// Show a numbered menu and read a choice in `1..=options.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn menu(&mut self, title: &str, options: &[&str]) -> Result<usize> {
        loop {
            self.say("")?;
            writeln!(self.output, "{}", title.bold())?;
            for (index, option) in options.iter().enumerate() {
                self.say(&format!("{}) {option}", index + 1))?;
            }

            let raw = self.prompt("Enter your choice: ")?;
            match raw.parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(choice),
                _ => self.message(
                    MessageLevel::Error,
                    &format!(
                        "Invalid choice! Please enter a number between 1 and {}.",
                        options.len()
                    ),
                )?,
            }
        }
    }

    /// Wait for Enter (true) or `esc` (false).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn enter_or_escape(&mut self, label: &str) -> Result<bool> {
        let answer = self.prompt(label)?;
        Ok(!answer.eq_ignore_ascii_case("esc"))
    }
}
