// Prompt layer: the two questions this tool ever asks (a line of text and
// a yes/no) behind a small trait, so the flow can be driven by `dialoguer`
// on a terminal, by plain lines when stdin is a pipe, or by a script in tests.

use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input};
use std::io::{BufRead, Write};

pub trait Prompter {
    /// Ask for one line of free text. Empty answers are allowed.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Whether stdin is attached to an interactive terminal.
///
/// On platforms where crossterm cannot query the stream this reports the
/// stream as interactive, so the operator is still asked before sending.
pub fn stdin_is_interactive() -> bool {
    #[cfg(any(unix, windows))]
    {
        use crossterm::tty::IsTty;
        std::io::stdin().is_tty()
    }
    #[cfg(not(any(unix, windows)))]
    {
        true
    }
}

/// Keyboard-driven prompts rendered by `dialoguer`.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;
        Ok(value)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .interact()
            .context("Failed to read confirmation")
    }
}

/// Line-oriented prompts over any reader/writer pair. Used when stdin is
/// not a terminal, and in tests with a scripted reader.
///
/// A confirmation counts as "yes" only when the answer is `y` or `Y`.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        LinePrompter { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{}: ", prompt)?;
        self.writer.flush()?;
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).context("Failed to read input")?;
        if read == 0 {
            bail!("Input ended while waiting for an answer to {:?}", prompt);
        }
        let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed);
        Ok(line)
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn input(&mut self, prompt: &str) -> Result<String> {
        self.read_answer(prompt)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.read_answer(&format!("{} [y/n]", prompt))?;
        Ok(answer.to_lowercase() == "y")
    }
}
