//! Line-oriented console used by the interactive planner.
//!
//! Every prompt resolves to a [`Step`]: the accepted value, a request to go
//! back one state, or a request to abandon the whole flow.

use std::io::{BufRead, Write};

use crate::error::Result;

/// Typed at any prompt to return to the previous step.
pub const BACK_WORDS: &[&str] = &["b", "back"];

/// Typed at any prompt to abandon the booking.
pub const CANCEL_WORDS: &[&str] = &["c", "cancel", "q", "quit"];

/// Outcome of a single prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T> {
    /// Valid input.
    Accepted(T),
    /// Go back one state.
    Back,
    /// Abandon the flow.
    Cancel,
}

impl<T> Step<T> {
    /// Recognise the navigation words shared by every prompt.
    #[must_use]
    pub fn navigation(input: &str) -> Option<Self> {
        let word = input.trim().to_ascii_lowercase();
        if BACK_WORDS.contains(&word.as_str()) {
            Some(Self::Back)
        } else if CANCEL_WORDS.contains(&word.as_str()) {
            Some(Self::Cancel)
        } else {
            None
        }
    }
}

/// Where the planner talks to a person.
pub trait Console {
    /// Show one line of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn say(&mut self, line: &str) -> Result<()>;

    /// Show a prompt and read one line of input.
    ///
    /// Returns `None` once input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written or input cannot be read.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// A [`Console`] over any buffered reader and writer.
#[derive(Debug)]
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    /// Wrap a reader and a writer.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect a transcript.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_navigation_words() {
        assert_eq!(Step::<()>::navigation("b"), Some(Step::Back));
        assert_eq!(Step::<()>::navigation(" BACK "), Some(Step::Back));
        assert_eq!(Step::<()>::navigation("c"), Some(Step::Cancel));
        assert_eq!(Step::<()>::navigation("quit"), Some(Step::Cancel));
        assert_eq!(Step::<()>::navigation("12:00"), None);
        assert_eq!(Step::<()>::navigation(""), None);
    }

    #[test]
    fn test_line_console_reads_lines() {
        let mut console = LineConsole::new(Cursor::new("first\r\nsecond\n"), Vec::new());

        assert_eq!(console.ask(">").unwrap(), Some("first".to_string()));
        assert_eq!(console.ask(">").unwrap(), Some("second".to_string()));
        assert_eq!(console.ask(">").unwrap(), None);
    }

    #[test]
    fn test_line_console_writes_transcript() {
        let mut console = LineConsole::new(Cursor::new(""), Vec::new());
        console.say("hello").unwrap();
        console.ask("name?").unwrap();

        let transcript = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(transcript, "hello\nname? ");
    }
}
