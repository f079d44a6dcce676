//! Question/answer channel between the session and the user.

use inquire::InquireError;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use ytpress_dl::{Error, Result};

/// Asks questions and shows messages.
pub trait Prompt {
    /// Ask `message` and return the raw answer.
    ///
    /// Returns [`Error::Cancelled`] when the user interrupts.
    fn ask(&mut self, message: &str) -> Result<String>;

    /// Show a line of output.
    fn say(&mut self, message: &str);
}

/// Interactive terminal prompt backed by `inquire`.
#[derive(Debug, Default)]
pub struct Terminal;

impl Prompt for Terminal {
    fn ask(&mut self, message: &str) -> Result<String> {
        inquire::Text::new(message).prompt().map_err(from_inquire)
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Prompt reading one answer per line, for input piped from a file or another program.
///
/// Questions are echoed to the output. Running out of input is an
/// [`io::ErrorKind::UnexpectedEof`] error.
#[derive(Debug)]
pub struct Lines<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Lines<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl Lines<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for Lines<R, W> {
    fn ask(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{message} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before the session finished",
            )
            .into());
        }

        let answer = line.strip_suffix('\n').unwrap_or(&line);
        let answer = answer.strip_suffix('\r').unwrap_or(answer);
        Ok(answer.to_string())
    }

    fn say(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}") {
            tracing::warn!(error = %e, "failed to write message");
        }
    }
}

/// Ctrl-C and Esc both end the session as a cancellation.
fn from_inquire(e: InquireError) -> Error {
    match e {
        InquireError::OperationInterrupted | InquireError::OperationCanceled => Error::Cancelled,
        InquireError::IO(e) => Error::Io(e),
        other => Error::Io(std::io::Error::other(other)),
    }
}
