//! Operator console.
//!
//! [`run`] reads lines from any [`BufRead`], parses each with
//! [`parse_line`], and publishes messages through a [`Publish`]
//! implementation. It is meant to run on its own OS thread: it blocks on
//! input and on every publish.
//!
//! End of input stops the console but leaves the server and its
//! subscribers running. `/quit` also fires the shutdown signal.

use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};

use crate::domain::{Command, Input, parse_line};
use crate::service::{Publish, Publisher, ShutdownTrigger};

/// Usage shown by `/help` and at startup.
pub const HELP_TEXT: &str = "\
Usage:
  data: <message>         - Send as regular data message
  event: <name> <message> - Send as custom event
  <message>               - Same as data: <message>
  /help or /h             - Show this help message
  /quit or /q             - Quit the console and stop the server";

const PROMPT: &str = "> ";
const RULE: &str = "============================================================";

/// Why the console loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    /// Input reached end of file.
    Eof,
    /// The operator typed `/quit`.
    Quit,
}

/// Runs the console until end of input or `/quit`.
///
/// Publish failures are reported on `output` and the loop continues.
/// Lines that are not valid UTF-8 are decoded lossily rather than
/// rejected.
///
/// # Errors
///
/// Returns an I/O error if reading `input` or writing `output` fails.
pub fn run<R, W, P>(
    mut input: R,
    mut output: W,
    publisher: &P,
    shutdown: &ShutdownTrigger,
) -> io::Result<ReplExit>
where
    R: BufRead,
    W: Write,
    P: Publish + ?Sized,
{
    write_banner(&mut output)?;

    let mut buf = Vec::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(output)?;
            tracing::info!("console input closed");
            return Ok(ReplExit::Eof);
        }

        match parse_line(&String::from_utf8_lossy(&buf)) {
            Input::Empty => {}
            Input::Command(Command::Help) => writeln!(output, "{HELP_TEXT}")?,
            Input::Command(Command::Quit) => {
                shutdown.trigger();
                return Ok(ReplExit::Quit);
            }
            Input::Publish(message) => {
                tracing::debug!(%message, "publishing");
                match publisher.publish_blocking(message) {
                    Ok(delivered) => tracing::debug!(delivered, "message published"),
                    Err(e) => {
                        tracing::warn!(error = %e, "publish failed");
                        writeln!(output, "error: {e}")?;
                    }
                }
            }
        }
    }
}

/// Starts the console on a dedicated thread reading stdin.
///
/// The thread is detached in practice: the process exits when the
/// server stops, even if the console is still waiting for input.
///
/// # Errors
///
/// Returns an I/O error if the thread cannot be spawned.
pub fn spawn(publisher: Publisher, shutdown: ShutdownTrigger) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            match run(stdin.lock(), io::stdout(), &publisher, &shutdown) {
                Ok(exit) => tracing::debug!(?exit, "console stopped"),
                Err(e) => tracing::error!(error = %e, "console failed"),
            }
        })
}

fn write_banner<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output)?;
    writeln!(output, "{RULE}")?;
    writeln!(output, "Console started - type messages to broadcast via SSE")?;
    writeln!(output, "Messages go to all clients connected at /events")?;
    writeln!(output)?;
    writeln!(output, "{HELP_TEXT}")?;
    writeln!(output, "{RULE}")?;
    writeln!(output)
}
