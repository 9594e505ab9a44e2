use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::shell::dispatcher::{Dispatcher, Reply};

pub const PROMPT: &str = "Shell> ";

/// Prompt-read-dispatch loop.
///
/// Ends on `quit`, end of input, or cancellation of `token`. Command errors
/// are printed and the loop carries on. Returns the number of lines handled.
pub async fn run_interactive<R, W>(
    dispatcher: &Dispatcher,
    input: R,
    out: &mut W,
    token: &CancellationToken,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut handled = 0;

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let line = tokio::select! {
            _ = token.cancelled() => {
                writeln!(out)?;
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            writeln!(out)?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        handled += 1;
        match dispatcher.dispatch(&line).await {
            Ok(Reply::Quit) => break,
            Ok(reply) => {
                let text = reply.text();
                if !text.is_empty() {
                    writeln!(out, "{}", text)?;
                }
            }
            Err(e) => {
                tracing::debug!(line = %line, error = %e, "Command failed");
                writeln!(out, "Error: {}", e)?;
            }
        }
    }

    Ok(handled)
}
