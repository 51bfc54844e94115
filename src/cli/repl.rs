//! Interactive read-eval-print loop.
//!
//! The loop reads one line at a time, hands it to a [`TurnHandler`] and prints
//! the answer. It owns no agent state, so it can be driven from any reader
//! and writer.

use crate::agent::{AgentOutput, AgentSession};
use crate::cli::output::preview;
use crate::error::Result;
use async_trait::async_trait;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Word that ends the session.
pub const EXIT_SENTINEL: &str = "exit";

/// Something that turns one user line into an answer.
#[async_trait]
pub trait TurnHandler: Send {
    async fn handle(&mut self, input: &str) -> Result<AgentOutput>;
}

#[async_trait]
impl TurnHandler for AgentSession {
    async fn handle(&mut self, input: &str) -> Result<AgentOutput> {
        self.invoke(input).await
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The user typed the exit word.
    Sentinel,
    /// Input was closed.
    EndOfInput,
}

/// Loop display options.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopOptions {
    /// Print tool arguments, results and iteration counts.
    pub verbose: bool,
}

/// Whether a line asks to leave the loop.
pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_SENTINEL)
}

/// Run the loop until the exit word or end of input.
pub async fn run_loop<H, R, W>(
    handler: &mut H,
    mut input: R,
    out: &mut W,
    options: LoopOptions,
) -> io::Result<LoopExit>
where
    H: TurnHandler + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "{} ", style("You:").green().bold())?;
        out.flush()?;

        let mut raw = Vec::new();
        if input.read_until(b'\n', &mut raw)? == 0 {
            writeln!(out)?;
            writeln!(out, "Goodbye!")?;
            return Ok(LoopExit::EndOfInput);
        }

        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(_) => {
                writeln!(
                    out,
                    "{} input is not valid UTF-8; switch the terminal encoding to UTF-8",
                    style("Error:").red().bold()
                )?;
                continue;
            }
        };

        if is_exit(&line) {
            writeln!(out, "Goodbye!")?;
            return Ok(LoopExit::Sentinel);
        }

        // Trailing newline only; the agent gets the rest verbatim.
        let text = line.trim_end_matches(['\n', '\r']);
        if text.trim().is_empty() {
            continue;
        }

        debug!("Dispatching turn ({} chars)", text.chars().count());
        match handler.handle(text).await {
            Ok(output) => print_turn(out, &output, options)?,
            Err(e) => writeln!(out, "{} {}", style("Error:").red().bold(), e)?,
        }
    }
}

fn print_turn<W: Write>(out: &mut W, output: &AgentOutput, options: LoopOptions) -> io::Result<()> {
    for record in &output.tool_calls {
        let mark = if record.ok {
            style("✓").green()
        } else {
            style("✗").red()
        };
        writeln!(out, "{}{}", style(format!("  [{}] ", record.name)).dim(), mark)?;

        if options.verbose {
            writeln!(out, "      {}", style(format!("args: {}", record.arguments)).dim())?;
            writeln!(
                out,
                "      {}",
                style(format!("result: {}", preview(&record.result, 200))).dim()
            )?;
        }
    }

    if options.verbose {
        writeln!(
            out,
            "{}",
            style(format!("  ({} model call(s))", output.iterations)).dim()
        )?;
    }

    writeln!(out, "\n{} {}\n", style("Assistant:").cyan().bold(), output.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolCallRecord;
    use crate::error::ToolchatError;
    use std::io::Cursor;

    /// Records inputs; fails on "boom".
    #[derive(Default)]
    struct RecordingHandler {
        inputs: Vec<String>,
    }

    #[async_trait]
    impl TurnHandler for RecordingHandler {
        async fn handle(&mut self, input: &str) -> Result<AgentOutput> {
            self.inputs.push(input.to_string());
            if input == "boom" {
                return Err(ToolchatError::Agent("model unavailable".to_string()));
            }
            Ok(AgentOutput {
                output: format!("echo: {}", input),
                tool_calls: vec![ToolCallRecord {
                    name: "Calculator".to_string(),
                    arguments: "{}".to_string(),
                    result: "1 + 1 = 2".to_string(),
                    ok: true,
                }],
                iterations: 2,
            })
        }
    }

    async fn drive(script: &str, options: LoopOptions) -> (LoopExit, Vec<String>, String) {
        drive_bytes(script.as_bytes(), options).await
    }

    async fn drive_bytes(script: &[u8], options: LoopOptions) -> (LoopExit, Vec<String>, String) {
        let mut handler = RecordingHandler::default();
        let mut out = Vec::new();
        let exit = run_loop(&mut handler, Cursor::new(script.to_vec()), &mut out, options)
            .await
            .unwrap();
        (exit, handler.inputs, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_is_exit() {
        assert!(is_exit("exit"));
        assert!(is_exit("  ExIt  \n"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("quit"));
    }

    #[tokio::test]
    async fn test_sentinel_exits_without_invoking_handler() {
        let (exit, inputs, out) = drive("  ExIt  \n", LoopOptions::default()).await;
        assert_eq!(exit, LoopExit::Sentinel);
        assert!(inputs.is_empty());
        assert!(out.contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let (exit, inputs, _) = drive("hello\n", LoopOptions::default()).await;
        assert_eq!(exit, LoopExit::EndOfInput);
        assert_eq!(inputs, vec!["hello"]);
    }

    #[tokio::test]
    async fn test_blank_lines_skipped_and_errors_continue() {
        let (exit, inputs, out) = drive("\n   \nboom\n2+2\nexit\nnever\n", LoopOptions::default()).await;
        assert_eq!(exit, LoopExit::Sentinel);
        assert_eq!(inputs, vec!["boom", "2+2"]);
        assert!(out.contains("model unavailable"));
        assert!(out.contains("echo: 2+2"));
        assert!(out.contains("[Calculator]"));
        assert!(!out.contains("never"));
    }

    #[tokio::test]
    async fn test_verbose_shows_tool_details() {
        let (_, _, out) = drive("hi\n", LoopOptions { verbose: true }).await;
        assert!(out.contains("result: 1 + 1 = 2"));
        assert!(out.contains("2 model call(s)"));

        let (_, _, quiet) = drive("hi\n", LoopOptions::default()).await;
        assert!(!quiet.contains("result:"));
    }

    #[tokio::test]
    async fn test_non_utf8_line_reports_error_and_continues() {
        // "北京" in GBK.
        let (exit, inputs, out) = drive_bytes(b"\xb1\xb1\xbe\xa9\nhello\nexit\n", LoopOptions::default()).await;
        assert_eq!(exit, LoopExit::Sentinel);
        assert_eq!(inputs, vec!["hello"]);
        assert!(out.contains("not valid UTF-8"));
        assert!(out.contains("echo: hello"));
    }
}
