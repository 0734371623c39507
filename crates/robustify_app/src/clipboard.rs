//! Clipboard access through the platform's command-line tools.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use robustify_logging::{robustify_debug, robustify_warn};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("no clipboard tool found")]
    Unavailable,
    #[error("{tool} failed: {message}")]
    Tool { tool: &'static str, message: String },
}

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Tries each known tool in turn; the first one that succeeds wins.
pub struct SystemClipboard {
    tools: &'static [(&'static str, &'static [&'static str])],
}

const TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip", &[]),
];

impl Default for SystemClipboard {
    fn default() -> Self {
        Self { tools: TOOLS }
    }
}

impl Clipboard for SystemClipboard {
    /// A tool that is installed but fails (no display, say) does not stop
    /// the search. The first failure is reported if no tool works.
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut first_failure = None;
        for (tool, args) in self.tools {
            match pipe_to(tool, args, text) {
                Ok(()) => {
                    robustify_debug!("Copied {} bytes with {}", text.len(), tool);
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    robustify_warn!("Clipboard tool {} failed: {}", tool, err);
                    first_failure.get_or_insert(ClipboardError::Tool {
                        tool,
                        message: err.to_string(),
                    });
                }
            }
        }
        Err(first_failure.unwrap_or(ClipboardError::Unavailable))
    }
}

fn pipe_to(tool: &str, args: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    // Dropping stdin closes the pipe, so the child can exit before we reap it.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("exited with {status}")))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tools_mean_unavailable() {
        let mut clipboard = SystemClipboard {
            tools: &[("robustify-no-such-clipboard-tool", &[])],
        };
        assert!(matches!(
            clipboard.copy("x"),
            Err(ClipboardError::Unavailable)
        ));
    }

    #[test]
    fn failing_tool_falls_through_to_the_next_one() {
        let mut clipboard = SystemClipboard {
            tools: &[("false", &[]), ("cat", &[])],
        };
        assert!(clipboard.copy("x").is_ok());
    }

    #[test]
    fn failing_tool_is_reported_when_nothing_else_works() {
        let mut clipboard = SystemClipboard {
            tools: &[("false", &[]), ("robustify-no-such-clipboard-tool", &[])],
        };
        assert!(matches!(
            clipboard.copy("x"),
            Err(ClipboardError::Tool { tool: "false", .. })
        ));
    }

    #[test]
    fn tool_that_ignores_stdin_is_still_reaped() {
        let text = "x".repeat(1 << 20);
        let mut clipboard = SystemClipboard {
            tools: &[("true", &[])],
        };
        // `true` exits without reading, so the write may hit a broken pipe.
        // Either way the call returns instead of leaving a zombie behind.
        match clipboard.copy(&text) {
            Ok(()) => {}
            Err(ClipboardError::Tool { tool, .. }) => assert_eq!(tool, "true"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
