//! Provider backed by an external program.
//!
//! The prompt is written to the program's stdin and the first non-empty line
//! of its stdout is the answer. Anything can sit behind it: a local model
//! runner, a script calling a hosted API, `fortune`.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::prompt::build_prompt;
use crate::{CommentaryError, CommentaryProvider, CommentaryRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
}

impl CommandProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace. Returns `None` when it names no program.
    ///
    /// ```rust
    /// use derby_commentary::command::CommandProvider;
    ///
    /// let p = CommandProvider::from_cmdline("llm -m small").unwrap();
    /// assert_eq!(p.program(), "llm");
    /// assert_eq!(p.args(), ["-m", "small"]);
    /// assert!(CommandProvider::from_cmdline("  ").is_none());
    /// ```
    pub fn from_cmdline(cmdline: &str) -> Option<Self> {
        let mut parts = cmdline.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait::async_trait]
impl CommentaryProvider for CommandProvider {
    async fn comment(&self, request: &CommentaryRequest) -> Result<String, CommentaryError> {
        let prompt = build_prompt(request);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // programs that ignore stdin may close it before we finish writing
            match stdin.write_all(prompt.as_bytes()).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(CommentaryError::Failed(output.status.to_string()));
        }
        first_line(&String::from_utf8_lossy(&output.stdout)).ok_or(CommentaryError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "command"
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
