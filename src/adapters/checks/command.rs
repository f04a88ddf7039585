//! Command check
//!
//! Runs an external program and inspects its exit code and stdout.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use regex::Regex;

use crate::core::models::GroupFailures;
use crate::core::ports::{Validation, ValidationInfo};
use crate::error::CheckError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs `program args...` and checks what it produced
#[derive(Debug)]
pub struct CommandCheck {
    info: ValidationInfo,
    program: String,
    args: Vec<String>,
    expect_exit: i32,
    stdout_contains: Option<String>,
    stdout_matches: Option<Regex>,
}

impl CommandCheck {
    /// Create a check expecting exit code 0
    pub fn new(info: ValidationInfo, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            info,
            program: program.into(),
            args,
            expect_exit: 0,
            stdout_contains: None,
            stdout_matches: None,
        }
    }

    /// Expect a different exit code
    #[must_use]
    pub const fn with_expect_exit(mut self, code: i32) -> Self {
        self.expect_exit = code;
        self
    }

    /// Require stdout to contain `needle`
    #[must_use]
    pub fn with_stdout_contains(mut self, needle: impl Into<String>) -> Self {
        self.stdout_contains = Some(needle.into());
        self
    }

    /// Require stdout to match `pattern`
    #[must_use]
    pub fn with_stdout_matches(mut self, pattern: Regex) -> Self {
        self.stdout_matches = Some(pattern);
        self
    }

    /// The command line as a single string
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn execute(&self) -> Result<(ExitStatus, String, String), CheckError> {
        let mut stdout = tempfile::tempfile()?;
        let mut stderr = tempfile::tempfile()?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout.try_clone()?))
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn()
            .map_err(|e| CheckError::fail(format!("could not run '{}': {e}", self.command_line())))?;

        let status = match self.info.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let start = Instant::now();
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(CheckError::fail(format!(
                            "'{}' did not finish within {}s",
                            self.command_line(),
                            timeout.as_secs_f64()
                        )));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            },
        };

        Ok((status, read_all(&mut stdout)?, read_all(&mut stderr)?))
    }
}

fn read_all(file: &mut File) -> std::io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Validation for CommandCheck {
    fn info(&self) -> &ValidationInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ValidationInfo {
        &mut self.info
    }

    fn kind(&self) -> &'static str {
        "command"
    }

    fn perform(&self, _group_failures: &GroupFailures) -> Result<(), CheckError> {
        let (status, stdout, stderr) = self.execute()?;

        if status.code() != Some(self.expect_exit) {
            let stderr = stderr.trim();
            let mut reason = format!(
                "'{}' exited with {status}, expected code {}",
                self.command_line(),
                self.expect_exit
            );
            if !stderr.is_empty() {
                reason.push_str(": ");
                reason.push_str(stderr);
            }
            return Err(CheckError::fail(reason));
        }

        if let Some(needle) = &self.stdout_contains
            && !stdout.contains(needle.as_str())
        {
            return Err(CheckError::fail(format!(
                "output of '{}' does not contain '{needle}'",
                self.command_line()
            )));
        }

        if let Some(pattern) = &self.stdout_matches
            && !pattern.is_match(&stdout)
        {
            return Err(CheckError::fail(format!(
                "output of '{}' does not match /{pattern}/",
                self.command_line()
            )));
        }

        Ok(())
    }
}
