//! Attempt launchers
//!
//! A launcher starts one attempt at a validation and hands back a handle the
//! scheduler polls without blocking. Two launchers exist:
//!
//! - [`ThreadLauncher`] performs the check on a dedicated thread. A thread
//!   cannot be stopped: an overrunning attempt is aborted by discarding its
//!   report, and stays [`AttemptHandle::is_running`] until the check returns
//!   on its own.
//! - [`ProcessLauncher`] re-executes a worker binary per attempt. The worker
//!   reads a [`WorkerRequest`] file and prints one [`AttemptReport`] line.
//!   On unix every worker leads its own process group, and aborting kills the
//!   whole group, including anything the check started.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;

use super::executor;
use super::protocol::{AttemptReport, WorkerRequest};
use crate::core::models::GroupFailures;
use crate::core::ports::Validation;
use crate::error::RunError;

/// An in-flight attempt
pub trait AttemptHandle {
    /// The report, if the attempt has finished
    fn poll(&mut self) -> Option<AttemptReport>;

    /// Stop the attempt, or stop waiting for it when it cannot be stopped
    fn abort(&mut self);

    /// Whether the attempt's work is still executing
    fn is_running(&mut self) -> bool;

    /// Block until the attempt's work has stopped executing
    fn wait(&mut self);
}

/// Starts attempts
pub trait Launcher: Send + Sync + std::fmt::Debug {
    /// Start an attempt at the validation at `index`
    ///
    /// Launch errors are reported through the returned handle as failures.
    fn launch(
        &self,
        index: usize,
        validation: &Arc<dyn Validation>,
        group_failures: &Arc<GroupFailures>,
    ) -> Box<dyn AttemptHandle>;
}

/// An attempt that finished before it was handed out
#[derive(Debug)]
struct Finished(Option<AttemptReport>);

impl AttemptHandle for Finished {
    fn poll(&mut self) -> Option<AttemptReport> {
        self.0.take()
    }

    fn abort(&mut self) {}

    fn is_running(&mut self) -> bool {
        false
    }

    fn wait(&mut self) {}
}

/// Performs each attempt on its own thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLauncher;

#[derive(Debug)]
struct ThreadAttempt {
    name: String,
    started: Instant,
    rx: Receiver<AttemptReport>,
    thread: Option<JoinHandle<()>>,
}

impl Launcher for ThreadLauncher {
    fn launch(
        &self,
        index: usize,
        validation: &Arc<dyn Validation>,
        group_failures: &Arc<GroupFailures>,
    ) -> Box<dyn AttemptHandle> {
        let (tx, rx) = mpsc::channel();
        let check = Arc::clone(validation);
        let snapshot = Arc::clone(group_failures);

        let spawned = std::thread::Builder::new()
            .name(format!("vigil-check-{index}"))
            .spawn(move || {
                // Nothing reads the report of an aborted attempt.
                let _ = tx.send(executor::perform(check.as_ref(), &snapshot));
            });

        match spawned {
            Ok(thread) => Box::new(ThreadAttempt {
                name: validation.name().to_string(),
                started: Instant::now(),
                rx,
                thread: Some(thread),
            }),
            Err(e) => Box::new(Finished(Some(AttemptReport::crashed(
                format!("could not start check thread: {e}"),
                Duration::ZERO,
            )))),
        }
    }
}

impl AttemptHandle for ThreadAttempt {
    fn poll(&mut self) -> Option<AttemptReport> {
        match self.rx.try_recv() {
            Ok(report) => Some(report),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(AttemptReport::crashed(
                "check thread exited without reporting",
                self.started.elapsed(),
            )),
        }
    }

    fn abort(&mut self) {
        log::debug!("Discarding the report of the thread running '{}'", self.name);
    }

    fn is_running(&mut self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    fn wait(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log::debug!("Thread running '{}' panicked", self.name);
        }
    }
}

/// Performs each attempt in a separate worker process
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    /// Launch `program args... --request <file>` per attempt
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Launch the currently running executable with `args`
    pub fn current_exe(args: impl IntoIterator<Item = impl Into<OsString>>) -> Result<Self, RunError> {
        Ok(Self::new(std::env::current_exe()?, args))
    }

    fn spawn(&self, index: usize, group_failures: &GroupFailures) -> Result<ProcessAttempt, RunError> {
        let request = WorkerRequest {
            index,
            group_failures: group_failures.clone(),
        };
        let mut request_file = NamedTempFile::new()?;
        serde_json::to_writer(&mut request_file, &request)?;

        let stdout = tempfile::tempfile()?;
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--request")
            .arg(request_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout.try_clone()?))
            .stderr(Stdio::inherit());
        lead_process_group(&mut command);
        let child = command.spawn()?;

        Ok(ProcessAttempt {
            child,
            started: Instant::now(),
            stdout,
            _request: request_file,
        })
    }
}

impl Launcher for ProcessLauncher {
    fn launch(
        &self,
        index: usize,
        validation: &Arc<dyn Validation>,
        group_failures: &Arc<GroupFailures>,
    ) -> Box<dyn AttemptHandle> {
        match self.spawn(index, group_failures) {
            Ok(attempt) => {
                log::debug!("Started worker {} for '{}'", attempt.child.id(), validation.name());
                Box::new(attempt)
            },
            Err(e) => Box::new(Finished(Some(AttemptReport::crashed(
                format!("could not start worker: {e}"),
                Duration::ZERO,
            )))),
        }
    }
}

#[derive(Debug)]
struct ProcessAttempt {
    child: Child,
    started: Instant,
    stdout: File,
    _request: NamedTempFile,
}

impl ProcessAttempt {
    fn collect(&mut self, status: ExitStatus) -> AttemptReport {
        let report = self
            .stdout
            .seek(SeekFrom::Start(0))
            .map_err(RunError::from)
            .and_then(|_| AttemptReport::read_last(BufReader::new(&self.stdout)));

        match report {
            Ok(Some(report)) => report,
            Ok(None) => AttemptReport::crashed(
                format!("worker exited with {status} without reporting"),
                self.started.elapsed(),
            ),
            Err(e) => AttemptReport::crashed(
                format!("worker exited with {status}; unreadable report: {e}"),
                self.started.elapsed(),
            ),
        }
    }
}

impl AttemptHandle for ProcessAttempt {
    fn poll(&mut self) -> Option<AttemptReport> {
        match self.child.try_wait() {
            Ok(None) => None,
            Ok(Some(status)) => Some(self.collect(status)),
            Err(e) => Some(AttemptReport::crashed(
                format!("could not wait for worker: {e}"),
                self.started.elapsed(),
            )),
        }
    }

    fn abort(&mut self) {
        log::debug!("Killing worker {}", self.child.id());
        kill_process_group(&mut self.child);
        let _ = self.child.wait();
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn wait(&mut self) {
        let _ = self.child.wait();
    }
}

impl Drop for ProcessAttempt {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            self.abort();
        }
    }
}

#[cfg(unix)]
fn lead_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(not(unix))]
fn lead_process_group(_command: &mut Command) {}

/// Kill `child` and every process in the group it leads
///
/// Must run before `child` is reaped, while its pid still names the group.
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    match i32::try_from(child.id()) {
        Ok(pid) => {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                log::debug!("Could not kill process group {pid}: {e}");
                let _ = child.kill();
            }
        },
        Err(_) => {
            let _ = child.kill();
        },
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}
