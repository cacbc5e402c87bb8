//! Forecast engine running as a child process.
//!
//! Protocol: the scenario state is written to the child's stdin as one JSON
//! document; the child writes one JSON document with
//! `predicted_glucose_values`, `recommended_bolus` and optionally
//! `input_data` to stdout and exits 0. One process per forecast call.
//!
//! The timeout covers the whole call: process exit, the stdin write and both
//! pipes reaching EOF. A helper the engine left running can hold a pipe open
//! past the child's exit; the call then times out and the pipe threads are
//! detached. They finish once the last holder of the pipe exits.

use crate::config::SweepConfig;
use loop_core::{EngineError, EngineOutput, ForecastEngine, ScenarioState};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

type Pending<T> = Receiver<std::io::Result<T>>;

#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Takes `call_timeout_ms` from the sweep config.
    pub fn with_config(self, config: &SweepConfig) -> Self {
        self.timeout(config.call_timeout_ms.map(Duration::from_millis))
    }

    fn spawn(&self) -> Result<Child, EngineError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(EngineError::Spawn)
    }

    fn timed_out(&self) -> EngineError {
        let after_ms = self.timeout.map_or(0, |t| t.as_millis() as u64);
        warn!(program = %self.program.display(), after_ms, "forecast engine timed out");
        EngineError::Timeout { after_ms }
    }

    fn wait(&self, child: &mut Child, deadline: Option<Instant>) -> Result<ExitStatus, EngineError> {
        let Some(deadline) = deadline else {
            return Ok(child.wait()?);
        };
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                // already-exited races are fine; the call fails either way
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn collect<T>(
        &self,
        pending: &Pending<T>,
        deadline: Option<Instant>,
        what: &str,
    ) -> Result<std::io::Result<T>, EngineError> {
        let received = match deadline {
            Some(deadline) => {
                pending.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => pending.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(result) => Ok(result),
            Err(RecvTimeoutError::Timeout) => Err(self.timed_out()),
            Err(RecvTimeoutError::Disconnected) => {
                Err(EngineError::Rejected(format!("{what} thread panicked")))
            }
        }
    }
}

impl ForecastEngine for CommandEngine {
    fn forecast(&self, state: &ScenarioState) -> Result<EngineOutput, EngineError> {
        let payload = serde_json::to_vec(state)?;
        let mut child = self.spawn()?;
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        let stdin = child.stdin.take();
        let written = background(move || {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&payload)?;
            }
            Ok(())
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child, deadline)?;
        let stdout = self.collect(&stdout, deadline, "stdout reader")??;
        let stderr = self.collect(&stderr, deadline, "stderr reader")??;
        let written = self.collect(&written, deadline, "stdin writer")?;

        if !status.success() {
            return Err(EngineError::Exit {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        // a child may answer without reading all of its input
        match written {
            Err(err) if err.kind() != ErrorKind::BrokenPipe => return Err(err.into()),
            _ => {}
        }
        debug!(bytes = stdout.len(), "forecast engine answered");
        Ok(serde_json::from_slice(&stdout)?)
    }
}

fn background<T, F>(task: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // the receiver is gone once the call has timed out
        let _ = tx.send(task());
    });
    rx
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Pending<Vec<u8>> {
    background(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}
