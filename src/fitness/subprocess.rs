//! Subprocess-backed evaluator
//!
//! Runs the seeding procedure as an external program once per candidate:
//!
//! ```text
//! <program> <base args...> --sf-<name> <value> --sf-<name> <value> ...
//! ```
//!
//! The program must print one line containing the record tag (default
//! `mlTag`) with at least seven comma-separated tokens. Tokens 2, 4 and 6 are
//! efficiency, fake rate and duplicate rate as fractions; they are scaled to
//! percent here. Anything else is an evaluation failure, never a crash.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::instrument;

use crate::fitness::evaluator::{EvaluationFailure, EvaluationOutcome, FitnessEvaluator};
use crate::fitness::traits::SeedingFitness;
use crate::genome::parameter_space::ParameterAssignment;

/// Default tag of the output record
pub const DEFAULT_RECORD_TAG: &str = "mlTag";

/// Default prefix of per-parameter command-line flags
pub const DEFAULT_ARGUMENT_PREFIX: &str = "--sf-";

const EFFICIENCY_TOKEN: usize = 2;
const FAKE_RATE_TOKEN: usize = 4;
const DUPLICATE_RATE_TOKEN: usize = 6;
const MIN_TOKENS: usize = 7;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Evaluator that shells out to the seeding program
#[derive(Clone, Debug)]
pub struct SubprocessEvaluator {
    program: PathBuf,
    base_args: Vec<String>,
    argument_prefix: String,
    record_tag: String,
    timeout: Option<Duration>,
}

impl SubprocessEvaluator {
    /// Evaluator running `program` with no fixed arguments and no timeout
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            argument_prefix: DEFAULT_ARGUMENT_PREFIX.to_string(),
            record_tag: DEFAULT_RECORD_TAG.to_string(),
            timeout: None,
        }
    }

    /// Arguments passed before the tuned parameters
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Prefix of each parameter flag
    pub fn with_argument_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.argument_prefix = prefix.into();
        self
    }

    /// Tag identifying the output record
    pub fn with_record_tag(mut self, tag: impl Into<String>) -> Self {
        self.record_tag = tag.into();
        self
    }

    /// Kill the program and report a failure after this long
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Program path
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full argument list for one candidate
    pub fn command_args(&self, parameters: &[ParameterAssignment]) -> Vec<String> {
        let mut args = self.base_args.clone();
        for p in parameters {
            args.push(format!("{}{}", self.argument_prefix, p.name));
            args.push(p.value.to_string());
        }
        args
    }

    fn run(&self, args: &[String]) -> Result<String, EvaluationFailure> {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EvaluationFailure::Spawn(format!("{}: {}", self.program.display(), e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| EvaluationFailure::Spawn("stdout not captured".to_string()))?;

        // Drain stdout concurrently so a chatty program cannot block on a full pipe.
        // Processes the program leaves behind may hold the pipe open past its
        // exit, so the reader is never joined, only received from.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = tx.send(stdout.read_to_end(&mut buf).map(|_| buf));
        });

        let status = self.wait(&mut child, deadline)?;
        tracing::debug!(status = %status, "seeding program exited");

        let received = match (deadline, self.timeout) {
            (Some(deadline), Some(timeout)) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(read) => read,
                    Err(RecvTimeoutError::Timeout) => return Err(EvaluationFailure::Timeout(timeout)),
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(EvaluationFailure::Other("stdout reader stopped".to_string()))
                    }
                }
            }
            _ => rx
                .recv()
                .map_err(|_| EvaluationFailure::Other("stdout reader stopped".to_string()))?,
        };
        let bytes = received.map_err(|e| EvaluationFailure::Other(format!("reading stdout: {}", e)))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn wait(&self, child: &mut Child, deadline: Option<Instant>) -> Result<ExitStatus, EvaluationFailure> {
        let (Some(deadline), Some(timeout)) = (deadline, self.timeout) else {
            return child
                .wait()
                .map_err(|e| EvaluationFailure::Other(format!("waiting for child: {}", e)));
        };

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(EvaluationFailure::Timeout(timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(EvaluationFailure::Other(format!("waiting for child: {}", e)));
                }
            }
        }
    }
}

impl FitnessEvaluator for SubprocessEvaluator {
    #[instrument(level = "debug", skip_all, fields(program = %self.program.display()))]
    fn evaluate(&self, parameters: &[ParameterAssignment]) -> EvaluationOutcome {
        let args = self.command_args(parameters);
        self.run(&args)
            .and_then(|output| parse_record(&output, &self.record_tag))
            .into()
    }
}

/// Extract the fitness triple from the program's output
///
/// The first line containing `tag` is the record. Its comma-separated tokens
/// 2, 4 and 6 are efficiency, fake rate and duplicate rate as fractions; the
/// returned values are in percent.
pub fn parse_record(output: &str, tag: &str) -> Result<SeedingFitness, EvaluationFailure> {
    let line = output
        .lines()
        .find(|line| line.contains(tag))
        .ok_or_else(|| EvaluationFailure::MissingRecord(tag.to_string()))?;

    let tokens: Vec<&str> = line.trim().split(',').collect();
    if tokens.len() < MIN_TOKENS {
        return Err(EvaluationFailure::MalformedRecord(format!(
            "expected at least {} tokens, got {}",
            MIN_TOKENS,
            tokens.len()
        )));
    }

    let fraction = |index: usize| -> Result<f64, EvaluationFailure> {
        let token = tokens[index].trim();
        token.parse::<f64>().map_err(|_| {
            EvaluationFailure::MalformedRecord(format!("token {} is not a number: {:?}", index, token))
        })
    };

    Ok(SeedingFitness::new(
        100.0 * fraction(EFFICIENCY_TOKEN)?,
        100.0 * fraction(FAKE_RATE_TOKEN)?,
        100.0 * fraction(DUPLICATE_RATE_TOKEN)?,
    ))
}
