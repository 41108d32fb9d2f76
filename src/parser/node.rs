//! DBML parsing through Node.js and `@dbml/core`.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{DbmlParser, ParseError, decode_payload};
use crate::config::ParserConfig;
use crate::payload::NormalizedPayload;

const BUNDLED_SCRIPT: &str = include_str!("../../js/parse-dbml.js");
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs the bundled script (or a configured one) under Node.js and decodes
/// the database export it prints.
#[derive(Debug, Clone, Default)]
pub struct NodeDbmlParser {
    config: ParserConfig,
}

impl NodeDbmlParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    fn command(&self) -> Result<Command, ParseError> {
        let node = which::which(&self.config.node_binary)
            .map_err(|_| ParseError::NodeNotFound(self.config.node_binary.clone()))?;

        let mut command = Command::new(node);
        match &self.config.script {
            Some(script) => {
                if !script.is_file() {
                    return Err(ParseError::ScriptMissing(script.clone()));
                }
                command.arg(script);
            }
            None => {
                command.arg("-e").arg(BUNDLED_SCRIPT);
            }
        }

        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(command)
    }

    fn run(&self, source: &str) -> Result<String, ParseError> {
        let deadline = Instant::now() + self.config.timeout;
        let mut child = self.command()?.spawn().map_err(ParseError::Spawn)?;

        // Pipe threads are never joined: a process the script left behind
        // can keep the pipes open past the deadline.
        let stdin = child.stdin.take();
        let input = source.to_string();
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // A script that exits early closes the pipe; its stderr says why.
                let _ = stdin.write_all(input.as_bytes());
            }
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let timeout = ParseError::Timeout {
            seconds: self.config.timeout.as_secs(),
        };

        let Some(status) = wait_with_deadline(&mut child, deadline)? else {
            return Err(timeout);
        };

        let (Some(stdout), Some(stderr)) = (
            collect_until(&stdout, deadline),
            collect_until(&stderr, deadline),
        ) else {
            return Err(timeout);
        };

        if !status.success() {
            let message = stderr.trim();
            return Err(ParseError::Failed(if message.is_empty() {
                "parse failed".to_string()
            } else {
                message.to_string()
            }));
        }

        debug!("parser produced {} bytes", stdout.len());
        Ok(stdout)
    }
}

impl DbmlParser for NodeDbmlParser {
    fn parse(&self, source: &str) -> Result<NormalizedPayload, ParseError> {
        let output = self.run(source)?;
        decode_payload(&output)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut text);
        }
        let _ = tx.send(text);
    });
    rx
}

/// `None` when the pipe is still open at the deadline.
fn collect_until(output: &Receiver<String>, deadline: Instant) -> Option<String> {
    output
        .recv_timeout(deadline.saturating_duration_since(Instant::now()))
        .ok()
}

/// `Ok(None)` when the deadline passed; the child is killed in that case.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
) -> Result<Option<ExitStatus>, ParseError> {
    loop {
        if let Some(status) = child.try_wait().map_err(ParseError::Spawn)? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
