//! FILENAME: core/engine-bridge/src/host.rs
//! PURPOSE: Engine session over an external spreadsheet host process.
//! CONTEXT: The engine artifact (a workbook with named input/output sheets)
//! is driven by a host program that owns the actual spreadsheet runtime.
//! This module spawns that program and speaks a newline-delimited JSON
//! request/response protocol over its stdin/stdout: open, set, calculate,
//! read, close. One process is one engine instance.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use scenario::SlotValue;

use crate::error::EngineError;
use crate::session::{EngineConnector, EngineSession};
use crate::table::{CellValue, OutputRegion};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// How to launch the host process and which artifact to open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    /// Host program; receives the protocol on stdin and answers on stdout.
    pub command: String,
    pub args: Vec<String>,
    /// Workbook the host should open. The slot identifiers and output
    /// region bounds elsewhere in this repository are a contract with this
    /// specific artifact.
    pub workbook: String,
    pub input_sheet: String,
    pub output_sheet: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            command: "spreadsheet-host".to_string(),
            args: Vec::new(),
            workbook: "ASHP Calculator - U of C.xlsm".to_string(),
            input_sheet: "User Inputs".to_string(),
            output_sheet: "Outputs".to_string(),
        }
    }
}

// ============================================================================
// WIRE PROTOCOL
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum HostRequest<'a> {
    #[serde(rename_all = "camelCase")]
    Open {
        workbook: &'a str,
        input_sheet: &'a str,
        output_sheet: &'a str,
    },
    Set {
        slot: &'a str,
        value: &'a SlotValue,
    },
    Calculate,
    Read {
        range: &'a str,
    },
    Close,
}

/// One reply line from the host.
#[derive(Debug, Deserialize)]
struct HostReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    rows: Option<Vec<Vec<CellValue>>>,
}

impl HostReply {
    fn reason(&self) -> String {
        self.error.clone().unwrap_or_else(|| "unspecified host error".to_string())
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// A live host process with an opened workbook.
#[derive(Debug)]
pub struct HostSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl HostSession {
    /// Spawns the host program and opens the configured workbook.
    pub fn open(config: &HostConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| {
                EngineError::Unavailable(format!("failed to spawn {}: {}", config.command, err))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("host stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EngineError::Unavailable("host stdout not captured".to_string()))?;

        let mut session = HostSession {
            child,
            stdin,
            stdout,
            closed: false,
        };

        let reply = session.exchange(&HostRequest::Open {
            workbook: &config.workbook,
            input_sheet: &config.input_sheet,
            output_sheet: &config.output_sheet,
        })?;
        if !reply.ok {
            return Err(EngineError::Unavailable(format!(
                "host could not open {}: {}",
                config.workbook,
                reply.reason()
            )));
        }
        Ok(session)
    }

    /// Sends one request line and reads one reply line. Transport loss at
    /// this level means the instance is gone, regardless of which operation
    /// was in flight.
    fn exchange(&mut self, request: &HostRequest<'_>) -> Result<HostReply, EngineError> {
        let mut line = serde_json::to_string(request)
            .map_err(|err| EngineError::Unavailable(format!("request encoding failed: {}", err)))?;
        line.push('\n');

        self.stdin
            .write_all(line.as_bytes())
            .and_then(|_| self.stdin.flush())
            .map_err(|err| EngineError::Unavailable(format!("host stdin closed: {}", err)))?;

        let mut reply = String::new();
        let read = self
            .stdout
            .read_line(&mut reply)
            .map_err(|err| EngineError::Unavailable(format!("host stdout failed: {}", err)))?;
        if read == 0 {
            return Err(EngineError::Unavailable("host process ended its output".to_string()));
        }
        serde_json::from_str(&reply)
            .map_err(|err| EngineError::Unavailable(format!("malformed host reply: {}", err)))
    }
}

impl EngineSession for HostSession {
    fn write_slot(&mut self, slot: &str, value: &SlotValue) -> Result<(), EngineError> {
        let reply = self.exchange(&HostRequest::Set { slot, value })?;
        if !reply.ok {
            return Err(EngineError::Write {
                slot: slot.to_string(),
                reason: reply.reason(),
            });
        }
        Ok(())
    }

    fn recalculate(&mut self) -> Result<(), EngineError> {
        let reply = self.exchange(&HostRequest::Calculate)?;
        if !reply.ok {
            return Err(EngineError::Compute(reply.reason()));
        }
        Ok(())
    }

    fn read_region(&mut self, region: &OutputRegion) -> Result<Vec<Vec<CellValue>>, EngineError> {
        let reply = self.exchange(&HostRequest::Read {
            range: &region.range,
        })?;
        if !reply.ok {
            return Err(EngineError::Read(reply.reason()));
        }
        reply
            .rows
            .ok_or_else(|| EngineError::Read("host reply carried no rows".to_string()))
    }

    fn close(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let reply = self.exchange(&HostRequest::Close)?;
        if !reply.ok {
            return Err(EngineError::Unavailable(format!(
                "host refused to close: {}",
                reply.reason()
            )));
        }
        Ok(())
    }
}

impl Drop for HostSession {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.exchange(&HostRequest::Close);
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Opens `HostSession`s for the pool, one process per instance.
pub struct HostConnector {
    config: HostConfig,
}

impl HostConnector {
    pub fn new(config: HostConfig) -> Self {
        HostConnector { config }
    }
}

impl EngineConnector for HostConnector {
    fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        HostSession::open(&self.config).map(|session| Box::new(session) as Box<dyn EngineSession>)
    }
}
