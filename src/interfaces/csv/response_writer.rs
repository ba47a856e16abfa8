use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// One output row per processed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub line: u64,
    pub operation: String,
    pub status: Status,
    /// JSON payload for successes, the error message for failures.
    pub payload: String,
}

impl Response {
    pub fn ok(line: u64, operation: &str, payload: Option<serde_json::Value>) -> Self {
        Self {
            line,
            operation: operation.to_string(),
            status: Status::Ok,
            payload: payload.map(|value| value.to_string()).unwrap_or_default(),
        }
    }

    pub fn error(line: u64, operation: &str, message: impl ToString) -> Self {
        Self {
            line,
            operation: operation.to_string(),
            status: Status::Error,
            payload: message.to_string(),
        }
    }
}

/// Writes responses as CSV with the header `line,operation,status,payload`.
pub struct ResponseWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, response: &Response) -> Result<()> {
        self.writer.serialize(response)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
