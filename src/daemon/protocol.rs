//! Line protocol spoken on the ping listener
//!
//! One request per line, case-insensitive:
//! - `PING` → `OK`
//! - `STATUS` → one line of JSON (a [`LivenessSnapshot`])
//! - anything else → `ERR <message>`

use std::str::FromStr;

use thiserror::Error;

use crate::liveness::LivenessSnapshot;

/// Longest request line the listener accepts
pub const MAX_REQUEST_LENGTH: usize = 1024;

/// Longest response line the client accepts
pub const MAX_RESPONSE_LENGTH: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid status payload: {0}")]
    InvalidStatus(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Ping,
    Status,
}

impl Request {
    pub fn as_line(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Status => "STATUS",
        }
    }
}

impl FromStr for Request {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "PING" => Ok(Self::Ping),
            "STATUS" => Ok(Self::Status),
            _ => Err(ProtocolError::UnknownCommand(trimmed.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ok,
    Status(LivenessSnapshot),
    Error(String),
}

impl Response {
    pub fn encode(&self) -> String {
        match self {
            Self::Ok => "OK".to_string(),
            Self::Status(snapshot) => serde_json::to_string(snapshot)
                .unwrap_or_else(|e| format!("ERR failed to encode status: {e}")),
            Self::Error(message) => format!("ERR {}", single_line(message)),
        }
    }

    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if line == "OK" {
            return Ok(Self::Ok);
        }
        if let Some(message) = line.strip_prefix("ERR") {
            return Ok(Self::Error(message.trim_start().to_string()));
        }
        if line.starts_with('{') {
            return Ok(Self::Status(serde_json::from_str(line)?));
        }
        Err(ProtocolError::UnexpectedResponse(line.to_string()))
    }
}

fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::LivenessState;
    use chrono::Utc;

    #[test]
    fn test_parse_requests_case_insensitive() {
        assert_eq!("PING".parse::<Request>().unwrap(), Request::Ping);
        assert_eq!("ping".parse::<Request>().unwrap(), Request::Ping);
        assert_eq!("  Status \r".parse::<Request>().unwrap(), Request::Status);
    }

    #[test]
    fn test_unknown_request() {
        let err = "reboot".parse::<Request>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command: reboot");
    }

    #[test]
    fn test_request_lines_parse_back() {
        for request in [Request::Ping, Request::Status] {
            assert_eq!(request.as_line().parse::<Request>().unwrap(), request);
        }
    }

    #[test]
    fn test_ok_response() {
        assert_eq!(Response::Ok.encode(), "OK");
        assert_eq!(Response::parse("OK\r").unwrap(), Response::Ok);
    }

    #[test]
    fn test_error_response_is_single_line() {
        let encoded = Response::Error("bad\nthing".to_string()).encode();
        assert_eq!(encoded, "ERR bad thing");
        assert_eq!(
            Response::parse(&encoded).unwrap(),
            Response::Error("bad thing".to_string())
        );
    }

    #[test]
    fn test_status_response() {
        let snapshot = LivenessSnapshot {
            state: LivenessState::Dead,
            previous_state: Some(LivenessState::Alive),
            last_ping_at: Utc::now(),
            elapsed_ms: 12_000,
            timeout_ms: 10_000,
            alert_sent: true,
            resolve_sent: false,
            sinks: vec!["log".to_string()],
        };
        let encoded = Response::Status(snapshot.clone()).encode();
        assert!(!encoded.contains('\n'));
        assert_eq!(
            Response::parse(&encoded).unwrap(),
            Response::Status(snapshot)
        );
    }

    #[test]
    fn test_garbage_response() {
        assert!(matches!(
            Response::parse("HELLO"),
            Err(ProtocolError::UnexpectedResponse(_))
        ));
        assert!(matches!(
            Response::parse("{not json"),
            Err(ProtocolError::InvalidStatus(_))
        ));
    }
}
