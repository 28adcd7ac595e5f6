//! JSON-lines protocol between `photolabd` and its clients.
//!
//! Each request and each response is a single JSON object on its own line,
//! discriminated by a `type` field.

use serde::{Deserialize, Serialize};

use crate::chat::Message;
use crate::history::DataPoint;
use crate::observer::LabSnapshot;
use crate::state::ParameterUpdate;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9877";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    GetState,
    GetHistory,
    GetChat,
    SetParameters {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        light_intensity: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        co2_level: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<f64>,
    },
    ToggleSimulation,
    Start,
    Pause,
    Ask { question: String },
    Shutdown,
}

impl Request {
    pub fn set_parameters(update: ParameterUpdate) -> Self {
        Request::SetParameters {
            light_intensity: update.light_intensity,
            co2_level: update.co2_level,
            temperature: update.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    State(LabSnapshot),
    History { points: Vec<DataPoint> },
    Chat { messages: Vec<Message> },
    Reply { content: String },
    Success { message: String },
    Error { message: String },
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Response::Success {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

/// Serialize one message as a protocol line (trailing newline included).
pub fn encode_line<T: Serialize>(msg: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_type_tag() {
        let line = encode_line(&Request::Ask {
            question: "why?".to_string(),
        })
        .unwrap();
        assert_eq!(line, "{\"type\":\"Ask\",\"question\":\"why?\"}\n");

        let req: Request = serde_json::from_str("{\"type\":\"GetState\"}").unwrap();
        assert_eq!(req, Request::GetState);
    }

    #[test]
    fn set_parameters_fields_are_optional() {
        let req: Request =
            serde_json::from_str("{\"type\":\"SetParameters\",\"temperature\":31.5}").unwrap();
        assert_eq!(
            req,
            Request::set_parameters(ParameterUpdate {
                temperature: Some(31.5),
                ..ParameterUpdate::default()
            })
        );
    }

    #[test]
    fn unknown_request_is_an_error() {
        assert!(serde_json::from_str::<Request>("{\"type\":\"Explode\"}").is_err());
    }
}
