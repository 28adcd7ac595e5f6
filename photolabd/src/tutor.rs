use std::time::Duration;

use photolab::chat::FALLBACK_REPLY;
use photolab::rate::{LimitingFactor, RateBreakdown, OPTIMAL_TEMPERATURE};
use photolab::state::SimulationParameters;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, warn};

/// Sampling temperature requested from the text-generation bridge.
const GENERATION_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TutorMode {
    /// Every question gets the fallback reply.
    Off,
    /// Built-in explanation derived from the rate model.
    #[default]
    Stub,
    /// Forward to an external text-generation bridge.
    Endpoint,
}

impl TutorMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" | "false" => Some(TutorMode::Off),
            "stub" => Some(TutorMode::Stub),
            "endpoint" | "remote" => Some(TutorMode::Endpoint),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub mode: TutorMode,
    /// `host:port` of the bridge, used in `endpoint` mode.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            mode: TutorMode::default(),
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TutorError {
    #[error("tutor is disabled")]
    Disabled,

    #[error("endpoint mode without an endpoint address")]
    NoEndpoint,

    #[error("bridge i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("bridge did not answer within {0:?}")]
    Timeout(Duration),

    #[error("bridge message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bridge reported: {0}")]
    Bridge(String),

    #[error("bridge returned an empty reply")]
    EmptyReply,
}

/// One line sent to the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// One line received from the bridge: either `text` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeReply {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Instructions handed to the text generator. Carries the three controls only.
pub fn system_prompt(params: &SimulationParameters) -> String {
    format!(
        "You are a biology teacher explaining photosynthesis to a student.\n\
         The simulator currently shows:\n\
         - Light intensity: {:.0}%\n\
         - CO2 concentration: {:.0}%\n\
         - Temperature: {:.0}°C\n\n\
         Photosynthesis: 6CO2 + 6H2O + light -> C6H12O6 + 6O2.\n\
         Give a scientific but lively explanation grounded in the current values. \
         If a limiting factor (for example, too little light) is holding efficiency \
         down, point it out. Keep the tone warm and encouraging.",
        params.light_intensity, params.co2_level, params.temperature
    )
}

/// Offline explanation built from the rate model.
pub fn explain_stub(params: &SimulationParameters, question: &str) -> String {
    let b = RateBreakdown::of(params);
    let q = question.to_ascii_lowercase();
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(
        "At {:.0}% light, {:.0}% CO2 and {:.0}°C the leaf runs at {:.1}% efficiency.",
        params.light_intensity, params.co2_level, params.temperature, b.rate
    ));

    let asks_temperature = ["temp", "hot", "cold", "heat", "warm"]
        .iter()
        .any(|k| q.contains(k));

    match b.limiting() {
        LimitingFactor::Light if b.light_factor < 1.0 => parts.push(
            "Light is the limiting factor right now: the chloroplasts have CO2 to spare but \
             not enough photons to split water. Brighter light will raise the rate."
                .to_string(),
        ),
        LimitingFactor::Co2 if b.co2_factor < 1.0 => parts.push(
            "CO2 is the limiting factor right now: the light reactions are ready, but the \
             Calvin cycle is short of carbon to fix. More CO2 will raise the rate."
                .to_string(),
        ),
        _ if b.light_factor.min(b.co2_factor) >= 1.0 => parts.push(
            "Light and CO2 are both saturating, so adding more of either changes nothing."
                .to_string(),
        ),
        _ => parts.push(
            "Light and CO2 are exactly balanced; raising only one of them will not help."
                .to_string(),
        ),
    }

    let off_optimum = params.temperature - OPTIMAL_TEMPERATURE;
    if asks_temperature || b.temperature_factor < 0.9 {
        let text = if off_optimum > 0.5 {
            format!(
                "It is {:.0}°C above the {:.0}°C optimum, so enzymes like Rubisco start to \
                 lose their shape and efficiency falls to {:.0}% of its peak.",
                off_optimum,
                OPTIMAL_TEMPERATURE,
                b.temperature_factor * 100.0
            )
        } else if off_optimum < -0.5 {
            format!(
                "It is {:.0}°C below the {:.0}°C optimum, so enzyme reactions slow down and \
                 efficiency is {:.0}% of its peak.",
                -off_optimum,
                OPTIMAL_TEMPERATURE,
                b.temperature_factor * 100.0
            )
        } else {
            "The temperature is right at the optimum, so the enzymes are working at full speed."
                .to_string()
        };
        parts.push(text);
    }

    parts.push("Photosynthesis: 6CO2 + 6H2O + light -> C6H12O6 + 6O2. Keep experimenting!".to_string());
    parts.join(" ")
}

#[derive(Debug, Clone, Default)]
pub struct Tutor {
    cfg: TutorConfig,
}

impl Tutor {
    pub fn new(cfg: TutorConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.cfg
    }

    /// Answer a question about the given conditions.
    ///
    /// Never fails: any collaborator error is logged and replaced by the fallback reply.
    pub async fn explain(&self, params: &SimulationParameters, question: &str) -> String {
        match self.try_explain(params, question).await {
            Ok(text) => text,
            Err(e) => {
                warn!("tutor failed, answering with fallback: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn try_explain(
        &self,
        params: &SimulationParameters,
        question: &str,
    ) -> Result<String, TutorError> {
        match self.cfg.mode {
            TutorMode::Off => Err(TutorError::Disabled),
            TutorMode::Stub => Ok(explain_stub(params, question)),
            TutorMode::Endpoint => {
                let addr = self.cfg.endpoint.as_deref().ok_or(TutorError::NoEndpoint)?;
                let timeout = Duration::from_millis(self.cfg.timeout_ms.max(1));
                let req = BridgeRequest {
                    system: system_prompt(params),
                    prompt: question.to_string(),
                    temperature: GENERATION_TEMPERATURE,
                };
                time::timeout(timeout, ask_bridge(addr, &req))
                    .await
                    .map_err(|_| TutorError::Timeout(timeout))?
            }
        }
    }
}

/// Single attempt: one request line out, one reply line back.
async fn ask_bridge(addr: &str, req: &BridgeRequest) -> Result<String, TutorError> {
    debug!("asking tutor bridge at {}", addr);
    let stream = TcpStream::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();

    let mut line = serde_json::to_string(req)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;

    let mut resp = String::new();
    BufReader::new(reader).read_line(&mut resp).await?;
    if resp.trim().is_empty() {
        return Err(TutorError::EmptyReply);
    }

    let reply: BridgeReply = serde_json::from_str(&resp)?;
    if let Some(err) = reply.error {
        return Err(TutorError::Bridge(err));
    }
    match reply.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(TutorError::EmptyReply),
    }
}
