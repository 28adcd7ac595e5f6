//! # photolab
//!
//! A toy photosynthesis lab: three environmental controls (light, CO2,
//! temperature) drive a closed-form rate model, a one-second clock samples the
//! rate into a short rolling history, and a tutor answers questions about the
//! current conditions.
//!
//! ## Quick Start
//!
//! ```
//! use photolab::prelude::*;
//!
//! let mut lab = Lab::new();
//! lab.update_parameters(ParameterUpdate {
//!     light_intensity: Some(80.0),
//!     ..ParameterUpdate::default()
//! });
//!
//! // One clock step records (time, rate) into the history window.
//! let point = lab.tick().unwrap();
//! assert_eq!(point.time, 0);
//! assert!(point.rate > 0.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialization of snapshots and the [`protocol`] module
//!
//! ## Modules
//!
//! - [`rate`]: the rate model
//! - [`state`]: parameter snapshot and run flag
//! - [`history`]: bounded sample window
//! - [`lab`]: one simulation session
//! - [`chat`]: tutor conversation log
//! - [`observer`]: read-only snapshots for presentation
//! - [`protocol`]: JSON-lines messages spoken by `photolabd`

#[path = "core/rate.rs"]
pub mod rate;

#[path = "core/state.rs"]
pub mod state;

#[path = "core/history.rs"]
pub mod history;

#[path = "core/chat.rs"]
pub mod chat;

#[path = "core/lab.rs"]
pub mod lab;

pub mod observer;

#[cfg(feature = "serde")]
pub mod protocol;

/// Prelude module for convenient imports.
///
/// ```
/// use photolab::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chat::{ChatLog, Message, Role};
    pub use crate::history::{DataPoint, History, HISTORY_CAPACITY};
    pub use crate::lab::Lab;
    pub use crate::observer::{LabAdapter, LabSnapshot};
    pub use crate::rate::{compute_rate, limiting_factor, LimitingFactor, RateBreakdown};
    pub use crate::state::{ParameterUpdate, SimulationParameters, SimulationState, StateStore};
}
