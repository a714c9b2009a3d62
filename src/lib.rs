//! # vMSC Signaling Front-End
//!
//! A virtual Mobile Switching Center signaling front-end for a GSM core
//! network: GSM 04.08 inspection, BSSAP/SCCP/M3UA encoding, Global Title
//! routing, and the subscriber/call/mobility state machines that sit
//! behind a UDP-framed SIGTRAN transport.
//!
//! ## Layering
//!
//! ```text
//! gsm0408  -- GSM 04.08 Layer 3 inspection (Location Updating, Mobile Identity)
//! bssap    -- DTAP / BSSMAP Complete-L3 / Clear Command framing
//! sccp     -- Connection Request / Data Form 1
//! m3ua     -- DATA message framing over UDP
//! routing  -- Global Title Engine: interface hint or declaration-order prefix match
//! ```
//!
//! `orchestrator` ties the state machines and transport together behind
//! a single `VmscOrchestrator`, gated on a running/stopped flag.

pub mod bcd;
pub mod bssap;
pub mod config;
pub mod errors;
pub mod gsm0408;
pub mod m3ua;
pub mod orchestrator;
pub mod routing;
pub mod sccp;
pub mod state;
pub mod transport;
pub mod types;

pub use config::VmscConfig;
pub use errors::{Result, VmscError};
pub use orchestrator::VmscOrchestrator;

/// Crate version, taken from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default UDP port this front-end listens/sends on for the A-interface.
pub const DEFAULT_M3UA_PORT: u16 = 2905;
