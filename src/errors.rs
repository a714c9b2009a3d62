//! Error types for the vMSC signaling stack.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VmscError>;

/// Top-level vMSC error.
///
/// Each variant either wraps a component-specific error via `#[from]` or
/// stands for one of the error kinds enumerated by the orchestrator and
/// transport layers directly.
#[derive(Debug, Error)]
pub enum VmscError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("orchestrator is not running")]
    NotRunning,

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Errors from the BCD codec and L3/BSSAP/SCCP/M3UA encoders.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("invalid decimal digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },
}

/// Errors from the Routing / GT Engine.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no route for {0:?}")]
    NoRoute(RouteTarget),
}

/// What the routing engine was asked to resolve, for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Interface(String),
    E164(String),
    Unspecified,
}

/// Errors from the Config Loader/Writer.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed section header at line {line}: {text:?}")]
    MalformedSection { line: usize, text: String },

    #[error("I/O error reading/writing config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed gt-route entry at line {line}: {text:?}")]
    MalformedRoute { line: usize, text: String },
}

/// Errors from the Interface State Machines (Subscriber/Call/Mobility).
#[derive(Debug, Error)]
pub enum StateError {
    #[error("subscriber {0} already registered")]
    DuplicateImsi(String),

    #[error("no entry found for {0:?}")]
    NotFound(LookupKey),

    #[error("call {call_id} is in state {actual:?}, expected {expected:?}")]
    WrongState {
        call_id: String,
        expected: String,
        actual: String,
    },

    #[error("handover already in progress for subscriber {0}")]
    AlreadyInProgress(String),
}

/// Identifies what lookup failed, for `NotFound` reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Imsi(String),
    CallId(String),
}
