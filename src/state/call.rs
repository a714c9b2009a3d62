//! Call registry: allocates call IDs, tracks call state, and records
//! setup/connect timestamps.

use crate::errors::{LookupKey, StateError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument};

/// A call's lifecycle state. `Alerting` and `Disconnecting` are modeled
/// because a real BSSMAP call leg passes through them, but this registry
/// never produces them itself — `setup` goes straight to `Setup` and
/// `connect` goes straight to `Connected`; nothing here emits ringing
/// tones or drives a graceful release handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Setup,
    Alerting,
    Connected,
    Disconnecting,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub call_id: String,
    pub caller_imsi: String,
    pub callee_number: String,
    pub state: CallState,
    pub setup_time: Option<chrono::DateTime<chrono::Utc>>,
    pub connect_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Call-ID-keyed call registry.
pub struct CallManager {
    calls: Mutex<HashMap<String, Call>>,
    counter: AtomicU64,
}

impl Default for CallManager {
    fn default() -> Self {
        Self { calls: Mutex::new(HashMap::new()), counter: AtomicU64::new(0) }
    }
}

impl CallManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_call_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("CALL-{n:08}")
    }

    #[instrument(skip(self))]
    pub fn setup(&self, caller_imsi: &str, callee_number: &str) -> String {
        let call_id = self.next_call_id();
        let call = Call {
            call_id: call_id.clone(),
            caller_imsi: caller_imsi.to_string(),
            callee_number: callee_number.to_string(),
            state: CallState::Setup,
            setup_time: Some(chrono::Utc::now()),
            connect_time: None,
        };
        self.calls.lock().unwrap().insert(call_id.clone(), call);
        debug!(call_id, caller_imsi, callee_number, "call setup");
        call_id
    }

    #[instrument(skip(self))]
    pub fn connect(&self, call_id: &str) -> Result<(), StateError> {
        let mut calls = self.calls.lock().unwrap();
        let call =
            calls.get_mut(call_id).ok_or_else(|| StateError::NotFound(LookupKey::CallId(call_id.to_string())))?;
        if call.state != CallState::Setup {
            return Err(StateError::WrongState {
                call_id: call_id.to_string(),
                expected: "Setup".to_string(),
                actual: format!("{:?}", call.state),
            });
        }
        call.state = CallState::Connected;
        call.connect_time = Some(chrono::Utc::now());
        debug!(call_id, "call connected");
        Ok(())
    }

    /// Marks the call terminated and removes it from the registry. A
    /// subsequent [`call_state`](Self::call_state) for the same ID comes
    /// back `NotFound`, not `Terminated` — the record isn't kept around.
    #[instrument(skip(self))]
    pub fn terminate(&self, call_id: &str) -> Result<(), StateError> {
        let mut calls = self.calls.lock().unwrap();
        calls.remove(call_id).ok_or_else(|| StateError::NotFound(LookupKey::CallId(call_id.to_string())))?;
        debug!(call_id, "call terminated");
        Ok(())
    }

    pub fn call_state(&self, call_id: &str) -> Result<CallState, StateError> {
        self.calls
            .lock()
            .unwrap()
            .get(call_id)
            .map(|c| c.state)
            .ok_or_else(|| StateError::NotFound(LookupKey::CallId(call_id.to_string())))
    }

    pub fn snapshot(&self) -> Vec<Call> {
        self.calls.lock().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_connect_terminate_lifecycle() {
        let mgr = CallManager::new();
        let call_id = mgr.setup("250991234567890", "19995551234");
        assert_eq!(mgr.call_state(&call_id).unwrap(), CallState::Setup);
        mgr.connect(&call_id).unwrap();
        assert_eq!(mgr.call_state(&call_id).unwrap(), CallState::Connected);
        mgr.terminate(&call_id).unwrap();
        assert!(matches!(mgr.call_state(&call_id).unwrap_err(), StateError::NotFound(_)));
    }

    #[test]
    fn call_ids_are_sequential_and_zero_padded() {
        let mgr = CallManager::new();
        assert_eq!(mgr.setup("a", "b"), "CALL-00000001");
        assert_eq!(mgr.setup("a", "b"), "CALL-00000002");
    }

    #[test]
    fn connect_requires_setup_state() {
        let mgr = CallManager::new();
        let call_id = mgr.setup("a", "b");
        mgr.connect(&call_id).unwrap();
        let err = mgr.connect(&call_id).unwrap_err();
        assert!(matches!(err, StateError::WrongState { .. }));
    }

    #[test]
    fn unknown_call_id_is_not_found() {
        let mgr = CallManager::new();
        assert!(matches!(mgr.call_state("CALL-99999999").unwrap_err(), StateError::NotFound(_)));
    }
}
