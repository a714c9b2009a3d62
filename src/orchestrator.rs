//! vMSC Orchestrator.
//!
//! Binds the subscriber, call, and mobility registries behind a single
//! running/stopped flag. Every operation checks `is_running` first;
//! `initiate_call` and `perform_handover` additionally require the caller
//! to already be an authenticated, active subscriber.

use crate::errors::{StateError, VmscError};
use crate::state::call::CallState;
use crate::state::{CallManager, MobilityManager, SubscriberManager};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument};

pub struct VmscOrchestrator {
    msc_id: String,
    running: AtomicBool,
    subscribers: SubscriberManager,
    calls: CallManager,
    mobility: MobilityManager,
}

impl VmscOrchestrator {
    pub fn new(msc_id: impl Into<String>) -> Self {
        Self {
            msc_id: msc_id.into(),
            running: AtomicBool::new(false),
            subscribers: SubscriberManager::new(),
            calls: CallManager::new(),
            mobility: MobilityManager::new(),
        }
    }

    pub fn msc_id(&self) -> &str {
        &self.msc_id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[instrument(skip(self))]
    pub fn start(&self) -> Result<(), VmscError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(VmscError::State(StateError::AlreadyInProgress(self.msc_id.clone())));
        }
        info!(msc_id = %self.msc_id, "vMSC started");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn stop(&self) -> Result<(), VmscError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(VmscError::NotRunning);
        }
        info!(msc_id = %self.msc_id, "vMSC stopped");
        Ok(())
    }

    fn require_running(&self) -> Result<(), VmscError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(VmscError::NotRunning)
        }
    }

    fn require_active(&self, imsi: &str) -> Result<(), VmscError> {
        if self.subscribers.is_active(imsi) {
            Ok(())
        } else {
            Err(VmscError::State(StateError::WrongState {
                call_id: imsi.to_string(),
                expected: "active".to_string(),
                actual: "inactive".to_string(),
            }))
        }
    }

    pub fn register_subscriber(&self, imsi: &str, msisdn: &str) -> Result<(), VmscError> {
        self.require_running()?;
        self.subscribers.add(imsi, msisdn)?;
        Ok(())
    }

    pub fn authenticate_subscriber(&self, imsi: &str) -> Result<(), VmscError> {
        self.require_running()?;
        self.subscribers.authenticate(imsi)?;
        Ok(())
    }

    pub fn update_subscriber_location(&self, imsi: &str, location: &str) -> Result<(), VmscError> {
        self.require_running()?;
        self.subscribers.update_location(imsi, location)?;
        Ok(())
    }

    /// Starts a new call leg from `caller_imsi` to `callee_number`,
    /// returning the generated call ID. Fails if the caller is not an
    /// authenticated, active subscriber.
    #[instrument(skip(self))]
    pub fn initiate_call(&self, caller_imsi: &str, callee_number: &str) -> Result<String, VmscError> {
        self.require_running()?;
        self.require_active(caller_imsi)?;
        Ok(self.calls.setup(caller_imsi, callee_number))
    }

    pub fn answer_call(&self, call_id: &str) -> Result<(), VmscError> {
        self.require_running()?;
        self.calls.connect(call_id)?;
        Ok(())
    }

    pub fn end_call(&self, call_id: &str) -> Result<(), VmscError> {
        self.require_running()?;
        self.calls.terminate(call_id)?;
        Ok(())
    }

    pub fn call_state(&self, call_id: &str) -> Result<CallState, VmscError> {
        self.require_running()?;
        Ok(self.calls.call_state(call_id)?)
    }

    pub fn is_subscriber_active(&self, imsi: &str) -> bool {
        self.subscribers.is_active(imsi)
    }

    pub fn is_handover_in_progress(&self, imsi: &str) -> bool {
        self.mobility.is_in_progress(imsi)
    }

    /// Performs a handover: initiate, update the subscriber's location,
    /// complete. All three steps run in that order; a failure partway
    /// through leaves the registries exactly where that step left them —
    /// this is not a transaction.
    #[instrument(skip(self))]
    pub fn perform_handover(&self, imsi: &str, source_lac: &str, target_lac: &str) -> Result<(), VmscError> {
        self.require_running()?;
        self.require_active(imsi)?;

        self.mobility.initiate(imsi, source_lac, target_lac)?;
        self.subscribers.update_location(imsi, target_lac)?;
        self.mobility.complete(imsi)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_vmsc() -> VmscOrchestrator {
        let vmsc = VmscOrchestrator::new("MSC-01");
        vmsc.start().unwrap();
        vmsc
    }

    #[test]
    fn ops_fail_before_start() {
        let vmsc = VmscOrchestrator::new("MSC-01");
        assert!(matches!(vmsc.register_subscriber("1", "2").unwrap_err(), VmscError::NotRunning));
    }

    #[test]
    fn double_start_is_already_in_progress() {
        let vmsc = running_vmsc();
        let err = vmsc.start().unwrap_err();
        assert!(matches!(err, VmscError::State(StateError::AlreadyInProgress(_))));
    }

    #[test]
    fn stop_when_not_running_errors() {
        let vmsc = VmscOrchestrator::new("MSC-01");
        assert!(matches!(vmsc.stop().unwrap_err(), VmscError::NotRunning));
    }

    #[test]
    fn initiate_call_requires_active_caller() {
        let vmsc = running_vmsc();
        vmsc.register_subscriber("250991234567890", "19995551234").unwrap();
        let err = vmsc.initiate_call("250991234567890", "19995550000").unwrap_err();
        assert!(matches!(err, VmscError::State(StateError::WrongState { .. })));

        vmsc.authenticate_subscriber("250991234567890").unwrap();
        let call_id = vmsc.initiate_call("250991234567890", "19995550000").unwrap();
        assert_eq!(vmsc.call_state(&call_id).unwrap(), CallState::Setup);
    }

    #[test]
    fn full_handover_scenario() {
        let vmsc = running_vmsc();
        vmsc.register_subscriber("250991234567890", "19995551234").unwrap();
        vmsc.authenticate_subscriber("250991234567890").unwrap();
        vmsc.perform_handover("250991234567890", "L1", "L2").unwrap();
        assert!(!vmsc.is_handover_in_progress("250991234567890"));
    }
}
