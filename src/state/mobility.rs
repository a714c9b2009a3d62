//! Mobility registry: tracks in-progress inter-BSC/MSC handovers, one per
//! IMSI at a time.

use crate::errors::StateError;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handover {
    pub imsi: String,
    pub source_lac: String,
    pub target_lac: String,
}

/// IMSI-keyed in-progress handover tracker.
#[derive(Default)]
pub struct MobilityManager {
    active: Mutex<HashMap<String, Handover>>,
}

impl MobilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self))]
    pub fn initiate(&self, imsi: &str, source_lac: &str, target_lac: &str) -> Result<(), StateError> {
        let mut active = self.active.lock().unwrap();
        if active.contains_key(imsi) {
            return Err(StateError::AlreadyInProgress(imsi.to_string()));
        }
        active.insert(
            imsi.to_string(),
            Handover { imsi: imsi.to_string(), source_lac: source_lac.to_string(), target_lac: target_lac.to_string() },
        );
        debug!(imsi, source_lac, target_lac, "handover initiated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn complete(&self, imsi: &str) -> Result<(), StateError> {
        let mut active = self.active.lock().unwrap();
        active
            .remove(imsi)
            .ok_or_else(|| StateError::NotFound(crate::errors::LookupKey::Imsi(imsi.to_string())))?;
        debug!(imsi, "handover completed");
        Ok(())
    }

    pub fn is_in_progress(&self, imsi: &str) -> bool {
        self.active.lock().unwrap().contains_key(imsi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiate_then_complete() {
        let mgr = MobilityManager::new();
        mgr.initiate("250991234567890", "L1", "L2").unwrap();
        assert!(mgr.is_in_progress("250991234567890"));
        mgr.complete("250991234567890").unwrap();
        assert!(!mgr.is_in_progress("250991234567890"));
    }

    #[test]
    fn double_initiate_is_rejected() {
        let mgr = MobilityManager::new();
        mgr.initiate("1", "L1", "L2").unwrap();
        let err = mgr.initiate("1", "L1", "L3").unwrap_err();
        assert!(matches!(err, StateError::AlreadyInProgress(imsi) if imsi == "1"));
    }

    #[test]
    fn complete_without_initiate_is_not_found() {
        let mgr = MobilityManager::new();
        assert!(mgr.complete("missing").is_err());
    }
}
