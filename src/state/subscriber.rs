//! Subscriber registry: IMSI-keyed records tracking MSISDN, current
//! location area, and authenticated/active status.

use crate::errors::{LookupKey, StateError};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub imsi: String,
    pub msisdn: String,
    pub location: Option<String>,
    pub is_active: bool,
}

impl Subscriber {
    fn new(imsi: String, msisdn: String) -> Self {
        Self { imsi, msisdn, location: None, is_active: false }
    }
}

/// IMSI-keyed subscriber registry, guarded by a single mutex.
#[derive(Default)]
pub struct SubscriberManager {
    subscribers: Mutex<HashMap<String, Subscriber>>,
}

impl SubscriberManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self))]
    pub fn add(&self, imsi: &str, msisdn: &str) -> Result<(), StateError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers.contains_key(imsi) {
            return Err(StateError::DuplicateImsi(imsi.to_string()));
        }
        subscribers.insert(imsi.to_string(), Subscriber::new(imsi.to_string(), msisdn.to_string()));
        debug!(imsi, msisdn, "subscriber registered");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn authenticate(&self, imsi: &str) -> Result<(), StateError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        let subscriber =
            subscribers.get_mut(imsi).ok_or_else(|| StateError::NotFound(LookupKey::Imsi(imsi.to_string())))?;
        subscriber.is_active = true;
        debug!(imsi, "subscriber authenticated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn update_location(&self, imsi: &str, location: &str) -> Result<(), StateError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        let subscriber =
            subscribers.get_mut(imsi).ok_or_else(|| StateError::NotFound(LookupKey::Imsi(imsi.to_string())))?;
        subscriber.location = Some(location.to_string());
        debug!(imsi, location, "location updated");
        Ok(())
    }

    /// Returns whether `imsi` is both registered and authenticated.
    /// Unlike the other operations this never errors: an unknown IMSI is
    /// simply not active.
    pub fn is_active(&self, imsi: &str) -> bool {
        self.subscribers.lock().unwrap().get(imsi).map(|s| s.is_active).unwrap_or(false)
    }

    pub fn get(&self, imsi: &str) -> Option<Subscriber> {
        self.subscribers.lock().unwrap().get(imsi).cloned()
    }

    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.subscribers.lock().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_authenticate_then_update_location() {
        let mgr = SubscriberManager::new();
        mgr.add("250991234567890", "19995551234").unwrap();
        assert!(!mgr.is_active("250991234567890"));
        mgr.authenticate("250991234567890").unwrap();
        assert!(mgr.is_active("250991234567890"));
        mgr.update_location("250991234567890", "L2").unwrap();
        assert_eq!(mgr.get("250991234567890").unwrap().location.as_deref(), Some("L2"));
    }

    #[test]
    fn duplicate_imsi_is_rejected() {
        let mgr = SubscriberManager::new();
        mgr.add("1", "msisdn").unwrap();
        let err = mgr.add("1", "other").unwrap_err();
        assert!(matches!(err, StateError::DuplicateImsi(imsi) if imsi == "1"));
    }

    #[test]
    fn unknown_imsi_is_not_found() {
        let mgr = SubscriberManager::new();
        let err = mgr.authenticate("missing").unwrap_err();
        assert!(matches!(err, StateError::NotFound(LookupKey::Imsi(imsi)) if imsi == "missing"));
    }

    #[test]
    fn unknown_imsi_is_active_returns_false_not_error() {
        let mgr = SubscriberManager::new();
        assert!(!mgr.is_active("missing"));
    }
}
