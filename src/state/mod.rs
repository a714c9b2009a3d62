//! Interface State Machines: subscriber registry, call registry, and
//! in-progress handover tracking. Each registry guards its own
//! `std::sync::Mutex`; operations that span more than one registry (see
//! [`crate::orchestrator`]) are not globally atomic across registries.

pub mod call;
pub mod mobility;
pub mod subscriber;

pub use call::CallManager;
pub use mobility::MobilityManager;
pub use subscriber::SubscriberManager;
