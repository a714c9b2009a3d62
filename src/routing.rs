//! Routing / Global Title Engine.
//!
//! Resolves a logical operation — an explicit interface hint, or a dialed
//! E.164 number — to the (OPC, DPC, NI, SI) tuple, transport endpoint, and
//! SSN pair an encoder needs. GT Routes are matched in **declaration
//! order**, not longest-prefix: this is a deliberate preservation of the
//! source behavior (see the design notes), so the route table is modeled
//! as an ordered `Vec`, never a `HashMap` or trie that would obscure the
//! order-dependence.

use crate::errors::{RouteTarget, RoutingError};
use crate::types::{NetworkIndicator, ServiceIndicator};
use std::collections::BTreeMap;
use std::net::SocketAddr;

/// The seven standardized MSC interfaces this front-end models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InterfaceId {
    A,
    C,
    F,
    E,
    Nc,
    Isup,
    Gs,
}

impl InterfaceId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::C => "c",
            Self::F => "f",
            Self::E => "e",
            Self::Nc => "nc",
            Self::Isup => "isup",
            Self::Gs => "gs",
        }
    }
}

/// An (OPC, DPC) pair for one Network Indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcDpc {
    pub opc: u32,
    pub dpc: u32,
}

impl OpcDpc {
    pub const ZERO: Self = Self { opc: 0, dpc: 0 };

    fn is_unset(self) -> bool {
        self.opc == 0 && self.dpc == 0
    }
}

/// Per-interface point code table: A/C/F carry a single pair; E/Nc/ISUP/Gs
/// carry one pair per declared Network Indicator variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointCodeTable {
    SingleNi(OpcDpc),
    MultiNi(BTreeMap<u8, OpcDpc>),
}

impl PointCodeTable {
    /// Looks up the (OPC, DPC) pair for `ni`. `SingleNi` interfaces ignore
    /// `ni` and always return their one pair.
    pub fn pair_for(&self, ni: u8) -> Option<OpcDpc> {
        match self {
            Self::SingleNi(pair) => Some(*pair),
            Self::MultiNi(map) => map.get(&ni).copied(),
        }
    }
}

/// Calling/called SSN pair carried by an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsnPair {
    pub local: u8,
    pub remote: u8,
}

/// A-interface-only cell/location fields, used by the BSSMAP Complete-L3
/// dynamic-packing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLocation {
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u16,
    pub cell_id: u16,
}

/// One of the seven Interface Descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub id: InterfaceId,
    pub local_endpoint: SocketAddr,
    pub remote_endpoint: SocketAddr,
    pub points: PointCodeTable,
    pub active_ni: u8,
    pub ssn: SsnPair,
    pub gt_called: Option<String>,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
    pub cell: Option<CellLocation>,
}

impl InterfaceDescriptor {
    /// Service Indicator for this interface: fixed at ISUP (5) for the
    /// ISUP interface, SCCP (3) for every other interface.
    pub fn service_indicator(&self) -> ServiceIndicator {
        if self.id == InterfaceId::Isup {
            ServiceIndicator::Isup
        } else {
            ServiceIndicator::Sccp
        }
    }

    /// Resolves the (OPC, DPC) pair for this interface's active NI,
    /// failing with `NoRoute` if the pair is unset (0, 0).
    pub fn resolve_points(&self) -> Result<OpcDpc, RoutingError> {
        let pair = self.points.pair_for(self.active_ni).unwrap_or(OpcDpc::ZERO);
        if pair.is_unset() {
            return Err(RoutingError::NoRoute(RouteTarget::Interface(self.id.as_str().to_string())));
        }
        Ok(pair)
    }
}

/// A declared Global Title route: `prefix` is matched against a dialed
/// E.164 in declaration order (see the module doc for why).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtRoute {
    pub prefix: String,
    pub interface: InterfaceId,
    pub dpc_override: Option<u32>,
    pub description: String,
    pub spid: Option<String>,
}

/// The fully resolved routing decision an encoder consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    pub opc: u32,
    pub dpc: u32,
    pub ni: u8,
    pub si: ServiceIndicator,
    pub local_endpoint: SocketAddr,
    pub remote_endpoint: SocketAddr,
    pub ssn: SsnPair,
    pub interface: &'a InterfaceDescriptor,
}

/// Binds the seven Interface Descriptors and the ordered GT Route table
/// into a single routing decision point.
#[derive(Debug, Clone, Default)]
pub struct RoutingEngine {
    interfaces: BTreeMap<InterfaceId, InterfaceDescriptor>,
    routes: Vec<GtRoute>,
}

impl RoutingEngine {
    pub fn new() -> Self {
        Self { interfaces: BTreeMap::new(), routes: Vec::new() }
    }

    pub fn with_interface(mut self, descriptor: InterfaceDescriptor) -> Self {
        self.interfaces.insert(descriptor.id, descriptor);
        self
    }

    /// Appends a GT Route. Declaration order is preserved; this is what
    /// [`resolve`](Self::resolve) scans.
    pub fn with_route(mut self, route: GtRoute) -> Self {
        self.routes.push(route);
        self
    }

    pub fn interface(&self, id: InterfaceId) -> Option<&InterfaceDescriptor> {
        self.interfaces.get(&id)
    }

    /// Resolves a routing decision.
    ///
    /// 1. If `hint` names a configured interface, use it directly.
    /// 2. Else scan `routes` in declaration order and use the first whose
    ///    `prefix` is a prefix of `e164`.
    /// 3. Fail with `NoRoute` if neither applies.
    pub fn resolve(&self, hint: Option<InterfaceId>, e164: Option<&str>) -> Result<ResolvedRoute<'_>, RoutingError> {
        let (descriptor, dpc_override) = if let Some(id) = hint {
            let descriptor = self
                .interfaces
                .get(&id)
                .ok_or_else(|| RoutingError::NoRoute(RouteTarget::Interface(id.as_str().to_string())))?;
            (descriptor, None)
        } else if let Some(number) = e164 {
            let route = self
                .routes
                .iter()
                .find(|r| number.starts_with(r.prefix.as_str()))
                .ok_or_else(|| RoutingError::NoRoute(RouteTarget::E164(number.to_string())))?;
            let descriptor = self
                .interfaces
                .get(&route.interface)
                .ok_or_else(|| RoutingError::NoRoute(RouteTarget::E164(number.to_string())))?;
            (descriptor, route.dpc_override.filter(|dpc| *dpc != 0))
        } else {
            return Err(RoutingError::NoRoute(RouteTarget::Unspecified));
        };

        let points = descriptor.resolve_points()?;
        let dpc = dpc_override.unwrap_or(points.dpc);

        Ok(ResolvedRoute {
            opc: points.opc,
            dpc,
            ni: descriptor.active_ni,
            si: descriptor.service_indicator(),
            local_endpoint: descriptor.local_endpoint,
            remote_endpoint: descriptor.remote_endpoint,
            ssn: descriptor.ssn,
            interface: descriptor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: InterfaceId, points: PointCodeTable, active_ni: u8) -> InterfaceDescriptor {
        InterfaceDescriptor {
            id,
            local_endpoint: "127.0.0.1:0".parse().unwrap(),
            remote_endpoint: "127.0.0.1:4729".parse().unwrap(),
            points,
            active_ni,
            ssn: SsnPair { local: 254, remote: 254 },
            gt_called: None,
            local_spid: None,
            remote_spid: None,
            cell: None,
        }
    }

    #[test]
    fn interface_hint_bypasses_gt_routes() {
        let engine = RoutingEngine::new()
            .with_interface(descriptor(InterfaceId::A, PointCodeTable::SingleNi(OpcDpc { opc: 1, dpc: 2 }), 0));
        let resolved = engine.resolve(Some(InterfaceId::A), None).unwrap();
        assert_eq!((resolved.opc, resolved.dpc), (1, 2));
    }

    #[test]
    fn declaration_order_wins_over_longest_prefix() {
        let engine = RoutingEngine::new()
            .with_interface(descriptor(InterfaceId::C, PointCodeTable::SingleNi(OpcDpc { opc: 10, dpc: 20 }), 0))
            .with_interface(descriptor(InterfaceId::F, PointCodeTable::SingleNi(OpcDpc { opc: 30, dpc: 40 }), 0))
            .with_route(GtRoute {
                prefix: "1".to_string(),
                interface: InterfaceId::C,
                dpc_override: None,
                description: "short prefix, declared first".to_string(),
                spid: None,
            })
            .with_route(GtRoute {
                prefix: "1234".to_string(),
                interface: InterfaceId::F,
                dpc_override: None,
                description: "longer prefix, declared second".to_string(),
                spid: None,
            });

        let resolved = engine.resolve(None, Some("1234567")).unwrap();
        // The longer-prefix route (F, declared second) would win under longest-prefix
        // matching; declaration order means the shorter-prefix route (C) wins instead.
        assert_eq!((resolved.opc, resolved.dpc), (10, 20));
    }

    #[test]
    fn gt_route_dpc_override_applies() {
        let engine = RoutingEngine::new()
            .with_interface(descriptor(InterfaceId::C, PointCodeTable::SingleNi(OpcDpc { opc: 10, dpc: 20 }), 0))
            .with_route(GtRoute {
                prefix: "44".to_string(),
                interface: InterfaceId::C,
                dpc_override: Some(999),
                description: "override".to_string(),
                spid: None,
            });
        let resolved = engine.resolve(None, Some("447700900000")).unwrap();
        assert_eq!(resolved.dpc, 999);
    }

    #[test]
    fn zero_dpc_override_does_not_apply() {
        let engine = RoutingEngine::new()
            .with_interface(descriptor(InterfaceId::C, PointCodeTable::SingleNi(OpcDpc { opc: 10, dpc: 20 }), 0))
            .with_route(GtRoute {
                prefix: "44".to_string(),
                interface: InterfaceId::C,
                dpc_override: Some(0),
                description: "no override".to_string(),
                spid: None,
            });
        let resolved = engine.resolve(None, Some("447700900000")).unwrap();
        assert_eq!(resolved.dpc, 20);
    }

    #[test]
    fn multi_ni_unset_pair_is_no_route() {
        let mut map = BTreeMap::new();
        map.insert(2, OpcDpc { opc: 5, dpc: 6 });
        let engine =
            RoutingEngine::new().with_interface(descriptor(InterfaceId::E, PointCodeTable::MultiNi(map), 3));
        let err = engine.resolve(Some(InterfaceId::E), None).unwrap_err();
        assert!(matches!(err, RoutingError::NoRoute(RouteTarget::Interface(ref s)) if s == "e"));
    }

    #[test]
    fn no_hint_and_no_e164_is_no_route() {
        let engine = RoutingEngine::new();
        let err = engine.resolve(None, None).unwrap_err();
        assert!(matches!(err, RoutingError::NoRoute(RouteTarget::Unspecified)));
    }

    #[test]
    fn isup_interface_uses_isup_service_indicator() {
        let engine = RoutingEngine::new().with_interface(descriptor(
            InterfaceId::Isup,
            PointCodeTable::SingleNi(OpcDpc { opc: 1, dpc: 2 }),
            0,
        ));
        let resolved = engine.resolve(Some(InterfaceId::Isup), None).unwrap();
        assert_eq!(resolved.si, ServiceIndicator::Isup);
    }
}
