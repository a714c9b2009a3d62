//! Configuration Loader/Writer.
//!
//! Parses and emits an INI-style config: `[section]` headers, `key=value`
//! pairs, `#`/`;` line comments. A handful of legacy section names
//! (`[network]`, `[m3ua]`, `[identity]`, `[bssmap]`, `[transport]`) are
//! still accepted on load so older files keep working, but [`to_ini_string`]
//! always emits the canonical per-interface layout.

use crate::errors::ConfigError;
use crate::routing::{CellLocation, GtRoute, InterfaceDescriptor, InterfaceId, OpcDpc, PointCodeTable, RoutingEngine, SsnPair};
use std::fmt::Write as _;
use std::path::Path;

const SEP: &str = "# ================================================================";
const LINE: &str = "# ----------------------------------------------------------------";

/// An (OPC, DPC) pair declared for one Network Indicator variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NiPair {
    pub opc: u32,
    pub dpc: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    pub local_ip: String,
    pub local_port: u16,
    pub remote_ip: String,
    pub remote_port: u16,
}

impl Transport {
    fn new(local_ip: &str, remote_ip: &str, remote_port: u16) -> Self {
        Self { local_ip: local_ip.to_string(), local_port: 0, remote_ip: remote_ip.to_string(), remote_port }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberConfig {
    pub imsi: String,
    pub msisdn: String,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self { imsi: "250991234567890".to_string(), msisdn: String::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AInterfaceConfig {
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u16,
    pub cell_id: u16,
    pub opc: u32,
    pub dpc: u32,
    pub ni: u8,
    pub si: u8,
    pub sls: u8,
    pub mp: u8,
    pub ssn: u8,
    pub transport: Transport,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
}

impl Default for AInterfaceConfig {
    fn default() -> Self {
        Self {
            mcc: 250,
            mnc: 99,
            lac: 12345,
            cell_id: 1,
            opc: 14001,
            dpc: 14002,
            ni: 3,
            si: 3,
            sls: 0,
            mp: 0,
            ssn: 254,
            transport: Transport::new("0.0.0.0", "127.0.0.1", 4729),
            local_spid: None,
            remote_spid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CInterfaceConfig {
    pub opc: u32,
    pub dpc: u32,
    pub ni: u8,
    pub si: u8,
    pub ssn_local: u8,
    pub ssn_remote: u8,
    pub transport: Transport,
    pub gt_ind: u8,
    pub gt_called: String,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
}

impl Default for CInterfaceConfig {
    fn default() -> Self {
        Self {
            opc: 0,
            dpc: 0,
            ni: 3,
            si: 3,
            ssn_local: 8,
            ssn_remote: 6,
            transport: Transport::new("0.0.0.0", "", 0),
            gt_ind: 0,
            gt_called: String::new(),
            local_spid: None,
            remote_spid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FInterfaceConfig {
    pub opc: u32,
    pub dpc: u32,
    pub ni: u8,
    pub si: u8,
    pub ssn_local: u8,
    pub ssn_remote: u8,
    pub transport: Transport,
    pub gt_ind: u8,
    pub gt_called: String,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
}

impl Default for FInterfaceConfig {
    fn default() -> Self {
        Self {
            opc: 0,
            dpc: 0,
            ni: 3,
            si: 3,
            ssn_local: 8,
            ssn_remote: 11,
            transport: Transport::new("0.0.0.0", "", 0),
            gt_ind: 0,
            gt_called: String::new(),
            local_spid: None,
            remote_spid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EInterfaceConfig {
    pub ni0: NiPair,
    pub ni2: NiPair,
    pub ni3: NiPair,
    pub ni: u8,
    pub si: u8,
    pub ssn_local: u8,
    pub ssn_remote: u8,
    pub transport: Transport,
    pub gt_ind: u8,
    pub gt_called: String,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
}

impl Default for EInterfaceConfig {
    fn default() -> Self {
        Self {
            ni0: NiPair::default(),
            ni2: NiPair::default(),
            ni3: NiPair::default(),
            ni: 3,
            si: 3,
            ssn_local: 8,
            ssn_remote: 8,
            transport: Transport::new("0.0.0.0", "", 0),
            gt_ind: 0,
            gt_called: String::new(),
            local_spid: None,
            remote_spid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NcInterfaceConfig {
    pub ni0: NiPair,
    pub ni2: NiPair,
    pub ni3: NiPair,
    pub ni: u8,
    pub si: u8,
    pub transport: Transport,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
}

impl Default for NcInterfaceConfig {
    fn default() -> Self {
        Self {
            ni0: NiPair::default(),
            ni2: NiPair::default(),
            ni3: NiPair::default(),
            ni: 3,
            si: 3,
            transport: Transport::new("0.0.0.0", "", 0),
            local_spid: None,
            remote_spid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsupInterfaceConfig {
    pub ni0: NiPair,
    pub ni2: NiPair,
    pub ni: u8,
    pub si: u8,
    pub transport: Transport,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
}

impl Default for IsupInterfaceConfig {
    fn default() -> Self {
        Self {
            ni0: NiPair::default(),
            ni2: NiPair::default(),
            ni: 2,
            si: 5,
            transport: Transport::new("0.0.0.0", "", 0),
            local_spid: None,
            remote_spid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsInterfaceConfig {
    pub ni2: NiPair,
    pub ni3: NiPair,
    pub ni: u8,
    pub si: u8,
    pub ssn_local: u8,
    pub ssn_remote: u8,
    pub transport: Transport,
    pub gt_ind: u8,
    pub gt_called: String,
    pub local_spid: Option<String>,
    pub remote_spid: Option<String>,
}

impl Default for GsInterfaceConfig {
    fn default() -> Self {
        Self {
            ni2: NiPair::default(),
            ni3: NiPair::default(),
            ni: 2,
            si: 3,
            ssn_local: 254,
            ssn_remote: 254,
            transport: Transport::new("0.0.0.0", "", 0),
            gt_ind: 0,
            gt_called: String::new(),
            local_spid: None,
            remote_spid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalTitleConfig {
    pub msc_gt: String,
    pub tt: u8,
    pub np: u8,
    pub nai: u8,
}

impl Default for GlobalTitleConfig {
    fn default() -> Self {
        Self { msc_gt: String::new(), tt: 0, np: 1, nai: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub local_netmask: String,
    pub remote_netmask: String,
    pub gateway: String,
    pub ntp_primary: Option<String>,
    pub ntp_secondary: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            local_netmask: "255.255.255.248".to_string(),
            remote_netmask: "255.255.255.0".to_string(),
            gateway: "100.100.100.1".to_string(),
            ntp_primary: None,
            ntp_secondary: None,
        }
    }
}

/// The full vMSC configuration: subscriber identity, the seven interface
/// descriptors, the GT parameters, the ordered GT route table, and a
/// handful of host-network settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VmscConfig {
    pub subscriber: SubscriberConfig,
    pub a: AInterfaceConfig,
    pub c: CInterfaceConfig,
    pub f: FInterfaceConfig,
    pub e: EInterfaceConfig,
    pub nc: NcInterfaceConfig,
    pub isup: IsupInterfaceConfig,
    pub gs: GsInterfaceConfig,
    pub gt: GlobalTitleConfig,
    pub gt_routes: Vec<GtRoute>,
    pub network: NetworkConfig,
}

fn parse_interface_id(s: &str) -> Option<InterfaceId> {
    match s.to_ascii_lowercase().as_str() {
        "a" => Some(InterfaceId::A),
        "c" => Some(InterfaceId::C),
        "f" => Some(InterfaceId::F),
        "e" => Some(InterfaceId::E),
        "nc" => Some(InterfaceId::Nc),
        "isup" => Some(InterfaceId::Isup),
        "gs" => Some(InterfaceId::Gs),
        _ => None,
    }
}

fn parse_u16(value: &str, line: usize) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::MalformedRoute { line, text: value.to_string() })
}

fn parse_u32(value: &str, line: usize) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::MalformedRoute { line, text: value.to_string() })
}

fn parse_u8(value: &str, line: usize) -> Result<u8, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::MalformedRoute { line, text: value.to_string() })
}

impl VmscConfig {
    /// Loads and parses a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Writes this configuration to `path` in canonical form.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ini_string())?;
        Ok(())
    }

    /// Parses an INI-style config document.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut cfg = VmscConfig::default();
        let mut section = String::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(ConfigError::MalformedSection { line: line_no, text: line.to_string() });
                }
                section = line[1..line.len() - 1].to_ascii_lowercase();
                continue;
            }

            let Some(eq) = line.find('=') else { continue };
            let key = line[..eq].trim();
            let value = line[eq + 1..].trim();

            apply_kv(&mut cfg, &section, key, value, line_no)?;
        }

        Ok(cfg)
    }

    /// Renders this configuration in the canonical layout: box-drawn
    /// section banners, every NI variant enumerated for multi-NI
    /// interfaces even when unset, SPID lines only when non-empty.
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{SEP}");
        let _ = writeln!(out, "#              vMSC Configuration File");
        let _ = writeln!(out, "{SEP}");

        section_banner(&mut out, "[subscriber]", "Subscriber identity");
        let _ = writeln!(out, "imsi={}", self.subscriber.imsi);
        if !self.subscriber.msisdn.is_empty() {
            let _ = writeln!(out, "msisdn={}", self.subscriber.msisdn);
        }

        section_banner(&mut out, "[A-interface]", "MSC <-> BSC (GSM A-interface)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Network identity (GSM 04.08 / LAI)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "mcc={}", self.a.mcc);
        let _ = writeln!(out, "mnc={}", self.a.mnc);
        let _ = writeln!(out, "lac={}", self.a.lac);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  BSSMAP");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "cell_id={}", self.a.cell_id);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  M3UA  NI={} — single NI for the BSC", self.a.ni);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "opc={}", self.a.opc);
        let _ = writeln!(out, "dpc={}", self.a.dpc);
        let _ = writeln!(out, "ni={}", self.a.ni);
        let _ = writeln!(out, "si={}", self.a.si);
        let _ = writeln!(out, "sls={}", self.a.sls);
        let _ = writeln!(out, "mp={}", self.a.mp);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  SCCP SSN");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "ssn={}", self.a.ssn);
        write_spid_block(&mut out, &self.a.local_spid, &self.a.remote_spid);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Transport (UDP)");
        let _ = writeln!(out, "{LINE}");
        write_transport(&mut out, &self.a.transport);

        section_banner(&mut out, "[C-interface]", "MSC <-> HLR (MAP over SCCP/M3UA)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Transport");
        let _ = writeln!(out, "{LINE}");
        write_transport(&mut out, &self.c.transport);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  M3UA  NI={}", self.c.ni);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "opc={}", self.c.opc);
        let _ = writeln!(out, "dpc={}", self.c.dpc);
        let _ = writeln!(out, "ni={}", self.c.ni);
        let _ = writeln!(out, "si={}", self.c.si);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  SCCP SSN");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "ssn_local={}", self.c.ssn_local);
        let _ = writeln!(out, "ssn_remote={}", self.c.ssn_remote);
        write_spid_block(&mut out, &self.c.local_spid, &self.c.remote_spid);

        section_banner(&mut out, "[F-interface]", "MSC <-> EIR (MAP CheckIMEI over SCCP/M3UA)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Transport");
        let _ = writeln!(out, "{LINE}");
        write_transport(&mut out, &self.f.transport);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  M3UA  NI={}", self.f.ni);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "opc={}", self.f.opc);
        let _ = writeln!(out, "dpc={}", self.f.dpc);
        let _ = writeln!(out, "ni={}", self.f.ni);
        let _ = writeln!(out, "si={}", self.f.si);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  SCCP SSN");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "ssn_local={}", self.f.ssn_local);
        let _ = writeln!(out, "ssn_remote={}", self.f.ssn_remote);
        write_spid_block(&mut out, &self.f.local_spid, &self.f.remote_spid);

        section_banner(&mut out, "[E-interface]", "MSC <-> MSC (inter-system handover, MAP)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Transport");
        let _ = writeln!(out, "{LINE}");
        write_transport(&mut out, &self.e.transport);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  M3UA  (three NI variants, active NI={})", self.e.ni);
        let _ = writeln!(out, "{LINE}");
        write_ni_variant(&mut out, "International", 0, self.e.ni0);
        write_ni_variant(&mut out, "National", 2, self.e.ni2);
        let _ = writeln!(out, "#  NI=3  Reserved");
        let _ = writeln!(out, "opc_ni3={}", self.e.ni3.opc);
        let _ = writeln!(out, "dpc_ni3={}", self.e.ni3.dpc);
        let _ = writeln!(out, "#  Active NI");
        let _ = writeln!(out, "ni={}", self.e.ni);
        let _ = writeln!(out, "si={}", self.e.si);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  SCCP SSN");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "ssn_local={}", self.e.ssn_local);
        let _ = writeln!(out, "ssn_remote={}", self.e.ssn_remote);
        write_spid_block(&mut out, &self.e.local_spid, &self.e.remote_spid);

        section_banner(&mut out, "[Nc-interface]", "MSC-S <-> MGW (H.248/MEGACO)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Transport");
        let _ = writeln!(out, "{LINE}");
        write_transport(&mut out, &self.nc.transport);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  M3UA  (three NI variants, active NI={})", self.nc.ni);
        let _ = writeln!(out, "{LINE}");
        write_ni_variant(&mut out, "International", 0, self.nc.ni0);
        write_ni_variant(&mut out, "National", 2, self.nc.ni2);
        let _ = writeln!(out, "#  NI=3  Reserved");
        let _ = writeln!(out, "opc_ni3={}", self.nc.ni3.opc);
        let _ = writeln!(out, "dpc_ni3={}", self.nc.ni3.dpc);
        let _ = writeln!(out, "#  Active NI");
        let _ = writeln!(out, "ni={}", self.nc.ni);
        let _ = writeln!(out, "si={}", self.nc.si);
        write_spid_block(&mut out, &self.nc.local_spid, &self.nc.remote_spid);

        section_banner(&mut out, "[ISUP-interface]", "MSC <-> PSTN/GW (ISUP over MTP3/M3UA)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Transport");
        let _ = writeln!(out, "{LINE}");
        write_transport(&mut out, &self.isup.transport);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  MTP3/M3UA  SI=5 (ISUP), active NI={}", self.isup.ni);
        let _ = writeln!(out, "{LINE}");
        write_ni_variant(&mut out, "International", 0, self.isup.ni0);
        let _ = writeln!(out, "#  NI=2  National");
        let _ = writeln!(out, "opc_ni2={}", self.isup.ni2.opc);
        let _ = writeln!(out, "dpc_ni2={}", self.isup.ni2.dpc);
        let _ = writeln!(out, "#  Active NI");
        let _ = writeln!(out, "ni={}", self.isup.ni);
        let _ = writeln!(out, "si={}", self.isup.si);
        write_spid_block(&mut out, &self.isup.local_spid, &self.isup.remote_spid);

        section_banner(&mut out, "[Gs-interface]", "MSC <-> SGSN (BSSAP+ over SCCP/M3UA)");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  Transport");
        let _ = writeln!(out, "{LINE}");
        write_transport(&mut out, &self.gs.transport);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  SCCP/M3UA  SI=3 (SCCP), active NI={}", self.gs.ni);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  NI=2  National");
        let _ = writeln!(out, "opc_ni2={}", self.gs.ni2.opc);
        let _ = writeln!(out, "dpc_ni2={}", self.gs.ni2.dpc);
        let _ = writeln!(out, "ni=2");
        let _ = writeln!(out, "#  NI=3  Reserved");
        let _ = writeln!(out, "opc_ni3={}", self.gs.ni3.opc);
        let _ = writeln!(out, "dpc_ni3={}", self.gs.ni3.dpc);
        let _ = writeln!(out, "#  Active NI");
        let _ = writeln!(out, "ni={}", self.gs.ni);
        let _ = writeln!(out, "si={}", self.gs.si);
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "#  SCCP SSN");
        let _ = writeln!(out, "{LINE}");
        let _ = writeln!(out, "ssn_local={}", self.gs.ssn_local);
        let _ = writeln!(out, "ssn_remote={}", self.gs.ssn_remote);
        write_spid_block(&mut out, &self.gs.local_spid, &self.gs.remote_spid);

        section_banner(&mut out, "[gt]", "Global Title parameters (SCCP GT routing)");
        if !self.gt.msc_gt.is_empty() {
            let _ = writeln!(out, "msc_gt={}", self.gt.msc_gt);
        }
        let _ = writeln!(out, "tt={}", self.gt.tt);
        let _ = writeln!(out, "np={}", self.gt.np);
        let _ = writeln!(out, "nai={}", self.gt.nai);

        if !self.gt_routes.is_empty() {
            section_banner(&mut out, "[gt-route]", "SCCP GT routing table");
            let _ = writeln!(out, "# Format: prefix:interface:dpc:description[:spid]");
            for route in &self.gt_routes {
                let _ = write!(
                    out,
                    "route={}:{}:{}:{}",
                    route.prefix,
                    route.interface.as_str(),
                    route.dpc_override.unwrap_or(0),
                    route.description
                );
                if let Some(spid) = &route.spid {
                    let _ = write!(out, ":{spid}");
                }
                let _ = writeln!(out);
            }
        }

        section_banner(&mut out, "[network]", "Host network parameters");
        let _ = writeln!(out, "local_netmask={}", self.network.local_netmask);
        let _ = writeln!(out, "remote_netmask={}", self.network.remote_netmask);
        let _ = writeln!(out, "gateway={}", self.network.gateway);
        if let Some(ntp) = &self.network.ntp_primary {
            let _ = writeln!(out, "ntp_primary={ntp}");
        }
        if let Some(ntp) = &self.network.ntp_secondary {
            let _ = writeln!(out, "ntp_secondary={ntp}");
        }

        let _ = writeln!(out);
        let _ = write!(out, "{SEP}");

        out
    }

    /// Builds a [`RoutingEngine`] from this configuration: one
    /// [`InterfaceDescriptor`] per interface section plus the GT route
    /// table, in file declaration order.
    pub fn into_routing_engine(self) -> Result<RoutingEngine, ConfigError> {
        let mut engine = RoutingEngine::new();

        engine = engine.with_interface(InterfaceDescriptor {
            id: InterfaceId::A,
            local_endpoint: socket_addr(&self.a.transport.local_ip, self.a.transport.local_port)?,
            remote_endpoint: socket_addr(&self.a.transport.remote_ip, self.a.transport.remote_port)?,
            points: PointCodeTable::SingleNi(OpcDpc { opc: self.a.opc, dpc: self.a.dpc }),
            active_ni: self.a.ni,
            ssn: SsnPair { local: self.a.ssn, remote: self.a.ssn },
            gt_called: None,
            local_spid: self.a.local_spid,
            remote_spid: self.a.remote_spid,
            cell: Some(CellLocation { mcc: self.a.mcc, mnc: self.a.mnc, lac: self.a.lac, cell_id: self.a.cell_id }),
        });

        engine = engine.with_interface(InterfaceDescriptor {
            id: InterfaceId::C,
            local_endpoint: socket_addr(&self.c.transport.local_ip, self.c.transport.local_port)?,
            remote_endpoint: socket_addr(&self.c.transport.remote_ip, self.c.transport.remote_port)?,
            points: PointCodeTable::SingleNi(OpcDpc { opc: self.c.opc, dpc: self.c.dpc }),
            active_ni: self.c.ni,
            ssn: SsnPair { local: self.c.ssn_local, remote: self.c.ssn_remote },
            gt_called: non_empty(self.c.gt_called),
            local_spid: self.c.local_spid,
            remote_spid: self.c.remote_spid,
            cell: None,
        });

        engine = engine.with_interface(InterfaceDescriptor {
            id: InterfaceId::F,
            local_endpoint: socket_addr(&self.f.transport.local_ip, self.f.transport.local_port)?,
            remote_endpoint: socket_addr(&self.f.transport.remote_ip, self.f.transport.remote_port)?,
            points: PointCodeTable::SingleNi(OpcDpc { opc: self.f.opc, dpc: self.f.dpc }),
            active_ni: self.f.ni,
            ssn: SsnPair { local: self.f.ssn_local, remote: self.f.ssn_remote },
            gt_called: non_empty(self.f.gt_called),
            local_spid: self.f.local_spid,
            remote_spid: self.f.remote_spid,
            cell: None,
        });

        engine = engine.with_interface(InterfaceDescriptor {
            id: InterfaceId::E,
            local_endpoint: socket_addr(&self.e.transport.local_ip, self.e.transport.local_port)?,
            remote_endpoint: socket_addr(&self.e.transport.remote_ip, self.e.transport.remote_port)?,
            points: PointCodeTable::MultiNi(
                [(0, ni_pair(self.e.ni0)), (2, ni_pair(self.e.ni2)), (3, ni_pair(self.e.ni3))].into_iter().collect(),
            ),
            active_ni: self.e.ni,
            ssn: SsnPair { local: self.e.ssn_local, remote: self.e.ssn_remote },
            gt_called: non_empty(self.e.gt_called),
            local_spid: self.e.local_spid,
            remote_spid: self.e.remote_spid,
            cell: None,
        });

        engine = engine.with_interface(InterfaceDescriptor {
            id: InterfaceId::Nc,
            local_endpoint: socket_addr(&self.nc.transport.local_ip, self.nc.transport.local_port)?,
            remote_endpoint: socket_addr(&self.nc.transport.remote_ip, self.nc.transport.remote_port)?,
            points: PointCodeTable::MultiNi(
                [(0, ni_pair(self.nc.ni0)), (2, ni_pair(self.nc.ni2)), (3, ni_pair(self.nc.ni3))].into_iter().collect(),
            ),
            active_ni: self.nc.ni,
            ssn: SsnPair { local: 0, remote: 0 },
            gt_called: None,
            local_spid: self.nc.local_spid,
            remote_spid: self.nc.remote_spid,
            cell: None,
        });

        engine = engine.with_interface(InterfaceDescriptor {
            id: InterfaceId::Isup,
            local_endpoint: socket_addr(&self.isup.transport.local_ip, self.isup.transport.local_port)?,
            remote_endpoint: socket_addr(&self.isup.transport.remote_ip, self.isup.transport.remote_port)?,
            points: PointCodeTable::MultiNi([(0, ni_pair(self.isup.ni0)), (2, ni_pair(self.isup.ni2))].into_iter().collect()),
            active_ni: self.isup.ni,
            ssn: SsnPair { local: 0, remote: 0 },
            gt_called: None,
            local_spid: self.isup.local_spid,
            remote_spid: self.isup.remote_spid,
            cell: None,
        });

        engine = engine.with_interface(InterfaceDescriptor {
            id: InterfaceId::Gs,
            local_endpoint: socket_addr(&self.gs.transport.local_ip, self.gs.transport.local_port)?,
            remote_endpoint: socket_addr(&self.gs.transport.remote_ip, self.gs.transport.remote_port)?,
            points: PointCodeTable::MultiNi([(2, ni_pair(self.gs.ni2)), (3, ni_pair(self.gs.ni3))].into_iter().collect()),
            active_ni: self.gs.ni,
            ssn: SsnPair { local: self.gs.ssn_local, remote: self.gs.ssn_remote },
            gt_called: non_empty(self.gs.gt_called),
            local_spid: self.gs.local_spid,
            remote_spid: self.gs.remote_spid,
            cell: None,
        });

        for route in self.gt_routes {
            engine = engine.with_route(route);
        }

        Ok(engine)
    }
}

fn ni_pair(pair: NiPair) -> OpcDpc {
    OpcDpc { opc: pair.opc, dpc: pair.dpc }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn socket_addr(ip: &str, port: u16) -> Result<std::net::SocketAddr, ConfigError> {
    let ip = if ip.is_empty() { "0.0.0.0" } else { ip };
    format!("{ip}:{port}")
        .parse()
        .map_err(|_| ConfigError::MalformedRoute { line: 0, text: format!("{ip}:{port}") })
}

fn section_banner(out: &mut String, name: &str, desc: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{SEP}");
    let title = format!("{name}  {desc}");
    let pad = (64usize.saturating_sub(2).saturating_sub(title.len())) / 2;
    let _ = writeln!(out, "#{}{}", " ".repeat(pad + 1), title);
    let _ = writeln!(out, "{SEP}");
    let _ = writeln!(out, "{name}");
}

fn write_transport(out: &mut String, t: &Transport) {
    let _ = writeln!(out, "local_ip={}", t.local_ip);
    let _ = writeln!(out, "local_port={}", t.local_port);
    let _ = writeln!(out, "remote_ip={}", t.remote_ip);
    let _ = writeln!(out, "remote_port={}", t.remote_port);
}

fn write_spid_block(out: &mut String, local: &Option<String>, remote: &Option<String>) {
    if local.is_none() && remote.is_none() {
        return;
    }
    let _ = writeln!(out, "{LINE}");
    let _ = writeln!(out, "#  SPID (Signaling Point ID)");
    let _ = writeln!(out, "{LINE}");
    if let Some(spid) = local {
        let _ = writeln!(out, "local_spid={spid}");
    }
    if let Some(spid) = remote {
        let _ = writeln!(out, "remote_spid={spid}");
    }
}

fn write_ni_variant(out: &mut String, label: &str, ni: u8, pair: NiPair) {
    let _ = writeln!(out, "#  NI={ni}  {label}");
    let _ = writeln!(out, "opc_ni{ni}={}", pair.opc);
    let _ = writeln!(out, "dpc_ni{ni}={}", pair.dpc);
    let _ = writeln!(out, "ni={ni}");
}

fn apply_kv(cfg: &mut VmscConfig, section: &str, key: &str, value: &str, line: usize) -> Result<(), ConfigError> {
    match section {
        "subscriber" => match key {
            "imsi" => cfg.subscriber.imsi = value.to_string(),
            "msisdn" => cfg.subscriber.msisdn = value.to_string(),
            "msc_gt" => cfg.gt.msc_gt = value.to_string(),
            _ => {}
        },
        "a-interface" => match key {
            "mcc" => cfg.a.mcc = parse_u16(value, line)?,
            "mnc" => cfg.a.mnc = parse_u16(value, line)?,
            "lac" => cfg.a.lac = parse_u16(value, line)?,
            "cell_id" => cfg.a.cell_id = parse_u16(value, line)?,
            "opc" => cfg.a.opc = parse_u32(value, line)?,
            "dpc" => cfg.a.dpc = parse_u32(value, line)?,
            "ni" => cfg.a.ni = parse_u8(value, line)?,
            "si" => cfg.a.si = parse_u8(value, line)?,
            "sls" => cfg.a.sls = parse_u8(value, line)?,
            "mp" => cfg.a.mp = parse_u8(value, line)?,
            "ssn" => cfg.a.ssn = parse_u8(value, line)?,
            "local_ip" => cfg.a.transport.local_ip = value.to_string(),
            "local_port" => cfg.a.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.a.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.a.transport.remote_port = parse_u16(value, line)?,
            "local_spid" => cfg.a.local_spid = Some(value.to_string()),
            "remote_spid" => cfg.a.remote_spid = Some(value.to_string()),
            _ => {}
        },
        "c-interface" => match key {
            "local_ip" => cfg.c.transport.local_ip = value.to_string(),
            "local_port" => cfg.c.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.c.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.c.transport.remote_port = parse_u16(value, line)?,
            "opc" => cfg.c.opc = parse_u32(value, line)?,
            "dpc" => cfg.c.dpc = parse_u32(value, line)?,
            "ni" => cfg.c.ni = parse_u8(value, line)?,
            "si" => cfg.c.si = parse_u8(value, line)?,
            "gt_ind" => cfg.c.gt_ind = parse_u8(value, line)?,
            "gt_called" => cfg.c.gt_called = value.to_string(),
            "ssn_local" => cfg.c.ssn_local = parse_u8(value, line)?,
            "ssn_remote" => cfg.c.ssn_remote = parse_u8(value, line)?,
            "local_spid" => cfg.c.local_spid = Some(value.to_string()),
            "remote_spid" => cfg.c.remote_spid = Some(value.to_string()),
            _ => {}
        },
        "f-interface" => match key {
            "local_ip" => cfg.f.transport.local_ip = value.to_string(),
            "local_port" => cfg.f.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.f.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.f.transport.remote_port = parse_u16(value, line)?,
            "opc" => cfg.f.opc = parse_u32(value, line)?,
            "dpc" => cfg.f.dpc = parse_u32(value, line)?,
            "ni" => cfg.f.ni = parse_u8(value, line)?,
            "si" => cfg.f.si = parse_u8(value, line)?,
            "gt_ind" => cfg.f.gt_ind = parse_u8(value, line)?,
            "gt_called" => cfg.f.gt_called = value.to_string(),
            "ssn_local" => cfg.f.ssn_local = parse_u8(value, line)?,
            "ssn_remote" => cfg.f.ssn_remote = parse_u8(value, line)?,
            "local_spid" => cfg.f.local_spid = Some(value.to_string()),
            "remote_spid" => cfg.f.remote_spid = Some(value.to_string()),
            _ => {}
        },
        "e-interface" => match key {
            "local_ip" => cfg.e.transport.local_ip = value.to_string(),
            "local_port" => cfg.e.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.e.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.e.transport.remote_port = parse_u16(value, line)?,
            "opc_ni0" => cfg.e.ni0.opc = parse_u32(value, line)?,
            "dpc_ni0" => cfg.e.ni0.dpc = parse_u32(value, line)?,
            "opc_ni2" => cfg.e.ni2.opc = parse_u32(value, line)?,
            "dpc_ni2" => cfg.e.ni2.dpc = parse_u32(value, line)?,
            "opc_ni3" => cfg.e.ni3.opc = parse_u32(value, line)?,
            "dpc_ni3" => cfg.e.ni3.dpc = parse_u32(value, line)?,
            "ni" => cfg.e.ni = parse_u8(value, line)?,
            "si" => cfg.e.si = parse_u8(value, line)?,
            "gt_ind" => cfg.e.gt_ind = parse_u8(value, line)?,
            "gt_called" => cfg.e.gt_called = value.to_string(),
            "ssn_local" => cfg.e.ssn_local = parse_u8(value, line)?,
            "ssn_remote" => cfg.e.ssn_remote = parse_u8(value, line)?,
            "local_spid" => cfg.e.local_spid = Some(value.to_string()),
            "remote_spid" => cfg.e.remote_spid = Some(value.to_string()),
            _ => {}
        },
        "nc-interface" => match key {
            "local_ip" => cfg.nc.transport.local_ip = value.to_string(),
            "local_port" => cfg.nc.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.nc.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.nc.transport.remote_port = parse_u16(value, line)?,
            "opc_ni0" => cfg.nc.ni0.opc = parse_u32(value, line)?,
            "dpc_ni0" => cfg.nc.ni0.dpc = parse_u32(value, line)?,
            "opc_ni2" => cfg.nc.ni2.opc = parse_u32(value, line)?,
            "dpc_ni2" => cfg.nc.ni2.dpc = parse_u32(value, line)?,
            "opc_ni3" => cfg.nc.ni3.opc = parse_u32(value, line)?,
            "dpc_ni3" => cfg.nc.ni3.dpc = parse_u32(value, line)?,
            "ni" => cfg.nc.ni = parse_u8(value, line)?,
            "si" => cfg.nc.si = parse_u8(value, line)?,
            "local_spid" => cfg.nc.local_spid = Some(value.to_string()),
            "remote_spid" => cfg.nc.remote_spid = Some(value.to_string()),
            _ => {}
        },
        "isup-interface" => match key {
            "local_ip" => cfg.isup.transport.local_ip = value.to_string(),
            "local_port" => cfg.isup.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.isup.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.isup.transport.remote_port = parse_u16(value, line)?,
            "opc_ni0" => cfg.isup.ni0.opc = parse_u32(value, line)?,
            "dpc_ni0" => cfg.isup.ni0.dpc = parse_u32(value, line)?,
            "opc_ni2" => cfg.isup.ni2.opc = parse_u32(value, line)?,
            "dpc_ni2" => cfg.isup.ni2.dpc = parse_u32(value, line)?,
            "ni" => cfg.isup.ni = parse_u8(value, line)?,
            "si" => cfg.isup.si = parse_u8(value, line)?,
            "local_spid" => cfg.isup.local_spid = Some(value.to_string()),
            "remote_spid" => cfg.isup.remote_spid = Some(value.to_string()),
            _ => {}
        },
        "gs-interface" => match key {
            "local_ip" => cfg.gs.transport.local_ip = value.to_string(),
            "local_port" => cfg.gs.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.gs.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.gs.transport.remote_port = parse_u16(value, line)?,
            "opc_ni2" => cfg.gs.ni2.opc = parse_u32(value, line)?,
            "dpc_ni2" => cfg.gs.ni2.dpc = parse_u32(value, line)?,
            "opc_ni3" => cfg.gs.ni3.opc = parse_u32(value, line)?,
            "dpc_ni3" => cfg.gs.ni3.dpc = parse_u32(value, line)?,
            "ni" => cfg.gs.ni = parse_u8(value, line)?,
            "si" => cfg.gs.si = parse_u8(value, line)?,
            "gt_ind" => cfg.gs.gt_ind = parse_u8(value, line)?,
            "gt_called" => cfg.gs.gt_called = value.to_string(),
            "ssn_local" => cfg.gs.ssn_local = parse_u8(value, line)?,
            "ssn_remote" => cfg.gs.ssn_remote = parse_u8(value, line)?,
            "local_spid" => cfg.gs.local_spid = Some(value.to_string()),
            "remote_spid" => cfg.gs.remote_spid = Some(value.to_string()),
            _ => {}
        },
        "gt" => match key {
            "msc_gt" => cfg.gt.msc_gt = value.to_string(),
            "tt" => cfg.gt.tt = parse_u8(value, line)?,
            "np" => cfg.gt.np = parse_u8(value, line)?,
            "nai" => cfg.gt.nai = parse_u8(value, line)?,
            _ => {}
        },
        "gt-route" => {
            if key == "route" {
                let parts: Vec<&str> = value.split(':').collect();
                if parts.len() < 3 {
                    return Err(ConfigError::MalformedRoute { line, text: value.to_string() });
                }
                let interface = parse_interface_id(parts[1])
                    .ok_or_else(|| ConfigError::MalformedRoute { line, text: value.to_string() })?;
                let dpc = parts[2].parse().unwrap_or(0);
                cfg.gt_routes.push(GtRoute {
                    prefix: parts[0].to_string(),
                    interface,
                    dpc_override: if dpc == 0 { None } else { Some(dpc) },
                    description: parts.get(3).unwrap_or(&"").to_string(),
                    spid: parts.get(4).map(|s| s.to_string()),
                });
            }
        }
        // Legacy sections, kept for backward compatibility with older files.
        "network" => match key {
            "mcc" => cfg.a.mcc = parse_u16(value, line)?,
            "mnc" => cfg.a.mnc = parse_u16(value, line)?,
            "lac" => cfg.a.lac = parse_u16(value, line)?,
            "local_netmask" => cfg.network.local_netmask = value.to_string(),
            "remote_netmask" => cfg.network.remote_netmask = value.to_string(),
            "gateway" => cfg.network.gateway = value.to_string(),
            "ntp_primary" => cfg.network.ntp_primary = Some(value.to_string()),
            "ntp_secondary" => cfg.network.ntp_secondary = Some(value.to_string()),
            _ => {}
        },
        "m3ua" => match key {
            "opc_ni3" => cfg.a.opc = parse_u32(value, line)?,
            "dpc_ni3" => cfg.a.dpc = parse_u32(value, line)?,
            "ni" => cfg.a.ni = parse_u8(value, line)?,
            _ => {}
        },
        "identity" => match key {
            "imsi" => cfg.subscriber.imsi = value.to_string(),
            "msisdn" => cfg.subscriber.msisdn = value.to_string(),
            _ => {}
        },
        "bssmap" => {
            if key == "cell_id" {
                cfg.a.cell_id = parse_u16(value, line)?;
            }
        }
        "transport" => match key {
            "local_ip" => cfg.a.transport.local_ip = value.to_string(),
            "local_port" => cfg.a.transport.local_port = parse_u16(value, line)?,
            "remote_ip" => cfg.a.transport.remote_ip = value.to_string(),
            "remote_port" => cfg.a.transport.remote_port = parse_u16(value, line)?,
            "udp_host" => cfg.a.transport.remote_ip = value.to_string(),
            "udp_port" => cfg.a.transport.remote_port = parse_u16(value, line)?,
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_known_literals() {
        let cfg = VmscConfig::default();
        assert_eq!(cfg.subscriber.imsi, "250991234567890");
        assert_eq!(cfg.a.mcc, 250);
        assert_eq!(cfg.a.mnc, 99);
        assert_eq!(cfg.a.opc, 14001);
        assert_eq!(cfg.a.dpc, 14002);
        assert_eq!(cfg.a.ssn, 254);
        assert_eq!(cfg.isup.ni, 2);
        assert_eq!(cfg.isup.si, 5);
        assert_eq!(cfg.gs.ssn_local, 254);
    }

    #[test]
    fn parses_subscriber_and_a_interface() {
        let text = "[subscriber]\nimsi=250991111111111\n\n[A-interface]\nopc=1\ndpc=2\nni=3\nssn=8\n";
        let cfg = VmscConfig::parse(text).unwrap();
        assert_eq!(cfg.subscriber.imsi, "250991111111111");
        assert_eq!(cfg.a.opc, 1);
        assert_eq!(cfg.a.dpc, 2);
        assert_eq!(cfg.a.ssn, 8);
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let text = "# a comment\n; another\n\n[subscriber]\nimsi=1\n";
        let cfg = VmscConfig::parse(text).unwrap();
        assert_eq!(cfg.subscriber.imsi, "1");
    }

    #[test]
    fn malformed_section_header_is_rejected() {
        let text = "[subscriber\nimsi=1\n";
        let err = VmscConfig::parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedSection { line: 1, .. }));
    }

    #[test]
    fn gt_routes_preserve_declaration_order() {
        let text = "[gt-route]\nroute=44:c:100:first\nroute=1:f:200:second\n";
        let cfg = VmscConfig::parse(text).unwrap();
        assert_eq!(cfg.gt_routes.len(), 2);
        assert_eq!(cfg.gt_routes[0].prefix, "44");
        assert_eq!(cfg.gt_routes[0].interface, InterfaceId::C);
        assert_eq!(cfg.gt_routes[0].dpc_override, Some(100));
        assert_eq!(cfg.gt_routes[1].prefix, "1");
    }

    #[test]
    fn malformed_gt_route_is_rejected() {
        let text = "[gt-route]\nroute=44:c\n";
        let err = VmscConfig::parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedRoute { .. }));
    }

    #[test]
    fn legacy_m3ua_section_maps_ni3_to_a_interface() {
        let text = "[m3ua]\nopc_ni3=555\ndpc_ni3=777\nni=3\n";
        let cfg = VmscConfig::parse(text).unwrap();
        assert_eq!(cfg.a.opc, 555);
        assert_eq!(cfg.a.dpc, 777);
    }

    #[test]
    fn round_trip_through_ini_string_preserves_values() {
        let mut cfg = VmscConfig::default();
        cfg.subscriber.msisdn = "19995551234".to_string();
        cfg.a.local_spid = Some("MSC-A".to_string());
        cfg.gt_routes.push(GtRoute {
            prefix: "44".to_string(),
            interface: InterfaceId::C,
            dpc_override: Some(321),
            description: "HLR route".to_string(),
            spid: None,
        });

        let rendered = cfg.to_ini_string();
        let reparsed = VmscConfig::parse(&rendered).unwrap();

        assert_eq!(reparsed.subscriber.msisdn, "19995551234");
        assert_eq!(reparsed.a.local_spid.as_deref(), Some("MSC-A"));
        assert_eq!(reparsed.gt_routes.len(), 1);
        assert_eq!(reparsed.gt_routes[0].dpc_override, Some(321));
    }

    #[test]
    fn into_routing_engine_resolves_a_interface() {
        let cfg = VmscConfig::default();
        let engine = cfg.into_routing_engine().unwrap();
        let resolved = engine.resolve(Some(InterfaceId::A), None).unwrap();
        assert_eq!(resolved.opc, 14001);
        assert_eq!(resolved.dpc, 14002);
    }
}
