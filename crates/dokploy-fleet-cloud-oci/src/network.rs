//! Virtual cloud network: VCN, internet gateway, default route table, subnet

use crate::error::{OciError, Result};
use crate::naming::ResourceCode;
use dokploy_fleet_cloud::OutputRef;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

pub const VCN_CIDR: &str = "10.0.0.0/16";
pub const SUBNET_CIDR: &str = "10.0.0.0/24";
pub const ANYWHERE: &str = "0.0.0.0/0";

/// IPv4 CIDR block with no host bits set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Cidr {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason| OciError::InvalidCidr {
            cidr: s.to_string(),
            reason,
        };

        let (ip, prefix) = s.split_once('/').ok_or_else(|| invalid("expected IP/PREFIX"))?;
        let addr: Ipv4Addr = ip.parse().map_err(|_| invalid("invalid IPv4 address"))?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid("invalid prefix"))?;
        if prefix > 32 {
            return Err(invalid("prefix must be between 0 and 32"));
        }

        let cidr = Self { addr, prefix };
        if u32::from(addr) != cidr.network() {
            return Err(invalid("host bits must be zero"));
        }
        Ok(cidr)
    }

    /// `0.0.0.0/0`
    pub fn anywhere() -> Self {
        Self {
            addr: Ipv4Addr::UNSPECIFIED,
            prefix: 0,
        }
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn mask(&self) -> u32 {
        match self.prefix {
            0 => 0,
            p => u32::MAX << (32 - p),
        }
    }

    fn network(&self) -> u32 {
        u32::from(self.addr) & self.mask()
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains(&self, other: &Cidr) -> bool {
        other.prefix >= self.prefix && (u32::from(other.addr) & self.mask()) == self.network()
    }

    /// Inside one of the RFC 1918 private ranges
    pub fn is_private(&self) -> bool {
        const PRIVATE: [(Ipv4Addr, u8); 3] = [
            (Ipv4Addr::new(10, 0, 0, 0), 8),
            (Ipv4Addr::new(172, 16, 0, 0), 12),
            (Ipv4Addr::new(192, 168, 0, 0), 16),
        ];
        PRIVATE
            .iter()
            .any(|&(addr, prefix)| Cidr { addr, prefix }.contains(self))
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl FromStr for Cidr {
    type Err = OciError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Virtual cloud network
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vcn {
    pub compartment_id: String,
    pub cidr_block: Cidr,
    pub display_name: String,
    pub dns_label: String,
}

impl Vcn {
    pub const NAME: &'static str = "dokployVcn";

    pub fn new(compartment_id: &str, code: &ResourceCode, cidr_block: Cidr) -> Result<Self> {
        if !cidr_block.is_private() {
            return Err(OciError::InvalidNetwork(format!(
                "VCN CIDR {} is not a private range",
                cidr_block
            )));
        }

        Ok(Self {
            compartment_id: compartment_id.to_string(),
            cidr_block,
            display_name: code.network_name(),
            dns_label: code.vcn_dns_label(),
        })
    }

    pub fn id() -> OutputRef {
        OutputRef::new(Self::NAME, "id")
    }

    pub fn default_route_table_id() -> OutputRef {
        OutputRef::new(Self::NAME, "defaultRouteTableId")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetGateway {
    pub compartment_id: String,
    pub display_name: String,
    pub enabled: bool,
    pub vcn_id: OutputRef,
}

impl InternetGateway {
    pub const NAME: &'static str = "dokployInternetGateway";

    pub fn new(compartment_id: &str) -> Self {
        Self {
            compartment_id: compartment_id.to_string(),
            display_name: "Internet Gateway network-dokploy".to_string(),
            enabled: true,
            vcn_id: Vcn::id(),
        }
    }

    pub fn id() -> OutputRef {
        OutputRef::new(Self::NAME, "id")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    pub destination: Cidr,
    pub destination_type: String,
    pub network_entity_id: OutputRef,
}

/// Takes over the VCN's default route table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRouteTable {
    pub manage_default_resource_id: OutputRef,
    pub route_rules: Vec<RouteRule>,
}

impl DefaultRouteTable {
    pub const NAME: &'static str = "dokployDefaultRouteTable";

    /// Single default route through the internet gateway
    pub fn internet_route() -> Self {
        Self {
            manage_default_resource_id: Vcn::default_route_table_id(),
            route_rules: vec![RouteRule {
                destination: Cidr::anywhere(),
                destination_type: "CIDR_BLOCK".to_string(),
                network_entity_id: InternetGateway::id(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub compartment_id: String,
    pub vcn_id: OutputRef,
    pub cidr_block: Cidr,
    pub display_name: String,
    pub dns_label: String,
    pub route_table_id: OutputRef,
    pub security_list_ids: Vec<OutputRef>,
}

impl Subnet {
    pub const NAME: &'static str = "dokploySubnet";

    pub fn new(
        compartment_id: &str,
        code: &ResourceCode,
        vcn: &Vcn,
        cidr_block: Cidr,
        security_list_id: OutputRef,
    ) -> Result<Self> {
        if !vcn.cidr_block.contains(&cidr_block) {
            return Err(OciError::InvalidNetwork(format!(
                "subnet CIDR {} is outside VCN CIDR {}",
                cidr_block, vcn.cidr_block
            )));
        }

        Ok(Self {
            compartment_id: compartment_id.to_string(),
            vcn_id: Vcn::id(),
            cidr_block,
            display_name: code.subnet_name(),
            dns_label: code.subnet_dns_label(),
            route_table_id: Vcn::default_route_table_id(),
            security_list_ids: vec![security_list_id],
        })
    }

    pub fn id() -> OutputRef {
        OutputRef::new(Self::NAME, "id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> ResourceCode {
        ResourceCode::parse("ab12cd").unwrap()
    }

    #[test]
    fn test_cidr_parse() {
        let cidr = Cidr::parse("10.0.0.0/16").unwrap();
        assert_eq!(cidr.prefix(), 16);
        assert_eq!(cidr.to_string(), "10.0.0.0/16");
        assert_eq!(Cidr::parse(ANYWHERE).unwrap(), Cidr::anywhere());
    }

    #[test]
    fn test_cidr_rejects_invalid() {
        for bad in ["10.0.0.0", "10.0.0/16", "10.0.0.0/33", "invalid/24", "10.0.0.1/16"] {
            assert!(Cidr::parse(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_cidr_contains() {
        let vcn = Cidr::parse(VCN_CIDR).unwrap();
        assert!(vcn.contains(&Cidr::parse(SUBNET_CIDR).unwrap()));
        assert!(vcn.contains(&vcn));
        assert!(!vcn.contains(&Cidr::parse("10.1.0.0/24").unwrap()));
        assert!(!vcn.contains(&Cidr::parse("10.0.0.0/8").unwrap()));
        assert!(Cidr::anywhere().contains(&vcn));
    }

    #[test]
    fn test_private_ranges() {
        assert!(Cidr::parse("10.0.0.0/16").unwrap().is_private());
        assert!(Cidr::parse("172.16.0.0/12").unwrap().is_private());
        assert!(Cidr::parse("192.168.10.0/24").unwrap().is_private());
        assert!(!Cidr::parse("172.32.0.0/16").unwrap().is_private());
        assert!(!Cidr::anywhere().is_private());
    }

    #[test]
    fn test_vcn_requires_private_range() {
        let result = Vcn::new("ocid1.compartment", &code(), Cidr::parse("8.8.0.0/16").unwrap());
        assert!(matches!(result, Err(OciError::InvalidNetwork(_))));
    }

    #[test]
    fn test_subnet_must_fit_in_vcn() {
        let vcn = Vcn::new("ocid1.compartment", &code(), Cidr::parse(VCN_CIDR).unwrap()).unwrap();
        let result = Subnet::new(
            "ocid1.compartment",
            &code(),
            &vcn,
            Cidr::parse("10.9.0.0/24").unwrap(),
            OutputRef::new("dokploySecurityList", "id"),
        );
        assert!(matches!(result, Err(OciError::InvalidNetwork(_))));
    }

    #[test]
    fn test_route_table_body() {
        let value = serde_json::to_value(DefaultRouteTable::internet_route()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "manageDefaultResourceId": "${dokployVcn.defaultRouteTableId}",
                "routeRules": [{
                    "destination": "0.0.0.0/0",
                    "destinationType": "CIDR_BLOCK",
                    "networkEntityId": "${dokployInternetGateway.id}"
                }]
            })
        );
    }

    #[test]
    fn test_vcn_names_carry_code() {
        let vcn = Vcn::new("ocid1.compartment", &code(), Cidr::parse(VCN_CIDR).unwrap()).unwrap();
        assert_eq!(vcn.display_name, "network-dokploy-ab12cd");
        assert_eq!(vcn.dns_label, "vcnab12cd");
    }
}
