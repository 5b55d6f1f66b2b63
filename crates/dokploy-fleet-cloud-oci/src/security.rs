//! Security list opened for Dokploy and Docker Swarm
//!
//! The port set is what Dokploy, Traefik and Swarm need to talk to each other
//! and must not drift.

use crate::error::{OciError, Result};
use crate::network::{Cidr, Vcn};
use dokploy_fleet_cloud::OutputRef;
use serde::{Serialize, Serializer};

/// IP protocol as OCI expects it (IANA number or "all")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    All,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "6",
            Protocol::Udp => "17",
            Protocol::Icmp => "1",
            Protocol::All => "all",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Icmp => write!(f, "icmp"),
            Protocol::All => write!(f, "all"),
        }
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Inclusive port range, `1 <= min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortRange {
    min: u16,
    max: u16,
}

impl PortRange {
    pub fn new(min: u16, max: u16) -> Result<Self> {
        if min == 0 || min > max {
            return Err(OciError::InvalidPortRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn single(port: u16) -> Result<Self> {
        Self::new(port, port)
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IcmpOptions {
    #[serde(rename = "type")]
    pub icmp_type: u8,

    /// [`ICMP_ANY_CODE`] matches every code of the type
    pub code: i16,
}

/// ICMP code wildcard
pub const ICMP_ANY_CODE: i16 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub protocol: Protocol,
    pub source: Cidr,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_options: Option<PortRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp_options: Option<PortRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_options: Option<IcmpOptions>,

    pub description: String,
}

impl IngressRule {
    /// TCP from anywhere to a single port
    pub fn tcp(port: u16, description: impl Into<String>) -> Result<Self> {
        Ok(Self {
            protocol: Protocol::Tcp,
            source: Cidr::anywhere(),
            tcp_options: Some(PortRange::single(port)?),
            udp_options: None,
            icmp_options: None,
            description: description.into(),
        })
    }

    /// UDP from anywhere to a single port
    pub fn udp(port: u16, description: impl Into<String>) -> Result<Self> {
        Ok(Self {
            protocol: Protocol::Udp,
            source: Cidr::anywhere(),
            tcp_options: None,
            udp_options: Some(PortRange::single(port)?),
            icmp_options: None,
            description: description.into(),
        })
    }

    pub fn icmp(
        source: Cidr,
        icmp_type: u8,
        code: i16,
        description: impl Into<String>,
    ) -> Self {
        Self {
            protocol: Protocol::Icmp,
            source,
            tcp_options: None,
            udp_options: None,
            icmp_options: Some(IcmpOptions { icmp_type, code }),
            description: description.into(),
        }
    }

    /// Port range of a TCP or UDP rule
    pub fn ports(&self) -> Option<PortRange> {
        self.tcp_options.or(self.udp_options)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressRule {
    pub protocol: Protocol,
    pub destination: Cidr,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityList {
    pub compartment_id: String,
    pub vcn_id: OutputRef,
    pub display_name: String,
    pub ingress_security_rules: Vec<IngressRule>,
    pub egress_security_rules: Vec<EgressRule>,
}

impl SecurityList {
    pub const NAME: &'static str = "dokploySecurityList";

    /// The Dokploy rule set; `vcn_cidr` scopes the path MTU discovery rule
    pub fn dokploy(compartment_id: &str, vcn_cidr: Cidr) -> Result<Self> {
        let ingress_security_rules = vec![
            IngressRule::tcp(3000, "Allow HTTP traffic for Dokploy on port 3000")?,
            IngressRule::tcp(22, "Allow SSH traffic on port 22")?,
            IngressRule::tcp(80, "Allow HTTP traffic on port 80")?,
            IngressRule::tcp(443, "Allow HTTPS traffic on port 443")?,
            IngressRule::icmp(Cidr::anywhere(), 3, 4, "ICMP traffic for 3, 4"),
            IngressRule::icmp(vcn_cidr, 3, ICMP_ANY_CODE, "ICMP traffic for 3"),
            IngressRule::tcp(81, "Allow Traefik HTTP traffic on port 81")?,
            IngressRule::tcp(444, "Allow Traefik HTTPS traffic on port 444")?,
            IngressRule::tcp(2376, "Allow Docker Swarm traffic on port 2376")?,
            IngressRule::tcp(2377, "Allow Docker Swarm traffic on port 2377")?,
            IngressRule::tcp(7946, "Allow Docker Swarm traffic on port 7946")?,
            IngressRule::udp(7946, "Allow Docker Swarm UDP traffic on port 7946")?,
            IngressRule::udp(4789, "Allow Docker Swarm UDP traffic on port 4789")?,
        ];

        Ok(Self {
            compartment_id: compartment_id.to_string(),
            vcn_id: Vcn::id(),
            display_name: "Dokploy Security List".to_string(),
            ingress_security_rules,
            egress_security_rules: vec![EgressRule {
                protocol: Protocol::All,
                destination: Cidr::anywhere(),
                description: "Allow all egress traffic".to_string(),
            }],
        })
    }

    pub fn id() -> OutputRef {
        OutputRef::new(Self::NAME, "id")
    }

    /// `(protocol, port)` of every TCP/UDP ingress rule, in rule order
    pub fn open_ports(&self) -> Vec<(Protocol, u16)> {
        self.ingress_security_rules
            .iter()
            .filter_map(|rule| rule.ports().map(|p| (rule.protocol, p.min())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::VCN_CIDR;

    fn dokploy() -> SecurityList {
        SecurityList::dokploy("ocid1.compartment", Cidr::parse(VCN_CIDR).unwrap()).unwrap()
    }

    #[test]
    fn test_rule_counts() {
        let list = dokploy();
        assert_eq!(list.ingress_security_rules.len(), 13);
        assert_eq!(list.egress_security_rules.len(), 1);

        let icmp = list
            .ingress_security_rules
            .iter()
            .filter(|r| r.protocol == Protocol::Icmp)
            .count();
        assert_eq!(icmp, 2);
    }

    #[test]
    fn test_open_ports() {
        use Protocol::{Tcp, Udp};

        assert_eq!(
            dokploy().open_ports(),
            vec![
                (Tcp, 3000),
                (Tcp, 22),
                (Tcp, 80),
                (Tcp, 443),
                (Tcp, 81),
                (Tcp, 444),
                (Tcp, 2376),
                (Tcp, 2377),
                (Tcp, 7946),
                (Udp, 7946),
                (Udp, 4789),
            ]
        );
    }

    #[test]
    fn test_icmp_rules() {
        let list = dokploy();
        let rule = &list.ingress_security_rules[4];
        assert_eq!(rule.source, Cidr::anywhere());
        assert_eq!(
            rule.icmp_options,
            Some(IcmpOptions {
                icmp_type: 3,
                code: 4
            })
        );

        let rule = &list.ingress_security_rules[5];
        assert_eq!(rule.source.to_string(), "10.0.0.0/16");
        assert_eq!(rule.icmp_options.unwrap().code, ICMP_ANY_CODE);
    }

    #[test]
    fn test_invalid_port_range() {
        assert!(PortRange::new(0, 10).is_err());
        assert!(PortRange::new(443, 80).is_err());
        assert!(PortRange::new(8000, 8080).is_ok());
        assert!(IngressRule::tcp(0, "nope").is_err());
    }

    #[test]
    fn test_serialized_rules() {
        let value = serde_json::to_value(dokploy()).unwrap();

        assert_eq!(
            value["ingressSecurityRules"][0],
            serde_json::json!({
                "protocol": "6",
                "source": "0.0.0.0/0",
                "tcpOptions": {"min": 3000, "max": 3000},
                "description": "Allow HTTP traffic for Dokploy on port 3000"
            })
        );
        assert_eq!(
            value["ingressSecurityRules"][5],
            serde_json::json!({
                "protocol": "1",
                "source": "10.0.0.0/16",
                "icmpOptions": {"type": 3, "code": -1},
                "description": "ICMP traffic for 3"
            })
        );
        assert_eq!(
            value["ingressSecurityRules"][4]["icmpOptions"],
            serde_json::json!({"type": 3, "code": 4})
        );
        assert_eq!(
            value["ingressSecurityRules"][12]["udpOptions"],
            serde_json::json!({"min": 4789, "max": 4789})
        );
        assert_eq!(
            value["egressSecurityRules"],
            serde_json::json!([{
                "protocol": "all",
                "destination": "0.0.0.0/0",
                "description": "Allow all egress traffic"
            }])
        );
        assert_eq!(value["vcnId"], "${dokployVcn.id}");
    }
}
