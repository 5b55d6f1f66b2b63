//! Oracle Cloud fleet plan for Dokploy
//!
//! Declares everything a Dokploy cluster on Docker Swarm needs on Oracle
//! Cloud Infrastructure:
//!
//! - one VCN with an internet gateway and a default route to it
//! - a security list opened for Dokploy, Traefik and Swarm
//! - one public subnet
//! - one main node and any number of worker nodes
//!
//! Provisioning itself belongs to the external engine; this crate only
//! produces declarations and output references.
//!
//! # Example
//!
//! ```ignore
//! use dokploy_fleet_cloud_oci::{FleetPlan, ResourceCode, StartupScripts};
//!
//! let (_, config) = dokploy_fleet_config::load_fleet_config(None)?;
//! let scripts = StartupScripts::for_config(&config)?;
//! let plan = FleetPlan::build(&config, &scripts, ResourceCode::generate())?;
//!
//! for resource in plan.to_resource_set()?.iter() {
//!     println!("{} {}", resource.resource_type, resource.name);
//! }
//! ```

pub mod error;
pub mod instance;
pub mod naming;
pub mod network;
pub mod plan;
pub mod security;
pub mod startup_scripts;

pub use error::{OciError, Result};
pub use instance::{AGENT_PLUGINS, ComputeNode, InstanceTemplate, PluginState};
pub use naming::{RESOURCE_CODE_LEN, ResourceCode};
pub use network::{Cidr, DefaultRouteTable, InternetGateway, Subnet, Vcn};
pub use plan::{FleetOutputs, FleetPlan, PROVIDER, output_names, types};
pub use security::{ICMP_ANY_CODE, IcmpOptions, IngressRule, PortRange, Protocol, SecurityList};
pub use startup_scripts::{NodeRole, StartupPayload, StartupScript, StartupScripts};
