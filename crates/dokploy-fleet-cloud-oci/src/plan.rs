//! Fleet provisioning plan
//!
//! Assembles every declaration for one Dokploy fleet: network, security list,
//! subnet, one main node and `numWorkerInstances` workers.

use crate::error::Result;
use crate::instance::{ComputeNode, InstanceTemplate};
use crate::naming::ResourceCode;
use crate::network::{Cidr, DefaultRouteTable, InternetGateway, SUBNET_CIDR, Subnet, VCN_CIDR, Vcn};
use crate::security::SecurityList;
use crate::startup_scripts::{NodeRole, StartupScripts};
use dokploy_fleet_cloud::{Manifest, OutputRef, OutputValue, Outputs, ResourceConfig, ResourceSet};
use dokploy_fleet_config::FleetConfig;
use serde::Serialize;

pub const PROVIDER: &str = "oci";

/// Engine type tokens
pub mod types {
    pub const VCN: &str = "oci:Core/vcn:Vcn";
    pub const INTERNET_GATEWAY: &str = "oci:Core/internetGateway:InternetGateway";
    pub const DEFAULT_ROUTE_TABLE: &str = "oci:Core/defaultRouteTable:DefaultRouteTable";
    pub const SECURITY_LIST: &str = "oci:Core/securityList:SecurityList";
    pub const SUBNET: &str = "oci:Core/subnet:Subnet";
    pub const INSTANCE: &str = "oci:Core/instance:Instance";
}

/// Output names as downstream automation reads them
pub mod output_names {
    pub const MAIN_INSTANCE_PUBLIC_IP: &str = "mainInstancePublicIp";
    pub const WORKER_INSTANCE_PUBLIC_IPS: &str = "workerInstancePublicIps";
    pub const VCN_ID: &str = "vcnId";
    pub const SUBNET_ID: &str = "subnetId";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetOutputs {
    pub main_instance_public_ip: OutputRef,

    /// Ordered by worker index
    pub worker_instance_public_ips: Vec<OutputRef>,

    pub vcn_id: OutputRef,
    pub subnet_id: OutputRef,
}

impl FleetOutputs {
    pub fn to_outputs(&self) -> Outputs {
        let mut outputs = Outputs::new();
        outputs.insert(
            output_names::MAIN_INSTANCE_PUBLIC_IP,
            OutputValue::Single(self.main_instance_public_ip.clone()),
        );
        outputs.insert(
            output_names::WORKER_INSTANCE_PUBLIC_IPS,
            OutputValue::List(self.worker_instance_public_ips.clone()),
        );
        outputs.insert(output_names::VCN_ID, OutputValue::Single(self.vcn_id.clone()));
        outputs.insert(
            output_names::SUBNET_ID,
            OutputValue::Single(self.subnet_id.clone()),
        );
        outputs
    }
}

/// Every declaration of one fleet
#[derive(Debug, Clone, PartialEq)]
pub struct FleetPlan {
    pub resource_code: ResourceCode,
    pub vcn: Vcn,
    pub internet_gateway: InternetGateway,
    pub route_table: DefaultRouteTable,
    pub security_list: SecurityList,
    pub subnet: Subnet,
    pub main: ComputeNode,

    /// Ordered by index, starting at 1
    pub workers: Vec<ComputeNode>,

    pub outputs: FleetOutputs,
}

impl FleetPlan {
    /// Build the plan. `code` is threaded into every name; the same inputs
    /// always produce the same declarations.
    pub fn build(
        config: &FleetConfig,
        scripts: &StartupScripts,
        code: ResourceCode,
    ) -> Result<Self> {
        tracing::info!(
            resource_code = %code,
            workers = config.num_worker_instances,
            "Building fleet plan"
        );

        let vcn_cidr = Cidr::parse(VCN_CIDR)?;
        let vcn = Vcn::new(&config.compartment_id, &code, vcn_cidr)?;
        let internet_gateway = InternetGateway::new(&config.compartment_id);
        let route_table = DefaultRouteTable::internet_route();
        let security_list = SecurityList::dokploy(&config.compartment_id, vcn_cidr)?;
        let subnet = Subnet::new(
            &config.compartment_id,
            &code,
            &vcn,
            Cidr::parse(SUBNET_CIDR)?,
            SecurityList::id(),
        )?;

        let template = InstanceTemplate::from_config(config);
        let main = ComputeNode::main(config, &template, &code, scripts.payload(NodeRole::Main)?);

        let mut workers = Vec::new();
        if config.num_worker_instances > 0 {
            let payload = scripts.payload(NodeRole::Worker)?;
            for index in 1..=config.num_worker_instances {
                workers.push(ComputeNode::worker(index, config, &template, &code, payload));
            }
        }

        let outputs = FleetOutputs {
            main_instance_public_ip: main.public_ip(),
            worker_instance_public_ips: workers.iter().map(ComputeNode::public_ip).collect(),
            vcn_id: Vcn::id(),
            subnet_id: Subnet::id(),
        };

        Ok(Self {
            resource_code: code,
            vcn,
            internet_gateway,
            route_table,
            security_list,
            subnet,
            main,
            workers,
            outputs,
        })
    }

    /// Main node followed by the workers
    pub fn nodes(&self) -> impl Iterator<Item = &ComputeNode> {
        std::iter::once(&self.main).chain(self.workers.iter())
    }

    /// Declarations in dependency order
    pub fn to_resource_set(&self) -> Result<ResourceSet> {
        let mut set = ResourceSet::new();

        set.add(declare(types::VCN, Vcn::NAME, &self.vcn)?)?;
        set.add(
            declare(
                types::INTERNET_GATEWAY,
                InternetGateway::NAME,
                &self.internet_gateway,
            )?
            .with_dependency(Vcn::NAME),
        )?;
        set.add(
            declare(
                types::DEFAULT_ROUTE_TABLE,
                DefaultRouteTable::NAME,
                &self.route_table,
            )?
            .with_dependency(Vcn::NAME)
            .with_dependency(InternetGateway::NAME),
        )?;
        set.add(
            declare(
                types::SECURITY_LIST,
                SecurityList::NAME,
                &self.security_list,
            )?
            .with_dependency(Vcn::NAME),
        )?;
        set.add(
            declare(types::SUBNET, Subnet::NAME, &self.subnet)?
                .with_dependency(Vcn::NAME)
                .with_dependency(DefaultRouteTable::NAME)
                .with_dependency(SecurityList::NAME),
        )?;

        for node in self.nodes() {
            set.add(declare(types::INSTANCE, &node.name, node)?.with_dependency(Subnet::NAME))?;
        }

        set.validate_dependencies()?;
        Ok(set)
    }

    /// Manifest for the external engine
    pub fn to_manifest(&self) -> Result<Manifest> {
        Ok(Manifest::new(self.to_resource_set()?, self.outputs.to_outputs())
            .with_metadata("resourceCode", self.resource_code.as_str())
            .with_metadata("generator", concat!("dokploy-fleet ", env!("CARGO_PKG_VERSION"))))
    }
}

fn declare<T: Serialize>(resource_type: &str, name: &str, body: &T) -> Result<ResourceConfig> {
    Ok(ResourceConfig::new(
        resource_type,
        name,
        PROVIDER,
        serde_json::to_value(body)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(workers: u32) -> FleetConfig {
        FleetConfig {
            ssh_authorized_keys: "ssh-ed25519 AAAAC3Nz test@example".to_string(),
            compartment_id: "ocid1.compartment.oc1..aaaa".to_string(),
            source_image_id: "ocid1.image.oc1..bbbb".to_string(),
            num_worker_instances: workers,
            availability_domain_main: "AD-1".to_string(),
            availability_domain_workers: "AD-2".to_string(),
            instance_shape: "VM.Standard.A1.Flex".to_string(),
            memory_in_gbs: 6,
            ocpus: 1,
            main_startup_script: PathBuf::from("bin/dokploy-main.sh"),
            worker_startup_script: PathBuf::from("bin/dokploy-worker.sh"),
        }
    }

    fn code() -> ResourceCode {
        ResourceCode::parse("q7w8e9").unwrap()
    }

    #[test]
    fn test_dependency_order() {
        let plan = FleetPlan::build(&config(2), &StartupScripts::from_bytes("m", "w"), code())
            .unwrap();
        let set = plan.to_resource_set().unwrap();

        let names: Vec<_> = set.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "dokployVcn",
                "dokployInternetGateway",
                "dokployDefaultRouteTable",
                "dokploySecurityList",
                "dokploySubnet",
                "dokployMain",
                "dokployWorker1",
                "dokployWorker2",
            ]
        );
        assert_eq!(set.by_type(types::INSTANCE).len(), 3);
    }

    #[test]
    fn test_worker_script_only_needed_with_workers() {
        let scripts = StartupScripts::new(
            crate::startup_scripts::StartupScript::from_bytes(NodeRole::Main, "m"),
            None,
        );
        assert!(FleetPlan::build(&config(0), &scripts, code()).is_ok());
        assert!(FleetPlan::build(&config(1), &scripts, code()).is_err());
    }

    #[test]
    fn test_outputs() {
        let plan = FleetPlan::build(&config(2), &StartupScripts::from_bytes("m", "w"), code())
            .unwrap();

        let outputs = serde_json::to_value(plan.outputs.to_outputs()).unwrap();
        assert_eq!(
            outputs,
            serde_json::json!({
                "mainInstancePublicIp": "${dokployMain.publicIp}",
                "subnetId": "${dokploySubnet.id}",
                "vcnId": "${dokployVcn.id}",
                "workerInstancePublicIps": [
                    "${dokployWorker1.publicIp}",
                    "${dokployWorker2.publicIp}"
                ]
            })
        );
    }

    #[test]
    fn test_manifest_metadata() {
        let plan = FleetPlan::build(&config(1), &StartupScripts::from_bytes("m", "w"), code())
            .unwrap();
        let manifest = plan.to_manifest().unwrap();
        assert_eq!(
            manifest.metadata.get("resourceCode").map(String::as_str),
            Some("q7w8e9")
        );
        assert_eq!(manifest.resources.len(), 7);
        assert_eq!(manifest.outputs.len(), 4);
    }
}
