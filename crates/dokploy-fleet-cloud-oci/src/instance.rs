//! Compute instances
//!
//! Every node is built from one [`InstanceTemplate`]; nodes differ only in
//! identity, availability domain and startup payload.

use crate::naming::ResourceCode;
use crate::network::Subnet;
use crate::startup_scripts::{NodeRole, StartupPayload};
use dokploy_fleet_cloud::OutputRef;
use dokploy_fleet_config::FleetConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PluginState {
    Enabled,
    Disabled,
}

/// Oracle Cloud Agent plugins and their desired state
pub const AGENT_PLUGINS: &[(&str, PluginState)] = &[
    ("Vulnerability Scanning", PluginState::Disabled),
    ("Management Agent", PluginState::Disabled),
    ("Custom Logs Monitoring", PluginState::Enabled),
    ("Compute RDMA GPU Monitoring", PluginState::Disabled),
    ("Compute Instance Monitoring", PluginState::Enabled),
    ("Compute HPC RDMA Auto-Configuration", PluginState::Disabled),
    ("Compute HPC RDMA Authentication", PluginState::Disabled),
    ("Cloud Guard Workload Protection", PluginState::Enabled),
    ("Block Volume Management", PluginState::Disabled),
    ("Bastion", PluginState::Disabled),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub desired_state: PluginState,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub are_all_plugins_disabled: bool,
    pub is_management_disabled: bool,
    pub is_monitoring_disabled: bool,
    pub plugins_configs: Vec<PluginConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            are_all_plugins_disabled: false,
            is_management_disabled: false,
            is_monitoring_disabled: false,
            plugins_configs: AGENT_PLUGINS
                .iter()
                .map(|(name, desired_state)| PluginConfig {
                    desired_state: *desired_state,
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeConfig {
    pub memory_in_gbs: u32,
    pub ocpus: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDetails {
    pub source_id: String,
    pub source_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryAction {
    RestoreInstance,
    StopInstance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityConfig {
    pub recovery_action: RecoveryAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceOptions {
    pub are_legacy_imds_endpoints_disabled: bool,
}

/// Attributes shared by every node of the fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTemplate {
    pub shape: String,
    pub shape_config: ShapeConfig,
    pub source_details: SourceDetails,
    pub is_pv_encryption_in_transit_enabled: bool,
    pub availability_config: AvailabilityConfig,
    pub instance_options: InstanceOptions,
    pub agent_config: AgentConfig,
}

impl InstanceTemplate {
    pub fn from_config(config: &FleetConfig) -> Self {
        Self {
            shape: config.instance_shape.clone(),
            shape_config: ShapeConfig {
                memory_in_gbs: config.memory_in_gbs,
                ocpus: config.ocpus,
            },
            source_details: SourceDetails {
                source_id: config.source_image_id.clone(),
                source_type: "image".to_string(),
            },
            is_pv_encryption_in_transit_enabled: true,
            availability_config: AvailabilityConfig {
                recovery_action: RecoveryAction::RestoreInstance,
            },
            instance_options: InstanceOptions {
                are_legacy_imds_endpoints_disabled: false,
            },
            agent_config: AgentConfig::default(),
        }
    }
}

/// Instance metadata; keys follow OCI's metadata conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeMetadata {
    pub ssh_authorized_keys: String,
    pub user_data: StartupPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicDetails {
    pub display_name: String,
    pub subnet_id: OutputRef,
    pub skip_source_dest_check: bool,
    pub assign_public_ip: String,
}

/// One instance of the fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeNode {
    /// Logical name in the resource set
    #[serde(skip)]
    pub name: String,

    #[serde(skip)]
    pub role: NodeRole,

    pub display_name: String,
    pub compartment_id: String,
    pub availability_domain: String,
    pub metadata: NodeMetadata,
    pub create_vnic_details: VnicDetails,

    #[serde(flatten)]
    pub template: InstanceTemplate,
}

impl ComputeNode {
    pub const MAIN_NAME: &'static str = "dokployMain";

    /// Logical name of worker `index` (1-based)
    pub fn worker_name(index: u32) -> String {
        format!("dokployWorker{}", index)
    }

    pub fn main(
        config: &FleetConfig,
        template: &InstanceTemplate,
        code: &ResourceCode,
        payload: &StartupPayload,
    ) -> Self {
        Self::build(
            Self::MAIN_NAME.to_string(),
            NodeRole::Main,
            code.main_node_name(),
            &config.availability_domain_main,
            config,
            template,
            payload,
        )
    }

    pub fn worker(
        index: u32,
        config: &FleetConfig,
        template: &InstanceTemplate,
        code: &ResourceCode,
        payload: &StartupPayload,
    ) -> Self {
        Self::build(
            Self::worker_name(index),
            NodeRole::Worker,
            code.worker_node_name(index),
            &config.availability_domain_workers,
            config,
            template,
            payload,
        )
    }

    fn build(
        name: String,
        role: NodeRole,
        display_name: String,
        availability_domain: &str,
        config: &FleetConfig,
        template: &InstanceTemplate,
        payload: &StartupPayload,
    ) -> Self {
        Self {
            name,
            role,
            compartment_id: config.compartment_id.clone(),
            availability_domain: availability_domain.to_string(),
            metadata: NodeMetadata {
                ssh_authorized_keys: config.ssh_authorized_keys.clone(),
                user_data: payload.clone(),
            },
            create_vnic_details: VnicDetails {
                display_name: display_name.clone(),
                subnet_id: Subnet::id(),
                skip_source_dest_check: false,
                assign_public_ip: "true".to_string(),
            },
            display_name,
            template: template.clone(),
        }
    }

    pub fn public_ip(&self) -> OutputRef {
        OutputRef::new(&self.name, "publicIp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> FleetConfig {
        FleetConfig {
            ssh_authorized_keys: "ssh-ed25519 AAAAC3Nz test@example".to_string(),
            compartment_id: "ocid1.compartment.oc1..aaaa".to_string(),
            source_image_id: "ocid1.image.oc1..bbbb".to_string(),
            num_worker_instances: 1,
            availability_domain_main: "AD-1".to_string(),
            availability_domain_workers: "AD-2".to_string(),
            instance_shape: "VM.Standard.A1.Flex".to_string(),
            memory_in_gbs: 6,
            ocpus: 1,
            main_startup_script: PathBuf::from("bin/dokploy-main.sh"),
            worker_startup_script: PathBuf::from("bin/dokploy-worker.sh"),
        }
    }

    #[test]
    fn test_template_from_config() {
        let template = InstanceTemplate::from_config(&config());
        assert_eq!(
            template.shape_config,
            ShapeConfig {
                memory_in_gbs: 6,
                ocpus: 1
            }
        );
        assert_eq!(template.source_details.source_id, "ocid1.image.oc1..bbbb");
        assert_eq!(template.agent_config.plugins_configs.len(), 10);

        let enabled: Vec<_> = template
            .agent_config
            .plugins_configs
            .iter()
            .filter(|p| p.desired_state == PluginState::Enabled)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(
            enabled,
            vec![
                "Custom Logs Monitoring",
                "Compute Instance Monitoring",
                "Cloud Guard Workload Protection"
            ]
        );
    }

    #[test]
    fn test_nodes_use_their_own_domain() {
        let config = config();
        let template = InstanceTemplate::from_config(&config);
        let code = ResourceCode::parse("ab12cd").unwrap();
        let payload = StartupPayload::new("echo");

        let main = ComputeNode::main(&config, &template, &code, &payload);
        let worker = ComputeNode::worker(1, &config, &template, &code, &payload);

        assert_eq!(main.availability_domain, "AD-1");
        assert_eq!(worker.availability_domain, "AD-2");
        assert_eq!(worker.name, "dokployWorker1");
        assert_eq!(worker.display_name, "dokploy-worker-1-ab12cd");
        assert_eq!(worker.create_vnic_details.display_name, worker.display_name);
        assert_eq!(main.public_ip().to_string(), "${dokployMain.publicIp}");
    }

    #[test]
    fn test_serialized_instance_body() {
        let config = config();
        let template = InstanceTemplate::from_config(&config);
        let code = ResourceCode::parse("ab12cd").unwrap();
        let node = ComputeNode::main(&config, &template, &code, &StartupPayload::new("hi"));

        let value = serde_json::to_value(&node).unwrap();
        assert!(value.get("name").is_none());
        assert!(value.get("role").is_none());
        assert_eq!(value["displayName"], "dokploy-main-ab12cd");
        assert_eq!(value["shape"], "VM.Standard.A1.Flex");
        assert_eq!(value["shapeConfig"], serde_json::json!({"memoryInGbs": 6, "ocpus": 1}));
        assert_eq!(value["availabilityConfig"]["recoveryAction"], "RESTORE_INSTANCE");
        assert_eq!(value["isPvEncryptionInTransitEnabled"], true);
        assert_eq!(value["metadata"]["user_data"], "aGk=");
        assert_eq!(value["createVnicDetails"]["subnetId"], "${dokploySubnet.id}");
        assert_eq!(value["createVnicDetails"]["assignPublicIp"], "true");
        assert_eq!(
            value["agentConfig"]["pluginsConfigs"][0],
            serde_json::json!({"desiredState": "DISABLED", "name": "Vulnerability Scanning"})
        );
    }
}
