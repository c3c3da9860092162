//! agentstack-topology — pure descriptor builders for the agent fleet.
//!
//! Every builder is a total function of [`ResolvedArguments`] returning one
//! fragment. [`Topology::derive`] composes them into a plain record that the
//! provisioning backend materialises. Nothing here talks to a cloud API.
//!
//! # Fragments
//!
//! - **`ssm`** — configuration parameter and its JSON payload
//! - **`image`** — explicit image id or a deterministic lookup name
//! - **`launch`** — instance type, image, key pair, user data
//! - **`security`** — managed security group rules, or an existing group
//! - **`iam`** — instance profile, suspender, and scaler statement sets
//! - **`capacity`** — scaling bounds and network placement
//! - **`functions`** — AZ-rebalance suspender and the optional scaler

pub mod capacity;
pub mod functions;
pub mod iam;
pub mod image;
pub mod launch;
pub mod security;
pub mod ssm;

use serde::Serialize;
use tracing::info;

use agentstack_config::ResolvedArguments;

pub use capacity::{AutoScalingGroup, NetworkPlacement, ScalingBounds, ZoneSelection};
pub use functions::{ScalerFunction, SuspenderFunction};
pub use iam::{PolicyDocument, PolicyStatement};
pub use image::ImageSelector;
pub use launch::LaunchTemplate;
pub use security::{SecurityGroupPlan, SecurityRule, SecurityRules};
pub use ssm::{SsmParameter, SsmPayload};

/// Placeholder for the deploying account id, substituted by the
/// provisioning backend.
pub const ACCOUNT_ID_TOKEN: &str = "${AWS::AccountId}";

/// Version baked into image lookup names.
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The complete descriptor for one fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub stack_name: String,
    pub ssm_parameter: SsmParameter,
    pub launch_template: LaunchTemplate,
    pub security_group: SecurityGroupPlan,
    pub instance_profile: PolicyDocument,
    pub auto_scaling_group: AutoScalingGroup,
    pub suspender: SuspenderFunction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerFunction>,
}

impl Topology {
    pub fn derive(args: &ResolvedArguments) -> Self {
        let topology = Self {
            stack_name: args.stack_name.clone(),
            ssm_parameter: ssm::ssm_parameter(args),
            launch_template: launch::launch_template(args),
            security_group: security::security_group(args),
            instance_profile: iam::instance_profile_policy(args),
            auto_scaling_group: capacity::auto_scaling_group(args),
            suspender: functions::suspender_function(args),
            scaler: functions::scaler_function(args),
        };

        info!(
            stack = %topology.stack_name,
            custom_network = topology.auto_scaling_group.placement.is_custom(),
            image_lookup = topology.launch_template.image.is_lookup(),
            dynamic_scaling = topology.scaler.is_some(),
            "derived topology"
        );

        topology
    }

    pub fn is_scaler_enabled(&self) -> bool {
        self.scaler.is_some()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
