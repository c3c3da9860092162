//! Launch template for agent hosts.

use serde::Serialize;

use agentstack_config::ResolvedArguments;

use crate::image::{self, ImageSelector};

/// Security group reference as seen by the launch template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecurityGroupRef {
    Existing { group_id: String },
    /// The group created by this stack.
    Managed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchTemplate {
    pub instance_type: String,
    pub image: ImageSelector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    pub security_group: SecurityGroupRef,
    pub user_data: String,
}

/// Boot script that starts the agent with its SSM parameter name.
pub fn user_data(args: &ResolvedArguments) -> String {
    let parameter = args.config_parameter_name();
    if args.is_restricted_os_family() {
        format!("<powershell>C:\\semaphore-agent\\start.ps1 {parameter}</powershell>")
    } else {
        format!("#!/bin/bash\n/opt/semaphore/agent/start.sh {parameter}")
    }
}

pub fn launch_template(args: &ResolvedArguments) -> LaunchTemplate {
    let security_group = match &args.security_group_id {
        Some(group_id) => SecurityGroupRef::Existing {
            group_id: group_id.clone(),
        },
        None => SecurityGroupRef::Managed,
    };

    LaunchTemplate {
        instance_type: args.instance_type.clone(),
        image: image::image_selector(args),
        key_name: args.key_name.clone(),
        security_group,
        user_data: user_data(args),
    }
}
