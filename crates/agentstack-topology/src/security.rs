//! Security group rules.

use serde::Serialize;
use tracing::debug;

use agentstack_config::ResolvedArguments;

pub const ANYWHERE: &str = "0.0.0.0/0";
pub const SSH_PORT: u16 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Any protocol (`-1`).
    All,
    Tcp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityRule {
    pub cidr: String,
    pub protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_port: Option<u16>,
    pub description: String,
}

/// Egress and ingress for the managed group. No ingress means no key is
/// set, or hosts are reached through Systems Manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityRules {
    pub egress: Vec<SecurityRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<SecurityRule>,
}

/// Which group the launch template attaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecurityGroupPlan {
    /// A group supplied by the operator; nothing is created.
    Existing { group_id: String },
    /// A group created for the stack in the fleet's network.
    Managed {
        vpc: VpcRef,
        rules: SecurityRules,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VpcRef {
    Default,
    Explicit { vpc_id: String },
}

pub fn egress_rule() -> SecurityRule {
    SecurityRule {
        cidr: ANYWHERE.to_string(),
        protocol: Protocol::All,
        from_port: None,
        to_port: None,
        description: "Allow all outbound traffic by default".to_string(),
    }
}

pub fn ssh_ingress_rule() -> SecurityRule {
    SecurityRule {
        cidr: ANYWHERE.to_string(),
        protocol: Protocol::Tcp,
        from_port: Some(SSH_PORT),
        to_port: Some(SSH_PORT),
        description: "allow ssh access from anywhere".to_string(),
    }
}

pub fn security_rules(args: &ResolvedArguments) -> SecurityRules {
    let ingress = if args.allows_remote_shell_ingress() {
        vec![ssh_ingress_rule()]
    } else {
        debug!(os = %args.os, "ssh ingress not allowed");
        Vec::new()
    };

    SecurityRules {
        egress: vec![egress_rule()],
        ingress,
    }
}

pub fn security_group(args: &ResolvedArguments) -> SecurityGroupPlan {
    if let Some(group_id) = &args.security_group_id {
        return SecurityGroupPlan::Existing {
            group_id: group_id.clone(),
        };
    }

    let vpc = match &args.vpc_id {
        Some(vpc_id) => VpcRef::Explicit {
            vpc_id: vpc_id.clone(),
        },
        None => VpcRef::Default,
    };

    SecurityGroupPlan::Managed {
        vpc,
        rules: security_rules(args),
    }
}
