//! Auto scaling group bounds and network placement.

use serde::Serialize;

use agentstack_config::ResolvedArguments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalingBounds {
    pub min: u32,
    pub max: u32,
    pub desired: u32,
}

/// Where agent hosts are launched. The two forms are exclusive: a custom
/// network names its subnets, the default network leaves zone selection
/// to the provisioning backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkPlacement {
    Default { availability_zones: ZoneSelection },
    Custom { vpc_id: String, subnet_ids: Vec<String> },
}

impl NetworkPlacement {
    pub fn is_custom(&self) -> bool {
        matches!(self, NetworkPlacement::Custom { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSelection {
    FromEnvironment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
    pub propagate_at_launch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoScalingGroup {
    pub bounds: ScalingBounds,
    pub placement: NetworkPlacement,
    pub tags: Vec<Tag>,
}

pub fn scaling_bounds(args: &ResolvedArguments) -> ScalingBounds {
    ScalingBounds {
        min: args.asg_min_size,
        max: args.asg_max_size,
        desired: args.asg_desired,
    }
}

pub fn network_placement(args: &ResolvedArguments) -> NetworkPlacement {
    match &args.vpc_id {
        Some(vpc_id) => NetworkPlacement::Custom {
            vpc_id: vpc_id.clone(),
            subnet_ids: args.subnets.clone(),
        },
        None => NetworkPlacement::Default {
            availability_zones: ZoneSelection::FromEnvironment,
        },
    }
}

pub fn auto_scaling_group(args: &ResolvedArguments) -> AutoScalingGroup {
    AutoScalingGroup {
        bounds: scaling_bounds(args),
        placement: network_placement(args),
        tags: vec![Tag {
            key: "application".to_string(),
            value: "semaphore-agent".to_string(),
            propagate_at_launch: true,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{args, args_with};

    #[test]
    fn default_bounds() {
        assert_eq!(
            scaling_bounds(&args()),
            ScalingBounds { min: 0, max: 1, desired: 1 }
        );
    }

    #[test]
    fn bounds_pass_through() {
        let args = args_with(&[
            ("SEMAPHORE_AGENT_ASG_MIN_SIZE", "1"),
            ("SEMAPHORE_AGENT_ASG_MAX_SIZE", "5"),
            ("SEMAPHORE_AGENT_ASG_DESIRED", "3"),
        ]);
        assert_eq!(scaling_bounds(&args), ScalingBounds { min: 1, max: 5, desired: 3 });
    }

    #[test]
    fn default_network_defers_zones() {
        let placement = network_placement(&args());
        assert!(!placement.is_custom());

        let json = serde_json::to_value(&placement).unwrap();
        assert_eq!(json["kind"], "default");
        assert!(json.get("subnet_ids").is_none());
        assert_eq!(json["availability_zones"], "from_environment");
    }

    #[test]
    fn custom_network_uses_subnets_verbatim() {
        let placement = network_placement(&args_with(&[
            ("SEMAPHORE_AGENT_VPC_ID", "vpc-000000000-custom"),
            ("SEMAPHORE_AGENT_SUBNETS", "subnet-00001,subnet-00002,subnet-00003"),
        ]));
        assert_eq!(
            placement,
            NetworkPlacement::Custom {
                vpc_id: "vpc-000000000-custom".into(),
                subnet_ids: vec!["subnet-00001".into(), "subnet-00002".into(), "subnet-00003".into()],
            }
        );

        let json = serde_json::to_value(&placement).unwrap();
        assert!(json.get("availability_zones").is_none());
    }

    #[test]
    fn group_is_tagged() {
        let group = auto_scaling_group(&args());
        assert_eq!(group.tags.len(), 1);
        assert_eq!(group.tags[0].value, "semaphore-agent");
        assert!(group.tags[0].propagate_at_launch);
    }
}
