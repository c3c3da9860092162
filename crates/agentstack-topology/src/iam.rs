//! IAM statement sets for the instance profile and the two functions.
//!
//! Each set is built independently; optional statements are appended in a
//! fixed order so identical input always yields identical documents.

use serde::Serialize;
use tracing::debug;

use agentstack_config::ResolvedArguments;

use crate::ACCOUNT_ID_TOKEN;

pub const LOG_GROUP_PREFIX: &str = "/semaphore/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub effect: Effect,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    pub fn allow<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            effect: Effect::Allow,
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }
}

/// Service allowed to assume the role the policy is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServicePrincipal {
    #[serde(rename = "ec2.amazonaws.com")]
    Ec2,
    #[serde(rename = "lambda.amazonaws.com")]
    Lambda,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    pub name: String,
    pub assumed_by: ServicePrincipal,
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn find(&self, action: &str) -> Option<&PolicyStatement> {
        self.statements.iter().find(|s| s.has_action(action))
    }
}

/// ARN pattern matching the fleet's auto scaling group.
pub fn auto_scaling_group_arn(stack_name: &str) -> String {
    format!(
        "arn:aws:autoscaling:*:{ACCOUNT_ID_TOKEN}:autoScalingGroup:*:autoScalingGroupName/{stack_name}-autoScalingGroup-*"
    )
}

pub fn parameter_arn(name: &str) -> String {
    format!("arn:aws:ssm:*:*:parameter/{name}")
}

fn kms_key_arn(key_id: &str) -> String {
    format!("arn:aws:kms:*:*:key/{key_id}")
}

fn decrypt_statement(args: &ResolvedArguments) -> Option<PolicyStatement> {
    args.token_kms_key.as_ref().map(|key| {
        debug!(key = %key, "granting kms:Decrypt");
        PolicyStatement::allow(["kms:Decrypt"], [kms_key_arn(key)])
    })
}

fn cache_bucket_statement(bucket: &str) -> PolicyStatement {
    PolicyStatement::allow(
        ["s3:PutObject", "s3:GetObject", "s3:ListBucket", "s3:DeleteObject"],
        [format!("arn:aws:s3:::{bucket}/*"), format!("arn:aws:s3:::{bucket}")],
    )
}

/// Permissions attached to every agent host.
pub fn instance_profile_policy(args: &ResolvedArguments) -> PolicyDocument {
    let asg = auto_scaling_group_arn(&args.stack_name);
    let mut statements = vec![
        PolicyStatement::allow(
            [
                "autoscaling:SetInstanceHealth",
                "autoscaling:TerminateInstanceInAutoScalingGroup",
            ],
            [asg],
        ),
        PolicyStatement::allow(
            ["ssm:GetParameter"],
            [
                parameter_arn(&args.config_parameter_name()),
                parameter_arn(&args.token_parameter_name),
            ],
        ),
    ];

    statements.extend(decrypt_statement(args));

    statements.push(PolicyStatement::allow(
        ["logs:CreateLogGroup", "logs:PutRetentionPolicy", "logs:DeleteLogGroup"],
        [format!("arn:aws:logs:*:*:log-group:{LOG_GROUP_PREFIX}*")],
    ));

    if let Some(bucket) = &args.cache_bucket_name {
        statements.push(cache_bucket_statement(bucket));
    }

    PolicyDocument {
        name: format!("{}-instance-profile-policy", args.stack_name),
        assumed_by: ServicePrincipal::Ec2,
        statements,
    }
}

/// Permissions for the function that suspends AZ rebalancing.
pub fn suspender_policy(args: &ResolvedArguments) -> PolicyDocument {
    PolicyDocument {
        name: format!("{}-az-rebalance-suspender-policy", args.stack_name),
        assumed_by: ServicePrincipal::Lambda,
        statements: vec![PolicyStatement::allow(
            ["autoscaling:SuspendProcesses"],
            [auto_scaling_group_arn(&args.stack_name)],
        )],
    }
}

/// Permissions for the scheduled scaler, if dynamic scaling is on.
pub fn scaler_policy(args: &ResolvedArguments) -> Option<PolicyDocument> {
    if !args.use_dynamic_scaling {
        return None;
    }

    let mut statements = vec![
        PolicyStatement::allow(["autoscaling:DescribeAutoScalingGroups"], ["*"]),
        PolicyStatement::allow(
            ["autoscaling:SetDesiredCapacity"],
            [auto_scaling_group_arn(&args.stack_name)],
        ),
        PolicyStatement::allow(
            ["ssm:GetParameter"],
            [parameter_arn(&args.token_parameter_name)],
        ),
    ];
    statements.extend(decrypt_statement(args));

    Some(PolicyDocument {
        name: format!("{}-scaler-lambda-policy", args.stack_name),
        assumed_by: ServicePrincipal::Lambda,
        statements,
    })
}
