//! The two helper functions deployed next to the fleet.
//!
//! Their bodies live elsewhere; this module only describes how they are
//! deployed, triggered, and what they may do.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use agentstack_config::ResolvedArguments;
use agentstack_config::schema::{STACK_NAME, TOKEN_PARAMETER_NAME};

use crate::iam::{self, PolicyDocument};

pub const FUNCTION_RUNTIME: &str = "nodejs14.x";
pub const FUNCTION_HANDLER: &str = "app.handler";
pub const SCALER_TIMEOUT_SECS: u32 = 60;
pub const SCALER_SCHEDULE: &str = "rate(1 minute)";

/// Fires the suspender once, when the stack is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTrigger {
    CustomResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspenderFunction {
    pub description: String,
    pub runtime: &'static str,
    pub handler: &'static str,
    pub trigger: DeployTrigger,
    pub policy: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRule {
    pub description: String,
    pub expression: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalerFunction {
    pub description: String,
    pub runtime: &'static str,
    pub handler: &'static str,
    pub timeout_secs: u32,
    pub environment: BTreeMap<String, String>,
    pub schedule: ScheduleRule,
    pub policy: PolicyDocument,
}

pub fn suspender_function(args: &ResolvedArguments) -> SuspenderFunction {
    SuspenderFunction {
        description: "Suspend AZRebalance process for auto scaling group".to_string(),
        runtime: FUNCTION_RUNTIME,
        handler: FUNCTION_HANDLER,
        trigger: DeployTrigger::CustomResource,
        policy: iam::suspender_policy(args),
    }
}

/// The scheduled scaler, or `None` when dynamic scaling is off.
pub fn scaler_function(args: &ResolvedArguments) -> Option<ScalerFunction> {
    let Some(policy) = iam::scaler_policy(args) else {
        debug!("dynamic scaling disabled, omitting scaler function");
        return None;
    };

    let environment = BTreeMap::from([
        (TOKEN_PARAMETER_NAME.to_string(), args.token_parameter_name.clone()),
        (STACK_NAME.to_string(), args.stack_name.clone()),
    ]);

    Some(ScalerFunction {
        description: "Dynamically scale Semaphore agents based on jobs demand".to_string(),
        runtime: FUNCTION_RUNTIME,
        handler: FUNCTION_HANDLER,
        timeout_secs: SCALER_TIMEOUT_SECS,
        environment,
        schedule: ScheduleRule {
            description: "Rule to dynamically invoke lambda function to scale Semaphore agent asg"
                .to_string(),
            expression: SCALER_SCHEDULE,
            enabled: true,
        },
        policy,
    })
}
