//! SSM parameter carrying the agent's runtime configuration.

use serde::Serialize;
use tracing::debug;

use agentstack_config::ResolvedArguments;

pub const CACHE_BACKEND_VAR: &str = "SEMAPHORE_CACHE_BACKEND";
pub const CACHE_BUCKET_VAR: &str = "SEMAPHORE_CACHE_S3_BUCKET";
pub const CACHE_BACKEND_S3: &str = "s3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterTier {
    Standard,
}

/// The parameter itself: name, metadata, and the JSON payload it stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SsmParameter {
    pub name: String,
    pub description: String,
    pub tier: ParameterTier,
    pub value: SsmPayload,
}

/// What the agent reads on boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SsmPayload {
    pub endpoint: String,
    pub agent_token_parameter_name: String,
    pub disconnect_after_job: String,
    pub disconnect_after_idle_timeout: String,
    pub env_vars: Vec<String>,
}

impl SsmPayload {
    /// Compact JSON, as stored in the parameter value.
    pub fn to_value_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub fn ssm_payload(args: &ResolvedArguments) -> SsmPayload {
    SsmPayload {
        endpoint: args.effective_endpoint(),
        agent_token_parameter_name: args.token_parameter_name.clone(),
        disconnect_after_job: args.disconnect_after_job.to_string(),
        disconnect_after_idle_timeout: args.disconnect_after_idle_timeout.to_string(),
        env_vars: cache_env_vars(args),
    }
}

pub fn ssm_parameter(args: &ResolvedArguments) -> SsmParameter {
    SsmParameter {
        name: args.config_parameter_name(),
        description: "Parameters required by the semaphore agent".to_string(),
        tier: ParameterTier::Standard,
        value: ssm_payload(args),
    }
}

/// Backend selector first, bucket second.
fn cache_env_vars(args: &ResolvedArguments) -> Vec<String> {
    match &args.cache_bucket_name {
        Some(bucket) => {
            debug!(bucket = %bucket, "configuring s3 cache backend");
            vec![
                format!("{CACHE_BACKEND_VAR}={CACHE_BACKEND_S3}"),
                format!("{CACHE_BUCKET_VAR}={bucket}"),
            ]
        }
        None => Vec::new(),
    }
}
