//! Static configuration schema.
//!
//! The single source of truth for which keys exist, which are required,
//! and what an omitted optional key defaults to.

pub const STACK_NAME: &str = "SEMAPHORE_AGENT_STACK_NAME";
pub const TOKEN_PARAMETER_NAME: &str = "SEMAPHORE_AGENT_TOKEN_PARAMETER_NAME";
pub const ENDPOINT: &str = "SEMAPHORE_ENDPOINT";
pub const ORGANIZATION: &str = "SEMAPHORE_ORGANIZATION";
pub const INSTANCE_TYPE: &str = "SEMAPHORE_AGENT_INSTANCE_TYPE";
pub const ASG_MIN_SIZE: &str = "SEMAPHORE_AGENT_ASG_MIN_SIZE";
pub const ASG_MAX_SIZE: &str = "SEMAPHORE_AGENT_ASG_MAX_SIZE";
pub const ASG_DESIRED: &str = "SEMAPHORE_AGENT_ASG_DESIRED";
pub const DISCONNECT_AFTER_JOB: &str = "SEMAPHORE_AGENT_DISCONNECT_AFTER_JOB";
pub const DISCONNECT_AFTER_IDLE_TIMEOUT: &str = "SEMAPHORE_AGENT_DISCONNECT_AFTER_IDLE_TIMEOUT";
pub const OS: &str = "SEMAPHORE_AGENT_OS";
pub const SECURITY_GROUP_ID: &str = "SEMAPHORE_AGENT_SECURITY_GROUP_ID";
pub const KEY_NAME: &str = "SEMAPHORE_AGENT_KEY_NAME";
pub const CACHE_BUCKET_NAME: &str = "SEMAPHORE_AGENT_CACHE_BUCKET_NAME";
pub const TOKEN_KMS_KEY: &str = "SEMAPHORE_AGENT_TOKEN_KMS_KEY";
pub const VPC_ID: &str = "SEMAPHORE_AGENT_VPC_ID";
pub const SUBNETS: &str = "SEMAPHORE_AGENT_SUBNETS";
pub const USE_DYNAMIC_SCALING: &str = "SEMAPHORE_AGENT_USE_DYNAMIC_SCALING";
pub const AMI: &str = "SEMAPHORE_AGENT_AMI";

/// Whether a key must be supplied, or what to use when it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    /// Optional with a default. An empty default means "unset".
    Optional(&'static str),
}

/// One schema record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub key: &'static str,
    pub requirement: Requirement,
}

impl KeySpec {
    const fn required(key: &'static str) -> Self {
        Self { key, requirement: Requirement::Required }
    }

    const fn optional(key: &'static str, default: &'static str) -> Self {
        Self { key, requirement: Requirement::Optional(default) }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.requirement, Requirement::Required)
    }

    pub fn default_value(&self) -> Option<&'static str> {
        match self.requirement {
            Requirement::Required => None,
            Requirement::Optional(default) => Some(default),
        }
    }
}

/// Required keys come first so the first missing one is reported.
pub static SCHEMA: &[KeySpec] = &[
    KeySpec::required(STACK_NAME),
    KeySpec::required(TOKEN_PARAMETER_NAME),
    KeySpec::optional(ENDPOINT, ""),
    KeySpec::optional(ORGANIZATION, ""),
    KeySpec::optional(INSTANCE_TYPE, "t2.micro"),
    KeySpec::optional(ASG_MIN_SIZE, "0"),
    KeySpec::optional(ASG_MAX_SIZE, "1"),
    KeySpec::optional(ASG_DESIRED, "1"),
    KeySpec::optional(DISCONNECT_AFTER_JOB, "true"),
    KeySpec::optional(DISCONNECT_AFTER_IDLE_TIMEOUT, "300"),
    KeySpec::optional(OS, "ubuntu-focal"),
    KeySpec::optional(SECURITY_GROUP_ID, ""),
    KeySpec::optional(KEY_NAME, ""),
    KeySpec::optional(CACHE_BUCKET_NAME, ""),
    KeySpec::optional(TOKEN_KMS_KEY, ""),
    KeySpec::optional(VPC_ID, ""),
    KeySpec::optional(SUBNETS, ""),
    KeySpec::optional(USE_DYNAMIC_SCALING, "true"),
    KeySpec::optional(AMI, ""),
];

/// Look up a key's schema record.
pub fn spec_for(key: &str) -> Option<&'static KeySpec> {
    SCHEMA.iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = SCHEMA.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), SCHEMA.len());
    }

    #[test]
    fn required_keys_precede_optional_ones() {
        let first_optional = SCHEMA.iter().position(|s| !s.is_required()).unwrap();
        assert!(SCHEMA[first_optional..].iter().all(|s| !s.is_required()));
        assert_eq!(first_optional, 2);
    }

    #[test]
    fn documented_defaults() {
        assert_eq!(spec_for(INSTANCE_TYPE).unwrap().default_value(), Some("t2.micro"));
        assert_eq!(spec_for(OS).unwrap().default_value(), Some("ubuntu-focal"));
        assert_eq!(spec_for(DISCONNECT_AFTER_IDLE_TIMEOUT).unwrap().default_value(), Some("300"));
        assert_eq!(spec_for(STACK_NAME).unwrap().default_value(), None);
        assert!(spec_for("SEMAPHORE_UNKNOWN").is_none());
    }
}
