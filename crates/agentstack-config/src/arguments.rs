//! Resolved, typed arguments and the values derived from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{self, Requirement, SCHEMA};
use crate::source::ConfigurationSet;

/// Domain the organization name is joined with when no explicit endpoint is set.
pub const ENDPOINT_DOMAIN_SUFFIX: &str = "semaphoreci.com";

/// OS family of the agent hosts, e.g. `ubuntu-focal` or `windows`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OsFamily(String);

impl OsFamily {
    /// Hosts of this family are reached through Systems Manager, never SSH.
    pub const RESTRICTED: &'static str = "windows";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_restricted(&self) -> bool {
        self.0 == Self::RESTRICTED
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments after validation and defaulting.
///
/// Every required key is present and non-empty; every optional key is
/// either supplied or defaulted. Optional keys whose default is empty are
/// `None` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct ResolvedArguments {
    pub stack_name: String,
    pub token_parameter_name: String,
    pub endpoint: Option<String>,
    pub organization: Option<String>,
    pub instance_type: String,
    pub asg_min_size: u32,
    pub asg_max_size: u32,
    pub asg_desired: u32,
    pub disconnect_after_job: bool,
    pub disconnect_after_idle_timeout: u32,
    pub os: OsFamily,
    pub security_group_id: Option<String>,
    pub key_name: Option<String>,
    pub cache_bucket_name: Option<String>,
    pub token_kms_key: Option<String>,
    pub vpc_id: Option<String>,
    pub subnets: Vec<String>,
    pub use_dynamic_scaling: bool,
    pub ami: Option<String>,
}

impl ResolvedArguments {
    /// Apply the schema to `set`.
    ///
    /// Required keys are checked first, then defaults are filled in, then
    /// the cross-field rules run. The first failure is returned.
    pub fn from_set(set: &ConfigurationSet) -> ConfigResult<Self> {
        let mut populated: BTreeMap<&'static str, String> = BTreeMap::new();

        for spec in SCHEMA.iter().filter(|s| s.is_required()) {
            let value = set
                .get(spec.key)
                .ok_or_else(|| ConfigError::MissingRequiredKey(spec.key.to_string()))?;
            populated.insert(spec.key, value.to_string());
        }

        for spec in SCHEMA {
            let Requirement::Optional(default) = spec.requirement else {
                continue;
            };
            let value = match set.get(spec.key) {
                Some(v) => v.to_string(),
                None => {
                    if !default.is_empty() {
                        debug!(key = spec.key, default, "using default");
                    }
                    default.to_string()
                }
            };
            populated.insert(spec.key, value);
        }

        let args = Populated(populated).into_arguments()?;
        args.validate()?;
        Ok(args)
    }

    fn validate(&self) -> ConfigResult<()> {
        match (&self.endpoint, &self.organization) {
            (None, None) => return Err(ConfigError::ContradictoryEndpointConfig),
            (Some(endpoint), Some(organization)) => {
                warn!(
                    endpoint = %endpoint,
                    organization = %organization,
                    "both endpoint and organization are set, using endpoint"
                );
            }
            _ => {}
        }

        if self.vpc_id.is_some() && self.subnets.is_empty() {
            return Err(ConfigError::MissingSubnetsForNetwork);
        }

        Ok(())
    }

    /// The explicit endpoint, or `<organization>.semaphoreci.com`.
    pub fn effective_endpoint(&self) -> String {
        match (&self.endpoint, &self.organization) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(organization)) => format!("{organization}.{ENDPOINT_DOMAIN_SUFFIX}"),
            // validate() rejects this combination.
            (None, None) => String::new(),
        }
    }

    pub fn is_restricted_os_family(&self) -> bool {
        self.os.is_restricted()
    }

    /// SSH ingress needs a key pair and an OS that is not managed out of band.
    pub fn allows_remote_shell_ingress(&self) -> bool {
        self.key_name.is_some() && !self.is_restricted_os_family()
    }

    /// Name of the SSM parameter holding the agent configuration.
    pub fn config_parameter_name(&self) -> String {
        format!("{}-config", self.stack_name)
    }
}

/// String values for every schema key, prior to typing.
struct Populated(BTreeMap<&'static str, String>);

impl Populated {
    fn string(&self, key: &'static str) -> String {
        self.0.get(key).cloned().unwrap_or_default()
    }

    fn optional(&self, key: &'static str) -> Option<String> {
        self.0.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn number(&self, key: &'static str) -> ConfigResult<u32> {
        let raw = self.string(key);
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, raw, "expected a non-negative integer"))
    }

    fn flag(&self, key: &'static str) -> ConfigResult<bool> {
        let raw = self.string(key);
        let trimmed = raw.trim();
        let parsed = if trimmed.eq_ignore_ascii_case("true") {
            Some(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        };
        parsed.ok_or_else(|| ConfigError::invalid(key, raw, "expected true or false"))
    }

    fn list(&self, key: &'static str) -> Vec<String> {
        self.string(key)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn into_arguments(self) -> ConfigResult<ResolvedArguments> {
        Ok(ResolvedArguments {
            stack_name: self.string(schema::STACK_NAME),
            token_parameter_name: self.string(schema::TOKEN_PARAMETER_NAME),
            endpoint: self.optional(schema::ENDPOINT),
            organization: self.optional(schema::ORGANIZATION),
            instance_type: self.string(schema::INSTANCE_TYPE),
            asg_min_size: self.number(schema::ASG_MIN_SIZE)?,
            asg_max_size: self.number(schema::ASG_MAX_SIZE)?,
            asg_desired: self.number(schema::ASG_DESIRED)?,
            disconnect_after_job: self.flag(schema::DISCONNECT_AFTER_JOB)?,
            disconnect_after_idle_timeout: self.number(schema::DISCONNECT_AFTER_IDLE_TIMEOUT)?,
            os: OsFamily::new(self.string(schema::OS)),
            security_group_id: self.optional(schema::SECURITY_GROUP_ID),
            key_name: self.optional(schema::KEY_NAME),
            cache_bucket_name: self.optional(schema::CACHE_BUCKET_NAME),
            token_kms_key: self.optional(schema::TOKEN_KMS_KEY),
            vpc_id: self.optional(schema::VPC_ID),
            subnets: self.list(schema::SUBNETS),
            use_dynamic_scaling: self.flag(schema::USE_DYNAMIC_SCALING)?,
            ami: self.optional(schema::AMI),
        })
    }
}
