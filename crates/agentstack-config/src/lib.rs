//! agentstack-config — configuration resolution for a CI agent fleet.
//!
//! Turns a flat set of `SEMAPHORE_*` keys into an immutable
//! [`ResolvedArguments`]. Resolution is all-or-nothing: every validation
//! failure surfaces as a [`ConfigError`] before any value is handed out.
//!
//! # Pipeline
//!
//! ```text
//! ConfigSource::detect()   file (SEMAPHORE_AGENT_STACK_CONFIG) or process env
//!        │ load()
//!        ▼
//! ConfigurationSet          raw key → string
//!        │ ResolvedArguments::from_set()
//!        ▼
//! ResolvedArguments         required keys checked, defaults applied, typed
//! ```

pub mod arguments;
pub mod error;
pub mod schema;
pub mod source;

pub use arguments::{OsFamily, ResolvedArguments};
pub use error::{ConfigError, ConfigResult};
pub use schema::{KeySpec, Requirement, SCHEMA};
pub use source::{ConfigSource, ConfigurationSet, STACK_CONFIG_VAR};

/// Resolve arguments from `source` in a single pass.
pub fn resolve(source: &ConfigSource) -> ConfigResult<ResolvedArguments> {
    let set = source.load()?;
    ResolvedArguments::from_set(&set)
}

/// Resolve arguments from whichever source the process environment selects.
pub fn resolve_from_env() -> ConfigResult<ResolvedArguments> {
    resolve(&ConfigSource::detect())
}
