//! Machine image selection.
//!
//! Pre-built agent images are named
//! `semaphore-agent-v<version>-<os>-x86_64-<hash>`; the provisioning
//! backend resolves that name to an image id in the deploying account.
//! An explicit AMI bypasses the lookup.

use serde::Serialize;
use sha2::{Digest, Sha256};

use agentstack_config::{OsFamily, ResolvedArguments};

pub const IMAGE_NAME_PREFIX: &str = "semaphore-agent";
pub const ARCHITECTURE: &str = "x86_64";
const OS_HASH_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSelector {
    /// Use this image id as-is.
    Explicit { image_id: String },
    /// Resolve by name at provisioning time.
    Lookup {
        name: String,
        filters: LookupFilters,
    },
}

impl ImageSelector {
    pub fn is_lookup(&self) -> bool {
        matches!(self, ImageSelector::Lookup { .. })
    }
}

/// Fixed lookup constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFilters {
    pub image_type: &'static str,
    pub state: &'static str,
    /// Owner account; resolved by the provisioning backend.
    pub owner: &'static str,
}

impl Default for LookupFilters {
    fn default() -> Self {
        Self {
            image_type: "machine",
            state: "available",
            owner: crate::ACCOUNT_ID_TOKEN,
        }
    }
}

/// First 16 hex chars of SHA-256 over the OS family identifier.
pub fn os_hash(os: &OsFamily) -> String {
    let digest = Sha256::digest(os.as_str().as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(OS_HASH_LEN);
    encoded
}

/// Deterministic lookup name for a product version and OS family.
pub fn image_name(version: &str, os: &OsFamily) -> String {
    format!(
        "{IMAGE_NAME_PREFIX}-v{version}-{os}-{ARCHITECTURE}-{}",
        os_hash(os)
    )
}

pub fn image_selector(args: &ResolvedArguments) -> ImageSelector {
    match &args.ami {
        Some(image_id) => ImageSelector::Explicit {
            image_id: image_id.clone(),
        },
        None => ImageSelector::Lookup {
            name: image_name(crate::PRODUCT_VERSION, &args.os),
            filters: LookupFilters::default(),
        },
    }
}
