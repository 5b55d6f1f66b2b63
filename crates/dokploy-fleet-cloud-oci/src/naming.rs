//! Resource naming
//!
//! Every display name and DNS label in one plan carries the same short
//! [`ResourceCode`] so repeated deployments in one compartment do not collide.
//! The code is cosmetic; it is not meant to be unguessable.

use crate::error::{OciError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const RESOURCE_CODE_LEN: usize = 6;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Six lowercase alphanumeric characters shared by one plan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceCode(String);

impl ResourceCode {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..RESOURCE_CODE_LEN)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn parse(s: &str) -> Result<Self> {
        let valid = s.len() == RESOURCE_CODE_LEN
            && s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        if !valid {
            return Err(OciError::InvalidResourceCode(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn network_name(&self) -> String {
        format!("network-dokploy-{}", self.0)
    }

    pub fn vcn_dns_label(&self) -> String {
        format!("vcn{}", self.0)
    }

    pub fn subnet_name(&self) -> String {
        format!("subnet-dokploy-{}", self.0)
    }

    pub fn subnet_dns_label(&self) -> String {
        format!("subnet{}", self.0)
    }

    pub fn main_node_name(&self) -> String {
        format!("dokploy-main-{}", self.0)
    }

    /// Display name of worker `index` (1-based)
    pub fn worker_node_name(&self, index: u32) -> String {
        format!("dokploy-worker-{}-{}", index, self.0)
    }
}

impl fmt::Display for ResourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceCode {
    type Err = OciError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceCode {
    type Error = OciError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResourceCode> for String {
    fn from(code: ResourceCode) -> Self {
        code.0
    }
}
