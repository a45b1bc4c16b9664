use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{error::ShortcutError, policy::SubnetPolicy};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub subnets: SubnetsSection,
    #[serde(default)]
    pub resolver: ResolverSection,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SubnetsSection {
    /// Trusted IPv4 subnets in CIDR notation
    #[serde(default)]
    pub ipv4: Vec<String>,
    /// Trusted IPv6 subnets in CIDR notation
    #[serde(default)]
    pub ipv6: Vec<String>,
    /// File with one IPv4 subnet per line, relative to the config file
    #[serde(default)]
    pub ipv4_file: Option<PathBuf>,
    /// File with one IPv6 subnet per line, relative to the config file
    #[serde(default)]
    pub ipv6_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ResolverSection {
    /// Upper bound on a single name lookup in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ConfigFile {
    /// Load configuration file
    ///
    /// Relative list file paths are resolved against the directory holding
    /// the configuration file.
    pub fn load(path: &Path) -> Result<Self, ShortcutError> {
        let content = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|source| ShortcutError::ConfigParse {
                path: PathBuf::from(path),
                source,
            })?;

        if let Some(base) = path.parent() {
            for file in [&mut config.subnets.ipv4_file, &mut config.subnets.ipv6_file]
                .into_iter()
                .flatten()
            {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }

        Ok(config)
    }

    /// Build subnet policy from configuration file
    pub fn to_policy(&self) -> Result<SubnetPolicy, ShortcutError> {
        let mut policy = SubnetPolicy::from_entries(&self.subnets.ipv4, &self.subnets.ipv6);
        if let Some(path) = &self.subnets.ipv4_file {
            policy.add_ipv4(super::loader::read_subnet_file(path)?);
        }
        if let Some(path) = &self.subnets.ipv6_file {
            policy.add_ipv6(super::loader::read_subnet_file(path)?);
        }
        policy.lookup_timeout = self.resolver.timeout_ms.map(Duration::from_millis);
        Ok(policy)
    }
}
