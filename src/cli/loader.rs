use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ShortcutError;
use crate::net::read_lines;
use crate::policy::SubnetPolicy;

use super::args::Args;
use super::config::ConfigFile;

/// Load and merge subnet policy from command line arguments and config file
pub struct PolicyLoader;

impl PolicyLoader {
    /// Load complete policy from CLI arguments
    ///
    /// Entries from the config file come first, followed by command line
    /// entries. A command line timeout overrides the config file's.
    pub fn load(args: &Args) -> Result<SubnetPolicy, ShortcutError> {
        let mut policy = SubnetPolicy::new();

        if let Some(config_path) = args.config.as_ref() {
            let config = ConfigFile::load(config_path)?;
            policy.merge(config.to_policy()?);
        }

        let mut cli_policy = SubnetPolicy::from_entries(&args.ipv4, &args.ipv6);
        if let Some(path) = args.ipv4_file.as_ref() {
            cli_policy.add_ipv4(read_subnet_file(path)?);
        }
        if let Some(path) = args.ipv6_file.as_ref() {
            cli_policy.add_ipv6(read_subnet_file(path)?);
        }
        cli_policy.lookup_timeout = args.timeout_ms.map(Duration::from_millis);
        policy.merge(cli_policy);

        Ok(policy)
    }
}

/// Read a subnet list file, one entry per line
pub(crate) fn read_subnet_file(path: &Path) -> Result<Vec<String>, ShortcutError> {
    let to_error = |source| ShortcutError::ReadSubnets {
        path: PathBuf::from(path),
        source,
    };
    let file = File::open(path).map_err(to_error)?;
    read_lines(BufReader::new(file)).map_err(to_error)
}
