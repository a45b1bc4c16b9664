use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Decide whether destinations may bypass the proxy because they resolve into trusted subnets"
)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Trusted IPv4 subnets in CIDR notation
    #[arg(long = "ipv4", value_delimiter = ',', value_name = "CIDR")]
    pub ipv4: Vec<String>,

    /// Trusted IPv6 subnets in CIDR notation
    #[arg(long = "ipv6", value_delimiter = ',', value_name = "CIDR")]
    pub ipv6: Vec<String>,

    /// File with one trusted IPv4 subnet per line
    #[arg(long = "ipv4-file", value_name = "PATH")]
    pub ipv4_file: Option<PathBuf>,

    /// File with one trusted IPv6 subnet per line
    #[arg(long = "ipv6-file", value_name = "PATH")]
    pub ipv6_file: Option<PathBuf>,

    /// Give up on a name lookup after this many milliseconds
    #[arg(long = "timeout-ms", value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,

    /// Destinations to classify, as host:port or bare host
    #[arg(required = true)]
    pub destinations: Vec<String>,
}
