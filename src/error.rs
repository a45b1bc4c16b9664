use thiserror::Error;

use std::{path::PathBuf, time::Duration};

use hickory_resolver::ResolveError;

#[derive(Debug, Error)]
pub enum ShortcutError {
    #[error("failed to initialize DNS resolver: {source}")]
    DnsResolverInit {
        #[source]
        source: ResolveError,
    },

    #[error("failed to resolve host {host}: {source}")]
    DnsLookup {
        host: String,
        #[source]
        source: ResolveError,
    },

    #[error("resolving host {host} timed out after {timeout:?}")]
    LookupTimeout { host: String, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read subnet list {path}: {source}")]
    ReadSubnets {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
