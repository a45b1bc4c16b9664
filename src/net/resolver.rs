use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::{Resolver, TokioResolver};

#[cfg(test)]
use mockall::automock;

use crate::error::ShortcutError;

/// Name resolution capability used to classify destinations
///
/// Implementations must be safe to share between concurrent callers.
/// Dropping the returned future must abandon the lookup.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NameResolver: Send + Sync + 'static {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ShortcutError>;
}

/// Production resolver built from the system DNS configuration
///
/// Reads `/etc/resolv.conf` and the hosts file once at construction. The
/// underlying resolver keeps its own answer cache, so one instance should be
/// shared across every decision made by a process.
pub struct SystemResolver {
    inner: TokioResolver,
}

impl SystemResolver {
    /// Create a resolver from the system configuration
    ///
    /// # Examples
    /// ```no_run
    /// use shortcut::net::{NameResolver, SystemResolver};
    ///
    /// # async fn example() {
    /// let resolver = SystemResolver::new().unwrap();
    /// let addrs = resolver.lookup_ip("localhost").await.unwrap();
    /// # }
    /// ```
    pub fn new() -> Result<Self, ShortcutError> {
        let inner = Resolver::builder_tokio()
            .map_err(|source| ShortcutError::DnsResolverInit { source })?
            .build();
        Ok(Self { inner })
    }

    pub fn from_resolver(inner: TokioResolver) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ShortcutError> {
        let response =
            self.inner
                .lookup_ip(host)
                .await
                .map_err(|source| ShortcutError::DnsLookup {
                    host: host.to_string(),
                    source,
                })?;
        Ok(response.iter().collect())
    }
}
