use std::{
    io::BufRead,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    sync::Arc,
    time::Duration,
};

use crate::{
    error::ShortcutError,
    net::{
        RangeIndex,
        parser::{destination_host, read_lines},
        resolver::{NameResolver, SystemResolver},
    },
};

/// Outcome of classifying one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    /// Whether the destination may be dialed directly instead of via the proxy
    pub allowed: bool,
    /// Address the decision was made on, for reuse by the dialer
    pub resolved: Option<IpAddr>,
}

impl Decision {
    /// Negative decision with no resolved address
    pub fn deny() -> Self {
        Self::default()
    }
}

/// Classifies destinations against trusted IPv4/IPv6 subnets
///
/// Built once at startup and shared read-only afterwards. The name resolver
/// is injected and may be shared with other components.
pub struct ShortcutResolver<R: NameResolver = SystemResolver> {
    v4: RangeIndex,
    v6: RangeIndex,
    resolver: Arc<R>,
    lookup_timeout: Option<Duration>,
}

impl ShortcutResolver<SystemResolver> {
    /// Create a resolver bound to the system DNS configuration
    pub fn system<I4, I6, S>(ipv4_subnets: I4, ipv6_subnets: I6) -> Result<Self, ShortcutError>
    where
        I4: IntoIterator<Item = S>,
        I6: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let resolver = SystemResolver::new()?;
        Ok(Self::new(ipv4_subnets, ipv6_subnets, Arc::new(resolver)))
    }
}

impl<R: NameResolver> ShortcutResolver<R> {
    pub fn new<I4, I6, S>(ipv4_subnets: I4, ipv6_subnets: I6, resolver: Arc<R>) -> Self
    where
        I4: IntoIterator<Item = S>,
        I6: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let v4 = RangeIndex::ipv4(ipv4_subnets);
        let v6 = RangeIndex::ipv6(ipv6_subnets);
        log::debug!(
            "Creating shortcut with {} ipv4 subnets and {} ipv6 subnets",
            v4.len(),
            v6.len()
        );
        Self {
            v4,
            v6,
            resolver,
            lookup_timeout: None,
        }
    }

    /// Create a resolver from two line-oriented subnet lists, one CIDR per line
    pub fn from_readers<V4: BufRead, V6: BufRead>(
        ipv4: V4,
        ipv6: V6,
        resolver: Arc<R>,
    ) -> Result<Self, ShortcutError> {
        Ok(Self::new(read_lines(ipv4)?, read_lines(ipv6)?, resolver))
    }

    /// Bound the time spent resolving a destination
    ///
    /// A lookup that exceeds the timeout is treated as a failed lookup.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    pub fn ipv4_index(&self) -> &RangeIndex {
        &self.v4
    }

    pub fn ipv6_index(&self) -> &RangeIndex {
        &self.v6
    }

    /// Decide whether `destination` may bypass the proxy
    ///
    /// `destination` is `host:port` or a bare host. The host is resolved and
    /// the first IPv4 address (IPv4-mapped IPv6 counts as IPv4) is checked
    /// against the IPv4 subnets; failing that, the first IPv6 address is
    /// checked against the IPv6 subnets. Only that one address governs the
    /// result even when the host has several.
    ///
    /// Resolution failures never surface as errors: they produce
    /// [`Decision::deny`]. Dropping the returned future cancels the lookup.
    pub async fn decide(&self, destination: &str) -> Decision {
        let host = destination_host(destination);
        let addrs = match self.lookup(host).await {
            Ok(addrs) => addrs,
            Err(err) => {
                log::debug!("Shortcut disabled for {}: {}", destination, err);
                return Decision::deny();
            }
        };
        self.classify(&addrs)
    }

    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ShortcutError> {
        let Some(timeout) = self.lookup_timeout else {
            return self.resolver.lookup_ip(host).await;
        };
        tokio::time::timeout(timeout, self.resolver.lookup_ip(host))
            .await
            .map_err(|_| ShortcutError::LookupTimeout {
                host: host.to_string(),
                timeout,
            })?
    }

    fn classify(&self, addrs: &[IpAddr]) -> Decision {
        if let Some(v4) = addrs.iter().find_map(|addr| as_ipv4(*addr)) {
            return Decision {
                allowed: self.v4.contains(v4),
                resolved: Some(IpAddr::V4(v4)),
            };
        }
        if let Some(v6) = addrs.iter().find_map(|addr| as_ipv6(*addr)) {
            return Decision {
                allowed: self.v6.contains(v6),
                resolved: Some(IpAddr::V6(v6)),
            };
        }
        Decision::deny()
    }
}

fn as_ipv4(addr: IpAddr) -> Option<Ipv4Addr> {
    match addr {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

fn as_ipv6(addr: IpAddr) -> Option<Ipv6Addr> {
    match addr {
        IpAddr::V4(_) => None,
        IpAddr::V6(v6) => Some(v6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::resolver::MockNameResolver;
    use async_trait::async_trait;
    use std::io::Cursor;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn answering(host: &'static str, addrs: Vec<IpAddr>) -> Arc<MockNameResolver> {
        let mut mock = MockNameResolver::new();
        mock.expect_lookup_ip()
            .withf(move |requested: &str| requested == host)
            .times(1)
            .returning(move |_| Ok(addrs.clone()));
        Arc::new(mock)
    }

    fn failing() -> Arc<MockNameResolver> {
        let mut mock = MockNameResolver::new();
        mock.expect_lookup_ip().returning(|host| {
            Err(ShortcutError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such host {host}"),
            )))
        });
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_ip_literal_inside_subnet() {
        let resolver = answering("93.184.216.34", vec![ip("93.184.216.34")]);
        let shortcut = ShortcutResolver::new(["93.184.216.0/24"], Vec::<&str>::new(), resolver);

        let decision = shortcut.decide("93.184.216.34:443").await;
        assert_eq!(
            decision,
            Decision {
                allowed: true,
                resolved: Some(ip("93.184.216.34")),
            }
        );
    }

    #[tokio::test]
    async fn test_address_outside_subnets_reports_resolved_ip() {
        let resolver = answering("example.com", vec![ip("8.8.8.8")]);
        let shortcut = ShortcutResolver::new(["10.0.0.0/8"], ["fc00::/7"], resolver);

        let decision = shortcut.decide("example.com:80").await;
        assert!(!decision.allowed);
        assert_eq!(decision.resolved, Some(ip("8.8.8.8")));
    }

    #[tokio::test]
    async fn test_resolution_failure_denies() {
        let shortcut = ShortcutResolver::new(["0.0.0.0/0"], ["::/0"], failing());

        let decision = shortcut.decide("nowhere.invalid:443").await;
        assert_eq!(decision, Decision::deny());
    }

    #[tokio::test]
    async fn test_empty_answer_denies() {
        let resolver = answering("empty.example", vec![]);
        let shortcut = ShortcutResolver::new(["0.0.0.0/0"], ["::/0"], resolver);

        assert_eq!(shortcut.decide("empty.example").await, Decision::deny());
    }

    #[tokio::test]
    async fn test_bare_host_without_port() {
        let resolver = answering("intranet", vec![ip("10.1.2.3")]);
        let shortcut = ShortcutResolver::new(["10.0.0.0/8"], Vec::<&str>::new(), resolver);

        let decision = shortcut.decide("intranet").await;
        assert!(decision.allowed);
        assert_eq!(decision.resolved, Some(ip("10.1.2.3")));
    }

    #[tokio::test]
    async fn test_bracketed_ipv6_destination() {
        let resolver = answering("fd00::5", vec![ip("fd00::5")]);
        let shortcut = ShortcutResolver::new(Vec::<&str>::new(), ["fc00::/7"], resolver);

        let decision = shortcut.decide("[fd00::5]:8443").await;
        assert!(decision.allowed);
        assert_eq!(decision.resolved, Some(ip("fd00::5")));
    }

    #[tokio::test]
    async fn test_ipv4_preferred_over_earlier_ipv6() {
        let resolver = answering("dual.example", vec![ip("2001:db8::1"), ip("192.168.1.10")]);
        let shortcut = ShortcutResolver::new(["192.168.0.0/16"], Vec::<&str>::new(), resolver);

        let decision = shortcut.decide("dual.example:443").await;
        assert!(decision.allowed);
        assert_eq!(decision.resolved, Some(ip("192.168.1.10")));
    }

    #[tokio::test]
    async fn test_ipv6_used_when_no_ipv4() {
        let resolver = answering("v6.example", vec![ip("2001:db8::1"), ip("fd00::1")]);
        let shortcut = ShortcutResolver::new(["0.0.0.0/0"], ["fc00::/7"], resolver);

        // Only the first IPv6 address counts, even though the second matches
        let decision = shortcut.decide("v6.example:443").await;
        assert!(!decision.allowed);
        assert_eq!(decision.resolved, Some(ip("2001:db8::1")));
    }

    #[tokio::test]
    async fn test_only_first_ipv4_address_governs() {
        let resolver = answering("mixed.example", vec![ip("8.8.8.8"), ip("10.0.0.1")]);
        let shortcut = ShortcutResolver::new(["10.0.0.0/8"], Vec::<&str>::new(), resolver);

        let decision = shortcut.decide("mixed.example:80").await;
        assert!(!decision.allowed);
        assert_eq!(decision.resolved, Some(ip("8.8.8.8")));
    }

    #[tokio::test]
    async fn test_ipv4_mapped_address_uses_ipv4_index() {
        let resolver = answering("mapped.example", vec![ip("::ffff:10.0.0.7")]);
        let shortcut = ShortcutResolver::new(["10.0.0.0/8"], Vec::<&str>::new(), resolver);

        let decision = shortcut.decide("mapped.example:80").await;
        assert!(decision.allowed);
        assert_eq!(decision.resolved, Some(ip("10.0.0.7")));
    }

    #[tokio::test]
    async fn test_from_readers() {
        let v4 = Cursor::new("127.0.0.1/32\n\nbogus\n");
        let v6 = Cursor::new("::1/128\n");
        let resolver = answering("localhost", vec![ip("::1"), ip("127.0.0.2")]);
        let shortcut = ShortcutResolver::from_readers(v4, v6, resolver).unwrap();

        assert_eq!(shortcut.ipv4_index().len(), 1);
        assert_eq!(shortcut.ipv6_index().len(), 1);

        let decision = shortcut.decide("localhost:22").await;
        assert!(!decision.allowed);
        assert_eq!(decision.resolved, Some(ip("127.0.0.2")));
    }

    struct SlowResolver;

    #[async_trait]
    impl NameResolver for SlowResolver {
        async fn lookup_ip(&self, _host: &str) -> Result<Vec<IpAddr>, ShortcutError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec!["10.0.0.1".parse().unwrap()])
        }
    }

    #[tokio::test]
    async fn test_lookup_timeout_denies() {
        let shortcut =
            ShortcutResolver::new(["10.0.0.0/8"], Vec::<&str>::new(), Arc::new(SlowResolver))
                .with_lookup_timeout(Duration::from_millis(20));

        assert_eq!(shortcut.decide("slow.example:80").await, Decision::deny());
    }

    #[tokio::test]
    async fn test_concurrent_decisions_share_one_resolver() {
        let mut mock = MockNameResolver::new();
        mock.expect_lookup_ip().times(8).returning(|host| {
            let addr = if host == "inside" { "10.0.0.1" } else { "8.8.4.4" };
            Ok(vec![addr.parse().unwrap()])
        });
        let shortcut = Arc::new(ShortcutResolver::new(
            ["10.0.0.0/8"],
            Vec::<&str>::new(),
            Arc::new(mock),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let shortcut = Arc::clone(&shortcut);
                let host = if i % 2 == 0 { "inside" } else { "outside" };
                tokio::spawn(async move { (host, shortcut.decide(host).await) })
            })
            .collect();

        for task in tasks {
            let (host, decision) = task.await.unwrap();
            assert_eq!(decision.allowed, host == "inside");
        }
    }
}
