use std::time::Duration;

/// Trusted subnets and lookup settings gathered from all configuration sources
///
/// Entries are kept as raw strings; validation happens when the
/// [`RangeIndex`](crate::net::RangeIndex) is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubnetPolicy {
    /// IPv4 CIDR entries
    pub ipv4: Vec<String>,
    /// IPv6 CIDR entries
    pub ipv6: Vec<String>,
    /// Upper bound on a single name lookup
    pub lookup_timeout: Option<Duration>,
}

impl SubnetPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build policy from input entries
    pub fn from_entries(ipv4: &[String], ipv6: &[String]) -> Self {
        let mut policy = Self::new();
        policy.add_ipv4(ipv4.iter().cloned());
        policy.add_ipv6(ipv6.iter().cloned());
        policy
    }

    /// Add IPv4 entries (duplicates are skipped)
    pub fn add_ipv4(&mut self, entries: impl IntoIterator<Item = String>) {
        add_unique(&mut self.ipv4, entries);
    }

    /// Add IPv6 entries (duplicates are skipped)
    pub fn add_ipv6(&mut self, entries: impl IntoIterator<Item = String>) {
        add_unique(&mut self.ipv6, entries);
    }

    /// Merge another policy; its lookup timeout wins when set
    pub fn merge(&mut self, other: Self) {
        self.add_ipv4(other.ipv4);
        self.add_ipv6(other.ipv6);
        if other.lookup_timeout.is_some() {
            self.lookup_timeout = other.lookup_timeout;
        }
    }

    /// Check if no subnets are configured
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }
}

fn add_unique(list: &mut Vec<String>, entries: impl IntoIterator<Item = String>) {
    for entry in entries {
        let entry = entry.trim();
        if !entry.is_empty() && !list.iter().any(|existing| existing == entry) {
            list.push(entry.to_string());
        }
    }
}
