use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

/// Address family an index is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Numeric value of `ip` as an unsigned big-endian integer, or `None`
    /// when `ip` belongs to the other family
    fn key(self, ip: IpAddr) -> Option<u128> {
        match (self, ip) {
            (AddressFamily::V4, IpAddr::V4(v4)) => Some(u128::from(u32::from(v4))),
            (AddressFamily::V6, IpAddr::V6(v6)) => Some(u128::from(v6)),
            _ => None,
        }
    }

    fn parse(self, entry: &str) -> Option<IpNet> {
        match self {
            AddressFamily::V4 => entry.parse::<Ipv4Net>().ok().map(|net| net.trunc().into()),
            AddressFamily::V6 => entry.parse::<Ipv6Net>().ok().map(|net| net.trunc().into()),
        }
    }
}

/// Inclusive run of addresses covered by one or more overlapping blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    first: u128,
    last: u128,
}

/// Immutable membership index over the CIDR blocks of one address family
///
/// Blocks are stored masked to their prefix and sorted by base address.
/// Overlapping and adjacent blocks are additionally folded into disjoint
/// spans, so a query is a single binary search no matter how the blocks
/// nest. The answer is always the same as checking every block in turn.
///
/// # Examples
/// ```
/// use shortcut::net::RangeIndex;
///
/// let index = RangeIndex::ipv4(["10.0.0.0/8", "not-a-cidr", "192.168.0.0/16"]);
/// assert_eq!(index.len(), 2);
/// assert!(index.contains("10.1.2.3".parse::<std::net::IpAddr>().unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct RangeIndex {
    family: AddressFamily,
    blocks: Vec<IpNet>,
    spans: Vec<Span>,
}

impl RangeIndex {
    /// Build an index from CIDR entries of the given family
    ///
    /// Entries that fail to parse, or that belong to the other family, are
    /// dropped. An index with no valid entries is legal and contains nothing.
    pub fn build<I, S>(family: AddressFamily, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut blocks = Vec::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            match family.parse(entry) {
                Some(net) => blocks.push(net),
                None => log::debug!("Dropping invalid {:?} subnet entry '{}'", family, entry),
            }
        }

        // `sort_by_key` is stable, so equal bases keep their input order
        blocks.sort_by_key(|net| family.key(net.network()));
        let spans = coalesce(family, &blocks);

        Self {
            family,
            blocks,
            spans,
        }
    }

    pub fn ipv4<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(AddressFamily::V4, entries)
    }

    pub fn ipv6<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(AddressFamily::V6, entries)
    }

    /// Check whether `ip` lies inside any stored block
    ///
    /// Addresses of the other family are never contained.
    pub fn contains(&self, ip: impl Into<IpAddr>) -> bool {
        let Some(key) = self.family.key(ip.into()) else {
            return false;
        };
        let after = self.spans.partition_point(|span| span.first <= key);
        after
            .checked_sub(1)
            .is_some_and(|idx| key <= self.spans[idx].last)
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Stored blocks, masked and in ascending order of base address
    pub fn blocks(&self) -> &[IpNet] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Fold sorted blocks into disjoint, sorted spans
fn coalesce(family: AddressFamily, blocks: &[IpNet]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::with_capacity(blocks.len());
    for net in blocks {
        let (Some(first), Some(last)) = (family.key(net.network()), family.key(net.broadcast()))
        else {
            continue;
        };
        match spans.last_mut() {
            Some(prev) if first <= prev.last.saturating_add(1) => {
                prev.last = prev.last.max(last);
            }
            _ => spans.push(Span { first, last }),
        }
    }
    spans
}
