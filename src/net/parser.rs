use std::io::BufRead;

/// Split a `host:port` destination into its host and port parts
///
/// The last colon separates the port. A bracketed host (`[::1]:443`) must be
/// followed directly by `:port` and is returned without brackets; an
/// unbracketed host may not contain a colon itself. The port is not
/// interpreted, so service names such as `https` are accepted.
///
/// Returns `None` when the input is not in `host:port` form.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    let (host_part, port) = addr.rsplit_once(':')?;

    let host = if let Some(rest) = host_part.strip_prefix('[') {
        let host = rest.strip_suffix(']')?;
        if host.contains(['[', ']']) {
            return None;
        }
        host
    } else {
        if host_part.contains([':', '[', ']']) {
            return None;
        }
        host_part
    };

    if port.contains(['[', ']']) {
        return None;
    }

    Some((host, port))
}

/// Extract the host to resolve from a destination
///
/// Destinations without a port are used verbatim.
///
/// # Examples
/// ```
/// use shortcut::net::destination_host;
///
/// assert_eq!(destination_host("example.com:443"), "example.com");
/// assert_eq!(destination_host("[2001:db8::1]:443"), "2001:db8::1");
/// assert_eq!(destination_host("2001:db8::1"), "2001:db8::1");
/// assert_eq!(destination_host("example.com"), "example.com");
/// ```
pub fn destination_host(addr: &str) -> &str {
    split_host_port(addr).map_or(addr, |(host, _port)| host)
}

/// Read one subnet entry per line
///
/// Lines are trimmed and blank lines are skipped. Entries are not validated
/// here; malformed ones are dropped when the index is built.
pub fn read_lines<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}
