//! Normalizing raw target entries into scheme/host/port form.
//!
//! Parsing is purely syntactic: no DNS lookups, no reachability checks.
//! Entries that cannot be resolved to a non-empty host are rejected and the
//! caller decides what to do with the rejection.

use url::Url;

use crate::config::{RawTarget, HTTPS_PORTS};

/// Upstream scheme. Anything that is not https is proxied as plain http.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One backend web UI to be proxied.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Display label, defaults to `host:port`.
    pub name: String,
    /// Verbatim user-supplied address, round-trips to the backup snapshot.
    pub raw: String,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl Target {
    /// Parse a raw entry. Returns `None` for entries with an empty address,
    /// an unparseable port, or an empty resolved host.
    pub fn parse(raw: &RawTarget) -> Option<Target> {
        let (name, address) = match raw {
            RawTarget::Entry { name, url } => (name.trim(), url.trim()),
            RawTarget::Bare(url) => ("", url.trim()),
        };

        if address.is_empty() {
            return None;
        }

        let (scheme, host, port) = if address.contains("://") {
            parse_with_scheme(address)?
        } else {
            parse_host_port(address)?
        };

        let host = host.trim().to_string();
        if host.is_empty() {
            return None;
        }

        let name = if name.is_empty() {
            format!("{}:{}", host, port)
        } else {
            name.to_string()
        };

        Some(Target {
            name,
            raw: address.to_string(),
            scheme,
            host,
            port,
        })
    }

    /// `scheme://host:port` form used for proxy_pass and the referer map.
    pub fn upstream(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// `host:port` form used for the forwarded Host header.
    pub fn host_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Address with an explicit scheme separator. The declared scheme wins over
/// any port-based inference.
fn parse_with_scheme(address: &str) -> Option<(Scheme, String, u16)> {
    let parsed = Url::parse(address).ok()?;
    let scheme = if parsed.scheme() == "https" {
        Scheme::Https
    } else {
        Scheme::Http
    };
    let host = parsed.host_str()?.to_string();
    let port = parsed.port().unwrap_or_else(|| scheme.default_port());
    Some((scheme, host, port))
}

/// Bare `host[:port][/path]` address. The scheme is inferred from the port.
fn parse_host_port(address: &str) -> Option<(Scheme, String, u16)> {
    let host_port = address.split('/').next().unwrap_or("");
    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port_str)) => (host.to_string(), port_str.parse::<u16>().ok()?),
        None => (host_port.to_string(), 80),
    };
    let scheme = if HTTPS_PORTS.contains(&port) {
        Scheme::Https
    } else {
        Scheme::Http
    };
    Some((scheme, host, port))
}
