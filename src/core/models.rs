use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder written into result filenames when vendor or product is unknown.
pub const MISSING_ATTRIBUTE: &str = "None";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reachability::Unknown => "unknown",
            Reachability::Online => "online",
            Reachability::Offline => "offline",
        };
        f.write_str(s)
    }
}

/// Output of the certificate-probing script for one port, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateMetadata {
    pub port: u16,
    pub raw: String,
}

impl CertificateMetadata {
    pub fn new(port: u16, raw: impl Into<String>) -> Self {
        Self { port, raw: raw.into() }
    }

    /// True when the script output names a certificate subject or issuer.
    pub fn looks_like_certificate(raw: &str) -> bool {
        raw.contains("Subject") || raw.contains("Issuer")
    }

    pub fn subject(&self) -> Option<&str> {
        self.field("Subject")
    }

    pub fn issuer(&self) -> Option<&str> {
        self.field("Issuer")
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.raw.lines().find_map(|line| {
            line.trim()
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(str::trim)
        })
    }
}

/// A host as supplied by the caller, before any scanning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInput {
    #[serde(alias = "address")]
    pub ip: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

impl HostInput {
    pub fn bare(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            vendor: None,
            product: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub address: String,
    #[serde(rename = "tls_status")]
    pub reachability: Reachability,
    pub open_ports: BTreeSet<u16>,
    pub tls_ports: BTreeSet<u16>,
    #[serde(rename = "ssl_cert", skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateMetadata>,
    pub vendor: Option<String>,
    pub product: Option<String>,
}

impl HostRecord {
    pub fn new(input: HostInput) -> Self {
        Self {
            address: input.ip,
            reachability: Reachability::Unknown,
            open_ports: BTreeSet::new(),
            tls_ports: BTreeSet::new(),
            certificate: None,
            vendor: input.vendor,
            product: input.product,
        }
    }

    pub fn record_open_port(&mut self, port: u16) {
        self.open_ports.insert(port);
    }

    /// Marks `port` as carrying a certificate. The port is also recorded as
    /// open and the certificate replaces any previously stored one.
    pub fn record_tls_port(&mut self, certificate: CertificateMetadata) {
        self.open_ports.insert(certificate.port);
        self.tls_ports.insert(certificate.port);
        self.certificate = Some(certificate);
    }

    pub fn is_online(&self) -> bool {
        self.reachability == Reachability::Online
    }

    /// `<host>-<port>-<vendor>-<product>`. Spaces and path separators in
    /// any part become underscores, so the stem is always a single file name.
    pub fn result_file_stem(&self, port: u16) -> String {
        result_file_stem(
            &self.address,
            port,
            self.vendor.as_deref(),
            self.product.as_deref(),
        )
    }
}

pub fn result_file_stem(
    address: &str,
    port: u16,
    vendor: Option<&str>,
    product: Option<&str>,
) -> String {
    format!(
        "{}-{}-{}-{}",
        file_name_part(address),
        port,
        file_name_part(vendor.unwrap_or(MISSING_ATTRIBUTE)),
        file_name_part(product.unwrap_or(MISSING_ATTRIBUTE)),
    )
}

fn file_name_part(value: &str) -> String {
    value.replace([' ', '/', '\\'], "_")
}

/// One chosen port per host, in input order. Built once by the port
/// selector and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TargetSelection {
    entries: Vec<(String, u16)>,
}

impl TargetSelection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.entries
            .iter()
            .map(|(address, port)| (address.as_str(), *port))
    }
}

impl FromIterator<(String, u16)> for TargetSelection {
    fn from_iter<I: IntoIterator<Item = (String, u16)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
