use super::{DiscoveryReport, HostScan, ServiceRecord};
use crate::core::errors::GrinderError;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Extracts hosts, open TCP ports, service fingerprints and script output
/// from nmap `-oX` documents.
pub struct NmapXmlParser {
    host_re: Regex,
    status_re: Regex,
    address_re: Regex,
    port_re: Regex,
    state_re: Regex,
    service_re: Regex,
    attr_re: Regex,
    script_re: Regex,
    entity_re: Regex,
}

impl NmapXmlParser {
    pub fn new() -> Result<Self, GrinderError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| GrinderError::Discovery(format!("bad XML pattern: {}", e)))
        };

        Ok(Self {
            host_re: compile(r"(?s)<host\b.*?</host>")?,
            status_re: compile(r#"<status state="(\w+)""#)?,
            address_re: compile(r#"<address addr="([^"]+)" addrtype="(?:ipv4|ipv6)""#)?,
            port_re: compile(r#"(?s)<port protocol="(\w+)" portid="(\d+)">(.*?)</port>"#)?,
            state_re: compile(r#"<state state="([\w|]+)""#)?,
            service_re: compile(r"<service\s([^>]*?)/?>")?,
            attr_re: compile(r#"(\w+)="([^"]*)""#)?,
            script_re: compile(r#"<script id="([^"]+)" output="([^"]*)""#)?,
            entity_re: compile(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|amp|quot|apos);")?,
        })
    }

    pub fn parse(&self, xml: &str) -> Result<DiscoveryReport, GrinderError> {
        if !xml.contains("<nmaprun") {
            return Err(GrinderError::Discovery(
                "engine output is not an nmap XML document".to_string(),
            ));
        }

        let mut report = DiscoveryReport::new();
        for host_block in self.host_re.find_iter(xml) {
            let block = host_block.as_str();
            let Some(address) = self.address_re.captures(block).map(|c| c[1].to_string()) else {
                continue;
            };

            let status = self
                .status_re
                .captures(block)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let mut host = HostScan {
                status,
                ..HostScan::default()
            };

            for port_cap in self.port_re.captures_iter(block) {
                if &port_cap[1] != "tcp" {
                    continue;
                }
                let Ok(port) = port_cap[2].parse::<u16>() else {
                    tracing::debug!("Skipping unparsable port id {}", &port_cap[2]);
                    continue;
                };
                let body = &port_cap[3];
                let state = self
                    .state_re
                    .captures(body)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();
                if state != "open" {
                    continue;
                }
                host.tcp.insert(port, self.service_record(state, body));
            }

            report.insert(address, host);
        }

        Ok(report)
    }

    fn service_record(&self, state: String, body: &str) -> ServiceRecord {
        let mut record = ServiceRecord {
            state,
            ..ServiceRecord::default()
        };

        if let Some(service) = self.service_re.captures(body) {
            let attrs: HashMap<&str, &str> = self
                .attr_re
                .captures_iter(service.get(1).map_or("", |m| m.as_str()))
                .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
                .collect();
            record.name = attrs.get("name").map(|v| self.unescape(v));
            record.product = attrs.get("product").map(|v| self.unescape(v));
            record.version = attrs.get("version").map(|v| self.unescape(v));
        }

        for script in self.script_re.captures_iter(body) {
            record
                .scripts
                .insert(script[1].to_string(), self.unescape(&script[2]));
        }

        record
    }

    /// Decodes the XML entities nmap emits inside attribute values.
    pub fn unescape(&self, value: &str) -> String {
        self.entity_re
            .replace_all(value, |caps: &Captures| {
                let entity = &caps[1];
                let decoded = match entity {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => entity
                        .strip_prefix("#x")
                        .map(|hex| u32::from_str_radix(hex, 16))
                        .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                        .and_then(Result::ok)
                        .and_then(char::from_u32),
                };
                decoded
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -n -sn -oX - 10.0.0.1 10.0.0.2" start="1700000000" version="7.94">
<hosthint><status state="up" reason="unknown-response" reason_ttl="0"/>
<address addr="10.0.0.1" addrtype="ipv4"/>
</hosthint>
<host><status state="up" reason="echo-reply" reason_ttl="63"/>
<address addr="10.0.0.1" addrtype="ipv4"/>
<address addr="AA:BB:CC:DD:EE:FF" addrtype="mac" vendor="Acme"/>
<hostnames>
</hostnames>
<times srtt="1200" rttvar="5000" to="100000"/>
</host>
<runstats><finished time="1700000002" elapsed="2.01"/><hosts up="1" down="1" total="2"/></runstats>
</nmaprun>"#;

    const SERVICE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -T4 -F -sC -sV" version="7.94">
<host starttime="1700000000" endtime="1700000050"><status state="up" reason="syn-ack" reason_ttl="0"/>
<address addr="10.0.0.5" addrtype="ipv4"/>
<ports><extraports state="closed" count="97"/>
<port protocol="tcp" portid="22"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="ssh" product="OpenSSH" version="8.9p1" method="probed" conf="10"/></port>
<port protocol="tcp" portid="443"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="http" product="nginx" tunnel="ssl" method="probed" conf="10"/><script id="http-title" output="Welcome &amp; hello"/><script id="ssl-cert" output="Subject: commonName=example.org&#xa;Issuer: commonName=R3/organizationName=Let&apos;s Encrypt&#xa;Public Key type: rsa"><table key="subject"><elem key="commonName">example.org</elem></table></script></port>
<port protocol="tcp" portid="8080"><state state="filtered" reason="no-response" reason_ttl="0"/><service name="http-proxy" method="table" conf="3"/></port>
<port protocol="udp" portid="53"><state state="open" reason="udp-response" reason_ttl="64"/></port>
</ports>
</host>
</nmaprun>"#;

    #[test]
    fn parses_ping_scan_status() {
        let parser = NmapXmlParser::new().unwrap();
        let report = parser.parse(PING_XML).unwrap();

        assert_eq!(report.len(), 1);
        let host = &report["10.0.0.1"];
        assert!(host.is_up());
        assert!(host.tcp.is_empty());
    }

    #[test]
    fn parses_open_tcp_ports_and_scripts() {
        let parser = NmapXmlParser::new().unwrap();
        let report = parser.parse(SERVICE_XML).unwrap();
        let host = &report["10.0.0.5"];

        assert_eq!(host.tcp.keys().copied().collect::<Vec<_>>(), vec![22, 443]);

        let ssh = &host.tcp[&22];
        assert_eq!(ssh.product.as_deref(), Some("OpenSSH"));
        assert_eq!(ssh.ssl_cert(), None);

        let https = &host.tcp[&443];
        assert_eq!(https.name.as_deref(), Some("http"));
        assert_eq!(https.scripts["http-title"], "Welcome & hello");
        assert_eq!(
            https.ssl_cert(),
            Some("Subject: commonName=example.org\nIssuer: commonName=R3/organizationName=Let's Encrypt\nPublic Key type: rsa")
        );
    }

    #[test]
    fn rejects_non_xml_output() {
        let parser = NmapXmlParser::new().unwrap();
        assert!(parser.parse("Starting Nmap 7.94").is_err());
    }

    #[test]
    fn unescapes_numeric_and_named_entities() {
        let parser = NmapXmlParser::new().unwrap();
        assert_eq!(parser.unescape("a&#10;b&#x9;c&lt;d&gt;"), "a\nb\tc<d>");
        assert_eq!(parser.unescape("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
    }
}
