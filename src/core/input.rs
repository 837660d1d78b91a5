use super::errors::GrinderError;
use super::models::HostInput;
use std::path::Path;

/// Reads hosts from a file. `.json` files hold an array of
/// `{ "ip", "vendor", "product" }` objects; anything else is parsed as
/// `address[,vendor[,product]]` lines.
pub fn load_hosts_file(path: &Path) -> Result<Vec<HostInput>, GrinderError> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        parse_json(&content)
    } else {
        parse_lines(&content)
    }
}

pub fn parse_json(content: &str) -> Result<Vec<HostInput>, GrinderError> {
    let hosts: Vec<HostInput> = serde_json::from_str(content)
        .map_err(|e| GrinderError::Input(format!("bad JSON host list: {}", e)))?;
    for host in &hosts {
        validate_address(&host.ip)?;
    }
    Ok(hosts)
}

pub fn parse_lines(content: &str) -> Result<Vec<HostInput>, GrinderError> {
    let mut hosts = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.splitn(3, ',').map(str::trim);
        let ip = fields.next().unwrap_or_default();
        validate_address(ip)
            .map_err(|e| GrinderError::Input(format!("line {}: {}", lineno + 1, e)))?;

        let vendor = fields.next().filter(|s| !s.is_empty()).map(String::from);
        let product = fields.next().filter(|s| !s.is_empty()).map(String::from);
        hosts.push(HostInput {
            ip: ip.to_string(),
            vendor,
            product,
        });
    }
    Ok(hosts)
}

fn validate_address(address: &str) -> Result<(), GrinderError> {
    if address.is_empty() {
        return Err(GrinderError::Input("empty host address".to_string()));
    }
    // Addresses become path components and nmap arguments.
    if address.starts_with('-') || address.contains(['/', '\\', ' ']) {
        return Err(GrinderError::Input(format!(
            "unsupported host address '{}'",
            address
        )));
    }
    Ok(())
}
