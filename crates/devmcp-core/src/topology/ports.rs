//! Port binding normalization.

use std::fmt;

/// A parsed port declaration.
///
/// `host_port` is `None` for bare container ports such as `"6379"`, which
/// publish nothing on the host and are only forwarded by the dev container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortBinding {
    pub host_ip: Option<String>,
    pub host_port: Option<u16>,
    pub container_port: u16,
}

impl PortBinding {
    pub fn container(port: u16) -> Self {
        Self {
            host_ip: None,
            host_port: None,
            container_port: port,
        }
    }

    /// Parse `"6379"`, `"5432:5432"` or `"127.0.0.1:5433:5432"`.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let parts: Vec<&str> = spec.trim().split(':').collect();
        match parts.as_slice() {
            [container] => Ok(Self::container(parse_port(container)?)),
            [host, container] => Ok(Self {
                host_ip: None,
                host_port: Some(parse_port(host)?),
                container_port: parse_port(container)?,
            }),
            [ip, host, container] => {
                if ip.is_empty() {
                    return Err(format!("port '{spec}' has an empty host address"));
                }
                Ok(Self {
                    host_ip: Some((*ip).to_string()),
                    host_port: Some(parse_port(host)?),
                    container_port: parse_port(container)?,
                })
            }
            _ => Err(format!(
                "port '{spec}' must be 'container', 'host:container' or 'ip:host:container'"
            )),
        }
    }
}

impl fmt::Display for PortBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.host_ip, self.host_port) {
            (Some(ip), Some(host)) => write!(f, "{ip}:{host}:{}", self.container_port),
            (_, Some(host)) => write!(f, "{host}:{}", self.container_port),
            _ => write!(f, "{}", self.container_port),
        }
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a port number"))?;
    if !(1..=65535).contains(&value) {
        return Err(format!("port {value} is outside 1-65535"));
    }
    Ok(value as u16)
}
