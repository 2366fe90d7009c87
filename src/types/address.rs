use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use crate::record::ValidationError;

/// Network identity of a watcher: an IP address or a hostname.
///
/// IP addresses are stored in their canonical textual form, hostnames lowercased,
/// so two spellings of the same address compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WatcherAddress(String);

impl WatcherAddress {
    const MAX_HOSTNAME_LEN: usize = 253;
    const MAX_LABEL_LEN: usize = 63;

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::normalize(value)
            .map(WatcherAddress)
            .map_err(|reason| ValidationError::single("WatcherAddress", "address", reason))
    }

    pub(crate) fn normalize(value: &str) -> Result<String, String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err("address cannot be empty".to_string());
        }

        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(ip.to_string());
        }

        let hostname = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if hostname.len() > Self::MAX_HOSTNAME_LEN {
            return Err(format!("hostname exceeds {} characters", Self::MAX_HOSTNAME_LEN));
        }

        let labels: Vec<&str> = hostname.split('.').collect();
        for label in &labels {
            if label.is_empty() || label.len() > Self::MAX_LABEL_LEN {
                return Err(format!("'{}' is not a valid hostname", trimmed));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(format!("'{}' is not a valid hostname", trimmed));
            }
            if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(format!("'{}' is not a valid hostname", trimmed));
            }
        }

        // Dotted digits that failed IP parsing are a malformed IPv4, not a hostname
        if labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit())) {
            return Err(format!("'{}' is not a valid IP address", trimmed));
        }

        Ok(hostname.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WatcherAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WatcherAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WatcherAddress::parse(&value)
    }
}

impl From<WatcherAddress> for String {
    fn from(address: WatcherAddress) -> Self {
        address.0
    }
}

impl From<IpAddr> for WatcherAddress {
    fn from(ip: IpAddr) -> Self {
        WatcherAddress(ip.to_string())
    }
}
