use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One sensor axis. Declaration order is the canonical channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    AccX,
    AccY,
    AccZ,
    GyrX,
    GyrY,
    GyrZ,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::AccX,
        Channel::AccY,
        Channel::AccZ,
        Channel::GyrX,
        Channel::GyrY,
        Channel::GyrZ,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::AccX => "AccX",
            Channel::AccY => "AccY",
            Channel::AccZ => "AccZ",
            Channel::GyrX => "GyrX",
            Channel::GyrY => "GyrY",
            Channel::GyrZ => "GyrZ",
        }
    }

    /// Position in [`Channel::ALL`]
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| Error::UnknownChannel(s.to_string()))
    }
}

/// Clinical urgency of a condition, ordered `Normal < Warning < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Severity::Normal),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(Error::UnknownSeverity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_round_trip_names() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
        assert!(matches!("Mag".parse::<Channel>(), Err(Error::UnknownChannel(_))));
    }

    #[test]
    fn test_channel_canonical_order() {
        let mut shuffled = vec![Channel::GyrZ, Channel::AccY, Channel::GyrX, Channel::AccX];
        shuffled.sort();
        assert_eq!(shuffled, vec![Channel::AccX, Channel::AccY, Channel::GyrX, Channel::GyrZ]);
        assert_eq!(Channel::GyrY.index(), 4);
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
        assert_eq!("Critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("fatal".parse::<Severity>().is_err());
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
    }
}
