use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Document format version, `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArbVersion {
    major: u16,
    minor: u16,
}

impl ArbVersion {
    /// Version written by this crate.
    pub const CURRENT: ArbVersion = ArbVersion::new(15, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }
}

impl Default for ArbVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl FromStr for ArbVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, "0"),
        };
        let (Ok(major), Ok(minor)) = (major.trim().parse::<u16>(), minor.trim().parse::<u16>()) else {
            bail!("Invalid version: {}", s)
        };
        Ok(Self { major, minor })
    }
}

impl fmt::Display for ArbVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
