//! DSS pathnames: `/A/B/C/D/E/F/`.
//!
//! For grid records the D part holds the start time and the E part the
//! end time of the record.

use crate::error::{GridError, GridResult};
use std::fmt;
use std::str::FromStr;

/// A parsed six-part DSS pathname.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DssPathname {
    parts: [String; 6],
}

impl DssPathname {
    pub fn parse(s: &str) -> GridResult<Self> {
        let text = s.trim();
        if !text.starts_with('/') || !text.ends_with('/') || text.len() < 2 {
            return Err(GridError::InvalidPathname(format!(
                "'{}' must start and end with '/'",
                s
            )));
        }
        let inner = &text[1..text.len() - 1];
        let pieces: Vec<&str> = inner.split('/').collect();
        if pieces.len() != 6 {
            return Err(GridError::InvalidPathname(format!(
                "'{}' has {} parts, expected 6",
                s,
                pieces.len()
            )));
        }
        let mut parts: [String; 6] = Default::default();
        for (slot, piece) in parts.iter_mut().zip(pieces) {
            *slot = piece.to_string();
        }
        Ok(Self { parts })
    }

    pub fn a(&self) -> &str {
        &self.parts[0]
    }

    pub fn b(&self) -> &str {
        &self.parts[1]
    }

    pub fn c(&self) -> &str {
        &self.parts[2]
    }

    pub fn d(&self) -> &str {
        &self.parts[3]
    }

    pub fn e(&self) -> &str {
        &self.parts[4]
    }

    pub fn f(&self) -> &str {
        &self.parts[5]
    }

    /// Start time part of a grid pathname.
    pub fn start_part(&self) -> &str {
        self.d()
    }

    /// End time part of a grid pathname.
    pub fn end_part(&self) -> &str {
        self.e()
    }
}

impl fmt::Display for DssPathname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.parts.join("/"))
    }
}

impl FromStr for DssPathname {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
