//! Sample identifiers of the form `<individual>_<F|B>`.

use crate::error::{Result, TranslocationError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Body compartment a sample was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Compartment {
    /// Stool (feces).
    Stool,
    /// Blood (plasma).
    Blood,
}

impl Compartment {
    /// Identifier suffix used in sample IDs.
    pub fn suffix(&self) -> char {
        match self {
            Self::Stool => 'F',
            Self::Blood => 'B',
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stool => "stool",
            Self::Blood => "blood",
        }
    }

    /// Parse the metadata `SampleType` spelling.
    pub fn from_sample_type(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stool" | "feces" | "faeces" | "fecal" | "f" => Some(Self::Stool),
            "plasma" | "blood" | "serum" | "b" => Some(Self::Blood),
            _ => None,
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn sample_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?P<individual>.+)_(?P<suffix>[FB])$").unwrap())
}

/// A parsed sample identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SampleId {
    /// Individual identifier (sample ID with the compartment suffix stripped).
    pub individual: String,
    /// Compartment encoded by the suffix.
    pub compartment: Compartment,
}

impl SampleId {
    /// Parse `<individual>_<F|B>`.
    pub fn parse(raw: &str) -> Result<Self> {
        let caps = sample_id_pattern()
            .captures(raw.trim())
            .ok_or_else(|| TranslocationError::InvalidSampleId(raw.to_string()))?;
        let compartment = match &caps["suffix"] {
            "F" => Compartment::Stool,
            _ => Compartment::Blood,
        };
        Ok(Self {
            individual: caps["individual"].to_string(),
            compartment,
        })
    }

}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.individual, self.compartment.suffix())
    }
}
