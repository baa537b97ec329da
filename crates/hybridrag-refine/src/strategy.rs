use std::fmt;
use std::str::FromStr;

use hybridrag_core::error::Error;

/// Retriever built for a request, also the sub-strategy of `Iterative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverKind {
    Standard,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Standard,
    Hybrid,
    Iterative(RetrieverKind),
}

impl Strategy {
    pub fn retriever_kind(self) -> RetrieverKind {
        match self {
            Self::Standard => RetrieverKind::Standard,
            Self::Hybrid => RetrieverKind::Hybrid,
            Self::Iterative(kind) => kind,
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "hybrid" => Ok(Self::Hybrid),
            "iterative" | "iterative:hybrid" => Ok(Self::Iterative(RetrieverKind::Hybrid)),
            "iterative:standard" => Ok(Self::Iterative(RetrieverKind::Standard)),
            _ => Err(Error::InvalidModeSelection(tag.to_string())),
        }
    }
}

impl FromStr for RetrieverKind {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(Error::InvalidModeSelection(tag.to_string())),
        }
    }
}

impl fmt::Display for RetrieverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Hybrid => "hybrid",
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Hybrid => f.write_str("hybrid"),
            Self::Iterative(kind) => write!(f, "iterative:{kind}"),
        }
    }
}
