use serde::{Deserialize, Serialize};

/// Provenance of a node implementation.
///
/// `Community` is accepted when reading persisted records but never produced
/// by the loaders in this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Official,
    Community,
    Custom,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Official => write!(f, "official"),
            Self::Community => write!(f, "community"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl SourceType {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("community") => Self::Community,
            Some("custom") => Self::Custom,
            _ => Self::Official,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}
