//! Story, region and language types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Region a story comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Tamil,
    Punjabi,
    Kerala,
    Gujarati,
    Bengali,
}

impl Region {
    pub const ALL: [Self; 5] = [
        Self::Tamil,
        Self::Punjabi,
        Self::Kerala,
        Self::Gujarati,
        Self::Bengali,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tamil => "Tamil",
            Self::Punjabi => "Punjabi",
            Self::Kerala => "Kerala",
            Self::Gujarati => "Gujarati",
            Self::Bengali => "Bengali",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::NotFound(format!("region {s}")))
    }
}

/// Narration language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Tamil,
    Telugu,
    Malayalam,
    Kannada,
    Punjabi,
    Hindi,
    Gujarati,
    Bengali,
}

impl Language {
    pub const ALL: [Self; 9] = [
        Self::English,
        Self::Tamil,
        Self::Telugu,
        Self::Malayalam,
        Self::Kannada,
        Self::Punjabi,
        Self::Hindi,
        Self::Gujarati,
        Self::Bengali,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Malayalam => "Malayalam",
            Self::Kannada => "Kannada",
            Self::Punjabi => "Punjabi",
            Self::Hindi => "Hindi",
            Self::Gujarati => "Gujarati",
            Self::Bengali => "Bengali",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::NotFound(format!("language {s}")))
    }
}

/// A folk story summary from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolkStory {
    pub id: String,
    pub title: String,
    pub region: Region,
    /// Narrative form, e.g. "Epic Legend"
    #[serde(rename = "type")]
    pub kind: String,
    pub era: String,
    #[serde(rename = "theme", default)]
    pub themes: Vec<String>,
    pub summary: String,
}

impl FolkStory {
    /// Kind contains `theme`, or the theme list holds it exactly
    #[must_use]
    pub fn matches_theme(&self, theme: &str) -> bool {
        self.kind.contains(theme) || self.themes.iter().any(|t| t == theme)
    }
}
