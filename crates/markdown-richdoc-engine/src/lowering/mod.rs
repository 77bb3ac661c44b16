//! Lowering backends. Each takes a token tree and produces the payload of
//! one target API; none of them can fail.

pub mod google_docs;
pub mod notion;
pub mod slack;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// A destination document model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    GoogleDocs,
    Notion,
    Slack,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::GoogleDocs, Target::Notion, Target::Slack];

    pub fn name(&self) -> &'static str {
        match self {
            Target::GoogleDocs => "google-docs",
            Target::Notion => "notion",
            Target::Slack => "slack",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ConvertError::UnknownTarget(s.to_string()))
    }
}
