use crate::search::SearchMatch;
use serde::{Deserialize, Serialize};

/// How a finding is placed when a location search is ambiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// Place the finding only when exactly one match exists; zero or
    /// several matches suppress it
    #[default]
    #[serde(rename = "unique")]
    UniqueOrSuppress,

    /// Place the finding on the first match
    #[serde(rename = "first")]
    FirstMatch,
}

impl MatchPolicy {
    pub fn pick(&self, matches: Vec<SearchMatch>) -> Option<SearchMatch> {
        match self {
            MatchPolicy::UniqueOrSuppress if matches.len() == 1 => matches.into_iter().next(),
            MatchPolicy::UniqueOrSuppress => None,
            MatchPolicy::FirstMatch => matches.into_iter().next(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPolicy::UniqueOrSuppress => "unique",
            MatchPolicy::FirstMatch => "first",
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
