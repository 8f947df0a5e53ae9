use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which half of the watch-list an entry belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnimeStatus {
    /// Currently watching
    Watching,
    /// Finished watching
    Completed,
}

impl AnimeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimeStatus::Watching => "watching",
            AnimeStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AnimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "watching" => Ok(AnimeStatus::Watching),
            "completed" => Ok(AnimeStatus::Completed),
            other => Err(format!("Unknown anime status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AnimeStatus::Watching).unwrap(), "\"watching\"");
        let parsed: AnimeStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, AnimeStatus::Completed);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Watching".parse::<AnimeStatus>(), Ok(AnimeStatus::Watching));
        assert!("dropped".parse::<AnimeStatus>().is_err());
    }
}
