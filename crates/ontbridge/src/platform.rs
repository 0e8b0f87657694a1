use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User-agent tokens that mark a mobile in-app browser.
pub const MOBILE_AGENT_TOKENS: [&str; 6] = [
    "Android",
    "iPhone",
    "SymbianOS",
    "Windows Phone",
    "iPad",
    "iPod",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform {0:?} (expected desktop or mobile)")]
pub struct ParsePlatformError(pub String);

impl Platform {
    /// Classifies a user-agent string.
    ///
    /// Only the first occurrence of each token is inspected and it must start
    /// after byte 0; a user agent that *begins* with a token stays desktop.
    pub fn detect(user_agent: &str) -> Self {
        let mobile = MOBILE_AGENT_TOKENS.iter().any(|token| {
            user_agent
                .find(token)
                .is_some_and(|index| index > 0)
        });
        if mobile { Self::Mobile } else { Self::Desktop }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }

    pub fn is_mobile(self) -> bool {
        self == Self::Mobile
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "desktop" | "pc" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(ParsePlatformError(other.to_string())),
        }
    }
}
