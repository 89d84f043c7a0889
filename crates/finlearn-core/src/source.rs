use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Market data providers a series can originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
    Alphavantage,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Alphavantage => "alphavantage",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_name_matches_display() {
        for provider in [ProviderId::Yahoo, ProviderId::Alphavantage] {
            let json = serde_json::to_string(&provider).expect("serialize");
            assert_eq!(json, format!("\"{provider}\""));
        }
    }
}
