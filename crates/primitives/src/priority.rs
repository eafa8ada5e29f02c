//! Scheduling priority attached to a command.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Priority the executor should give a command. Opaque to the gateway.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Default,
    High,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Default => "DEFAULT",
            Priority::High => "HIGH",
            Priority::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized priority '{0}'")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    /// Case-insensitive. Both `high` and `high_priority` name [`Priority::High`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_suffix("_PRIORITY").unwrap_or(&upper);
        match name {
            "DEFAULT" => Ok(Priority::Default),
            "HIGH" => Ok(Priority::High),
            "LOW" => Ok(Priority::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_known_spellings() {
        assert_eq!("default".parse::<Priority>(), Ok(Priority::Default));
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("low_priority".parse::<Priority>(), Ok(Priority::Low));
        assert_eq!("High_Priority".parse::<Priority>(), Ok(Priority::High));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("urgent".parse::<Priority>().is_err());
        assert!("".parse::<Priority>().is_err());
        assert!("_priority".parse::<Priority>().is_err());
        assert!("highpriority".parse::<Priority>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let back: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(back, Priority::Low);
    }

    fn case_variants(s: &'static str) -> impl Strategy<Value = String> {
        prop::collection::vec(any::<bool>(), s.len()).prop_map(move |flips| {
            s.chars()
                .zip(flips)
                .map(|(c, up)| {
                    if up {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_high_priority_is_case_insensitive(s in case_variants("high_priority")) {
            prop_assert_eq!(s.parse::<Priority>(), Ok(Priority::High));
        }

        #[test]
        fn prop_default_is_case_insensitive(s in case_variants("default")) {
            prop_assert_eq!(s.parse::<Priority>(), Ok(Priority::Default));
        }
    }
}
