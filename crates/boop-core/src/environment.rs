use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BoopError;

/// Selects the namespace events are written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Events go to `"{application_id}"`.
    Production,
    /// Events go to `"{application_id}-dev"`.
    #[default]
    Development,
}

impl Environment {
    /// Derives the destination namespace for `application_id`.
    pub fn namespace(self, application_id: &str) -> String {
        match self {
            Environment::Production => application_id.to_string(),
            Environment::Development => format!("{application_id}-dev"),
        }
    }

    /// Whether this is [`Environment::Development`].
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = BoopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(BoopError::Config(format!("unknown environment '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces() {
        assert_eq!(Environment::Production.namespace("app"), "app");
        assert_eq!(Environment::Development.namespace("app"), "app-dev");
    }

    #[test]
    fn default_is_development() {
        assert_eq!(Environment::default(), Environment::Development);
    }

    #[test]
    fn parse() {
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" dev ".parse::<Environment>().unwrap(), Environment::Development);
        assert!("staging".parse::<Environment>().is_err());
    }
}
