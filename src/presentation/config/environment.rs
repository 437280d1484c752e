use std::fmt;
use std::str::FromStr;

/// Deployment the process runs in. Picks the optional settings file and a
/// few defaults (JSON logs in prod).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Test,
    Prod,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var} value {value:?}; expected local, test or prod")]
pub struct EnvironmentError {
    pub var: &'static str,
    pub value: String,
}

impl Environment {
    pub const ENV_VAR: &'static str = "APP_ENVIRONMENT";

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    /// Unset means local.
    pub fn from_env() -> Result<Self, EnvironmentError> {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Environment::Local),
        }
    }

    /// Base name of the optional settings file, e.g. `appsettings.prod`.
    pub fn settings_file(&self) -> String {
        format!("appsettings.{}", self.as_str())
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Prod
    }
}

impl FromStr for Environment {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Environment::Local),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(EnvironmentError {
                var: Self::ENV_VAR,
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = EnvironmentError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
