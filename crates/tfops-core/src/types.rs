use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn all() -> &'static [Environment] {
        &[Environment::Dev, Environment::Staging, Environment::Prod]
    }

    pub fn names() -> [&'static str; 3] {
        ["dev", "staging", "prod"]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = crate::error::TfopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            other => Err(crate::error::TfopsError::UnknownEnvironment(
                other.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Plan,
    Apply,
    Destroy,
    Validate,
    Format,
    Output,
}

impl Action {
    pub fn all() -> &'static [Action] {
        &[
            Action::Plan,
            Action::Apply,
            Action::Destroy,
            Action::Validate,
            Action::Format,
            Action::Output,
        ]
    }

    pub fn names() -> [&'static str; 6] {
        ["plan", "apply", "destroy", "validate", "format", "output"]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Plan => "plan",
            Action::Apply => "apply",
            Action::Destroy => "destroy",
            Action::Validate => "validate",
            Action::Format => "format",
            Action::Output => "output",
        }
    }

    /// Gated actions change real infrastructure and need an operator `yes`
    /// unless the run is unattended.
    pub fn is_gated(self) -> bool {
        matches!(self, Action::Apply | Action::Destroy)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = crate::error::TfopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Action::Plan),
            "apply" => Ok(Action::Apply),
            "destroy" => Ok(Action::Destroy),
            "validate" => Ok(Action::Validate),
            "format" => Ok(Action::Format),
            "output" => Ok(Action::Output),
            other => Err(crate::error::TfopsError::UnknownAction(other.to_string())),
        }
    }
}
