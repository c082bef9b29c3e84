//! Host-facing status values.
//!
//! The scheduler framework distinguishes "this unit cannot be scheduled now"
//! (`Unschedulable`) from "the check itself could not run" (`Error`). Every
//! plugin outcome collapses into one of these codes at the boundary.

use serde::Serialize;

use crate::error::PluginError;
use crate::gate::Admission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    Success,
    Unschedulable,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub code: Code,
    pub reason: String,
}

impl Status {
    pub fn success() -> Self {
        Self {
            code: Code::Success,
            reason: String::new(),
        }
    }

    pub fn unschedulable(reason: impl Into<String>) -> Self {
        Self {
            code: Code::Unschedulable,
            reason: reason.into(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            code: Code::Error,
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Code::Success
    }
}

impl From<Admission> for Status {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Admitted => Status::success(),
            Admission::Unschedulable { reason } => Status::unschedulable(reason),
        }
    }
}

impl From<&PluginError> for Status {
    fn from(err: &PluginError) -> Self {
        Status::error(err.to_string())
    }
}

impl<T> From<Result<T, PluginError>> for Status
where
    T: Into<Status>,
{
    fn from(result: Result<T, PluginError>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(err) => Status::from(&err),
        }
    }
}
