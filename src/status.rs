use std::process::ExitCode;

use crate::error::Error;

/// Process outcome, laid out after the exit codes GitHub Actions understands.
/// 78 is "neutral": the step neither passed nor failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    InvalidArguments,
    ConfigError,
    OperationError,
    Neutral,
}

impl Status {
    pub const fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::InvalidArguments => 1,
            Status::ConfigError => 2,
            Status::OperationError => 3,
            Status::Neutral => 78,
        }
    }
}

impl From<&Error> for Status {
    fn from(error: &Error) -> Self {
        if error.is_config() {
            Status::ConfigError
        } else {
            Status::OperationError
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}
