// src/exit.rs
//! Process exit codes for `adversa`.
//!
//! Provides a stable contract for scripts and automation.

use crate::error::AdversaError;
use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AdversaExit {
    /// Operation completed successfully.
    Success = 0,
    /// Generic error (I/O, unreadable dataset).
    Error = 1,
    /// Configuration rejected before any sample was processed.
    InvalidInput = 2,
    /// `mutate` produced a failed variant.
    PartialFailure = 3,
}

impl AdversaExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl Termination for AdversaExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}

impl AdversaExit {
    /// Exit code for a failed command: configuration errors are invalid input.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let config_error = err
            .downcast_ref::<AdversaError>()
            .is_some_and(AdversaError::is_config_error);
        if config_error {
            Self::InvalidInput
        } else {
            Self::Error
        }
    }
}

impl From<anyhow::Result<()>> for AdversaExit {
    fn from(res: anyhow::Result<()>) -> Self {
        match res {
            Ok(()) => Self::Success,
            Err(e) => {
                eprintln!("Error: {e:#}");
                Self::for_error(&e)
            }
        }
    }
}
