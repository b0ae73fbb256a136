//! Application error type.
//!
//! Every fallible step returns `AppError`, which carries the process exit code
//! alongside a human-readable message. The exit codes group failures by kind:
//!
//! - `2`: I/O or input-format problems (files, CSV/JSON content, CLI values)
//! - `3`: input-shape problems (too few samples, length mismatch, underdetermined)
//! - `4`: numerical problems (non-finite values, failed decomposition)

pub const EXIT_INPUT: u8 = 2;
pub const EXIT_SHAPE: u8 = 3;
pub const EXIT_NUMERIC: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(EXIT_SHAPE, message)
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(EXIT_NUMERIC, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
