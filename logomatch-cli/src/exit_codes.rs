//! Exit codes following sysexits.h conventions.
//!
//! Fatal errors are classified by the first [`LogoMatchError`] or
//! [`std::io::Error`] found in the anyhow chain.

use logomatch_core::LogoMatchError;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments or configuration).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Cannot open input (inventory file, asset directory, HTML page).
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot read or write a file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self {
            code: classify(err),
            message: Some(format!("{err:#}")),
        }
    }
}

fn classify(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<LogoMatchError>() {
            return match e {
                LogoMatchError::Inventory(_) | LogoMatchError::MissingAssetDirectory(_) => {
                    INPUT_ERROR
                }
                LogoMatchError::Config(_) | LogoMatchError::InvalidDomain(_) => USAGE_ERROR,
                LogoMatchError::Io(io) => io_code(io),
                _ => GENERAL_ERROR,
            };
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return io_code(io);
        }
    }
    GENERAL_ERROR
}

fn io_code(err: &std::io::Error) -> i32 {
    match err.kind() {
        std::io::ErrorKind::NotFound => INPUT_ERROR,
        _ => IO_ERROR,
    }
}
