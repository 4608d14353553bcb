//! Error type shared by every plan operation.

use core::fmt;

/// Which array an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    /// Node coordinates, length `d * M_total`.
    X,
    /// Fourier coefficients, length `N_total`.
    FHat,
    /// Sample values, length `M_total`.
    F,
    /// An approximation compared against a reference in
    /// [`accuracy`](crate::accuracy).
    Approximation,
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Buffer::X => write!(f, "x"),
            Buffer::FHat => write!(f, "f_hat"),
            Buffer::F => write!(f, "f"),
            Buffer::Approximation => write!(f, "approximation"),
        }
    }
}

/// Errors that can occur while building or driving a [`Plan`](crate::Plan).
#[derive(Debug, Clone, PartialEq)]
pub enum NfftError {
    /// Invalid or inconsistent construction parameters.
    Configuration(String),
    /// An array does not have the expected length.
    ShapeMismatch {
        buffer: Buffer,
        expected: usize,
        actual: usize,
    },
    /// The plan has been finalized.
    Finalized,
    /// A precompute strategy is configured but `precompute` has not run
    /// since the nodes were last assigned.
    PrecomputeRequired,
    /// The plan does not own this buffer and the caller has not supplied it.
    Detached(Buffer),
    /// Reference data is malformed at the given row.
    DataCorruption { row: usize, reason: String },
    /// A node coordinate lies outside `[-0.5, 0.5)` or is not finite.
    NodeOutOfRange { index: usize, value: f64 },
    /// Reading or writing reference data failed.
    Io(String),
}

impl NfftError {
    /// `true` for every error raised by the plan's state machine rather than
    /// by its inputs.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            NfftError::Finalized | NfftError::PrecomputeRequired | NfftError::Detached(_)
        )
    }
}

impl fmt::Display for NfftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NfftError::Configuration(msg) => write!(f, "invalid plan configuration: {msg}"),
            NfftError::ShapeMismatch {
                buffer,
                expected,
                actual,
            } => write!(
                f,
                "{buffer} expects {expected} elements but {actual} were given"
            ),
            NfftError::Finalized => write!(f, "plan has already been finalized"),
            NfftError::PrecomputeRequired => {
                write!(f, "psi precomputation must run after assigning nodes")
            }
            NfftError::Detached(buffer) => {
                write!(f, "{buffer} is caller-owned and has not been supplied")
            }
            NfftError::DataCorruption { row, reason } => {
                write!(f, "reference data is corrupted at row {row}: {reason}")
            }
            NfftError::NodeOutOfRange { index, value } => {
                write!(f, "node coordinate {index} = {value} is outside [-0.5, 0.5)")
            }
            NfftError::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for NfftError {}

impl From<std::io::Error> for NfftError {
    fn from(e: std::io::Error) -> Self {
        NfftError::Io(e.to_string())
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = core::result::Result<T, NfftError>;

/// Build a [`NfftError::Configuration`] from anything printable.
pub(crate) fn config_err(msg: impl Into<String>) -> NfftError {
    NfftError::Configuration(msg.into())
}
