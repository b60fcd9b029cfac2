use std::backtrace::Backtrace;
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The problem handed over by the reader does not describe a square grid
    /// with matching target counts and in-range cell values.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// An algorithm invariant was violated. This indicates a solver bug and
    /// is never recovered from.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<SolverError>,
        backtrace: Box<Backtrace>,
    },
}

impl From<SolverError> for Error {
    fn from(inner: SolverError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}
