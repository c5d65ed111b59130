//! Error type shared by the whole pipeline.

/// Errors that abort a geometry run.
///
/// Nothing is recovered mid-stream: the first failure ends processing and is
/// reported by the binary.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid base-10 delta '{token}'")]
    Parse {
        /// 1-based line number in the input file.
        line: usize,
        /// Offending token, lossily decoded if it is not UTF-8.
        token: String,
    },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
