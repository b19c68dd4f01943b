use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Artifact I/O failures writing the `.errors`/`.reals` files (§6 "Output artifacts").
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("failed to write report artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
