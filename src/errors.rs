use displaydoc::Display;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or placing a program image, all of them happen before execution.
#[derive(Display, Error, Debug)]
pub enum LoadProgramError {
    /// Program is missing valid .ORIG header
    ProgramMissingOrigHeader,
    /// Program is truncated, got {bytes} bytes which is not a whole number of u16 words
    ProgramTruncated { bytes: usize },
    /// Program file {path:?} does not exist
    ProgramFileNotFound { path: PathBuf },
    /// Program path {path:?} is a directory, not a file
    ProgramPathIsDirectory { path: PathBuf },
    /// Error reading program file {path:?}: {source}
    ProgramFileReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Display, Error, Debug, PartialEq, Eq)]
pub enum ExecutionError {
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
}
