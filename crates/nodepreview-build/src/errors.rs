use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading, writing or registering descriptors
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse descriptor: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize descriptor: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Extension module '{0}' is already registered with different sources")]
    DuplicateModule(String),
}

/// Errors reported by the build tool
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Source file for '{module}' not found: {}", .path.display())]
    MissingSource { module: String, path: PathBuf },

    #[error("Failed to run {tool}: {source}")]
    ToolchainUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed (exit code: {code:?}): {stderr}")]
    Toolchain {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Toolchain reported success but produced no artifact for '{0}'")]
    NoArtifact(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}
