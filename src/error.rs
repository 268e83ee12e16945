use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HexmakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse Hexmake spec: {0}")]
    SpecParse(#[from] serde_json::Error),

    #[error("invalid spec: {0}")]
    SpecValidation(String),

    #[error("output '{0}' is produced by more than one rule")]
    DuplicateOutput(String),

    #[error("no rule produces output '{0}'")]
    UnknownOutput(String),

    #[error("dependency cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    #[error("input '{path}' does not exist")]
    MissingInput { path: PathBuf },

    #[error("command failed with exit code {code}: {command}\nsandbox: {sandbox}")]
    CommandFailed {
        command: String,
        code: i32,
        sandbox: PathBuf,
    },

    #[error("declared output '{path}' was not produced in sandbox {sandbox}")]
    MissingDeclaredOutput { path: PathBuf, sandbox: PathBuf },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HexmakeError>;
