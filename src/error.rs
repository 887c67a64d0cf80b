use thiserror::Error;

use crate::analysis::DurationAnalysis;
use crate::wizard::Step;

#[derive(Error, Debug)]
pub enum DubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unreadable media: {0}")]
    MediaUnreadable(String),

    #[error("Media probe error: {0}")]
    Media(String),

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Script rewrite failed: {0}")]
    Rewrite(String),

    #[error("A script rewrite is already in progress")]
    RewriteInProgress,

    #[error("Cannot {action} while on step {from}")]
    InvalidTransition { from: Step, action: &'static str },

    #[error("Cannot proceed: {0}")]
    ProceedBlocked(String),

    #[error("Script duration does not match the video ({0})")]
    DurationMismatch(DurationAnalysis),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, DubError>;
