use thiserror::Error;

/// Rejected animation options
///
/// Only option parsing and mapper construction can fail; evaluating a
/// frame never does.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    #[error("Invalid viewport margin '{0}': expected 1-4 pixel or percent values")]
    InvalidMargin(String),

    #[error("Unknown reveal direction '{0}' (expected up, down, left, right or none)")]
    UnknownDirection(String),

    #[error("Unknown spring preset '{0}'")]
    UnknownPreset(String),

    #[error("Unknown easing curve '{0}'")]
    UnknownEasing(String),

    #[error("Invalid checkpoints: {0}")]
    Checkpoints(String),
}

pub type Result<T> = std::result::Result<T, MotionError>;
