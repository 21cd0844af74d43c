use std::io;

use thiserror::Error;

use crate::kinetic::{ModelKind, Scale};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid model parameters: {0}")]
    InvalidParams(String),

    #[error("Unknown model kind {0:?} (expected 'raw' or 'diposition')")]
    UnknownKind(String),

    #[error("Signal window has length {found}, the model expects {expected}")]
    WindowMismatch { expected: usize, found: usize },

    #[error("Models do not share their configuration: {0}")]
    Incompatible(String),

    #[error("Operation needs a model on the {expected} scale, this one is on the {found} scale")]
    WrongScale { expected: Scale, found: Scale },

    #[error("Not a cpgkin model file")]
    NotAModel,

    #[error("Unsupported model file version {0}")]
    UnsupportedVersion(u32),

    #[error("Model file declares a {declared} model but holds a {found} model")]
    KindMismatch { declared: ModelKind, found: ModelKind },

    #[error("Corrupt model: {0}")]
    Corrupt(String),

    #[error("Model encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
