use std::fmt;
use std::io;

use hll_sketch::SketchError;

#[derive(Debug)]
pub enum EvalError {
    InvalidConfig(&'static str),
    Sketch(SketchError),
    Io(io::Error),
    Json(serde_json::Error),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(message) => write!(f, "invalid configuration: {message}"),
            Self::Sketch(e) => write!(f, "sketch: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
            Self::ThreadPool(e) => write!(f, "thread pool: {e}"),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<SketchError> for EvalError {
    fn from(e: SketchError) -> Self {
        Self::Sketch(e)
    }
}

impl From<io::Error> for EvalError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for EvalError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}
