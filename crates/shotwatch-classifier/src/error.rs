use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model returned {got} class scores, expected {expected}")]
    BadOutputShape { expected: usize, got: usize },
}

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV write error: {0}")]
    Wav(#[from] hound::Error),
}
