use thiserror::Error;

/// Failures raised by model construction and the forward pass.
///
/// All of them are programming or configuration errors: they are
/// reported before any parameter is touched and never retried.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("pretrained embedding matrix is {found:?}, expected vocab_size x embed_dim = {expected:?}")]
    PretrainedShape { expected: [usize; 2], found: [usize; 2] },

    #[error("sequence length {len} is shorter than the widest convolution kernel ({kernel})")]
    SequenceTooShort { len: usize, kernel: usize },

    #[error("question1 has batch size {question1} but question2 has batch size {question2}")]
    BatchSizeMismatch { question1: usize, question2: usize },

    #[error("labels have batch size {found}, expected {expected}")]
    LabelCountMismatch { expected: usize, found: usize },

    #[error("{tensor} is on device {found}, model parameters are on {expected}")]
    DeviceMismatch { tensor: &'static str, expected: String, found: String },

    #[error("checkpoint weight '{param}' has shape {found:?}, the model config expects {expected:?}")]
    WeightShape { param: String, expected: Vec<usize>, found: Vec<usize> },

    #[error("batch has no labels; training and evaluation need labelled pairs")]
    MissingLabels,
}
