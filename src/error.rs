use thiserror::Error;

/// Validation failures raised while building entities or applying a
/// configuration. None of them are recovered internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Range error: the start of the range ({start}) cannot exceed its end ({end})")]
    Range { start: f32, end: f32 },

    #[error("Size error: size cannot be a negative number (got {0})")]
    Size(f32),

    #[error("Color error: {subject} color is missing values for one or more RGB channels")]
    Color { subject: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
