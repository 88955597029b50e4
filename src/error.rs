#[derive(Debug, thiserror::Error)]
pub enum RedwireError {
    #[error("argument {0} expected to be of bytes, text, int or float kind")]
    UnsupportedArgument(String),

    #[error("malformed reply: {0}")]
    MalformedReply(String),

    #[error("reply is not valid text: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    #[error("pending reply dropped before settlement")]
    Dropped,

    #[error("{0}")]
    Generic(String),
}

pub type RedwireResult<T> = Result<T, RedwireError>;
