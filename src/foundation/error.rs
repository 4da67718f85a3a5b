pub type SlideplayResult<T> = Result<T, SlideplayError>;

#[derive(thiserror::Error, Debug)]
pub enum SlideplayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error("transition error: {0}")]
    Transition(String),

    #[error("expression error: {0}")]
    Expression(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlideplayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn transition(msg: impl Into<String>) -> Self {
        Self::Transition(msg.into())
    }

    pub fn expression(msg: impl Into<String>) -> Self {
        Self::Expression(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SlideplayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
