use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    /// The action handler failed. The message is what `"$error.message"`
    /// expands to inside an `onError` set payload.
    #[error("{0}")]
    Handler(String),

    #[error("follow-up action \"{action}\" failed: {source}")]
    FollowUp {
        action: String,
        #[source]
        source: Box<ActionError>,
    },
}

impl ActionError {
    pub fn handler(message: impl Into<String>) -> Self {
        ActionError::Handler(message.into())
    }

    /// The innermost error message.
    pub fn message(&self) -> &str {
        match self {
            ActionError::Handler(message) => message,
            ActionError::FollowUp { source, .. } => source.message(),
        }
    }
}
