use crate::error::{LoaderError, LoaderResult};
use serde_json::Value;
use vyuh_content::ContentItem;

/// Observable state of a [`DocumentLoader`](crate::DocumentLoader).
///
/// `Idle → Loading → {Ready, Empty, Error}`; any settled state goes back to
/// `Loading` on refresh or a live update.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoaderState {
    #[default]
    Idle,
    Loading,
    Ready(ContentItem),
    Empty,
    Error(LoaderError),
}

impl LoaderState {
    /// Maps a fetch outcome to the state it settles in. A JSON `null`
    /// document counts as no document.
    pub fn from_fetch(outcome: LoaderResult<Option<Value>>) -> Self {
        match outcome {
            Ok(None) | Ok(Some(Value::Null)) => Self::Empty,
            Ok(Some(document)) => match ContentItem::from_value(document) {
                Ok(item) => Self::Ready(item),
                Err(err) => Self::Error(LoaderError::Decode(err.to_string())),
            },
            Err(err) => Self::Error(err),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Empty => "empty",
            Self::Error(_) => "error",
        }
    }

    /// `Ready`, `Empty` or `Error`.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Empty | Self::Error(_))
    }

    pub fn content(&self) -> Option<&ContentItem> {
        match self {
            Self::Ready(item) => Some(item),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoaderError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}
