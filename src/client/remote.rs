use serde::Serialize;

use crate::client::api::ClientError;

/// Lifecycle of one remote value.
///
/// `Loading` while a request is in flight, then `Ready` or `Failed`.
/// A failed fetch reads as "no data": callers surface the reason themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum RemoteData<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for RemoteData<T> {
    fn default() -> Self {
        RemoteData::Idle
    }
}

impl<T> RemoteData<T> {
    pub fn settle(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => RemoteData::Ready(value),
            Err(e) => RemoteData::Failed(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RemoteData::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            RemoteData::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RemoteData::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T> RemoteData<Vec<T>> {
    /// The list, or an empty slice unless ready.
    pub fn items(&self) -> &[T] {
        self.ready().map(Vec::as_slice).unwrap_or(&[])
    }
}
