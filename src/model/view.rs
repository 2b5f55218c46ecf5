use serde::Serialize;

/// A refreshed model as seen by renderers.
///
/// A failed refresh degrades the slot to `Unavailable` instead of failing
/// the consultation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ViewSlot<T> {
    /// Nothing fetched yet in this session.
    NotLoaded,
    Ready(T),
    Unavailable { reason: String },
}

impl<T> Default for ViewSlot<T> {
    fn default() -> Self {
        ViewSlot::NotLoaded
    }
}

impl<T> ViewSlot<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => ViewSlot::Ready(value),
            Err(e) => ViewSlot::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewSlot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ViewSlot::Unavailable { .. })
    }
}
