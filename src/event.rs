use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a log call site or a synthetic event.
///
/// Two ids are equal when their numeric `id` matches; `name` is descriptive only.
#[derive(Debug, Clone, Serialize)]
pub struct EventId {
    pub id: i32,
    pub name: Option<Cow<'static, str>>,
}

impl EventId {
    pub const fn new(id: i32) -> Self {
        EventId { id, name: None }
    }

    pub fn named(id: i32, name: impl Into<Cow<'static, str>>) -> Self {
        EventId { id, name: Some(name.into()) }
    }
}

impl PartialEq for EventId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventId {}

impl Hash for EventId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialEq<i32> for EventId {
    fn eq(&self, other: &i32) -> bool {
        self.id == *other
    }
}

impl Default for EventId {
    fn default() -> Self {
        EventId::new(0)
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        EventId::new(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Recorded when a capturing logger opens a scope.
pub const BEGIN_SCOPE_EVENT_ID: EventId = EventId {
    id: -583_254_972,
    name: Some(Cow::Borrowed("BeginScope")),
};

/// Recorded when the guard returned for a scope is closed.
pub const END_SCOPE_EVENT_ID: EventId = EventId {
    id: -505_448_997,
    name: Some(Cow::Borrowed("EndScope")),
};
