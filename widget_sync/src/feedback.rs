use types::{EVENT_FIELD, EVENT_TARGET_FIELD, feedback_key};

/// Event raised by the client alongside its feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEvent {
    pub target: String,
    pub name: String,
}

/// A decoded postback: feedback fields in arrival order plus the optional
/// event that triggered the round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Postback {
    pub event: Option<ClientEvent>,
    pub fields: Vec<(String, String)>,
}

impl Postback {
    /// Separate the reserved event fields from the feedback fields,
    /// preserving the order of the latter.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut target = None;
        let mut name = None;
        let mut feedback = Vec::new();

        for (key, value) in fields {
            let key = key.into();
            let value = value.into();

            match key.as_str() {
                EVENT_TARGET_FIELD => target = Some(value),
                EVENT_FIELD => name = Some(value),
                _ => feedback.push((key, value)),
            }
        }

        let event = match (target, name) {
            (Some(target), Some(name)) if !target.is_empty() => {
                Some(ClientEvent { target, name })
            }
            (Some(target), None) => {
                tracing::warn!("postback names {target} without an event");
                None
            }
            _ => None,
        };

        Self {
            event,
            fields: feedback,
        }
    }
}

/// Builds postback field lists in the wire format. Used by client code
/// and tests.
#[derive(Debug, Clone, Default)]
pub struct PostbackBuilder {
    fields: Vec<(String, String)>,
}

impl PostbackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn feedback(
        mut self,
        widget_id: &str,
        internal_field: &str,
        value: impl Into<String>,
    ) -> Self {
        self.fields
            .push((feedback_key(widget_id, internal_field), value.into()));
        self
    }

    /// A raw key/value pair, e.g. ordinary form input.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn event(mut self, target: &str, name: &str) -> Self {
        self.fields
            .push((EVENT_TARGET_FIELD.to_string(), target.to_string()));
        self.fields.push((EVENT_FIELD.to_string(), name.to_string()));
        self
    }

    pub fn build(self) -> Vec<(String, String)> {
        self.fields
    }
}
