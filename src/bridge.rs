//! Routing of script messages to registered native endpoints.
//!
//! Script messages are fire-and-forget notifications from the embedded
//! content: a single synchronous dispatch per message, no retry, no reply
//! channel. Handlers answer back, if at all, by commanding the view to run
//! script.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::value::ScriptValue;

pub type Endpoint = Box<dyn FnMut(&ScriptValue)>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("message is not a mapping")]
    NotAMapping,
    #[error("message has no \"name\" field")]
    MissingName,
    #[error("message \"name\" is not a string")]
    NameNotText,
    #[error("message has no \"content\" field")]
    MissingContent,
    #[error("no endpoint registered for {0:?}")]
    UnknownEndpoint(String),
}

/// A parsed script message: dispatch key plus opaque payload.
pub struct ScriptMessage<'a> {
    pub name: &'a str,
    pub content: &'a ScriptValue,
}

impl<'a> ScriptMessage<'a> {
    /// Requires a mapping with a string `"name"` and a `"content"` value.
    pub fn parse(message: &'a ScriptValue) -> Result<Self, DispatchError> {
        let entries = message.as_map().ok_or(DispatchError::NotAMapping)?;
        let name = entries.get("name").ok_or(DispatchError::MissingName)?;
        let name = name.as_text().ok_or(DispatchError::NameNotText)?;
        let content = entries.get("content").ok_or(DispatchError::MissingContent)?;
        Ok(Self { name, content })
    }
}

/// Named message handlers, owned by the application host and mutated only
/// during host setup. Registering a name twice keeps the newest handler.
#[derive(Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<String, Endpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        endpoint: impl FnMut(&ScriptValue) + 'static,
    ) {
        self.endpoints.insert(name.into(), Box::new(endpoint));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Parses `message`, looks up its endpoint and invokes it with the
    /// payload. Malformed messages and unknown names are handled failures:
    /// logged, `false`, never a panic. Handler-internal failures are the
    /// handler's own contract and are not intercepted here.
    pub fn dispatch(&mut self, message: &ScriptValue) -> bool {
        match self.try_dispatch(message) {
            Ok(()) => true,
            Err(err) => {
                warn!("bad script call ({err}): {}", message.to_json());
                false
            }
        }
    }

    fn try_dispatch(&mut self, message: &ScriptValue) -> Result<(), DispatchError> {
        let parsed = ScriptMessage::parse(message)?;
        let endpoint = self
            .endpoints
            .get_mut(parsed.name)
            .ok_or_else(|| DispatchError::UnknownEndpoint(parsed.name.to_string()))?;
        endpoint(parsed.content);
        Ok(())
    }
}
