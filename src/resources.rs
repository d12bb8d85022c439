//! Resolution of custom-scheme resource requests against an application
//! resource root.
//!
//! Every request performs a fresh synchronous read: no caching, no range or
//! conditional responses. Reads are assumed fast (local files); a slow read
//! stalls the UI thread.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// One per inbound resource-fetch event; stateless beyond the single
/// request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub path: String,
}

/// Resource bytes plus a content-type label. Absence signals "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResponse {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Maps `<scheme>://<relative-path>` requests onto files under a
/// host-supplied root directory.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    scheme_prefix: String,
    root: PathBuf,
    fallback_type: String,
}

impl ResourceResolver {
    pub fn new(scheme: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            scheme_prefix: format!("{scheme}://"),
            root: root.into(),
            fallback_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Content type used when the resource's extension is not recognized.
    pub fn with_fallback_type(mut self, content_type: impl Into<String>) -> Self {
        self.fallback_type = content_type.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a request to resource bytes and a content type, or `None`
    /// when the resource is missing, unreadable, or escapes the root.
    pub fn resolve(&self, request: &ResourceRequest) -> Option<ResourceResponse> {
        let relative = self.relative_name(&request.path)?;
        let path = self.root.join(relative);
        debug!("resource request: {}", path.display());

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("resource read failed for {}: {err}", path.display());
                return None;
            }
        };

        let content_type = mime_guess::from_path(&path)
            .first_raw()
            .map(str::to_owned)
            .unwrap_or_else(|| self.fallback_type.clone());

        Some(ResourceResponse {
            content_type,
            bytes,
        })
    }

    /// Strips the scheme prefix, percent-decodes, drops query/fragment, and
    /// rejects names whose components would escape the root.
    fn relative_name(&self, raw: &str) -> Option<PathBuf> {
        let stripped = raw
            .strip_prefix(&self.scheme_prefix)
            .unwrap_or(raw)
            .trim_start_matches('/');
        let decoded = percent_decode_str(stripped).decode_utf8().ok()?;
        let name = decoded
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string();

        let mut clean = PathBuf::new();
        for component in Path::new(&name).components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => {
                    warn!("rejecting resource path escaping the root: {raw:?}");
                    return None;
                }
            }
        }

        if clean.as_os_str().is_empty() {
            None
        } else {
            Some(clean)
        }
    }
}
