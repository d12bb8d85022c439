//! The contract between the shell and an embedding application.
//!
//! The portable side: hosts implement [`WebHost`] and receive toolkit events
//! already converted to neutral types; the shell hands them a
//! [`ViewCommands`] capability set for the reverse direction. Neither trait
//! mentions a toolkit type, so hosts are testable without a window.

use std::time::Duration;

use crate::dispatch::UiDispatcher;
use crate::resources::{ResourceRequest, ResourceResponse};
use crate::timers::Timer;
use crate::value::ScriptValue;

/// Webview feature flags, supplied once before the view is created and
/// immutable afterwards. Defaults mirror the shipped application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    pub minimum_font_size: f32,
    pub should_print_backgrounds: bool,
    pub tab_focuses_links: bool,
    pub text_interaction_enabled: bool,
    pub element_fullscreen_enabled: bool,
    pub scripts_can_open_windows: bool,
    pub fraud_warnings_enabled: bool,
    pub inspectable: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            minimum_font_size: 22.0,
            should_print_backgrounds: false,
            tab_focuses_links: false,
            text_interaction_enabled: false,
            element_fullscreen_enabled: true,
            scripts_can_open_windows: true,
            fraud_warnings_enabled: false,
            inspectable: true,
        }
    }
}

/// Commands a host may issue against the embedded view and its UI thread.
pub trait ViewCommands {
    /// Navigates the view to `url`.
    fn load_url(&self, url: &str);

    /// Loads inline content directly, without a navigation.
    fn load_html(&self, html: &str);

    /// Runs arbitrary script inside the view.
    fn evaluate(&self, script: &str);

    /// Dispatcher that marshals callbacks from any thread onto the UI
    /// thread.
    fn dispatcher(&self) -> UiDispatcher;

    /// Creates a repeating timer whose callback runs on the UI thread.
    fn make_timer(&self, interval: Duration, callback: Box<dyn FnMut() + 'static>) -> Timer;
}

/// The interface an embedding application implements.
pub trait WebHost {
    /// Queried once, at window creation.
    fn window_title(&self) -> String;

    /// Queried once, when the view is configured.
    fn preferences(&self) -> Preferences {
        Preferences::default()
    }

    /// Invoked once after window and view are constructed and visible.
    /// Typically triggers the initial navigation.
    fn on_start(&mut self, view: &dyn ViewCommands);

    /// A script message arrived from the embedded content. Returns whether
    /// it was handled; commonly delegates to an
    /// [`EndpointRegistry`](crate::bridge::EndpointRegistry).
    fn on_script_message(&mut self, view: &dyn ViewCommands, message: ScriptValue) -> bool;

    /// A custom-scheme resource request. `None` turns into a 404; commonly
    /// delegates to a [`ResourceResolver`](crate::resources::ResourceResolver).
    fn on_url_request(&mut self, request: &ResourceRequest) -> Option<ResourceResponse>;
}
