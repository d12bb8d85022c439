//! The toolkit side: window and webview construction, the event loop, and
//! the glue that routes toolkit events into a [`WebHost`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tao::dpi::LogicalSize;
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tao::window::WindowBuilder;
use tracing::{debug, error, warn};
use wry::http::{header::CONTENT_TYPE, Response, StatusCode};
use wry::{WebView, WebViewBuilder};

use crate::config::ShellConfig;
use crate::convert::to_script_value;
use crate::dispatch::{UiDispatcher, UiJobQueue};
use crate::host::{Preferences, ViewCommands, WebHost};
use crate::resources::ResourceRequest;
use crate::timers::{Timer, TimerId, TimerRegistry};

/// Events delivered to the UI thread from other threads or from the view.
#[derive(Debug)]
pub enum ShellEvent {
    /// Raw IPC body posted by page content.
    ScriptMessage(String),
    /// The dispatcher has queued jobs to run.
    Wake,
    /// A repeating timer elapsed.
    TimerTick(TimerId),
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("failed to create window: {0}")]
    Window(#[from] tao::error::OsError),
    #[error("failed to create webview: {0}")]
    WebView(#[from] wry::Error),
}

/// Live view capabilities handed to the host. Cheap to clone into the host
/// callbacks; everything here lives on the UI thread.
pub struct ViewHandle {
    webview: Rc<WebView>,
    dispatcher: UiDispatcher,
    timers: Rc<RefCell<TimerRegistry>>,
}

impl ViewCommands for ViewHandle {
    fn load_url(&self, url: &str) {
        if let Err(err) = self.webview.load_url(url) {
            warn!("load_url failed: {err}");
        }
    }

    fn load_html(&self, html: &str) {
        if let Err(err) = self.webview.load_html(html) {
            warn!("load_html failed: {err}");
        }
    }

    fn evaluate(&self, script: &str) {
        if let Err(err) = self.webview.evaluate_script(script) {
            warn!("evaluate failed: {err}");
        }
    }

    fn dispatcher(&self) -> UiDispatcher {
        self.dispatcher.clone()
    }

    fn make_timer(&self, interval: Duration, callback: Box<dyn FnMut() + 'static>) -> Timer {
        TimerRegistry::start(&self.timers, interval, callback)
    }
}

/// Devtools require both the shell config and the host to opt in.
fn devtools_enabled(config: &ShellConfig, prefs: &Preferences) -> bool {
    config.devtools && prefs.inspectable
}

fn http_response(
    status: StatusCode,
    content_type: &str,
    bytes: Vec<u8>,
) -> Response<std::borrow::Cow<'static, [u8]>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(std::borrow::Cow::Owned(bytes))
        .unwrap_or_else(|err| {
            error!("failed to build resource response: {err}");
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(std::borrow::Cow::Borrowed(&[][..]))
                .expect("empty response")
        })
}

/// Script injected before page content runs. Installs the message channel
/// under the configured name and tags values JSON cannot carry so the
/// native side can tell them apart.
fn bootstrap_script(channel: &str) -> String {
    format!(
        r#"(function () {{
  function tag(value) {{
    if (value instanceof Date) return {{ "__lg_date": value.getTime() }};
    var kind = typeof value;
    if (kind === "function" || kind === "symbol" || kind === "undefined")
      return {{ "__lg_unsupported": kind }};
    return value;
  }}
  window["{channel}"] = {{
    postMessage: function (body) {{
      var encoded = JSON.stringify(tag(body), function (key, value) {{
        return key === "" ? value : tag(this[key]);
      }});
      window.ipc.postMessage(encoded === undefined ? "null" : encoded);
    }}
  }};
}})();"#
    )
}

/// Builds the window and webview, then runs the event loop until the window
/// closes. Does not return.
pub fn run<H: WebHost + 'static>(host: H, config: ShellConfig) -> Result<(), ShellError> {
    let event_loop = EventLoopBuilder::<ShellEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = WindowBuilder::new()
        .with_title(host.window_title())
        .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
        .with_min_inner_size(LogicalSize::new(400.0, 300.0))
        .build(&event_loop)?;

    // wry has no knobs for minimum_font_size, should_print_backgrounds,
    // tab_focuses_links, text_interaction_enabled,
    // element_fullscreen_enabled or fraud_warnings_enabled; those flags are
    // recorded in the log only. inspectable and scripts_can_open_windows
    // are applied below.
    let prefs = host.preferences();
    debug!(?prefs, "view preferences");
    let allow_new_windows = prefs.scripts_can_open_windows;

    let host = Rc::new(RefCell::new(host));

    let wake_proxy = proxy.clone();
    let (dispatcher, mut job_queue): (UiDispatcher, UiJobQueue) =
        UiDispatcher::new(move || {
            let _ = wake_proxy.send_event(ShellEvent::Wake);
        });

    let tick_proxy = proxy.clone();
    let timers = Rc::new(RefCell::new(TimerRegistry::new(move |id| {
        let _ = tick_proxy.send_event(ShellEvent::TimerTick(id));
    })));

    let ipc_proxy = proxy.clone();
    let request_host = Rc::clone(&host);
    let webview = WebViewBuilder::new()
        .with_initialization_script(&bootstrap_script(&config.channel))
        .with_ipc_handler(move |request: wry::http::Request<String>| {
            let _ = ipc_proxy.send_event(ShellEvent::ScriptMessage(request.into_body()));
        })
        .with_custom_protocol(config.scheme.clone(), move |_ctx, request| {
            let resource = ResourceRequest {
                path: request.uri().to_string(),
            };
            match request_host.borrow_mut().on_url_request(&resource) {
                Some(response) => {
                    http_response(StatusCode::OK, &response.content_type, response.bytes)
                }
                None => {
                    warn!(path = %resource.path, "unresolved resource request");
                    http_response(StatusCode::NOT_FOUND, "text/plain", Vec::new())
                }
            }
        })
        .with_new_window_req_handler(move |url: String| {
            if !allow_new_windows {
                warn!(%url, "blocked script-initiated window");
            }
            allow_new_windows
        })
        .with_devtools(devtools_enabled(&config, &prefs))
        .build(&window)?;

    let view = ViewHandle {
        webview: Rc::new(webview),
        dispatcher,
        timers: Rc::clone(&timers),
    };

    event_loop.run(move |event, _target, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::NewEvents(StartCause::Init) => {
                host.borrow_mut().on_start(&view);
            }
            Event::UserEvent(ShellEvent::ScriptMessage(raw)) => {
                match serde_json::from_str(&raw) {
                    Ok(json) => {
                        let message = to_script_value(&json);
                        host.borrow_mut().on_script_message(&view, message);
                    }
                    Err(err) => warn!("discarding malformed script message: {err}"),
                }
            }
            Event::UserEvent(ShellEvent::Wake) => {
                job_queue.run_pending();
            }
            Event::UserEvent(ShellEvent::TimerTick(id)) => {
                TimerRegistry::fire(&timers, id);
            }
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                window_id,
                ..
            } if window_id == window.id() => {
                timers.borrow_mut().clear_all();
                *control_flow = ControlFlow::Exit;
            }
            _ => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_installs_named_channel() {
        let script = bootstrap_script("local");
        assert!(script.contains(r#"window["local"]"#));
        assert!(script.contains("postMessage"));
    }

    #[test]
    fn bootstrap_tags_dates_and_unsupported_kinds() {
        let script = bootstrap_script("local");
        assert!(script.contains("__lg_date"));
        assert!(script.contains("__lg_unsupported"));
    }

    #[test]
    fn host_preferences_gate_devtools() {
        let config = ShellConfig::default();
        assert!(config.devtools);

        let opted_out = Preferences {
            inspectable: false,
            ..Preferences::default()
        };
        assert!(!devtools_enabled(&config, &opted_out));
        assert!(devtools_enabled(&config, &Preferences::default()));

        let mut config = config;
        config.devtools = false;
        assert!(!devtools_enabled(&config, &Preferences::default()));
    }

    #[test]
    fn not_found_response_is_plain_text() {
        let response = http_response(StatusCode::NOT_FOUND, "text/plain", Vec::new());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }
}
