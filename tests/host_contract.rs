//! End-to-end checks of the host contract against a fake view: raw script
//! messages are converted, dispatched, and resolved the same way the shell
//! does it, but without a window.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use lookingglass::convert::to_script_value;
use lookingglass::dispatch::{UiDispatcher, UiJobQueue};
use lookingglass::host::ViewCommands;
use lookingglass::resources::{ResourceRequest, ResourceResolver};
use lookingglass::timers::{Timer, TimerRegistry};
use lookingglass::value::ScriptValue;
use lookingglass::EndpointRegistry;

#[derive(Default)]
struct ViewLog {
    loaded_urls: Vec<String>,
    evaluated: Vec<String>,
}

struct FakeView {
    log: Rc<RefCell<ViewLog>>,
    dispatcher: UiDispatcher,
    timers: Rc<RefCell<TimerRegistry>>,
}

impl FakeView {
    fn new() -> (Self, UiJobQueue) {
        let (dispatcher, queue) = UiDispatcher::new(|| {});
        let timers = Rc::new(RefCell::new(TimerRegistry::new(|_| {})));
        let view = Self {
            log: Rc::new(RefCell::new(ViewLog::default())),
            dispatcher,
            timers,
        };
        (view, queue)
    }
}

impl ViewCommands for FakeView {
    fn load_url(&self, url: &str) {
        self.log.borrow_mut().loaded_urls.push(url.to_string());
    }

    fn load_html(&self, html: &str) {
        self.log.borrow_mut().loaded_urls.push(html.to_string());
    }

    fn evaluate(&self, script: &str) {
        self.log.borrow_mut().evaluated.push(script.to_string());
    }

    fn dispatcher(&self) -> UiDispatcher {
        self.dispatcher.clone()
    }

    fn make_timer(&self, interval: Duration, callback: Box<dyn FnMut() + 'static>) -> Timer {
        TimerRegistry::start(&self.timers, interval, callback)
    }
}

fn parse_raw(raw: &str) -> ScriptValue {
    let json: serde_json::Value = serde_json::from_str(raw).unwrap();
    to_script_value(&json)
}

#[test]
fn raw_ipc_body_reaches_registered_endpoint() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut endpoints = EndpointRegistry::new();
    let sink = Rc::clone(&seen);
    endpoints.register("print", move |content: &ScriptValue| {
        let text = content
            .as_list()
            .and_then(|args| args.first())
            .and_then(ScriptValue::as_text)
            .unwrap_or_default()
            .to_string();
        sink.borrow_mut().push(text);
    });

    let message = parse_raw(r#"{"name":"print","content":["onload"]}"#);
    assert!(endpoints.dispatch(&message));
    assert_eq!(seen.borrow().as_slice(), ["onload".to_string()]);
}

#[test]
fn unknown_endpoint_is_reported_not_fatal() {
    let mut endpoints = EndpointRegistry::new();
    let message = parse_raw(r#"{"name":"missing","content":null}"#);
    assert!(!endpoints.dispatch(&message));
}

#[tokio::test]
async fn endpoint_can_command_the_view_back() {
    let (view, _queue) = FakeView::new();
    let log = Rc::clone(&view.log);

    let mut endpoints = EndpointRegistry::new();
    endpoints.register("navigate", move |content: &ScriptValue| {
        if let Some(url) = content.as_text() {
            view.load_url(url);
        }
    });

    let message = parse_raw(r#"{"name":"navigate","content":"local://next.html"}"#);
    assert!(endpoints.dispatch(&message));
    assert_eq!(
        log.borrow().loaded_urls.as_slice(),
        ["local://next.html".to_string()]
    );
}

#[test]
fn resolver_serves_files_under_the_root() {
    let root = tempfile::TempDir::new().unwrap();
    let mut page = std::fs::File::create(root.path().join("index.html")).unwrap();
    page.write_all(b"<h1>hi</h1>").unwrap();

    let resolver = ResourceResolver::new("local", root.path());
    let response = resolver
        .resolve(&ResourceRequest {
            path: "local://index.html".to_string(),
        })
        .unwrap();
    assert_eq!(response.content_type, "text/html");
    assert_eq!(response.bytes, b"<h1>hi</h1>");

    let escape = resolver.resolve(&ResourceRequest {
        path: "local://../secret.txt".to_string(),
    });
    assert!(escape.is_none());
}

#[tokio::test]
async fn dispatched_jobs_run_deferred_and_in_order() {
    let (view, mut queue) = FakeView::new();
    let (tx, rx) = std::sync::mpsc::channel::<&'static str>();

    for label in ["first", "second", "third"] {
        let tx = tx.clone();
        view.dispatcher().dispatch(move || {
            let _ = tx.send(label);
        });
    }
    assert!(rx.try_recv().is_err(), "jobs must not run at dispatch time");

    assert_eq!(queue.run_pending(), 3);
    let order: Vec<_> = rx.try_iter().collect();
    assert_eq!(order, ["first", "second", "third"]);
}
