use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lookingglass::host::{ViewCommands, WebHost};
use lookingglass::resources::{ResourceRequest, ResourceResolver, ResourceResponse};
use lookingglass::value::ScriptValue;
use lookingglass::{EndpointRegistry, ShellConfig};

/// Demo host: serves a bundled page over `local://` and exposes a `print`
/// endpoint that logs its first argument.
struct LookingGlassHost {
    endpoints: EndpointRegistry,
    resolver: ResourceResolver,
    heartbeat: Option<lookingglass::timers::Timer>,
}

impl LookingGlassHost {
    fn new(config: &ShellConfig) -> Self {
        let mut endpoints = EndpointRegistry::new();
        endpoints.register("print", |content: &ScriptValue| {
            let text = content
                .as_list()
                .and_then(|args| args.first())
                .and_then(ScriptValue::as_text)
                .unwrap_or("<no text>");
            info!("page: {text}");
        });
        let resolver = ResourceResolver::new(&config.scheme, &config.resource_root)
            .with_fallback_type(&config.content_type_fallback);
        Self {
            endpoints,
            resolver,
            heartbeat: None,
        }
    }
}

impl WebHost for LookingGlassHost {
    fn window_title(&self) -> String {
        "LookingGlass - Test App".to_string()
    }

    fn on_start(&mut self, view: &dyn ViewCommands) {
        view.load_url("local://index.html");
        let mut beats = 0u32;
        self.heartbeat = Some(view.make_timer(
            Duration::from_secs(30),
            Box::new(move || {
                beats += 1;
                info!("heartbeat {beats}");
            }),
        ));
    }

    fn on_script_message(&mut self, _view: &dyn ViewCommands, message: ScriptValue) -> bool {
        self.endpoints.dispatch(&message)
    }

    fn on_url_request(&mut self, request: &ResourceRequest) -> Option<ResourceResponse> {
        self.resolver.resolve(request)
    }
}

fn main() -> anyhow::Result<()> {
    if tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init()
        .is_err()
    {
        warn!("logging already initialized");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let _guard = runtime.enter();

    let config_path = std::env::var_os("LOOKINGGLASS_CONFIG").map(PathBuf::from);
    let mut config = ShellConfig::load(config_path.as_deref())
        .context("failed to load configuration")?;

    if let Some(root) = std::env::args().nth(1) {
        config = config.with_resource_root(root);
    } else if let Some(root) = std::env::var_os("LOOKINGGLASS_APP_ROOT") {
        config = config.with_resource_root(root);
    }
    info!(root = %config.resource_root.display(), scheme = %config.scheme, "starting shell");

    let host = LookingGlassHost::new(&config);
    lookingglass::shell::run(host, config)?;
    Ok(())
}
