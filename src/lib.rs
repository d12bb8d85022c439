pub mod bridge;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod host;
pub mod resources;
pub mod shell;
pub mod timers;
pub mod value;

pub use bridge::EndpointRegistry;
pub use config::ShellConfig;
pub use host::{Preferences, ViewCommands, WebHost};
pub use resources::{ResourceRequest, ResourceResolver, ResourceResponse};
pub use value::ScriptValue;
