//! Live reload.
//!
//! Watches the source file, re-renders it on change, and fans the literal
//! `"reload"` message out to every connected WebSocket client.
//!
//! # Modules
//!
//! - `debouncer` - coalesces bursts of filesystem events
//! - `registry` - subscriber bookkeeping and notification fan-out
//! - `script` - browser-side bootstrap block
//! - `watcher` - file watching and the re-render consumer task
//! - `websocket` - the `/ws` connection handler

mod debouncer;
mod registry;
mod script;
mod watcher;
mod websocket;

pub(crate) use registry::SubscriberRegistry;
pub(crate) use script::bootstrap_script;
pub(crate) use watcher::spawn_watcher;
pub(crate) use websocket::ws_handler;

/// Payload delivered to browsers after each successful re-render.
pub(crate) const RELOAD_MESSAGE: &str = "reload";
