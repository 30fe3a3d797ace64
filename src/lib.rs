//! Packet-glue core for a mesh overlay node.
//!
//! Wires the boundary collaborators a node embeds this crate alongside
//! (switch fabric, peer-to-peer crypto, content-layer crypto, tunnel
//! device, routing module) into a single [`dispatcher::Dispatcher`] that
//! moves frames between them. See [`register::register`] for the usual
//! entry point.

pub mod address;
pub mod config;
pub mod content_session;
pub mod context;
pub mod crypto;
pub mod demo_crypto;
pub mod dispatcher;
pub mod errors;
pub mod frame;
pub mod ipv6;
pub mod logging;
pub mod outer_session;
pub mod register;
pub mod router;
pub mod switch;
pub mod tunnel;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
