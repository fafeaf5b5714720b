//! Baking declarative joins into a generated API client.
//!
//! The generator emits a client whose methods accept a `join` option at
//! request time and whose payloads carry unresolved reference markers.
//! This crate post-processes that module at build time: [`inspect`]
//! reports which methods are join-capable and what each join could
//! select, the caller answers with a [`JoinConfig`], [`transform`]
//! rewrites the module so the selection is baked into signatures and
//! request bodies, and [`Emit`] renders the result back to source text.
//! [`generate_client`] runs the whole pipeline in one call.

pub mod ast;
pub mod config;
pub mod emit;
pub mod inspect;
pub mod transform;
pub mod util;
pub mod visit;

use thiserror::Error;
use tracing::debug;

// Re-export what a build script needs.
pub use ast::Module;
pub use config::{Join, JoinConfig, Method};
pub use emit::Emit;
pub use inspect::inspect;
pub use transform::transform;

/// Errors raised while rewriting a client module.
///
/// The input is machine-generated, so only one shape is treated as
/// unrecoverable.
#[derive(Debug, Error)]
pub enum Error {
    /// A property name the rewrite must treat as a plain identifier was
    /// a quoted string.
    #[error("expected a plain identifier, found \"{0}\"")]
    ExpectedIdent(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Run the full pipeline over a parsed module: inspect it, let the
/// caller turn the report into a configuration, rewrite, and emit.
pub fn generate_client<F>(module: Module, select: F) -> Result<String>
where
    F: FnOnce(Vec<Method>) -> JoinConfig,
{
    let methods = inspect(&module)?;
    let config = select(methods);
    let module = transform(module, &config)?;
    debug!("emitting rewritten module");
    Ok(module.emit())
}
