//! Rill: an embeddable expression and configuration language.
//!
//! Hosts either compile units into a [`Runtime`] and read the variables of
//! its exported libraries:
//!
//! ```text
//! let load_path = LoadPath::new().with(MemoryLocation::new().add(
//!     "main",
//!     "export library config { port: 8000 + 80; }",
//! ));
//! let runtime = rill::compile(&load_path, &["main"], rill::noop_handler())?;
//! assert_eq!(runtime.get("main", "config", "port")?, Value::Long(8080));
//! ```
//!
//! or evaluate a single expression with [`evaluate_expression`].
//!
//! Native functions (`via "name"` bodies) are resolved against a
//! [`NativeRegistry`]. Whether a unit may use them is decided by the load
//! location it came from, or by the caller for standalone expressions.

mod compile;
mod error;
pub mod load;
mod runtime;

pub use compile::{CompileOptions, Compiler, EXPRESSION_UNIT};
pub use error::{Error, RuntimeError};
pub use load::{FilesystemLocation, LoadLocation, LoadPath, LoadedUnit, MemoryLocation};
pub use runtime::{LibraryRef, ModuleRef, QualifiedName, Runtime, VarRef};

pub use rill_analysis::Metadata;
pub use rill_diagnostic::{CompileError, Diagnostic, ErrorCode, LoadError};
pub use rill_eval::{
    noop_handler, CancellableDebugHandler, DebugHandler, Interrupt, NativeFunction,
    NativeRegistry, NoopDebugHandler, RecordingDebugHandler, SharedDebugHandler,
    TracingDebugHandler, DEFAULT_MAX_CALL_DEPTH,
};
pub use rill_ir::{ConstValue, SourceLocation, Span, TypeName};
pub use rill_value::{EvalError, EvalErrorKind, NativeError, Value};

use std::sync::Once;

/// Compile the units at `paths`, and everything they import, into one
/// runtime using the default native registry.
pub fn compile(
    load_path: &LoadPath,
    paths: &[&str],
    debug_handler: SharedDebugHandler,
) -> Result<Runtime, CompileError> {
    Compiler::new()
        .debug_handler(debug_handler)
        .compile(load_path, paths)
}

/// Evaluate a standalone expression. With `allow_native_functions` unset,
/// any `via` function in `text` is rejected.
pub fn evaluate_expression(text: &str, allow_native_functions: bool) -> Result<Value, Error> {
    Compiler::new().evaluate(text, allow_native_functions)
}

/// Like [`evaluate_expression`] with explicit pipeline options.
pub fn evaluate_expression_with(
    text: &str,
    allow_native_functions: bool,
    options: &CompileOptions,
) -> Result<Value, Error> {
    Compiler::new()
        .options(*options)
        .evaluate(text, allow_native_functions)
}

/// Evaluate a standalone expression with native functions allowed.
pub fn eval(text: &str) -> Result<Value, Error> {
    evaluate_expression(text, true)
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, or when the host already
/// installed a subscriber. Safe to call more than once.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{fmt, EnvFilter};

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .with(EnvFilter::from_default_env())
            .try_init();
    });
}
