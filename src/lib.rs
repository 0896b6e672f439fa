//! Source-transformation layer for a compile-on-demand test pipeline.
//!
//! For each requested file the [`Dispatcher`](dispatch::Dispatcher) picks one
//! of three routes: a fast bundler for third-party plain-JS code, an inert
//! module wrap for standalone template/stylesheet resources, or the full
//! compiler followed by the decorator-downleveling post-pass. The post-pass
//! recovers constructor-parameter and property metadata from the original
//! TypeScript source and appends `ctorParameters` / `propDecorators`
//! assignments so the runtime injector can work without a framework compiler.
//!
//! Diagnostics are off by default; set `NG_JEST_LOG` (a tracing target
//! selector) and call [`diagnostics::init`] to enable them.

pub mod backends;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod downlevel;
pub mod error;
pub mod postprocess;
pub mod preprocess;

pub use backends::{
    BackendCapabilities, BundleOptions, BundlerBackend, CompileOptions, CompilerBackend,
    CompiledUnit,
};
pub use config::{EcmaTarget, ModuleFormat, TransformConfig};
pub use dispatch::{Dispatcher, TransformedSource};
pub use downlevel::downlevel_decorators;
pub use error::TransformError;
pub use postprocess::make_exports_configurable;
pub use preprocess::preprocess_file_content;
