use std::process::Command;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::{EcmaTarget, ModuleFormat};
use crate::error::TransformError;

/// Output of either backend: executable code plus an optional source map.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub code: String,
    pub map: Option<String>,
}

/// Options handed to the full compiler backend.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub target: EcmaTarget,
    pub source_map: bool,
    pub module_format: ModuleFormat,
}

/// Options handed to the fast bundler backend.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub format: ModuleFormat,
    pub target: EcmaTarget,
    pub source_map: bool,
    pub source_file: String,
}

/// The full, type-aware compiler. Receives preprocessed source (templates
/// inlined, style keys normalized) and may or may not keep type annotations
/// in its output; the downleveling post-pass never relies on them.
pub trait CompilerBackend {
    fn compile(
        &self,
        source: &str,
        path: &str,
        options: &CompileOptions,
    ) -> Result<CompiledUnit, TransformError>;
}

/// The fast bundler. Invoked only on already-plain-JS input; performs module
/// format conversion and downleveling of syntax, never of decorators.
pub trait BundlerBackend {
    fn transform(&self, source: &str, options: &BundleOptions) -> Result<CompiledUnit, TransformError>;
}

/// Result of probing whether a native fast-bundler binary is usable in this
/// environment. Injected into the dispatcher rather than read from ambient
/// process state, so tests can force either value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub native_bundler: bool,
}

static PROBE_RESULT: OnceCell<BackendCapabilities> = OnceCell::new();

impl BackendCapabilities {
    pub fn native() -> Self {
        BackendCapabilities { native_bundler: true }
    }

    pub fn portable() -> Self {
        BackendCapabilities { native_bundler: false }
    }

    /// Spawn `program args...` and report whether it exited successfully.
    /// Probe failure is never an error; it selects the portable fallback.
    pub fn probe(program: &str, args: &[&str]) -> Self {
        let usable = match Command::new(program).args(args).output() {
            Ok(output) => output.status.success(),
            Err(err) => {
                debug!(program, error = %err, "native bundler probe failed to spawn");
                false
            }
        };
        if !usable {
            debug!(program, "native bundler unusable, selecting portable fallback");
        }
        BackendCapabilities { native_bundler: usable }
    }

    /// Probe at most once per process; concurrent first calls may race, which
    /// is acceptable since both arrive at the same value.
    pub fn probe_cached(program: &str, args: &[&str]) -> Self {
        *PROBE_RESULT.get_or_init(|| Self::probe(program, args))
    }
}
