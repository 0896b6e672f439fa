use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::backends::{
    BackendCapabilities, BundleOptions, BundlerBackend, CompileOptions, CompilerBackend,
};
use crate::config::{ModuleFormat, TransformConfig};
use crate::downlevel::downlevel_decorators;
use crate::error::TransformError;
use crate::postprocess::make_exports_configurable;
use crate::preprocess::{escape_template_text, preprocess_file_content};

/// Final result of a per-file transform.
#[derive(Debug, Clone)]
pub struct TransformedSource {
    pub code: String,
    pub map: Option<String>,
}

const RESOURCE_EXTENSIONS: &[&str] = &["html", "htm", "css", "scss", "sass", "less"];

fn is_resource_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| RESOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Top-level entry point: selects exactly one backend per file, applies the
/// resource preprocessor where applicable and runs the decorator-downleveling
/// post-pass on the full-compiler path. Holds no mutable state; a single
/// dispatcher serves concurrent per-file transforms.
pub struct Dispatcher {
    config: TransformConfig,
    bundler_allow_list: GlobSet,
    compiler: Box<dyn CompilerBackend + Send + Sync>,
    bundler: Box<dyn BundlerBackend + Send + Sync>,
}

impl Dispatcher {
    pub fn new(
        config: TransformConfig,
        compiler: Box<dyn CompilerBackend + Send + Sync>,
        bundler: Box<dyn BundlerBackend + Send + Sync>,
    ) -> Result<Self, TransformError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.bundler_paths {
            builder.add(Glob::new(pattern)?);
        }
        let bundler_allow_list = builder.build()?;
        Ok(Dispatcher {
            config,
            bundler_allow_list,
            compiler,
            bundler,
        })
    }

    /// Select between a native and a portable bundler implementation from a
    /// probed (or injected) capability value.
    pub fn with_capabilities(
        config: TransformConfig,
        capabilities: BackendCapabilities,
        compiler: Box<dyn CompilerBackend + Send + Sync>,
        native_bundler: Box<dyn BundlerBackend + Send + Sync>,
        portable_bundler: Box<dyn BundlerBackend + Send + Sync>,
    ) -> Result<Self, TransformError> {
        let bundler = if capabilities.native_bundler {
            native_bundler
        } else {
            portable_bundler
        };
        Self::new(config, compiler, bundler)
    }

    pub fn dispatch(
        &self,
        source: &str,
        path: &str,
    ) -> Result<TransformedSource, TransformError> {
        if self.bundler_allow_list.is_match(path) || self.config.is_dependency_js(path) {
            // Third-party code is assumed already downleveled.
            debug!(path, "dispatch: fast bundler");
            let unit = self.bundler.transform(
                source,
                &BundleOptions {
                    format: self.config.module_format,
                    target: self.config.target,
                    source_map: self.config.source_map,
                    source_file: path.to_string(),
                },
            )?;
            Ok(TransformedSource {
                code: unit.code,
                map: unit.map,
            })
        } else if is_resource_path(path) {
            debug!(path, "dispatch: standalone resource wrap");
            Ok(wrap_resource_module(source, self.config.module_format))
        } else {
            debug!(path, "dispatch: full compiler");
            let preprocessed = preprocess_file_content(source, path);
            let unit = self.compiler.compile(
                &preprocessed,
                path,
                &CompileOptions {
                    target: self.config.target,
                    source_map: self.config.source_map,
                    module_format: self.config.module_format,
                },
            )?;
            let code = make_exports_configurable(&unit.code);
            // Type information has to come from the original source; the
            // compiled output usually drops it.
            let code = downlevel_decorators(&code, &preprocessed, path)?;
            Ok(TransformedSource {
                code,
                map: unit.map,
            })
        }
    }
}

/// A stylesheet or template requested standalone becomes an inert module
/// exporting its own text.
fn wrap_resource_module(source: &str, format: ModuleFormat) -> TransformedSource {
    let literal = format!("`{}`", escape_template_text(source));
    let code = match format {
        ModuleFormat::Cjs => format!("module.exports = {literal};"),
        ModuleFormat::Esm => format!("export default {literal};"),
    };
    TransformedSource { code, map: None }
}
