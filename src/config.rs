use std::path::Path;

use serde::Deserialize;

/// Module flavor of the emitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    Cjs,
    Esm,
}

/// ECMAScript output target handed to the backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcmaTarget {
    Es2015,
    Es2016,
}

impl EcmaTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            EcmaTarget::Es2015 => "es2015",
            EcmaTarget::Es2016 => "es2016",
        }
    }
}

/// Project configuration driving the per-file dispatch decision.
///
/// `bundler_paths` is an explicit allow-list of glob patterns routed to the
/// fast bundler; independently, any plain-JS file under `dependency_dir` takes
/// the same route (third-party code is assumed already downleveled).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformConfig {
    pub bundler_paths: Vec<String>,
    pub dependency_dir: String,
    pub target: EcmaTarget,
    pub source_map: bool,
    pub module_format: ModuleFormat,
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            bundler_paths: vec![],
            dependency_dir: "node_modules".to_string(),
            target: EcmaTarget::Es2015,
            source_map: true,
            module_format: ModuleFormat::Cjs,
        }
    }
}

const BUNDLER_JS_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

impl TransformConfig {
    /// True when `path` sits under the dependency directory and carries a
    /// plain-JS module extension. The glob allow-list is checked separately
    /// by the dispatcher (it is compiled once at dispatcher construction).
    pub fn is_dependency_js(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let marker = format!("/{}/", self.dependency_dir);
        let in_dependency_dir = normalized.contains(&marker)
            || normalized.starts_with(&format!("{}/", self.dependency_dir));
        if !in_dependency_dir {
            return false;
        }
        Path::new(&normalized)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| BUNDLER_JS_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }
}
