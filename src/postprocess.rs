use once_cell::sync::Lazy;
use regex::Regex;

// Compiled CJS output defines live export bindings with
// `Object.defineProperty(exports, "Name", { enumerable: true, get ... })`.
// Without `configurable: true` those properties cannot be redefined, which
// breaks test doubles that replace an export at runtime.
static EXPORT_DEFINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^(Object\.defineProperty\(exports, "\w+", \{\n    )enumerable: true,"#)
        .unwrap()
});

/// Rewrite compiled export definitions so each one is configurable. Leaves
/// any other `defineProperty` call, including the `__esModule` marker, alone.
pub fn make_exports_configurable(code: &str) -> String {
    EXPORT_DEFINE_RE
        .replace_all(code, "${1}enumerable: true, configurable: true,")
        .into_owned()
}
