use once_cell::sync::Lazy;
use regex::Regex;

// Matching is textual on purpose: the rewrite has to run before any compiler
// sees the file, and must tolerate every quote style and array layout the
// decorator option block can appear in.
static TEMPLATE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\btemplateUrl\s*:\s*(['"`])(?:\./)*(.*)(['"`])"#).unwrap());
static STYLE_URLS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bstyleUrls\s*:\s*\[[^\]]*\]").unwrap());
static STYLES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bstyles\s*:\s*\[[^\]]*\]").unwrap());
static ESCAPE_TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\$\{|`)").unwrap());

pub fn is_markup_path(path: &str) -> bool {
    path.ends_with(".html") || path.ends_with(".htm")
}

fn is_class_source_path(path: &str) -> bool {
    path.ends_with(".ts") || path.ends_with(".tsx")
}

/// Escape backticks and `${` so the text can be embedded inside a template
/// literal without changing its meaning.
pub fn escape_template_text(text: &str) -> String {
    ESCAPE_TEMPLATE_RE.replace_all(text, "\\${1}").into_owned()
}

/// Rewrite external resource references before the unit reaches any compiler.
///
/// Markup files get their template-literal delimiters escaped. Class-bearing
/// sources get `templateUrl: '<rel>'` rewritten to an inline
/// `template: require('./<rel>')` load, and `styleUrls`/`styles` arrays
/// normalized to an empty `styles: []` list. Idempotent on text that carries
/// none of these keys.
pub fn preprocess_file_content(source: &str, path: &str) -> String {
    if is_markup_path(path) {
        escape_template_text(source)
    } else if is_class_source_path(path) {
        let source = TEMPLATE_URL_RE.replace_all(source, "template: require(${1}./${2}${3})");
        let source = STYLE_URLS_RE.replace_all(&source, "styles: []");
        STYLES_RE.replace_all(&source, "styles: []").into_owned()
    } else {
        source.to_string()
    }
}
