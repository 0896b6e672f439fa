//! Decorator downleveling: recovers constructor-parameter and property
//! metadata from the *original* TypeScript source (the compiled output has
//! usually dropped the type annotations) and appends equivalent
//! `ctorParameters` / `propDecorators` assignments to the compiled code.

pub mod imports;
pub mod locate;
pub mod synthesize;

use swc_core::common::{sync::Lrc, FileName, SourceMap};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax};

use crate::error::TransformError;
pub use imports::{ImportIndex, ImportRecord};
pub use locate::{
    BuiltinType, ClassRecord, DecoratorRef, ParamType, ParameterRecord, PropertyRecord,
    FRAMEWORK_MODULE,
};

/// Parse a TypeScript compilation unit. The tree is consumed read-only by the
/// locator; this layer performs no emit of its own.
pub fn parse_source(source: &str, path: &str) -> Result<Module, TransformError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(Lrc::new(FileName::Custom(path.to_string())), source.to_string());
    let lexer = Lexer::new(
        Syntax::Typescript(TsSyntax {
            tsx: path.ends_with(".tsx"),
            decorators: true,
            ..Default::default()
        }),
        EsVersion::Es2022,
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);
    let parse_error = |err: swc_core::ecma::parser::error::Error| TransformError::Parse {
        path: path.to_string(),
        message: format!("{:?}", err.kind()),
    };
    let module = parser.parse_module().map_err(parse_error)?;
    // The parser recovers from many syntax errors; recovered errors still
    // mean the tree is not trustworthy for metadata synthesis.
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(parse_error(err));
    }
    Ok(module)
}

/// Run the full post-pass: parse the original source, index its imports,
/// locate decorated classes and append synthesized metadata to the compiled
/// output. All records are built fresh per invocation; nothing is cached
/// across files.
pub fn downlevel_decorators(
    compiled_code: &str,
    source: &str,
    path: &str,
) -> Result<String, TransformError> {
    let module = parse_source(source, path)?;
    let index = ImportIndex::build(&module);
    let classes = locate::locate(&module, &index);
    Ok(synthesize::synthesize(compiled_code, &classes))
}
