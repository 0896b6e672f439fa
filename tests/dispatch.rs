use std::sync::{Arc, Mutex};

use ng_jest_transform::{
    BackendCapabilities, BundleOptions, BundlerBackend, CompileOptions, CompilerBackend,
    CompiledUnit, Dispatcher, ModuleFormat, TransformConfig, TransformError,
};

#[derive(Clone, Default)]
struct Recorder {
    inputs: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

struct FakeCompiler {
    recorder: Recorder,
    output: String,
}

impl CompilerBackend for FakeCompiler {
    fn compile(
        &self,
        source: &str,
        _path: &str,
        _options: &CompileOptions,
    ) -> Result<CompiledUnit, TransformError> {
        self.recorder.inputs.lock().unwrap().push(source.to_string());
        Ok(CompiledUnit {
            code: self.output.clone(),
            map: Some("{}".to_string()),
        })
    }
}

struct FakeBundler {
    recorder: Recorder,
    output: String,
}

impl BundlerBackend for FakeBundler {
    fn transform(
        &self,
        source: &str,
        options: &BundleOptions,
    ) -> Result<CompiledUnit, TransformError> {
        self.recorder
            .inputs
            .lock()
            .unwrap()
            .push(format!("{}:{}", options.source_file, source.len()));
        Ok(CompiledUnit {
            code: self.output.clone(),
            map: None,
        })
    }
}

struct FailingCompiler;

impl CompilerBackend for FailingCompiler {
    fn compile(
        &self,
        _source: &str,
        path: &str,
        _options: &CompileOptions,
    ) -> Result<CompiledUnit, TransformError> {
        Err(TransformError::backend("compiler", path, "syntax error"))
    }
}

fn dispatcher_with(
    config: TransformConfig,
    compiler_output: &str,
    bundler_output: &str,
) -> (Dispatcher, Recorder, Recorder) {
    let compiler_calls = Recorder::default();
    let bundler_calls = Recorder::default();
    let dispatcher = Dispatcher::new(
        config,
        Box::new(FakeCompiler {
            recorder: compiler_calls.clone(),
            output: compiler_output.to_string(),
        }),
        Box::new(FakeBundler {
            recorder: bundler_calls.clone(),
            output: bundler_output.to_string(),
        }),
    )
    .unwrap();
    (dispatcher, compiler_calls, bundler_calls)
}

#[test]
fn dependency_js_goes_to_the_bundler_untouched() {
    let (dispatcher, compiler_calls, bundler_calls) =
        dispatcher_with(TransformConfig::default(), "compiled", "bundled");

    let result = dispatcher
        .dispatch("module.exports = 1;", "node_modules/tslib/tslib.es6.js")
        .unwrap();

    assert_eq!(result.code, "bundled");
    assert!(compiler_calls.calls().is_empty());
    assert_eq!(bundler_calls.calls().len(), 1);
}

#[test]
fn allow_listed_paths_go_to_the_bundler() {
    let config = TransformConfig {
        bundler_paths: vec!["**/vendor/**".to_string()],
        ..TransformConfig::default()
    };
    let (dispatcher, compiler_calls, bundler_calls) =
        dispatcher_with(config, "compiled", "bundled");

    let result = dispatcher
        .dispatch("export const x = 1;", "libs/vendor/lib.ts")
        .unwrap();

    assert_eq!(result.code, "bundled");
    assert!(compiler_calls.calls().is_empty());
    assert_eq!(bundler_calls.calls().len(), 1);
}

#[test]
fn dependency_ts_is_not_bundler_eligible() {
    let (dispatcher, compiler_calls, bundler_calls) =
        dispatcher_with(TransformConfig::default(), "compiled", "bundled");

    dispatcher
        .dispatch("export const x = 1;", "node_modules/pkg/index.d.ts")
        .unwrap();

    assert_eq!(compiler_calls.calls().len(), 1);
    assert!(bundler_calls.calls().is_empty());
}

#[test]
fn bundler_route_never_downlevels() {
    let bundler_output = "const core_1 = require(\"@angular/core\");\nclass Foo {\n}";
    let (dispatcher, _, _) =
        dispatcher_with(TransformConfig::default(), "compiled", bundler_output);

    let result = dispatcher
        .dispatch("whatever", "node_modules/lib/index.js")
        .unwrap();

    // Output passes through exactly as the bundler produced it.
    assert_eq!(result.code, bundler_output);
}

#[test]
fn compiler_route_preprocesses_and_downlevels() {
    let compiled = "\"use strict\";\nconst core_1 = require(\"@angular/core\");\nconst m1_1 = require(\"m1\");\nclass Foo {\n}\n//# sourceMappingURL=foo.js.map";
    let (dispatcher, compiler_calls, _) =
        dispatcher_with(TransformConfig::default(), compiled, "bundled");

    let source = r#"
import { Component } from '@angular/core';
import { A } from 'm1';

@Component({
  selector: 'foo',
  templateUrl: './foo.component.html',
  styleUrls: ['./foo.component.scss'],
})
export class Foo {
  constructor(a: A) {}
}
"#;
    let result = dispatcher.dispatch(source, "foo.component.ts").unwrap();

    // The compiler saw the preprocessed source, not the raw one.
    let seen = compiler_calls.calls();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("template: require('./foo.component.html')"));
    assert!(seen[0].contains("styles: []"));
    assert!(!seen[0].contains("styleUrls"));

    // Downleveled metadata was appended, source map reference stays last.
    assert!(result.code.contains("Foo.ctorParameters = () => ["));
    assert!(result.code.contains("{ type: m1_1.A }"));
    assert!(result
        .code
        .lines()
        .last()
        .unwrap()
        .starts_with("//# sourceMappingURL="));
    assert_eq!(result.map.as_deref(), Some("{}"));
}

#[test]
fn compiler_route_makes_export_definitions_configurable() {
    let compiled = "\"use strict\";\nObject.defineProperty(exports, \"__esModule\", {\n    value: true\n});\nObject.defineProperty(exports, \"Foo\", {\n    enumerable: true,\n    get: function() {\n        return Foo;\n    }\n});\nclass Foo {\n}\n";
    let (dispatcher, _, _) = dispatcher_with(TransformConfig::default(), compiled, "bundled");

    let result = dispatcher.dispatch("export class Foo {}", "foo.ts").unwrap();

    assert!(result
        .code
        .contains("exports, \"Foo\", {\n    enumerable: true, configurable: true,"));
    assert!(result
        .code
        .contains("exports, \"__esModule\", {\n    value: true\n});"));
}

#[test]
fn bundler_route_leaves_export_definitions_alone() {
    let bundled = "Object.defineProperty(exports, \"Foo\", {\n    enumerable: true,\n});\n";
    let (dispatcher, _, _) = dispatcher_with(TransformConfig::default(), "compiled", bundled);

    let result = dispatcher
        .dispatch("whatever", "node_modules/lib/index.js")
        .unwrap();
    assert_eq!(result.code, bundled);
}

#[test]
fn standalone_resource_wraps_as_inert_module() {
    let (dispatcher, compiler_calls, bundler_calls) =
        dispatcher_with(TransformConfig::default(), "compiled", "bundled");

    let result = dispatcher
        .dispatch("<div>`${title}`</div>", "foo.component.html")
        .unwrap();

    assert_eq!(
        result.code,
        "module.exports = `<div>\\`\\${title}\\`</div>`;"
    );
    assert!(result.map.is_none());
    assert!(compiler_calls.calls().is_empty());
    assert!(bundler_calls.calls().is_empty());
}

#[test]
fn standalone_resource_respects_module_format() {
    let config = TransformConfig {
        module_format: ModuleFormat::Esm,
        ..TransformConfig::default()
    };
    let (dispatcher, _, _) = dispatcher_with(config, "compiled", "bundled");

    let result = dispatcher.dispatch("body {}", "styles.scss").unwrap();
    assert_eq!(result.code, "export default `body {}`;");
}

#[test]
fn capabilities_select_the_bundler_implementation() {
    let make = |caps: BackendCapabilities| {
        Dispatcher::with_capabilities(
            TransformConfig::default(),
            caps,
            Box::new(FakeCompiler {
                recorder: Recorder::default(),
                output: String::new(),
            }),
            Box::new(FakeBundler {
                recorder: Recorder::default(),
                output: "native".to_string(),
            }),
            Box::new(FakeBundler {
                recorder: Recorder::default(),
                output: "portable".to_string(),
            }),
        )
        .unwrap()
    };

    let native = make(BackendCapabilities::native());
    let result = native
        .dispatch("x", "node_modules/lib/index.js")
        .unwrap();
    assert_eq!(result.code, "native");

    let portable = make(BackendCapabilities::portable());
    let result = portable
        .dispatch("x", "node_modules/lib/index.js")
        .unwrap();
    assert_eq!(result.code, "portable");
}

#[test]
fn backend_failure_propagates_unchanged() {
    let dispatcher = Dispatcher::new(
        TransformConfig::default(),
        Box::new(FailingCompiler),
        Box::new(FakeBundler {
            recorder: Recorder::default(),
            output: String::new(),
        }),
    )
    .unwrap();

    let err = dispatcher.dispatch("class {", "broken.ts").unwrap_err();
    assert!(matches!(err, TransformError::Backend { backend: "compiler", .. }));
}

#[test]
fn invalid_allow_list_pattern_is_a_config_error() {
    let config = TransformConfig {
        bundler_paths: vec!["[".to_string()],
        ..TransformConfig::default()
    };
    let err = Dispatcher::new(
        config,
        Box::new(FailingCompiler),
        Box::new(FakeBundler {
            recorder: Recorder::default(),
            output: String::new(),
        }),
    )
    .err()
    .expect("glob compilation should fail");
    assert!(matches!(err, TransformError::Config(_)));
}
