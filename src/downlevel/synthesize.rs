use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::locate::{ClassRecord, DecoratorRef, ParamType};

static REQUIRE_BINDING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"const (\w+) = require\("#).unwrap());
const SOURCE_MAP_COMMENT: &str = "//# sourceMappingURL=";

/// Append `ctorParameters` / `propDecorators` assignments for the located
/// classes to the backend-compiled code. Ordering follows declaration order
/// throughout, so identical input yields byte-identical output.
pub fn synthesize(compiled_code: &str, classes: &[ClassRecord]) -> String {
    let mut lines: Vec<String> = compiled_code.split('\n').map(str::to_string).collect();
    // The source-map reference has to stay the last line of the file.
    let source_map_line = lines
        .iter()
        .position(|line| line.starts_with(SOURCE_MAP_COMMENT))
        .map(|index| lines.remove(index));

    let mut emitter = Emitter {
        compiled_lines: &lines,
        out: vec![],
        alias_counter: 1,
    };

    for class in classes {
        if class.has_framework_decorator() {
            emitter.emit_ctor_parameters(class);
        }
        // The property table is gated per property, not by the class decorator.
        emitter.emit_prop_decorators(class);
    }

    let appended = emitter.out;
    lines.extend(appended);
    if let Some(map_line) = source_map_line {
        lines.push(map_line);
    }
    lines.join("\n")
}

struct Emitter<'a> {
    compiled_lines: &'a [String],
    out: Vec<String>,
    alias_counter: usize,
}

impl Emitter<'_> {
    fn emit_ctor_parameters(&mut self, class: &ClassRecord) {
        // A class without its own constructor gets no table at all.
        let Some(params) = &class.constructor_parameters else {
            return;
        };
        trace!(class = %class.identifier_name, params = params.len(), "emitting ctorParameters");

        let mut entries = Vec::with_capacity(params.len());
        for param in params {
            let type_expr = self.type_expr(&param.declared_type);
            let framework_decorators: Vec<String> = param
                .own_decorators
                .iter()
                .filter(|d| d.is_framework())
                .map(|d| format!("{{ type: {} }}", self.decorator_expr(d)))
                .collect();
            if framework_decorators.is_empty() {
                entries.push(format!("    {{ type: {} }}", type_expr));
            } else {
                entries.push(format!(
                    "    {{ type: {}, decorators: [{}] }}",
                    type_expr,
                    framework_decorators.join(", ")
                ));
            }
        }

        if entries.is_empty() {
            self.out
                .push(format!("{}.ctorParameters = () => [];", class.identifier_name));
            return;
        }
        self.out
            .push(format!("{}.ctorParameters = () => [", class.identifier_name));
        let last = entries.len() - 1;
        for (index, entry) in entries.into_iter().enumerate() {
            if index < last {
                self.out.push(format!("{entry},"));
            } else {
                self.out.push(entry);
            }
        }
        self.out.push("];".to_string());
    }

    fn emit_prop_decorators(&mut self, class: &ClassRecord) {
        let decorated: Vec<(&str, Vec<String>)> = class
            .decorated_properties
            .iter()
            .filter_map(|prop| {
                let framework: Vec<String> = prop
                    .own_decorators
                    .iter()
                    .filter(|d| d.is_framework())
                    .map(|d| format!("{{ type: {} }}", self.decorator_expr(d)))
                    .collect();
                // Non-framework co-decorators never suppress emission; a
                // property with no framework decorator is omitted outright.
                (!framework.is_empty()).then_some((prop.name.as_str(), framework))
            })
            .collect();
        if decorated.is_empty() {
            return;
        }
        trace!(class = %class.identifier_name, props = decorated.len(), "emitting propDecorators");

        self.out
            .push(format!("{}.propDecorators = {{", class.identifier_name));
        let last = decorated.len() - 1;
        for (index, (name, decorators)) in decorated.into_iter().enumerate() {
            let separator = if index < last { "," } else { "" };
            self.out
                .push(format!("    {}: [{}]{}", name, decorators.join(", "), separator));
        }
        self.out.push("};".to_string());
    }

    fn type_expr(&mut self, declared: &ParamType) -> String {
        match declared {
            ParamType::Imported { type_name, module } => self.module_member(module, type_name),
            ParamType::Builtin(builtin) => builtin.runtime_name().to_string(),
            // Local declarations and untraceable types degrade to the
            // explicit unknown marker; downleveling never fails the file.
            ParamType::Local(_) | ParamType::Unknown => "undefined".to_string(),
        }
    }

    fn decorator_expr(&mut self, decorator: &DecoratorRef) -> String {
        match &decorator.origin_module_path {
            Some(module) => self.module_member(module, &decorator.exported_name),
            None => decorator.callee_name.clone(),
        }
    }

    fn module_member(&mut self, module: &str, member: &str) -> String {
        format!("{}.{}", self.alias_for(module), member)
    }

    /// Resolve the runtime binding of `module` in the compiled output,
    /// reusing an existing `const X = require("module");` line when one
    /// exists. Type-only imports are erased by the compiler backend and get a
    /// fresh alias appended instead; later references to the same module pick
    /// that alias up again.
    fn alias_for(&mut self, module: &str) -> String {
        let suffix = format!("require(\"{module}\");");
        let existing = self
            .compiled_lines
            .iter()
            .chain(self.out.iter())
            .find(|line| line.ends_with(&suffix))
            .and_then(|line| REQUIRE_BINDING_RE.captures(line.as_str()))
            .map(|captures| captures[1].to_string());
        if let Some(alias) = existing {
            return alias;
        }

        let segment: String = module
            .rsplit('/')
            .next()
            .unwrap_or(module)
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        let alias = format!("__{}_{}", segment, self.alias_counter);
        self.alias_counter += 1;
        trace!(module, alias = %alias, "reintroducing erased import");
        self.out.push(format!("const {alias} = require(\"{module}\");"));
        alias
    }
}
