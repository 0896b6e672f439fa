use swc_core::ecma::ast::{
    Callee, Class, ClassDecl, ClassMember, DefaultDecl, Decorator, ExportDefaultDecl, Expr, Key,
    MethodKind, ParamOrTsParamProp, Pat, PropName, TsEntityName, TsFnOrConstructorType,
    TsKeywordTypeKind, TsParamPropParam, TsType, TsTypeAnn,
};
use swc_core::ecma::visit::{Visit, VisitWith};

use super::imports::ImportIndex;

/// The single origin module whose decorators trigger metadata synthesis.
pub const FRAMEWORK_MODULE: &str = "@angular/core";

/// A decorator recognized by name and originating module only.
#[derive(Debug, Clone)]
pub struct DecoratorRef {
    pub callee_name: String,
    pub origin_module_path: Option<String>,
    /// Name the origin module actually exports; differs from `callee_name`
    /// under rename-on-import and is what synthesis must reference.
    pub exported_name: String,
}

impl DecoratorRef {
    pub fn is_framework(&self) -> bool {
        self.origin_module_path.as_deref() == Some(FRAMEWORK_MODULE)
    }
}

/// Ambient constructor references that need no import resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    Number,
    Boolean,
    Array,
    Function,
    Promise,
}

impl BuiltinType {
    pub fn runtime_name(&self) -> &'static str {
        match self {
            BuiltinType::Number => "Number",
            BuiltinType::Boolean => "Boolean",
            BuiltinType::Array => "Array",
            BuiltinType::Function => "Function",
            BuiltinType::Promise => "Promise",
        }
    }
}

/// Best-effort classification of a declared parameter type. `Unknown` covers
/// everything static resolution cannot trace (unions, tuples, object
/// literals, generic instantiations other than the builtin names, missing
/// annotations) and is never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    Imported { type_name: String, module: String },
    Builtin(BuiltinType),
    Local(String),
    Unknown,
}

#[derive(Debug)]
pub struct ParameterRecord {
    pub position_index: usize,
    pub declared_type: ParamType,
    pub own_decorators: Vec<DecoratorRef>,
}

#[derive(Debug)]
pub struct PropertyRecord {
    pub name: String,
    pub own_decorators: Vec<DecoratorRef>,
}

#[derive(Debug)]
pub struct ClassRecord {
    pub identifier_name: String,
    pub decorators: Vec<DecoratorRef>,
    /// `None` when the class declares no constructor of its own.
    pub constructor_parameters: Option<Vec<ParameterRecord>>,
    pub decorated_properties: Vec<PropertyRecord>,
}

impl ClassRecord {
    pub fn has_framework_decorator(&self) -> bool {
        self.decorators.iter().any(DecoratorRef::is_framework)
    }
}

/// Collect every class declaration in the unit, nested classes included, each
/// exactly once.
pub fn locate(module: &swc_core::ecma::ast::Module, imports: &ImportIndex) -> Vec<ClassRecord> {
    let mut collector = ClassCollector {
        imports,
        records: vec![],
    };
    module.visit_with(&mut collector);
    collector.records
}

struct ClassCollector<'a> {
    imports: &'a ImportIndex,
    records: Vec<ClassRecord>,
}

impl Visit for ClassCollector<'_> {
    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.record_class(n.ident.sym.to_string(), &n.class);
        n.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, n: &ExportDefaultDecl) {
        if let DefaultDecl::Class(class_expr) = &n.decl {
            // An anonymous default class has no name to assign metadata to.
            if let Some(ident) = &class_expr.ident {
                self.record_class(ident.sym.to_string(), &class_expr.class);
            }
        }
        n.visit_children_with(self);
    }
}

impl ClassCollector<'_> {
    fn record_class(&mut self, name: String, class: &Class) {
        let decorators = self.decorator_refs(&class.decorators);

        let constructor_parameters = class.body.iter().find_map(|member| match member {
            ClassMember::Constructor(ctor) => Some(
                ctor.params
                    .iter()
                    .enumerate()
                    .map(|(index, param)| self.parameter_record(index, param))
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        });

        let mut properties: Vec<PropertyRecord> = vec![];
        for member in &class.body {
            let (key_name, decorators) = match member {
                ClassMember::ClassProp(prop) if !prop.decorators.is_empty() => {
                    (prop_name(&prop.key), self.decorator_refs(&prop.decorators))
                }
                ClassMember::AutoAccessor(acc) if !acc.decorators.is_empty() => {
                    let name = match &acc.key {
                        Key::Public(key) => prop_name(key),
                        Key::Private(_) => None,
                    };
                    (name, self.decorator_refs(&acc.decorators))
                }
                ClassMember::Method(method)
                    if matches!(method.kind, MethodKind::Getter | MethodKind::Setter)
                        && !method.function.decorators.is_empty() =>
                {
                    (
                        prop_name(&method.key),
                        self.decorator_refs(&method.function.decorators),
                    )
                }
                _ => continue,
            };
            let Some(key_name) = key_name else { continue };
            // A get/set pair can both carry decorators; merge onto one entry.
            if let Some(existing) = properties.iter_mut().find(|p| p.name == key_name) {
                existing.own_decorators.extend(decorators);
            } else {
                properties.push(PropertyRecord {
                    name: key_name,
                    own_decorators: decorators,
                });
            }
        }

        self.records.push(ClassRecord {
            identifier_name: name,
            decorators,
            constructor_parameters,
            decorated_properties: properties,
        });
    }

    fn decorator_refs(&self, decorators: &[Decorator]) -> Vec<DecoratorRef> {
        decorators
            .iter()
            .filter_map(|d| self.decorator_ref(d))
            .collect()
    }

    fn decorator_ref(&self, decorator: &Decorator) -> Option<DecoratorRef> {
        let callee_name = match &*decorator.expr {
            Expr::Call(call) => match &call.callee {
                Callee::Expr(callee) => match &**callee {
                    Expr::Ident(ident) => Some(ident.sym.to_string()),
                    _ => None,
                },
                _ => None,
            },
            Expr::Ident(ident) => Some(ident.sym.to_string()),
            _ => None,
        }?;
        let (origin_module_path, exported_name) = match self.imports.lookup(&callee_name) {
            Some(record) => (
                Some(record.origin_module_path.clone()),
                record.exported_name.clone(),
            ),
            None => (None, callee_name.clone()),
        };
        Some(DecoratorRef {
            callee_name,
            origin_module_path,
            exported_name,
        })
    }

    fn parameter_record(&self, index: usize, param: &ParamOrTsParamProp) -> ParameterRecord {
        let (decorators, type_ann) = match param {
            ParamOrTsParamProp::Param(p) => (p.decorators.as_slice(), pat_type_ann(&p.pat)),
            // A parameter property carries its annotation one level down.
            ParamOrTsParamProp::TsParamProp(pp) => {
                let ann = match &pp.param {
                    TsParamPropParam::Ident(binding) => binding.type_ann.as_deref(),
                    TsParamPropParam::Assign(assign) => pat_type_ann(&assign.left),
                };
                (pp.decorators.as_slice(), ann)
            }
        };
        ParameterRecord {
            position_index: index,
            declared_type: self.classify_type(type_ann.map(|ann| &*ann.type_ann)),
            own_decorators: self.decorator_refs(decorators),
        }
    }

    fn classify_type(&self, ty: Option<&TsType>) -> ParamType {
        let Some(ty) = ty else {
            return ParamType::Unknown;
        };
        match ty {
            TsType::TsKeywordType(keyword) => match keyword.kind {
                TsKeywordTypeKind::TsNumberKeyword => ParamType::Builtin(BuiltinType::Number),
                TsKeywordTypeKind::TsBooleanKeyword => ParamType::Builtin(BuiltinType::Boolean),
                _ => ParamType::Unknown,
            },
            TsType::TsArrayType(_) => ParamType::Builtin(BuiltinType::Array),
            TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(_)) => {
                ParamType::Builtin(BuiltinType::Function)
            }
            TsType::TsParenthesizedType(paren) => self.classify_type(Some(paren.type_ann.as_ref())),
            TsType::TsTypeRef(type_ref) => {
                let TsEntityName::Ident(ident) = &type_ref.type_name else {
                    return ParamType::Unknown;
                };
                let name = ident.sym.as_ref();
                match name {
                    "Number" => ParamType::Builtin(BuiltinType::Number),
                    "Boolean" => ParamType::Builtin(BuiltinType::Boolean),
                    "Array" => ParamType::Builtin(BuiltinType::Array),
                    "Function" => ParamType::Builtin(BuiltinType::Function),
                    "Promise" => ParamType::Builtin(BuiltinType::Promise),
                    _ if type_ref.type_params.is_some() => ParamType::Unknown,
                    _ => match self.imports.lookup(name) {
                        Some(record) => ParamType::Imported {
                            type_name: record.exported_name.clone(),
                            module: record.origin_module_path.clone(),
                        },
                        None => ParamType::Local(name.to_string()),
                    },
                }
            }
            _ => ParamType::Unknown,
        }
    }
}

fn pat_type_ann(pat: &Pat) -> Option<&TsTypeAnn> {
    match pat {
        Pat::Ident(binding) => binding.type_ann.as_deref(),
        Pat::Assign(assign) => pat_type_ann(&assign.left),
        Pat::Rest(rest) => rest.type_ann.as_deref(),
        Pat::Object(object) => object.type_ann.as_deref(),
        Pat::Array(array) => array.type_ann.as_deref(),
        _ => None,
    }
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}
