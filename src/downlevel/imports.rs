use std::collections::HashMap;

use swc_core::ecma::ast::{ImportSpecifier, Module, ModuleDecl, ModuleExportName, ModuleItem};

/// One top-level import binding: `import { exported as local } from "module"`.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub local_name: String,
    pub origin_module_path: String,
    pub exported_name: String,
}

/// Maps every imported local name to its originating module. Built once per
/// compilation unit from top-level import declarations only; local names are
/// unique per unit by language rule. Type-only imports are recorded the same
/// as value imports, since synthesis needs the module path either way.
#[derive(Debug, Default)]
pub struct ImportIndex {
    by_local: HashMap<String, ImportRecord>,
}

impl ImportIndex {
    pub fn build(module: &Module) -> Self {
        let mut by_local = HashMap::new();
        for item in &module.body {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
                continue;
            };
            let source = import.src.value.to_string();
            for specifier in &import.specifiers {
                let record = match specifier {
                    ImportSpecifier::Named(named) => {
                        let exported = named
                            .imported
                            .as_ref()
                            .map(|name| match name {
                                ModuleExportName::Ident(ident) => ident.sym.to_string(),
                                ModuleExportName::Str(s) => s.value.to_string(),
                            })
                            .unwrap_or_else(|| named.local.sym.to_string());
                        ImportRecord {
                            local_name: named.local.sym.to_string(),
                            origin_module_path: source.clone(),
                            exported_name: exported,
                        }
                    }
                    ImportSpecifier::Default(default) => ImportRecord {
                        local_name: default.local.sym.to_string(),
                        origin_module_path: source.clone(),
                        exported_name: "default".to_string(),
                    },
                    ImportSpecifier::Namespace(ns) => ImportRecord {
                        local_name: ns.local.sym.to_string(),
                        origin_module_path: source.clone(),
                        exported_name: "*".to_string(),
                    },
                };
                by_local.insert(record.local_name.clone(), record);
            }
        }
        ImportIndex { by_local }
    }

    pub fn lookup(&self, local_name: &str) -> Option<&ImportRecord> {
        self.by_local.get(local_name)
    }
}
