//! Output assembly
//!
//! Lays out the document: header, used native schemas, then every
//! component schema followed by its story wrapper. Import statements are
//! lifted out of converter output and merged into one block, one named
//! import per module.

use tree_sitter::Node;

use crate::interfaces::syntax::{has_token, named_children, node_text, parse_typescript, string_value};

use super::ir::{Declaration, DeclarationBody, Document, Import};
use super::registry::{ConvertedRegistry, NativeSchema};

/// Runtime validation library every document imports
pub const ZOD_MODULE: &str = "zod";

/// Build the output document
pub fn assemble(header: Vec<String>, natives: &[&NativeSchema], components: &ConvertedRegistry) -> Document {
    let mut imports = ImportSet::new();
    let mut declarations = Vec::with_capacity(natives.len() + components.len() * 2);

    for native in natives {
        declarations.push(imports.lift(&native.declaration));
    }
    for component in components.iter() {
        declarations.push(imports.lift(&component.declaration));
        if let Some(story) = &component.story {
            declarations.push(imports.lift(story));
        }
    }

    Document {
        header,
        imports: imports.into_imports(),
        declarations,
    }
}

/// Imports collected across declarations, in first-seen order
#[derive(Debug, Clone)]
pub struct ImportSet {
    imports: Vec<Import>,
}

impl Default for ImportSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSet {
    /// Starts with `import { z } from "zod";`
    pub fn new() -> Self {
        Self {
            imports: vec![Import::named(ZOD_MODULE, &["z"])],
        }
    }

    /// Merge names into the import of `module`
    pub fn add_named<'n>(&mut self, module: &str, names: impl IntoIterator<Item = &'n str>, type_only: bool) {
        let index = self.imports.iter().position(|i| {
            matches!(i, Import::Named { module: m, type_only: t, .. } if m == module && *t == type_only)
        });
        let index = index.unwrap_or_else(|| {
            self.imports.push(Import::Named {
                module: module.to_string(),
                names: Vec::new(),
                type_only,
            });
            self.imports.len() - 1
        });

        if let Import::Named { names: existing, .. } = &mut self.imports[index] {
            for name in names {
                let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
                if !name.is_empty() && !existing.contains(&name) {
                    existing.push(name);
                }
            }
        }
    }

    /// Keep any other import form once
    pub fn add_verbatim(&mut self, statement: &str) {
        let import = Import::Verbatim(statement.trim().to_string());
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    /// Remove top-level import statements from `code`, recording them here
    pub fn absorb(&mut self, code: &str) -> String {
        let tree = match parse_typescript(code) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("imports left in place: {}", e);
                return code.trim().to_string();
            }
        };

        let mut rest = String::with_capacity(code.len());
        let mut copied = 0;
        for statement in named_children(tree.root_node()) {
            if statement.kind() != "import_statement" {
                continue;
            }
            self.record(statement, code);
            rest.push_str(&code[copied..statement.start_byte()]);
            copied = statement.end_byte();
        }
        rest.push_str(&code[copied..]);
        rest.trim().to_string()
    }

    /// Named imports merge per module; default, namespace and side-effect
    /// imports are kept as written
    fn record(&mut self, statement: Node, code: &str) {
        let module = statement
            .child_by_field_name("source")
            .map(|source| string_value(source, code));
        let named = named_children(statement)
            .into_iter()
            .find(|n| n.kind() == "import_clause")
            .and_then(|clause| match named_children(clause).as_slice() {
                [only] if only.kind() == "named_imports" => Some(*only),
                _ => None,
            });

        match (module, named) {
            (Some(module), Some(named)) => {
                let specifiers: Vec<&str> = named_children(named)
                    .into_iter()
                    .map(|specifier| node_text(specifier, code))
                    .collect();
                self.add_named(&module, specifiers, has_token(statement, "type", code));
            }
            _ => self.add_verbatim(node_text(statement, code)),
        }
    }

    /// Declaration with any embedded imports moved into this set
    fn lift(&mut self, declaration: &Declaration) -> Declaration {
        match &declaration.body {
            DeclarationBody::Raw(text) => Declaration::raw(declaration.symbol.clone(), self.absorb(text)),
            DeclarationBody::Expr(_) => declaration.clone(),
        }
    }

    pub fn into_imports(self) -> Vec<Import> {
        self.imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ir::Expr;
    use crate::codegen::registry::ConvertedComponent;

    #[test]
    fn test_imports_merge_per_module() {
        let mut imports = ImportSet::new();
        let rest = imports.absorb(
            "import { z } from \"zod\";\nimport { a, b } from './shared';\nimport type { T } from \"./types\";\nimport {\n  b,\n  c,\n} from \"./shared\";\n\nexport const x = a;",
        );
        assert_eq!(rest, "export const x = a;");

        let rendered: Vec<String> = imports.into_imports().iter().map(Import::render).collect();
        assert_eq!(
            rendered,
            [
                "import { z } from \"zod\";",
                "import { a, b, c } from \"./shared\";",
                "import type { T } from \"./types\";",
            ]
        );
    }

    #[test]
    fn test_other_import_forms_are_deduplicated() {
        let mut imports = ImportSet::new();
        imports.absorb("import * as helpers from \"./helpers\";\nexport const a = 1;");
        imports.absorb("import * as helpers from \"./helpers\";\nexport const b = 2;");
        assert_eq!(imports.into_imports().len(), 2);
    }

    #[test]
    fn test_document_layout() {
        let native = NativeSchema {
            interface: "StoryblokAsset".into(),
            declaration: Declaration::raw(
                "storyblokAssetSchema",
                "import { z } from \"zod\";\n\nexport const storyblokAssetSchema = z.object({});\n",
            ),
        };
        let mut components = ConvertedRegistry::new();
        components.insert(ConvertedComponent {
            name: "card".into(),
            declaration: Declaration::expr("cardSchema", Expr::reference("storyblokAssetSchema")),
            story: Some(Declaration::expr("cardStorySchema", Expr::reference("cardSchema"))),
            references: vec!["storyblokAssetSchema".into()],
        });

        let doc = assemble(vec!["Generated".into()], &[&native], &components);
        assert_eq!(
            doc.render(),
            "// Generated\n\nimport { z } from \"zod\";\n\nexport const storyblokAssetSchema = z.object({});\n\nexport const cardSchema = storyblokAssetSchema;\n\nexport const cardStorySchema = cardSchema;"
        );
        assert_eq!(doc.render().matches("import { z }").count(), 1);
    }
}
