//! TypeScript code emission via the Emit trait.
//!
//! Converts rewritten AST nodes back to source text. Each node type
//! implements [`Emit`]; statements and methods additionally support
//! indented emission so nesting composes.

use crate::ast::{
    BinOp, ClassDecl, Expr, Item, Lit, MethodDecl, Module, ObjectProp, Param, Pat, PropName,
    PropSig, Stmt, TemplatePart, TsPrimitive, TsType, TypeAlias, VarKind,
};
use crate::util::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Names and Literals
// =============================================================================

impl Emit for PropName {
    fn emit(&self) -> String {
        match self {
            PropName::Ident(name) => quote_if_needed(name),
            PropName::Quoted(name) => format!("\"{}\"", escape_js_string(name)),
        }
    }
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Null => "null".to_string(),
            TsPrimitive::Unknown => "unknown".to_string(),
        }
    }
}

impl Emit for Lit {
    fn emit(&self) -> String {
        match self {
            Lit::String(s) => format!("\"{}\"", escape_js_string(s)),
            Lit::Int(i) => i.to_string(),
            Lit::Bool(b) => b.to_string(),
            Lit::Null => "null".to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let args_str = args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                    format!("{name}<{args_str}>")
                }
            }
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                // Wrap complex types in parentheses
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(members) => members
                .iter()
                .map(Emit::emit)
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(members) => members
                .iter()
                .map(|member| {
                    let s = member.emit();
                    if matches!(member, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(sigs) => {
                if sigs.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = sigs.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join("; "))
                }
            }
        }
    }
}

impl Emit for PropSig {
    fn emit(&self) -> String {
        let key = self.name.emit();
        let opt = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{}: {}", key, opt, ty.emit()),
            None => format!("{key}{opt}"),
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::NotEqual => "!=".to_string(),
            BinOp::StrictNotEqual => "!==".to_string(),
        }
    }
}

impl Emit for Expr {
    fn emit(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::Literal(lit) => lit.emit(),
            Expr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|part| match part {
                        TemplatePart::Static(s) => s.clone(),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            Expr::Call { callee, args } => {
                let args_str = args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("{}({})", callee.emit(), args_str)
            }
            Expr::Member { object, prop } => {
                format!("{}.{}", object.emit(), prop)
            }
            Expr::New { callee, args } => {
                let args_str = args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("new {}({})", callee.emit(), args_str)
            }
            Expr::Await(inner) => format!("await {}", inner.emit()),
            Expr::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            Expr::Array(items) => {
                let items_str = items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("[{items_str}]")
            }
            Expr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
            Expr::Cast { expr, ty } => {
                format!("{} as {}", expr.emit(), ty.emit())
            }
        }
    }
}

impl Emit for ObjectProp {
    fn emit(&self) -> String {
        match self {
            ObjectProp::Shorthand(name) => name.clone(),
            ObjectProp::KeyValue { key, value } => format!("{}: {}", key.emit(), value.emit()),
            ObjectProp::Spread(expr) => format!("...{}", expr.emit()),
        }
    }
}

// =============================================================================
// Parameters
// =============================================================================

impl Emit for Pat {
    fn emit(&self) -> String {
        match self {
            Pat::Ident(name) => name.clone(),
            Pat::Object(bindings) => {
                if bindings.is_empty() {
                    "{}".to_string()
                } else {
                    let names: Vec<_> = bindings.iter().map(|b| b.name.clone()).collect();
                    format!("{{ {} }}", names.join(", "))
                }
            }
        }
    }
}

impl Emit for Param {
    fn emit(&self) -> String {
        let mut output = self.pat.emit();
        if self.optional {
            output.push('?');
        }
        if let Some(ty) = &self.ty {
            output.push_str(": ");
            output.push_str(&ty.emit());
        }
        if let Some(default) = &self.default {
            output.push_str(" = ");
            output.push_str(&default.emit());
        }
        output
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for VarKind {
    fn emit(&self) -> String {
        match self {
            VarKind::Const => "const".to_string(),
            VarKind::Let => "let".to_string(),
        }
    }
}

impl Emit for Stmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl Stmt {
    /// Emit with the given indentation level (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            Stmt::VarDecl {
                kind,
                name,
                ty,
                init,
            } => {
                let ty_str = ty
                    .as_ref()
                    .map(|t| format!(": {}", t.emit()))
                    .unwrap_or_default();
                format!("{}{} {}{} = {};\n", prefix, kind.emit(), name, ty_str, init.emit())
            }
            Stmt::Expr(expr) => format!("{}{};\n", prefix, expr.emit()),
            Stmt::Return(expr) => match expr {
                Some(e) => format!("{}return {};\n", prefix, e.emit()),
                None => format!("{prefix}return;\n"),
            },
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let mut output = format!("{}if ({}) {{\n", prefix, cond.emit());
                for stmt in then_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                if let Some(else_stmts) = else_body {
                    output.push_str(&format!("{prefix}}} else {{\n"));
                    for stmt in else_stmts {
                        output.push_str(&stmt.emit_indented(indent + 1));
                    }
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            Stmt::Throw(expr) => format!("{}throw {};\n", prefix, expr.emit()),
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl MethodDecl {
    /// Emit with the given indentation level (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let async_str = if self.is_async { "async " } else { "" };
        let params_str = self
            .params
            .iter()
            .map(Emit::emit)
            .collect::<Vec<_>>()
            .join(", ");
        let return_type_str = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();

        let mut output = format!(
            "{}{}{}({}){}",
            prefix,
            async_str,
            self.name.emit(),
            params_str,
            return_type_str
        );
        if self.body.is_empty() {
            output.push_str(" {}\n");
        } else {
            output.push_str(" {\n");
            for stmt in &self.body {
                output.push_str(&stmt.emit_indented(indent + 1));
            }
            output.push_str(&format!("{prefix}}}\n"));
        }
        output
    }
}

impl Emit for MethodDecl {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl Emit for TypeAlias {
    fn emit(&self) -> String {
        format!("export type {} = {};\n", self.name, self.ty.emit())
    }
}

impl Emit for ClassDecl {
    fn emit(&self) -> String {
        let mut output = format!("export class {} {{\n", self.name);
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&method.emit_indented(1));
        }
        output.push_str("}\n");
        output
    }
}

impl Emit for Item {
    fn emit(&self) -> String {
        match self {
            Item::TypeAlias(alias) => alias.emit(),
            Item::Class(class) => class.emit(),
            Item::Raw(code) => {
                let mut output = code.clone();
                if !output.ends_with('\n') {
                    output.push('\n');
                }
                output
            }
        }
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for Module {
    fn emit(&self) -> String {
        let mut output = String::new();
        for item in &self.items {
            output.push_str(&item.emit());
            output.push('\n');
        }
        output
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BindingElement;

    #[test]
    fn test_emit_primitive() {
        assert_eq!(TsPrimitive::String.emit(), "string");
        assert_eq!(TsPrimitive::Number.emit(), "number");
        assert_eq!(TsPrimitive::Boolean.emit(), "boolean");
        assert_eq!(TsPrimitive::Null.emit(), "null");
        assert_eq!(TsPrimitive::Unknown.emit(), "unknown");
    }

    #[test]
    fn test_emit_literal() {
        assert_eq!(Lit::String("hello".into()).emit(), "\"hello\"");
        assert_eq!(Lit::String("say \"hi\"".into()).emit(), "\"say \\\"hi\\\"\"");
        assert_eq!(Lit::Int(42).emit(), "42");
        assert_eq!(Lit::Bool(true).emit(), "true");
        assert_eq!(Lit::Null.emit(), "null");
    }

    #[test]
    fn test_emit_union_array() {
        // (string | null)[] - union inside array needs parens
        let inner = TsType::Union(vec![
            TsType::Primitive(TsPrimitive::String),
            TsType::Primitive(TsPrimitive::Null),
        ]);
        let ty = TsType::Array(Box::new(inner));
        assert_eq!(ty.emit(), "(string | null)[]");
    }

    #[test]
    fn test_emit_intersection_parenthesizes_unions() {
        let ty = TsType::Intersection(vec![
            TsType::named("ContentRef"),
            TsType::Union(vec![TsType::named("Contact"), TsType::named("Employee")]),
        ]);
        assert_eq!(ty.emit(), "ContentRef & (Contact | Employee)");
    }

    #[test]
    fn test_emit_generic_ref() {
        let ty = TsType::Ref {
            name: "Promise".into(),
            args: vec![TsType::named("Category")],
        };
        assert_eq!(ty.emit(), "Promise<Category>");
    }

    #[test]
    fn test_emit_object_type() {
        let ty = TsType::Object(vec![
            PropSig {
                name: PropName::Ident("id".into()),
                ty: Some(TsType::Primitive(TsPrimitive::Number)),
                optional: false,
            },
            PropSig {
                name: PropName::Quoted("content-type".into()),
                ty: Some(TsType::Primitive(TsPrimitive::String)),
                optional: true,
            },
        ]);
        assert_eq!(ty.emit(), "{ id: number; \"content-type\"?: string }");
    }

    #[test]
    fn test_emit_type_alias() {
        let alias = TypeAlias {
            name: "ID".into(),
            ty: TsType::Primitive(TsPrimitive::String),
        };
        assert_eq!(alias.emit(), "export type ID = string;\n");
    }

    #[test]
    fn test_emit_template_call() {
        let expr = Expr::Call {
            callee: Box::new(Expr::Member {
                object: Box::new(Expr::Ident("this".into())),
                prop: "_fetchJson".into(),
            }),
            args: vec![Expr::Template(vec![
                TemplatePart::Static("/category/".into()),
                TemplatePart::Dynamic(Expr::Ident("id".into())),
            ])],
        };
        assert_eq!(expr.emit(), "this._fetchJson(`/category/${id}`)");
    }

    #[test]
    fn test_emit_cast() {
        let expr = Expr::Cast {
            expr: Box::new(Expr::Ident("res".into())),
            ty: TsType::named("Category"),
        };
        assert_eq!(expr.emit(), "res as Category");
    }

    #[test]
    fn test_emit_object_literal() {
        let expr = Expr::Object(vec![
            ObjectProp::Shorthand("join".into()),
            ObjectProp::KeyValue {
                key: PropName::Ident("query".into()),
                value: Expr::Literal(Lit::Null),
            },
            ObjectProp::Spread(Expr::Ident("options".into())),
        ]);
        assert_eq!(expr.emit(), "{ join, query: null, ...options }");
    }

    #[test]
    fn test_emit_if_throw() {
        let stmt = Stmt::If {
            cond: Expr::BinOp {
                left: Box::new(Expr::Member {
                    object: Box::new(Expr::Ident("res".into())),
                    prop: "status".into(),
                }),
                op: BinOp::StrictNotEqual,
                right: Box::new(Expr::Literal(Lit::Int(200))),
            },
            then_body: vec![Stmt::Throw(Expr::New {
                callee: Box::new(Expr::Ident("ApiError".into())),
                args: vec![Expr::Ident("res".into())],
            })],
            else_body: None,
        };
        let expected = "  if (res.status !== 200) {\n    throw new ApiError(res);\n  }\n";
        assert_eq!(stmt.emit_indented(1), expected);
    }

    #[test]
    fn test_emit_method_with_destructured_param() {
        let method = MethodDecl {
            name: PropName::Ident("loadCategory".into()),
            is_async: true,
            params: vec![
                Param {
                    pat: Pat::Ident("id".into()),
                    ty: Some(TsType::Primitive(TsPrimitive::String)),
                    optional: false,
                    default: None,
                },
                Param {
                    pat: Pat::Object(vec![BindingElement {
                        name: "cancelToken".into(),
                    }]),
                    ty: Some(TsType::Object(vec![PropSig {
                        name: PropName::Ident("cancelToken".into()),
                        ty: Some(TsType::Primitive(TsPrimitive::String)),
                        optional: true,
                    }])),
                    optional: false,
                    default: Some(Expr::Object(Vec::new())),
                },
            ],
            return_type: None,
            body: vec![Stmt::Return(None)],
        };
        let result = method.emit_indented(1);
        assert!(result.contains(
            "async loadCategory(id: string, { cancelToken }: { cancelToken?: string } = {}) {"
        ));
        assert!(result.contains("    return;"));
    }

    #[test]
    fn test_emit_class_separates_methods() {
        let class = ClassDecl {
            name: "Api".into(),
            methods: vec![
                MethodDecl {
                    name: PropName::Ident("a".into()),
                    is_async: false,
                    params: Vec::new(),
                    return_type: None,
                    body: Vec::new(),
                },
                MethodDecl {
                    name: PropName::Ident("b".into()),
                    is_async: false,
                    params: Vec::new(),
                    return_type: None,
                    body: Vec::new(),
                },
            ],
        };
        assert_eq!(class.emit(), "export class Api {\n  a() {}\n\n  b() {}\n}\n");
    }

    #[test]
    fn test_emit_raw_item() {
        let item = Item::Raw("function resolveRefs() {}".into());
        assert_eq!(item.emit(), "function resolveRefs() {}\n");
    }
}
