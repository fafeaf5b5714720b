//! Syntax model for generated API client modules.
//!
//! The upstream generator hands the post-processor a module built from
//! these types. The model is deliberately closed: one tagged variant per
//! node shape the generator emits, matched exhaustively, rather than a
//! general TypeScript grammar. Anything the generator cannot produce has
//! no representation here.

use refjoin_runtime::{CONTENT_KIND, MEDIA_KIND, REF_KEY, kind_discriminator};

use crate::util::pascal_case;
use crate::{Error, Result};

/// A generated client module: type aliases and the client class, in
/// source order.
#[derive(Debug, Clone)]
pub struct Module {
    /// Top-level items in emission order.
    pub items: Vec<Item>,
}

impl Module {
    /// Find the definition of a top-level type alias by name.
    /// The first declaration wins.
    pub fn find_type(&self, name: &str) -> Option<&TsType> {
        self.items.iter().find_map(|item| match item {
            Item::TypeAlias(alias) if alias.name == name => Some(&alias.ty),
            _ => None,
        })
    }
}

/// One top-level item of a client module.
#[derive(Debug, Clone)]
pub enum Item {
    /// `export type Name = T;`
    TypeAlias(TypeAlias),
    /// `export class Name { ... }`
    Class(ClassDecl),
    /// Pre-rendered source emitted verbatim, used for the appended
    /// runtime helper.
    Raw(String),
}

/// A type alias declaration.
#[derive(Debug, Clone)]
pub struct TypeAlias {
    /// Alias name.
    pub name: String,
    /// Aliased type.
    pub ty: TsType,
}

/// The generated client class.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Class name.
    pub name: String,
    /// Method declarations in source order.
    pub methods: Vec<MethodDecl>,
}

/// A class method declaration.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    /// Method name as written in the source.
    pub name: PropName,
    /// Whether the method is declared `async`.
    pub is_async: bool,
    /// Parameters in declaration order.
    pub params: Vec<Param>,
    /// Explicit return type annotation, if any.
    pub return_type: Option<TsType>,
    /// Body statements.
    pub body: Vec<Stmt>,
}

/// A property, member, or method name, as written.
#[derive(Debug, Clone)]
pub enum PropName {
    /// Plain identifier: `loadCategory`, `join`.
    Ident(String),
    /// String-quoted key: `"content-type"`. The generator quotes names
    /// that are not valid identifiers.
    Quoted(String),
}

impl PropName {
    /// The identifier text, or [`Error::ExpectedIdent`] if the name is
    /// quoted. Rules that key on a name require the plain form; a quoted
    /// name in such a position means the input is not a client module
    /// this tool understands.
    pub fn ident_text(&self) -> Result<&str> {
        match self {
            Self::Ident(s) => Ok(s),
            Self::Quoted(s) => Err(Error::ExpectedIdent(s.clone())),
        }
    }

    /// Whether this name is the plain identifier `name`. Quoted names
    /// never match.
    pub fn matches_ident(&self, name: &str) -> bool {
        matches!(self, Self::Ident(s) if s == name)
    }
}

/// A method parameter.
#[derive(Debug, Clone)]
pub struct Param {
    /// Binding pattern.
    pub pat: Pat,
    /// Type annotation, if any.
    pub ty: Option<TsType>,
    /// Whether the parameter is marked optional (`options?: T`).
    pub optional: bool,
    /// Default value (`= {}`), if any.
    pub default: Option<Expr>,
}

/// The binding side of a parameter.
#[derive(Debug, Clone)]
pub enum Pat {
    /// `id`
    Ident(String),
    /// `{ join, cancelToken }`
    Object(Vec<BindingElement>),
}

/// One name bound by an object destructuring pattern.
#[derive(Debug, Clone)]
pub struct BindingElement {
    /// Bound name.
    pub name: String,
}

/// A TypeScript type expression.
#[derive(Debug, Clone)]
pub enum TsType {
    /// Primitive type: `string`, `number`, etc.
    Primitive(TsPrimitive),
    /// Literal type: `"content"`, `204`, `true`.
    Literal(Lit),
    /// Named type reference with optional type arguments:
    /// `Contact`, `Promise<Category>`.
    Ref {
        /// Referenced name.
        name: String,
        /// Type arguments, empty for a plain reference.
        args: Vec<TsType>,
    },
    /// Array type: `T[]`.
    Array(Box<TsType>),
    /// Union type: `A | B`.
    Union(Vec<TsType>),
    /// Intersection type: `A & B`.
    Intersection(Vec<TsType>),
    /// Type literal: `{ _id: string; _ref: "content" }`.
    Object(Vec<PropSig>),
}

impl TsType {
    /// A plain named reference without type arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Ref {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// The signature of the direct member `name`, if this is a type
    /// literal carrying one.
    pub fn prop(&self, name: &str) -> Option<&PropSig> {
        let Self::Object(sigs) = self else { return None };
        sigs.iter().find(|sig| sig.name.matches_ident(name))
    }

    /// The string-literal values this type can take: the literal itself,
    /// or every string literal of a union.
    fn literal_strings(&self) -> Vec<&str> {
        match self {
            Self::Literal(Lit::String(s)) => vec![s.as_str()],
            Self::Union(members) => members.iter().flat_map(Self::literal_strings).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether this is the structural shape of a media reference marker:
    /// a type literal whose `_ref` member is the literal `"media"`.
    pub fn is_media_ref(&self) -> bool {
        self.prop(REF_KEY).is_some_and(|sig| {
            matches!(&sig.ty, Some(Self::Literal(Lit::String(kind))) if kind == MEDIA_KIND)
        })
    }

    /// Whether this is the structural shape of a content reference
    /// marker: a type literal whose `_ref` member is a string literal
    /// (or a union of them). Media markers also satisfy this, so check
    /// [`is_media_ref`](Self::is_media_ref) first.
    pub fn is_content_ref(&self) -> bool {
        self.prop(REF_KEY).is_some_and(|sig| {
            sig.ty
                .as_ref()
                .is_some_and(|ty| !ty.literal_strings().is_empty())
        })
    }

    /// The reference-target type names a content marker declares in its
    /// `_content` member, canonicalized to PascalCase. Empty when the
    /// member is absent or carries no string literals.
    pub fn content_ref_targets(&self) -> Vec<String> {
        self.prop(&kind_discriminator(CONTENT_KIND))
            .and_then(|sig| sig.ty.as_ref())
            .map(|ty| ty.literal_strings().into_iter().map(pascal_case).collect())
            .unwrap_or_default()
    }
}

/// Primitive TypeScript types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `unknown`
    Unknown,
}

/// A literal value, usable in both type and expression position.
#[derive(Debug, Clone)]
pub enum Lit {
    /// String literal.
    String(String),
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
    /// `null`
    Null,
}

/// A property signature inside a type literal.
#[derive(Debug, Clone)]
pub struct PropSig {
    /// Property name.
    pub name: PropName,
    /// Property type. `None` for the degenerate `{ join }` shape some
    /// hand-edited sources contain.
    pub ty: Option<TsType>,
    /// Whether the property is optional (`join?: ...`).
    pub optional: bool,
}

/// A TypeScript expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Identifier reference.
    Ident(String),
    /// Literal value.
    Literal(Lit),
    /// Template literal: `` `/category/${id}` ``.
    Template(Vec<TemplatePart>),
    /// Function or method call.
    Call {
        /// Called expression.
        callee: Box<Expr>,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// Member access: `this._fetch`.
    Member {
        /// Accessed object.
        object: Box<Expr>,
        /// Member name.
        prop: String,
    },
    /// Constructor call: `new ApiError(...)`.
    New {
        /// Constructed expression.
        callee: Box<Expr>,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// `await expr`
    Await(Box<Expr>),
    /// Object literal.
    Object(Vec<ObjectProp>),
    /// Array literal.
    Array(Vec<Expr>),
    /// Binary operation.
    BinOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Type ascription: `expr as T`.
    Cast {
        /// Ascribed expression.
        expr: Box<Expr>,
        /// Ascribed type.
        ty: TsType,
    },
}

/// One segment of a template literal.
#[derive(Debug, Clone)]
pub enum TemplatePart {
    /// Literal text.
    Static(String),
    /// Interpolated expression: `${expr}`.
    Dynamic(Expr),
}

/// Binary operators the generator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `!=`
    NotEqual,
    /// `!==`
    StrictNotEqual,
}

/// One property of an object literal.
#[derive(Debug, Clone)]
pub enum ObjectProp {
    /// Shorthand property: `{ join }`.
    Shorthand(String),
    /// Key-value property: `{ join: {...} }`.
    KeyValue {
        /// Property key.
        key: PropName,
        /// Property value.
        value: Expr,
    },
    /// Spread property: `{ ...options }`.
    Spread(Expr),
}

/// A statement in a method body.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Variable declaration with initializer.
    VarDecl {
        /// `const` or `let`.
        kind: VarKind,
        /// Bound name.
        name: String,
        /// Type annotation, if any.
        ty: Option<TsType>,
        /// Initializer.
        init: Expr,
    },
    /// Expression statement.
    Expr(Expr),
    /// `return` with optional operand.
    Return(Option<Expr>),
    /// `if` statement with optional `else` block.
    If {
        /// Condition.
        cond: Expr,
        /// `then` branch body.
        then_body: Vec<Stmt>,
        /// `else` branch body, if present.
        else_body: Option<Vec<Stmt>>,
    },
    /// `throw` statement.
    Throw(Expr),
}

/// Variable declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// `const`
    Const,
    /// `let`
    Let,
}
