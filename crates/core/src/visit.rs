//! Tree traversal with selective rewriting.
//!
//! All rewriting passes share one primitive: a [`Rewriter`] is handed
//! each node on the way down and answers with a [`Visit`] verdict. The
//! driver functions below own the recursion, so a pass only implements
//! the hooks for the node categories it cares about and inherits
//! default descent everywhere else.

use crate::Result;
use crate::ast::{
    BindingElement, ClassDecl, Expr, Item, MethodDecl, Module, ObjectProp, Param, Pat, PropSig,
    Stmt, TemplatePart, TsType, TypeAlias,
};

/// Verdict for one node during a rewriting pass.
#[derive(Debug)]
pub enum Visit<T> {
    /// Substitute this node. The replacement is taken as-is and not
    /// entered again.
    Replace(T),
    /// Drop this node and everything under it.
    Remove,
    /// Keep this node and rewrite its children.
    Descend,
}

/// Hooks for intercepting node categories during a rewrite.
///
/// Every hook defaults to [`Visit::Descend`]. Removal verdicts are
/// interpreted by position: a node in a list (items, methods, params,
/// signatures, statements, arguments, object properties) is dropped
/// from the list; an optional slot (a type annotation, a default value,
/// a `return` operand) is cleared; a required slot removes the nearest
/// enclosing node that cannot stand without it. The one exception is a
/// type ascription, which collapses to its expression when the ascribed
/// type is removed.
pub trait Rewriter {
    /// Called for each top-level module item.
    fn enter_item(&mut self, _item: &Item) -> Result<Visit<Item>> {
        Ok(Visit::Descend)
    }

    /// Called for each class method.
    fn enter_method(&mut self, _method: &MethodDecl) -> Result<Visit<MethodDecl>> {
        Ok(Visit::Descend)
    }

    /// Called for each method parameter.
    fn enter_param(&mut self, _param: &Param) -> Result<Visit<Param>> {
        Ok(Visit::Descend)
    }

    /// Called for each name bound by a destructuring pattern.
    fn enter_binding(&mut self, _binding: &BindingElement) -> Result<Visit<BindingElement>> {
        Ok(Visit::Descend)
    }

    /// Called for each property signature of a type literal.
    fn enter_sig(&mut self, _sig: &PropSig) -> Result<Visit<PropSig>> {
        Ok(Visit::Descend)
    }

    /// Called for each type expression.
    fn enter_type(&mut self, _ty: &TsType) -> Result<Visit<TsType>> {
        Ok(Visit::Descend)
    }

    /// Called for each statement.
    fn enter_stmt(&mut self, _stmt: &Stmt) -> Result<Visit<Stmt>> {
        Ok(Visit::Descend)
    }

    /// Called for each expression.
    fn enter_expr(&mut self, _expr: &Expr) -> Result<Visit<Expr>> {
        Ok(Visit::Descend)
    }

    /// Called for each property of an object literal.
    fn enter_prop(&mut self, _prop: &ObjectProp) -> Result<Visit<ObjectProp>> {
        Ok(Visit::Descend)
    }
}

/// Rewrite a whole module.
pub fn rewrite_module<R: Rewriter>(module: Module, rw: &mut R) -> Result<Module> {
    let mut items = Vec::with_capacity(module.items.len());
    for item in module.items {
        if let Some(item) = rewrite_item(item, rw)? {
            items.push(item);
        }
    }
    Ok(Module { items })
}

/// Rewrite one top-level item.
pub fn rewrite_item<R: Rewriter>(item: Item, rw: &mut R) -> Result<Option<Item>> {
    match rw.enter_item(&item)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => Ok(match item {
            Item::TypeAlias(TypeAlias { name, ty }) => {
                rewrite_type(ty, rw)?.map(|ty| Item::TypeAlias(TypeAlias { name, ty }))
            }
            Item::Class(ClassDecl { name, methods }) => {
                let mut kept = Vec::with_capacity(methods.len());
                for method in methods {
                    if let Some(method) = rewrite_method(method, rw)? {
                        kept.push(method);
                    }
                }
                Some(Item::Class(ClassDecl {
                    name,
                    methods: kept,
                }))
            }
            Item::Raw(src) => Some(Item::Raw(src)),
        }),
    }
}

/// Rewrite one method declaration.
pub fn rewrite_method<R: Rewriter>(method: MethodDecl, rw: &mut R) -> Result<Option<MethodDecl>> {
    match rw.enter_method(&method)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => Ok(Some(rewrite_method_parts(method, rw)?)),
    }
}

/// Rewrite a method's parameters, return type, and body without calling
/// the method hook again. Passes that intercept a method and still want
/// its children rewritten call this directly.
pub fn rewrite_method_parts<R: Rewriter>(method: MethodDecl, rw: &mut R) -> Result<MethodDecl> {
    let mut params = Vec::with_capacity(method.params.len());
    for param in method.params {
        if let Some(param) = rewrite_param(param, rw)? {
            params.push(param);
        }
    }
    let return_type = match method.return_type {
        Some(ty) => rewrite_type(ty, rw)?,
        None => None,
    };
    let body = rewrite_stmts(method.body, rw)?;
    Ok(MethodDecl {
        name: method.name,
        is_async: method.is_async,
        params,
        return_type,
        body,
    })
}

/// Rewrite one parameter.
pub fn rewrite_param<R: Rewriter>(param: Param, rw: &mut R) -> Result<Option<Param>> {
    match rw.enter_param(&param)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => Ok(Some(rewrite_param_parts(param, rw)?)),
    }
}

/// Rewrite a parameter's pattern, type, and default without calling the
/// parameter hook again.
pub fn rewrite_param_parts<R: Rewriter>(param: Param, rw: &mut R) -> Result<Param> {
    let pat = match param.pat {
        Pat::Ident(name) => Pat::Ident(name),
        Pat::Object(bindings) => {
            let mut kept = Vec::with_capacity(bindings.len());
            for binding in bindings {
                match rw.enter_binding(&binding)? {
                    Visit::Replace(next) => kept.push(next),
                    Visit::Remove => {}
                    Visit::Descend => kept.push(binding),
                }
            }
            Pat::Object(kept)
        }
    };
    let ty = match param.ty {
        Some(ty) => rewrite_type(ty, rw)?,
        None => None,
    };
    let default = match param.default {
        Some(expr) => rewrite_expr(expr, rw)?,
        None => None,
    };
    Ok(Param {
        pat,
        ty,
        optional: param.optional,
        default,
    })
}

/// Rewrite one type expression.
pub fn rewrite_type<R: Rewriter>(ty: TsType, rw: &mut R) -> Result<Option<TsType>> {
    match rw.enter_type(&ty)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => Ok(match ty {
            TsType::Ref { name, args } => Some(TsType::Ref {
                name,
                args: rewrite_types(args, rw)?,
            }),
            TsType::Array(inner) => {
                rewrite_type(*inner, rw)?.map(|inner| TsType::Array(Box::new(inner)))
            }
            TsType::Union(members) => {
                let members = rewrite_types(members, rw)?;
                if members.is_empty() {
                    None
                } else {
                    Some(TsType::Union(members))
                }
            }
            TsType::Intersection(members) => {
                let members = rewrite_types(members, rw)?;
                if members.is_empty() {
                    None
                } else {
                    Some(TsType::Intersection(members))
                }
            }
            TsType::Object(sigs) => {
                let mut kept = Vec::with_capacity(sigs.len());
                for sig in sigs {
                    if let Some(sig) = rewrite_sig(sig, rw)? {
                        kept.push(sig);
                    }
                }
                Some(TsType::Object(kept))
            }
            leaf @ (TsType::Primitive(_) | TsType::Literal(_)) => Some(leaf),
        }),
    }
}

/// Rewrite one property signature.
pub fn rewrite_sig<R: Rewriter>(sig: PropSig, rw: &mut R) -> Result<Option<PropSig>> {
    match rw.enter_sig(&sig)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => {
            let ty = match sig.ty {
                Some(ty) => rewrite_type(ty, rw)?,
                None => None,
            };
            Ok(Some(PropSig {
                name: sig.name,
                ty,
                optional: sig.optional,
            }))
        }
    }
}

/// Rewrite one statement.
pub fn rewrite_stmt<R: Rewriter>(stmt: Stmt, rw: &mut R) -> Result<Option<Stmt>> {
    match rw.enter_stmt(&stmt)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => Ok(match stmt {
            Stmt::VarDecl {
                kind,
                name,
                ty,
                init,
            } => {
                let ty = match ty {
                    Some(ty) => rewrite_type(ty, rw)?,
                    None => None,
                };
                // A declaration cannot stand without its initializer.
                rewrite_expr(init, rw)?.map(|init| Stmt::VarDecl {
                    kind,
                    name,
                    ty,
                    init,
                })
            }
            Stmt::Expr(expr) => rewrite_expr(expr, rw)?.map(Stmt::Expr),
            Stmt::Return(None) => Some(Stmt::Return(None)),
            Stmt::Return(Some(expr)) => Some(Stmt::Return(rewrite_expr(expr, rw)?)),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => match rewrite_expr(cond, rw)? {
                Some(cond) => Some(Stmt::If {
                    cond,
                    then_body: rewrite_stmts(then_body, rw)?,
                    else_body: match else_body {
                        Some(body) => Some(rewrite_stmts(body, rw)?),
                        None => None,
                    },
                }),
                None => None,
            },
            Stmt::Throw(expr) => rewrite_expr(expr, rw)?.map(Stmt::Throw),
        }),
    }
}

/// Rewrite one expression.
pub fn rewrite_expr<R: Rewriter>(expr: Expr, rw: &mut R) -> Result<Option<Expr>> {
    match rw.enter_expr(&expr)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => Ok(match expr {
            Expr::Template(parts) => {
                let mut kept = Vec::with_capacity(parts.len());
                for part in parts {
                    match part {
                        TemplatePart::Static(text) => kept.push(TemplatePart::Static(text)),
                        TemplatePart::Dynamic(inner) => {
                            if let Some(inner) = rewrite_expr(inner, rw)? {
                                kept.push(TemplatePart::Dynamic(inner));
                            }
                        }
                    }
                }
                Some(Expr::Template(kept))
            }
            Expr::Call { callee, args } => match rewrite_expr(*callee, rw)? {
                Some(callee) => Some(Expr::Call {
                    callee: Box::new(callee),
                    args: rewrite_exprs(args, rw)?,
                }),
                None => None,
            },
            Expr::Member { object, prop } => rewrite_expr(*object, rw)?.map(|object| Expr::Member {
                object: Box::new(object),
                prop,
            }),
            Expr::New { callee, args } => match rewrite_expr(*callee, rw)? {
                Some(callee) => Some(Expr::New {
                    callee: Box::new(callee),
                    args: rewrite_exprs(args, rw)?,
                }),
                None => None,
            },
            Expr::Await(inner) => rewrite_expr(*inner, rw)?.map(|inner| Expr::Await(Box::new(inner))),
            Expr::Object(props) => {
                let mut kept = Vec::with_capacity(props.len());
                for prop in props {
                    if let Some(prop) = rewrite_prop(prop, rw)? {
                        kept.push(prop);
                    }
                }
                Some(Expr::Object(kept))
            }
            Expr::Array(items) => Some(Expr::Array(rewrite_exprs(items, rw)?)),
            Expr::BinOp { left, op, right } => {
                match (rewrite_expr(*left, rw)?, rewrite_expr(*right, rw)?) {
                    (Some(left), Some(right)) => Some(Expr::BinOp {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    }),
                    _ => None,
                }
            }
            Expr::Cast { expr, ty } => match rewrite_expr(*expr, rw)? {
                Some(inner) => Some(match rewrite_type(ty, rw)? {
                    Some(ty) => Expr::Cast {
                        expr: Box::new(inner),
                        ty,
                    },
                    // The ascription collapses to its expression.
                    None => inner,
                }),
                None => None,
            },
            leaf @ (Expr::Ident(_) | Expr::Literal(_)) => Some(leaf),
        }),
    }
}

/// Rewrite one object-literal property.
pub fn rewrite_prop<R: Rewriter>(prop: ObjectProp, rw: &mut R) -> Result<Option<ObjectProp>> {
    match rw.enter_prop(&prop)? {
        Visit::Replace(next) => Ok(Some(next)),
        Visit::Remove => Ok(None),
        Visit::Descend => Ok(match prop {
            ObjectProp::Shorthand(name) => Some(ObjectProp::Shorthand(name)),
            ObjectProp::KeyValue { key, value } => {
                rewrite_expr(value, rw)?.map(|value| ObjectProp::KeyValue { key, value })
            }
            ObjectProp::Spread(expr) => rewrite_expr(expr, rw)?.map(ObjectProp::Spread),
        }),
    }
}

fn rewrite_stmts<R: Rewriter>(stmts: Vec<Stmt>, rw: &mut R) -> Result<Vec<Stmt>> {
    let mut kept = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        if let Some(stmt) = rewrite_stmt(stmt, rw)? {
            kept.push(stmt);
        }
    }
    Ok(kept)
}

fn rewrite_exprs<R: Rewriter>(exprs: Vec<Expr>, rw: &mut R) -> Result<Vec<Expr>> {
    let mut kept = Vec::with_capacity(exprs.len());
    for expr in exprs {
        if let Some(expr) = rewrite_expr(expr, rw)? {
            kept.push(expr);
        }
    }
    Ok(kept)
}

fn rewrite_types<R: Rewriter>(types: Vec<TsType>, rw: &mut R) -> Result<Vec<TsType>> {
    let mut kept = Vec::with_capacity(types.len());
    for ty in types {
        if let Some(ty) = rewrite_type(ty, rw)? {
            kept.push(ty);
        }
    }
    Ok(kept)
}
