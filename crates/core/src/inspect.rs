//! Discovery of join-capable client methods.
//!
//! One pass over a generated module, producing the candidate list an
//! external selection step narrows down: every public method that takes
//! a `join` option, together with the reference types and properties
//! the option declares.

use tracing::debug;

use crate::Result;
use crate::ast::{Item, Lit, Module, Param, PropSig, TsType};
use crate::config::{JOIN_PROP, Join, Method};
use crate::util::pascal_case;

/// Collect the join-capable methods of `module`, in declaration order.
///
/// A method qualifies when its name does not start with `_` and one of
/// its parameter types carries a `join` property signature. The members
/// of that signature's type literal each contribute one [`Join`]: the
/// member name (PascalCased) is the reference-target type, and every
/// string literal found inside the member's type is a selectable
/// property.
pub fn inspect(module: &Module) -> Result<Vec<Method>> {
    let mut methods = Vec::new();
    for item in &module.items {
        let Item::Class(class) = item else { continue };
        for method in &class.methods {
            let name = method.name.ident_text()?;
            if name.starts_with('_') {
                continue;
            }
            let Some(join_sig) = find_join_sig(&method.params) else {
                continue;
            };
            let join = match &join_sig.ty {
                Some(ty) => collect_joins(ty)?,
                None => Vec::new(),
            };
            debug!(method = name, joins = join.len(), "join-capable method");
            methods.push(Method {
                name: name.to_owned(),
                join,
            });
        }
    }
    debug!(count = methods.len(), "inspection finished");
    Ok(methods)
}

/// The first `join` property signature found among the parameter types.
fn find_join_sig(params: &[Param]) -> Option<&PropSig> {
    params
        .iter()
        .filter_map(|param| param.ty.as_ref())
        .find_map(|ty| find_sig(ty, JOIN_PROP))
}

fn find_sig<'a>(ty: &'a TsType, name: &str) -> Option<&'a PropSig> {
    match ty {
        TsType::Object(sigs) => sigs
            .iter()
            .find(|sig| sig.name.matches_ident(name))
            .or_else(|| {
                sigs.iter()
                    .filter_map(|sig| sig.ty.as_ref())
                    .find_map(|inner| find_sig(inner, name))
            }),
        TsType::Union(members) | TsType::Intersection(members) => {
            members.iter().find_map(|member| find_sig(member, name))
        }
        TsType::Array(inner) => find_sig(inner, name),
        _ => None,
    }
}

/// One [`Join`] per member of the `join` option's type literal. Members
/// must be plain identifiers; anything else in the option shape means
/// the input does not follow the generator's contract.
fn collect_joins(ty: &TsType) -> Result<Vec<Join>> {
    let TsType::Object(sigs) = ty else {
        return Ok(Vec::new());
    };
    let mut joins = Vec::with_capacity(sigs.len());
    for sig in sigs {
        let type_name = pascal_case(sig.name.ident_text()?);
        let mut props = Vec::new();
        if let Some(member_ty) = &sig.ty {
            collect_props(member_ty, &mut props);
        }
        joins.push(Join { type_name, props });
    }
    Ok(joins)
}

/// Every string literal inside `ty`, declaration order, first occurrence
/// wins. Non-string members are ignored.
fn collect_props(ty: &TsType, props: &mut Vec<String>) {
    match ty {
        TsType::Literal(Lit::String(value)) => {
            if !props.iter().any(|p| p == value) {
                props.push(value.clone());
            }
        }
        TsType::Array(inner) => collect_props(inner, props),
        TsType::Union(members) | TsType::Intersection(members) => {
            for member in members {
                collect_props(member, props);
            }
        }
        TsType::Object(sigs) => {
            for sig in sigs {
                if let Some(inner) = &sig.ty {
                    collect_props(inner, props);
                }
            }
        }
        TsType::Ref { args, .. } => {
            for arg in args {
                collect_props(arg, props);
            }
        }
        _ => {}
    }
}
