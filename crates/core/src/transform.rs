//! Build-time rewriting of the generated client.
//!
//! The transformer takes the generator's module and a [`JoinConfig`]
//! and produces a client in which join behavior is baked in: the `join`
//! option disappears from every public method signature, configured
//! methods send their selection as a literal object, return-type
//! ascriptions are inlined with reference markers rewritten to the
//! placeholder types, type aliases are rewritten the same way, the core
//! `_fetchJson` method resolves references before returning, and the
//! runtime helper the output depends on is appended as source text.

use refjoin_runtime::REFS_KEY;
use tracing::{debug, trace, warn};

use crate::Result;
use crate::ast::{
    BindingElement, Expr, Item, Lit, MethodDecl, Module, ObjectProp, Param, PropName, PropSig,
    Stmt, TsType, TypeAlias,
};
use crate::config::{JOIN_PROP, Join, JoinConfig};
use crate::visit::{
    Rewriter, Visit, rewrite_expr, rewrite_method_parts, rewrite_module, rewrite_param_parts,
    rewrite_type,
};

/// TypeScript source of the runtime helper appended to every output:
/// the marker placeholder types and the `resolveRefs` function.
const RUNTIME_FRAGMENT: &str = include_str!("runtime_fragment.ts");

/// Injected resolver function name, as referenced in rewritten output.
const RESOLVER_FN: &str = "resolveRefs";

/// Core fetch method whose returns get wrapped in the resolver.
const FETCH_JSON: &str = "_fetchJson";

/// Placeholder alias for unexpanded content markers.
const CONTENT_PLACEHOLDER: &str = "ContentRef";

/// Placeholder alias for media markers.
const MEDIA_PLACEHOLDER: &str = "MediaRef";

/// Entity interface intersected into media markers.
const MEDIA_ENTITY: &str = "Media";

/// Alias names the alias-rewriting pass leaves untouched. Rewriting a
/// placeholder's own declaration would make it refer to itself.
const PINNED_ALIASES: [&str; 4] = [CONTENT_PLACEHOLDER, MEDIA_PLACEHOLDER, MEDIA_ENTITY, "Refs"];

/// Rewrite `module` according to `config` and append the runtime
/// fragment. The input module is left behind as the lookup source for
/// type-reference resolution, so ascriptions always inline the
/// pre-rewrite structure.
pub fn transform(module: Module, config: &JoinConfig) -> Result<Module> {
    let source = module.clone();
    let mut root = RootRewriter {
        config,
        source: &source,
        rewritten: Vec::new(),
    };
    let mut module = rewrite_module(module, &mut root)?;
    warn_missing_configured_methods(config, &root.rewritten);
    module
        .items
        .push(Item::Raw(RUNTIME_FRAGMENT.trim_end().to_string()));
    debug!("appended runtime resolver fragment");
    Ok(module)
}

fn warn_missing_configured_methods(config: &JoinConfig, rewritten: &[String]) {
    let configured: Vec<&str> = match config {
        JoinConfig::Methods(methods) => methods.iter().map(|m| m.name.as_str()).collect(),
        JoinConfig::Map(map) => map.keys().map(String::as_str).collect(),
    };
    for name in configured {
        if !rewritten.iter().any(|m| m == name) {
            warn!(method = name, "configured method not present in module");
        }
    }
}

/// Top-level pass: dispatches type aliases to marker rewriting and
/// methods to the per-method rules.
struct RootRewriter<'a> {
    config: &'a JoinConfig,
    source: &'a Module,
    rewritten: Vec<String>,
}

impl Rewriter for RootRewriter<'_> {
    fn enter_item(&mut self, item: &Item) -> Result<Visit<Item>> {
        let Item::TypeAlias(alias) = item else {
            return Ok(Visit::Descend);
        };
        if PINNED_ALIASES.contains(&alias.name.as_str()) {
            return Ok(Visit::Descend);
        }
        // Alias declarations get the no-configuration marker rules, so
        // entity types name the placeholders instead of marker shapes.
        let mut markers = MarkerRewriter { joins: None };
        match rewrite_type(alias.ty.clone(), &mut markers)? {
            Some(ty) => Ok(Visit::Replace(Item::TypeAlias(TypeAlias {
                name: alias.name.clone(),
                ty,
            }))),
            None => Ok(Visit::Remove),
        }
    }

    fn enter_method(&mut self, method: &MethodDecl) -> Result<Visit<MethodDecl>> {
        let name = method.name.ident_text()?;
        if name == FETCH_JSON {
            debug!("wrapping _fetchJson returns in the resolver");
            return Ok(Visit::Replace(rewrite_method_parts(
                method.clone(),
                &mut FetchWrapRewriter,
            )?));
        }
        if name.starts_with('_') {
            return Ok(Visit::Descend);
        }
        let joins = self.config.joins_for(name);
        debug!(method = name, configured = joins.is_some(), "rewriting method");
        self.rewritten.push(name.to_owned());
        let mut rewriter = MethodRewriter {
            joins: joins.as_deref(),
            source: self.source,
        };
        Ok(Visit::Replace(rewrite_method_parts(
            method.clone(),
            &mut rewriter,
        )?))
    }
}

/// Per-method rules: strip the join machinery, bake the configured
/// selection into the shorthand `join` property, and rewrite `as`
/// ascriptions.
struct MethodRewriter<'a> {
    joins: Option<&'a [Join]>,
    source: &'a Module,
}

impl Rewriter for MethodRewriter<'_> {
    fn enter_param(&mut self, param: &Param) -> Result<Visit<Param>> {
        // Rewrite the parameter's own subtree first, then drop the
        // whole parameter if stripping left an empty options type.
        let param = rewrite_param_parts(param.clone(), self)?;
        if matches!(&param.ty, Some(TsType::Object(sigs)) if sigs.is_empty()) {
            return Ok(Visit::Remove);
        }
        Ok(Visit::Replace(param))
    }

    fn enter_binding(&mut self, binding: &BindingElement) -> Result<Visit<BindingElement>> {
        if binding.name == JOIN_PROP || binding.name == REFS_KEY {
            return Ok(Visit::Remove);
        }
        Ok(Visit::Descend)
    }

    fn enter_sig(&mut self, sig: &PropSig) -> Result<Visit<PropSig>> {
        let name = sig.name.ident_text()?;
        if name == JOIN_PROP || name == REFS_KEY {
            return Ok(Visit::Remove);
        }
        Ok(Visit::Descend)
    }

    fn enter_prop(&mut self, prop: &ObjectProp) -> Result<Visit<ObjectProp>> {
        let ObjectProp::Shorthand(name) = prop else {
            return Ok(Visit::Descend);
        };
        if name != JOIN_PROP {
            return Ok(Visit::Descend);
        }
        match self.joins {
            None => Ok(Visit::Remove),
            Some(joins) => Ok(Visit::Replace(ObjectProp::KeyValue {
                key: PropName::Ident(JOIN_PROP.into()),
                value: join_literal(joins),
            })),
        }
    }

    fn enter_expr(&mut self, expr: &Expr) -> Result<Visit<Expr>> {
        let Expr::Cast { expr: inner, ty } = expr else {
            return Ok(Visit::Descend);
        };
        // The value side follows the method rules; the ascribed type
        // follows the return-type rules.
        let Some(inner) = rewrite_expr((**inner).clone(), self)? else {
            return Ok(Visit::Remove);
        };
        let mut types = AsTypeRewriter {
            joins: self.joins,
            source: self.source,
        };
        let ty = rewrite_type(ty.clone(), &mut types)?.map(prune_empty_literals);
        Ok(Visit::Replace(match ty {
            Some(ty) => Expr::Cast {
                expr: Box::new(inner),
                ty,
            },
            None => inner,
        }))
    }
}

/// The literal object a configured shorthand `join` becomes:
/// `{ Contact: ["name", "email"] }`.
fn join_literal(joins: &[Join]) -> Expr {
    Expr::Object(
        joins
            .iter()
            .map(|join| ObjectProp::KeyValue {
                key: PropName::Ident(join.type_name.clone()),
                value: Expr::Array(
                    join.props
                        .iter()
                        .map(|prop| Expr::Literal(Lit::String(prop.clone())))
                        .collect(),
                ),
            })
            .collect(),
    )
}

/// Ascription rules: drop `_refs` signatures and inline resolved type
/// references with their markers rewritten.
struct AsTypeRewriter<'a> {
    joins: Option<&'a [Join]>,
    source: &'a Module,
}

impl Rewriter for AsTypeRewriter<'_> {
    fn enter_sig(&mut self, sig: &PropSig) -> Result<Visit<PropSig>> {
        if sig.name.matches_ident(REFS_KEY) {
            return Ok(Visit::Remove);
        }
        Ok(Visit::Descend)
    }

    fn enter_type(&mut self, ty: &TsType) -> Result<Visit<TsType>> {
        let TsType::Ref { name, .. } = ty else {
            return Ok(Visit::Descend);
        };
        let Some(resolved) = self.source.find_type(name) else {
            // Not an alias of this module (Promise, external types):
            // leave the reference, but keep walking type arguments.
            trace!(name = %name, "type reference not resolvable");
            return Ok(Visit::Descend);
        };
        let mut markers = MarkerRewriter { joins: self.joins };
        match rewrite_type(resolved.clone(), &mut markers)? {
            Some(resolved) => Ok(Visit::Replace(resolved)),
            None => Ok(Visit::Remove),
        }
    }
}

/// Rewrites structural reference-marker shapes into their placeholder
/// forms, intersecting in the entity types the configuration selects.
struct MarkerRewriter<'a> {
    joins: Option<&'a [Join]>,
}

impl Rewriter for MarkerRewriter<'_> {
    fn enter_type(&mut self, ty: &TsType) -> Result<Visit<TsType>> {
        if ty.is_media_ref() {
            return Ok(Visit::Replace(TsType::Intersection(vec![
                TsType::named(MEDIA_PLACEHOLDER),
                TsType::named(MEDIA_ENTITY),
            ])));
        }
        if ty.is_content_ref() {
            let mut joined: Vec<TsType> = ty
                .content_ref_targets()
                .into_iter()
                .filter(|target| {
                    self.joins
                        .is_some_and(|joins| joins.iter().any(|j| j.type_name == *target))
                })
                .map(TsType::named)
                .collect();
            let replacement = if joined.is_empty() {
                TsType::named(CONTENT_PLACEHOLDER)
            } else {
                let entity = if joined.len() == 1 {
                    joined.swap_remove(0)
                } else {
                    TsType::Union(joined)
                };
                TsType::Intersection(vec![TsType::named(CONTENT_PLACEHOLDER), entity])
            };
            return Ok(Visit::Replace(replacement));
        }
        Ok(Visit::Descend)
    }
}

/// Wraps every `return <expr>` of `_fetchJson` in the resolver call.
/// A bare `return;` has nothing to resolve and stays as it is.
struct FetchWrapRewriter;

impl Rewriter for FetchWrapRewriter {
    fn enter_stmt(&mut self, stmt: &Stmt) -> Result<Visit<Stmt>> {
        let Stmt::Return(Some(expr)) = stmt else {
            return Ok(Visit::Descend);
        };
        Ok(Visit::Replace(Stmt::Return(Some(Expr::Call {
            callee: Box::new(Expr::Ident(RESOLVER_FN.into())),
            args: vec![expr.clone()],
        }))))
    }
}

/// Drop empty type-literal members left behind by signature stripping,
/// so ascriptions do not come out as `T & {}`.
fn prune_empty_literals(ty: TsType) -> TsType {
    let TsType::Intersection(members) = ty else {
        return ty;
    };
    let mut members: Vec<TsType> = members
        .into_iter()
        .filter(|member| !matches!(member, TsType::Object(sigs) if sigs.is_empty()))
        .collect();
    match members.len() {
        0 => TsType::Object(Vec::new()),
        1 => members.swap_remove(0),
        _ => TsType::Intersection(members),
    }
}
