//! Lazy resolution of declared objects and expressions.
//!
//! Each object moves through three states: unresolved (type and value
//! absent), in progress (on the resolution path, the cycle-detection
//! guard), and resolved (type set, value set where applicable). Resolution
//! is demand-driven: referencing an identifier resolves its object first,
//! so source order is irrelevant and forward references work. Every object
//! is resolved at most once; failures leave it partially resolved with a
//! recorded diagnostic, and sibling declarations continue.

use mica_syntax::{Node, Op};

use crate::constant::{self, ConstError, Value};
use crate::kind::Kind;
use crate::obj::ObjClass;
use crate::objects::{ObjKey, TypeKey};

use super::checker::Checker;
use super::errors::TypeError;

/// Outcome of an assignability check.
enum AssignCheck {
    Ok,
    Overflow,
    Mismatch,
}

impl Checker {
    /// Resolves every collected global, in name order for deterministic
    /// diagnostics.
    pub fn resolve_all(&mut self) {
        for name in self.sem.scopes[self.scope].sorted_names() {
            if let Some(okey) = self.global_object(&name) {
                self.resolve_object(okey);
            }
        }
    }

    /// Resolves a variable object: no-op if already resolved.
    pub fn resolve_var(&mut self, okey: ObjKey) {
        self.resolve_object(okey);
    }

    /// Resolves a constant object: no-op if type and value are already
    /// set.
    pub fn resolve_const(&mut self, okey: ObjKey) {
        self.resolve_object(okey);
    }

    /// Resolves any object by class, guarded against cyclic resolution:
    /// re-entering an object already on the resolution path reports
    /// `CyclicDeclaration` instead of recursing forever.
    pub fn resolve_object(&mut self, okey: ObjKey) {
        if self.obj_path.contains(&okey) {
            let name = self.sem.objs[okey].name().to_string();
            self.error(TypeError::CyclicDeclaration.with_message(format!(
                "illegal cycle in declaration of `{}`",
                name
            )));
            return;
        }
        self.obj_path.push(okey);
        if self.trace() {
            let msg = format!("-- resolving {}", self.sem.objs[okey]);
            self.trace_begin(&msg);
        }
        match self.sem.objs[okey].class() {
            ObjClass::Const => self.declare_const(okey),
            ObjClass::Var => self.declare_var(okey),
            ObjClass::Type => self.declare_type(okey),
            ObjClass::Func => self.declare_func(okey),
            // Imports, builtins, and generics carry no lazily-computed
            // type in this core.
            _ => {}
        }
        self.trace_end();
        self.obj_path.pop();
    }

    // ------------------------------------------------------------------------
    // Per-class declaration resolution

    fn declare_var(&mut self, okey: ObjKey) {
        if self.sem.objs[okey].typ().is_some() {
            return; // already resolved
        }
        let name = self.sem.objs[okey].name().to_string();
        let Some(dkey) = self.sem.objs[okey].decl() else {
            return self.missing_declaration(&name);
        };
        let decl = self.sem.decls[dkey].as_var().clone();
        if decl.typ.is_none() && decl.init.is_none() {
            return self.missing_declaration(&name);
        }
        if decl.shared {
            // One multi-valued initializer for several names; deferred in
            // this core. The object stays unresolved and inspectable.
            return;
        }

        let mut t: Option<TypeKey> = None;
        let mut v = Value::Unknown;
        if let Some(init) = &decl.init {
            let (ti, vi) = self.resolve_expr(init);
            t = ti;
            v = vi;
        }

        if let Some(tnode) = &decl.typ {
            let Some(decl_t) = self.make_type(tnode) else {
                return;
            };
            match t {
                // The declared type wins when the initializer's type is
                // assignable to it.
                None => t = Some(decl_t),
                Some(inferred) => match self.check_assignable(inferred, &v, decl_t) {
                    AssignCheck::Ok => t = Some(decl_t),
                    AssignCheck::Overflow => {
                        let ts = self.sem.type_str(decl_t);
                        return self.error(TypeError::ConstantOverflow.at_with_message(
                            tnode.span(),
                            format!("constant {} overflows {}", v, ts),
                        ));
                    }
                    AssignCheck::Mismatch => {
                        let (from, to) = (self.sem.type_str(inferred), self.sem.type_str(decl_t));
                        return self.error(TypeError::NotAssignable.at_with_message(
                            tnode.span(),
                            format!("cannot use {} value as {} in declaration of `{}`", from, to, name),
                        ));
                    }
                },
            }
        }

        let Some(mut tk) = t else {
            return self.missing_declaration(&name);
        };

        // An untyped initializer without a declared type assumes its
        // default type.
        let kind = self.sem.types[tk].kind();
        if kind.is_untyped() {
            let dk = kind.default_kind();
            if dk == Kind::Invalid {
                let span = decl.init.as_ref().map(|n| n.span()).unwrap_or_default();
                return self.error(
                    TypeError::UseOfUntypedNil
                        .at_with_message(span, format!("use of untyped nil in declaration of `{}`", name)),
                );
            }
            tk = self.universe.basic(dk);
        }

        if v.is_valid() {
            let target_kind = self.sem.types[self.sem.underlying(tk)].kind();
            match v.convert_to(target_kind, self.sem.target()) {
                // The constant initial value travels with the variable.
                Ok(v2) => self.sem.objs[okey].set_const_value(v2),
                Err(e) => return self.const_conversion_error(&decl, &name, &v, tk, e),
            }
        }
        self.sem.set_obj_type(okey, tk);
    }

    fn declare_const(&mut self, okey: ObjKey) {
        let obj = &self.sem.objs[okey];
        if obj.typ().is_some() && obj.const_value().is_some() {
            return; // already resolved
        }
        if obj.typ().is_some() && obj.decl().is_none() {
            return; // predeclared (iota, nil): nothing to resolve
        }
        let name = obj.name().to_string();
        let Some(dkey) = obj.decl() else {
            return self.missing_declaration(&name);
        };
        let decl = self.sem.decls[dkey].as_const().clone();
        if decl.typ.is_none() && decl.init.is_none() {
            return self.missing_declaration(&name);
        }
        if decl.shared {
            return; // multi-valued initializer, deferred
        }

        // Bind `iota` for the duration of this initializer. The closure
        // shape guarantees the previous binding is restored on every exit
        // path, including error returns.
        let index = decl.index;
        let resolved = self.with_iota(constant::make_int64(index as i64), |c| {
            c.const_decl_body(&name, &decl)
        });
        if let Some((t, v)) = resolved {
            self.sem.set_obj_type(okey, t);
            self.sem.objs[okey].set_const_value(v);
        }
    }

    fn const_decl_body(
        &mut self,
        name: &str,
        decl: &super::collect::ConstDecl,
    ) -> Option<(TypeKey, Value)> {
        let mut t: Option<TypeKey> = None;
        let mut v = Value::Unknown;

        if let Some(init) = &decl.init {
            let (kind, value) = self.resolve_const_value(init);
            if value.is_unknown() {
                return None; // reported by resolve_const_value
            }
            t = Some(self.universe.basic(kind));
            v = value;
        }

        if let Some(tnode) = &decl.typ {
            let decl_t = self.make_type(tnode)?;
            let target_kind = self.sem.types[self.sem.underlying(decl_t)].kind();
            if !target_kind.is_basic() {
                let ts = self.sem.type_str(decl_t);
                self.error(TypeError::ConstantTypeMismatch.at_with_message(
                    tnode.span(),
                    format!("invalid constant type {} for `{}`", ts, name),
                ));
                return None;
            }
            if decl.init.is_none() {
                v = constant::zero_of(target_kind);
            } else {
                match v.convert_to(target_kind, self.sem.target()) {
                    Ok(v2) => v = v2,
                    Err(e) => {
                        let span = decl.init.as_ref().map(|n| n.span()).unwrap_or_default();
                        let ts = self.sem.type_str(decl_t);
                        match e {
                            ConstError::Overflow => {
                                self.error(TypeError::ConstantOverflow.at_with_message(
                                    span,
                                    format!("constant {} overflows {}", v, ts),
                                ));
                            }
                            ConstError::TypeMismatch => {
                                self.error(TypeError::ConstantTypeMismatch.at_with_message(
                                    span,
                                    format!("cannot convert {} to {}", v, ts),
                                ));
                            }
                        }
                        return None;
                    }
                }
            }
            t = Some(decl_t);
        }

        t.map(|t| (t, v))
    }

    fn declare_type(&mut self, okey: ObjKey) {
        if self.sem.objs[okey].typ().is_some() {
            return;
        }
        let name = self.sem.objs[okey].name().to_string();
        let Some(dkey) = self.sem.objs[okey].decl() else {
            return self.missing_declaration(&name);
        };
        let decl = self.sem.decls[dkey].as_type().clone();

        if decl.alias {
            // A transparent synonym: the object binds the aliased type
            // directly, no new named identity.
            if let Some(t) = self.make_type(&decl.expr) {
                self.sem.set_obj_type(okey, t);
            }
            return;
        }

        // A definition creates the named type *before* its underlying
        // resolves, so self-references through pointers or aggregates find
        // the named type instead of recursing.
        let named = self.sem.new_named(name.clone(), None, None);
        self.sem.set_obj_type(okey, named);
        if let Some(underlying) = self.make_type(&decl.expr) {
            if self.named_chain_contains(underlying, named) {
                self.error(TypeError::CyclicDeclaration.at_with_message(
                    decl.expr.span(),
                    format!("invalid recursive type `{}`", name),
                ));
                return;
            }
            self.sem.set_named_underlying(named, underlying);
            self.sem.complete_type(named);
        }
    }

    fn declare_func(&mut self, okey: ObjKey) {
        if self.sem.objs[okey].typ().is_some() {
            return;
        }
        let name = self.sem.objs[okey].name().to_string();
        let Some(dkey) = self.sem.objs[okey].decl() else {
            return self.missing_declaration(&name);
        };
        let decl = self.sem.decls[dkey].as_func().clone();
        let Some(tnode) = &decl.typ else {
            return self.missing_declaration(&name);
        };
        let Some(t) = self.make_type(tnode) else {
            return;
        };
        if self.sem.types[t].as_func().is_none() {
            return self.error(TypeError::MalformedDeclaration.at_with_message(
                tnode.span(),
                format!("declaration of func `{}` requires a function type", name),
            ));
        }
        self.sem.set_obj_type(okey, t);
    }

    // ------------------------------------------------------------------------
    // Expressions

    /// Resolves an expression to its type and, when constant, its folded
    /// value. Results are cached by node identity, so repeated references
    /// do not re-evaluate.
    pub fn resolve_expr(&mut self, node: &Node) -> (Option<TypeKey>, Value) {
        if let Some(&t) = self.types.get(&node.id()) {
            let v = self.values.get(&node.id()).cloned().unwrap_or_default();
            return (Some(t), v);
        }

        let (t, v) = self.resolve_expr_uncached(node);

        if let Some(t) = t {
            self.types.insert(node.id(), t);
        }
        if v.is_valid() {
            self.values.insert(node.id(), v.clone());
        }
        (t, v)
    }

    fn resolve_expr_uncached(&mut self, node: &Node) -> (Option<TypeKey>, Value) {
        match node.op() {
            Op::Ident => self.ident_expr(node),
            // Recognized, but their typing is deferred in this core:
            // surrounding resolution proceeds best-effort.
            Op::Call | Op::CompositeLit | Op::Selector | Op::Index => (None, Value::Unknown),
            op => match node.len() {
                0 => self.atom_expr(node),
                1 if op.is_operator() => self.unary_expr(node),
                2 if op.is_operator() => self.binary_expr(node),
                n => {
                    self.error(TypeError::UnsupportedExpression.at_with_message(
                        node.span(),
                        format!("unsupported {}-argument expression: {}", n, node),
                    ));
                    (None, Value::Unknown)
                }
            },
        }
    }

    fn ident_expr(&mut self, node: &Node) -> (Option<TypeKey>, Value) {
        let name = node.lit();
        let Some((_, okey)) = self.lookup(name) else {
            self.error(
                TypeError::Undeclared
                    .at_with_message(node.span(), format!("undeclared name: {}", name)),
            );
            return (None, Value::Unknown);
        };
        match self.sem.objs[okey].class() {
            ObjClass::Const => {
                if self.is_universe_iota(okey) {
                    return match self.iota.clone() {
                        Some(v) => (Some(self.universe.basic(Kind::UntypedInt)), v),
                        None => {
                            self.error(TypeError::IotaOutsideConst.at(node.span()));
                            (None, Value::Unknown)
                        }
                    };
                }
                self.resolve_object(okey);
                let obj = &self.sem.objs[okey];
                (obj.typ(), obj.const_value().cloned().unwrap_or_default())
            }
            ObjClass::Var | ObjClass::Func => {
                self.resolve_object(okey);
                (self.sem.objs[okey].typ(), Value::Unknown)
            }
            class => {
                self.error(TypeError::NotAnExpression.at_with_message(
                    node.span(),
                    format!("{} {} is not an expression", class, name),
                ));
                (None, Value::Unknown)
            }
        }
    }

    fn atom_expr(&mut self, node: &Node) -> (Option<TypeKey>, Value) {
        let op = node.op();
        if !op.is_literal() {
            self.error(TypeError::UnsupportedExpression.at_with_message(
                node.span(),
                format!("unsupported 0-argument expression: {}", node),
            ));
            return (None, Value::Unknown);
        }
        match constant::from_literal(node.lit(), op) {
            Some(v) => {
                let kind = literal_kind(op);
                (Some(self.universe.basic(kind)), v)
            }
            None => {
                self.error(TypeError::InvalidLiteral.at_with_message(
                    node.span(),
                    format!("invalid {} literal: {}", op, node.lit()),
                ));
                (None, Value::Unknown)
            }
        }
    }

    fn unary_expr(&mut self, node: &Node) -> (Option<TypeKey>, Value) {
        let Some(operand) = node.child(0) else {
            self.error(TypeError::UnsupportedExpression.at(node.span()));
            return (None, Value::Unknown);
        };
        let operand = operand.clone();
        let (t, v) = self.resolve_expr(&operand);
        let v = if v.is_valid() {
            constant::unary_op(node.op(), &v, 0)
        } else {
            v
        };
        (t, v)
    }

    fn binary_expr(&mut self, node: &Node) -> (Option<TypeKey>, Value) {
        let (Some(lhs), Some(rhs)) = (node.child(0), node.child(1)) else {
            self.error(TypeError::UnsupportedExpression.at(node.span()));
            return (None, Value::Unknown);
        };
        let (lhs, rhs) = (lhs.clone(), rhs.clone());
        let op = node.op();
        let (t1, v1) = self.resolve_expr(&lhs);
        let (t2, v2) = self.resolve_expr(&rhs);

        let v = if v1.is_valid() && v2.is_valid() {
            if op.is_shift() {
                match shift_count(&v2) {
                    Some(s) => constant::shift(&v1, op, s),
                    None => {
                        self.error(TypeError::InvalidShiftCount.at_with_message(
                            rhs.span(),
                            format!("invalid shift count {}", v2),
                        ));
                        Value::Unknown
                    }
                }
            } else if op.is_comparison() {
                constant::make_bool(constant::compare(&v1, op, &v2))
            } else {
                constant::binary_op(&v1, op, &v2)
            }
        } else {
            Value::Unknown
        };

        let t = if op.is_comparison() {
            Some(self.universe.basic(Kind::UntypedBool))
        } else if op.is_shift() {
            t1 // a shift has the type of its left operand
        } else {
            self.combine_types(node, t1, t2, &v1, &v2)
        };
        (t, v)
    }

    /// Combines the operand types of a binary expression: an untyped
    /// constant is absorbed into the typed operand (after a
    /// representability check), two untyped operands merge to the
    /// higher-ranked untyped kind, and two distinct typed operand types
    /// are an error.
    fn combine_types(
        &mut self,
        node: &Node,
        t1: Option<TypeKey>,
        t2: Option<TypeKey>,
        v1: &Value,
        v2: &Value,
    ) -> Option<TypeKey> {
        let (a, b) = match (t1, t2) {
            (Some(a), Some(b)) => (a, b),
            // A deferred operand leaves the whole expression untyped;
            // resolution continues best-effort.
            _ => return None,
        };
        if a == b {
            return Some(a);
        }
        let ka = self.sem.types[a].kind();
        let kb = self.sem.types[b].kind();
        match (ka.is_untyped(), kb.is_untyped()) {
            (true, false) => self.absorb_untyped(node, a, v1, b),
            (false, true) => self.absorb_untyped(node, b, v2, a),
            (true, true) => match merge_untyped(ka, kb) {
                Some(k) => Some(self.universe.basic(k)),
                None => {
                    self.type_mismatch(node, a, b);
                    None
                }
            },
            (false, false) => {
                if self.sem.underlying(a) == self.sem.underlying(b) {
                    Some(a)
                } else {
                    self.type_mismatch(node, a, b);
                    None
                }
            }
        }
    }

    fn absorb_untyped(
        &mut self,
        node: &Node,
        untyped: TypeKey,
        value: &Value,
        typed: TypeKey,
    ) -> Option<TypeKey> {
        let target_kind = self.sem.types[self.sem.underlying(typed)].kind();
        if !target_kind.is_basic() {
            self.type_mismatch(node, untyped, typed);
            return None;
        }
        if value.is_valid() && !value.representable(target_kind, self.sem.target(), None) {
            let ts = self.sem.type_str(typed);
            self.error(TypeError::ConstantOverflow.at_with_message(
                node.span(),
                format!("constant {} overflows {}", value, ts),
            ));
            return None;
        }
        Some(typed)
    }

    fn type_mismatch(&mut self, node: &Node, a: TypeKey, b: TypeKey) {
        let (sa, sb) = (self.sem.type_str(a), self.sem.type_str(b));
        self.error(TypeError::TypeMismatch.at_with_message(
            node.span(),
            format!("mismatched types {} and {} in {}", sa, sb, node),
        ));
    }

    // ------------------------------------------------------------------------
    // Constant expressions

    /// Resolves a constant expression to its (untyped or declared) kind
    /// and folded value. Reports a diagnostic and returns `Unknown` when
    /// the expression is not constant.
    pub(crate) fn resolve_const_value(&mut self, node: &Node) -> (Kind, Value) {
        let (kind, v) = self.const_value_uncached(node);
        if v.is_unknown() {
            (kind, v)
        } else {
            let t = self.universe.basic(kind);
            self.types.entry(node.id()).or_insert(t);
            self.values.insert(node.id(), v.clone());
            (kind, v)
        }
    }

    fn const_value_uncached(&mut self, node: &Node) -> (Kind, Value) {
        match node.op() {
            Op::Ident => self.const_ident(node),
            Op::Call => {
                self.error(TypeError::UnsupportedConstantCall.at_with_message(
                    node.span(),
                    "unimplemented: type conversion on constant",
                ));
                (Kind::Invalid, Value::Unknown)
            }
            op if op.is_literal() => match constant::from_literal(node.lit(), op) {
                Some(v) => (literal_kind(op), v),
                None => {
                    self.error(TypeError::InvalidLiteral.at_with_message(
                        node.span(),
                        format!("invalid {} literal: {}", op, node.lit()),
                    ));
                    (Kind::Invalid, Value::Unknown)
                }
            },
            op if op.is_operator() && node.len() == 1 => {
                let child = node.child(0).cloned();
                let Some(child) = child else {
                    return self.not_constant(node);
                };
                let (kind, v) = self.resolve_const_value(&child);
                if v.is_unknown() {
                    return (kind, v);
                }
                let folded = constant::unary_op(op, &v, 0);
                if folded.is_unknown() {
                    return self.not_constant(node);
                }
                (kind, folded)
            }
            op if op.is_operator() && node.len() == 2 => {
                let (lhs, rhs) = (node.child(0).cloned(), node.child(1).cloned());
                let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                    return self.not_constant(node);
                };
                let (k1, v1) = self.resolve_const_value(&lhs);
                let (k2, v2) = self.resolve_const_value(&rhs);
                if v1.is_unknown() || v2.is_unknown() {
                    return (Kind::Invalid, Value::Unknown);
                }
                if op.is_shift() {
                    let Some(s) = shift_count(&v2) else {
                        self.error(TypeError::InvalidShiftCount.at_with_message(
                            rhs.span(),
                            format!("invalid shift count {}", v2),
                        ));
                        return (Kind::Invalid, Value::Unknown);
                    };
                    let folded = constant::shift(&v1, op, s);
                    if folded.is_unknown() {
                        return self.not_constant(node);
                    }
                    return (k1, folded);
                }
                if op.is_comparison() {
                    return (
                        Kind::UntypedBool,
                        constant::make_bool(constant::compare(&v1, op, &v2)),
                    );
                }
                let folded = constant::binary_op(&v1, op, &v2);
                if folded.is_unknown() {
                    return self.not_constant(node);
                }
                let kind = merge_const_kinds(k1, k2).unwrap_or_else(|| folded.untyped_kind());
                (kind, folded)
            }
            _ => {
                self.error(TypeError::UnsupportedExpression.at_with_message(
                    node.span(),
                    format!("unsupported constant expression: {}", node),
                ));
                (Kind::Invalid, Value::Unknown)
            }
        }
    }

    fn const_ident(&mut self, node: &Node) -> (Kind, Value) {
        let name = node.lit();
        let Some((_, okey)) = self.lookup(name) else {
            self.error(
                TypeError::Undeclared
                    .at_with_message(node.span(), format!("undeclared name: {}", name)),
            );
            return (Kind::Invalid, Value::Unknown);
        };
        if self.sem.objs[okey].class() != ObjClass::Const {
            return self.not_constant(node);
        }
        if self.is_universe_iota(okey) {
            return match self.iota.clone() {
                Some(v) => (Kind::UntypedInt, v),
                None => {
                    self.error(TypeError::IotaOutsideConst.at(node.span()));
                    (Kind::Invalid, Value::Unknown)
                }
            };
        }
        self.resolve_object(okey);
        let obj = &self.sem.objs[okey];
        match (obj.typ(), obj.const_value()) {
            (Some(t), Some(v)) => (self.sem.types[t].kind(), v.clone()),
            // Unresolvable (cycle or bad declaration, already reported) or
            // valueless predeclared constants such as nil.
            _ => self.not_constant(node),
        }
    }

    fn not_constant(&mut self, node: &Node) -> (Kind, Value) {
        self.error(TypeError::NotConstant.at_with_message(
            node.span(),
            format!("initializer {} is not a constant", node),
        ));
        (Kind::Invalid, Value::Unknown)
    }

    // ------------------------------------------------------------------------
    // Helpers

    /// Runs `body` with `iota` bound to the given value, restoring the
    /// previous binding on every exit path.
    pub(crate) fn with_iota<R>(&mut self, value: Value, body: impl FnOnce(&mut Checker) -> R) -> R {
        let prev = self.iota.replace(value);
        let result = body(self);
        self.iota = prev;
        result
    }

    /// True when following named-underlying links from `start` reaches
    /// `target`: the would-be underlying chain is cyclic.
    fn named_chain_contains(&self, start: TypeKey, target: TypeKey) -> bool {
        let mut current = start;
        let mut seen: Vec<TypeKey> = Vec::new();
        loop {
            if current == target {
                return true;
            }
            if seen.contains(&current) {
                return false;
            }
            seen.push(current);
            match self.sem.types[current].as_named().and_then(|n| n.underlying) {
                Some(u) => current = u,
                None => return false,
            }
        }
    }

    /// True for the universe's `iota` object, whose value exists only
    /// while a constant declaration is being resolved.
    fn is_universe_iota(&self, okey: ObjKey) -> bool {
        let obj = &self.sem.objs[okey];
        obj.name() == "iota" && obj.decl().is_none() && obj.const_value().is_none()
    }

    fn check_assignable(&mut self, from: TypeKey, value: &Value, to: TypeKey) -> AssignCheck {
        if from == to {
            return AssignCheck::Ok;
        }
        let from_kind = self.sem.types[from].kind();
        if from_kind.is_untyped() {
            if from_kind == Kind::UntypedNil {
                let to_kind = self.sem.types[self.sem.underlying(to)].kind();
                return match to_kind {
                    Kind::Ptr | Kind::Slice | Kind::Map | Kind::Chan | Kind::Func | Kind::Interface => {
                        AssignCheck::Ok
                    }
                    _ => AssignCheck::Mismatch,
                };
            }
            let to_kind = self.sem.types[self.sem.underlying(to)].kind();
            if !to_kind.is_basic() {
                return AssignCheck::Mismatch;
            }
            if value.is_valid() {
                return match value.convert_to(to_kind, self.sem.target()) {
                    Ok(_) => AssignCheck::Ok,
                    Err(ConstError::Overflow) => AssignCheck::Overflow,
                    Err(ConstError::TypeMismatch) => AssignCheck::Mismatch,
                };
            }
            // No constant value: accept when the categories line up.
            return if from_kind.category() == to_kind.category()
                || (from_kind.is_numeric() && to_kind.is_numeric())
            {
                AssignCheck::Ok
            } else {
                AssignCheck::Mismatch
            };
        }
        if self.sem.underlying(from) == self.sem.underlying(to) {
            return AssignCheck::Ok;
        }
        AssignCheck::Mismatch
    }

    fn missing_declaration(&mut self, name: &str) {
        self.error(
            TypeError::MissingDeclaration
                .with_message(format!("missing declaration for `{}`", name)),
        );
    }

    fn const_conversion_error(
        &mut self,
        decl: &super::collect::VarDecl,
        name: &str,
        value: &Value,
        tk: TypeKey,
        err: ConstError,
    ) {
        let span = decl.init.as_ref().map(|n| n.span()).unwrap_or_default();
        let ts = self.sem.type_str(tk);
        match err {
            ConstError::Overflow => self.error(TypeError::ConstantOverflow.at_with_message(
                span,
                format!("constant {} overflows {} in declaration of `{}`", value, ts, name),
            )),
            ConstError::TypeMismatch => self.error(TypeError::ConstantTypeMismatch.at_with_message(
                span,
                format!("cannot use {} as {} in declaration of `{}`", value, ts, name),
            )),
        }
    }
}

/// The untyped kind carried by a literal token.
fn literal_kind(op: Op) -> Kind {
    match op {
        Op::IntLit => Kind::UntypedInt,
        Op::FloatLit => Kind::UntypedFloat,
        Op::ImagLit => Kind::UntypedComplex,
        Op::CharLit => Kind::UntypedRune,
        Op::StringLit => Kind::UntypedString,
        _ => Kind::Invalid,
    }
}

/// Extracts a shift count: a non-negative integer that fits in u32.
fn shift_count(v: &Value) -> Option<u32> {
    let iv = constant::to_int(v);
    let s = iv.int_val()?;
    if (0..=u32::MAX as i64).contains(&s) {
        Some(s as u32)
    } else {
        None
    }
}

/// Numeric rank of untyped kinds for operand merging.
fn untyped_rank(k: Kind) -> Option<u8> {
    match k {
        Kind::UntypedInt => Some(1),
        Kind::UntypedRune => Some(2),
        Kind::UntypedFloat => Some(3),
        Kind::UntypedComplex => Some(4),
        _ => None,
    }
}

/// Merges two untyped operand kinds to the higher-ranked one. `None` when
/// the kinds cannot combine.
fn merge_untyped(a: Kind, b: Kind) -> Option<Kind> {
    if a == b {
        return Some(a);
    }
    match (untyped_rank(a), untyped_rank(b)) {
        (Some(ra), Some(rb)) => Some(if ra >= rb { a } else { b }),
        _ => None,
    }
}

/// Kind combination for constant folding: like [`merge_untyped`], but a
/// typed operand absorbs an untyped one.
fn merge_const_kinds(a: Kind, b: Kind) -> Option<Kind> {
    if a == b {
        return Some(a);
    }
    match (a.is_untyped(), b.is_untyped()) {
        (true, false) => Some(b),
        (false, true) => Some(a),
        (true, true) => merge_untyped(a, b),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica_common::span::Span;
    use mica_syntax::{NodeBuilder, Op};

    use crate::target::{Arch, Os, Target};

    fn new_checker() -> Checker {
        Checker::new(Target::default())
    }

    fn value_spec(
        b: &mut NodeBuilder,
        names: &[&str],
        typ: Option<Node>,
        exprs: Option<Vec<Node>>,
    ) -> Node {
        let names: Vec<Option<Node>> = names.iter().map(|n| Some(b.ident(*n))).collect();
        let names = b.list(Op::Names, names, Span::dummy());
        let exprs = exprs.map(|es| {
            let slots = es.into_iter().map(Some).collect();
            b.list(Op::Exprs, slots, Span::dummy())
        });
        b.list(Op::ValueSpec, vec![Some(names), typ, exprs], Span::dummy())
    }

    fn group(b: &mut NodeBuilder, op: Op, specs: Vec<Node>) -> Node {
        let slots = specs.into_iter().map(Some).collect();
        b.list(op, slots, Span::dummy())
    }

    #[test]
    fn test_fold_arithmetic_precedence() {
        // const k = 1 + 2 * 3
        let mut b = NodeBuilder::new();
        let two = b.int_lit("2");
        let three = b.int_lit("3");
        let product = b.binary(Op::Mul, two, three);
        let one = b.int_lit("1");
        let sum = b.binary(Op::Add, one, product);
        let spec = value_spec(&mut b, &["k"], None, Some(vec![sum]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        let okey = c.global_object("k").unwrap();
        c.resolve_const(okey);

        assert!(!c.diagnostics.has_errors());
        let obj = &c.sem.objs[okey];
        assert_eq!(obj.const_value(), Some(&Value::Int64(7)));
        // Untyped constant: its type is untyped int.
        assert_eq!(
            obj.typ(),
            Some(c.universe.basic(Kind::UntypedInt))
        );
    }

    #[test]
    fn test_iota_positional_value() {
        // const ( a = iota; b; c ) — c is the 3rd entry, index 2.
        let mut b = NodeBuilder::new();
        let iota = b.ident("iota");
        let s0 = value_spec(&mut b, &["a"], None, Some(vec![iota]));
        let s1 = value_spec(&mut b, &["b"], None, None);
        let s2 = value_spec(&mut b, &["c"], None, None);
        let g = group(&mut b, Op::Const, vec![s0, s1, s2]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        for (name, want) in [("a", 0i64), ("b", 1), ("c", 2)] {
            let okey = c.global_object(name).unwrap();
            assert_eq!(
                c.sem.objs[okey].const_value(),
                Some(&Value::Int64(want)),
                "value of {}",
                name
            );
        }
        // The binding is cleared once resolution finishes.
        assert!(c.iota.is_none());
    }

    #[test]
    fn test_iota_outside_const_reported() {
        let mut b = NodeBuilder::new();
        let iota = b.ident("iota");
        let spec = value_spec(&mut b, &["v"], None, Some(vec![iota]));
        let g = group(&mut b, Op::Var, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::IotaOutsideConst.code())));
        assert!(c.iota.is_none());
    }

    #[test]
    fn test_iota_restored_after_error() {
        // const bad = iota + "x" — evaluation fails partway; the binding
        // must still be cleared.
        let mut b = NodeBuilder::new();
        let iota = b.ident("iota");
        let s = b.string_lit("\"x\"");
        let sum = b.binary(Op::Add, iota, s);
        let spec = value_spec(&mut b, &["bad"], None, Some(vec![sum]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c.diagnostics.has_errors());
        assert!(c.iota.is_none());
        // The object stays partially resolved, which is a valid outcome.
        let okey = c.global_object("bad").unwrap();
        assert!(c.sem.objs[okey].typ().is_none());
    }

    #[test]
    fn test_const_with_declared_type_converts() {
        // const n uint8 = 200
        let mut b = NodeBuilder::new();
        let t = b.ident("uint8");
        let lit = b.int_lit("200");
        let spec = value_spec(&mut b, &["n"], Some(t), Some(vec![lit]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let okey = c.global_object("n").unwrap();
        assert_eq!(c.sem.objs[okey].typ(), Some(c.universe.basic(Kind::Uint8)));
        assert_eq!(c.sem.objs[okey].const_value(), Some(&Value::Int64(200)));
    }

    #[test]
    fn test_const_overflow_reported() {
        // const n uint8 = 300
        let mut b = NodeBuilder::new();
        let t = b.ident("uint8");
        let lit = b.int_lit("300");
        let spec = value_spec(&mut b, &["n"], Some(t), Some(vec![lit]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::ConstantOverflow.code())));
    }

    #[test]
    fn test_const_without_init_gets_zero() {
        // const z int  (type only — zero value)
        let mut b = NodeBuilder::new();
        let t = b.ident("int");
        let spec = value_spec(&mut b, &["z"], Some(t), None);
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        let okey = c.global_object("z").unwrap();
        assert_eq!(c.sem.objs[okey].const_value(), Some(&Value::Int64(0)));
    }

    #[test]
    fn test_var_assignability_gate() {
        // var v uint8 = 100 + 200 — folds to 300, does not fit.
        let mut b = NodeBuilder::new();
        let t = b.ident("uint8");
        let h = b.int_lit("100");
        let th = b.int_lit("200");
        let sum = b.binary(Op::Add, h, th);
        let spec = value_spec(&mut b, &["v"], Some(t), Some(vec![sum]));
        let g = group(&mut b, Op::Var, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::ConstantOverflow.code())
                || d.code == Some(TypeError::NotAssignable.code())));
        let okey = c.global_object("v").unwrap();
        assert!(c.sem.objs[okey].typ().is_none());
    }

    #[test]
    fn test_var_untyped_initializer_defaults() {
        // var v = 1 — untyped int defaults to int.
        let mut b = NodeBuilder::new();
        let one = b.int_lit("1");
        let spec = value_spec(&mut b, &["v"], None, Some(vec![one]));
        let g = group(&mut b, Op::Var, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let okey = c.global_object("v").unwrap();
        assert_eq!(c.sem.objs[okey].typ(), Some(c.universe.basic(Kind::Int)));
        assert_eq!(c.sem.objs[okey].const_value(), Some(&Value::Int64(1)));
    }

    #[test]
    fn test_no_double_resolution() {
        let mut b = NodeBuilder::new();
        let one = b.int_lit("1");
        let spec = value_spec(&mut b, &["v"], None, Some(vec![one]));
        let g = group(&mut b, Op::Var, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        let okey = c.global_object("v").unwrap();
        c.resolve_var(okey);
        let typ = c.sem.objs[okey].typ();
        let diags = c.diagnostics.len();

        // Second resolution performs no work and raises no error.
        c.resolve_var(okey);
        assert_eq!(c.sem.objs[okey].typ(), typ);
        assert_eq!(c.diagnostics.len(), diags);
    }

    #[test]
    fn test_forward_reference() {
        // const a = b + 1; const b = 2 — order in source is irrelevant.
        let mut b = NodeBuilder::new();
        let bref = b.ident("b");
        let one = b.int_lit("1");
        let sum = b.binary(Op::Add, bref, one);
        let sa = value_spec(&mut b, &["a"], None, Some(vec![sum]));
        let ga = group(&mut b, Op::Const, vec![sa]);
        let two = b.int_lit("2");
        let sb = value_spec(&mut b, &["b"], None, Some(vec![two]));
        let gb = group(&mut b, Op::Const, vec![sb]);

        let mut c = new_checker();
        c.collect_globals(&[ga, gb]);
        let a = c.global_object("a").unwrap();
        c.resolve_const(a);

        assert!(!c.diagnostics.has_errors());
        assert_eq!(c.sem.objs[a].const_value(), Some(&Value::Int64(3)));
        // Resolving `a` resolved `b` on demand.
        let bkey = c.global_object("b").unwrap();
        assert_eq!(c.sem.objs[bkey].const_value(), Some(&Value::Int64(2)));
    }

    #[test]
    fn test_cyclic_declaration_detected() {
        // const a = b; const b = a
        let mut b = NodeBuilder::new();
        let bref = b.ident("b");
        let sa = value_spec(&mut b, &["a"], None, Some(vec![bref]));
        let ga = group(&mut b, Op::Const, vec![sa]);
        let aref = b.ident("a");
        let sb = value_spec(&mut b, &["b"], None, Some(vec![aref]));
        let gb = group(&mut b, Op::Const, vec![sb]);

        let mut c = new_checker();
        c.collect_globals(&[ga, gb]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::CyclicDeclaration.code())));
    }

    #[test]
    fn test_self_reference_detected() {
        // var x = x
        let mut b = NodeBuilder::new();
        let xref = b.ident("x");
        let spec = value_spec(&mut b, &["x"], None, Some(vec![xref]));
        let g = group(&mut b, Op::Var, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::CyclicDeclaration.code())));
    }

    #[test]
    fn test_redefined_const_resolves_to_first() {
        // const x = 1 then const x = 2: first wins.
        let mut b = NodeBuilder::new();
        let one = b.int_lit("1");
        let s1 = value_spec(&mut b, &["x"], None, Some(vec![one]));
        let g1 = group(&mut b, Op::Const, vec![s1]);
        let two = b.int_lit("2");
        let s2 = value_spec(&mut b, &["x"], None, Some(vec![two]));
        let g2 = group(&mut b, Op::Const, vec![s2]);

        let mut c = new_checker();
        c.collect_globals(&[g1, g2]);
        c.resolve_all();

        let okey = c.global_object("x").unwrap();
        assert_eq!(c.sem.objs[okey].const_value(), Some(&Value::Int64(1)));
        assert!(!c.redefined()["x"].is_empty());
    }

    #[test]
    fn test_type_declaration_and_alias() {
        // type Celsius int; type Temp = Celsius
        let mut b = NodeBuilder::new();
        let n1 = b.ident("Celsius");
        let t1 = b.ident("int");
        let def = b.list(Op::Define, vec![Some(n1), Some(t1)], Span::dummy());
        let n2 = b.ident("Temp");
        let t2 = b.ident("Celsius");
        let ali = b.list(Op::Assign, vec![Some(n2), Some(t2)], Span::dummy());
        let g = b.list(Op::Type, vec![Some(def), Some(ali)], Span::dummy());

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let celsius = c.sem.objs[c.global_object("Celsius").unwrap()].typ().unwrap();
        let temp = c.sem.objs[c.global_object("Temp").unwrap()].typ().unwrap();
        // The alias is transparent: same type, no new identity.
        assert_eq!(celsius, temp);
        assert!(c.sem.types[celsius].is_named());
        assert_eq!(c.sem.underlying(celsius), c.universe.basic(Kind::Int));
    }

    #[test]
    fn test_recursive_type_through_pointer() {
        // type List struct { next *List }
        let mut b = NodeBuilder::new();
        let name = b.ident("List");
        let next_name = b.ident("next");
        let list_ref = b.ident("List");
        let ptr = b.unary(Op::PointerType, list_ref);
        let field = b.list(Op::Field, vec![Some(next_name), Some(ptr)], Span::dummy());
        let st = b.list(Op::StructType, vec![Some(field)], Span::dummy());
        let def = b.list(Op::Define, vec![Some(name), Some(st)], Span::dummy());
        let g = b.list(Op::Type, vec![Some(def)], Span::dummy());

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let list = c.sem.objs[c.global_object("List").unwrap()].typ().unwrap();
        assert!(c.sem.types[list].is_named());
        assert!(c.sem.types[list].header().hash.is_known());
        let under = c.sem.underlying(list);
        assert_eq!(c.sem.types[under].kind(), Kind::Struct);
    }

    #[test]
    fn test_direct_type_cycle_reported() {
        // type A B; type B A
        let mut b = NodeBuilder::new();
        let na = b.ident("A");
        let rb = b.ident("B");
        let da = b.list(Op::Define, vec![Some(na), Some(rb)], Span::dummy());
        let nb = b.ident("B");
        let ra = b.ident("A");
        let db = b.list(Op::Define, vec![Some(nb), Some(ra)], Span::dummy());
        let g = b.list(Op::Type, vec![Some(da), Some(db)], Span::dummy());

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::CyclicDeclaration.code())));
    }

    #[test]
    fn test_func_declaration_resolves_signature() {
        let mut b = NodeBuilder::new();
        let name = b.ident("atoi");
        let string = b.ident("string");
        let params = b.list(Op::Params, vec![Some(string)], Span::dummy());
        let int = b.ident("int");
        let results = b.list(Op::Results, vec![Some(int)], Span::dummy());
        let ftyp = b.list(Op::FuncType, vec![Some(params), Some(results)], Span::dummy());
        let f = b.list(Op::Func, vec![None, Some(name), Some(ftyp), None], Span::dummy());

        let mut c = new_checker();
        c.collect_globals(&[f]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let okey = c.global_object("atoi").unwrap();
        let t = c.sem.objs[okey].typ().unwrap();
        assert_eq!(c.sem.type_str(t), "func(string) int");
    }

    #[test]
    fn test_resolve_expr_identifier_reference() {
        // const k = 6; resolve_expr(k * 7) = 42
        let mut b = NodeBuilder::new();
        let six = b.int_lit("6");
        let spec = value_spec(&mut b, &["k"], None, Some(vec![six]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);

        let kref = b.ident("k");
        let seven = b.int_lit("7");
        let expr = b.binary(Op::Mul, kref, seven);
        let (t, v) = c.resolve_expr(&expr);
        assert!(!c.diagnostics.has_errors());
        assert_eq!(v, Value::Int64(42));
        assert_eq!(t, Some(c.universe.basic(Kind::UntypedInt)));
    }

    #[test]
    fn test_resolve_expr_caches_by_identity() {
        let mut b = NodeBuilder::new();
        let one = b.int_lit("1");
        let two = b.int_lit("2");
        let expr = b.binary(Op::Add, one, two);

        let mut c = new_checker();
        let first = c.resolve_expr(&expr);
        assert!(c.types.contains_key(&expr.id()));
        let again = c.resolve_expr(&expr);
        assert_eq!(first.0, again.0);
        assert_eq!(first.1, again.1);
    }

    #[test]
    fn test_type_name_in_expression_position() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let node = b.ident("int");
        let (t, v) = c.resolve_expr(&node);
        assert!(t.is_none());
        assert!(v.is_unknown());
        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::NotAnExpression.code())));
    }

    #[test]
    fn test_call_is_deferred_not_failed() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let callee = b.ident("f");
        let call = b.list(Op::Call, vec![Some(callee)], Span::dummy());
        let (t, v) = c.resolve_expr(&call);
        assert!(t.is_none());
        assert!(v.is_unknown());
        assert!(!c.diagnostics.has_errors());
    }

    #[test]
    fn test_constant_call_reported() {
        // const k = f() — a constant call is recognized but unimplemented.
        let mut b = NodeBuilder::new();
        let callee = b.ident("f");
        let call = b.list(Op::Call, vec![Some(callee)], Span::dummy());
        let spec = value_spec(&mut b, &["k"], None, Some(vec![call]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::UnsupportedConstantCall.code())));
    }

    #[test]
    fn test_invalid_literal_reported() {
        let mut b = NodeBuilder::new();
        let bad = b.int_lit("12xy");
        let spec = value_spec(&mut b, &["k"], None, Some(vec![bad]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::InvalidLiteral.code())));
    }

    #[test]
    fn test_bad_declaration_does_not_abort_siblings() {
        // const bad = "x" - 1; const good = 2
        let mut b = NodeBuilder::new();
        let s = b.string_lit("\"x\"");
        let one = b.int_lit("1");
        let diff = b.binary(Op::Sub, s, one);
        let sbad = value_spec(&mut b, &["bad"], None, Some(vec![diff]));
        let gbad = group(&mut b, Op::Const, vec![sbad]);
        let two = b.int_lit("2");
        let sgood = value_spec(&mut b, &["good"], None, Some(vec![two]));
        let ggood = group(&mut b, Op::Const, vec![sgood]);

        let mut c = new_checker();
        c.collect_globals(&[gbad, ggood]);
        c.resolve_all();

        assert!(c.diagnostics.has_errors());
        let good = c.global_object("good").unwrap();
        assert_eq!(c.sem.objs[good].const_value(), Some(&Value::Int64(2)));
    }

    #[test]
    fn test_shifts_and_comparisons() {
        // const k = (1 << 10) == 1024
        let mut b = NodeBuilder::new();
        let one = b.int_lit("1");
        let ten = b.int_lit("10");
        let shl = b.binary(Op::Shl, one, ten);
        let kilo = b.int_lit("1024");
        let eq = b.binary(Op::Eq, shl, kilo);
        let spec = value_spec(&mut b, &["k"], None, Some(vec![eq]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let okey = c.global_object("k").unwrap();
        assert_eq!(c.sem.objs[okey].const_value(), Some(&Value::Bool(true)));
        assert_eq!(
            c.sem.objs[okey].typ(),
            Some(c.universe.basic(Kind::UntypedBool))
        );
    }

    #[test]
    fn test_negative_shift_count_reported() {
        let mut b = NodeBuilder::new();
        let one = b.int_lit("1");
        let neg_one = b.int_lit("1");
        let neg = b.unary(Op::Sub, neg_one);
        let shl = b.binary(Op::Shl, one, neg);
        let spec = value_spec(&mut b, &["k"], None, Some(vec![shl]));
        let g = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[g]);
        c.resolve_all();

        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::InvalidShiftCount.code())));
    }

    #[test]
    fn test_typed_const_absorbs_untyped_operand() {
        // const a uint8 = 10; const b = a + 1 — b has a's type.
        let mut b = NodeBuilder::new();
        let t = b.ident("uint8");
        let ten = b.int_lit("10");
        let sa = value_spec(&mut b, &["a"], Some(t), Some(vec![ten]));
        let ga = group(&mut b, Op::Const, vec![sa]);
        let aref = b.ident("a");
        let one = b.int_lit("1");
        let sum = b.binary(Op::Add, aref, one);
        let sb = value_spec(&mut b, &["b"], None, Some(vec![sum]));
        let gb = group(&mut b, Op::Const, vec![sb]);

        let mut c = new_checker();
        c.collect_globals(&[ga, gb]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let bkey = c.global_object("b").unwrap();
        assert_eq!(c.sem.objs[bkey].const_value(), Some(&Value::Int64(11)));
        assert_eq!(c.sem.objs[bkey].typ(), Some(c.universe.basic(Kind::Uint8)));
    }

    #[test]
    fn test_universe_differs_per_target() {
        // var v = 1 << 40 resolves on 64-bit and overflows on 32-bit.
        let build = |b: &mut NodeBuilder| {
            let one = b.int_lit("1");
            let forty = b.int_lit("40");
            let shl = b.binary(Op::Shl, one, forty);
            let spec = value_spec(b, &["v"], None, Some(vec![shl]));
            group(b, Op::Var, vec![spec])
        };

        let mut b64 = NodeBuilder::new();
        let g64 = build(&mut b64);
        let mut c64 = Checker::new(Target::new(Os::Linux, Arch::Amd64));
        c64.collect_globals(&[g64]);
        c64.resolve_all();
        assert!(!c64.diagnostics.has_errors());

        let mut b32 = NodeBuilder::new();
        let g32 = build(&mut b32);
        let mut c32 = Checker::new(Target::new(Os::Linux, Arch::I386));
        c32.collect_globals(&[g32]);
        c32.resolve_all();
        assert!(c32.diagnostics.has_errors());
    }

    #[test]
    fn test_named_type_const() {
        // type Celsius int; const freezing Celsius = 0
        let mut b = NodeBuilder::new();
        let n = b.ident("Celsius");
        let t = b.ident("int");
        let def = b.list(Op::Define, vec![Some(n), Some(t)], Span::dummy());
        let tg = b.list(Op::Type, vec![Some(def)], Span::dummy());
        let ct = b.ident("Celsius");
        let zero = b.int_lit("0");
        let spec = value_spec(&mut b, &["freezing"], Some(ct), Some(vec![zero]));
        let cg = group(&mut b, Op::Const, vec![spec]);

        let mut c = new_checker();
        c.collect_globals(&[tg, cg]);
        c.resolve_all();

        assert!(!c.diagnostics.has_errors());
        let fkey = c.global_object("freezing").unwrap();
        let ft = c.sem.objs[fkey].typ().unwrap();
        assert!(c.sem.types[ft].is_named());
        assert_eq!(c.sem.type_str(ft), "Celsius");
        assert_eq!(c.sem.objs[fkey].const_value(), Some(&Value::Int64(0)));
    }
}
