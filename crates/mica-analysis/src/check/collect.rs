//! The declaration collector.
//!
//! One pass over the top-level syntax nodes classifies every declaration
//! and fills the global table: name to pending declaration, plus the
//! objects (still untyped) in the package scope. Redefinition keeps the
//! first declaration authoritative; later ones land in the redefinition
//! table and produce a diagnostic, without aborting the pass.

use mica_common::span::Span;
use mica_syntax::{Node, NodeId, Op};

use crate::constant::unquote_string;
use crate::obj::{ObjClass, Object, PackageRef};
use crate::scope::Scope;

use super::checker::Checker;
use super::errors::TypeError;

/// Pending declaration of one constant.
#[derive(Clone, Debug)]
pub struct ConstDecl {
    pub typ: Option<Node>,
    pub init: Option<Node>,
    /// Position of the owning value-spec within its group: the `iota`
    /// value for this constant's initializer.
    pub index: usize,
    /// A single initializer shared by several names (multi-valued
    /// expression, deferred in this core).
    pub shared: bool,
}

/// Pending declaration of one variable.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub typ: Option<Node>,
    pub init: Option<Node>,
    /// Position of the owning value-spec within its group.
    pub index: usize,
    /// See [`ConstDecl::shared`].
    pub shared: bool,
}

/// Pending declaration of one type name.
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub expr: Node,
    /// `type T = U` declares a transparent synonym, not a new named
    /// identity.
    pub alias: bool,
}

/// Pending declaration of one function.
#[derive(Clone, Debug)]
pub struct FuncDecl {
    pub typ: Option<Node>,
    pub body: Option<NodeId>,
}

/// Pending declaration of one import.
#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub path: String,
}

/// A pending declaration: collector output, resolver input. One variant
/// per declaration class, each carrying exactly what that class needs.
#[derive(Clone, Debug)]
pub enum Decl {
    Const(ConstDecl),
    Var(VarDecl),
    Type(TypeDecl),
    Func(FuncDecl),
    Import(ImportDecl),
}

impl Decl {
    pub(crate) fn as_const(&self) -> &ConstDecl {
        match self {
            Decl::Const(c) => c,
            _ => unreachable!("expected const declaration"),
        }
    }

    pub(crate) fn as_var(&self) -> &VarDecl {
        match self {
            Decl::Var(v) => v,
            _ => unreachable!("expected var declaration"),
        }
    }

    pub(crate) fn as_type(&self) -> &TypeDecl {
        match self {
            Decl::Type(t) => t,
            _ => unreachable!("expected type declaration"),
        }
    }

    pub(crate) fn as_func(&self) -> &FuncDecl {
        match self {
            Decl::Func(f) => f,
            _ => unreachable!("expected func declaration"),
        }
    }
}

impl Checker {
    /// Collects all top-level declarations from the given syntax nodes
    /// into the global table. Errors are accumulated; a bad declaration
    /// never aborts its siblings.
    pub fn collect_globals(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.collect_node(node);
        }
    }

    fn collect_node(&mut self, node: &Node) {
        match node.op() {
            Op::File => {
                for child in node.children() {
                    self.collect_node(child);
                }
            }
            Op::Func => self.collect_func_decl(node),
            Op::Import => {
                for spec in node.children() {
                    self.collect_import_spec(spec);
                }
            }
            Op::Type => {
                for spec in node.children() {
                    self.collect_type_spec(spec);
                }
            }
            Op::Var | Op::Const => self.collect_value_group(node),
            // Anything else at top level is not a declaration; skip it.
            _ => {}
        }
    }

    /// Function declaration: `[receiver?, name, type, body?]`. A
    /// declaration with a receiver is a method and is not a global; it is
    /// skipped by this pass.
    fn collect_func_decl(&mut self, decl: &Node) {
        if decl.child(0).is_some() {
            return; // method, attaches to its receiver's type elsewhere
        }
        let name = match decl.child(1) {
            Some(n) if n.op() == Op::Ident => n,
            _ => return self.malformed(decl.span(), "function declaration without a name"),
        };
        let mut obj = Object::new(ObjClass::Func, name.lit());
        let body = decl.child(3);
        if let Some(body) = body {
            obj.set_body(body.id());
        }
        self.declare_global(
            name.lit().to_string(),
            name.span(),
            obj,
            Decl::Func(FuncDecl {
                typ: decl.child(2).cloned(),
                body: body.map(Node::id),
            }),
        );
    }

    /// Import spec: `[alias?, path]`. The bound name comes from the alias
    /// if present, else from a known package with that path, else from the
    /// path's final segment (approximate; corrected when the package is
    /// actually loaded).
    fn collect_import_spec(&mut self, spec: &Node) {
        if spec.op() != Op::ImportSpec {
            return self.malformed(spec.span(), format!("invalid import declaration: {}", spec));
        }
        let path_node = match spec.child(1) {
            Some(p) if p.op() == Op::StringLit => p,
            _ => return self.malformed(spec.span(), "import spec without a path"),
        };
        let path = match unquote_string(path_node.lit()) {
            Some(p) => p,
            None => {
                return self.malformed(path_node.span(), format!("unparsable import path {}", path_node.lit()))
            }
        };
        if let Err(reason) = valid_import_path(&path) {
            self.error(TypeError::InvalidImportPath.at_with_message(
                path_node.span(),
                format!("invalid import path ({})", reason),
            ));
        }

        let name = match spec.child(0) {
            Some(alias) if alias.op() == Op::Ident => alias.lit().to_string(),
            _ => match self.known_packages.get(&path) {
                Some(pkg) => pkg.name.clone(),
                None => basename(&path).to_string(), // approximate!
            },
        };

        let mut obj = Object::new(ObjClass::Import, name.clone());
        obj.set_import(PackageRef {
            name: name.clone(),
            path: path.clone(),
        });
        self.declare_global(name, spec.span(), obj, Decl::Import(ImportDecl { path }));
    }

    /// Type spec: `Define` (`type T U`, a new named identity) or `Assign`
    /// (`type T = U`, a transparent alias).
    fn collect_type_spec(&mut self, spec: &Node) {
        let alias = match spec.op() {
            Op::Define => false,
            Op::Assign => true,
            _ => return self.malformed(spec.span(), format!("invalid type declaration: {}", spec)),
        };
        let (name, expr) = match (spec.child(0), spec.child(1)) {
            (Some(n), Some(e)) if n.op() == Op::Ident => (n, e),
            _ => return self.malformed(spec.span(), format!("invalid type declaration: {}", spec)),
        };
        self.declare_global(
            name.lit().to_string(),
            name.span(),
            Object::new(ObjClass::Type, name.lit()),
            Decl::Type(TypeDecl {
                expr: expr.clone(),
                alias,
            }),
        );
    }

    /// A `var`/`const` group of value-specs: `[names, type?, exprs?]`
    /// each. Const specs without type and initializers carry both over
    /// from the previous carrying spec, which is what gives plain `iota`
    /// enumerations their values.
    fn collect_value_group(&mut self, group: &Node) {
        let is_const = group.op() == Op::Const;
        let class = if is_const { ObjClass::Const } else { ObjClass::Var };

        let mut carried_typ: Option<Node> = None;
        let mut carried_exprs: Option<Node> = None;

        for (index, spec) in group.children().enumerate() {
            if spec.op() != Op::ValueSpec {
                self.malformed(spec.span(), format!("invalid {} declaration: {}", group.op(), spec));
                continue;
            }
            let names = match spec.child(0) {
                Some(n) if n.op() == Op::Names => n.clone(),
                _ => {
                    self.malformed(spec.span(), format!("invalid {} declaration: {}", group.op(), spec));
                    continue;
                }
            };

            let (typ, exprs) = if is_const {
                if spec.child(1).is_some() || spec.child(2).is_some() {
                    carried_typ = spec.child(1).cloned();
                    carried_exprs = spec.child(2).cloned();
                }
                (carried_typ.clone(), carried_exprs.clone())
            } else {
                (spec.child(1).cloned(), spec.child(2).cloned())
            };

            let n = names.children().count();
            let ninit = exprs.as_ref().map(|e| e.children().count()).unwrap_or(0);
            let shared = ninit == 1 && n > 1;
            if !(ninit == 0 || ninit == n || shared) {
                // The parser guarantees 0, 1, or N initializers; anything
                // else is a contract violation, and this spec is dropped.
                self.malformed(
                    spec.span(),
                    format!(
                        "found {} initializers, expecting 0, 1 or {}: {}",
                        ninit, n, spec
                    ),
                );
                continue;
            }

            for (i, name) in names.children().enumerate() {
                if name.op() != Op::Ident {
                    self.malformed(name.span(), format!("invalid declared name: {}", name));
                    continue;
                }
                let init = if shared {
                    exprs.as_ref().and_then(|e| e.child(0)).cloned()
                } else {
                    exprs.as_ref().and_then(|e| e.child(i)).cloned()
                };
                let decl = if is_const {
                    Decl::Const(ConstDecl {
                        typ: typ.clone(),
                        init,
                        index,
                        shared,
                    })
                } else {
                    Decl::Var(VarDecl {
                        typ: typ.clone(),
                        init,
                        index,
                        shared,
                    })
                };
                self.declare_global(
                    name.lit().to_string(),
                    name.span(),
                    Object::new(class, name.lit()),
                    decl,
                );
            }
        }
    }

    /// Registers one global. First wins: a duplicate name is recorded in
    /// the redefinition table and reported, and the primary entry (and its
    /// object) stays untouched.
    fn declare_global(&mut self, name: String, span: Span, mut obj: Object, decl: Decl) {
        let dkey = self.sem.decls.insert(decl);
        if self.globals.contains_key(&name) {
            self.redefined.entry(name.clone()).or_default().push(dkey);
            self.error(TypeError::Redeclared.at_with_message(
                span,
                format!("`{}` redeclared in this compilation unit", name),
            ));
            return;
        }
        obj.set_decl(dkey);
        let okey = self.sem.objs.insert(obj);
        Scope::insert(self.scope, okey, &mut self.sem);
        self.globals.insert(name, dkey);
    }

    fn malformed(&mut self, span: Span, msg: impl Into<String>) {
        self.error(TypeError::MalformedDeclaration.at_with_message(span, msg));
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Validates an import path: non-empty, printable, and free of characters
/// that can never appear in one.
fn valid_import_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty string".to_owned());
    }
    const ILLEGAL: &[char] = &[
        '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', ',', ':', ';', '<', '=', '>', '?',
        '[', '\\', ']', '^', '{', '|', '}', '`', '\u{FFFD}',
    ];
    if let Some(c) = path
        .chars()
        .find(|&c| !c.is_ascii_graphic() || c.is_whitespace() || ILLEGAL.contains(&c))
    {
        return Err(format!("invalid character: {:?}", c));
    }
    Ok(())
}
