//! Materializing type expressions.
//!
//! `make_type` turns a type-expression syntax node into a canonical
//! `TypeKey`, resolving named references through the scope chain (lazily
//! resolving their declarations on demand) and building compound types
//! through the container's interning constructors.

use mica_syntax::{Node, Op};

use crate::constant::to_int;
use crate::obj::ObjClass;
use crate::objects::TypeKey;
use crate::typ::{ChanDir, Field, Method};

use super::checker::Checker;
use super::errors::TypeError;

impl Checker {
    /// Resolves a type expression to a type. `None` means the expression
    /// was invalid; a diagnostic has already been emitted.
    pub(crate) fn make_type(&mut self, node: &Node) -> Option<TypeKey> {
        match node.op() {
            Op::Ident => self.type_ident(node),
            Op::SliceType => {
                let child = self.expect_child(node, 0)?;
                let elem = self.make_type(child)?;
                Some(self.sem.new_slice(elem))
            }
            Op::PointerType => {
                let child = self.expect_child(node, 0)?;
                let base = self.make_type(child)?;
                Some(self.sem.new_ptr(base))
            }
            Op::ChanType => {
                let child = self.expect_child(node, 0)?;
                let elem = self.make_type(child)?;
                Some(self.sem.new_chan(ChanDir::Both, elem))
            }
            Op::ArrayType => {
                let len_child = self.expect_child(node, 0)?;
                let len = self.array_len(len_child)?;
                let elem_child = self.expect_child(node, 1)?;
                let elem = self.make_type(elem_child)?;
                Some(self.sem.new_array(elem, len))
            }
            Op::MapType => {
                let key_child = self.expect_child(node, 0)?;
                let key = self.make_type(key_child)?;
                let elem_child = self.expect_child(node, 1)?;
                let elem = self.make_type(elem_child)?;
                match self.sem.new_map(key, elem) {
                    Ok(t) => Some(t),
                    Err(_) => {
                        let key_str = self.sem.type_str(key);
                        self.error(TypeError::InvalidMapKey.at_with_message(
                            node.span(),
                            format!("invalid map key type {}: not comparable", key_str),
                        ));
                        None
                    }
                }
            }
            Op::FuncType => self.func_type(node),
            Op::StructType => self.struct_type(node),
            Op::InterfaceType => self.interface_type(node),
            _ => {
                self.error(TypeError::ExpectedType.at_with_message(
                    node.span(),
                    format!("expected a type expression, found {}", node),
                ));
                None
            }
        }
    }

    fn type_ident(&mut self, node: &Node) -> Option<TypeKey> {
        let name = node.lit();
        let Some((_, okey)) = self.lookup(name) else {
            self.error(TypeError::Undeclared.at_with_message(
                node.span(),
                format!("undeclared name: {}", name),
            ));
            return None;
        };
        match self.sem.objs[okey].class() {
            ObjClass::Type | ObjClass::GenericType => {
                if let Some(t) = self.sem.objs[okey].typ() {
                    return Some(t);
                }
                self.resolve_object(okey);
                // Still absent after resolution means the declaration
                // failed; its diagnostic is already recorded.
                self.sem.objs[okey].typ()
            }
            class => {
                self.error(TypeError::NotAType.at_with_message(
                    node.span(),
                    format!("{} {} is not a type", class, name),
                ));
                None
            }
        }
    }

    fn func_type(&mut self, node: &Node) -> Option<TypeKey> {
        let params = self.type_list(node.child(0))?;
        let results = self.type_list(node.child(1))?;
        Some(self.sem.new_func(params, results, false))
    }

    fn type_list(&mut self, list: Option<&Node>) -> Option<Vec<TypeKey>> {
        let Some(list) = list else {
            return Some(Vec::new());
        };
        let mut keys = Vec::new();
        for child in list.children() {
            keys.push(self.make_type(child)?);
        }
        Some(keys)
    }

    fn struct_type(&mut self, node: &Node) -> Option<TypeKey> {
        let mut fields = Vec::new();
        for field in node.children() {
            if field.op() != Op::Field {
                self.error(TypeError::MalformedDeclaration.at_with_message(
                    field.span(),
                    format!("invalid struct field: {}", field),
                ));
                return None;
            }
            let typ_node = self.expect_child(field, 1)?;
            // An absent name slot marks an embedded field; its name is the
            // embedded type's identifier.
            let (name, embedded) = match field.child(0) {
                Some(n) if n.op() == Op::Ident => (n.lit().to_string(), false),
                _ => (typ_node.lit().to_string(), true),
            };
            let typ = self.make_type(typ_node)?;
            fields.push(Field {
                name,
                typ,
                embedded,
            });
        }
        Some(self.sem.new_struct(fields))
    }

    fn interface_type(&mut self, node: &Node) -> Option<TypeKey> {
        let mut methods = Vec::new();
        for method in node.children() {
            if method.op() != Op::Method {
                self.error(TypeError::MalformedDeclaration.at_with_message(
                    method.span(),
                    format!("invalid interface method: {}", method),
                ));
                return None;
            }
            let name = match method.child(0) {
                Some(n) if n.op() == Op::Ident => n.lit().to_string(),
                _ => {
                    self.error(TypeError::MalformedDeclaration.at_with_message(
                        method.span(),
                        "interface method without a name",
                    ));
                    return None;
                }
            };
            let typ_node = self.expect_child(method, 1)?;
            let typ = self.make_type(typ_node)?;
            methods.push(Method { name, typ });
        }
        Some(self.sem.new_interface(methods))
    }

    /// Evaluates an array length expression: a constant, non-negative
    /// integer.
    fn array_len(&mut self, node: &Node) -> Option<u64> {
        let (_, value) = self.resolve_const_value(node);
        if value.is_unknown() {
            self.error(TypeError::ArrayLenNotConstant.at(node.span()));
            return None;
        }
        match to_int(&value).int_val() {
            Some(len) if len >= 0 => Some(len as u64),
            _ => {
                self.error(TypeError::ArrayLenNotInteger.at_with_message(
                    node.span(),
                    format!("array length {} must be a non-negative integer", value),
                ));
                None
            }
        }
    }

    fn expect_child<'n>(&mut self, node: &'n Node, i: usize) -> Option<&'n Node> {
        match node.child(i) {
            Some(child) => Some(child),
            None => {
                self.error(TypeError::ExpectedType.at_with_message(
                    node.span(),
                    format!("incomplete type expression: {}", node),
                ));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica_common::span::Span;
    use mica_syntax::NodeBuilder;

    use crate::kind::Kind;
    use crate::target::Target;

    fn new_checker() -> Checker {
        Checker::new(Target::default())
    }

    #[test]
    fn test_basic_ident() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let node = b.ident("int");
        let t = c.make_type(&node).unwrap();
        assert_eq!(t, c.universe.basic(Kind::Int));
    }

    #[test]
    fn test_slice_and_map() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let string = b.ident("string");
        let int = b.ident("int");
        let map = b.list(Op::MapType, vec![Some(string), Some(int)], Span::dummy());
        let slice = b.unary(Op::SliceType, map);

        let t = c.make_type(&slice).unwrap();
        assert_eq!(c.sem.type_str(t), "[]map[string]int");
        assert!(!c.diagnostics.has_errors());

        // Same expression tree again yields the same interned key.
        let string2 = b.ident("string");
        let int2 = b.ident("int");
        let map2 = b.list(Op::MapType, vec![Some(string2), Some(int2)], Span::dummy());
        let slice2 = b.unary(Op::SliceType, map2);
        assert_eq!(c.make_type(&slice2), Some(t));
    }

    #[test]
    fn test_map_with_slice_key_fails() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let int = b.ident("int");
        let key = b.unary(Op::SliceType, int);
        let elem = b.ident("int");
        let map = b.list(Op::MapType, vec![Some(key), Some(elem)], Span::dummy());

        assert!(c.make_type(&map).is_none());
        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::InvalidMapKey.code())));
    }

    #[test]
    fn test_array_type() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let four = b.int_lit("4");
        let byte = b.ident("byte");
        let arr = b.list(Op::ArrayType, vec![Some(four), Some(byte)], Span::dummy());

        let t = c.make_type(&arr).unwrap();
        assert_eq!(c.sem.type_str(t), "[4]uint8");
        assert_eq!(c.sem.types[t].header().size, 4);
    }

    #[test]
    fn test_array_negative_len_fails() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let one = b.int_lit("1");
        let neg = b.unary(Op::Sub, one);
        let int = b.ident("int");
        let arr = b.list(Op::ArrayType, vec![Some(neg), Some(int)], Span::dummy());

        assert!(c.make_type(&arr).is_none());
        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::ArrayLenNotInteger.code())));
    }

    #[test]
    fn test_non_type_ident_rejected() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let node = b.ident("len");
        assert!(c.make_type(&node).is_none());
        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::NotAType.code())));
    }

    #[test]
    fn test_struct_with_embedded_field() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let n = b.ident("n");
        let int = b.ident("int");
        let named_field = b.list(Op::Field, vec![Some(n), Some(int)], Span::dummy());
        let err = b.ident("error");
        let embedded = b.list(Op::Field, vec![None, Some(err)], Span::dummy());
        let st = b.list(Op::StructType, vec![Some(named_field), Some(embedded)], Span::dummy());

        let t = c.make_type(&st).unwrap();
        match c.sem.types[t].detail() {
            crate::typ::TypeDetail::Struct(s) => {
                assert_eq!(s.fields.len(), 2);
                assert!(!s.fields[0].embedded);
                assert!(s.fields[1].embedded);
                assert_eq!(s.fields[1].name, "error");
            }
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_func_type() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let int = b.ident("int");
        let params = b.list(Op::Params, vec![Some(int)], Span::dummy());
        let string = b.ident("string");
        let results = b.list(Op::Results, vec![Some(string)], Span::dummy());
        let ft = b.list(Op::FuncType, vec![Some(params), Some(results)], Span::dummy());

        let t = c.make_type(&ft).unwrap();
        assert_eq!(c.sem.type_str(t), "func(int) string");
    }

    #[test]
    fn test_expression_is_not_a_type() {
        let mut b = NodeBuilder::new();
        let mut c = new_checker();
        let node = b.int_lit("42");
        assert!(c.make_type(&node).is_none());
        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.code == Some(TypeError::ExpectedType.code())));
    }
}
