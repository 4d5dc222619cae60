use std::{collections::HashMap, fmt, rc::Rc};

use crate::runtime::error::RuntimeError;

/// Index into the [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Ids of the types every registry starts with.
pub mod builtin {
    use super::TypeId;

    pub const ANY: TypeId = TypeId(0);
    pub const NOTHING: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const INT64: TypeId = TypeId(3);
    pub const FLOAT64: TypeId = TypeId(4);
    pub const STRING: TypeId = TypeId(5);
    pub const DATATYPE: TypeId = TypeId(6);
    pub const MODULE: TypeId = TypeId(7);
    pub const FUNCTION: TypeId = TypeId(8);
    pub const CODE: TypeId = TypeId(9);

    pub const ERROR_EXCEPTION: TypeId = TypeId(10);
    pub const UNDEF_VAR_ERROR: TypeId = TypeId(11);
    pub const METHOD_ERROR: TypeId = TypeId(12);
    pub const FIELD_ERROR: TypeId = TypeId(13);
    pub const BOUNDS_ERROR: TypeId = TypeId(14);
    pub const ARGUMENT_ERROR: TypeId = TypeId(15);
    pub const PARSE_ERROR: TypeId = TypeId(16);
    pub const DIVIDE_ERROR: TypeId = TypeId(17);
    pub const INTERRUPT_EXCEPTION: TypeId = TypeId(18);
    pub const TYPE_ERROR: TypeId = TypeId(19);
}

const PRIMITIVES: &[&str] = &[
    "Any", "Nothing", "Bool", "Int64", "Float64", "String", "DataType", "Module", "Function",
    "Code",
];

const EXCEPTIONS: &[(&str, &[&str])] = &[
    ("ErrorException", &["msg"]),
    ("UndefVarError", &["var"]),
    ("MethodError", &["msg"]),
    ("FieldError", &["type", "field"]),
    ("BoundsError", &["index"]),
    ("ArgumentError", &["msg"]),
    ("ParseError", &["msg"]),
    ("DivideError", &[]),
    ("InterruptException", &[]),
    ("TypeError", &["msg"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive,
    Struct { fields: Rc<[Rc<str>]> },
    Array { elem: TypeId, rank: usize },
    Tuple(Rc<[TypeId]>),
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: Rc<str>,
    pub kind: TypeKind,
}

impl TypeInfo {
    /// Name of the type constructor: `Array` for every array type, `Tuple`
    /// for every tuple type, the declared name otherwise.
    pub fn base_name(&self) -> &str {
        match self.kind {
            TypeKind::Array { .. } => "Array",
            TypeKind::Tuple(_) => "Tuple",
            _ => &self.name,
        }
    }

    pub fn fields(&self) -> &[Rc<str>] {
        match &self.kind {
            TypeKind::Struct { fields } => fields,
            _ => &[],
        }
    }
}

/// Every type the runtime knows about. Types are never freed.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
    by_name: HashMap<Rc<str>, TypeId>,
    arrays: HashMap<(TypeId, usize), TypeId>,
    tuples: HashMap<Rc<[TypeId]>, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            arrays: HashMap::new(),
            tuples: HashMap::new(),
        };
        for name in PRIMITIVES {
            registry.push_named(name, TypeKind::Primitive);
        }
        for (name, fields) in EXCEPTIONS {
            let fields: Vec<Rc<str>> = fields.iter().map(|f| Rc::from(*f)).collect();
            registry.push_named(
                name,
                TypeKind::Struct {
                    fields: fields.into(),
                },
            );
        }
        registry
    }

    fn push(&mut self, name: Rc<str>, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeInfo { name, kind });
        id
    }

    fn push_named(&mut self, name: &str, kind: TypeKind) -> TypeId {
        let name: Rc<str> = name.into();
        let id = self.push(name.clone(), kind);
        self.by_name.insert(name, id);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.0 as usize)
    }

    pub fn name(&self, id: TypeId) -> &str {
        self.get(id).map_or("?", |info| &info.name)
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every named type, in declaration order.
    pub fn named(&self) -> impl Iterator<Item = (TypeId, &TypeInfo)> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, info)| matches!(info.kind, TypeKind::Primitive | TypeKind::Struct { .. }))
            .map(|(i, info)| (TypeId(i as u32), info))
    }

    /// Declares a struct type. Redeclaring with identical fields returns the
    /// existing type.
    pub fn declare_struct(
        &mut self,
        name: &Rc<str>,
        fields: &[Rc<str>],
    ) -> Result<TypeId, RuntimeError> {
        if let Some(existing) = self.lookup(name) {
            return match self.get(existing).map(|info| &info.kind) {
                Some(TypeKind::Struct { fields: old }) if **old == *fields => Ok(existing),
                _ => Err(RuntimeError::Message(format!(
                    "invalid redefinition of constant {}",
                    name
                ))),
            };
        }
        Ok(self.push_named(
            name,
            TypeKind::Struct {
                fields: fields.into(),
            },
        ))
    }

    pub fn array_type(&mut self, elem: TypeId, rank: usize) -> TypeId {
        if let Some(id) = self.arrays.get(&(elem, rank)) {
            return *id;
        }
        let name = format!("Array{{{},{}}}", self.name(elem), rank);
        let id = self.push(name.into(), TypeKind::Array { elem, rank });
        self.arrays.insert((elem, rank), id);
        id
    }

    pub fn tuple_type(&mut self, elems: &[TypeId]) -> TypeId {
        if let Some(id) = self.tuples.get(elems) {
            return *id;
        }
        let names: Vec<&str> = elems.iter().map(|e| self.name(*e)).collect();
        let name = format!("Tuple{{{}}}", names.join(","));
        let elems: Rc<[TypeId]> = elems.into();
        let id = self.push(name.into(), TypeKind::Tuple(elems.clone()));
        self.tuples.insert(elems, id);
        id
    }

    /// Index of `field` in the struct type `ty`.
    pub fn field_index(&self, ty: TypeId, field: &str) -> Option<usize> {
        self.get(ty)?.fields().iter().position(|f| &**f == field)
    }

    pub fn is_struct(&self, ty: TypeId) -> bool {
        matches!(
            self.get(ty).map(|info| &info.kind),
            Some(TypeKind::Struct { .. })
        )
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_match_names() {
        let types = TypeRegistry::new();
        assert_eq!(types.lookup("Int64"), Some(builtin::INT64));
        assert_eq!(types.lookup("Code"), Some(builtin::CODE));
        assert_eq!(types.lookup("ErrorException"), Some(builtin::ERROR_EXCEPTION));
        assert_eq!(types.lookup("TypeError"), Some(builtin::TYPE_ERROR));
        assert_eq!(types.field_index(builtin::FIELD_ERROR, "field"), Some(1));
    }

    #[test]
    fn array_and_tuple_types_are_interned() {
        let mut types = TypeRegistry::new();
        let a = types.array_type(builtin::INT64, 1);
        assert_eq!(types.array_type(builtin::INT64, 1), a);
        assert_ne!(types.array_type(builtin::INT64, 2), a);
        assert_eq!(types.name(a), "Array{Int64,1}");
        assert_eq!(types.get(a).map(TypeInfo::base_name), Some("Array"));

        let t = types.tuple_type(&[builtin::INT64, builtin::STRING]);
        assert_eq!(types.tuple_type(&[builtin::INT64, builtin::STRING]), t);
        assert_eq!(types.name(t), "Tuple{Int64,String}");
        assert_eq!(types.get(t).map(TypeInfo::base_name), Some("Tuple"));
    }

    #[test]
    fn struct_redeclaration() {
        let mut types = TypeRegistry::new();
        let fields: Vec<Rc<str>> = vec!["x".into(), "y".into()];
        let name: Rc<str> = "Point".into();
        let id = types.declare_struct(&name, &fields).unwrap();
        assert_eq!(types.declare_struct(&name, &fields).unwrap(), id);
        let err = types.declare_struct(&name, &fields[..1]).unwrap_err();
        assert_eq!(err.to_string(), "invalid redefinition of constant Point");
    }
}
