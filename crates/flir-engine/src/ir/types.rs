//! Type IR
//!
//! Types are structural values: two types are equal when their names,
//! nullability and arguments are equal. They carry no node id or location.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::error::ConstructionError;

/// A resolved (or deliberately unresolved) type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeIR {
    /// Named type, optionally instantiated: `int`, `Widget`, `List<String>`
    Simple {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_args: Vec<TypeIR>,
    },

    /// Generic class type reported with explicit type arguments that may
    /// still mention type parameters: `Map<K, V>`
    Generic { name: String, type_args: Vec<TypeIR> },

    /// Function type: `int Function(String, {bool flag})`
    Function {
        return_type: Box<TypeIR>,
        #[serde(default)]
        positional: Vec<TypeIR>,
        #[serde(default)]
        named: Vec<NamedType>,
    },

    /// Reference to a type parameter: `T`, `T extends Widget`
    TypeParameter {
        name: String,
        #[serde(default)]
        bound: Option<Box<TypeIR>>,
    },

    /// `dynamic`, also used for unresolved types
    Dynamic,

    /// `void`
    Void,

    /// `Never`
    Never,

    /// `T?`
    Nullable { inner: NullableType },
}

/// Named parameter slot of a function type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    pub ty: TypeIR,
    #[serde(default)]
    pub required: bool,
}

/// Base type of a `Nullable` wrapper. Always non-nullable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NullableType(Box<TypeIR>);

impl NullableType {
    /// Wrap `base`, rejecting bases that are already nullable.
    ///
    /// `dynamic` is rejected as well: it already admits null.
    pub fn new(base: TypeIR) -> Result<Self, ConstructionError> {
        match base {
            TypeIR::Nullable { .. } | TypeIR::Dynamic => Err(ConstructionError::NestedNullable {
                base: base.to_string(),
            }),
            base => Ok(Self(Box::new(base))),
        }
    }

    pub fn base(&self) -> &TypeIR {
        &self.0
    }
}

impl Serialize for NullableType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NullableType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let base = TypeIR::deserialize(deserializer)?;
        NullableType::new(base).map_err(serde::de::Error::custom)
    }
}

impl TypeIR {
    /// Plain named type without arguments.
    pub fn simple(name: impl Into<String>) -> Self {
        TypeIR::Simple {
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    /// Named type with arguments.
    pub fn with_args(name: impl Into<String>, type_args: Vec<TypeIR>) -> Self {
        TypeIR::Simple {
            name: name.into(),
            type_args,
        }
    }

    pub fn type_parameter(name: impl Into<String>) -> Self {
        TypeIR::TypeParameter {
            name: name.into(),
            bound: None,
        }
    }

    /// Make `self` nullable.
    ///
    /// Normalizes instead of nesting: `T?` stays `T?` and `dynamic` stays
    /// `dynamic`.
    pub fn nullable(self) -> Self {
        match self {
            TypeIR::Nullable { .. } | TypeIR::Dynamic => self,
            base => TypeIR::Nullable {
                inner: NullableType(Box::new(base)),
            },
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeIR::Nullable { .. } | TypeIR::Dynamic)
    }

    /// The type with a top-level `?` removed.
    pub fn non_nullable(&self) -> &TypeIR {
        match self {
            TypeIR::Nullable { inner } => inner.base(),
            other => other,
        }
    }

    /// Declared name of named types and type parameters.
    pub fn name(&self) -> Option<&str> {
        match self.non_nullable() {
            TypeIR::Simple { name, .. }
            | TypeIR::Generic { name, .. }
            | TypeIR::TypeParameter { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[TypeIR] {
        match self.non_nullable() {
            TypeIR::Simple { type_args, .. } | TypeIR::Generic { type_args, .. } => type_args,
            _ => &[],
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeIR::Void)
    }

    /// Whether this is `Future<..>` or `FutureOr<..>`.
    pub fn is_future(&self) -> bool {
        matches!(self.name(), Some("Future") | Some("FutureOr"))
    }
}

impl Default for TypeIR {
    fn default() -> Self {
        TypeIR::Dynamic
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[TypeIR]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    write!(f, "<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ">")
}

impl fmt::Display for TypeIR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeIR::Simple { name, type_args } | TypeIR::Generic { name, type_args } => {
                write!(f, "{}", name)?;
                write_args(f, type_args)
            }
            TypeIR::Function {
                return_type,
                positional,
                named,
            } => {
                write!(f, "{} Function(", return_type)?;
                for (i, p) in positional.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                if !named.is_empty() {
                    if !positional.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "{{")?;
                    for (i, n) in named.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        if n.required {
                            write!(f, "required ")?;
                        }
                        write!(f, "{} {}", n.ty, n.name)?;
                    }
                    write!(f, "}}")?;
                }
                write!(f, ")")
            }
            TypeIR::TypeParameter { name, bound } => match bound {
                Some(bound) => write!(f, "{} extends {}", name, bound),
                None => write!(f, "{}", name),
            },
            TypeIR::Dynamic => write!(f, "dynamic"),
            TypeIR::Void => write!(f, "void"),
            TypeIR::Never => write!(f, "Never"),
            TypeIR::Nullable { inner } => write!(f, "{}?", inner.base()),
        }
    }
}
