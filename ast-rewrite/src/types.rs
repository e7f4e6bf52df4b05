//! Semantic type descriptions.
//!
//! These are the inputs of the declarator synthesizer. They describe what a
//! type *is*, independent of how a declaration spells it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `const` / `volatile` / `restrict` qualification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CvQualifiers {
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_volatile: bool,
    #[serde(default)]
    pub is_restrict: bool,
}

impl CvQualifiers {
    pub const NONE: CvQualifiers = CvQualifiers {
        is_const: false,
        is_volatile: false,
        is_restrict: false,
    };

    pub const CONST: CvQualifiers = CvQualifiers {
        is_const: true,
        is_volatile: false,
        is_restrict: false,
    };

    pub const VOLATILE: CvQualifiers = CvQualifiers {
        is_const: false,
        is_volatile: true,
        is_restrict: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.is_const || self.is_volatile || self.is_restrict)
    }

    /// Union of both qualifier sets.
    pub fn merge(self, other: CvQualifiers) -> CvQualifiers {
        CvQualifiers {
            is_const: self.is_const || other.is_const,
            is_volatile: self.is_volatile || other.is_volatile,
            is_restrict: self.is_restrict || other.is_restrict,
        }
    }

    /// Keywords in canonical order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.is_const, "const"),
            (self.is_volatile, "volatile"),
            (self.is_restrict, "restrict"),
        ]
        .into_iter()
        .filter_map(|(set, kw)| set.then_some(kw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Void,
    Bool,
    Char,
    WChar,
    Char16,
    Char32,
    Int,
    Float,
    Double,
    /// Only modifiers were spelled, e.g. `unsigned`.
    Unspecified,
}

impl BasicKind {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            BasicKind::Void => Some("void"),
            BasicKind::Bool => Some("bool"),
            BasicKind::Char => Some("char"),
            BasicKind::WChar => Some("wchar_t"),
            BasicKind::Char16 => Some("char16_t"),
            BasicKind::Char32 => Some("char32_t"),
            BasicKind::Int => Some("int"),
            BasicKind::Float => Some("float"),
            BasicKind::Double => Some("double"),
            BasicKind::Unspecified => None,
        }
    }
}

/// Size and sign modifiers of a basic type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicModifiers {
    #[serde(default)]
    pub is_signed: bool,
    #[serde(default)]
    pub is_unsigned: bool,
    #[serde(default)]
    pub is_short: bool,
    #[serde(default)]
    pub is_long: bool,
    #[serde(default)]
    pub is_long_long: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicType {
    pub kind: BasicKind,
    #[serde(default)]
    pub modifiers: BasicModifiers,
}

impl BasicType {
    pub const VOID: BasicType = BasicType::new(BasicKind::Void);
    pub const INT: BasicType = BasicType::new(BasicKind::Int);

    pub const fn new(kind: BasicKind) -> Self {
        BasicType {
            kind,
            modifiers: BasicModifiers {
                is_signed: false,
                is_unsigned: false,
                is_short: false,
                is_long: false,
                is_long_long: false,
            },
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        let words = [
            (m.is_signed, "signed"),
            (m.is_unsigned, "unsigned"),
            (m.is_short, "short"),
            (m.is_long, "long"),
            (m.is_long_long, "long long"),
        ];
        let mut first = true;
        for word in words
            .iter()
            .filter_map(|(set, w)| set.then_some(*w))
            .chain(self.kind.keyword())
        {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(word)?;
            first = false;
        }
        Ok(())
    }
}

/// What a named type binding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Typedef,
    Class,
    Struct,
    Union,
    Enum,
}

/// A named type, identified by its qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub kind: BindingKind,
    /// `["ns", "Outer", "Inner"]` for `ns::Outer::Inner`.
    pub qualified_name: Vec<String>,
}

impl Binding {
    pub fn new(kind: BindingKind, qualified_name: &str) -> Self {
        Binding {
            kind,
            qualified_name: qualified_name.split("::").map(String::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArraySize {
    Value { value: u64 },
    /// Size expression spelled as source text, e.g. `N + 1`.
    Expression { text: String },
}

/// Semantic type description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Type {
    Basic(BasicType),
    Pointer {
        target: Box<Type>,
        #[serde(default)]
        cv: CvQualifiers,
    },
    Reference {
        target: Box<Type>,
        #[serde(default)]
        rvalue: bool,
    },
    PointerToMember {
        target: Box<Type>,
        class: Binding,
        #[serde(default)]
        cv: CvQualifiers,
    },
    Array {
        element: Box<Type>,
        size: Option<ArraySize>,
    },
    Function {
        return_type: Box<Type>,
        parameters: Vec<Type>,
        #[serde(default)]
        varargs: bool,
    },
    Qualifier {
        target: Box<Type>,
        cv: CvQualifiers,
    },
    Binding(Binding),
    /// Anything the semantic layer could not classify.
    Problem { reason: String },
}

impl Type {
    pub fn basic(kind: BasicKind) -> Type {
        Type::Basic(BasicType::new(kind))
    }

    pub fn int() -> Type {
        Type::basic(BasicKind::Int)
    }

    pub fn void() -> Type {
        Type::basic(BasicKind::Void)
    }

    pub fn pointer_to(target: Type) -> Type {
        Type::Pointer {
            target: Box::new(target),
            cv: CvQualifiers::NONE,
        }
    }

    pub fn reference_to(target: Type) -> Type {
        Type::Reference {
            target: Box::new(target),
            rvalue: false,
        }
    }

    pub fn array_of(element: Type, size: u64) -> Type {
        Type::Array {
            element: Box::new(element),
            size: Some(ArraySize::Value { value: size }),
        }
    }

    pub fn function(return_type: Type, parameters: Vec<Type>) -> Type {
        Type::Function {
            return_type: Box::new(return_type),
            parameters,
            varargs: false,
        }
    }

    pub fn qualified(target: Type, cv: CvQualifiers) -> Type {
        Type::Qualifier {
            target: Box::new(target),
            cv,
        }
    }

    pub fn is_pointer_like(&self) -> bool {
        matches!(
            self,
            Type::Pointer { .. } | Type::Reference { .. } | Type::PointerToMember { .. }
        )
    }

    /// Whether a declaration of this type needs more than a bare name as
    /// its declarator.
    pub fn needs_nontrivial_declarator(&self) -> bool {
        match self {
            Type::Pointer { .. }
            | Type::Reference { .. }
            | Type::PointerToMember { .. }
            | Type::Array { .. }
            | Type::Function { .. } => true,
            Type::Qualifier { target, .. } => target.needs_nontrivial_declarator(),
            Type::Basic(_) | Type::Binding(_) | Type::Problem { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_type_display() {
        let mut ty = BasicType::new(BasicKind::Int);
        ty.modifiers.is_unsigned = true;
        ty.modifiers.is_long = true;
        assert_eq!(ty.to_string(), "unsigned long int");

        let mut bare = BasicType::new(BasicKind::Unspecified);
        bare.modifiers.is_unsigned = true;
        assert_eq!(bare.to_string(), "unsigned");
    }

    #[test]
    fn test_nontrivial_declarator_sees_through_qualifiers() {
        let const_ptr = Type::qualified(Type::pointer_to(Type::int()), CvQualifiers::CONST);
        assert!(const_ptr.needs_nontrivial_declarator());
        assert!(!Type::qualified(Type::int(), CvQualifiers::CONST).needs_nontrivial_declarator());
    }

    #[test]
    fn test_type_deserializes_from_json() {
        let json = r#"{"type":"pointer","target":{"type":"basic","kind":"char"}}"#;
        let ty: Type = serde_json::from_str(json).unwrap();
        assert_eq!(ty, Type::pointer_to(Type::basic(BasicKind::Char)));
    }
}
