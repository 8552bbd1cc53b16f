use std::fmt;

pub const INT_TYPE: &str = "int";
pub const BOOLEAN_TYPE: &str = "boolean";
pub const VOID_TYPE: &str = "void";
pub const STRING_TYPE: &str = "String";

/// A base type name plus whether it is an array of that base.
/// Equality is structural, so two `int[]` written in different places are the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub name: String,
    pub is_array: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Type {
            name: name.into(),
            is_array,
        }
    }

    pub fn int() -> Self {
        Type::new(INT_TYPE, false)
    }

    pub fn boolean() -> Self {
        Type::new(BOOLEAN_TYPE, false)
    }

    pub fn void() -> Self {
        Type::new(VOID_TYPE, false)
    }

    pub fn int_array() -> Self {
        Type::new(INT_TYPE, true)
    }

    pub fn string_array() -> Self {
        Type::new(STRING_TYPE, true)
    }

    pub fn object(class_name: impl Into<String>) -> Self {
        Type::new(class_name, false)
    }

    pub fn is_int(&self) -> bool {
        !self.is_array && self.name == INT_TYPE
    }

    pub fn is_boolean(&self) -> bool {
        !self.is_array && self.name == BOOLEAN_TYPE
    }

    pub fn is_void(&self) -> bool {
        !self.is_array && self.name == VOID_TYPE
    }

    /// Built into the language rather than declared or imported
    pub fn is_builtin_base(&self) -> bool {
        matches!(
            self.name.as_str(),
            INT_TYPE | BOOLEAN_TYPE | VOID_TYPE | STRING_TYPE
        )
    }

    /// A class instance: not an array and not one of the builtin base types
    pub fn is_object(&self) -> bool {
        !self.is_array && !self.is_builtin_base()
    }

    pub fn element_type(&self) -> Type {
        Type::new(self.name.clone(), false)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Symbol {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}
