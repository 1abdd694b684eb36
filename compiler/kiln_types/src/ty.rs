//! Type representation.
//!
//! Types form an owned tree: pointers, arrays, object types and function
//! signatures own their component types outright. Cloning a type deep
//! copies the whole chain; nothing is shared.

use crate::{TypeError, TypeFlags};

/// Name of the builtin nominal type of token values.
pub const TOKEN_TYPEDATA: &str = "token";
/// Name of the builtin nominal type of statement values.
pub const STATEMENT_TYPEDATA: &str = "statement";

/// A type: kind plus qualifier flags.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Type {
    pub kind: TypeKind,
    pub flags: TypeFlags,
}

/// The kinds of type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Integer,
    Float,
    Double,
    Character,
    Word,
    Void,
    /// Dynamic top type.
    Any,
    Pointer(PointerType),
    Array(ArrayType),
    /// A value that is itself a type (reflection). Target `any` means
    /// "some type".
    ObjectType(Box<Type>),
    Function(FunctionSig),
    /// Nominal record type, resolved by name.
    Typedata(String),
    Composite(CompositeType),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PointerType {
    pub target: Box<Type>,
    /// Untyped pointer (`any*`).
    pub is_any: bool,
    /// Type of the `null` literal.
    pub is_null: bool,
    /// Pointee may not be written through this pointer.
    pub is_const: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayType {
    pub element: Box<Type>,
    /// `None` for unsized (`integer[]`).
    pub length: Option<usize>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    /// Empty for unnamed parameters in function type expressions.
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionSig {
    pub ret: Box<Type>,
    pub params: Vec<Param>,
    pub variadic: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompMember {
    pub ty: Type,
    /// The composite may be used where this member is expected.
    pub up: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompositeType {
    pub name: String,
    pub members: Vec<CompMember>,
    /// Only exists at compile time.
    pub static_only: bool,
    /// Union semantics: accepts a value of any member type.
    pub optional: bool,
}

impl Type {
    #[inline]
    pub const fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            flags: TypeFlags::empty(),
        }
    }

    pub const fn integer() -> Self {
        Type::new(TypeKind::Integer)
    }

    pub const fn float() -> Self {
        Type::new(TypeKind::Float)
    }

    pub const fn double() -> Self {
        Type::new(TypeKind::Double)
    }

    pub const fn character() -> Self {
        Type::new(TypeKind::Character)
    }

    pub const fn word() -> Self {
        Type::new(TypeKind::Word)
    }

    pub const fn void() -> Self {
        Type::new(TypeKind::Void)
    }

    pub const fn any() -> Self {
        Type::new(TypeKind::Any)
    }

    /// Pointer to `target`; `any*` when the target is `any`.
    pub fn pointer(target: Type) -> Self {
        let is_any = matches!(target.kind, TypeKind::Any);
        Type::new(TypeKind::Pointer(PointerType {
            target: Box::new(target),
            is_any,
            is_null: false,
            is_const: false,
        }))
    }

    /// Type of the `null` literal: a static untyped pointer.
    pub fn null() -> Self {
        Type::new(TypeKind::Pointer(PointerType {
            target: Box::new(Type::any()),
            is_any: true,
            is_null: true,
            is_const: false,
        }))
        .with_static()
    }

    pub fn array(element: Type, length: Option<usize>) -> Self {
        Type::new(TypeKind::Array(ArrayType {
            element: Box::new(element),
            length,
        }))
    }

    /// Object-type value reflecting `target`.
    pub fn object_type(target: Type) -> Self {
        Type::new(TypeKind::ObjectType(Box::new(target)))
    }

    pub fn function(ret: Type, params: Vec<Param>, variadic: bool) -> Self {
        Type::new(TypeKind::Function(FunctionSig {
            ret: Box::new(ret),
            params,
            variadic,
        }))
    }

    pub fn typedata(name: impl Into<String>) -> Self {
        Type::new(TypeKind::Typedata(name.into()))
    }

    /// `static token[]`.
    pub fn token_array() -> Self {
        Type::array(Type::typedata(TOKEN_TYPEDATA), None).with_static()
    }

    /// `static statement[]`.
    pub fn statement_array() -> Self {
        Type::array(Type::typedata(STATEMENT_TYPEDATA), None).with_static()
    }

    // === Flag builders ===

    #[must_use]
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn with_static(self) -> Self {
        self.with_flags(TypeFlags::STATIC)
    }

    #[must_use]
    pub fn with_const(self) -> Self {
        self.with_flags(TypeFlags::CONST)
    }

    /// Clear `STATIC` and `PROTOTYPE_STATIC`.
    #[must_use]
    pub fn without_static(mut self) -> Self {
        self.flags
            .remove(TypeFlags::STATIC | TypeFlags::PROTOTYPE_STATIC);
        self
    }

    /// Turn a static demand into a prototype promise.
    ///
    /// Used for the parameters of a static function while its body is
    /// parsed: the values exist only once the function is invoked.
    #[must_use]
    pub fn as_prototype(mut self) -> Self {
        if self.flags.is_static() {
            self.flags.remove(TypeFlags::STATIC);
            self.flags.insert(TypeFlags::PROTOTYPE_STATIC);
        }
        self
    }

    // === Queries ===

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }

    #[inline]
    pub fn is_prototype_static(&self) -> bool {
        self.flags.is_prototype_static()
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.flags.is_const()
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self.kind, TypeKind::Any)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    #[inline]
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TypeKind::Word)
    }

    /// Integer, float, double or character.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Integer or character.
    #[inline]
    pub fn is_integral(&self) -> bool {
        matches!(self.kind, TypeKind::Integer | TypeKind::Character)
    }

    /// Position in the promotion lattice `character < integer < float < double`.
    pub fn numeric_rank(&self) -> Option<u8> {
        match self.kind {
            TypeKind::Character => Some(0),
            TypeKind::Integer => Some(1),
            TypeKind::Float => Some(2),
            TypeKind::Double => Some(3),
            _ => None,
        }
    }

    /// Element type of arrays and pointers.
    pub fn element(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::Array(array) => Some(&array.element),
            TypeKind::Pointer(pointer) => Some(&pointer.target),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSig> {
        match &self.kind {
            TypeKind::Function(sig) => Some(sig),
            _ => None,
        }
    }

    /// Reflected type of an object-type value.
    pub fn reflected(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::ObjectType(target) => Some(target),
            _ => None,
        }
    }

    /// Check for an array whose elements are the named builtin nominal type.
    pub fn is_array_of_typedata(&self, name: &str) -> bool {
        match &self.kind {
            TypeKind::Array(array) => {
                matches!(&array.element.kind, TypeKind::Typedata(n) if n == name)
            }
            _ => false,
        }
    }

    /// Check for a character array (string value).
    pub fn is_string(&self) -> bool {
        match &self.kind {
            TypeKind::Array(array) => matches!(array.element.kind, TypeKind::Character),
            _ => false,
        }
    }

    /// Whether a static value of this type can be emitted as a runtime
    /// constant.
    ///
    /// Reflected types, static-only composites, token/statement values
    /// and static function values live only inside the compiler.
    pub fn folds_to_runtime(&self) -> bool {
        match &self.kind {
            TypeKind::Integer
            | TypeKind::Float
            | TypeKind::Double
            | TypeKind::Character
            | TypeKind::Word
            | TypeKind::Void
            | TypeKind::Any => true,
            TypeKind::Pointer(pointer) => pointer.is_null || pointer.target.folds_to_runtime(),
            TypeKind::Array(array) => array.element.folds_to_runtime(),
            TypeKind::ObjectType(_) | TypeKind::Function(_) => false,
            TypeKind::Typedata(name) => name != TOKEN_TYPEDATA && name != STATEMENT_TYPEDATA,
            TypeKind::Composite(comp) => !comp.static_only,
        }
    }

    /// Deep copy that reports allocation failure instead of aborting.
    ///
    /// Component vectors are reserved with `try_reserve_exact`; the
    /// boxed nodes themselves go through the global allocator.
    pub fn try_clone(&self) -> Result<Type, TypeError> {
        let kind = match &self.kind {
            TypeKind::Pointer(pointer) => TypeKind::Pointer(PointerType {
                target: Box::new(pointer.target.try_clone()?),
                is_any: pointer.is_any,
                is_null: pointer.is_null,
                is_const: pointer.is_const,
            }),
            TypeKind::Array(array) => TypeKind::Array(ArrayType {
                element: Box::new(array.element.try_clone()?),
                length: array.length,
            }),
            TypeKind::ObjectType(target) => TypeKind::ObjectType(Box::new(target.try_clone()?)),
            TypeKind::Function(sig) => {
                let mut params = Vec::new();
                params.try_reserve_exact(sig.params.len())?;
                for param in &sig.params {
                    params.push(Param {
                        name: try_clone_str(&param.name)?,
                        ty: param.ty.try_clone()?,
                    });
                }
                TypeKind::Function(FunctionSig {
                    ret: Box::new(sig.ret.try_clone()?),
                    params,
                    variadic: sig.variadic,
                })
            }
            TypeKind::Typedata(name) => TypeKind::Typedata(try_clone_str(name)?),
            TypeKind::Composite(comp) => {
                let mut members = Vec::new();
                members.try_reserve_exact(comp.members.len())?;
                for member in &comp.members {
                    members.push(CompMember {
                        ty: member.ty.try_clone()?,
                        up: member.up,
                    });
                }
                TypeKind::Composite(CompositeType {
                    name: try_clone_str(&comp.name)?,
                    members,
                    static_only: comp.static_only,
                    optional: comp.optional,
                })
            }
            simple => simple.clone(),
        };
        Ok(Type {
            kind,
            flags: self.flags,
        })
    }
}

fn try_clone_str(text: &str) -> Result<String, TypeError> {
    let mut out = String::new();
    out.try_reserve_exact(text.len())?;
    out.push_str(text);
    Ok(out)
}

impl FunctionSig {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl CompositeType {
    /// First member castable from `target`, if any.
    pub fn member_accepting(&self, target: &Type) -> Option<&CompMember> {
        self.members
            .iter()
            .find(|member| crate::cast::kind_castable(&member.ty, target))
    }
}
