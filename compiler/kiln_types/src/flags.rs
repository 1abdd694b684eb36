//! Orthogonal qualifiers carried by every type.

use bitflags::bitflags;

bitflags! {
    /// Qualifier flags.
    ///
    /// Kept outside `TypeKind` so every kind can be static or const
    /// without a wrapper variant.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u8 {
        /// Value is known at compile time.
        const STATIC = 1 << 0;
        /// Declared static by a prototype; the value is still unknown
        /// while the function body is being parsed.
        const PROTOTYPE_STATIC = 1 << 1;
        /// Value (or pointee, for pointers) may not be modified.
        const CONST = 1 << 2;
    }
}

impl TypeFlags {
    /// Flags that take part in structural equality.
    pub const IDENTITY_MASK: Self = Self::STATIC.union(Self::CONST);

    #[inline]
    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    #[inline]
    pub const fn is_prototype_static(self) -> bool {
        self.contains(Self::PROTOTYPE_STATIC)
    }

    #[inline]
    pub const fn is_const(self) -> bool {
        self.contains(Self::CONST)
    }

    /// Static or promised static by a prototype.
    #[inline]
    pub const fn is_compile_time(self) -> bool {
        self.intersects(Self::STATIC.union(Self::PROTOTYPE_STATIC))
    }
}
