//! Typed indices into the symbol tables.

/// Index of an entry in one table.
pub trait EntryId: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl EntryId for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                $name(u32::try_from(index).unwrap_or(u32::MAX))
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// A lexical scope instance. Every block, function body and macro
    /// expansion gets a fresh one.
    BodyId
);
define_id!(VarId);
define_id!(FunctionId);
define_id!(TypedataId);
define_id!(CompId);
define_id!(RuleId);
