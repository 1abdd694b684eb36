//! Kiln Types - the type model.
//!
//! Pure functions over owned [`Type`] trees:
//! - [`equals`]: structural, symmetric equality
//! - [`is_castable`]: asymmetric implicit conversion check
//! - [`is_convertible`]: what an explicit cast may do
//! - [`common_type`]: operand type of mixed arithmetic
//! - display and mangled-word rendering
//!
//! There is no interner and no hidden state.

mod cast;
mod common;
mod error;
mod flags;
mod format;
mod ty;

pub use cast::{equals, is_castable, is_convertible};
pub use common::common_type;
pub use error::TypeError;
pub use flags::TypeFlags;
pub use ty::{
    ArrayType, CompMember, CompositeType, FunctionSig, Param, PointerType, Type, TypeKind,
    STATEMENT_TYPEDATA, TOKEN_TYPEDATA,
};
