//! Rendering types as source text and as identifier-safe words.

use std::fmt::{self, Write};

use crate::{Type, TypeKind};

impl Type {
    /// Source-like spelling, e.g. `static integer[3]`.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// Identifier-safe encoding, unique per structural type.
    ///
    /// Qualifiers other than pointer constness are not encoded, so
    /// `static integer` and `integer` share a word.
    pub fn to_mangled_word(&self) -> String {
        let mut out = String::new();
        mangle_into(self, &mut out);
        out
    }
}

fn mangle_into(ty: &Type, out: &mut String) {
    match &ty.kind {
        TypeKind::Integer => out.push('i'),
        TypeKind::Float => out.push('f'),
        TypeKind::Double => out.push('d'),
        TypeKind::Character => out.push('c'),
        TypeKind::Word => out.push('w'),
        TypeKind::Void => out.push('v'),
        TypeKind::Any => out.push('a'),
        TypeKind::Pointer(pointer) => {
            if pointer.is_null {
                out.push('N');
                return;
            }
            out.push(if pointer.is_const { 'K' } else { 'P' });
            mangle_into(&pointer.target, out);
        }
        TypeKind::Array(array) => {
            out.push('A');
            if let Some(length) = array.length {
                let _ = write!(out, "{length}");
            }
            out.push('_');
            mangle_into(&array.element, out);
        }
        TypeKind::ObjectType(target) => {
            out.push('T');
            mangle_into(target, out);
        }
        TypeKind::Function(sig) => {
            let _ = write!(out, "F{}", sig.params.len());
            mangle_into(&sig.ret, out);
            for param in &sig.params {
                mangle_into(&param.ty, out);
            }
            if sig.variadic {
                out.push('V');
            }
        }
        TypeKind::Typedata(name) => {
            let _ = write!(out, "D{}{name}", name.len());
        }
        TypeKind::Composite(comp) => {
            let _ = write!(out, "C{}{}", comp.name.len(), comp.name);
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static() {
            f.write_str("static ")?;
        }
        if self.is_const() {
            f.write_str("const ")?;
        }
        match &self.kind {
            TypeKind::Integer => f.write_str("integer"),
            TypeKind::Float => f.write_str("float"),
            TypeKind::Double => f.write_str("double"),
            TypeKind::Character => f.write_str("character"),
            TypeKind::Word => f.write_str("word"),
            TypeKind::Void => f.write_str("void"),
            TypeKind::Any => f.write_str("any"),
            TypeKind::Pointer(pointer) if pointer.is_null => f.write_str("null"),
            TypeKind::Pointer(pointer) => {
                let qualifier = if pointer.is_const { " const" } else { "" };
                write!(f, "{}{qualifier}*", pointer.target)
            }
            TypeKind::Array(array) => match array.length {
                Some(length) => write!(f, "{}[{length}]", array.element),
                None => write!(f, "{}[]", array.element),
            },
            TypeKind::ObjectType(target) if target.is_any() => f.write_str("type"),
            TypeKind::ObjectType(target) => write!(f, "type<{target}>"),
            TypeKind::Function(sig) => {
                f.write_str("function(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", param.ty)?;
                    if !param.name.is_empty() {
                        write!(f, " {}", param.name)?;
                    }
                }
                if sig.variadic {
                    f.write_str(if sig.params.is_empty() { "..." } else { ", ..." })?;
                }
                write!(f, ") -> {}", sig.ret)
            }
            TypeKind::Typedata(name) => f.write_str(name),
            TypeKind::Composite(comp) => f.write_str(&comp.name),
        }
    }
}
