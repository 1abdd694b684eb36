//! Compile-time values.
//!
//! Values are what the evaluator computes and what literal nodes hold.
//! Token and statement values exist only inside the compiler; they feed
//! `insert` and syntax rule captures.

use std::fmt;
use std::rc::Rc;

use kiln_ir::Token;
use kiln_types::{Type, TypeKind};

use crate::ast::Stmt;
use crate::symbols::{EntryId, FunctionId};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Two's complement, wrapping.
    Int(i64),
    Float(f32),
    Double(f64),
    Char(u8),
    Word(String),
    Array(Vec<Value>),
    Null,
    /// A type used as a value.
    Type(Type),
    Function(FunctionId),
    Token(Token),
    Stmt(Rc<Stmt>),
    Record {
        typedata: String,
        fields: Vec<Value>,
    },
    Void,
}

impl Value {
    /// Character array holding `text`.
    pub fn string(text: &str) -> Self {
        Value::Array(text.bytes().map(Value::Char).collect())
    }

    /// The static type a literal of this value has.
    ///
    /// Function values report `any`; the parser types them from the
    /// function table.
    pub fn static_type(&self) -> Type {
        let ty = match self {
            Value::Int(_) => Type::integer(),
            Value::Float(_) => Type::float(),
            Value::Double(_) => Type::double(),
            Value::Char(_) => Type::character(),
            Value::Word(_) => Type::word(),
            Value::Array(items) => {
                let element = items
                    .first()
                    .map_or_else(Type::any, |first| first.static_type().without_static());
                Type::array(element, Some(items.len()))
            }
            Value::Null => Type::null(),
            Value::Type(ty) => Type::object_type(ty.clone()),
            Value::Function(_) => Type::any(),
            Value::Token(_) => Type::typedata(kiln_types::TOKEN_TYPEDATA),
            Value::Stmt(_) => Type::typedata(kiln_types::STATEMENT_TYPEDATA),
            Value::Record { typedata, .. } => Type::typedata(typedata.clone()),
            Value::Void => Type::void(),
        };
        ty.with_static()
    }

    /// C truthiness of scalar values.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Int(v) => Some(*v != 0),
            Value::Char(c) => Some(*c != 0),
            Value::Float(v) => Some(*v != 0.0),
            Value::Double(v) => Some(*v != 0.0),
            Value::Null => Some(false),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Char(c) => Some(i64::from(*c)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Char(c) => Some(f64::from(*c)),
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Text of a word or character array value.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Word(text) => Some(text.clone()),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Char(c) => Some(char::from(*c)),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Convert to a value of type `ty`.
    ///
    /// Numbers convert along C rules (truncating toward zero, wrapping
    /// into `character`); object-type values become their mangled word
    /// when converted to `word`. Values already of the right kind are
    /// returned unchanged. `None` means no conversion exists.
    pub fn convert(&self, ty: &Type) -> Option<Value> {
        let converted = match (&ty.kind, self) {
            (TypeKind::Integer, Value::Float(_) | Value::Double(_)) => {
                Value::Int(self.as_f64()? as i64)
            }
            (TypeKind::Integer, _) => Value::Int(self.as_int()?),
            (TypeKind::Character, Value::Float(_) | Value::Double(_)) => {
                Value::Char(self.as_f64()? as i64 as u8)
            }
            (TypeKind::Character, _) => Value::Char(self.as_int()? as u8),
            (TypeKind::Float, _) => Value::Float(self.as_f64()? as f32),
            (TypeKind::Double, _) => Value::Double(self.as_f64()?),
            (TypeKind::Word, Value::Type(target)) => Value::Word(target.to_mangled_word()),
            (TypeKind::Word, Value::Word(_)) => self.clone(),
            (TypeKind::Array(array), Value::Array(items)) => {
                let items = items
                    .iter()
                    .map(|item| {
                        if array.element.is_numeric() {
                            item.convert(&array.element)
                        } else {
                            Some(item.clone())
                        }
                    })
                    .collect::<Option<Vec<_>>>()?;
                Value::Array(items)
            }
            (TypeKind::Word, _) => return None,
            _ => self.clone(),
        };
        Some(converted)
    }

    /// Zero value of a type, used for declarations the evaluator runs
    /// without an initializer.
    pub fn zero(ty: &Type) -> Value {
        match &ty.kind {
            TypeKind::Integer => Value::Int(0),
            TypeKind::Float => Value::Float(0.0),
            TypeKind::Double => Value::Double(0.0),
            TypeKind::Character => Value::Char(0),
            TypeKind::Word => Value::Word(String::new()),
            TypeKind::Pointer(_) => Value::Null,
            TypeKind::Array(array) => {
                Value::Array(vec![Value::zero(&array.element); array.length.unwrap_or(0)])
            }
            _ => Value::Void,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}f"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::Char(c) => write!(f, "'{}'", char::from(*c).escape_default()),
            Value::Word(text) => f.write_str(text),
            Value::Array(items) => {
                if let (false, Some(text)) = (items.is_empty(), self.as_text()) {
                    return write!(f, "{text:?}");
                }
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Null => f.write_str("null"),
            Value::Type(ty) => write!(f, "{ty}"),
            Value::Function(id) => write!(f, "function#{}", id.index()),
            Value::Token(token) => write!(f, "{token}"),
            Value::Stmt(_) => f.write_str("<statement>"),
            Value::Record { typedata, fields } => {
                write!(f, "{typedata}(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
            Value::Void => f.write_str("void"),
        }
    }
}
