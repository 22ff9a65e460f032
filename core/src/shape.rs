//! Declared return types and their classification.
//!
//! # Design
//! Rust has no runtime reflection, so a service method's declared return type
//! is described with a `TypeDescriptor` at registration time. `ReturnShape`
//! classifies it once; nothing here runs on the execution path.

use std::borrow::Cow;
use std::fmt;

use crate::error::ShapeError;

/// Head of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawType {
    /// The deferred call type itself.
    Call,
    /// The envelope type, `Response<T>`.
    Response,
    /// Any other type, named for diagnostics.
    Named(Cow<'static, str>),
}

/// A declared type: its head plus type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    raw: RawType,
    args: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            raw: RawType::Named(name.into()),
            args: Vec::new(),
        }
    }

    /// Descriptor for a Rust type, named by `std::any::type_name`.
    pub fn of<T: ?Sized>() -> Self {
        Self::named(std::any::type_name::<T>())
    }

    /// `Call<inner>`.
    pub fn call(inner: TypeDescriptor) -> Self {
        Self::raw_call().with_args([inner])
    }

    /// `Call` without a type argument.
    pub fn raw_call() -> Self {
        Self {
            raw: RawType::Call,
            args: Vec::new(),
        }
    }

    /// `Response<inner>`.
    pub fn response(inner: TypeDescriptor) -> Self {
        Self::raw_response().with_args([inner])
    }

    /// `Response` without a type argument.
    pub fn raw_response() -> Self {
        Self {
            raw: RawType::Response,
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn raw(&self) -> &RawType {
        &self.raw
    }

    pub fn args(&self) -> &[TypeDescriptor] {
        &self.args
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            RawType::Call => f.write_str("Call")?,
            RawType::Response => f.write_str("Response")?,
            RawType::Named(name) => f.write_str(name)?,
        }
        if let Some((first, rest)) = self.args.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// How a call site wants its result handed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// The decoded body itself; non-2xx becomes an error.
    BareValue(TypeDescriptor),
    /// `Response<T>`; non-2xx becomes an error envelope.
    Envelope(TypeDescriptor),
}

impl ReturnShape {
    /// Classify a declared return type.
    ///
    /// Returns `Ok(None)` for the call type, which is left to whatever
    /// handles unadapted calls.
    pub fn select(declared: &TypeDescriptor) -> Result<Option<Self>, ShapeError> {
        match declared.raw() {
            RawType::Call => Ok(None),
            RawType::Response => match declared.args() {
                [inner] => Ok(Some(ReturnShape::Envelope(inner.clone()))),
                [] => Err(ShapeError::UnparameterizedEnvelope(declared.clone())),
                args => Err(ShapeError::EnvelopeArity {
                    declared: declared.clone(),
                    found: args.len(),
                }),
            },
            RawType::Named(_) => Ok(Some(ReturnShape::BareValue(declared.clone()))),
        }
    }

    /// The body type `T` the decoder must produce.
    pub fn response_type(&self) -> &TypeDescriptor {
        match self {
            ReturnShape::BareValue(ty) | ReturnShape::Envelope(ty) => ty,
        }
    }
}
