//! Structural copies of entities.
//!
//! # Design
//! Every concrete entity shape derives `Clone` over owned fields only, so a
//! clone is a deep copy of every nested entity it owns. Weak references
//! (`MetaEntity`) carry nothing but a `meta` value and are copied as values,
//! which is why copying always terminates. The `entity!` macro registers a
//! shape behind the object-safe `Entity` trait so that heterogeneous values
//! can be copied and assigned through `dyn Entity`, with shape checks.

use std::any::Any;
use std::fmt;

use crate::entities::Meta;
use crate::error::{Error, Result};

/// A concrete entity shape that can be copied without knowing its type.
pub trait Entity: Any + fmt::Debug + Send + Sync {
    /// Name of the concrete shape, normally its `meta.type` value.
    fn shape(&self) -> &'static str;

    fn meta(&self) -> Option<&Meta>;

    fn as_any(&self) -> &dyn Any;

    /// Deep copy behind a trait object.
    fn boxed_copy(&self) -> Box<dyn Entity>;

    /// Replaces every field of `self` with a copy of the fields of `source`.
    ///
    /// Fails with `ShapeMismatch` and leaves `self` untouched when `source`
    /// is a different shape.
    fn assign_from(&mut self, source: &dyn Entity) -> Result<()>;
}

/// Returns an independent copy of `source`.
pub fn copy<E: Entity + Clone>(source: &E) -> E {
    source.clone()
}

/// Copies the field values of `source` into `target`.
pub fn assign(target: &mut dyn Entity, source: &dyn Entity) -> Result<()> {
    target.assign_from(source)
}

#[doc(hidden)]
pub fn shape_mismatch(target: &dyn Entity, source: &dyn Entity) -> Error {
    Error::ShapeMismatch {
        expected: target.shape(),
        found: source.shape(),
    }
}

/// Implements [`Entity`](crate::copy::Entity) for a `Clone` struct.
///
/// The optional third argument is the field path to the struct's
/// `Option<Meta>`; it defaults to `meta`.
///
/// ```ignore
/// lognex_core::entity!(Contract, "contract");
/// lognex_core::entity!(BonusProgramDiscount, "bonusprogram", discount.meta);
/// ```
#[macro_export]
macro_rules! entity {
    ($ty:ty, $shape:literal) => {
        $crate::entity!($ty, $shape, meta);
    };
    ($ty:ty, $shape:literal, $($field:ident).+) => {
        impl $crate::copy::Entity for $ty {
            fn shape(&self) -> &'static str {
                $shape
            }

            fn meta(&self) -> ::std::option::Option<&$crate::entities::Meta> {
                self.$($field).+.as_ref()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn boxed_copy(&self) -> ::std::boxed::Box<dyn $crate::copy::Entity> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn assign_from(&mut self, source: &dyn $crate::copy::Entity) -> $crate::error::Result<()> {
                match source.as_any().downcast_ref::<Self>() {
                    ::std::option::Option::Some(source) => {
                        *self = ::std::clone::Clone::clone(source);
                        ::std::result::Result::Ok(())
                    }
                    ::std::option::Option::None => {
                        ::std::result::Result::Err($crate::copy::shape_mismatch(&*self, source))
                    }
                }
            }
        }
    };
}
