//! Entity shapes of the Lognex JSON API.
//!
//! # Design
//! Only a representative set of shapes lives here. Every field except
//! `meta` on a weak reference is optional because the server omits absent
//! values and request bodies carry only what the caller sets.
//!
//! Nested values typed as a concrete shape (e.g. `CustomerOrder::organization`)
//! are owned and deep-copied; values typed `MetaEntity` are weak references.

mod contract;
mod country;
mod discount;
mod documents;
mod meta;
mod organization;

pub use contract::Contract;
pub use country::Country;
pub use discount::{
    AccumulationDiscount, AccumulationLevel, BonusProgramDiscount, Discount, DiscountEntity,
    PersonalDiscount, SpecialPrice, SpecialPriceDiscount, DISCOUNTS,
};
pub use documents::{CustomerOrder, RetailShift};
pub use meta::{with_timestamp_precision, Meta, MetaEntity, Timestamp};
pub use organization::Organization;
