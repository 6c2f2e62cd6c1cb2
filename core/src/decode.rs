//! Decoding of polymorphic entities by their `meta.type` tag.
//!
//! # Design
//! A `VariantFamily` maps each discriminator value to a plain function that
//! decodes the whole record as one concrete shape. Families are built once
//! (usually in a `once_cell::sync::Lazy` static) and only read afterwards, so
//! they can be shared between threads without locking. Adding a variant is a
//! `register` call, not a new match arm.
//!
//! An unknown tag is always an error. The family's generic tag is the only
//! value that decodes into the base shape.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Decodes a full raw record into one member of the family.
pub type DecodeFn<E> = fn(Value) -> Result<E>;

/// Decodes `raw` as `T` and wraps it into the family type.
pub fn decode_as<T, E>(raw: Value) -> Result<E>
where
    T: DeserializeOwned + Into<E>,
{
    serde_json::from_value::<T>(raw)
        .map(Into::into)
        .map_err(Error::Decode)
}

/// Registry of discriminator value → decoder for one polymorphic concept.
pub struct VariantFamily<E> {
    name: &'static str,
    generic_tag: &'static str,
    generic: DecodeFn<E>,
    variants: HashMap<&'static str, DecodeFn<E>>,
}

impl<E> VariantFamily<E> {
    /// Creates a family whose `generic_tag` decodes with `generic`.
    pub fn new(name: &'static str, generic_tag: &'static str, generic: DecodeFn<E>) -> Self {
        Self {
            name,
            generic_tag,
            generic,
            variants: HashMap::new(),
        }
    }

    /// Registers the decoder for `tag`.
    ///
    /// # Panics
    /// When `tag` is already registered or equals the generic tag: a tag has
    /// exactly one representation.
    pub fn register(mut self, tag: &'static str, decode: DecodeFn<E>) -> Self {
        assert!(
            tag != self.generic_tag,
            "`{tag}` is the generic tag of the {} family",
            self.name
        );
        let previous = self.variants.insert(tag, decode);
        assert!(
            previous.is_none(),
            "`{tag}` is registered twice in the {} family",
            self.name
        );
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn generic_tag(&self) -> &'static str {
        self.generic_tag
    }

    /// Registered variant tags, generic tag excluded, in sorted order.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.variants.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        tag == self.generic_tag || self.variants.contains_key(tag)
    }

    /// Reads `meta.type` from `raw` without decoding anything else.
    pub fn discriminator<'v>(&self, raw: &'v Value) -> Result<&'v str> {
        let meta = raw
            .get("meta")
            .filter(|meta| meta.is_object())
            .ok_or(Error::MissingDiscriminatorContext { family: self.name })?;
        meta.get("type")
            .and_then(Value::as_str)
            .ok_or(Error::MissingDiscriminatorValue { family: self.name })
    }

    /// Decodes `raw` as the shape registered for its `meta.type`.
    pub fn decode(&self, raw: Value) -> Result<E> {
        let tag = self.discriminator(&raw)?;
        if tag == self.generic_tag {
            return (self.generic)(raw);
        }
        match self.variants.get(tag) {
            Some(decode) => decode(raw),
            None => Err(Error::UnknownVariant {
                family: self.name,
                value: tag.to_string(),
            }),
        }
    }

    pub fn decode_str(&self, json: &str) -> Result<E> {
        let raw: Value = serde_json::from_str(json).map_err(Error::Decode)?;
        self.decode(raw)
    }
}

impl<E> fmt::Debug for VariantFamily<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantFamily")
            .field("name", &self.name)
            .field("generic_tag", &self.generic_tag)
            .field("variants", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Circle {
        radius: u32,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Square {
        side: u32,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct AnyShape {}

    #[derive(Debug, PartialEq)]
    enum Shape {
        Any,
        Circle(Circle),
        Square(Square),
    }

    impl From<AnyShape> for Shape {
        fn from(_: AnyShape) -> Self {
            Shape::Any
        }
    }

    impl From<Circle> for Shape {
        fn from(value: Circle) -> Self {
            Shape::Circle(value)
        }
    }

    impl From<Square> for Shape {
        fn from(value: Square) -> Self {
            Shape::Square(value)
        }
    }

    fn family() -> VariantFamily<Shape> {
        VariantFamily::new("shape", "shape", decode_as::<AnyShape, Shape>)
            .register("circle", decode_as::<Circle, Shape>)
            .register("square", decode_as::<Square, Shape>)
    }

    #[test]
    fn dispatches_on_meta_type() {
        let family = family();
        let circle = family.decode(json!({"meta":{"type":"circle"},"radius":2})).unwrap();
        assert_eq!(circle, Shape::Circle(Circle { radius: 2 }));
        let square = family.decode(json!({"meta":{"type":"square"},"side":3})).unwrap();
        assert_eq!(square, Shape::Square(Square { side: 3 }));
    }

    #[test]
    fn generic_tag_decodes_base_shape() {
        let any = family().decode(json!({"meta":{"type":"shape"}})).unwrap();
        assert_eq!(any, Shape::Any);
    }

    #[test]
    fn missing_meta_is_reported() {
        let err = family().decode(json!({"radius":2})).unwrap_err();
        assert!(matches!(err, Error::MissingDiscriminatorContext { family: "shape" }));

        let err = family().decode(json!({"meta":"circle"})).unwrap_err();
        assert!(matches!(err, Error::MissingDiscriminatorContext { .. }));
    }

    #[test]
    fn missing_type_is_reported() {
        let err = family().decode(json!({"meta":{"href":"x"}})).unwrap_err();
        assert!(matches!(err, Error::MissingDiscriminatorValue { family: "shape" }));

        let err = family().decode(json!({"meta":{"type":null}})).unwrap_err();
        assert!(matches!(err, Error::MissingDiscriminatorValue { .. }));
    }

    #[test]
    fn unknown_type_never_falls_back() {
        let err = family().decode(json!({"meta":{"type":"triangle"}})).unwrap_err();
        assert!(matches!(err, Error::UnknownVariant { ref value, .. } if value == "triangle"));
    }

    #[test]
    fn shape_errors_are_decode_errors() {
        let err = family().decode(json!({"meta":{"type":"circle"},"radius":"big"})).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn decoding_twice_gives_equal_values() {
        let family = family();
        let raw = json!({"meta":{"type":"circle"},"radius":7});
        assert_eq!(family.decode(raw.clone()).unwrap(), family.decode(raw).unwrap());
    }

    #[test]
    fn lists_registered_tags() {
        let family = family();
        assert_eq!(family.tags(), vec!["circle", "square"]);
        assert!(family.is_registered("shape"));
        assert!(!family.is_registered("triangle"));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let _ = family().register("circle", decode_as::<Circle, Shape>);
    }

    #[test]
    #[should_panic(expected = "generic tag")]
    fn registering_the_generic_tag_panics() {
        let _ = family().register("shape", decode_as::<AnyShape, Shape>);
    }
}
