//! The discount family: one concept, five wire shapes told apart by `meta.type`.

use std::any::Any;

use once_cell::sync::Lazy;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use super::{Meta, MetaEntity};
use crate::copy::{shape_mismatch, Entity};
use crate::decode::{decode_as, VariantFamily};
use crate::error::Result;

/// Fields shared by every discount, and the shape of the generic `discount` tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_products: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_agents: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulationLevel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

/// Накопительная скидка.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulationDiscount {
    #[serde(flatten)]
    pub discount: DiscountEntity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assortment: Vec<MetaEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_folders: Vec<MetaEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<AccumulationLevel>,
}

/// Бонусная программа.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusProgramDiscount {
    #[serde(flatten)]
    pub discount: DiscountEntity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earn_rate_roubles_to_point: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_rate_point_to_rouble: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_paid_rate_percents: Option<i32>,
}

/// Персональная скидка.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDiscount {
    #[serde(flatten)]
    pub discount: DiscountEntity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assortment: Vec<MetaEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_folders: Vec<MetaEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPrice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_type: Option<MetaEntity>,
}

/// Специальная цена.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPriceDiscount {
    #[serde(flatten)]
    pub discount: DiscountEntity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assortment: Vec<MetaEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_folders: Vec<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_price: Option<SpecialPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_price_type: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "discount")]
    pub discount_percent: Option<f64>,
}

crate::entity!(DiscountEntity, "discount");
crate::entity!(AccumulationDiscount, "accumulationdiscount", discount.meta);
crate::entity!(BonusProgramDiscount, "bonusprogram", discount.meta);
crate::entity!(PersonalDiscount, "personaldiscount", discount.meta);
crate::entity!(SpecialPriceDiscount, "specialpricediscount", discount.meta);

/// Any discount, decoded through [`DISCOUNTS`].
#[derive(Debug, Clone, PartialEq)]
pub enum Discount {
    Generic(DiscountEntity),
    Accumulation(AccumulationDiscount),
    BonusProgram(BonusProgramDiscount),
    Personal(PersonalDiscount),
    SpecialPrice(SpecialPriceDiscount),
}

/// The discount family. `discount` is the generic tag.
pub static DISCOUNTS: Lazy<VariantFamily<Discount>> = Lazy::new(|| {
    VariantFamily::new("discount", "discount", decode_as::<DiscountEntity, Discount>)
        .register("accumulationdiscount", decode_as::<AccumulationDiscount, Discount>)
        .register("bonusprogram", decode_as::<BonusProgramDiscount, Discount>)
        .register("personaldiscount", decode_as::<PersonalDiscount, Discount>)
        .register("specialpricediscount", decode_as::<SpecialPriceDiscount, Discount>)
});

impl Discount {
    /// The concrete shape behind the enum.
    pub fn as_entity(&self) -> &dyn Entity {
        match self {
            Discount::Generic(d) => d,
            Discount::Accumulation(d) => d,
            Discount::BonusProgram(d) => d,
            Discount::Personal(d) => d,
            Discount::SpecialPrice(d) => d,
        }
    }

    /// Fields common to every discount.
    pub fn base(&self) -> &DiscountEntity {
        match self {
            Discount::Generic(d) => d,
            Discount::Accumulation(d) => &d.discount,
            Discount::BonusProgram(d) => &d.discount,
            Discount::Personal(d) => &d.discount,
            Discount::SpecialPrice(d) => &d.discount,
        }
    }

    pub fn base_mut(&mut self) -> &mut DiscountEntity {
        match self {
            Discount::Generic(d) => d,
            Discount::Accumulation(d) => &mut d.discount,
            Discount::BonusProgram(d) => &mut d.discount,
            Discount::Personal(d) => &mut d.discount,
            Discount::SpecialPrice(d) => &mut d.discount,
        }
    }
}

impl From<DiscountEntity> for Discount {
    fn from(value: DiscountEntity) -> Self {
        Discount::Generic(value)
    }
}

impl From<AccumulationDiscount> for Discount {
    fn from(value: AccumulationDiscount) -> Self {
        Discount::Accumulation(value)
    }
}

impl From<BonusProgramDiscount> for Discount {
    fn from(value: BonusProgramDiscount) -> Self {
        Discount::BonusProgram(value)
    }
}

impl From<PersonalDiscount> for Discount {
    fn from(value: PersonalDiscount) -> Self {
        Discount::Personal(value)
    }
}

impl From<SpecialPriceDiscount> for Discount {
    fn from(value: SpecialPriceDiscount) -> Self {
        Discount::SpecialPrice(value)
    }
}

impl<'de> Deserialize<'de> for Discount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        DISCOUNTS.decode(raw).map_err(de::Error::custom)
    }
}

// Untagged on the way out: the tag already lives in `meta.type`.
impl Serialize for Discount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Discount::Generic(d) => d.serialize(serializer),
            Discount::Accumulation(d) => d.serialize(serializer),
            Discount::BonusProgram(d) => d.serialize(serializer),
            Discount::Personal(d) => d.serialize(serializer),
            Discount::SpecialPrice(d) => d.serialize(serializer),
        }
    }
}

impl Entity for Discount {
    fn shape(&self) -> &'static str {
        self.as_entity().shape()
    }

    fn meta(&self) -> Option<&Meta> {
        self.base().meta.as_ref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn boxed_copy(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }

    fn assign_from(&mut self, source: &dyn Entity) -> Result<()> {
        match source.as_any().downcast_ref::<Discount>() {
            Some(other) if other.shape() == self.shape() => {
                *self = other.clone();
                Ok(())
            }
            _ => Err(shape_mismatch(&*self, source)),
        }
    }
}
