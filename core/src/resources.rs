//! Endpoint clients of the `/entity` resources.
//!
//! Each client is a path plus the capabilities it implements; all request
//! mechanics come from the traits in [`crate::endpoints`].

use crate::client::ApiClient;
use crate::endpoints::{
    DeleteByIdEndpoint, Endpoint, EntityEndpoint, GetByIdEndpoint, GetListEndpoint,
    MetadataAttributeEndpoint, MetadataEndpoint, PostEndpoint, PutByIdEndpoint,
};
use crate::entities::{Contract, Country, CustomerOrder, Discount, RetailShift};
use crate::responses::MetadataAttributeSharedStatesResponse;

macro_rules! entity_client {
    (
        $(#[$attr:meta])*
        $name:ident, $path:literal, $entity:ty
        $(, expand = [$($root:literal),* $(,)?])?
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a> {
            api: &'a ApiClient,
        }

        impl<'a> $name<'a> {
            pub fn new(api: &'a ApiClient) -> Self {
                Self { api }
            }
        }

        impl Endpoint for $name<'_> {
            fn api(&self) -> &ApiClient {
                self.api
            }

            fn path(&self) -> &'static str {
                $path
            }
        }

        impl EntityEndpoint for $name<'_> {
            type Entity = $entity;

            fn expandable(&self) -> &'static [&'static str] {
                &[$($($root),*)?]
            }
        }
    };
}

entity_client!(
    /// Договоры.
    ContractClient, "/entity/contract/", Contract,
    expand = ["owner", "group", "ownAgent", "agent", "state", "organizationAccount", "agentAccount", "rate"]
);

impl GetListEndpoint for ContractClient<'_> {}
impl PostEndpoint for ContractClient<'_> {}
impl MetadataEndpoint for ContractClient<'_> {
    type Metadata = MetadataAttributeSharedStatesResponse;
}
impl MetadataAttributeEndpoint for ContractClient<'_> {}

entity_client!(
    /// Страны.
    CountryClient, "/entity/country/", Country
);

impl GetListEndpoint for CountryClient<'_> {}
impl PostEndpoint for CountryClient<'_> {}
impl GetByIdEndpoint for CountryClient<'_> {}
impl PutByIdEndpoint for CountryClient<'_> {}
impl DeleteByIdEndpoint for CountryClient<'_> {}

entity_client!(
    /// Розничные смены.
    RetailShiftClient, "/entity/retailshift/", RetailShift
);

impl GetListEndpoint for RetailShiftClient<'_> {}
impl DeleteByIdEndpoint for RetailShiftClient<'_> {}
impl MetadataEndpoint for RetailShiftClient<'_> {
    type Metadata = MetadataAttributeSharedStatesResponse;
}
impl MetadataAttributeEndpoint for RetailShiftClient<'_> {}

entity_client!(
    /// Заказы покупателей.
    CustomerOrderClient, "/entity/customerorder/", CustomerOrder,
    expand = ["owner", "group", "organization", "agent", "contract", "state", "store", "positions"]
);

impl GetListEndpoint for CustomerOrderClient<'_> {}
impl PostEndpoint for CustomerOrderClient<'_> {}
impl MetadataEndpoint for CustomerOrderClient<'_> {
    type Metadata = MetadataAttributeSharedStatesResponse;
}
impl MetadataAttributeEndpoint for CustomerOrderClient<'_> {}

entity_client!(
    /// Скидки; rows decode into whichever discount shape `meta.type` names.
    DiscountClient, "/entity/discount/", Discount
);

impl GetListEndpoint for DiscountClient<'_> {}
impl GetByIdEndpoint for DiscountClient<'_> {}

/// Navigation from the client to its resources: `api.entity().contract()`.
#[derive(Debug, Clone, Copy)]
pub struct EntityClients<'a> {
    api: &'a ApiClient,
}

impl<'a> EntityClients<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn contract(&self) -> ContractClient<'a> {
        ContractClient::new(self.api)
    }

    pub fn country(&self) -> CountryClient<'a> {
        CountryClient::new(self.api)
    }

    pub fn retail_shift(&self) -> RetailShiftClient<'a> {
        RetailShiftClient::new(self.api)
    }

    pub fn customer_order(&self) -> CustomerOrderClient<'a> {
        CustomerOrderClient::new(self.api)
    }

    pub fn discount(&self) -> DiscountClient<'a> {
        DiscountClient::new(self.api)
    }
}
