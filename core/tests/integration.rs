//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the endpoint clients
//! over real HTTP through `UreqTransport`. Validates that request building,
//! Basic auth, response classification and polymorphic decoding agree with
//! an actual server.

use std::net::SocketAddr;

use lognex_core::entities::{Country, Discount};
use lognex_core::{
    ApiClient, ApiConfig, DeleteByIdEndpoint, Entity, Error, GetByIdEndpoint, GetListEndpoint,
    ListParams, MetadataAttributeEndpoint, MetadataEndpoint, PostEndpoint, PutByIdEndpoint,
};
use mock_server::{ATTRIBUTE_ID, BONUS_PROGRAM_ID, LOGIN, PASSWORD};
use uuid::Uuid;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> ApiClient {
    ApiClient::new(ApiConfig::new(LOGIN, PASSWORD).with_host(format!("http://{addr}"))).unwrap()
}

#[test]
fn country_lifecycle() {
    let api = client(start_server());
    let countries = api.entity().country();

    // Step 1: seeded rows, paged.
    let page = countries.list(&ListParams::new().limit(2)).unwrap();
    assert_eq!(page.size(), Some(3));
    assert_eq!(page.len(), 2);
    assert_eq!(page.rows[0].name.as_deref(), Some("Россия"));

    // Step 2: create.
    let created = countries.post(&Country::named("Армения")).unwrap();
    let id = created.id.expect("server assigns an id");
    assert_eq!(created.name.as_deref(), Some("Армения"));
    assert!(created.updated.is_some());

    // Step 3: get by id.
    let fetched = countries.get(id, &[]).unwrap();
    assert_eq!(fetched, created);

    // Step 4: partial update.
    let patch = Country {
        description: Some("Закавказье".to_string()),
        ..Country::default()
    };
    let updated = countries.put(id, &patch).unwrap();
    assert_eq!(updated.name.as_deref(), Some("Армения"));
    assert_eq!(updated.description.as_deref(), Some("Закавказье"));

    // Step 5: delete answers 204 and decodes nothing.
    countries.delete(id).unwrap();

    // Step 6: gone.
    let err = countries.get(id, &[]).unwrap_err();
    assert_eq!(err.api_status(), Some(404));

    // Step 7: back to the seeded size.
    let page = countries.list(&ListParams::new()).unwrap();
    assert_eq!(page.size(), Some(3));
}

#[test]
fn missing_entity_yields_api_error_with_envelope() {
    let api = client(start_server());
    let err = api.entity().country().get(Uuid::nil(), &[]).unwrap_err();
    match err {
        Error::Api(failure) => {
            assert_eq!(failure.status, 404);
            assert_eq!(failure.response.errors.len(), 1);
            assert_eq!(failure.response.errors[0].code, Some(1021));
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[test]
fn rejected_create_reports_the_field() {
    let api = client(start_server());
    let err = api.entity().country().post(&Country::default()).unwrap_err();
    match err {
        Error::Api(failure) => {
            assert_eq!(failure.status, 412);
            assert_eq!(failure.response.errors[0].parameter.as_deref(), Some("name"));
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[test]
fn wrong_credentials_yield_401() {
    let addr = start_server();
    let api =
        ApiClient::new(ApiConfig::new(LOGIN, "wrong").with_host(format!("http://{addr}"))).unwrap();
    let err = api.entity().country().list(&ListParams::new()).unwrap_err();
    assert_eq!(err.api_status(), Some(401));
}

#[test]
fn discount_rows_decode_into_their_variants() {
    let api = client(start_server());
    let discounts = api.entity().discount().list(&ListParams::new()).unwrap();

    let shapes: Vec<&str> = discounts.iter().map(|d| d.as_entity().shape()).collect();
    assert_eq!(
        shapes,
        vec![
            "discount",
            "accumulationdiscount",
            "bonusprogram",
            "personaldiscount",
            "specialpricediscount"
        ]
    );

    match api.entity().discount().get(BONUS_PROGRAM_ID, &[]).unwrap() {
        Discount::BonusProgram(bonus) => {
            assert_eq!(bonus.max_paid_rate_percents, Some(50));
            assert_eq!(bonus.discount.name.as_deref(), Some("Бонусная программа"));
        }
        other => panic!("expected a bonus program, got {other:?}"),
    }
}

#[test]
fn expanded_reference_is_embedded() {
    let api = client(start_server());
    let contracts = api
        .entity()
        .contract()
        .list(&ListParams::new().expand("ownAgent"))
        .unwrap();
    let own_agent = contracts.rows[0].own_agent.as_ref().unwrap();
    assert_eq!(own_agent.inn.as_deref(), Some("7736570901"));

    let plain = api.entity().contract().list(&ListParams::new()).unwrap();
    assert_eq!(plain.rows[0].own_agent.as_ref().unwrap().inn, None);
}

#[test]
fn too_deep_expand_fails_before_sending() {
    let api = client(start_server());
    let err = api
        .path("/entity/contract/")
        .expand(["owner.group.id", "owner.group.id.extra"])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidExpandPath { depth: 4, .. }));

    assert!(api
        .path("/entity/contract/")
        .expand(["owner.group.id"])
        .is_ok());
}

#[test]
fn contract_metadata() {
    let api = client(start_server());
    let contracts = api.entity().contract();

    let metadata = contracts.metadata().unwrap();
    assert_eq!(metadata.create_shared, Some(false));
    assert_eq!(metadata.attributes[0].id, Some(ATTRIBUTE_ID));

    let attribute = contracts.metadata_attribute(ATTRIBUTE_ID).unwrap();
    assert_eq!(attribute.attribute_type.as_deref(), Some("string"));

    let err = contracts.metadata_attribute(Uuid::nil()).unwrap_err();
    assert_eq!(err.api_status(), Some(404));
}

#[test]
fn customer_order_states_come_with_metadata() {
    let api = client(start_server());
    let metadata = api.entity().customer_order().metadata().unwrap();
    assert_eq!(metadata.states[0].name.as_deref(), Some("Новый"));
    assert!(api
        .entity()
        .customer_order()
        .list(&ListParams::new())
        .unwrap()
        .is_empty());
}

#[test]
fn closed_port_is_a_network_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let api = client(addr);
    let err = api.entity().retail_shift().list(&ListParams::new()).unwrap_err();
    assert!(err.is_network(), "expected a network error, got {err:?}");
}
