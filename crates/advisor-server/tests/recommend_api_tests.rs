mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use advisor_core::catalog::DEFAULT_RECOMMENDATION_PROMPT;
use advisor_server::config::Settings;
use advisor_server::app_config;
use advisor_storage::{BlobStore, ObjectBlobStore};
use bytes::Bytes;
use serde_json::{json, Value};

use common::{state_with, FakeCompletion};

async fn seeded_storage() -> Arc<ObjectBlobStore> {
    let storage = Arc::new(ObjectBlobStore::in_memory());
    let files = [
        ("acme/base_products.csv", "name,price\nWidget,10\nGadget,20\n"),
        ("acme/retail_variants.csv", "name,shelf\nWidget retail,A1\n"),
        ("acme/health_variants.csv", "name,certified\nGadget med,yes\n"),
        ("acme/notes.txt", "not a catalogue"),
    ];
    for (key, data) in files {
        storage.put(key, Bytes::from(data)).await.unwrap();
    }
    storage
}

#[actix_web::test]
async fn test_recommend_products_parses_json_answer() {
    let storage = seeded_storage().await;
    let completion = FakeCompletion::replying(r#"{"recommendations": [{"product": "Widget"}]}"#);
    let state = web::Data::new(state_with(Settings::default(), completion.clone(), storage));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/recommend/products")
        .set_json(json!({
            "customer_id": "acme",
            "products": [
                {"productName": "Widget", "industry": "Retail"},
                {"productName": "Sprocket", "industry": "Health"}
            ]
        }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        resp,
        json!({
            "message": "Processed successfully",
            "availableIndustries": ["Health", "Retail"],
            "matchedProducts": 1,
            "gptResponse": {"recommendations": [{"product": "Widget"}]}
        })
    );

    let requests = completion.requests();
    let (turns, options) = &requests[0];
    assert_eq!(options.temperature, Some(0.4));
    assert_eq!(
        turns[0].content,
        format!(
            "{}\n\nData:\n\nProduct: Widget\nIndustry: Retail\n\nBase:\n- name: Widget\n- price: 10\n\nIndustry Variant:\n- name: Widget retail\n- shelf: A1\n",
            DEFAULT_RECOMMENDATION_PROMPT.trim()
        )
    );
}

#[actix_web::test]
async fn test_recommend_uses_customer_prompt_and_text_answer() {
    let storage = seeded_storage().await;
    storage
        .put("acme/prompt.txt", Bytes::from("  Suggest bundles.\n"))
        .await
        .unwrap();
    let completion = FakeCompletion::replying("Bundle the widget with shelving.");
    let state = web::Data::new(state_with(Settings::default(), completion.clone(), storage));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/recommend/products")
        .set_json(json!({
            "customer_id": "acme",
            "products": [{"productName": "gadget", "industry": "health"}]
        }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["gptResponse"], "Bundle the widget with shelving.");
    assert!(completion.last_turns()[0]
        .content
        .starts_with("Suggest bundles.\n\nData:\n"));
}

#[actix_web::test]
async fn test_recommend_reports_missing_industries() {
    let storage = seeded_storage().await;
    let state = web::Data::new(state_with(
        Settings::default(),
        FakeCompletion::replying("unused"),
        storage,
    ));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/recommend/products")
        .set_json(json!({
            "customer_id": "acme",
            "products": [{"productName": "Widget", "industry": "Energy"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"]["message"],
        "Some requested industries are not available: Energy. Available industries: Health, Retail"
    );
}

#[actix_web::test]
async fn test_recommend_without_matches_is_400() {
    let storage = seeded_storage().await;
    let completion = FakeCompletion::replying("unused");
    let state = web::Data::new(state_with(Settings::default(), completion.clone(), storage));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/recommend/products")
        .set_json(json!({
            "customer_id": "acme",
            "products": [{"productName": "Sprocket", "industry": "Retail"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(completion.requests().is_empty());
}

#[actix_web::test]
async fn test_recommend_validates_product_count() {
    let storage = seeded_storage().await;
    let state = web::Data::new(state_with(
        Settings::default(),
        FakeCompletion::replying("unused"),
        storage,
    ));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/recommend/products")
        .set_json(json!({"customer_id": "acme", "products": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let products: Vec<Value> = (0..51)
        .map(|i| json!({"productName": format!("P{i}"), "industry": "Retail"}))
        .collect();
    let req = test::TestRequest::post()
        .uri("/recommend/products")
        .set_json(json!({"customer_id": "acme", "products": products}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_recommend_unknown_customer_is_404() {
    let state = web::Data::new(state_with(
        Settings::default(),
        FakeCompletion::replying("unused"),
        Arc::new(ObjectBlobStore::in_memory()),
    ));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/recommend/products")
        .set_json(json!({
            "customer_id": "ghost",
            "products": [{"productName": "Widget", "industry": "Retail"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "No files found for customer_id: ghost");
}

#[actix_web::test]
async fn test_list_industries() {
    let storage = seeded_storage().await;
    storage
        .put("plain/notes.txt", Bytes::from("x"))
        .await
        .unwrap();
    let state = web::Data::new(state_with(
        Settings::default(),
        FakeCompletion::replying(""),
        storage,
    ));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::get()
        .uri("/recommend/industries/acme")
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        resp,
        json!({"customer_id": "acme", "industries": ["Health", "Retail"]})
    );

    let req = test::TestRequest::get()
        .uri("/recommend/industries/plain")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "No CSV files found for customer_id: plain");
}
