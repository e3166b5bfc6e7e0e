use actix_web::{get, post, web, HttpResponse};
use advisor_core::ProductQuery;
use serde::Deserialize;

use crate::error::Result;
use crate::services::recommendation_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub customer_id: String,
    pub products: Vec<ProductQuery>,
}

#[post("/products")]
pub async fn recommend_products(
    state: web::Data<AppState>,
    payload: web::Json<RecommendationRequest>,
) -> Result<HttpResponse> {
    let request = payload.into_inner();
    let recommendation =
        recommendation_service::recommend(&state, &request.customer_id, &request.products).await?;
    Ok(HttpResponse::Ok().json(recommendation))
}

#[get("/industries/{customer_id}")]
pub async fn list_industries(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let customer_id = path.into_inner();
    let industries = recommendation_service::list_industries(&state, &customer_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "customer_id": customer_id,
        "industries": industries,
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/recommend")
            .service(recommend_products)
            .service(list_industries),
    );
}
