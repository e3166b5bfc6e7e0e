use actix_web::{get, web, HttpResponse, Responder};

#[get("/")]
pub async fn handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Product Recommendation API is running"
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(handler);
}
