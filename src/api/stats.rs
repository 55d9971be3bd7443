use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(StatsResponse {
        ledger: state.ledger.stats(),
        mining_interval_secs: state.mining_interval.as_secs(),
        miner_address: state.miner.address().to_string(),
    })
}
