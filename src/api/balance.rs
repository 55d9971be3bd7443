use actix_web::{HttpResponse, Responder, get, web};

use super::models::AppState;

/// Settled balance, nonces and resource credits of an address.
#[get("/balance/{address}/")]
pub async fn get_balance(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let address = path.into_inner().0;
    HttpResponse::Ok().json(state.ledger.account(&address))
}
