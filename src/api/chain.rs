use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info};

use super::models::{AppState, ChainResponse, MineResponse, ValidateResponse};
use crate::blockchain::DIFFICULTY;

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.ledger.blocks();
    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        difficulty: DIFFICULTY,
        chain,
    })
}

/// Validate the whole chain (linkage + hashes).
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ValidateResponse {
        valid: state.ledger.is_valid(),
        length: state.ledger.chain_len(),
    })
}

/// Run one mining tick now instead of waiting for the timer.
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    let miner = state.miner.clone();
    match web::block(move || miner.tick()).await {
        Ok(Some(report)) => {
            info!(
                "POST /mine/ - block #{} (hash={}, applied {})",
                report.index, report.hash, report.applied
            );
            HttpResponse::Ok().json(MineResponse {
                mined: true,
                report: Some(report),
            })
        }
        Ok(None) => HttpResponse::Ok().json(MineResponse {
            mined: false,
            report: None,
        }),
        Err(e) => {
            error!("POST /mine/ - mining task failed: {e}");
            HttpResponse::InternalServerError().body("mining task failed")
        }
    }
}
