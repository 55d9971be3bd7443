use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};
use std::time::Instant;

use super::error::{disabled, malformed};
use super::models::{
    AppState, FaucetRequest, FaucetResponse, MempoolEntry, MempoolResponse, NewTxResponse,
    SignTxRequest,
};
use crate::error::LedgerError;
use crate::transaction::Transaction;
use crate::wallet::Wallet;

/// Admission endpoint: one signed transaction per call.
#[post("/tx/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<Transaction>,
) -> Result<HttpResponse, LedgerError> {
    let t0 = Instant::now();
    let tx = body.into_inner();
    debug!(
        "POST /tx/ - received: from={} to={} nonce={}",
        tx.from, tx.to, tx.nonce
    );

    if let Err(msg) = tx.check_shape() {
        warn!("POST /tx/ - rejected: {msg}");
        return Ok(malformed(msg));
    }

    let txid = tx.txid();
    let pool_size = state.ledger.admit_to_pool(tx)?;
    info!(
        "POST /tx/ - txid={} OK ({} ms)",
        txid,
        t0.elapsed().as_millis()
    );

    Ok(HttpResponse::Ok().json(NewTxResponse {
        accepted: true,
        txid,
        pool_size,
    }))
}

/// List the current pool in admission order.
#[get("/mempool/")]
pub async fn get_mempool(state: web::Data<AppState>) -> impl Responder {
    let pool = state.ledger.pool();
    let transactions = pool
        .iter()
        .map(|p| MempoolEntry {
            txid: p.tx.txid(),
            from: p.tx.from.clone(),
            to: p.tx.to.clone(),
            amount: p.tx.amount,
            nonce: p.tx.nonce,
            fee: p.cost.currency_total(),
            credits_spent: p.cost.credits_spent,
        })
        .collect::<Vec<_>>();
    HttpResponse::Ok().json(MempoolResponse {
        size: transactions.len(),
        transactions,
    })
}

/// DEV helper: sign a transaction server-side with the caller's secret key.
#[post("/tx/sign/")]
pub async fn sign_transaction(body: web::Json<SignTxRequest>) -> impl Responder {
    let req = body.into_inner();
    let wallet = match Wallet::from_secret_hex(&req.private_key) {
        Ok(w) => w,
        Err(msg) => return malformed(msg),
    };

    let mut tx = Transaction::new(wallet.address().to_string(), req.to, req.amount, req.nonce);
    tx.extra_priority = req.extra_priority;
    tx.is_token_transfer = req.is_token_transfer;
    tx.token_id = req.token_id;
    if let Err(msg) = tx.check_shape() {
        return malformed(msg);
    }

    wallet.sign(&mut tx);
    HttpResponse::Ok().json(tx)
}

/// DEV faucet: credit an address directly.
#[post("/faucet/")]
pub async fn post_faucet(
    state: web::Data<AppState>,
    body: web::Json<FaucetRequest>,
) -> impl Responder {
    if !state.faucet_enabled {
        return disabled("faucet_disabled", "faucet is disabled");
    }
    if body.amount.is_zero() {
        return malformed("amount must be > 0");
    }
    if body.address.trim().is_empty() {
        return malformed("address is required");
    }

    let balance = state.ledger.fund(&body.address, body.amount);
    debug!(
        "FAUCET - credited {} to {}; balance now {}",
        body.amount, body.address, balance
    );

    HttpResponse::Ok().json(FaucetResponse {
        address: body.address.clone(),
        balance,
    })
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::json;
    use std::sync::Arc;

    use crate::api::init_routes;
    use crate::api::models::{AppState, ErrorResponse, FaucetResponse, NewTxResponse};
    use crate::blockchain::Ledger;
    use crate::config::Config;
    use crate::transaction::{Amount, Transaction};
    use crate::wallet::Wallet;

    fn state(faucet_enabled: bool) -> web::Data<AppState> {
        let mut config = Config::from_lookup(|_| None);
        config.faucet_enabled = faucet_enabled;
        web::Data::new(AppState::new(Arc::new(Ledger::new()), "miner", &config))
    }

    #[actix_web::test]
    async fn accepts_signed_transaction() {
        let data = state(true);
        let app = test::init_service(App::new().app_data(data.clone()).configure(init_routes)).await;

        let sender = Wallet::generate();
        data.ledger.fund(sender.address(), Amount::from_coins(100));
        let tx = sender.create_transaction("recipient", Amount::from_coins(50), 0);

        let req = test::TestRequest::post().uri("/api/v1/tx/").set_json(&tx).to_request();
        let resp: NewTxResponse = test::call_and_read_body_json(&app, req).await;
        assert!(resp.accepted);
        assert_eq!(resp.pool_size, 1);
        assert_eq!(data.ledger.account(sender.address()).nonce, 1);
    }

    #[actix_web::test]
    async fn business_rule_rejection_is_422_with_kind() {
        let data = state(true);
        let app = test::init_service(App::new().app_data(data.clone()).configure(init_routes)).await;

        let sender = Wallet::generate();
        let mut tx = sender.create_transaction("recipient", Amount::from_coins(1), 0);
        tx.amount = Amount::from_coins(2);

        let req = test::TestRequest::post().uri("/api/v1/tx/").set_json(&tx).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "invalid_signature");
    }

    #[actix_web::test]
    async fn malformed_body_is_400() {
        let app = test::init_service(App::new().app_data(state(true)).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/tx/")
            .set_json(json!({ "from": "a", "amount": "not-a-number" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "malformed_request");

        let mut tx = Transaction::new("a".into(), "b".into(), Amount::ZERO, 0);
        tx.is_token_transfer = true;
        let req = test::TestRequest::post().uri("/api/v1/tx/").set_json(&tx).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn sign_helper_output_is_admissible() {
        let data = state(true);
        let app = test::init_service(App::new().app_data(data.clone()).configure(init_routes)).await;

        let sender = Wallet::generate();
        data.ledger.fund(sender.address(), Amount::from_coins(5));

        let req = test::TestRequest::post()
            .uri("/api/v1/tx/sign/")
            .set_json(json!({
                "private_key": sender.secret_hex(),
                "to": "recipient",
                "amount": "1.5",
                "nonce": 0,
                "extra_priority": 2
            }))
            .to_request();
        let tx: Transaction = test::call_and_read_body_json(&app, req).await;
        assert_eq!(tx.from, sender.address());
        assert!(tx.verify());

        let req = test::TestRequest::post().uri("/api/v1/tx/").set_json(&tx).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn faucet_respects_switch() {
        let app = test::init_service(App::new().app_data(state(true)).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/faucet/")
            .set_json(json!({ "address": "abc", "amount": 3 }))
            .to_request();
        let resp: FaucetResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.balance, Amount::from_coins(3));

        let app = test::init_service(App::new().app_data(state(false)).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/faucet/")
            .set_json(json!({ "address": "abc", "amount": 3 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "faucet_disabled");
    }
}
