use actix_web::{HttpResponse, Responder, post};
use serde::Serialize;

use crate::wallet::Wallet;

#[derive(Serialize)]
struct NewWalletResponse {
    private_key: String,
    public_key: String,
    address: String,
}

/// DEV helper: keys are generated server-side and returned in clear.
#[post("/wallet/new/")]
pub async fn create_wallet() -> impl Responder {
    let wallet = Wallet::generate();
    HttpResponse::Ok().json(NewWalletResponse {
        private_key: wallet.secret_hex(),
        public_key: wallet.public_key_hex(),
        address: wallet.address().to_string(),
    })
}
