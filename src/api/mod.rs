mod balance;
mod chain;
pub mod error;
mod health;
pub mod models;
mod stats;
mod tx;
mod wallet;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::mine_block)
            .service(tx::post_transaction)
            .service(tx::sign_transaction)
            .service(tx::get_mempool)
            .service(tx::post_faucet)
            .service(balance::get_balance)
            .service(stats::get_stats)
            .service(wallet::create_wallet),
    );
}
