mod api;
mod blockchain;
mod config;
mod error;
mod transaction;
mod wallet;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{info, warn};
use std::sync::Arc;

use api::AppState;
use blockchain::Ledger;
use config::Config;
use wallet::Wallet;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();

    let miner_address = match &config.miner_address {
        Some(addr) => addr.clone(),
        None => {
            let wallet = Wallet::generate();
            warn!(
                "MINER_ADDRESS not set; rewards go to ephemeral address {}",
                wallet.address()
            );
            wallet.address().to_string()
        }
    };

    let ledger = Arc::new(Ledger::new());
    let state = web::Data::new(AppState::new(ledger, &miner_address, &config));
    let mining = state.miner.clone().spawn(config.mining_interval);

    println!(
        "⛓️ Starting ledger API at http://{}:{} (miner {}, block every {}s)",
        config.host,
        config.port,
        miner_address,
        config.mining_interval.as_secs()
    );

    let server_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    info!("HTTP server stopped; shutting down miner");
    mining.shutdown().await;
    result
}
