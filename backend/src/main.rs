mod clients;
mod config;
mod job_controller;
mod services;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use env_logger::Env;
use log::info;
use tokio::sync::mpsc;

use crate::clients::storage::{BlobStore, FsBlobStore};
use crate::clients::tracking::{HttpTrackingClient, TrackingClient};
use crate::config::Config;
use crate::job_controller::cache::MokaJobCache;
use crate::job_controller::state::{JobsState, start_job_updater};
use crate::job_controller::store::JobStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();

    // Initialize the job controller state.
    let cache = Arc::new(MokaJobCache::new(config.job_capacity, config.job_ttl));
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState {
        store: JobStore::new(cache),
        tx,
    };

    // Start the job updater task.
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    let tracking: Arc<dyn TrackingClient> =
        Arc::new(HttpTrackingClient::new(&config.tracking_base_url));
    let storage: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(config.storage_root.clone()));
    let tracking_data = web::Data::from(tracking);
    let storage_data = web::Data::from(storage);

    info!("Server running at http://{}:{}", config.host, config.port);

    let bind_address = (config.host.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(1024 * 1024)) // 1 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(tracking_data.clone())
            .app_data(storage_data.clone())
            .service(services::jobs::configure_routes())
            .service(services::reports::configure_routes())
            .service(services::holds::configure_routes())
    })
    .bind(bind_address)?
    .run()
    .await
}
