use std::sync::Arc;

use axum::{routing::any, routing::get, routing::post, Extension, Router};
use clap::Parser;

use qr_campus::config::Config;
use qr_campus::err;
use qr_campus::io::ScanStore;
use qr_campus::scan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();

    let store = ScanStore::new(config.data_dir.clone());
    store.prepare().await?;

    let addr = config.addr;
    let app = Router::new()
        .route("/qr/student", post(scan::encode_student))
        .route("/qr/course", post(scan::encode_course))
        .route("/qr/decode", post(scan::decode_scan))
        .route("/qr/session", post(scan::decode_session))
        .route(
            "/scans",
            get(scan::list_scans)
                .post(scan::record_scan)
                .delete(scan::sync_scans),
        )
        .route("/scans/last-sync", get(scan::last_sync))
        .fallback(any(err::handler404))
        .layer(Extension(store))
        .layer(Extension(Arc::new(config)));

    log::info!("Starting QR Campus scan desk on http://{}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
