use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::codec::DEFAULT_EXPIRY_MINUTES;

#[derive(Debug, Parser, Clone)]
#[clap(name = "qr-campus", about = "Campus attendance QR scan desk")]
pub struct Config {
    #[clap(long, env = "QR_CAMPUS_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Where pending scans and the last sync time are kept.
    #[clap(long, env = "QR_CAMPUS_DATA_DIR", default_value = "campus")]
    pub data_dir: PathBuf,

    /// Validity window of time-boxed codes.
    #[clap(long, env = "QR_CAMPUS_EXPIRY_MINUTES", default_value_t = DEFAULT_EXPIRY_MINUTES)]
    pub expiry_minutes: i64,
}
