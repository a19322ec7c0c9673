use masoi::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), MasoiError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env();
    tracing::info!(bind = %config.bind_addr, "starting Ma Sói server");

    let server = MasoiServer::builder().config(config).build().await?;
    server.run().await
}
