#[tokio::main]
async fn main() -> anyhow::Result<()> {
    walletd_observability::init();

    let app = walletd_api::app::build_app();

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
