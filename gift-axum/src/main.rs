use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let app = gift_axum::build()?;
    let addr = gift_axum::http_config().addr();

    println!("[gift] listening on http://{addr}");

    app.listen(addr).await?;

    Ok(())
}
