use users_service::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    tracing::info!(
        "Loaded configuration for {} ({})",
        config.service.name,
        config.service.environment
    );

    let state = AppState::connect(config.clone()).await?;
    let app = router(state.clone());

    let result = Server::new(config).serve(app).await;
    state.close().await;

    result
}
