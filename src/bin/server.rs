use trivia::{config, run, setup_store};

#[tokio::main]
async fn main() -> Result<(), trivia::handle_errors::Error> {
    dotenv::dotenv().ok();
    let config = config::Config::new().expect("Config can't be set");
    let store = setup_store(&config).await?;
    tracing::info!("Trivia service build ID {}", env!("TRIVIA_VERSION"));
    run(config, store).await;
    Ok(())
}
