use rampway::api::PlaceAPI;
use rampway::config::Config;
use rampway::engine::Engine;
use rampway::error::Error;
use rampway::server::serve;
use rampway::store;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let store = store::connect(&config).await?;

    let engine = Engine::new(store);
    engine.load_places().await;

    serve(engine, config.addr).await
}
