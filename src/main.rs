use log::*;
use service::{config::Config, logging::Logger, providers};
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Starting up OAuth bridge...");

    let providers = match providers::load_providers(config.providers_config()) {
        Ok(providers) => providers,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let app_state = match AppState::from_config(config, providers) {
        Ok(app_state) => app_state,
        Err(err) => {
            error!("Failed to initialize OAuth providers: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = web::init_server(app_state).await {
        error!("Server exited with error: {err}");
        std::process::exit(1);
    }
}
