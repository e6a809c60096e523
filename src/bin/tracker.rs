use dotenvy::dotenv;
use pushkind_pigeon::settings::TrackerSettings;
use pushkind_pigeon::tracker::run;

/// Entry point for the open tracking service.
#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let result = match TrackerSettings::load() {
        Ok(settings) => run(&settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
