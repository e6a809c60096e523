use dotenvy::dotenv;
use pushkind_pigeon::send_campaign::run;
use pushkind_pigeon::settings::CampaignSettings;

/// Entry point for the campaign sender.
#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // mail-send and rustls may both enable a crypto backend; pin one.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let result = match CampaignSettings::load() {
        Ok(settings) => run(&settings).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => println!("\n{report}"),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
