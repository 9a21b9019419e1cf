use clap::Parser;
use ytmcp::config::Config;
use ytmcp::services::logger::init_tracing;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(&config.log_level);
    if let Err(err) = ytmcp::server::run(config).await {
        eprintln!("ytmcp: {}", err);
        std::process::exit(1);
    }
}
