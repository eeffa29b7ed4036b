use clap::Parser;

#[tokio::main]
async fn main() {
    // Initialize logging (file JSON layer + quiet stderr layer)
    let _log_guard = bringr::core::logging::init();
    log::debug!("bringr v{} starting", bringr::VERSION);

    let cli = bringr::cli::Cli::parse();
    let code = bringr::cli::run(cli).await;
    if code != 0 {
        std::process::exit(code);
    }
}
