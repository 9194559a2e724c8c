use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = passthru::cli::Cli::parse();
    if let Err(e) = passthru::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
