use clap::Parser;
use docqa_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    docqa_cli::logging::init(cli.json);

    if let Err(e) = docqa_cli::commands::run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
