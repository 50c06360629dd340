use clap::Parser;
use kvfix_cli::{exit_code, load_settings, logging, run, Cli, EXIT_OK};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            let err = anyhow::Error::new(e);
            eprintln!("error: {err:#}");
            eprintln!("usage: kvfix <NAMESPACE_ID> [PREFIX] [--dry-run]");
            std::process::exit(exit_code(&err));
        }
    };

    match run(&settings).await {
        Ok(_) => std::process::exit(EXIT_OK),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(exit_code(&e));
        }
    }
}
