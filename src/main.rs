use pier::config::{self, Config, Invocation};
use pier::server;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let argv0 = std::env::args().next().unwrap_or_else(|| "pier".to_string());

    let cfg = match Config::load() {
        Ok(Invocation::Serve(cfg)) => cfg,
        Ok(Invocation::Help) => {
            print!("{}", config::usage(&argv0));
            return Ok(());
        }
        Err(e) => {
            eprintln!("error: {e:#}\n");
            eprint!("{}", config::usage(&argv0));
            std::process::exit(2);
        }
    };

    server::listener::run(&cfg).await
}
