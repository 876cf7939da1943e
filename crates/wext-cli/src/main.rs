#[tokio::main]
async fn main() {
    wext_cli::init_tracing();
    if let Err(err) = wext_cli::run_from_env().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
