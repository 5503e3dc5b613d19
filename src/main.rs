#[tokio::main]
async fn main() {
    if let Err(e) = medportal::run().await {
        tracing::error!("{e}");
        eprintln!("medportal: {e}");
        std::process::exit(1);
    }
}
