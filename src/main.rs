#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = gradecraft_rust::run().await {
        eprintln!("gradecraft-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
