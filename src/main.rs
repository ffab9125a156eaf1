#[tokio::main]
async fn main() {
    if let Err(err) = scheduling_backend::run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
}
