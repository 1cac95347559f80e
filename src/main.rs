#[tokio::main]
async fn main() {
    if let Err(e) = teafarm::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
