#[tokio::main]
async fn main() -> std::io::Result<()> {
    obesity_calculator::run().await
}
