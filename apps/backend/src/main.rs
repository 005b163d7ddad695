#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crispy_crush_backend::run().await
}
