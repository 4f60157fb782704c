#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chapterhub::bootstrapper::run().await
}
