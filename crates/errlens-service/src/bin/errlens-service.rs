#[tokio::main]
async fn main() -> anyhow::Result<()> {
    errlens_service::http::run().await
}
