use dotenv::dotenv;
use formulai::complete_from_env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "    @property\n    def Total(self) -> float:\n".to_string());

    let completion = complete_from_env(&prompt).await?;
    println!("{completion}");

    Ok(())
}
