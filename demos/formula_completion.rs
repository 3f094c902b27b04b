use dotenv::dotenv;
use formulai::prompt::{ColumnSchema, ColumnType, TableSchema, convert_completion, formula_prompt};
use formulai::{CompletionClient, CompletionConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let orders = TableSchema {
        table_id: "Orders".to_string(),
        columns: vec![
            ColumnSchema {
                col_id: "Quantity".to_string(),
                column_type: ColumnType::Int,
            },
            ColumnSchema {
                col_id: "Unit_Price".to_string(),
                column_type: ColumnType::Numeric,
            },
            ColumnSchema {
                col_id: "Total".to_string(),
                column_type: ColumnType::Numeric,
            },
        ],
    };

    let prompt = formula_prompt(&[], &orders, "Total", "Quantity times unit price.")?;
    println!("Prompt:\n{prompt}");

    let client = CompletionClient::new(CompletionConfig::from_env());
    let completion = client.complete(&prompt).await?;
    println!("Formula body:\n{}", convert_completion(&completion));

    Ok(())
}
