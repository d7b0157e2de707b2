use allersafe_mealplan::Dataset;

#[tracing::instrument(skip(config))]
pub async fn run(config: allersafe::Config, file: String) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(&file).await?;
    let dataset: Dataset = serde_json::from_str(&content)?;

    let pool = allersafe::create_pool(&config.database.url, 1).await?;
    allersafe::migrate(&pool).await?;
    allersafe_mealplan::seed(&pool, &dataset).await?;
    pool.close().await;

    tracing::info!("{file} loaded");

    Ok(())
}
