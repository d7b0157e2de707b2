use allersafe_mealplan::{
    Command, Generate, GenerationError, RegenerateMode, SqliteCatalog, SqliteHistory,
    SqlitePlanWriter,
};
use allersafe_shared::mealplan::MealType;
use allersafe_shared::recipe::CuisineType;
use clap::Args;
use time::Date;
use time::macros::format_description;
use tokio_util::sync::CancellationToken;

fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[derive(Args)]
pub struct GenerateArgs {
    /// User the plan is generated for
    #[arg(long)]
    user: String,

    /// Meal plan id, a new plan is created when omitted
    #[arg(long)]
    plan: Option<String>,

    /// First day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    start: Date,

    /// Last day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    end: Date,

    /// Meal slot to fill, repeatable
    #[arg(long = "slot", required = true)]
    slots: Vec<MealType>,

    #[arg(long)]
    cuisine: Option<CuisineType>,

    #[arg(long)]
    max_prep_time: Option<u16>,

    #[arg(long)]
    max_cook_time: Option<u16>,

    #[arg(long)]
    servings: Option<u16>,

    #[arg(long)]
    target_calories: Option<u16>,

    /// Allergen to avoid for this plan only, repeatable
    #[arg(long = "exclude-allergen")]
    exclude_allergens: Vec<String>,

    /// Replace planned slots instead of only filling empty ones
    #[arg(long)]
    replace: bool,

    /// Reference day for history (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    today: Option<Date>,
}

impl From<GenerateArgs> for Generate {
    fn from(args: GenerateArgs) -> Self {
        Generate {
            user_id: args.user,
            meal_plan_id: args.plan.unwrap_or_else(allersafe_shared::new_id),
            start: args.start,
            end: args.end,
            slots: args.slots,
            cuisine_type: args.cuisine,
            max_prep_time: args.max_prep_time,
            max_cook_time: args.max_cook_time,
            servings: args.servings,
            target_calories: args.target_calories,
            exclude_allergens: args.exclude_allergens,
            mode: if args.replace {
                RegenerateMode::Replace
            } else {
                RegenerateMode::FillGaps
            },
            today: args.today,
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn run(config: allersafe::Config, args: GenerateArgs) -> anyhow::Result<()> {
    let pool = allersafe::create_pool(&config.database.url, config.database.max_connections).await?;

    let command = Command::new(
        SqliteCatalog(pool.clone()),
        SqliteHistory(pool.clone()),
        SqlitePlanWriter(pool.clone()),
        config.generation.clone(),
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling generation");
            on_interrupt.cancel();
        }
    });

    let result = command.generate(args.into(), &cancel).await;
    pool.close().await;

    match result {
        Ok(generated) => {
            println!("{}", serde_json::to_string_pretty(&generated)?);

            Ok(())
        }
        Err(GenerationError::NoCandidatesAtAll { unfilled }) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "unfilled": &unfilled }))?
            );

            Err(GenerationError::NoCandidatesAtAll { unfilled }.into())
        }
        Err(err) => Err(err.into()),
    }
}
