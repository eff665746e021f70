use anyhow::{Context, Result};
use pantry_chef::api_connection::endpoints::Provider;
use pantry_chef::cli::parse_args;
use pantry_chef::pipeline::{generate_recipe, GenerationConfig};
use pantry_chef::prompt::RecipeRequest;

// Environment variable holding the OpenRouter API key
const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env for the API key

    let cli_args = parse_args();

    let request = RecipeRequest {
        ingredients: cli_args.ingredients,
        cuisine: cli_args.cuisine,
        dish_type: cli_args.dish_type,
        servings: cli_args.servings,
        avoid: cli_args.avoid,
        staples_allowed: !cli_args.no_staples,
    };
    let config = GenerationConfig {
        model: cli_args.model,
        temperature: cli_args.temperature,
        max_tokens: cli_args.max_tokens,
    };

    println!(
        "Generating a {} {} recipe for {} from: {}",
        request.cuisine,
        request.dish_type,
        request.servings,
        request.ingredients.join(", ")
    );

    let provider = Provider::openrouter(API_KEY_ENV_VAR);

    match generate_recipe(&provider, &request, &config, |message| {
        println!("{}", message);
    })
    .await
    {
        Ok(record) => {
            let rendered = serde_json::to_string_pretty(&record)
                .context("Failed to render the recipe record")?;
            println!("\n{}", rendered);
            Ok(())
        }
        Err(e) => {
            eprintln!("\nRecipe generation failed: {}", e);
            Err(anyhow::anyhow!("Recipe generation failed: {}", e))
        }
    }
}
