use clap::Parser;

use crate::api_connection::endpoints::DEFAULT_MODEL;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated list of available ingredients
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub ingredients: Vec<String>,

    /// Preferred cuisine
    #[arg(short, long, default_value = "any")]
    pub cuisine: String,

    /// Dish type: main, side, snack/salad, dressing, sauce, spice-blend
    #[arg(short, long, default_value = "main")]
    pub dish_type: String,

    /// Number of servings
    #[arg(short, long, default_value_t = 2)]
    pub servings: u32,

    /// Comma-separated ingredients to leave out (allergies, dislikes)
    #[arg(long, value_delimiter = ',')]
    pub avoid: Vec<String>,

    /// Do not assume pantry staples (salt, oil, water) are available
    #[arg(long)]
    pub no_staples: bool,

    /// Model identifier to request from the provider
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Maximum output length in tokens
    #[arg(long, default_value_t = 1600)]
    pub max_tokens: u32,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
