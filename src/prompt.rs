use crate::api_connection::endpoints::ChatMessage;

/// What the user has on hand and how they want to cook, gathered by the CLI
/// (or any other front-end) before a generation run.
#[derive(Debug, Clone)]
pub struct RecipeRequest {
    pub ingredients: Vec<String>,
    pub cuisine: String,
    pub dish_type: String,
    pub servings: u32,
    /// Ingredients the user wants left out (allergies, dislikes).
    pub avoid: Vec<String>,
    /// Whether pantry staples (salt, oil, water...) may be assumed present.
    pub staples_allowed: bool,
}

impl RecipeRequest {
    pub fn new(ingredients: Vec<String>, cuisine: &str) -> Self {
        Self {
            ingredients,
            cuisine: cuisine.to_string(),
            dish_type: "main".to_string(),
            servings: 2,
            avoid: Vec::new(),
            staples_allowed: true,
        }
    }
}

/// Appended to the system message for the single repair attempt: same
/// content, stricter envelope.
pub const REPAIR_DIRECTIVE: &str = "\n\nIMPORTANT: your previous reply could not be parsed. \
Resend the same recipe as ONE compact JSON object on a single line. \
No prose, no markdown fences, no comments before or after the object. \
Make sure the object is complete and ends with its closing brace.";

fn system_prompt() -> String {
    "/no_thinking
You are a recipe generation assistant. Given a list of available ingredients and constraints, \
invent one realistic recipe that uses as many of the listed ingredients as sensible.
Return the output as a JSON object. The JSON object must be the only content in your response. \
Do not include any explanatory text, comments, or markdown formatting (like ```json) before or \
after the JSON object.
The JSON object must have the following top-level properties:
- \"title\": string, the recipe name.
- \"summary\": string, one or two sentences describing the dish.
- \"dishType\": one of \"main\", \"side\", \"snack/salad\", \"dressing\", \"sauce\", \"spice-blend\".
- \"servings\": number.
- \"cuisine\": string.
- \"prepTime\", \"cookTime\", \"totalTime\": strings like \"15 min\".
- \"tasteScore\", \"simplicityScore\", \"overallScore\": numbers from 0 to 10.
- \"selectedIngredients\": array of { \"name\": string, \"reason\": string } for ingredients you used.
- \"omittedIngredients\": array of { \"name\": string, \"reason\": string } for listed ingredients you skipped.
- \"ingredientsUS\": array of { \"name\": string, \"amount\": string, \"note\": string (optional) } in US units.
- \"ingredientsMetric\": same shape as ingredientsUS but in metric units.
- \"steps\": array of { \"step\": number, \"instruction\": string, \"time\": string (optional), \
\"heat\": string (optional), \"donenessCue\": string (optional), \"tip\": string (optional) }.
- \"tips\": array of strings.
- \"notes\": array of strings.
- \"substitutions\": array of { \"from\": string, \"to\": string, \"note\": string (optional) }.
Your response must start with { and end with }.
"
    .to_string()
}

fn user_prompt(request: &RecipeRequest) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Available ingredients: {}",
        request.ingredients.join(", ")
    ));
    lines.push(format!("Cuisine: {}", request.cuisine));
    lines.push(format!("Dish type: {}", request.dish_type));
    lines.push(format!("Servings: {}", request.servings));
    if !request.avoid.is_empty() {
        lines.push(format!("Do NOT use: {}", request.avoid.join(", ")));
    }
    if request.staples_allowed {
        lines.push(
            "You may assume basic pantry staples (salt, pepper, oil, water) are available."
                .to_string(),
        );
    } else {
        lines.push("Use ONLY the listed ingredients, no assumed staples.".to_string());
    }
    lines.join("\n")
}

/// Messages for the primary generation call.
pub fn build_recipe_messages(request: &RecipeRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: system_prompt(),
        },
        ChatMessage {
            role: "user".to_string(),
            content: user_prompt(request),
        },
    ]
}

/// Same conversation with the repair directive appended to the system
/// message. The user message is untouched so the model re-emits the same
/// content rather than inventing a new recipe.
pub fn with_repair_directive(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|message| {
            if message.role == "system" {
                ChatMessage {
                    role: message.role.clone(),
                    content: format!("{}{}", message.content, REPAIR_DIRECTIVE),
                }
            } else {
                message.clone()
            }
        })
        .collect()
}
