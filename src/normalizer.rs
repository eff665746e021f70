use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why an available ingredient was used or skipped.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReasonedIngredient {
    pub name: String,
    pub reason: String,
}

/// One ingredient line in a measurement system.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuantifiedIngredient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeStep {
    pub step: u32,
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat: Option<String>,
    #[serde(rename = "donenessCue", skip_serializing_if = "Option::is_none")]
    pub doneness_cue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Substitution {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The fully-typed, render-ready recipe. Every list field is always a Vec
/// regardless of the shape the model produced (array, lone object, key->value
/// map, or nothing) -- this record is the single point where shape
/// heterogeneity from the model is eliminated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub title: String,
    pub summary: String,
    pub dish_type: String,
    pub servings: f64,
    pub cuisine: String,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub taste_score: f64,
    pub simplicity_score: f64,
    pub overall_score: f64,
    pub selected_ingredients: Vec<ReasonedIngredient>,
    pub omitted_ingredients: Vec<ReasonedIngredient>,
    #[serde(rename = "ingredientsUS")]
    pub ingredients_us: Vec<QuantifiedIngredient>,
    pub ingredients_metric: Vec<QuantifiedIngredient>,
    pub steps: Vec<RecipeStep>,
    pub tips: Vec<String>,
    pub notes: Vec<String>,
    pub substitutions: Vec<Substitution>,
}

/// Caller-supplied defaults that cannot be hardcoded.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub cuisine: String,
}

/// Coerces a parsed object of unknown/partial shape into a RecipeRecord.
/// Total function: never fails, every field has a defined default and every
/// malformed sub-field degrades silently. The source is an unreliable
/// generative model, so leniency here is policy, not an oversight.
pub fn normalize(value: &Value, context: &NormalizeContext) -> RecipeRecord {
    let empty = serde_json::Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let steps = obj
        .get("steps")
        .and_then(Value::as_array)
        .map(|entries| normalize_steps(entries))
        .unwrap_or_default();

    RecipeRecord {
        title: string_field(obj.get("title"), "Untitled"),
        summary: string_field(obj.get("summary"), ""),
        // dishType passes through unvalidated; rendering tolerates unknown
        // values, so an off-list answer is better kept than erased.
        dish_type: string_field(obj.get("dishType"), "main"),
        servings: number_field(obj.get("servings"), 2.0),
        cuisine: string_field(obj.get("cuisine"), &context.cuisine),
        prep_time: string_field(obj.get("prepTime"), ""),
        cook_time: string_field(obj.get("cookTime"), ""),
        total_time: string_field(obj.get("totalTime"), ""),
        taste_score: number_field(obj.get("tasteScore"), 0.0),
        simplicity_score: number_field(obj.get("simplicityScore"), 0.0),
        overall_score: number_field(obj.get("overallScore"), 0.0),
        selected_ingredients: normalize_reasoned(obj.get("selectedIngredients")),
        omitted_ingredients: normalize_reasoned(obj.get("omittedIngredients")),
        ingredients_us: normalize_quantified(obj.get("ingredientsUS")),
        ingredients_metric: normalize_quantified(obj.get("ingredientsMetric")),
        steps,
        tips: normalize_string_list(obj.get("tips")),
        notes: normalize_string_list(obj.get("notes")),
        substitutions: normalize_substitutions(obj.get("substitutions")),
    }
}

/// String coercion: strings pass through, numbers and bools stringify,
/// everything else is treated as absent.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(coerce_string)
        .unwrap_or_else(|| default.to_string())
}

/// Numeric coercion: JSON numbers pass through, numeric strings parse.
/// A non-numeric string ("nine") collapses to the default rather than
/// failing the whole record.
fn number_field(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(default),
        _ => default,
    }
}

/// Array form passes through; a lone object is wrapped as a one-element
/// list; anything else is empty.
fn entries_of(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(lone @ Value::Object(_)) => vec![lone],
        _ => Vec::new(),
    }
}

fn normalize_reasoned(value: Option<&Value>) -> Vec<ReasonedIngredient> {
    entries_of(value)
        .into_iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let name = obj.get("name").and_then(coerce_string)?;
            if name.trim().is_empty() {
                return None;
            }
            Some(ReasonedIngredient {
                name,
                reason: string_field(obj.get("reason"), ""),
            })
        })
        .collect()
}

fn normalize_quantified(value: Option<&Value>) -> Vec<QuantifiedIngredient> {
    // Map form: { "paprika": "1 tsp", ... } -- keys become names, values
    // stringify into amounts, in source order.
    if let Some(Value::Object(map)) = value {
        return map
            .iter()
            .map(|(name, amount)| QuantifiedIngredient {
                name: name.clone(),
                amount: coerce_string(amount),
                note: None,
            })
            .collect();
    }

    entries_of(value)
        .into_iter()
        .filter_map(|entry| match entry {
            // Bare string entries are ingredient names with no amount.
            Value::String(name) => Some(QuantifiedIngredient {
                name: name.clone(),
                amount: None,
                note: None,
            }),
            Value::Object(obj) => {
                let name = obj.get("name").and_then(coerce_string)?;
                if name.trim().is_empty() {
                    return None;
                }
                Some(QuantifiedIngredient {
                    name,
                    amount: obj.get("amount").and_then(coerce_string),
                    note: obj.get("note").and_then(coerce_string),
                })
            }
            _ => None,
        })
        .collect()
}

fn normalize_steps(entries: &[Value]) -> Vec<RecipeStep> {
    let mut steps = Vec::new();
    for entry in entries {
        let Some(obj) = entry.as_object() else {
            continue;
        };
        let Some(instruction) = obj.get("instruction").and_then(coerce_string) else {
            continue;
        };
        if instruction.trim().is_empty() {
            continue;
        }
        // Missing step numbers default to the 1-based position among the
        // entries that survived the instruction check.
        let position = (steps.len() + 1) as u32;
        let step = match obj.get("step") {
            Some(Value::Number(n)) if n.as_f64().map_or(false, |v| v >= 1.0) => {
                n.as_f64().unwrap_or(position as f64) as u32
            }
            _ => position,
        };
        steps.push(RecipeStep {
            step,
            instruction,
            time: obj.get("time").and_then(coerce_string),
            heat: obj.get("heat").and_then(coerce_string),
            doneness_cue: obj.get("donenessCue").and_then(coerce_string),
            tip: obj.get("tip").and_then(coerce_string),
        });
    }
    steps
}

fn normalize_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_string).collect(),
        _ => Vec::new(),
    }
}

fn normalize_substitutions(value: Option<&Value>) -> Vec<Substitution> {
    entries_of(value)
        .into_iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let from = obj.get("from").and_then(coerce_string)?;
            let to = obj.get("to").and_then(coerce_string)?;
            if from.trim().is_empty() || to.trim().is_empty() {
                return None;
            }
            Some(Substitution {
                from,
                to,
                note: obj.get("note").and_then(coerce_string),
            })
        })
        .collect()
}
