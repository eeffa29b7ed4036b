//! Recipe ingredient handling: quantity scaling and extraction from the
//! untyped recipe content the inspiration endpoints serve.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// An ingredient line extracted from recipe content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub name: String,
    pub spec: String,
    /// Pantry staple (salt, pepper, ...) usually skipped when adding to a
    /// shopping list.
    pub pantry: bool,
}

fn spec_amount_re() -> &'static Regex {
    static SPEC_AMOUNT: OnceLock<Regex> = OnceLock::new();
    SPEC_AMOUNT.get_or_init(|| Regex::new(r"^([\d.,]+)\s*").expect("amount pattern is valid"))
}

/// Scale a leading decimal amount in an ingredient specification.
///
/// Ranges (`1-2`) and fractions (`1/2`) are left untouched; `,` is accepted
/// and emitted as the decimal separator.
pub fn scale_spec(spec: &str, scale: f64) -> String {
    if spec.is_empty() || scale == 1.0 {
        return spec.to_string();
    }

    let Some(captures) = spec_amount_re().captures(spec) else {
        return spec.to_string();
    };
    let whole = captures.get(0).expect("capture 0 always present");
    let amount = captures.get(1).expect("amount group present").as_str();

    let remaining = spec[whole.end()..].trim_start();
    if remaining.starts_with('-') || remaining.starts_with('/') {
        return spec.to_string();
    }

    let Ok(amount) = amount.replace(',', ".").parse::<f64>() else {
        return spec.to_string();
    };

    let mut scaled = format!("{:.1}", amount * scale);
    if scaled.ends_with(".0") {
        scaled.truncate(scaled.len() - 2);
    }
    let scaled = scaled.replace('.', ",");

    format!("{scaled} {}", &spec[whole.end()..])
}

/// First positive count among candidate JSON values (number or numeric
/// string).
pub fn parse_servings(candidates: &[&Value]) -> Option<u32> {
    candidates.iter().copied().find_map(coerce_count)
}

fn coerce_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()? as i64,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (n > 0).then_some(n as u32)
}

/// Ingredients from recipe content, with specifications scaled.
///
/// Recipes carry ingredients under `items` or `ingredients`, with the name
/// in `itemId`, `name`, or `text` and the pantry flag in `stock`.
pub fn ingredients(content: &Value, scale: f64) -> Vec<RecipeIngredient> {
    let items = content
        .get("items")
        .and_then(Value::as_array)
        .filter(|a| !a.is_empty())
        .or_else(|| content.get("ingredients").and_then(Value::as_array));
    let Some(items) = items else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = ["itemId", "name", "text"]
                .iter()
                .find_map(|key| item.get(key).and_then(Value::as_str))
                .filter(|s| !s.is_empty())?;
            let spec = item.get("spec").and_then(Value::as_str).unwrap_or_default();
            Some(RecipeIngredient {
                name: name.to_string(),
                spec: scale_spec(spec, scale),
                pantry: truthy(item.get("stock")),
            })
        })
        .collect()
}

/// Display title of recipe content.
pub fn title(content: &Value) -> String {
    ["title", "name"]
        .iter()
        .find_map(|key| content.get(key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .unwrap_or("Recipe")
        .to_string()
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => s == "true" || s == "1",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scale_spec() {
        assert_eq!(scale_spec("2.5 kg", 2.0), "5 kg");
        assert_eq!(scale_spec("2,5 kg", 2.0), "5 kg");
        assert_eq!(scale_spec("salt", 2.0), "salt");
        assert_eq!(scale_spec("1-2 tbsp", 2.0), "1-2 tbsp");
        assert_eq!(scale_spec("1/2 cup", 2.0), "1/2 cup");
        assert_eq!(scale_spec("", 2.0), "");
        assert_eq!(scale_spec("2.5 kg", 1.0), "2.5 kg");
    }

    #[test]
    fn test_scale_spec_decimal_output() {
        assert_eq!(scale_spec("1 l", 0.5), "0,5 l");
        assert_eq!(scale_spec("3 eggs", 1.5), "4,5 eggs");
    }

    #[test]
    fn test_parse_servings() {
        assert_eq!(parse_servings(&[&Value::Null, &json!(""), &json!(0)]), None);
        assert_eq!(parse_servings(&[&json!("4")]), Some(4));
        assert_eq!(parse_servings(&[&json!(2.0)]), Some(2));
        assert_eq!(parse_servings(&[&Value::Null, &json!(6)]), Some(6));
    }

    #[test]
    fn test_ingredients_extraction() {
        let content = json!({
            "items": [
                {"itemId": "Flour", "spec": "500 g", "stock": false},
                {"name": "Salt", "stock": true},
                {"spec": "nameless entry is skipped"},
            ]
        });
        let list = ingredients(&content, 2.0);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Flour");
        assert_eq!(list[0].spec, "1000 g");
        assert!(!list[0].pantry);
        assert_eq!(list[1].name, "Salt");
        assert!(list[1].pantry);
    }

    #[test]
    fn test_ingredients_fallback_key() {
        let content = json!({"ingredients": [{"text": "Basil"}]});
        let list = ingredients(&content, 1.0);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Basil");
    }

    #[test]
    fn test_title() {
        assert_eq!(title(&json!({"title": "Pasta"})), "Pasta");
        assert_eq!(title(&json!({"name": "Pizza"})), "Pizza");
        assert_eq!(title(&json!({})), "Recipe");
    }
}
