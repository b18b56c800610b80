use std::collections::HashMap;

use auspex_models::signal::{Confidence, Prediction, Signal};
use serde_json::{Map, Value};

use crate::error::PipelineError;

/// Parse a JSON object out of free-form model output.
///
/// Tolerates markdown fences and wrapper prose. A reply that parses to a
/// non-object JSON value yields an empty map, not an error; a reply with no
/// JSON object at all is a parse error. Downstream retry and fallback logic
/// depends on that distinction, so keep it.
pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>, PipelineError> {
    let stripped = strip_markdown_fences(raw).trim();

    match serde_json::from_str::<Value>(stripped) {
        Ok(Value::Object(map)) => return Ok(map),
        Ok(_) => return Ok(Map::new()),
        Err(_) => {}
    }

    // Greedy window: earliest '{' to latest '}'.
    let window = match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if start < end => &stripped[start..=end],
        _ => {
            return Err(PipelineError::Parse(format!(
                "no JSON object found in reply (length={})",
                raw.len()
            )))
        }
    };

    match serde_json::from_str::<Value>(window) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(e) => Err(PipelineError::Parse(format!(
            "invalid JSON object in reply: {e}"
        ))),
    }
}

/// Strip a leading markdown code fence, dropping its first line and a
/// trailing closing fence if present.
fn strip_markdown_fences(raw: &str) -> &str {
    if !raw.starts_with("```") {
        return raw;
    }
    let body = match raw.find('\n') {
        Some(pos) => &raw[pos + 1..],
        None => &raw[3..],
    };
    match body.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => body,
    }
}

/// Read the `signals` list out of a parsed reply. A missing or non-list value
/// yields no signals; non-object entries are skipped. When `price_index` is
/// given, each signal's price is taken from it by market id (missing id maps
/// to null), ignoring whatever price the model may have echoed.
pub(crate) fn signals_from_parsed(
    parsed: &Map<String, Value>,
    price_index: Option<&HashMap<String, Option<f64>>>,
) -> Vec<Signal> {
    let Some(raw_signals) = parsed.get("signals").and_then(Value::as_array) else {
        return Vec::new();
    };

    raw_signals
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let market_id = string_field(obj, "market_id");
            let current_price = match price_index {
                Some(prices) => prices.get(&market_id).copied().flatten(),
                None => obj.get("current_price").and_then(Value::as_f64),
            };
            Signal {
                market_title: string_field(obj, "market_title"),
                prediction: obj
                    .get("prediction")
                    .and_then(Value::as_str)
                    .map(Prediction::from_label)
                    .unwrap_or_default(),
                confidence: obj
                    .get("confidence")
                    .and_then(Value::as_str)
                    .map(Confidence::from_label)
                    .unwrap_or_default(),
                rationale: string_field(obj, "rationale"),
                current_price,
                market_id,
            }
        })
        .collect()
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
