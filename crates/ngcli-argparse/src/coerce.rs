//! Conversion of raw tokens into typed option values.

use ngcli_options::{OptionModel, OptionType, Value};

fn append(items: &[String], raw: Option<&str>) -> Value {
    let mut items = items.to_vec();
    items.push(raw.unwrap_or_default().to_string());
    Value::Array(items)
}

/// Coerce `raw` into a value of type `ty`.
///
/// `raw` is `None` when the flag was given without a value. `previous` is the
/// value already accumulated for the option; array-like types append to it.
/// Returns `None` when the token is not a valid value for `ty`.
pub fn coerce_type(raw: Option<&str>, ty: OptionType, previous: Option<&Value>) -> Option<Value> {
    match ty {
        OptionType::String => Some(Value::String(raw.unwrap_or_default().to_string())),
        OptionType::Boolean => match raw {
            Some("false") => Some(Value::Bool(false)),
            None | Some("") | Some("true") => Some(Value::Bool(true)),
            Some(_) => None,
        },
        // A bare numeric flag counts as zero.
        OptionType::Number => match raw {
            None => Some(Value::Number(0.0)),
            Some("") => None,
            Some(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number),
        },
        OptionType::Array => match previous {
            Some(Value::Array(items)) => Some(append(items, raw)),
            _ => Some(Value::Array(vec![raw.unwrap_or_default().to_string()])),
        },
        OptionType::Any => match previous {
            Some(Value::Array(items)) => Some(append(items, raw)),
            _ => coerce_type(raw, OptionType::Boolean, previous)
                .or_else(|| coerce_type(raw, OptionType::Number, previous))
                .or_else(|| coerce_type(raw, OptionType::String, previous)),
        },
    }
}

/// Coerce `raw` for `option`, trying each accepted type in order.
///
/// The first type that both coerces and satisfies the option's enum wins.
/// Without an option every token is coerced as [`OptionType::Any`].
pub fn coerce(
    raw: Option<&str>,
    option: Option<&OptionModel>,
    previous: Option<&Value>,
) -> Option<Value> {
    let Some(option) = option else {
        return coerce_type(raw, OptionType::Any, previous);
    };

    option
        .accepted_types()
        .iter()
        .find_map(|&ty| coerce_type(raw, ty, previous).filter(|value| option.permits(value)))
}
