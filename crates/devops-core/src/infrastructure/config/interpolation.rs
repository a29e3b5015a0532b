//! `${VAR}` and `${VAR:-default}` expansion of config values

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpolationError {
    #[error("Required environment variable not found: {0}")]
    RequiredVarNotFound(String),

    #[error("Recursive interpolation limit exceeded")]
    RecursionLimit,
}

pub type InterpolationResult<T> = Result<T, InterpolationError>;

const MAX_PASSES: usize = 10;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Expands variables until none are left. Defaults and variable values may
/// themselves contain variables.
pub fn interpolate(input: &str) -> InterpolationResult<String> {
    let mut current = input.to_string();
    for _ in 0..MAX_PASSES {
        if !VAR_PATTERN.is_match(&current) {
            return Ok(current);
        }
        current = expand_once(&current)?;
    }

    if VAR_PATTERN.is_match(&current) {
        Err(InterpolationError::RecursionLimit)
    } else {
        Ok(current)
    }
}

fn expand_once(input: &str) -> InterpolationResult<String> {
    let mut result = String::with_capacity(input.len());
    let mut last = 0;

    for cap in VAR_PATTERN.captures_iter(input) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        result.push_str(&input[last..whole.start()]);

        match std::env::var(name.as_str()) {
            Ok(value) => result.push_str(&value),
            Err(_) => match cap.get(2) {
                Some(default) => result.push_str(default.as_str()),
                None => {
                    return Err(InterpolationError::RequiredVarNotFound(
                        name.as_str().to_string(),
                    ))
                }
            },
        }
        last = whole.end();
    }

    result.push_str(&input[last..]);
    Ok(result)
}

pub fn interpolate_toml(value: &mut toml::Value) -> InterpolationResult<()> {
    match value {
        toml::Value::String(s) => {
            *s = interpolate(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr {
                interpolate_toml(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                interpolate_toml(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}
