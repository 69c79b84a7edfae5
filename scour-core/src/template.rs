//! Rendering of dialect statement templates such as `DROP TABLE {qschema}.{qname}`.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{Result, ScourError};

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Replace every `{key}` in `template` with its value from `values`.
///
/// Substitution is single-pass, so braces inside substituted values are
/// never expanded again. A key without a value is an error.
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String> {
    let mut result = String::with_capacity(template.len() + 32);
    let mut last_end = 0;

    for caps in placeholder_regex().captures_iter(template) {
        let (Some(full_match), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        result.push_str(&template[last_end..full_match.start()]);

        match values.iter().find(|(k, _)| *k == key.as_str()) {
            Some((_, value)) => result.push_str(value),
            None => {
                return Err(ScourError::TemplateError {
                    key: key.as_str().to_string(),
                    template: template.to_string(),
                })
            }
        }

        last_end = full_match.end();
    }

    result.push_str(&template[last_end..]);
    Ok(result)
}
