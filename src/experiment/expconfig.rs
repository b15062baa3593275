//! Parser for the `KEY=VALUE` experiment config fragment.
//!
//! `exp.config` is written for a POSIX shell, but only its assignments are
//! needed, so it is read without ever running a shell.
use anyhow::{anyhow, Context, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Assignments in file order of definition; later ones win.
pub type ExpVariables = BTreeMap<String, String>;

fn key_regex() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid key regex"))
}

fn reference_regex() -> &'static Regex {
    static REFERENCE: OnceLock<Regex> = OnceLock::new();
    REFERENCE.get_or_init(|| {
        Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
            .expect("valid reference regex")
    })
}

/// Parse the assignments of an `exp.config` fragment.
pub fn parse_exp_config(text: &str) -> Result<ExpVariables> {
    let mut values = ExpVariables::new();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line
            .strip_prefix("export ")
            .map(str::trim_start)
            .unwrap_or(line);
        let (key, raw_value) = line
            .split_once('=')
            .ok_or_else(|| anyhow!("line {line_no}: expected KEY=VALUE, got {line:?}"))?;
        if !key_regex().is_match(key) {
            return Err(anyhow!("line {line_no}: invalid variable name {key:?}"));
        }
        let value = parse_value(raw_value, &values)
            .with_context(|| format!("line {line_no}: value of {key}"))?;
        values.insert(key.to_string(), value);
    }
    Ok(values)
}

fn parse_value(raw: &str, defined: &ExpVariables) -> Result<String> {
    let raw = raw.trim();
    let words = shell_words::split(raw).with_context(|| format!("unquote {raw:?}"))?;
    if raw.starts_with('\'') {
        return Ok(words.join(" "));
    }
    let expanded = words
        .iter()
        .map(|word| expand(word, defined))
        .collect::<Result<Vec<_>>>()?;
    Ok(expanded.join(" "))
}

/// Substitute `$KEY` and `${KEY}`; unknown keys expand to nothing. Any other
/// expansion (`${X:-y}`, `$(..)`, backticks) would need a shell and is an error.
fn expand(word: &str, defined: &ExpVariables) -> Result<String> {
    let rest = reference_regex().replace_all(word, "");
    if rest.contains('$') || rest.contains('`') {
        return Err(anyhow!("unsupported shell expansion in {word:?}"));
    }
    let expanded = reference_regex()
        .replace_all(word, |caps: &Captures| {
            let key = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            defined.get(key).cloned().unwrap_or_default()
        })
        .into_owned();
    Ok(expanded)
}

/// Shell-style truthiness used by `DA_REGIONAL_ENABLED`.
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    matches!(value, "t" | "T" | "1" | "y" | "Y")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
}
