use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

type StrategyFn = fn(&str) -> Option<Vec<Value>>;

/// Parsers tried against a model response, in order.
///
/// NOTE: Ordering is important here. The first strategy that yields an array wins; none of them
/// may panic or propagate an error.
static STRATEGIES: &[StrategyFn] = &[whole_array, first_bracketed_array];

/// Recover a JSON array of candidate objects from raw model output. Unrecoverable output is an
/// empty list, not an error.
pub fn parse_response(raw: &str) -> Vec<Value> {
    let body = strip_code_fence(raw);
    STRATEGIES
        .iter()
        .find_map(|f| f(body))
        .unwrap_or_default()
}

/// Remove surrounding ``` fences and an optional language tag line.
pub fn strip_code_fence(raw: &str) -> &str {
    let t = raw.trim();
    if !t.starts_with("```") {
        return t;
    }
    let t = t.trim_matches('`');
    match t.split_once('\n') {
        Some((first, rest)) if is_language_tag(first) => rest.trim(),
        _ => t.trim(),
    }
}

fn is_language_tag(line: &str) -> bool {
    let l = line.trim();
    l.is_empty() || l.eq_ignore_ascii_case("json") || l.eq_ignore_ascii_case("jsonc")
}

fn whole_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str(text).ok()? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

fn first_bracketed_array(text: &str) -> Option<Vec<Value>> {
    // Greedy: from the first `[` to the last `]`, so nested arrays stay intact.
    static BRACKETED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[\s\S]*\]").unwrap());
    let m = BRACKETED_RE.find(text)?;
    whole_array(m.as_str())
}
