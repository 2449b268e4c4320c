//! Counterexample normalization.
//!
//! Backends emit witnesses in three shapes: dReal prints one
//! `name : [lo, up]` line per variable, z3 answers with a single-line JSON
//! object, and the Marabou query command returns a bare numeric vector.
//! All three normalize into [`Counterexample`]; anything unparseable is
//! logged and dropped rather than failing the task.

use indexmap::IndexMap;
use tracing::warn;

use reachcert_ir::Counterexample;

/// Normalize a raw witness string, or `None` when it cannot be parsed.
pub fn parse_counterexample(text: &str) -> Option<Counterexample> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = if trimmed.starts_with('{') {
        parse_mapping(trimmed)
    } else if trimmed.contains(':') {
        parse_box_lines(trimmed)
    } else if trimmed.starts_with('[') {
        parse_vector(trimmed)
    } else {
        None
    };
    if parsed.is_none() {
        warn!(witness = trimmed, "unparseable counterexample text");
    }
    parsed
}

/// Multi-line `name : [lo, up]` blocks, one variable per line.
fn parse_box_lines(text: &str) -> Option<Counterexample> {
    let mut intervals = IndexMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, range) = line.split_once(':')?;
        let (lo, up) = parse_interval(range.trim())?;
        intervals.insert(name.trim().to_string(), (lo, up));
    }
    if intervals.is_empty() {
        None
    } else {
        Some(Counterexample::Box(intervals))
    }
}

fn parse_interval(text: &str) -> Option<(f64, f64)> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let (lo, up) = inner.split_once(',')?;
    Some((lo.trim().parse().ok()?, up.trim().parse().ok()?))
}

/// Single-line JSON object; list values become intervals, scalars become
/// degenerate intervals. Declaration order is kept (serde_json's
/// `preserve_order` feature).
fn parse_mapping(text: &str) -> Option<Counterexample> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    let mut intervals = IndexMap::new();
    for (name, entry) in object {
        let interval = match entry {
            serde_json::Value::Array(items) if items.len() == 2 => {
                (items[0].as_f64()?, items[1].as_f64()?)
            }
            scalar => {
                let v = scalar.as_f64()?;
                (v, v)
            }
        };
        intervals.insert(name.clone(), interval);
    }
    Some(Counterexample::Box(intervals))
}

/// Bare bracketed vector with no labels; kept positional.
fn parse_vector(text: &str) -> Option<Counterexample> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let values: Option<Vec<f64>> = inner
        .split(',')
        .map(|item| item.trim().parse().ok())
        .collect();
    Some(Counterexample::Vector(values?))
}
