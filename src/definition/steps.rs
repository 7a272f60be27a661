// src/definition/steps.rs

use std::collections::BTreeSet;

use crate::errors::{PipesubmitError, Result};

/// Parse a 1-based step range such as `"1-3,5"` or `"4-"` against `count`
/// defined steps.
///
/// Returns sorted, de-duplicated 0-based indices.
pub fn parse_step_range(range: &str, count: usize) -> Result<Vec<usize>> {
    let err = |msg: String| PipesubmitError::StepRange(format!("\"{range}\": {msg}"));
    let mut selected = BTreeSet::new();

    for part in range.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(err("empty range element".to_string()));
        }
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => {
                let start = parse_index(a.trim()).ok_or_else(|| err(format!("bad start in '{part}'")))?;
                let end = if b.trim().is_empty() {
                    count
                } else {
                    parse_index(b.trim()).ok_or_else(|| err(format!("bad end in '{part}'")))?
                };
                (start, end)
            }
            None => {
                let n = parse_index(part).ok_or_else(|| err(format!("bad step number '{part}'")))?;
                (n, n)
            }
        };

        if start > end {
            return Err(err(format!("'{part}' is reversed")));
        }
        if end > count {
            return Err(err(format!(
                "step {end} is out of range (the pipeline defines {count} steps)"
            )));
        }
        selected.extend((start - 1)..end);
    }

    Ok(selected.into_iter().collect())
}

fn parse_index(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|n| *n >= 1)
}
