//! Role suggestion for untyped columns.
//!
//! | Column contents                          | Suggested role |
//! |------------------------------------------|----------------|
//! | Only numbers / fully numeric text (+null) | measure        |
//! | Anything else                            | dimension      |
//! | Only nulls, or no values at all          | dimension      |

use crate::data::{RawDataset, Scalar};
use crate::ir::{Field, Role};

/// Suggest a role for `column` from the values present in `data`
pub fn suggest_role(data: &RawDataset, column: &str) -> Role {
    let mut seen_value = false;
    for record in &data.records {
        match record.get(column) {
            None | Some(Scalar::Null) => {}
            Some(Scalar::Number(_)) => seen_value = true,
            Some(Scalar::Text(s)) => {
                if !is_numeric_text(s) {
                    return Role::Dimension;
                }
                seen_value = true;
            }
        }
    }

    if seen_value {
        Role::Measure
    } else {
        Role::Dimension
    }
}

/// One field per column, in first-seen column order
pub fn infer_fields(data: &RawDataset) -> Vec<Field> {
    data.columns()
        .iter()
        .map(|name| Field::new(name, suggest_role(data, name)))
        .collect()
}

fn is_numeric_text(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)
}
