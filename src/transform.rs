use std::collections::HashMap;
use crate::data::{group_key, numeric_coerce, RawDataset, RawRecord};
use crate::ir::{ChartRecord, Field};

/// Rows sharing one stringified key, in order of first occurrence
struct Partition<'a> {
    key: String,
    rows: Vec<&'a RawRecord>,
}

/// Split rows by the stringified value of `column`, keeping first-seen order
fn partition_rows<'a>(data: &'a RawDataset, column: &str) -> Vec<Partition<'a>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut partitions: Vec<Partition<'a>> = Vec::new();

    for row in &data.records {
        let key = group_key(row.get(column));
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            partitions.push(Partition { key, rows: Vec::new() });
            partitions.len() - 1
        });
        partitions[slot].rows.push(row);
    }

    partitions
}

fn sum_column(rows: &[&RawRecord], column: &str) -> f64 {
    rows.iter().map(|r| numeric_coerce(r.get(column))).sum()
}

/// Group rows by `x_field` and sum `y_field` per group.
///
/// Emits `{ name, [y_field]: sum, size: sum, fill, _count }` per group.
pub fn aggregate(data: &RawDataset, x_field: &Field, y_field: &Field, fill: &str) -> Vec<ChartRecord> {
    partition_rows(data, &x_field.name)
        .into_iter()
        .map(|p| {
            let value = sum_column(&p.rows, &y_field.name);
            ChartRecord {
                name: p.key,
                measure: Some((y_field.name.clone(), value)),
                size: Some(value),
                fill: Some(fill.to_string()),
                count: Some(p.rows.len()),
                ..Default::default()
            }
        })
        .collect()
}

/// Point records for scatter/bubble.
///
/// With a dimension, one point per group: `x`/`y` are the summed measures and
/// `z` the group size. Without one, one point per row named `Row {i}`.
pub fn aggregate_points(
    data: &RawDataset,
    meas_x: &Field,
    meas_y: &Field,
    dim: Option<&Field>,
) -> Vec<ChartRecord> {
    match dim {
        Some(dim) => partition_rows(data, &dim.name)
            .into_iter()
            .map(|p| ChartRecord {
                x: Some(sum_column(&p.rows, &meas_x.name)),
                y: Some(sum_column(&p.rows, &meas_y.name)),
                z: Some(p.rows.len() as f64),
                ..ChartRecord::named(p.key)
            })
            .collect(),
        None => data
            .records
            .iter()
            .enumerate()
            .map(|(i, row)| ChartRecord {
                x: Some(numeric_coerce(row.get(&meas_x.name))),
                y: Some(numeric_coerce(row.get(&meas_y.name))),
                z: Some(1.0),
                ..ChartRecord::named(format!("Row {}", i))
            })
            .collect(),
    }
}
