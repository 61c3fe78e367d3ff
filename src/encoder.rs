use std::cmp::Ordering;
use crate::data::RawDataset;
use crate::ir::{
    AutoShape, ChartData, ChartRecord, ChartType, ResolvedFields, SankeyGraph, SankeyLink,
    SankeyNode,
};
use crate::transform::{aggregate, aggregate_points};

/// Inputs shared by every family encoder
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub data: &'a RawDataset,
    pub fields: &'a ResolvedFields,
    /// Series color written into aggregated records
    pub fill: &'a str,
    pub sankey_node_limit: usize,
}

/// A family encoder: pure function from raw rows and resolved fields to output
pub type EncodeFn = fn(&EncodeContext) -> ChartData;

/// Strategy table keyed by chart family
pub fn encoder_for(chart_type: ChartType) -> EncodeFn {
    match chart_type {
        ChartType::Bar
        | ChartType::BarStacked
        | ChartType::BarHorizontal
        | ChartType::Line
        | ChartType::LineStep
        | ChartType::Area
        | ChartType::AreaStacked
        | ChartType::Stream
        | ChartType::Auto
        | ChartType::Pie
        | ChartType::Donut
        | ChartType::Radar
        | ChartType::Radial
        | ChartType::Treemap
        // Cell opacity and map coordinates are assigned by the renderer
        | ChartType::Heatmap
        | ChartType::Geo => encode_passthrough,
        ChartType::Funnel => encode_funnel,
        ChartType::Waterfall => encode_waterfall,
        ChartType::Sankey => encode_sankey,
        ChartType::Scatter | ChartType::Bubble => encode_points,
    }
}

pub fn encode(chart_type: ChartType, ctx: &EncodeContext) -> ChartData {
    encoder_for(chart_type)(ctx)
}

/// `auto` renders as an area chart over date-like x fields, bars otherwise
pub fn auto_shape(fields: &ResolvedFields) -> AutoShape {
    match &fields.x_field {
        Some(f) if f.name.contains("date") || f.name.ends_with("_at") => AutoShape::Area,
        _ => AutoShape::Bar,
    }
}

/// Grouped records, or `None` when the x or y field is unresolved
fn aggregated(ctx: &EncodeContext) -> Option<Vec<ChartRecord>> {
    let x_field = ctx.fields.x_field.as_ref()?;
    let y_field = ctx.fields.y_field.as_ref()?;
    Some(aggregate(ctx.data, x_field, y_field, ctx.fill))
}

fn measure_value(record: &ChartRecord) -> Option<f64> {
    record.measure.as_ref().map(|(_, v)| *v)
}

fn encode_passthrough(ctx: &EncodeContext) -> ChartData {
    match aggregated(ctx) {
        Some(records) => ChartData::Records { records },
        None => ChartData::empty(),
    }
}

/// Descending order over all floats: NaN sorts after every number and
/// `-0.0` ties with `0.0`
fn funnel_order(a: f64, b: f64) -> Ordering {
    a.is_nan()
        .cmp(&b.is_nan())
        .then_with(|| (b + 0.0).total_cmp(&(a + 0.0)))
}

/// Stages ordered by descending value; ties keep group order
fn encode_funnel(ctx: &EncodeContext) -> ChartData {
    let Some(mut records) = aggregated(ctx) else {
        return ChartData::empty();
    };
    records.sort_by(|a, b| {
        funnel_order(measure_value(a).unwrap_or(0.0), measure_value(b).unwrap_or(0.0))
    });
    ChartData::Records { records }
}

/// Running total. `min`/`max` are the totals before and after each step, so a
/// negative step has `min > max`.
fn encode_waterfall(ctx: &EncodeContext) -> ChartData {
    let Some(records) = aggregated(ctx) else {
        return ChartData::empty();
    };
    let mut cumulative = 0.0;
    let records = records
        .into_iter()
        .map(|record| {
            let value = measure_value(&record).unwrap_or(0.0);
            let prev = cumulative;
            cumulative += value;
            ChartRecord {
                min: Some(prev),
                max: Some(cumulative),
                value: Some(value),
                ..record
            }
        })
        .collect();
    ChartData::Records { records }
}

fn encode_sankey(ctx: &EncodeContext) -> ChartData {
    let Some(records) = aggregated(ctx) else {
        return ChartData::empty();
    };

    let node_count = records.len() + 1;
    if node_count > ctx.sankey_node_limit {
        return ChartData::TooManyNodes {
            node_count,
            limit: ctx.sankey_node_limit,
        };
    }

    let mut nodes = Vec::with_capacity(node_count);
    nodes.push(SankeyNode {
        name: "Total".to_string(),
    });
    let mut links = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        nodes.push(SankeyNode {
            name: record.name.clone(),
        });
        links.push(SankeyLink {
            source: 0,
            target: i + 1,
            value: measure_value(record).unwrap_or(1.0),
        });
    }

    ChartData::Graph(SankeyGraph { nodes, links })
}

fn encode_points(ctx: &EncodeContext) -> ChartData {
    let (Some(meas_x), Some(meas_y)) = (&ctx.fields.meas_x, &ctx.fields.meas_y) else {
        return ChartData::empty();
    };
    ChartData::Records {
        records: aggregate_points(ctx.data, meas_x, meas_y, ctx.fields.dim.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawRecord;
    use crate::ir::Field;

    fn grouped_data(values: &[f64]) -> RawDataset {
        RawDataset::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| RawRecord::new().with("step", format!("s{}", i).as_str()).with("amount", *v))
                .collect(),
        )
    }

    fn grouped_fields() -> ResolvedFields {
        ResolvedFields {
            x_field: Some(Field::dimension("step")),
            y_field: Some(Field::measure("amount")),
            ..Default::default()
        }
    }

    fn run(chart_type: ChartType, data: &RawDataset, fields: &ResolvedFields) -> ChartData {
        let ctx = EncodeContext {
            data,
            fields,
            fill: "#6366f1",
            sankey_node_limit: 50,
        };
        encode(chart_type, &ctx)
    }

    #[test]
    fn test_passthrough_families_match_aggregation() {
        let data = grouped_data(&[3.0, 1.0, 2.0]);
        let fields = grouped_fields();
        let expected = run(ChartType::Bar, &data, &fields);
        for t in [ChartType::Pie, ChartType::Treemap, ChartType::Heatmap, ChartType::Geo, ChartType::Auto] {
            assert_eq!(run(t, &data, &fields), expected, "{}", t);
        }
    }

    #[test]
    fn test_funnel_sorted_descending_stable() {
        let data = grouped_data(&[3.0, 5.0, 3.0, 9.0]);
        let data = run(ChartType::Funnel, &data, &grouped_fields());
        let names: Vec<&str> = data.records().unwrap().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["s3", "s1", "s0", "s2"]);
    }

    #[test]
    fn test_funnel_nan_groups_sort_last() {
        // Groups holding both infinities sum to NaN
        let mut rows = Vec::new();
        for i in 0..64 {
            let step = format!("s{}", i);
            if i % 3 == 0 {
                rows.push(RawRecord::new().with("step", step.as_str()).with("amount", "Infinity"));
                rows.push(RawRecord::new().with("step", step.as_str()).with("amount", "-Infinity"));
            } else {
                rows.push(RawRecord::new().with("step", step.as_str()).with("amount", (i % 7) as f64));
            }
        }
        let data = run(ChartType::Funnel, &RawDataset::new(rows), &grouped_fields());
        let records = data.records().unwrap();
        assert_eq!(records.len(), 64);

        let values: Vec<f64> = records.iter().map(|r| measure_value(r).unwrap()).collect();
        let split = values.iter().position(|v| v.is_nan()).unwrap();
        assert_eq!(split, 64 - 22);
        assert!(values[split..].iter().all(|v| v.is_nan()));
        assert!(values[..split].windows(2).all(|w| w[0] >= w[1]));

        let nan_names: Vec<&str> = records[split..].iter().map(|r| r.name.as_str()).collect();
        let expected: Vec<String> = (0..64).step_by(3).map(|i| format!("s{}", i)).collect();
        assert_eq!(nan_names, expected);
    }

    #[test]
    fn test_funnel_order_zero_signs_tie() {
        assert_eq!(funnel_order(-0.0, 0.0), Ordering::Equal);
        assert_eq!(funnel_order(f64::NAN, f64::NEG_INFINITY), Ordering::Greater);
        assert_eq!(funnel_order(2.0, 1.0), Ordering::Less);
    }

    #[test]
    fn test_waterfall_positional_min_max() {
        let data = grouped_data(&[10.0, -5.0, 20.0]);
        let data = run(ChartType::Waterfall, &data, &grouped_fields());
        let records = data.records().unwrap();
        let spans: Vec<(f64, f64, f64)> = records
            .iter()
            .map(|r| (r.min.unwrap(), r.max.unwrap(), r.value.unwrap()))
            .collect();
        assert_eq!(spans, vec![(0.0, 10.0, 10.0), (10.0, 5.0, -5.0), (5.0, 25.0, 20.0)]);
        assert!(records[0].is_positive());
        assert!(!records[1].is_positive());
        assert_eq!(records[1].get("amount"), Some(-5.0));
    }

    #[test]
    fn test_sankey_graph() {
        let data = grouped_data(&[5.0, 10.0, 15.0]);
        let data = run(ChartType::Sankey, &data, &grouped_fields());
        let graph = data.graph().unwrap();
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.nodes[0].name, "Total");
        assert_eq!(graph.nodes[2].name, "s1");
        assert_eq!(
            graph.links,
            vec![
                SankeyLink { source: 0, target: 1, value: 5.0 },
                SankeyLink { source: 0, target: 2, value: 10.0 },
                SankeyLink { source: 0, target: 3, value: 15.0 },
            ]
        );
    }

    #[test]
    fn test_sankey_node_limit() {
        let data = grouped_data(&[1.0; 49]);
        assert!(run(ChartType::Sankey, &data, &grouped_fields()).graph().is_some());

        let data = grouped_data(&[1.0; 50]);
        assert_eq!(
            run(ChartType::Sankey, &data, &grouped_fields()),
            ChartData::TooManyNodes { node_count: 51, limit: 50 }
        );
    }

    #[test]
    fn test_missing_fields_give_empty_records() {
        let data = grouped_data(&[1.0]);
        let fields = ResolvedFields {
            x_field: Some(Field::dimension("step")),
            ..Default::default()
        };
        for t in ChartType::ALL {
            assert!(run(t, &data, &fields).is_empty(), "{}", t);
        }
    }

    #[test]
    fn test_auto_shape() {
        let mut fields = grouped_fields();
        assert_eq!(auto_shape(&fields), AutoShape::Bar);
        fields.x_field = Some(Field::dimension("order_date"));
        assert_eq!(auto_shape(&fields), AutoShape::Area);
        fields.x_field = Some(Field::dimension("created_at"));
        assert_eq!(auto_shape(&fields), AutoShape::Area);
        fields.x_field = Some(Field::dimension("Date"));
        assert_eq!(auto_shape(&fields), AutoShape::Bar);
        fields.x_field = None;
        assert_eq!(auto_shape(&fields), AutoShape::Bar);
    }
}
