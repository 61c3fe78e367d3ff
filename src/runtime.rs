// Pipeline executor: shelves + raw rows -> chart-ready encoding

use crate::data::RawDataset;
use crate::encoder::{self, EncodeContext};
use crate::ir::{ChartData, ChartRecord, ChartType, Encoding, ShelfConfiguration};
use crate::palette::ColorPalette;
use crate::resolve::resolve_fields;
use crate::EncodeOptions;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde_json::Value;

/// Encode raw rows for the chart family selected on `shelves`.
///
/// Never fails: unresolvable fields yield empty records and an oversized
/// sankey yields `ChartData::TooManyNodes`.
pub fn encode_chart(data: &RawDataset, shelves: &ShelfConfiguration, options: &EncodeOptions) -> Encoding {
    let capped;
    let data = if data.len() > options.row_limit {
        let mut copy = data.clone();
        copy.truncate_to(options.row_limit);
        capped = copy;
        &capped
    } else {
        data
    };

    let chart_type = shelves.chart_type;
    let fields = resolve_fields(shelves, chart_type);
    debug!("Resolved fields for {}: {:?}", chart_type, fields);

    let palette = ColorPalette::for_scheme(shelves.color_scheme);
    let ctx = EncodeContext {
        data,
        fields: &fields,
        fill: palette.primary(),
        sankey_node_limit: options.sankey_node_limit,
    };
    let encoded = encoder::encode(chart_type, &ctx);

    match &encoded {
        ChartData::Records { records } if records.is_empty() => {
            info!("{} chart has no data to render ({} input rows)", chart_type, data.len())
        }
        ChartData::Records { records } => {
            debug!("{} chart encoded {} records from {} rows", chart_type, records.len(), data.len());
            let non_finite = count_non_finite(records);
            if non_finite > 0 {
                warn!(
                    "{} chart has {} records with NaN or infinite values; they serialize as null",
                    chart_type, non_finite
                );
            }
        }
        ChartData::Graph(graph) => {
            debug!("{} chart encoded {} nodes", chart_type, graph.nodes.len());
            if graph.links.iter().any(|link| !link.value.is_finite()) {
                warn!("{} chart has NaN or infinite link values; they serialize as null", chart_type);
            }
        }
        ChartData::TooManyNodes { node_count, limit } => {
            info!("{} chart has too many nodes ({} > {})", chart_type, node_count, limit)
        }
    }

    Encoding {
        chart_type,
        auto_shape: (chart_type == ChartType::Auto).then(|| encoder::auto_shape(&fields)),
        show_legend: shelves.show_legend,
        show_grid: shelves.show_grid,
        color_scheme: shelves.color_scheme,
        data: encoded,
    }
}

fn count_non_finite(records: &[ChartRecord]) -> usize {
    records.iter().filter(|r| r.has_non_finite()).count()
}

/// JSON boundary: validate both inputs, then encode
pub fn encode_json(data: &Value, shelves: &Value, options: &EncodeOptions) -> Result<Encoding> {
    let shelves = ShelfConfiguration::from_json(shelves)?;
    let data = RawDataset::from_json(data).context("Invalid raw dataset")?;
    Ok(encode_chart(&data, &shelves, options))
}
