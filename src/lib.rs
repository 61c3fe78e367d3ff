// Library exports for shelfchart

pub mod csv_reader;
pub mod data;
pub mod encoder;
pub mod infer;
pub mod ir;
pub mod palette;
pub mod parser;
pub mod resolve;
pub mod runtime;
pub mod transform;

pub use data::{RawDataset, RawRecord, Scalar};
pub use ir::{ChartData, ChartRecord, ChartType, Encoding, Field, Role, ShelfConfiguration};
pub use runtime::{encode_chart, encode_json};

use serde::Deserialize;

/// Hard caps applied to every encoding
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
    #[serde(default = "default_sankey_node_limit")]
    pub sankey_node_limit: usize,
}

fn default_row_limit() -> usize { 2000 }
fn default_sankey_node_limit() -> usize { 50 }

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            row_limit: default_row_limit(),
            sankey_node_limit: default_sankey_node_limit(),
        }
    }
}
