use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Shelf configuration (input)
// =============================================================================

/// Role a field plays once it is placed on a shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Dimension,
    Measure,
}

/// A data field placed on a shelf. Identity is `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub role: Role,
    /// Computed field; the formula is carried along but never evaluated
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Field {
    pub fn dimension(name: &str) -> Self {
        Self::new(name, Role::Dimension)
    }

    pub fn measure(name: &str) -> Self {
        Self::new(name, Role::Measure)
    }

    pub fn new(name: &str, role: Role) -> Self {
        Self {
            name: name.to_string(),
            role,
            is_custom: false,
            formula: None,
        }
    }

    pub fn is_dimension(&self) -> bool {
        self.role == Role::Dimension
    }

    pub fn is_measure(&self) -> bool {
        self.role == Role::Measure
    }
}

/// Selected visualization type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    Bar,
    BarStacked,
    BarHorizontal,
    Line,
    LineStep,
    Area,
    AreaStacked,
    Stream,
    #[default]
    Auto,
    Pie,
    Donut,
    Radar,
    Radial,
    Treemap,
    Funnel,
    Waterfall,
    Heatmap,
    Sankey,
    Scatter,
    Bubble,
    Geo,
}

impl ChartType {
    pub const ALL: [ChartType; 21] = [
        ChartType::Bar,
        ChartType::BarStacked,
        ChartType::BarHorizontal,
        ChartType::Line,
        ChartType::LineStep,
        ChartType::Area,
        ChartType::AreaStacked,
        ChartType::Stream,
        ChartType::Auto,
        ChartType::Pie,
        ChartType::Donut,
        ChartType::Radar,
        ChartType::Radial,
        ChartType::Treemap,
        ChartType::Funnel,
        ChartType::Waterfall,
        ChartType::Heatmap,
        ChartType::Sankey,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Geo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::BarStacked => "bar-stacked",
            ChartType::BarHorizontal => "bar-horizontal",
            ChartType::Line => "line",
            ChartType::LineStep => "line-step",
            ChartType::Area => "area",
            ChartType::AreaStacked => "area-stacked",
            ChartType::Stream => "stream",
            ChartType::Auto => "auto",
            ChartType::Pie => "pie",
            ChartType::Donut => "donut",
            ChartType::Radar => "radar",
            ChartType::Radial => "radial",
            ChartType::Treemap => "treemap",
            ChartType::Funnel => "funnel",
            ChartType::Waterfall => "waterfall",
            ChartType::Heatmap => "heatmap",
            ChartType::Sankey => "sankey",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Geo => "geo",
        }
    }

    /// Point-cloud families plot raw measures against each other instead of
    /// aggregating one measure by one dimension
    pub fn is_point_cloud(&self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Bubble)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ChartType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown chart type '{}'", s))
    }
}

/// Named color scheme chosen in the format panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Ocean,
    Sunset,
    Forest,
    Monochrome,
}

impl FromStr for ColorScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(ColorScheme::Default),
            "ocean" => Ok(ColorScheme::Ocean),
            "sunset" => Ok(ColorScheme::Sunset),
            "forest" => Ok(ColorScheme::Forest),
            "monochrome" => Ok(ColorScheme::Monochrome),
            _ => Err(anyhow!("Unknown color scheme '{}'", s)),
        }
    }
}

/// Fields assigned to the two shelves plus the format-panel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfConfiguration {
    pub columns: Vec<Field>,
    pub rows: Vec<Field>,
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default = "default_true")]
    pub show_legend: bool,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default)]
    pub color_scheme: ColorScheme,
}

fn default_true() -> bool {
    true
}

impl ShelfConfiguration {
    pub fn new(columns: Vec<Field>, rows: Vec<Field>, chart_type: ChartType) -> Self {
        Self {
            columns,
            rows,
            chart_type,
            show_legend: true,
            show_grid: true,
            color_scheme: ColorScheme::Default,
        }
    }

    /// Parse a shelf configuration, failing fast when either shelf is missing
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| anyhow!("Shelf configuration must be a JSON object"))?;

        for shelf in ["columns", "rows"] {
            match obj.get(shelf) {
                Some(Value::Array(_)) => {}
                Some(_) => bail!("Shelf configuration field '{}' must be an array", shelf),
                None => bail!("Shelf configuration is missing the '{}' array", shelf),
            }
        }

        serde_json::from_value(value.clone()).context("Invalid shelf configuration")
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Concrete fields picked from the shelves for one chart family
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFields {
    pub x_field: Option<Field>,
    pub y_field: Option<Field>,
    pub meas_x: Option<Field>,
    pub meas_y: Option<Field>,
    pub dim: Option<Field>,
}

// =============================================================================
// Encoded output
// =============================================================================

/// One record handed to the chart-rendering boundary.
///
/// Serializes as a flat JSON object. The measure is keyed by its field name;
/// a measure named like one of the canonical keys overwrites that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartRecord {
    pub name: String,
    pub measure: Option<(String, f64)>,
    pub size: Option<f64>,
    pub fill: Option<String>,
    pub count: Option<usize>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub value: Option<f64>,
}

impl ChartRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Look up a numeric key the way the rendering boundary sees it
    pub fn get(&self, key: &str) -> Option<f64> {
        self.to_json().get(key).and_then(Value::as_f64)
    }

    /// Waterfall bars are drawn with the positive color when the step is >= 0
    pub fn is_positive(&self) -> bool {
        self.value.map(|v| v >= 0.0).unwrap_or(true)
    }

    /// True when any numeric key holds NaN or an infinity
    pub fn has_non_finite(&self) -> bool {
        let measure = self.measure.as_ref().map(|(_, v)| *v);
        [measure, self.size, self.x, self.y, self.z, self.min, self.max, self.value]
            .into_iter()
            .flatten()
            .any(|v| !v.is_finite())
    }

    /// Flat JSON object. JSON has no NaN or infinity, so non-finite numbers
    /// are written as `null`.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut obj = Map::new();
        obj.insert("name".to_string(), json!(self.name));
        if let Some((key, value)) = &self.measure {
            obj.insert(key.clone(), json!(value));
        }
        if let Some(size) = self.size {
            obj.insert("size".to_string(), json!(size));
        }
        if let Some(fill) = &self.fill {
            obj.insert("fill".to_string(), json!(fill));
        }
        if let Some(count) = self.count {
            obj.insert("_count".to_string(), json!(count));
        }
        let numeric = [
            ("x", self.x),
            ("y", self.y),
            ("z", self.z),
            ("min", self.min),
            ("max", self.max),
            ("value", self.value),
        ];
        for (key, value) in numeric {
            if let Some(v) = value {
                obj.insert(key.to_string(), json!(v));
            }
        }
        obj
    }
}

impl Serialize for ChartRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Star-shaped flow graph: a single "Total" source feeding one node per group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyGraph {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

/// Encoder output. Callers must check for `TooManyNodes` before
/// graph-rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartData {
    Records {
        records: Vec<ChartRecord>,
    },
    Graph(SankeyGraph),
    TooManyNodes {
        #[serde(rename = "nodeCount")]
        node_count: usize,
        limit: usize,
    },
}

impl ChartData {
    pub fn empty() -> Self {
        ChartData::Records { records: Vec::new() }
    }

    pub fn records(&self) -> Option<&[ChartRecord]> {
        match self {
            ChartData::Records { records } => Some(records),
            _ => None,
        }
    }

    pub fn graph(&self) -> Option<&SankeyGraph> {
        match self {
            ChartData::Graph(graph) => Some(graph),
            _ => None,
        }
    }

    /// True when there is nothing to draw (the placeholder state)
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartData::Records { records } if records.is_empty())
    }
}

/// Mark the `auto` family settles on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoShape {
    Area,
    Bar,
}

/// Everything the rendering boundary needs for one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    pub chart_type: ChartType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_shape: Option<AutoShape>,
    pub show_legend: bool,
    pub show_grid: bool,
    pub color_scheme: ColorScheme,
    pub data: ChartData,
}
