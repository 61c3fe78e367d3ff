// Syntax tree for the shelf DSL

use crate::data::RawDataset;
use crate::infer::suggest_role;
use crate::ir::{ChartType, ColorScheme, Field, Role, ShelfConfiguration};

/// A field as written on a shelf; the role may be left to inference
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    pub name: String,
    pub role: Option<Role>,
}

/// Parsed shelf DSL, before roles are filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfSpec {
    pub chart_type: ChartType,
    pub columns: Vec<FieldRef>,
    pub rows: Vec<FieldRef>,
    pub show_legend: Option<bool>,
    pub show_grid: Option<bool>,
    pub color_scheme: Option<ColorScheme>,
}

impl ShelfSpec {
    /// Build a shelf configuration, suggesting a role from `data` for every
    /// field written without one
    pub fn into_configuration(self, data: &RawDataset) -> ShelfConfiguration {
        let to_field = |f: FieldRef| {
            let role = f.role.unwrap_or_else(|| suggest_role(data, &f.name));
            Field::new(&f.name, role)
        };

        let mut shelves = ShelfConfiguration::new(
            self.columns.into_iter().map(to_field).collect(),
            self.rows.into_iter().map(to_field).collect(),
            self.chart_type,
        );
        if let Some(legend) = self.show_legend {
            shelves.show_legend = legend;
        }
        if let Some(grid) = self.show_grid {
            shelves.show_grid = grid;
        }
        if let Some(scheme) = self.color_scheme {
            shelves.color_scheme = scheme;
        }
        shelves
    }
}
