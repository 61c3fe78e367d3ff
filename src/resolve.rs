use crate::ir::{ChartType, Field, ResolvedFields, Role, ShelfConfiguration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shelf {
    Columns,
    Rows,
}

/// One step of a fallback chain: look on `shelf` for the first field with
/// `role`, or the first field of any role when `role` is `None`.
#[derive(Debug, Clone, Copy)]
struct Rule {
    shelf: Shelf,
    role: Option<Role>,
}

const fn rule(shelf: Shelf, role: Option<Role>) -> Rule {
    Rule { shelf, role }
}

// Fallback chains, tried in order. The role-agnostic steps are intentional:
// a measure dropped on columns still produces an x axis.
const X_FIELD_RULES: &[Rule] = &[
    rule(Shelf::Columns, Some(Role::Dimension)),
    rule(Shelf::Columns, None),
];
const Y_FIELD_RULES: &[Rule] = &[
    rule(Shelf::Rows, Some(Role::Measure)),
    rule(Shelf::Rows, None),
];
const MEAS_X_RULES: &[Rule] = &[
    rule(Shelf::Columns, Some(Role::Measure)),
    rule(Shelf::Rows, Some(Role::Measure)),
];
const MEAS_Y_RULES: &[Rule] = &[
    rule(Shelf::Rows, Some(Role::Measure)),
    rule(Shelf::Columns, Some(Role::Measure)),
];
const DIM_RULES: &[Rule] = &[
    rule(Shelf::Columns, Some(Role::Dimension)),
    rule(Shelf::Rows, Some(Role::Dimension)),
];

/// Pick the concrete fields a chart family needs from the shelves
pub fn resolve_fields(shelves: &ShelfConfiguration, chart_type: ChartType) -> ResolvedFields {
    if chart_type.is_point_cloud() {
        let meas_x = first_match(shelves, MEAS_X_RULES, None);
        let meas_y = first_match(shelves, MEAS_Y_RULES, meas_x.as_ref().map(|f| f.name.as_str()));
        let dim = first_match(shelves, DIM_RULES, None);
        ResolvedFields {
            meas_x,
            meas_y,
            dim,
            ..Default::default()
        }
    } else {
        ResolvedFields {
            x_field: first_match(shelves, X_FIELD_RULES, None),
            y_field: first_match(shelves, Y_FIELD_RULES, None),
            ..Default::default()
        }
    }
}

/// Walk the rule chain and return the first field any rule selects.
/// Fields named `exclude` are skipped by every rule.
fn first_match(shelves: &ShelfConfiguration, rules: &[Rule], exclude: Option<&str>) -> Option<Field> {
    rules.iter().find_map(|r| {
        let shelf = match r.shelf {
            Shelf::Columns => &shelves.columns,
            Shelf::Rows => &shelves.rows,
        };
        shelf
            .iter()
            .filter(|f| Some(f.name.as_str()) != exclude)
            .find(|f| r.role.map_or(true, |role| f.role == role))
            .cloned()
    })
}
