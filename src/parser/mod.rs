// Shelf DSL parser module

pub mod ast;
pub mod lexer;
pub mod pipeline;

// Public API re-exports
pub use ast::{FieldRef, ShelfSpec};
pub use pipeline::parse_shelf_spec;

/// Parse a shelf DSL string, turning nom failures into a readable error
pub fn parse_shelves(input: &str) -> anyhow::Result<ShelfSpec> {
    match parse_shelf_spec(input) {
        Ok((_, spec)) => Ok(spec),
        Err(e) => Err(anyhow::anyhow!("Invalid shelf specification '{}': {:?}", input, e)),
    }
}
