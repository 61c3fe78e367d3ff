use crate::ir::ColorScheme;

/// Series color for a scheme. Written into every aggregated record's `fill`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    primary: &'static str,
}

impl ColorPalette {
    pub fn for_scheme(scheme: ColorScheme) -> Self {
        let primary = match scheme {
            ColorScheme::Default => "#6366f1",
            ColorScheme::Ocean => "#0ea5e9",
            ColorScheme::Sunset => "#f97316",
            ColorScheme::Forest => "#16a34a",
            ColorScheme::Monochrome => "#52525b",
        };
        Self { primary }
    }

    pub fn primary(&self) -> &'static str {
        self.primary
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::for_scheme(ColorScheme::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_primary() {
        assert_eq!(ColorPalette::default().primary(), "#6366f1");
    }

    #[test]
    fn test_schemes_differ() {
        let ocean = ColorPalette::for_scheme(ColorScheme::Ocean);
        let forest = ColorPalette::for_scheme(ColorScheme::Forest);
        assert_ne!(ocean.primary(), forest.primary());
    }
}
