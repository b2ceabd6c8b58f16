//! CLI enum types for layout options.

use clap::ValueEnum;

use photobooth::layout::Layout;

/// Collage arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LayoutArg {
    #[default]
    SideBySide,
    UpAndDown,
    #[value(name = "2x2-grid", alias = "grid")]
    Grid,
}

impl From<LayoutArg> for Layout {
    fn from(l: LayoutArg) -> Self {
        match l {
            LayoutArg::SideBySide => Layout::SideBySide,
            LayoutArg::UpAndDown => Layout::UpAndDown,
            LayoutArg::Grid => Layout::Grid2x2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_arg_conversion() {
        assert_eq!(Layout::from(LayoutArg::SideBySide), Layout::SideBySide);
        assert_eq!(Layout::from(LayoutArg::UpAndDown), Layout::UpAndDown);
        assert_eq!(Layout::from(LayoutArg::Grid), Layout::Grid2x2);
    }

    #[test]
    fn test_layout_arg_names_match_library() {
        for arg in LayoutArg::value_variants() {
            let name = arg.to_possible_value().unwrap();
            assert_eq!(name.get_name(), Layout::from(*arg).as_str());
        }
    }
}
