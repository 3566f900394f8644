//! CLI enum types for row order overrides.

use clap::ValueEnum;

use camframe::format::{PixelFormat, RowOrder};

/// Row order of an input frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RowOrderArg {
    /// Whatever the format stores by default
    #[default]
    Native,
    TopDown,
    BottomUp,
}

impl RowOrderArg {
    /// Concrete row order for frames of `format`.
    pub fn resolve(self, format: &PixelFormat) -> RowOrder {
        match self {
            RowOrderArg::Native => format.row_order,
            RowOrderArg::TopDown => RowOrder::TopDown,
            RowOrderArg::BottomUp => RowOrder::BottomUp,
        }
    }
}
