//! Display structures for the presentation layer
//!
//! Outputs are plain serde-serializable data; rendering is left to callers.

pub mod chart;
pub mod tree;

pub use chart::{build_chart, chart_from_counts, ChartData, ChartEntry, ChartOptions};
pub use tree::{build_display_tree, DisplayTree, TreeNode};
