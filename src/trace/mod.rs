//! Inference trace: which rules matter right now and how to show them.
//!
//! - [`relevant_rules`] / [`group_by_category`] pick and order rules
//! - [`TraceView`] projects rules and working memory into display state
//! - [`text`] formats views for the terminal

mod relevance;
pub mod text;
mod view;

pub use relevance::*;
pub use view::*;
