//! Fetch, stage and report pipeline behind the `resultsnap` binary.
//!
//! Data flows one way: [`fetcher`] turns a hall ticket into a record,
//! [`runner`] fans tickets out over a bounded pool and appends every outcome
//! to the [`staging`] log, [`refresher`] rebuilds the workbook from that log
//! in the background, and [`report`] produces the final spreadsheet.
//! [`pipeline`] wires one run together.

pub mod fetcher;
pub mod pipeline;
pub mod refresher;
pub mod report;
pub mod runner;
pub mod staging;

pub use pipeline::{Pipeline, PipelineReport};
