//! Reading spreadsheet files and assembling batches.
//!
//! - [`excel::read_document`] loads a spreadsheet file into a [`crate::types::Document`]
//! - [`discover::discover_batch`] walks a base directory and returns its spreadsheets as a batch

pub mod discover;
pub mod excel;

pub use discover::discover_batch;
pub use excel::read_document;
