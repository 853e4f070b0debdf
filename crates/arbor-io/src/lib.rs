//! Dataset loading for arbor: delimited text in, encoded [`arbor_forest::Dataset`] out.

mod encode;
mod error;
mod reader;

pub use encode::LabelEncoder;
pub use error::IoError;
pub use reader::{DatasetReader, LabeledDataset};
