//! In-memory tabular data for the modelgate pipeline.
//!
//! A [`Frame`] is a set of named, typed columns of equal length. Frames are
//! built from fetched documents against a [`DatasetSchema`], split
//! deterministically into train/test partitions, and persisted as CSV so a
//! run's intermediate data stays inspectable on disk.
//!
//! [`DatasetSchema`]: modelgate_schema::DatasetSchema

mod error;
mod frame;
mod persist;
mod split;

pub use error::FrameError;
pub use frame::{Cell, Column, Frame};
pub use split::train_test_split;
