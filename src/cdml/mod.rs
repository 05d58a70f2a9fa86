//! CDML, the XML drawing format: reading into and writing out of a
//! [`Document`](crate::Document).
//!
//! Every element is checked against [`schema`] before it is interpreted.
//! Coordinates go through [`units`].

mod error;
mod reader;
pub mod schema;
pub mod units;
mod writer;

pub use error::CdmlError;
pub(crate) use reader::read_into;
pub(crate) use writer::write;

pub const CDML_VERSION: &str = "26.0";
pub const CDML_NAMESPACE: &str = "http://www.freesoftware.fsf.org/bkchem/cdml";
