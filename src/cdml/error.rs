use std::string::FromUtf8Error;

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use crate::mol::GraphError;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum CdmlError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("invalid escape sequence: {0}")]
    Escape(#[from] EscapeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("root element is <{0}>, expected <cdml>")]
    NotCdml(String),
    #[error("document has no root element")]
    Empty,
    #[error("<{element}> lacks required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("<{element}> has invalid {attribute}=\"{value}\"")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
}
