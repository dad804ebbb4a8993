pub mod enums;
pub mod entity;
pub mod page;
pub mod report;

pub use entity::*;
pub use enums::*;
pub use page::*;
pub use report::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value for {field}: {value:?}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}
