pub mod appointment;
pub mod calendar;
pub mod common;
pub mod report;
pub mod workbook;

pub use appointment::*;
pub use calendar::*;
pub use common::*;
pub use report::*;
pub use workbook::*;
