pub mod agenda;
pub mod appointment_form;
pub mod notice;
pub mod reports;

pub use agenda::*;
pub use appointment_form::*;
pub use notice::*;
pub use reports::*;
