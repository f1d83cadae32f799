pub mod currency;
pub mod time;
pub mod validation;

pub use currency::*;
pub use time::*;
pub use validation::*;
