pub mod amount;
pub mod canonical;
pub mod model;

pub use amount::{Amount, AmountParseError};
pub use model::Transaction;
