pub mod bank;
pub mod person;

pub use bank::Bank;
pub use person::{activate, Person, WealthClass};
