pub mod form;
pub mod generation;
pub mod language;
pub mod user;
