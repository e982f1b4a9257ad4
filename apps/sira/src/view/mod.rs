pub mod controller;
pub mod model;

pub use controller::{Completion, ViewController, ViewState};
pub use model::View;
