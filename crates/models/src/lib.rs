pub mod errors;
pub mod item;

pub use item::{Item, ItemFields};
