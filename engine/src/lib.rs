pub mod types;
pub mod grid;
pub mod cards;
pub mod lobby;
pub mod setup;
pub mod engine;


pub use types::*;
pub use grid::Hex;
pub use cards::{CardId, CardState};
