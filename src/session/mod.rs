pub mod game;
pub mod input;
pub mod result;
pub mod word;
