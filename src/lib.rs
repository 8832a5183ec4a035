pub mod audio;
pub mod config;
pub mod player;
pub mod settings;
pub mod sine;
pub mod utils;
