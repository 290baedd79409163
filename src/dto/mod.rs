pub mod scoreboard;
pub mod setup;
pub mod validation;
