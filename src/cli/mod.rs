pub mod ask;
pub mod setup;
pub mod ui;
