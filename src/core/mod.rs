pub mod logging;
pub mod recipe;
