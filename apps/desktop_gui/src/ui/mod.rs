pub mod app;
pub mod fonts;
