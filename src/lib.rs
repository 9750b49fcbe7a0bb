pub mod app;
pub mod model;
pub mod report;

pub use app::App;
pub use model::world::{World, WorldState};
