pub mod bean {
    pub use beans_core::bean::*;
}
pub mod collision {
    pub use beans_core::collision::*;
}
pub mod config {
    pub use beans_core::config::*;
}
pub mod dynamics {
    pub use beans_core::dynamics::*;
}
pub mod energy {
    pub use beans_core::energy::*;
}
pub mod environment {
    pub use beans_core::environment::*;
}
pub mod food {
    pub use beans_core::food::*;
    pub use beans_data::{FoodCell, FoodType, GridPos};
}
pub mod genetics {
    pub use beans_core::genetics::*;
}
pub mod placement {
    pub use beans_core::placement::*;
}
pub mod population {
    pub use beans_core::population::*;
}
pub mod survival {
    pub use beans_core::survival::*;
}

pub mod state {
    pub use beans_data::*;
}

pub mod world;
