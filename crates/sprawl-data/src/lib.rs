pub mod loader;
pub mod presets;
pub mod schema;

pub use loader::{load_game_data, DataLoadError, GameData};
pub use presets::builtin_catalog;
