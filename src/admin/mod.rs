pub mod cards;
pub mod repo;
pub mod stats;
pub mod users;

pub use cards::CardManager;
pub use stats::{AdminStats, StatisticsReport};
pub use users::{UserEditor, UserManager};
