pub mod dashboard;
pub mod directory;
pub mod dto;
pub mod form;
pub mod repo;
pub mod resolver;

pub use dashboard::Dashboard;
pub use directory::{Directory, Viewer};
pub use form::{CardForm, FormMode};
pub use resolver::{CardDetailView, CardRoute};
