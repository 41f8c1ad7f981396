pub mod cli;
pub mod handlers;
pub mod lookup;

pub use handlers::{AppState, router};
pub use lookup::{DEFAULT_SAMPLE_SIZE, Estimate, Lookup};
