pub mod envelope;
pub mod solver_client;

pub use envelope::{decode_envelope, error_descriptor};
pub use solver_client::{SolverClient, TaskStatus};
