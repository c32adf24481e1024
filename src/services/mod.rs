pub mod job_client;
pub mod poll_loop;
pub mod progress;
pub mod session_store;
pub mod task_mapping;

pub use job_client::JobClient;
pub use poll_loop::{ExponentialBackoff, FixedInterval, IntervalStrategy, PollLoop, PollPolicy};
pub use progress::{HeuristicProgress, ProgressReporter};
pub use session_store::{InMemorySessionStore, SessionStore};
pub use task_mapping::to_wire_task;
