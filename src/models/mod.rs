pub mod credential;
pub mod job_spec;
pub mod loaders;
pub mod outcome;

pub use credential::Credential;
pub use job_spec::{CustomClass, JobKind, JobSpec, ParamValue, ProxyDescriptor, ProxyType};
pub use loaders::{load_job_batch, parse_job_batch};
pub use outcome::{ErrorDescriptor, FanOutResult, FanOutSlot, JobHandle, PollOutcome};
