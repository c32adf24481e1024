pub mod job_ctx;
pub mod solve_flow;

pub use job_ctx::JobCtx;
pub use solve_flow::SolveFlow;
