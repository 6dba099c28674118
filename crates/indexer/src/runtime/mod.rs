//! Runtime module — process lifecycle: boot, run the job, shutdown.

pub mod boot;
pub mod job;
pub mod stop;
