//! # tracelens Shim
//!
//! Runs cells of code and, when one fails, shows its trace together with an
//! explanation fetched from the analyze endpoint.

pub mod client;
pub mod error;
pub mod executor;
pub mod kernel;
pub mod render;
pub mod session;
pub mod shim;

pub use client::EndpointClient;
pub use error::{ShimError, ShimResult};
pub use executor::{ExecutionOutcome, Executor, ProcessExecutor};
pub use kernel::KernelExecutor;
pub use session::CellReader;
pub use shim::CaptureShim;
