//! Child process abstraction so every step's exit status is observable in tests

mod mock;
mod runner;

pub use mock::MockProcessRunner;
pub use runner::{Invocation, Outcome, ProcessRunner, TokioProcessRunner};
