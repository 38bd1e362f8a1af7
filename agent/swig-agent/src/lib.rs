//! Natural-language front end for Swig multi-authority wallets.
//!
//! A message flows through one engine ([`pipeline::Agent`]): entities are
//! extracted, the caller's authority on their wallet is resolved, a
//! transaction is composed, signed with the caller's key and confirmed, and
//! a single [`respond::Response`] is returned.

pub mod composer;
pub mod config;
pub mod error;
pub mod extract;
pub mod intent;
pub mod operations;
pub mod pipeline;
pub mod resolver;
pub mod respond;
pub mod submit;

pub use crate::config::{AgentConfig, EnvSettings, MapSettings, Settings};
pub use crate::error::{AgentError, Result};
pub use crate::operations::{Category, OperationKind};
pub use crate::pipeline::{select_operations, Agent, Message, Operation, OperationSet};
pub use crate::respond::Response;
