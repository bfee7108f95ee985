//! # usher-core
//!
//! The identity-provisioning engine behind the `ushr` entrypoint.
//!
//! This crate provides the stages of the container-start pipeline:
//! - **Environment parsing**: `LOCAL_USER_ID`-family variables into an
//!   [`usher_common::types::IdentityRequest`].
//! - **Identity store**: repository abstraction over `/etc/passwd` and
//!   `/etc/group`, with file-backed and in-memory implementations.
//! - **Provisioning**: idempotent lookup-or-create of the requested
//!   user/group, including the home directory.
//! - **Privilege drop**: irreversible transition to the target UID/GID.
//! - **Exec**: replacement of the process image with the workload.
//!
//! All stages are blocking and run exactly once per container start; any
//! failure aborts the start. Nothing here retries: restart policy belongs
//! to the orchestrator that launched the container.

pub mod entry;
pub mod env;
pub mod exec;
pub mod privilege;
pub mod provision;
pub mod store;
