#![warn(clippy::pedantic)]

//! Installation engine for the go-install toolchain installer.
//!
//! The engine resolves a Go version against the upstream release catalog,
//! makes sure the host has the prerequisites to use it, and then downloads,
//! verifies, unpacks and wires the toolchain into the user's shell.
//!
//! ## Structure
//!
//! - [`session::Session`] is a pure state machine. It consumes [`event::Event`]s
//!   and answers each with one [`event::Command`].
//! - [`effects::Effects`] performs commands against the host and turns each
//!   into exactly one event. [`effects::HostEffects`] is the real implementation.
//! - [`driver::run`] connects the two for sequential frontends.
//!
//! The leaf modules ([`catalog`], [`select`], [`deps`], [`download`],
//! [`verify`], [`extract`], [`shell`]) hold the individual operations and can
//! be used on their own.

pub mod catalog;
pub mod config;
pub mod deps;
pub mod download;
pub mod driver;
pub mod effects;
pub mod error;
pub mod event;
pub mod extract;
pub mod pipeline;
pub mod platform;
pub mod select;
pub mod session;
pub mod shell;
pub mod verify;

pub use config::InstallerConfig;
pub use error::InstallError;
pub use event::{Command, Event, Input, InstallReport, Prompt, SessionOutcome};
pub use session::{Session, SessionState};
