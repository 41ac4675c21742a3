//! Core library for the estate portal back office.
//!
//! The portal's back office is a set of request-scoped workflows over a
//! partner directory. This crate holds the workflow logic, the collaborator
//! seams (directory, mail transport), configuration, and telemetry; the
//! `services/api` binary wires everything to axum and the command line.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
