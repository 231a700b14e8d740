//! Diagnostic creation, severity management, and text rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with a severity,
//! a tier-prefixed code, and an optional subject component. The thread-safe
//! [`DiagnosticSink`] accumulates diagnostics while a document is decoded and
//! validated, so a single pass reports everything that is wrong; the
//! [`DiagnosticRenderer`] implementations format them for a terminal.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
