//! Animation-duration inference for SMIL-animated SVG documents.
//!
//! A single synchronous pass over the document: structural parse, canvas
//! dimension extraction, directive enumeration, per-directive timing
//! resolution, and a reduction of all timing windows into one
//! [`AnalysisResult`] that tells the caller how long a capture must run.

pub mod analyze;
pub mod clock;
pub mod directive;

pub use analyze::{AnalysisResult, CanvasDimensions, analyze_svg};
pub use directive::{AnimationDirective, DirectiveKind, TimingWindow, resolve_window};
