//! # colorcraft
//!
//! A runtime-extensible color engine implementing CSS Color Module Levels 4
//! and 5. It parses textual color notations, converts between color models
//! through a shortest-path graph of registered converters, performs gamut
//! mapping, manipulates components, mixes colors, and computes perceptual
//! difference.
//!
//! ## 1. Overview
//!
//! Colorcraft's main abstractions are:
//!
//!   * [`Registry`] holds the process-wide, mutable tables of color types,
//!     color bases, color functions (models), color spaces, named colors,
//!     and gamut-fit methods. It is reachable through [`registry()`] and
//!     mutated only through its `register_*`/`unregister` methods.
//!   * [`Color`] pairs a registered model name with four coordinates (three
//!     components plus alpha) and exposes conversion, mixing, gamut testing,
//!     contrast, and color-difference operations.
//!   * [`Configuration`] is the ambient, external collaborator that supplies
//!     a light/dark theme, a system-color table, and a default fit method —
//!     see [`configure`].
//!
//! This crate's conversion matrices and transfer functions are sourced, like
//! the teacher crate's, from Lea Verou's and Chris Lilley's
//! [Color.js](https://colorjs.io) library and the [CSS Color
//! 4](https://www.w3.org/TR/css-color-4/) and [CSS Color
//! 5](https://www.w3.org/TR/css-color-5/) specifications.
//!
//! ## 2. Optional features
//!
//!   - **`f64`** selects the eponymous type as floating point type [`Float`]
//!     and `u64` as [`Bits`] instead of `f32` as [`Float`] and `u32` as
//!     [`Bits`]. This feature is enabled by default.

/// The floating point type in use.
#[cfg(feature = "f64")]
pub type Float = f64;
/// The floating point type in use.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

/// [`Float`]'s bits.
#[cfg(feature = "f64")]
pub type Bits = u64;
/// [`Float`]'s bits.
#[cfg(not(feature = "f64"))]
pub type Bits = u32;

mod bases;
mod builtins;
pub mod calc;
pub mod color;
pub mod config;
mod core;
pub mod difference;
pub mod error;
pub mod expr;
pub mod gamut;
pub mod graph;
pub mod model;
pub mod parse;
pub mod plugin;
pub mod registry;

pub use color::{Color, MixOptions, RandomOptions};
pub use config::{configure, Configuration, Theme};
pub use difference::{Easing, HueInterpolation};
pub use error::Error;
pub use model::{
    ColorConverter, ColorModelConverter, ColorSpaceConverter, ComponentDefinition, ValueKind,
};
pub use plugin::apply_plugins;
pub use registry::{registry, Registry};
