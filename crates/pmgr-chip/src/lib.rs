//! Silicon model for the SoC Power Manager (PMGR) block.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the silicon: register strides, device flag bits, the
//! config-register base layouts and the boot clock descriptor encoding.
//!
//! Everything here was reverse-engineered from firmware hardware
//! descriptions and live register dumps. Values that have not been
//! cross-checked on hardware are marked `// unverified`.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`regs`] | Control / power-state register strides, device flag bits |
//! | [`layout`] | Per-variant config-register base layout (4 control blocks) |
//! | [`bootclk`] | Boot clock descriptor tags and payload encoding |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bootclk;
pub mod layout;
pub mod regs;
