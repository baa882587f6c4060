//! Board-agnostic stepper motion execution core for the Cadence motion
//! controller
//!
//! This crate is the hard real-time half of a 3-axis-plus-extruder motion
//! controller: it consumes pre-planned motion blocks and turns them into
//! coordinated step pulses inside a periodic timer interrupt. Everything
//! hardware-specific stays behind traits so the same core runs under a
//! firmware interrupt or a host-side test harness.
//!
//! - Motion blocks and the planner-shared SPSC block ring
//! - Integer-only hot-path math: rate tables, trapezoid generator,
//!   Bresenham interpolator
//! - Endstop debouncing, truncation, and the audible alarm
//! - The interrupt body and the synchronous control surface
//! - The extrusion valve governor
//! - Hardware seams (pins, switches, timer, system glue)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod endstop;
pub mod motion;
pub mod stepper;
pub mod traits;
pub mod valve;
