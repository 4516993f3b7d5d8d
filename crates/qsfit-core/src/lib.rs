//! Spectral-parameter extraction for qubit spectroscopy sweeps.
//!
//! Given a 2D magnitude map (swept control parameter vs. readout frequency),
//! the pipeline extracts candidate resonance peaks from every frequency slice
//! and fits a parametric qubit-spectrum model to the resulting point cloud
//! with a coarse-to-fine brute-force grid search.

pub mod domain;
pub mod modules;
pub mod numerics;
pub mod progress;
pub mod spectra;
