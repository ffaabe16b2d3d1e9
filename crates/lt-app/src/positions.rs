//! Random node placement for simulator ini files.
//!
//! Nodes are dropped uniformly in angle and radius inside a disc around the
//! gateway, which clusters them towards the centre. The output lines are
//! meant to be pasted into the simulation's `omnetpp.ini`.

use std::f64::consts::TAU;

use lt_core::{Length, m};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uom::si::length::meter;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub center_x: Length,
    pub center_y: Length,
    pub max_radius: Length,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            center_x: m(100.0),
            center_y: m(100.0),
            max_radius: m(100.0),
        }
    }
}

impl Placement {
    pub fn new(center_x: Length, center_y: Length, max_radius: Length) -> AppResult<Self> {
        let placement = Self {
            center_x,
            center_y,
            max_radius,
        };
        placement.validate()?;
        Ok(placement)
    }

    /// The radius must be finite and non-negative, the centre finite.
    pub fn validate(&self) -> AppResult<()> {
        let radius = self.max_radius.get::<meter>();
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(AppError::InvalidInput(format!(
                "radius must be a non-negative number, got {}",
                radius
            )));
        }
        let (x, y) = (self.center_x.get::<meter>(), self.center_y.get::<meter>());
        if !(x.is_finite() && y.is_finite()) {
            return Err(AppError::InvalidInput(format!(
                "centre must be finite, got ({}, {})",
                x, y
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x_m: f64,
    pub y_m: f64,
}

/// Callers validate `placement` first; `gen_range` panics on an empty range.
fn random_position<R: Rng>(rng: &mut R, placement: &Placement) -> Position {
    let angle = rng.gen_range(0.0..TAU);
    let length = rng.gen_range(0.0..=placement.max_radius.get::<meter>());
    Position {
        x_m: angle.sin() * length + placement.center_x.get::<meter>(),
        y_m: angle.cos() * length + placement.center_y.get::<meter>(),
    }
}

/// `count` positions; a fixed seed gives a reproducible layout.
pub fn generate_positions(
    count: usize,
    placement: &Placement,
    seed: Option<u64>,
) -> AppResult<Vec<Position>> {
    placement.validate()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok((0..count)
        .map(|_| random_position(&mut rng, placement))
        .collect())
}

pub fn ini_lines(positions: &[Position]) -> Vec<String> {
    let mut lines = Vec::with_capacity(positions.len() * 2);
    for (node, p) in positions.iter().enumerate() {
        lines.push(format!("**.loRaNodes[{}].**.initialX = {:.2}m", node, p.x_m));
        lines.push(format!("**.loRaNodes[{}].**.initialY = {:.2}m", node, p.y_m));
    }
    lines
}
