//! The card gesture state machine and the transforms derived from it.
//!
//! Everything here is pure: the deck owns a [`Phase`] and asks
//! [`transform`] how to draw the top card. Time only moves when the deck is
//! ticked, so the animation is driven by whoever renders it.

use std::{ops::Add, time::Duration};

use named_core::name::Decision;

/// Horizontal travel past which a release commits a decision.
pub const COMMIT_THRESHOLD: f32 = 120.0;
/// Horizontal travel over which a decision label fades fully in.
pub const LABEL_RAMP: f32 = 150.0;
/// Card tilt at half a canvas width of travel.
pub const MAX_ROTATION_DEG: f32 = 10.0;
/// How far past the canvas edge a committed card is thrown.
pub const OFF_CANVAS_MARGIN: f32 = 100.0;
/// Scale of the card waiting underneath the top card.
pub const NEXT_CARD_REST_SCALE: f32 = 0.9;

pub const COMMIT_DURATION: Duration = Duration::from_millis(300);
pub const SETTLE_DURATION: Duration = Duration::from_millis(150);

/// Card displacement from its resting position, in canvas points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offset {
  pub dx: f32,
  pub dy: f32,
}

impl Offset {
  pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

  pub fn new(dx: f32, dy: f32) -> Self { Self { dx, dy } }

  fn lerp(self, to: Self, t: f32) -> Self {
    Self { dx: lerp(self.dx, to.dx, t), dy: lerp(self.dy, to.dy, t) }
  }
}

impl Add for Offset {
  type Output = Self;

  fn add(self, rhs: Self) -> Self { Self { dx: self.dx + rhs.dx, dy: self.dy + rhs.dy } }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
  pub canvas_width: f32,
}

impl Default for Geometry {
  fn default() -> Self { Self { canvas_width: 390.0 } }
}

impl Geometry {
  /// Where a committed card ends up.
  pub fn exit_offset(&self, decision: Decision) -> Offset {
    let dx = self.canvas_width + OFF_CANVAS_MARGIN;
    match decision {
      Decision::Yes => Offset::new(dx, 0.0),
      Decision::No => Offset::new(-dx, 0.0),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
  Resting,
  Dragging { offset: Offset },
  /// The top card is leaving; input is locked until it is gone.
  Committing { decision: Decision, from: Offset, elapsed: Duration },
  /// A released card springing back to rest.
  Settling { from: Offset, elapsed: Duration },
}

impl Phase {
  pub fn is_committing(&self) -> bool { matches!(self, Self::Committing { .. }) }

  /// Where the top card currently sits.
  pub fn offset(&self, geometry: &Geometry) -> Offset {
    match *self {
      Self::Resting => Offset::ZERO,
      Self::Dragging { offset } => offset,
      Self::Committing { decision, from, elapsed } => {
        from.lerp(geometry.exit_offset(decision), progress(elapsed, COMMIT_DURATION))
      }
      Self::Settling { from, elapsed } => from.lerp(Offset::ZERO, progress(elapsed, SETTLE_DURATION)),
    }
  }
}

/// What a release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
  Commit(Decision),
  Settle,
  /// No drag was in progress.
  Ignored,
}

/// Release policy: past the threshold in either direction commits.
pub fn release_decision(offset: Offset) -> Option<Decision> {
  if offset.dx > COMMIT_THRESHOLD {
    Some(Decision::Yes)
  } else if offset.dx < -COMMIT_THRESHOLD {
    Some(Decision::No)
  } else {
    None
  }
}

/// How to draw the top card and the one beneath it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
  pub translate_x:          f32,
  pub translate_y:          f32,
  pub rotation_deg:         f32,
  pub opacity:              f32,
  pub accept_label_opacity: f32,
  pub reject_label_opacity: f32,
  pub next_card_scale:      f32,
}

impl Default for CardTransform {
  fn default() -> Self {
    Self {
      translate_x:          0.0,
      translate_y:          0.0,
      rotation_deg:         0.0,
      opacity:              1.0,
      accept_label_opacity: 0.0,
      reject_label_opacity: 0.0,
      next_card_scale:      NEXT_CARD_REST_SCALE,
    }
  }
}

pub fn transform(phase: &Phase, geometry: &Geometry) -> CardTransform {
  let offset = phase.offset(geometry);
  let (opacity, next_card_scale) = match *phase {
    Phase::Committing { elapsed, .. } => {
      let t = progress(elapsed, COMMIT_DURATION);
      (1.0 - t, lerp(NEXT_CARD_REST_SCALE, 1.0, t))
    }
    _ => (1.0, NEXT_CARD_REST_SCALE),
  };

  let half_width = (geometry.canvas_width / 2.0).max(f32::EPSILON);
  CardTransform {
    translate_x: offset.dx,
    translate_y: offset.dy,
    rotation_deg: (offset.dx / half_width * MAX_ROTATION_DEG)
      .clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG),
    opacity,
    accept_label_opacity: (offset.dx / LABEL_RAMP).clamp(0.0, 1.0),
    reject_label_opacity: (-offset.dx / LABEL_RAMP).clamp(0.0, 1.0),
    next_card_scale,
  }
}

fn progress(elapsed: Duration, total: Duration) -> f32 {
  (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 { from + (to - from) * t }
