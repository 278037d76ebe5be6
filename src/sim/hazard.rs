//! Track-anchored hazards
//!
//! Every hazard lives in track space: an anchor `(t, lateral)` plus half
//! extents across the track (world units) and along it (track fraction).
//! Keeping the longitudinal extent as a fraction makes the hit test
//! independent of how finely the curve was sampled.

use serde::{Deserialize, Serialize};

use super::state::HazardId;

/// Hazard variants and their kind-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HazardKind {
    /// Low crate; can be jumped
    Obstacle { clearance: f64 },
    /// Tall trunk; needs a big jump to clear
    Tree { clearance: f64 },
    /// Wedge rising from 0 at its front edge to `height` at its back edge
    Ramp {
        front_width: f64,
        back_width: f64,
        height: f64,
    },
    /// `inside` is held while the car is on the pad
    TurboPad {
        boost_speed: f64,
        duration: f64,
        inside: bool,
    },
    /// `launched` is held while the car is on the pad
    Trampoline { launch_velocity: f64, launched: bool },
    LavaZone,
    MudZone { max_speed: f64 },
    Collectible { collected: bool },
    StarItem { duration: f64, collected: bool },
}

impl HazardKind {
    pub fn name(&self) -> &'static str {
        match self {
            HazardKind::Obstacle { .. } => "obstacle",
            HazardKind::Tree { .. } => "tree",
            HazardKind::Ramp { .. } => "ramp",
            HazardKind::TurboPad { .. } => "turbo pad",
            HazardKind::Trampoline { .. } => "trampoline",
            HazardKind::LavaZone => "lava",
            HazardKind::MudZone { .. } => "mud",
            HazardKind::Collectible { .. } => "collectible",
            HazardKind::StarItem { .. } => "star",
        }
    }

    /// Things worth driving into
    pub fn is_bonus(&self) -> bool {
        match self {
            HazardKind::TurboPad { .. } => true,
            HazardKind::Collectible { collected } | HazardKind::StarItem { collected, .. } => {
                !collected
            }
            _ => false,
        }
    }

    /// Things the car should steer around
    pub fn is_threat(&self) -> bool {
        matches!(
            self,
            HazardKind::Obstacle { .. }
                | HazardKind::Tree { .. }
                | HazardKind::LavaZone
                | HazardKind::MudZone { .. }
        )
    }
}

/// A single hazard placed on the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    /// Anchor fraction along the track
    pub t: f64,
    /// Anchor offset from the centreline
    pub lateral: f64,
    /// Half extent across the track (world units)
    pub lateral_half: f64,
    /// Half extent along the track (fraction of total length)
    pub progress_half: f64,
    pub kind: HazardKind,
}

impl Hazard {
    pub fn new(
        id: HazardId,
        t: f64,
        lateral: f64,
        lateral_half: f64,
        progress_half: f64,
        kind: HazardKind,
    ) -> Self {
        Self {
            id,
            t,
            lateral,
            lateral_half,
            progress_half,
            kind,
        }
    }

    /// Rectangle test in (lateral, progress) space against the car's half extents
    #[inline]
    pub fn overlaps(
        &self,
        progress: f64,
        lateral: f64,
        car_lateral_half: f64,
        car_progress_half: f64,
    ) -> bool {
        (lateral - self.lateral).abs() < car_lateral_half + self.lateral_half
            && (progress - self.t).abs() < car_progress_half + self.progress_half
    }

    /// Position through the ramp's span: 0 at the front edge, 1 at the lip
    ///
    /// `None` outside the span or for non-ramp hazards.
    pub fn ramp_fraction(&self, progress: f64) -> Option<f64> {
        if !matches!(self.kind, HazardKind::Ramp { .. }) || self.progress_half <= 0.0 {
            return None;
        }
        let frac = (progress - self.t) / (self.progress_half * 2.0) + 0.5;
        (0.0..=1.0).contains(&frac).then_some(frac)
    }

    /// Ramp surface height under the car, if the car is on this ramp
    pub fn ramp_contact(&self, progress: f64, lateral: f64, car_lateral_half: f64) -> Option<RampContact> {
        let HazardKind::Ramp {
            front_width,
            back_width,
            height,
        } = self.kind
        else {
            return None;
        };
        let fraction = self.ramp_fraction(progress)?;
        let width = front_width + (back_width - front_width) * fraction;
        if (lateral - self.lateral).abs() > car_lateral_half + width * 0.5 {
            return None;
        }
        Some(RampContact {
            fraction,
            height: height * fraction,
        })
    }

    /// Reset per-race one-shot state
    pub fn reset(&mut self) {
        match &mut self.kind {
            HazardKind::Trampoline { launched, .. } => *launched = false,
            HazardKind::TurboPad { inside, .. } => *inside = false,
            HazardKind::Collectible { collected } | HazardKind::StarItem { collected, .. } => {
                *collected = false
            }
            _ => {}
        }
    }
}

/// Where the car sits on a ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampContact {
    pub fraction: f64,
    /// Surface height at the car
    pub height: f64,
}

/// All hazards of the loaded level, in declaration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HazardField {
    hazards: Vec<Hazard>,
}

impl HazardField {
    pub fn new(hazards: Vec<Hazard>) -> Self {
        Self { hazards }
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Hazard> {
        self.hazards.iter_mut()
    }

    pub fn get(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id)
    }

    pub fn ramps(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards
            .iter()
            .filter(|h| matches!(h.kind, HazardKind::Ramp { .. }))
    }

    /// Hazards whose anchor lies in `(progress, progress + window]`, nearest first
    pub fn ahead(&self, progress: f64, window: f64) -> Vec<&Hazard> {
        let mut ahead: Vec<_> = self
            .hazards
            .iter()
            .filter(|h| h.t + h.progress_half > progress && h.t - progress <= window)
            .collect();
        ahead.sort_by(|a, b| a.t.total_cmp(&b.t));
        ahead
    }

    /// Number of pickups still on the track
    pub fn remaining_pickups(&self) -> usize {
        self.hazards
            .iter()
            .filter(|h| {
                matches!(
                    h.kind,
                    HazardKind::Collectible { collected: false }
                        | HazardKind::StarItem {
                            collected: false,
                            ..
                        }
                )
            })
            .count()
    }

    /// Clear `collected`/`launched`/`inside` on every hazard (race restart)
    pub fn reset(&mut self) {
        for hazard in &mut self.hazards {
            hazard.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Hazard {
        Hazard::new(
            0,
            0.5,
            0.0,
            2.0,
            0.01,
            HazardKind::Ramp {
                front_width: 4.0,
                back_width: 2.0,
                height: 2.0,
            },
        )
    }

    #[test]
    fn test_overlap_rectangle() {
        let crate_box = Hazard::new(1, 0.3, 2.0, 0.8, 0.001, HazardKind::Obstacle { clearance: 0.84 });
        assert!(crate_box.overlaps(0.3, 0.5, 1.2, 0.002));
        // Beside it
        assert!(!crate_box.overlaps(0.3, -0.1, 1.2, 0.002));
        // Behind it
        assert!(!crate_box.overlaps(0.296, 2.0, 1.2, 0.002));
        // Edge is exclusive
        assert!(!crate_box.overlaps(0.3, 0.0, 1.2, 0.002));
    }

    #[test]
    fn test_ramp_fraction_span() {
        let ramp = ramp();
        assert!(ramp.ramp_fraction(0.4901).unwrap() < 0.01);
        assert!((ramp.ramp_fraction(0.5).unwrap() - 0.5).abs() < 1e-9);
        assert!(ramp.ramp_fraction(0.48).is_none());
        assert!(ramp.ramp_fraction(0.52).is_none());
    }

    #[test]
    fn test_ramp_contact_narrows_toward_lip() {
        let ramp = ramp();
        // Front: width 4, accepts |dx| <= 1.2 + 2.0
        let front = ramp.ramp_contact(0.4901, 3.1, 1.2).unwrap();
        assert!(front.height < 0.05);
        // Near the lip the ramp is only 2 wide: |dx| <= 2.2
        assert!(ramp.ramp_contact(0.5099, 3.1, 1.2).is_none());
        let lip = ramp.ramp_contact(0.5099, 0.0, 1.2).unwrap();
        assert!(lip.height > 1.9 && lip.height <= 2.0);
    }

    #[test]
    fn test_non_ramp_has_no_contact() {
        let mud = Hazard::new(2, 0.5, 0.0, 2.0, 0.01, HazardKind::MudZone { max_speed: 18.0 });
        assert!(mud.ramp_fraction(0.5).is_none());
        assert!(mud.ramp_contact(0.5, 0.0, 1.2).is_none());
    }

    #[test]
    fn test_reset_clears_one_shots() {
        let mut field = HazardField::new(vec![
            Hazard::new(0, 0.2, 0.0, 1.0, 0.001, HazardKind::Collectible { collected: true }),
            Hazard::new(
                1,
                0.4,
                0.0,
                1.0,
                0.001,
                HazardKind::StarItem {
                    duration: 6.0,
                    collected: true,
                },
            ),
            Hazard::new(
                2,
                0.6,
                0.0,
                1.0,
                0.001,
                HazardKind::Trampoline {
                    launch_velocity: 18.0,
                    launched: true,
                },
            ),
        ]);
        assert_eq!(field.remaining_pickups(), 0);
        field.reset();
        assert_eq!(field.remaining_pickups(), 2);
        assert!(matches!(
            field.get(2).unwrap().kind,
            HazardKind::Trampoline { launched: false, .. }
        ));
    }

    #[test]
    fn test_ahead_sorted_and_windowed() {
        let field = HazardField::new(vec![
            Hazard::new(0, 0.30, 0.0, 1.0, 0.001, HazardKind::LavaZone),
            Hazard::new(1, 0.22, 0.0, 1.0, 0.001, HazardKind::LavaZone),
            Hazard::new(2, 0.10, 0.0, 1.0, 0.001, HazardKind::LavaZone),
            Hazard::new(3, 0.50, 0.0, 1.0, 0.001, HazardKind::LavaZone),
        ]);
        let ids: Vec<_> = field.ahead(0.2, 0.12).iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 0]);
    }
}
