//! Ground-level structures.

use rand::RngCore;

use super::{BestCandidate, FitContext, FitStrategy, PlacementCandidate, MIN_SCORE};
use crate::generation::terrain_scan::{self, ScanKind};
use crate::generation::topology;
use crate::template::Template;
use crate::voxel::{Environment, Location};

/// Combined score that ends the search early
pub const GOOD_ENOUGH_SCORE: f64 = 50.0;

/// Block offsets probed when the center is not good enough: west, east,
/// north, south at one chunk, then at two chunks
const FAN_OUT: [(f64, f64); 8] = [
    (-16.0, 0.0),
    (16.0, 0.0),
    (0.0, -16.0),
    (0.0, 16.0),
    (-32.0, 0.0),
    (32.0, 0.0),
    (0.0, -32.0),
    (0.0, 32.0),
];

/// Surface placement: flat ground first, then how well the template sits in
/// it. The combined score is `topology + 0.5 * adequacy`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceFit;

impl SurfaceFit {
    /// Score one location. The returned location is snapped to the mean
    /// surface when topology accepts the footprint.
    pub fn evaluate(&self, ctx: &FitContext<'_>, template: &Template, location: Location) -> PlacementCandidate {
        let starting_score = match ctx.environment() {
            Environment::Nether => 200.0,
            _ => 100.0,
        };

        let topology = topology::scan(ctx.world, starting_score, ctx.stride(), template, &location);
        if topology.is_rejected() {
            return PlacementCandidate {
                location,
                adequacy: 0.0,
                topology: 0.0,
                score: 0.0,
            };
        }

        let snapped = location.with_y(topology.anchor_y);
        let adequacy = terrain_scan::scan(ctx.world, template, &snapped, ctx.stride(), ScanKind::Surface);
        PlacementCandidate {
            location: snapped,
            adequacy,
            topology: topology.score,
            score: topology.score + 0.5 * adequacy,
        }
    }
}

impl FitStrategy for SurfaceFit {
    fn vertical_placement(&self, _ctx: &FitContext<'_>, base: Location, _rng: &mut dyn RngCore) -> Option<Location> {
        Some(base)
    }

    fn search(&self, ctx: &FitContext<'_>, template: &Template, start: Location) -> Option<PlacementCandidate> {
        let mut best = BestCandidate::new();
        best.offer(self.evaluate(ctx, template, start));
        if best.score() >= GOOD_ENOUGH_SCORE {
            return best.into_inner();
        }

        for (dx, dz) in FAN_OUT {
            let candidate = self.evaluate(ctx, template, start.offset_xz(dx, dz));
            if best.offer(candidate) && best.score() >= GOOD_ENOUGH_SCORE {
                break;
            }
        }
        best.into_inner()
    }

    fn accepts(&self, _ctx: &FitContext<'_>, candidate: &PlacementCandidate) -> bool {
        candidate.score > MIN_SCORE
    }
}
