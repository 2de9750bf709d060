//! Composition flag resolver.
//!
//! Turns a [`CompositionRequest`] into the elevation range and flags written back
//! to a segment. Resolution runs as a small state machine:
//!
//! `Unevaluated -> ElevationClamped -> FlagsComposed -> NoOpDetected | Changed`
//!
//! 1. The placement band clamps both elevation components (ground, then tunnel,
//!    then elevated; first match wins). Without a placement the band is read back
//!    from the elevation and existing flags through [`classify`].
//! 2. On ground, side upgrades clamp their side: retaining walls pull down, quays
//!    push up but stay below the elevated band.
//! 3. Flags are composed from the band and the upgrades. Replacing a side keeps its
//!    transit markers ([`SideFlags::CARRY_OVER`]); untargeted parts are kept as-is.
//!    Elevated segments carry no raised/lowered side flags.
//! 4. In replace mode, an existing composition that already satisfies the request
//!    and equals the result is returned untouched with `changed == false`.
//! 5. All-zero flags produce no composition marker.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::composition::{
    classify, CompositionFlags, CompositionRequest, DrawMode, ExistingComposition, GeneralBand,
    Placement, ReplaceTargets, Side, SideBand, SideFlags, SideUpgrades,
};
use crate::config::EngineConfig;
use crate::thresholds::ThresholdTable;

/// Progress of a single resolution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResolutionState {
    #[default]
    Unevaluated,
    ElevationClamped,
    FlagsComposed,
    /// The existing composition already matches; nothing to write.
    NoOpDetected,
    /// The result differs from what the segment carries.
    Changed,
}

impl ResolutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolutionState::NoOpDetected | ResolutionState::Changed
        )
    }
}

/// Everything the resolver needs for one segment.
#[derive(Clone, Copy, Debug)]
pub struct ResolveInput<'a> {
    pub request: &'a CompositionRequest,
    pub mode: DrawMode,
    /// Composition read from the target; only used in [`DrawMode::Replace`].
    pub existing: Option<&'a ExistingComposition>,
    /// Elevation selected in the tool, used as an extra bound for side upgrades.
    pub tool_elevation: f32,
    /// The segment's current elevation range `(left, right)`.
    pub elevation: Vec2,
}

impl<'a> ResolveInput<'a> {
    pub fn new(request: &'a CompositionRequest, mode: DrawMode, elevation: Vec2) -> Self {
        Self {
            request,
            mode,
            existing: None,
            tool_elevation: 0.0,
            elevation,
        }
    }

    pub fn with_existing(mut self, existing: Option<&'a ExistingComposition>) -> Self {
        self.existing = existing;
        self
    }

    pub fn with_tool_elevation(mut self, tool_elevation: f32) -> Self {
        self.tool_elevation = tool_elevation;
        self
    }
}

/// Result of resolving one segment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedOutput {
    /// Elevation range `(left, right)` to write.
    pub elevation: Vec2,
    /// Flags to write; `None` tells the host to drop its composition marker.
    pub composition: Option<CompositionFlags>,
    /// Whether elevation or flags differ from the existing composition.
    pub changed: bool,
    /// Terminal state reached.
    pub state: ResolutionState,
}

impl ResolvedOutput {
    /// Resolved flags, all-zero when no marker is written.
    pub fn flags(&self) -> CompositionFlags {
        self.composition.unwrap_or_default()
    }
}

/// Resolves the composition for one segment.
pub fn resolve(input: &ResolveInput<'_>, config: &EngineConfig) -> ResolvedOutput {
    let mut resolution = Resolution::new(input, config);
    resolution.clamp_elevation();
    resolution.compose_flags();
    resolution.finish()
}

struct Resolution<'a> {
    input: &'a ResolveInput<'a>,
    config: &'a EngineConfig,
    existing: Option<&'a ExistingComposition>,
    targets: ReplaceTargets,
    base: CompositionFlags,
    elevation: Vec2,
    band: GeneralBand,
    flags: CompositionFlags,
    state: ResolutionState,
}

impl<'a> Resolution<'a> {
    fn new(input: &'a ResolveInput<'a>, config: &'a EngineConfig) -> Self {
        let existing = match input.mode {
            DrawMode::Replace => {
                if input.existing.is_none() {
                    debug!("Replace without an existing composition; resolving as new.");
                }
                input.existing
            }
            DrawMode::Create | DrawMode::Grid => None,
        };
        let targets = if existing.is_some() {
            input.request.replace_targets()
        } else {
            ReplaceTargets::all()
        };
        let base = existing.map(|e| e.flags).unwrap_or_default();
        let elevation = existing.map_or(input.elevation, |e| e.elevation);

        Self {
            input,
            config,
            existing,
            targets,
            base,
            elevation,
            band: GeneralBand::Ground,
            flags: base,
            state: ResolutionState::Unevaluated,
        }
    }

    fn thresholds(&self) -> &ThresholdTable {
        &self.config.thresholds
    }

    fn clamp_elevation(&mut self) {
        debug_assert_eq!(self.state, ResolutionState::Unevaluated);

        let placement = if self.targets.general {
            self.input.request.placement()
        } else {
            None
        };
        match placement {
            Some(placement) => {
                self.elevation = clamp_to_placement(self.elevation, placement, self.thresholds());
                self.band = placement.into();
            }
            None => {
                self.band = classify(self.elevation, &self.base, self.thresholds()).general;
            }
        }

        if self.band == GeneralBand::Ground {
            for side in Side::BOTH {
                if !self.targets.side(side) {
                    continue;
                }
                let current = side.of(self.elevation);
                let value = self.clamp_side(current, self.input.request.side(side));
                side.set(&mut self.elevation, value);
            }
        }

        self.state = ResolutionState::ElevationClamped;
        trace!("Elevation clamped to {:?} ({:?}).", self.elevation, self.band);
    }

    fn clamp_side(&self, current: f32, upgrades: SideUpgrades) -> f32 {
        let thresholds = self.thresholds();
        let tool = self.input.tool_elevation;
        if upgrades.contains(SideUpgrades::RETAINING_WALL) {
            current.min(tool).min(thresholds.retaining_wall)
        } else if upgrades.contains(SideUpgrades::QUAY) {
            current
                .max(tool)
                .max(thresholds.quay)
                .clamp(thresholds.quay, self.config.quay_ceiling())
        } else {
            current
        }
    }

    fn compose_flags(&mut self) {
        debug_assert_eq!(self.state, ResolutionState::ElevationClamped);

        let request = self.input.request;
        if self.targets.general {
            self.flags.general = self.band.flags() | request.general().dressing_flags();
        }
        for side in Side::BOTH {
            if self.targets.side(side) {
                let carried = self.base.side(side) & SideFlags::CARRY_OVER;
                *self.flags.side_mut(side) = request.side(side).side_flags() | carried;
            }
        }
        if self.band == GeneralBand::Elevated {
            self.flags.left.remove(SideFlags::BAND);
            self.flags.right.remove(SideFlags::BAND);
        }

        self.state = ResolutionState::FlagsComposed;
        trace!("Flags composed: {:?}.", self.flags);
    }

    fn finish(mut self) -> ResolvedOutput {
        debug_assert_eq!(self.state, ResolutionState::FlagsComposed);

        if let Some(existing) = self.existing {
            let unchanged = self.satisfied_by(existing)
                && self.flags == existing.flags
                && self.elevation == existing.elevation;
            if unchanged {
                self.state = ResolutionState::NoOpDetected;
                debug!("Existing composition already matches the request.");
                return ResolvedOutput {
                    elevation: existing.elevation,
                    composition: marker(existing.flags),
                    changed: false,
                    state: self.state,
                };
            }
        }

        self.state = ResolutionState::Changed;
        ResolvedOutput {
            elevation: self.elevation,
            composition: marker(self.flags),
            changed: true,
            state: self.state,
        }
    }

    /// Whether the existing composition already sits in every requested band.
    fn satisfied_by(&self, existing: &ExistingComposition) -> bool {
        let classified = classify(existing.elevation, &existing.flags, self.thresholds());
        let request = self.input.request;

        if self.targets.general {
            if let Some(placement) = request.placement() {
                if classified.general != GeneralBand::from(placement) {
                    return false;
                }
            }
        }
        if classified.general != GeneralBand::Ground {
            return true;
        }

        Side::BOTH.into_iter().all(|side| {
            !self.targets.side(side)
                || requested_side_band(request.side(side))
                    .is_none_or(|wanted| classified.side(side) == wanted)
        })
    }
}

fn clamp_to_placement(elevation: Vec2, placement: Placement, thresholds: &ThresholdTable) -> Vec2 {
    match placement {
        Placement::Ground => Vec2::splat(thresholds.force_ground),
        Placement::Tunnel => elevation.min(Vec2::splat(thresholds.tunnel)),
        Placement::Elevated => elevation.max(Vec2::splat(thresholds.elevated)),
    }
}

fn requested_side_band(upgrades: SideUpgrades) -> Option<SideBand> {
    if upgrades.contains(SideUpgrades::RETAINING_WALL) {
        Some(SideBand::RetainingWall)
    } else if upgrades.contains(SideUpgrades::QUAY) {
        Some(SideBand::Quay)
    } else {
        None
    }
}

fn marker(flags: CompositionFlags) -> Option<CompositionFlags> {
    (!flags.is_empty()).then_some(flags)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::composition::{GeneralFlags, GeneralSelection};

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn create(request: &CompositionRequest, elevation: Vec2) -> ResolvedOutput {
        resolve(
            &ResolveInput::new(request, DrawMode::Create, elevation),
            &config(),
        )
    }

    fn replace(request: &CompositionRequest, existing: &ExistingComposition) -> ResolvedOutput {
        resolve(
            &ResolveInput::new(request, DrawMode::Replace, Vec2::ZERO).with_existing(Some(existing)),
            &config(),
        )
    }

    #[test]
    fn replacing_elevated_with_ground_forces_zero() {
        let existing = ExistingComposition::new(
            CompositionFlags::new(GeneralFlags::ELEVATED | GeneralFlags::LIGHTING, SideFlags::empty(), SideFlags::empty()),
            Vec2::splat(15.0),
        );
        let request = CompositionRequest::builder()
            .placement(Placement::Ground)
            .build();

        let output = replace(&request, &existing);
        assert_eq!(output.elevation, Vec2::ZERO);
        assert!(!output.flags().general.contains(GeneralFlags::ELEVATED));
        assert!(output.changed);
        assert_eq!(output.state, ResolutionState::Changed);
    }

    #[test]
    fn elevated_suppresses_side_walls_and_quays() {
        let request = CompositionRequest::builder()
            .placement(Placement::Elevated)
            .left(SideUpgrades::RETAINING_WALL | SideUpgrades::TREES)
            .right(SideUpgrades::QUAY)
            .build();

        let output = create(&request, Vec2::splat(2.0));
        let flags = output.flags();
        assert!(flags.general.contains(GeneralFlags::ELEVATED));
        assert!(!flags.left.intersects(SideFlags::BAND));
        assert!(!flags.right.intersects(SideFlags::BAND));
        assert!(flags.left.contains(SideFlags::TREES));
        assert_eq!(output.elevation, Vec2::splat(10.0));
    }

    #[test]
    fn placement_clamps_saturate() {
        let tunnel = CompositionRequest::builder().placement(Placement::Tunnel).build();
        assert_eq!(
            create(&tunnel, Vec2::new(-40.0, 3.0)).elevation,
            Vec2::new(-40.0, -25.0)
        );

        let elevated = CompositionRequest::builder().placement(Placement::Elevated).build();
        assert_eq!(
            create(&elevated, Vec2::new(18.0, 1.0)).elevation,
            Vec2::new(18.0, 10.0)
        );
    }

    #[test]
    fn ground_wins_over_other_placements_in_raw_selection() {
        // Bypasses the builder on purpose: the resolver reads placements in order too.
        let selection = GeneralSelection::ELEVATED | GeneralSelection::GROUND;
        assert_eq!(selection.placement(), Some(Placement::Ground));

        let request = CompositionRequest::builder().general(selection).build();
        let output = create(&request, Vec2::splat(12.0));
        assert_eq!(output.elevation, Vec2::ZERO);
        assert!(output.composition.is_none());
    }

    #[test]
    fn retaining_wall_uses_lowest_bound() {
        let request = CompositionRequest::builder()
            .left(SideUpgrades::RETAINING_WALL)
            .build();
        let output = create(&request, Vec2::ZERO);
        assert_eq!(output.elevation, Vec2::new(-4.0, 0.0));
        assert_eq!(output.flags().left, SideFlags::LOWERED);

        let deeper = resolve(
            &ResolveInput::new(&request, DrawMode::Create, Vec2::ZERO).with_tool_elevation(-8.0),
            &config(),
        );
        assert_eq!(deeper.elevation.x, -8.0);
    }

    #[test]
    fn quay_stays_below_elevated_band() {
        let request = CompositionRequest::builder().right(SideUpgrades::QUAY).build();

        let output = create(&request, Vec2::ZERO);
        assert_eq!(output.elevation, Vec2::new(0.0, 4.0));
        assert_eq!(output.flags().right, SideFlags::RAISED);

        let high = resolve(
            &ResolveInput::new(&request, DrawMode::Create, Vec2::ZERO).with_tool_elevation(20.0),
            &config(),
        );
        assert_abs_diff_eq!(high.elevation.y, 10.0 - 0.01, epsilon = 1e-6);
        assert!(high.elevation.y < 10.0);
    }

    #[test]
    fn resolving_own_output_is_a_no_op() {
        let requests = [
            CompositionRequest::builder()
                .placement(Placement::Ground)
                .both_sides(SideUpgrades::TREES)
                .build(),
            CompositionRequest::builder()
                .placement(Placement::Tunnel)
                .general(GeneralSelection::LIGHTING)
                .build(),
            CompositionRequest::builder()
                .placement(Placement::Elevated)
                .left(SideUpgrades::RETAINING_WALL)
                .build(),
            CompositionRequest::builder()
                .left(SideUpgrades::QUAY | SideUpgrades::SOUND_BARRIER)
                .right(SideUpgrades::RETAINING_WALL)
                .general(GeneralSelection::WIDE_MEDIAN | GeneralSelection::MEDIAN_GRASS)
                .build(),
            CompositionRequest::builder().placement(Placement::Ground).build(),
        ];

        for request in requests {
            let created = create(&request, Vec2::new(1.5, -2.0));
            let existing = ExistingComposition::new(created.flags(), created.elevation);

            let output = replace(&request, &existing);
            assert!(!output.changed, "{request:?} should be a no-op");
            assert_eq!(output.state, ResolutionState::NoOpDetected);
            assert_eq!(output.elevation, existing.elevation);
            assert_eq!(output.flags(), existing.flags);
        }
    }

    #[test]
    fn raw_tunnel_elevation_is_reclassified_on_replace() {
        let existing = ExistingComposition::new(CompositionFlags::default(), Vec2::splat(-30.0));
        let request = CompositionRequest::builder()
            .general(GeneralSelection::LIGHTING)
            .build();

        let output = replace(&request, &existing);
        assert_eq!(
            output.flags().general,
            GeneralFlags::TUNNEL | GeneralFlags::LIGHTING
        );
        assert_eq!(output.elevation, Vec2::splat(-30.0));
        assert!(output.changed);
    }

    #[test]
    fn band_match_alone_is_not_a_no_op() {
        // The elevation already reads as tunnel but the flag is missing.
        let existing = ExistingComposition::new(CompositionFlags::default(), Vec2::splat(-30.0));
        let request = CompositionRequest::builder().placement(Placement::Tunnel).build();
        let output = replace(&request, &existing);
        assert!(output.changed);
        assert_eq!(output.flags().general, GeneralFlags::TUNNEL);
    }

    #[test]
    fn replaced_side_keeps_transit_markers() {
        let existing = ExistingComposition::new(
            CompositionFlags::new(
                GeneralFlags::empty(),
                SideFlags::PRIMARY_TRACK | SideFlags::TREES,
                SideFlags::SECONDARY_LANE | SideFlags::GRASS_STRIP,
            ),
            Vec2::ZERO,
        );
        let request = CompositionRequest::builder()
            .left(SideUpgrades::SOUND_BARRIER)
            .replace_targets(ReplaceTargets {
                general: true,
                left: true,
                right: false,
            })
            .build();

        let flags = replace(&request, &existing).flags();
        assert_eq!(flags.left, SideFlags::SOUND_BARRIER | SideFlags::PRIMARY_TRACK);
        assert_eq!(flags.right, SideFlags::SECONDARY_LANE | SideFlags::GRASS_STRIP);
    }

    #[test]
    fn untargeted_general_keeps_existing_band() {
        let existing = ExistingComposition::new(
            CompositionFlags::new(GeneralFlags::ELEVATED, SideFlags::empty(), SideFlags::empty()),
            Vec2::splat(12.0),
        );
        let request = CompositionRequest::builder()
            .placement(Placement::Ground)
            .right(SideUpgrades::QUAY | SideUpgrades::TREES)
            .replace_targets(ReplaceTargets {
                general: false,
                left: false,
                right: true,
            })
            .build();

        let output = replace(&request, &existing);
        assert_eq!(output.elevation, Vec2::splat(12.0));
        assert_eq!(output.flags().general, GeneralFlags::ELEVATED);
        // Elevated segments drop the quay but keep the trees.
        assert_eq!(output.flags().right, SideFlags::TREES);
    }

    #[test]
    fn create_never_reports_unchanged() {
        let request = CompositionRequest::default();
        let output = create(&request, Vec2::ZERO);
        assert!(output.changed);
        assert!(output.composition.is_none());
        assert!(output.state.is_terminal());
    }

    #[test]
    fn replace_without_existing_is_always_changed() {
        let request = CompositionRequest::builder().placement(Placement::Ground).build();
        let output = resolve(
            &ResolveInput::new(&request, DrawMode::Replace, Vec2::ZERO),
            &config(),
        );
        assert!(output.changed);
        assert_eq!(output.state, ResolutionState::Changed);
    }

    #[test]
    fn create_reads_band_from_elevation_when_no_placement() {
        let request = CompositionRequest::builder()
            .general(GeneralSelection::CONSTANT_SLOPE)
            .build();
        let output = create(&request, Vec2::splat(15.0));
        assert_eq!(output.flags().general, GeneralFlags::ELEVATED);
    }

    #[test]
    fn grid_mode_ignores_existing() {
        let existing = ExistingComposition::new(CompositionFlags::default(), Vec2::ZERO);
        let request = CompositionRequest::default();
        let output = resolve(
            &ResolveInput::new(&request, DrawMode::Grid, Vec2::ZERO).with_existing(Some(&existing)),
            &config(),
        );
        assert!(output.changed);
    }
}
