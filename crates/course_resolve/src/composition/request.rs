//! Composition requests as selected by the user for the current frame.
//!
//! Requests are built through [`CompositionRequestBuilder`], which enforces the
//! exclusion rules once: at most one placement band (ground, tunnel, elevated, in
//! that order of precedence) and at most one of quay / retaining wall per side
//! (retaining wall wins).
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::composition::{GeneralFlags, Side, SideFlags};
use crate::flags::bit_set;

bit_set! {
    /// General options of a composition request.
    pub struct GeneralSelection: u16 {
        const GROUND = 1 << 0;
        const ELEVATED = 1 << 1;
        const TUNNEL = 1 << 2;
        const CONSTANT_SLOPE = 1 << 3;
        const WIDE_MEDIAN = 1 << 4;
        const MEDIAN_TREES = 1 << 5;
        const MEDIAN_GRASS = 1 << 6;
        const LIGHTING = 1 << 7;
    }
}

bit_set! {
    /// Upgrades requested for one side.
    pub struct SideUpgrades: u16 {
        const QUAY = 1 << 0;
        const RETAINING_WALL = 1 << 1;
        const TREES = 1 << 2;
        const GRASS_STRIP = 1 << 3;
        const WIDE_SIDEWALK = 1 << 4;
        const SOUND_BARRIER = 1 << 5;
    }
}

/// Vertical placement band requested for the whole segment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    Ground,
    Tunnel,
    Elevated,
}

impl Placement {
    /// Order in which placement bits are considered; the first set bit wins.
    pub const RESOLUTION_ORDER: [Placement; 3] =
        [Placement::Ground, Placement::Tunnel, Placement::Elevated];

    pub const fn selection(self) -> GeneralSelection {
        match self {
            Placement::Ground => GeneralSelection::GROUND,
            Placement::Tunnel => GeneralSelection::TUNNEL,
            Placement::Elevated => GeneralSelection::ELEVATED,
        }
    }
}

impl GeneralSelection {
    pub const PLACEMENT: Self = Self::GROUND.union(Self::ELEVATED).union(Self::TUNNEL);

    /// Placement band selected, honoring [`Placement::RESOLUTION_ORDER`].
    pub fn placement(self) -> Option<Placement> {
        Placement::RESOLUTION_ORDER
            .into_iter()
            .find(|p| self.contains(p.selection()))
    }

    /// Median and lighting flags implied by this selection.
    pub fn dressing_flags(self) -> GeneralFlags {
        let mut flags = GeneralFlags::empty();
        flags.set(GeneralFlags::WIDE_MEDIAN, self.contains(Self::WIDE_MEDIAN));
        flags.set(GeneralFlags::LIGHTING, self.contains(Self::LIGHTING));
        flags.set(GeneralFlags::MEDIAN_TREES, self.contains(Self::MEDIAN_TREES));
        flags.set(GeneralFlags::MEDIAN_GRASS, self.contains(Self::MEDIAN_GRASS));
        flags
    }
}

impl SideUpgrades {
    pub const BAND: Self = Self::QUAY.union(Self::RETAINING_WALL);

    /// Side flags implied by these upgrades.
    pub fn side_flags(self) -> SideFlags {
        let mut flags = SideFlags::empty();
        flags.set(SideFlags::RAISED, self.contains(Self::QUAY));
        flags.set(SideFlags::LOWERED, self.contains(Self::RETAINING_WALL));
        flags.set(SideFlags::TREES, self.contains(Self::TREES));
        flags.set(SideFlags::GRASS_STRIP, self.contains(Self::GRASS_STRIP));
        flags.set(SideFlags::WIDE_SIDEWALK, self.contains(Self::WIDE_SIDEWALK));
        flags.set(SideFlags::SOUND_BARRIER, self.contains(Self::SOUND_BARRIER));
        flags
    }
}

/// Parts of an existing composition a replace request overwrites.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplaceTargets {
    pub general: bool,
    pub left: bool,
    pub right: bool,
}

impl Default for ReplaceTargets {
    fn default() -> Self {
        Self::all()
    }
}

impl ReplaceTargets {
    pub const fn all() -> Self {
        Self {
            general: true,
            left: true,
            right: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            general: false,
            left: false,
            right: false,
        }
    }

    pub fn side(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// How the host is currently placing the course.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Drawing new courses.
    #[default]
    Create,
    /// Drawing a grid of courses; no slope rewriting.
    Grid,
    /// Re-applying a composition to existing segments.
    Replace,
}

/// A per-frame snapshot of the selected composition.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositionRequest {
    general: GeneralSelection,
    left: SideUpgrades,
    right: SideUpgrades,
    replace: ReplaceTargets,
}

impl CompositionRequest {
    pub fn builder() -> CompositionRequestBuilder {
        CompositionRequestBuilder::default()
    }

    pub fn general(&self) -> GeneralSelection {
        self.general
    }

    pub fn side(&self, side: Side) -> SideUpgrades {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn replace_targets(&self) -> ReplaceTargets {
        self.replace
    }

    pub fn placement(&self) -> Option<Placement> {
        self.general.placement()
    }

    pub fn constant_slope(&self) -> bool {
        self.general.contains(GeneralSelection::CONSTANT_SLOPE)
    }
}

/// Builder for [`CompositionRequest`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CompositionRequestBuilder {
    general: GeneralSelection,
    left: SideUpgrades,
    right: SideUpgrades,
    replace: ReplaceTargets,
}

impl CompositionRequestBuilder {
    /// Adds general options.
    pub fn general(mut self, selection: GeneralSelection) -> Self {
        self.general.insert(selection);
        self
    }

    /// Shorthand for adding a placement band.
    pub fn placement(self, placement: Placement) -> Self {
        self.general(placement.selection())
    }

    /// Adds upgrades on one side.
    pub fn side(mut self, side: Side, upgrades: SideUpgrades) -> Self {
        match side {
            Side::Left => self.left.insert(upgrades),
            Side::Right => self.right.insert(upgrades),
        }
        self
    }

    pub fn left(self, upgrades: SideUpgrades) -> Self {
        self.side(Side::Left, upgrades)
    }

    pub fn right(self, upgrades: SideUpgrades) -> Self {
        self.side(Side::Right, upgrades)
    }

    pub fn both_sides(self, upgrades: SideUpgrades) -> Self {
        self.left(upgrades).right(upgrades)
    }

    /// Sets which parts a replace overwrites. Ignored outside [`DrawMode::Replace`].
    pub fn replace_targets(mut self, targets: ReplaceTargets) -> Self {
        self.replace = targets;
        self
    }

    /// Builds the request, dropping conflicting bits.
    pub fn build(self) -> CompositionRequest {
        let mut general = self.general;
        if let Some(placement) = general.placement() {
            let dropped = general
                .intersection(GeneralSelection::PLACEMENT)
                .difference(placement.selection());
            if !dropped.is_empty() {
                debug!("Placement {placement:?} overrides {dropped:?}.");
                general.remove(dropped);
            }
        }

        CompositionRequest {
            general,
            left: normalize_side(Side::Left, self.left),
            right: normalize_side(Side::Right, self.right),
            replace: self.replace,
        }
    }
}

fn normalize_side(side: Side, mut upgrades: SideUpgrades) -> SideUpgrades {
    if upgrades.contains(SideUpgrades::BAND) {
        debug!("{side:?} side requests quay and retaining wall; keeping the wall.");
        upgrades.remove(SideUpgrades::QUAY);
    }
    upgrades
}
