//! Lineage colour model.
//!
//! A lineage group's fill colour moves from a light base colour towards a
//! dark target colour as the simulation ages. The interpolation fraction is
//! `min(1, generation / 100)`: groups reach full saturation at generation 100
//! and hold it from then on. Groups past the first stage additionally get a
//! border whose colour fades from light to dark gray on the same fraction.
//!
//! Everything here is a pure function of `(stage, generation)`.

use lifeview_types::{LineageTier, Stage};

/// Generation at which colours reach their target.
pub const SATURATION_GENERATION: u64 = 100;

/// A solid 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Build a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from a `0xRRGGBB` literal.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Parse `#rrggbb`. Returns `None` for anything else.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_u32)
    }

    /// Channel-wise linear interpolation, rounded per channel.
    ///
    /// `t` is clamped to `[0, 1]`, so `lerp(a, b, 0) == a` and
    /// `lerp(a, b, 1) == b` exactly.
    pub fn lerp(self, target: Self, t: f64) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Self {
            r: lerp_channel(self.r, target.r, t),
            g: lerp_channel(self.g, target.g, t),
            b: lerp_channel(self.b, target.b, t),
        }
    }

    /// Channels as an array, for raster backends.
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl core::fmt::Display for Rgb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let from = f64::from(from);
    let to = f64::from(to);
    (from + (to - from) * t).round().clamp(0.0, 255.0) as u8
}

/// Canvas background.
pub const BACKGROUND: Rgb = Rgb::from_u32(0x00fa_fafa);
/// Thin separator lines between cells.
pub const GRID_LINE: Rgb = Rgb::from_u32(0x00e0_e0e0);
/// Fill of a live cell that no lineage group claims.
pub const LIVE_CELL: Rgb = Rgb::from_u32(0x00f0_f0f0);
/// Border colour at generation 0.
pub const BORDER_BASE: Rgb = Rgb::from_u32(0x00e0_e0e0);
/// Border colour from generation 100 on.
pub const BORDER_TARGET: Rgb = Rgb::from_u32(0x0033_3333);

/// Light starting colour of a tier.
pub const fn base_color(tier: LineageTier) -> Rgb {
    match tier {
        LineageTier::Cell => Rgb::from_u32(0x00cc_cccc),
        LineageTier::Dna => Rgb::from_u32(0x00ff_cccc),
        LineageTier::Seedling => Rgb::from_u32(0x00cc_ffcc),
        LineageTier::Bug => Rgb::from_u32(0x00cc_ccff),
        LineageTier::Fish => Rgb::from_u32(0x00ff_ffcc),
        LineageTier::Dragon => Rgb::from_u32(0x00ff_ccff),
        LineageTier::Mammal => Rgb::from_u32(0x00cc_ffff),
        LineageTier::Human => Rgb::from_u32(0x00e6_ccff),
    }
}

/// Dark target colour of a tier.
pub const fn target_color(tier: LineageTier) -> Rgb {
    match tier {
        LineageTier::Cell => Rgb::from_u32(0x0000_0000),
        LineageTier::Dna => Rgb::from_u32(0x00ff_0000),
        LineageTier::Seedling => Rgb::from_u32(0x0000_ff00),
        LineageTier::Bug => Rgb::from_u32(0x0000_00ff),
        LineageTier::Fish => Rgb::from_u32(0x00ff_ff00),
        LineageTier::Dragon => Rgb::from_u32(0x00ff_00ff),
        LineageTier::Mammal => Rgb::from_u32(0x0000_ffff),
        LineageTier::Human => Rgb::from_u32(0x0080_0080),
    }
}

/// Interpolation fraction for `generation`: `min(1, generation / 100)`.
#[allow(clippy::cast_precision_loss)]
pub fn progress(generation: u64) -> f64 {
    if generation >= SATURATION_GENERATION {
        return 1.0;
    }
    generation as f64 / SATURATION_GENERATION as f64
}

/// Fill colour of a lineage group at `stage` after `generation` generations.
pub fn color_for(stage: Stage, generation: u64) -> Rgb {
    let tier = stage.tier();
    base_color(tier).lerp(target_color(tier), progress(generation))
}

/// Border colour of a lineage group, or `None` for first-stage groups.
pub fn border_for(stage: Stage, generation: u64) -> Option<Rgb> {
    stage
        .has_border()
        .then(|| BORDER_BASE.lerp(BORDER_TARGET, progress(generation)))
}
