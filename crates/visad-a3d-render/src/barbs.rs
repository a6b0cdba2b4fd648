//! Wind barb and swell arrow glyph synthesis.
//!
//! A wind barb is a pole pointing into the wind with strokes along it:
//! a half barb for 5 knots, a full barb for 10 knots and a filled pennant
//! for 50 knots. Winds under 2.5 knots are drawn as a small circle.
//!
//! Glyph vertices are appended into caller-owned [`BarbBuffers`]; generation
//! is a pure function of its inputs.

use glam::{Vec2, Vec3};
use visad_a3d_core::{GeometryArray, Options, TextLabel, KNOTS_PER_METER_PER_SECOND};

/// Wind speed (knots) below which a calm circle is drawn.
pub const CALM_SPEED: f32 = 2.5;

/// Number of line vertices in the calm circle.
pub const CALM_CIRCLE_VERTICES: usize = 16;

/// Pennant, barb and half barb counts for one wind speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarbCounts {
    /// 50-knot pennants.
    pub pennants: usize,
    /// 10-knot barbs.
    pub barbs: usize,
    /// 5-knot half barbs (0 or 1).
    pub half_barbs: usize,
}

impl BarbCounts {
    /// Decomposes a speed in knots.
    ///
    /// The speed is rounded to the nearest 5 knots through
    /// `wsp25 = max(speed + 2.5, 5)` and split into 50/10/5 digits.
    #[must_use]
    pub fn for_speed(speed: f32) -> Self {
        let wsp25 = (speed + 2.5).max(5.0);
        // Whole 5-knot units; the 50/10/5 split of floor(wsp25 / 5) is the
        // same mixed-radix decomposition done on the float directly.
        #[allow(clippy::cast_sign_loss)]
        let fives = (wsp25 / 5.0).floor() as usize;
        Self {
            pennants: fives / 10,
            barbs: (fives % 10) / 2,
            half_barbs: fives % 2,
        }
    }

    /// Returns the speed represented by these counts, in knots.
    #[must_use]
    pub fn total_knots(&self) -> usize {
        50 * self.pennants + 10 * self.barbs + 5 * self.half_barbs
    }
}

/// Head and tail of a generated glyph.
///
/// The tail is the station; the head is the end a user grabs to drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarbEnds {
    pub tail: Vec3,
    pub head: Vec3,
}

impl BarbEnds {
    /// Returns the on-screen length of the glyph.
    #[must_use]
    pub fn length(&self) -> f32 {
        (self.head - self.tail).length()
    }
}

/// Vertex buffers a glyph batch is appended into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarbBuffers {
    /// Line vertices, two per segment.
    pub lines: Vec<Vec3>,
    /// Triangle vertices, three per pennant.
    pub triangles: Vec<Vec3>,
    /// Speed labels.
    pub labels: Vec<TextLabel>,
}

impl BarbBuffers {
    /// Creates empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates buffers sized for `glyphs` typical barbs.
    #[must_use]
    pub fn with_capacity(glyphs: usize) -> Self {
        Self {
            lines: Vec::with_capacity(glyphs * 8),
            triangles: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Returns true if nothing has been generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.triangles.is_empty() && self.labels.is_empty()
    }

    /// Clears all buffers, keeping their allocations.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.triangles.clear();
        self.labels.clear();
    }

    /// Converts the buffers into scene geometry.
    #[must_use]
    pub fn into_geometry(self, color: [f32; 4]) -> GeometryArray {
        GeometryArray {
            lines: self.lines,
            triangles: self.triangles,
            labels: self.labels,
            color,
        }
    }
}

/// Builds wind barb and swell glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarbGenerator {
    /// Convert m/s to knots before decomposing.
    pub knots_convert: bool,
    /// Draw the full pole instead of a shaft plus speed label.
    pub no_numbers: bool,
    /// Decimal places in the speed label.
    pub num_dec_places: usize,
}

impl Default for BarbGenerator {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl BarbGenerator {
    /// Creates a generator from display options.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            knots_convert: options.knots_convert,
            no_numbers: options.no_numbers,
            num_dec_places: options.num_dec_places,
        }
    }

    /// Returns the speed used for decomposition, in knots when converting.
    #[must_use]
    pub fn glyph_wind(&self, wind: Vec2) -> Vec2 {
        if self.knots_convert {
            wind * KNOTS_PER_METER_PER_SECOND as f32
        } else {
            wind
        }
    }

    /// Appends a wind barb for `wind` at `station` and returns its ends.
    ///
    /// `south` mirrors the barbs to the other side of the pole.
    pub fn make_vector(
        &self,
        south: bool,
        station: Vec3,
        scale: f32,
        point_size: f32,
        wind: Vec2,
        out: &mut BarbBuffers,
    ) -> BarbEnds {
        let wind = self.glyph_wind(wind);
        let speed = wind.length();

        if speed < CALM_SPEED {
            push_calm_circle(station, 0.7 * point_size, out);
            return BarbEnds {
                tail: station,
                head: station,
            };
        }

        let x0 = -wind.x / speed;
        let y0 = -wind.y / speed;
        let pole = |t: f32| station + Vec3::new(x0 * t, y0 * t, 0.0);
        let side = if south { -1.0 } else { 1.0 };
        let perp = Vec3::new(side * y0, -side * x0, 0.0);

        let barb = 0.4 * scale;
        let slant = 0.15 * scale;
        let mut d = 3.0 * barb;

        let counts = BarbCounts::for_speed(speed);

        if counts.half_barbs == 1 {
            out.lines.push(pole(d));
            out.lines.push(pole(d + slant * 0.5) + perp * (barb * 0.5));
            d += 0.125 * scale;
        }

        for _ in 0..counts.barbs {
            d += 0.125 * scale;
            out.lines.push(pole(d));
            out.lines.push(pole(d + slant) + perp * barb);
        }

        for _ in 0..counts.pennants {
            let d_prev = d;
            d += 0.3 * scale;
            out.triangles.push(pole(d_prev));
            out.triangles.push(pole(d));
            out.triangles.push(pole(d + slant) + perp * barb);
        }

        if self.no_numbers {
            out.lines.push(station);
            out.lines.push(pole(d));
        } else {
            out.lines.push(pole(0.4 * scale));
            out.lines.push(pole(d));
            out.labels.push(TextLabel {
                text: format!("{:.*}", self.num_dec_places, speed),
                position: pole(0.4 * scale) - perp * (0.2 * scale),
                baseline: Vec3::X,
            });
        }

        BarbEnds {
            tail: station,
            head: pole(d),
        }
    }

    /// Appends a swell arrow for `flow` at `station` and returns its ends.
    ///
    /// The arrow points along the flow with a shaft `0.1 * scale` per unit
    /// of speed and a two-stroke head.
    pub fn make_swell(
        &self,
        station: Vec3,
        scale: f32,
        point_size: f32,
        flow: Vec2,
        out: &mut BarbBuffers,
    ) -> BarbEnds {
        let speed = flow.length();
        if speed == 0.0 {
            push_calm_circle(station, 0.7 * point_size, out);
            return BarbEnds {
                tail: station,
                head: station,
            };
        }

        let dir = Vec3::new(flow.x / speed, flow.y / speed, 0.0);
        let perp = Vec3::new(-dir.y, dir.x, 0.0);
        let tip = station + dir * (0.1 * scale * speed);
        let head_len = 0.3 * scale;

        out.lines.push(station);
        out.lines.push(tip);
        for wing in [1.0, -1.0] {
            out.lines.push(tip);
            out.lines.push(tip - dir * head_len + perp * (wing * 0.5 * head_len));
        }

        BarbEnds {
            tail: station,
            head: tip,
        }
    }
}

/// Eight-segment circle with cardinal points at `radius` and diagonals at
/// `0.7 * radius` along each axis.
fn push_calm_circle(center: Vec3, radius: f32, out: &mut BarbBuffers) {
    let d = 0.7 * radius;
    let ring = [
        Vec3::new(-radius, 0.0, 0.0),
        Vec3::new(-d, d, 0.0),
        Vec3::new(0.0, radius, 0.0),
        Vec3::new(d, d, 0.0),
        Vec3::new(radius, 0.0, 0.0),
        Vec3::new(d, -d, 0.0),
        Vec3::new(0.0, -radius, 0.0),
        Vec3::new(-d, -d, 0.0),
    ];
    for (i, p) in ring.iter().enumerate() {
        out.lines.push(center + *p);
        out.lines.push(center + ring[(i + 1) % ring.len()]);
    }
}

/// Builds one buffer set for a batch of `(station, wind)` samples.
///
/// Returns the buffers and the ends of each glyph, in sample order.
pub fn render_barbs(
    generator: &BarbGenerator,
    south: bool,
    scale: f32,
    point_size: f32,
    samples: &[(Vec3, Vec2)],
) -> (BarbBuffers, Vec<BarbEnds>) {
    let mut buffers = BarbBuffers::with_capacity(samples.len());
    let ends = samples
        .iter()
        .map(|&(station, wind)| {
            generator.make_vector(south, station, scale, point_size, wind, &mut buffers)
        })
        .collect();
    (buffers, ends)
}
