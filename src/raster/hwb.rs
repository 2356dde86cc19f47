//! Hue/Whiteness/Blackness conversion and the perceptual color distance used
//! for palette matching. Plain channel distance models perceived hue
//! similarity poorly; the HWB distance keeps hue, whiteness and blackness as
//! separate terms.

/// A color in HWB space. Hue is on `[0, 6)` around the color wheel (red at
/// 0/6, green at 2, blue at 4) and is `None` for achromatic colors, where
/// the maximum and minimum channels coincide. Whiteness and blackness are on
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hwb {
    pub hue: Option<f32>,
    pub whiteness: f32,
    pub blackness: f32,
}

impl Hwb {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Hwb {
        let rf = r as f32 / 255.0;
        let gf = g as f32 / 255.0;
        let bf = b as f32 / 255.0;

        let w = rf.min(gf).min(bf);
        let v = rf.max(gf).max(bf);
        let blackness = 1.0 - v;
        if v == w {
            return Hwb {
                hue: None,
                whiteness: w,
                blackness,
            };
        }

        // Piecewise linear hue from whichever channel attains the minimum.
        let f = if rf == w {
            gf - bf
        } else if gf == w {
            bf - rf
        } else {
            rf - gf
        };
        let i = if rf == w {
            3.0
        } else if gf == w {
            5.0
        } else {
            1.0
        };
        Hwb {
            hue: Some(i - f / (v - w)),
            whiteness: w,
            blackness,
        }
    }
}

/// Squared perceptual distance between two colors. Undefined hues always
/// match on the hue term; otherwise the hue difference is folded onto the
/// shortest path around the 6-unit wheel. Symmetric and non-negative.
pub fn hwb_diff(r1: u8, g1: u8, b1: u8, r2: u8, g2: u8, b2: u8) -> f32 {
    let c1 = Hwb::from_rgb(r1, g1, b1);
    let c2 = Hwb::from_rgb(r2, g2, b2);

    let hue = match (c1.hue, c2.hue) {
        (Some(h1), Some(h2)) => {
            let mut diff = (h1 - h2).abs();
            if diff > 3.0 {
                diff = 6.0 - diff;
            }
            diff
        }
        _ => 0.0,
    };

    hue * hue
        + (c1.whiteness - c2.whiteness) * (c1.whiteness - c2.whiteness)
        + (c1.blackness - c2.blackness) * (c1.blackness - c2.blackness)
}
