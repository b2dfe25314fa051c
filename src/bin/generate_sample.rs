//! Writes a set of synthetic voltammograms for trying the app:
//! a `<c>mm` calibration series in `t,E,I` layout and one unlabelled file in
//! whitespace layout with an instrument-style header.
//!
//! Usage: `generate_sample [output_dir]` (default `sample_cv`).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const E_START: f64 = -0.2;
const E_VERTEX: f64 = 0.7;
const E_STEP: f64 = 0.005;
const SECONDS_PER_STEP: f64 = 0.05;

const OX_CENTER: f64 = 0.42;
const RED_CENTER: f64 = 0.05;
const PEAK_WIDTH: f64 = 0.03;
/// µA per mM
const OX_SENSITIVITY: f64 = 3.0;
const RED_SENSITIVITY: f64 = 2.5;
const NOISE_UA: f64 = 0.02;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// SplitMix64 with a Box-Muller normal on top; deterministic per seed.
struct NoiseSource {
    state: u64,
}

impl NoiseSource {
    fn new(seed: u64) -> Self {
        NoiseSource { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self, std_dev: f64) -> f64 {
        let u1 = self.uniform().max(1e-15);
        let u2 = self.uniform();
        std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// One full cycle: forward sweep to the vertex, then back. Returns `(t, E, I)`.
fn voltammogram(concentration: f64, noise: &mut NoiseSource) -> Vec<(f64, f64, f64)> {
    let steps = ((E_VERTEX - E_START) / E_STEP).round() as usize;
    let forward = (0..=steps).map(|k| (E_START + k as f64 * E_STEP, true));
    let reverse = (1..=steps).map(|k| (E_VERTEX - k as f64 * E_STEP, false));

    forward
        .chain(reverse)
        .enumerate()
        .map(|(n, (e, anodic))| {
            let capacitive = 0.4 + 0.3 * e;
            let current = if anodic {
                capacitive + gaussian(e, OX_CENTER, PEAK_WIDTH, OX_SENSITIVITY * concentration)
            } else {
                -capacitive - gaussian(e, RED_CENTER, PEAK_WIDTH, RED_SENSITIVITY * concentration)
            };
            (
                n as f64 * SECONDS_PER_STEP,
                (e * 1e4).round() / 1e4,
                current + noise.normal(NOISE_UA),
            )
        })
        .collect()
}

fn write_comma(path: &Path, samples: &[(f64, f64, f64)]) -> Result<()> {
    let mut out = String::new();
    for (t, e, i) in samples {
        writeln!(out, "{t:.2},{e:.4},{i:.5}")?;
    }
    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

fn write_whitespace(path: &Path, samples: &[(f64, f64, f64)]) -> Result<()> {
    let mut out = String::from("Time/s\tPotential/V\tCurrent/uA\n");
    for (t, e, i) in samples {
        writeln!(out, "{t:.2}\t{e:.4}\t{i:.5}")?;
    }
    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_cv"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut noise = NoiseSource::new(42);
    let series = [0.5, 1.0, 2.0, 5.0];

    for &conc in &series {
        let path = out_dir.join(format!("cv_{conc}mm.txt"));
        write_comma(&path, &voltammogram(conc, &mut noise))?;
    }

    let unknown = out_dir.join("unknown_sample.txt");
    write_whitespace(&unknown, &voltammogram(3.0, &mut noise))?;

    println!(
        "Wrote {} calibration files and 1 unknown to {}",
        series.len(),
        out_dir.display()
    );
    Ok(())
}
