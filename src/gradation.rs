//! Sieve analysis of aggregates against a gradation envelope.
//!
//! Percentages follow the usual laboratory sheet: the mass retained on each
//! sieve as a share of the sample, the running total of those shares from the
//! largest opening down, and the complement of that total as the passing
//! percentage. Passing percentages are never clamped: a negative value means the
//! retained masses add up to more than the sample, which
//! [`GradationResult::over_retained`] reports.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GradationError;

/// Tolerance used when comparing computed percentages with envelope limits.
const LIMIT_TOLERANCE: f64 = 1.0e-9;

/// Sieve openings in millimetres whose cumulative retained percentages make
/// up the fineness modulus.
pub const FINENESS_SERIES_MM: [f64; 11] = [
    150.0, 75.0, 37.5, 19.0, 9.5, 4.75, 2.36, 1.18, 0.6, 0.3, 0.15,
];

/// Reference band of one sieve in a gradation envelope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SieveLimits {
    /// Sieve opening in millimetres.
    pub sieve_mm: f64,
    /// Largest admissible passing percentage.
    pub upper_pct: f64,
    /// Smallest admissible passing percentage.
    pub lower_pct: f64,
}

impl SieveLimits {
    /// Create a band for one sieve.
    #[must_use]
    pub const fn new(sieve_mm: f64, upper_pct: f64, lower_pct: f64) -> Self {
        Self {
            sieve_mm,
            upper_pct,
            lower_pct,
        }
    }
}

/// One line of a sieve analysis: the sieve, its band and the mass it retained.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SieveRow {
    /// Sieve and reference band.
    pub limits: SieveLimits,
    /// Mass retained on the sieve in grams.
    pub retained_g: f64,
}

/// Check that sieves strictly decrease and every band is ordered.
fn validate_limits<'a, I>(limits: I) -> Result<(), GradationError>
where
    I: IntoIterator<Item = &'a SieveLimits>,
{
    let mut previous: Option<f64> = None;
    for sieve in limits {
        if let Some(previous) = previous {
            if sieve.sieve_mm.is_nan() || sieve.sieve_mm >= previous {
                return Err(GradationError::OpeningsNotDecreasing {
                    previous,
                    opening: sieve.sieve_mm,
                });
            }
        }
        if sieve.lower_pct.is_nan()
            || sieve.upper_pct.is_nan()
            || sieve.lower_pct > sieve.upper_pct
        {
            return Err(GradationError::InvertedBand {
                sieve_mm: sieve.sieve_mm,
                lower: sieve.lower_pct,
                upper: sieve.upper_pct,
            });
        }
        previous = Some(sieve.sieve_mm);
    }
    Ok(())
}

/// Passing-percentage bands of one aggregate size class, largest sieve first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradationEnvelope {
    class: String,
    sieves: Vec<SieveLimits>,
}

impl GradationEnvelope {
    /// Create an envelope for `class`.
    ///
    /// # Errors
    ///
    /// Returns [`GradationError::EmptyEnvelope`] without sieves,
    /// [`GradationError::OpeningsNotDecreasing`] when the openings are not in
    /// strictly descending order and [`GradationError::InvertedBand`] when a
    /// lower limit exceeds its upper limit.
    pub fn new(class: impl Into<String>, sieves: Vec<SieveLimits>) -> Result<Self, GradationError> {
        if sieves.is_empty() {
            return Err(GradationError::EmptyEnvelope);
        }
        validate_limits(&sieves)?;
        Ok(Self {
            class: class.into(),
            sieves,
        })
    }

    /// Label of the aggregate size class.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Sieves and bands, largest opening first.
    #[must_use]
    pub fn sieves(&self) -> &[SieveLimits] {
        &self.sieves
    }

    /// Analyse a sample using this envelope.
    ///
    /// `retained_g` lists the mass retained on each sieve in envelope order.
    ///
    /// # Errors
    ///
    /// Returns [`GradationError::MassCountMismatch`] when the number of masses
    /// differs from the number of sieves and
    /// [`GradationError::InvalidRetainedMass`] for a negative or non-finite mass.
    ///
    /// # Examples
    /// ```
    /// use concretelab::{GradationEnvelope, SieveLimits};
    ///
    /// let envelope = GradationEnvelope::new(
    ///     "demo",
    ///     vec![SieveLimits::new(9.5, 100.0, 90.0), SieveLimits::new(4.75, 60.0, 20.0)],
    /// )?;
    /// let result = envelope.analyze(&[100.0, 250.0], 500.0)?;
    /// assert_eq!(result.rows()[0].passing_pct, 80.0);
    /// assert_eq!(result.rows()[1].passing_pct, 30.0);
    /// assert!(!result.is_compliant());
    /// # Ok::<(), concretelab::GradationError>(())
    /// ```
    pub fn analyze(
        &self,
        retained_g: &[f64],
        total_mass_g: f64,
    ) -> Result<GradationResult, GradationError> {
        if retained_g.len() != self.sieves.len() {
            return Err(GradationError::MassCountMismatch {
                sieves: self.sieves.len(),
                masses: retained_g.len(),
            });
        }
        let rows: Vec<SieveRow> = self
            .sieves
            .iter()
            .zip(retained_g)
            .map(|(&limits, &retained_g)| SieveRow { limits, retained_g })
            .collect();
        let mut result = analyze(&rows, total_mass_g)?;
        result.class = Some(self.class.clone());
        Ok(result)
    }
}

/// Position of a passing percentage relative to its reference band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandStatus {
    /// Inside the band, limits included.
    Within,
    /// More material passes than the upper limit allows.
    Above,
    /// Less material passes than the lower limit requires.
    Below,
}

/// Computed percentages of one sieve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SieveResult {
    /// Sieve and reference band.
    pub limits: SieveLimits,
    /// Mass retained on the sieve in grams.
    pub retained_g: f64,
    /// Retained mass as a percentage of the sample.
    pub retained_pct: f64,
    /// Running total of retained percentages down to this sieve.
    pub cumulative_pct: f64,
    /// `100 - cumulative_pct`, possibly negative.
    pub passing_pct: f64,
}

impl SieveResult {
    /// Compare the passing percentage with the band.
    #[must_use]
    pub fn status(&self) -> BandStatus {
        if self.passing_pct > self.limits.upper_pct + LIMIT_TOLERANCE {
            BandStatus::Above
        } else if self.passing_pct < self.limits.lower_pct - LIMIT_TOLERANCE {
            BandStatus::Below
        } else {
            BandStatus::Within
        }
    }
}

/// Data-quality findings of an analysis. None of them stops the computation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradationWarning {
    /// The retained masses add up to more than the sample mass.
    OverRetained {
        /// Sum of retained masses in grams.
        retained_g: f64,
        /// Sample mass in grams.
        total_mass_g: f64,
    },
    /// A sieve falls outside its envelope band.
    OutOfBand {
        /// Sieve opening in millimetres.
        sieve_mm: f64,
        /// Computed passing percentage.
        passing_pct: f64,
        /// Side of the band that is violated.
        status: BandStatus,
    },
}

impl fmt::Display for GradationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradationWarning::OverRetained {
                retained_g,
                total_mass_g,
            } => write!(
                f,
                "retained masses total {retained_g:.2} g, more than the {total_mass_g:.2} g sample"
            ),
            GradationWarning::OutOfBand {
                sieve_mm,
                passing_pct,
                status,
            } => {
                let side = if *status == BandStatus::Above { "above" } else { "below" };
                write!(f, "sieve {sieve_mm} mm passes {passing_pct:.2}%, {side} the envelope")
            }
        }
    }
}

/// Outcome of a sieve analysis: the computed curve and the reference bands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradationResult {
    class: Option<String>,
    total_mass_g: f64,
    rows: Vec<SieveResult>,
}

impl GradationResult {
    /// Aggregate class of the envelope, when the analysis came from one.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Sample mass in grams.
    #[must_use]
    pub fn total_mass_g(&self) -> f64 {
        self.total_mass_g
    }

    /// Per-sieve results, largest opening first.
    #[must_use]
    pub fn rows(&self) -> &[SieveResult] {
        &self.rows
    }

    /// Sum of the retained masses in grams.
    #[must_use]
    pub fn total_retained_g(&self) -> f64 {
        self.rows.iter().map(|row| row.retained_g).sum()
    }

    /// Whether more mass was retained than the sample contained.
    #[must_use]
    pub fn over_retained(&self) -> bool {
        self.total_retained_g() > self.total_mass_g
    }

    /// Sieves whose passing percentage falls outside the band.
    pub fn out_of_band(&self) -> impl Iterator<Item = &SieveResult> + '_ {
        self.rows
            .iter()
            .filter(|row| row.status() != BandStatus::Within)
    }

    /// Whether every sieve lies within its band.
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.out_of_band().next().is_none()
    }

    /// Fineness modulus: cumulative retained percentages on the sieves of
    /// [`FINENESS_SERIES_MM`] present in the analysis, divided by 100.
    #[must_use]
    pub fn fineness_modulus(&self) -> f64 {
        self.rows
            .iter()
            .filter(|row| {
                FINENESS_SERIES_MM
                    .iter()
                    .any(|sieve| (sieve - row.limits.sieve_mm).abs() < 1.0e-6)
            })
            .map(|row| row.cumulative_pct)
            .sum::<f64>()
            / 100.0
    }

    /// Findings a caller should surface next to the curve.
    #[must_use]
    pub fn warnings(&self) -> Vec<GradationWarning> {
        let mut warnings = Vec::new();
        if self.over_retained() {
            warnings.push(GradationWarning::OverRetained {
                retained_g: self.total_retained_g(),
                total_mass_g: self.total_mass_g,
            });
        }
        warnings.extend(self.out_of_band().map(|row| GradationWarning::OutOfBand {
            sieve_mm: row.limits.sieve_mm,
            passing_pct: row.passing_pct,
            status: row.status(),
        }));
        warnings
    }
}

/// Compute retained, cumulative retained and passing percentages for rows
/// ordered from the largest opening to the smallest.
///
/// A non-positive `total_mass_g` makes every retained percentage zero.
///
/// # Errors
///
/// Returns [`GradationError::OpeningsNotDecreasing`],
/// [`GradationError::InvertedBand`] or [`GradationError::InvalidRetainedMass`]
/// when the rows are malformed.
pub fn analyze(rows: &[SieveRow], total_mass_g: f64) -> Result<GradationResult, GradationError> {
    validate_limits(rows.iter().map(|row| &row.limits))?;
    if let Some(row) = rows
        .iter()
        .find(|row| !(row.retained_g.is_finite() && row.retained_g >= 0.0))
    {
        return Err(GradationError::InvalidRetainedMass {
            sieve_mm: row.limits.sieve_mm,
            mass: row.retained_g,
        });
    }

    let mut cumulative_pct = 0.0;
    let rows = rows
        .iter()
        .map(|row| {
            let retained_pct = if total_mass_g > 0.0 {
                row.retained_g / total_mass_g * 100.0
            } else {
                0.0
            };
            cumulative_pct += retained_pct;
            SieveResult {
                limits: row.limits,
                retained_g: row.retained_g,
                retained_pct,
                cumulative_pct,
                passing_pct: 100.0 - cumulative_pct,
            }
        })
        .collect();

    Ok(GradationResult {
        class: None,
        total_mass_g,
        rows,
    })
}
