//! Zoom state for the two-page view
//!
//! Zoom is expressed as a reduce factor (larger = smaller raster) chosen from
//! a table of fixed factors plus one autofit entry computed from the current
//! container.

use serde::{Deserialize, Serialize};

/// How the autofit entry of the factor table was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Autofit {
    Auto,
}

/// Zoom request coming from the toolbar or keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
    /// Back to the size that fits the container
    Fit,
}

impl std::str::FromStr for ZoomDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "fit" | "auto" => Ok(Self::Fit),
            other => Err(format!("unknown zoom direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReductionFactor {
    pub reduce: f64,
    pub autofit: Option<Autofit>,
}

impl ReductionFactor {
    pub fn fixed(reduce: f64) -> Self {
        Self {
            reduce,
            autofit: None,
        }
    }

    pub fn auto(reduce: f64) -> Self {
        Self {
            reduce,
            autofit: Some(Autofit::Auto),
        }
    }
}

/// Applied zoom of the spread
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    /// Currently applied reduce factor, always > 0
    pub reduce: f64,
    /// `Some` while the spread follows the container size
    pub autofit: Option<Autofit>,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            reduce: 1.0,
            autofit: Some(Autofit::Auto),
        }
    }
}

impl Zoom {
    pub fn apply(&mut self, factor: ReductionFactor) {
        self.reduce = factor.reduce;
        self.autofit = factor.autofit;
    }

    pub fn is_autofit(&self) -> bool {
        self.autofit.is_some()
    }
}

/// Fixed factors merged with the autofit entry, sorted by reduce
pub fn reduction_factors(fixed: &[f64], ideal_reduce: f64) -> Vec<ReductionFactor> {
    let mut factors: Vec<ReductionFactor> = fixed
        .iter()
        .copied()
        .filter(|r| r.is_finite() && *r > 0.0)
        .map(ReductionFactor::fixed)
        .collect();
    factors.push(ReductionFactor::auto(ideal_reduce));
    factors.sort_by(|a, b| a.reduce.total_cmp(&b.reduce));
    factors
}

/// Pick the factor one step away from `current` in `direction`.
///
/// Zooming in moves to the largest factor below the current one; zooming out
/// to the smallest one above it. At either end of the table the extreme entry
/// is returned.
pub fn next_reduce(
    current: f64,
    direction: ZoomDirection,
    factors: &[ReductionFactor],
) -> ReductionFactor {
    let Some(first) = factors.first().copied() else {
        return ReductionFactor::auto(current);
    };

    match direction {
        ZoomDirection::Fit => factors
            .iter()
            .copied()
            .find(|f| f.autofit.is_some())
            .unwrap_or(first),
        ZoomDirection::In => factors
            .iter()
            .copied()
            .filter(|f| f.reduce < current)
            .last()
            .unwrap_or(first),
        ZoomDirection::Out => factors
            .iter()
            .copied()
            .find(|f| f.reduce > current)
            .unwrap_or(factors[factors.len() - 1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: [f64; 6] = [0.5, 1.0, 2.0, 3.0, 4.0, 6.0];

    #[test]
    fn factors_include_autofit_entry_in_order() {
        let factors = reduction_factors(&FIXED, 2.5);
        let reduces: Vec<f64> = factors.iter().map(|f| f.reduce).collect();
        assert_eq!(reduces, vec![0.5, 1.0, 2.0, 2.5, 3.0, 4.0, 6.0]);
        assert_eq!(factors[3].autofit, Some(Autofit::Auto));
    }

    #[test]
    fn zoom_in_picks_next_smaller_reduce() {
        let factors = reduction_factors(&FIXED, 2.5);
        assert_eq!(next_reduce(2.5, ZoomDirection::In, &factors).reduce, 2.0);
        assert_eq!(next_reduce(0.5, ZoomDirection::In, &factors).reduce, 0.5);
    }

    #[test]
    fn zoom_out_picks_next_larger_reduce() {
        let factors = reduction_factors(&FIXED, 2.5);
        assert_eq!(next_reduce(2.0, ZoomDirection::Out, &factors), ReductionFactor::auto(2.5));
        assert_eq!(next_reduce(6.0, ZoomDirection::Out, &factors).reduce, 6.0);
    }

    #[test]
    fn fit_returns_autofit_entry() {
        let factors = reduction_factors(&FIXED, 0.25);
        assert_eq!(next_reduce(4.0, ZoomDirection::Fit, &factors), ReductionFactor::auto(0.25));
    }

    #[test]
    fn invalid_fixed_factors_are_dropped() {
        let factors = reduction_factors(&[0.0, -1.0, f64::NAN, 2.0], 1.0);
        assert_eq!(factors.len(), 2);
    }

    #[test]
    fn parses_directions() {
        assert_eq!("in".parse::<ZoomDirection>(), Ok(ZoomDirection::In));
        assert_eq!("auto".parse::<ZoomDirection>(), Ok(ZoomDirection::Fit));
        assert!("sideways".parse::<ZoomDirection>().is_err());
    }
}
