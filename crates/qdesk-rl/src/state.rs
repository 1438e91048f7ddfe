//! State discretization - maps continuous observations to Q-table keys

use serde::{Deserialize, Serialize};

use qdesk_core::{Error, RLState};

/// Number of discretized state dimensions
pub const STATE_DIMS: usize = 8;

/// Discretized state key: one bin index per dimension.
///
/// Two states whose values fall in the same bins produce byte-identical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey(pub [u8; STATE_DIMS]);

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for bin in self.0 {
            if !first {
                f.write_str("-")?;
            }
            write!(f, "{bin}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for StateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bins = [0u8; STATE_DIMS];
        let mut parts = s.split('-');
        for slot in &mut bins {
            let part = parts
                .next()
                .ok_or_else(|| Error::Snapshot(format!("state key too short: {s}")))?;
            *slot = part
                .parse()
                .map_err(|_| Error::Snapshot(format!("bad state key segment: {part}")))?;
        }
        if parts.next().is_some() {
            return Err(Error::Snapshot(format!("state key too long: {s}")));
        }
        Ok(StateKey(bins))
    }
}

/// Clipping range and bin count for one state dimension
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DimSpec {
    pub min: f64,
    pub max: f64,
    pub bins: u8,
}

impl DimSpec {
    const fn new(min: f64, max: f64, bins: u8) -> Self {
        Self { min, max, bins }
    }

    /// Clip the raw value into [min, max] and bucket it. A value at the top
    /// of the range lands in the last bin, not a phantom overflow bin.
    fn bin(&self, value: f64) -> u8 {
        let clipped = value.clamp(self.min, self.max);
        let width = (self.max - self.min) / f64::from(self.bins);
        let bin = ((clipped - self.min) / width).floor() as i64;
        bin.clamp(0, i64::from(self.bins) - 1) as u8
    }
}

/// Maps a continuous state into a finite, hashable bin key.
///
/// Ranges and bin counts must match across export/import for a persisted
/// policy to keep addressing the same table rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discretizer {
    pub delta: DimSpec,
    pub gamma: DimSpec,
    pub theta: DimSpec,
    pub vega: DimSpec,
    pub positions: DimSpec,
    pub vix: DimSpec,
    pub iv_rank: DimSpec,
    /// P&L is expressed in thousands before binning
    pub pnl_thousands: DimSpec,
}

impl Default for Discretizer {
    fn default() -> Self {
        Self {
            delta: DimSpec::new(-200.0, 200.0, 10),
            gamma: DimSpec::new(-50.0, 50.0, 5),
            theta: DimSpec::new(-500.0, 0.0, 10),
            vega: DimSpec::new(-100.0, 100.0, 10),
            positions: DimSpec::new(0.0, 20.0, 5),
            vix: DimSpec::new(10.0, 50.0, 8),
            iv_rank: DimSpec::new(0.0, 100.0, 10),
            pnl_thousands: DimSpec::new(-50.0, 50.0, 10),
        }
    }
}

impl Discretizer {
    /// Every dimension needs a non-empty range and at least one bin.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        for (name, dim) in [
            ("delta", &self.delta),
            ("gamma", &self.gamma),
            ("theta", &self.theta),
            ("vega", &self.vega),
            ("positions", &self.positions),
            ("vix", &self.vix),
            ("iv_rank", &self.iv_rank),
            ("pnl_thousands", &self.pnl_thousands),
        ] {
            if dim.bins == 0 {
                return Err(Error::Config(format!("{name}: bins must be at least 1")));
            }
            if dim.max <= dim.min {
                return Err(Error::Config(format!(
                    "{name}: max ({}) must exceed min ({})",
                    dim.max, dim.min
                )));
            }
        }
        Ok(())
    }

    /// Pure and total: out-of-range inputs are clipped, never rejected.
    pub fn discretize(&self, state: &RLState) -> StateKey {
        StateKey([
            self.delta.bin(state.portfolio_delta),
            self.gamma.bin(state.portfolio_gamma),
            self.theta.bin(state.portfolio_theta),
            self.vega.bin(state.portfolio_vega),
            self.positions.bin(f64::from(state.total_positions)),
            self.vix.bin(state.vix),
            self.iv_rank.bin(state.iv_rank),
            self.pnl_thousands.bin(state.total_pnl / 1000.0),
        ])
    }
}
