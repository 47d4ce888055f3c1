//! Flight states. Each variant carries only what is meaningful in it.

use std::fmt;

/// Sub-phases of the return to the helipad, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingPhase {
    /// Yaw toward the helipad.
    Rotating,
    /// Close in on the helipad, then face north again.
    Positioning,
    /// Wind the bucket up.
    Retracting,
    /// Drop onto the pad.
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    /// Parked on the helipad, motor off.
    Stationary,
    /// Climbing to cruise altitude. `from_pad` is false when lifting off the lake.
    TakingOff { from_pad: bool },
    Flying,
    LandingBase(LandingPhase),
    /// Settling onto the lake. Always in the descending phase.
    LandingWater,
    /// Floating on the lake, bucket can fill.
    WaterLanded,
}

impl FlightState {
    /// The active landing sub-phase; `Some` exactly while landing.
    pub fn landing_phase(&self) -> Option<LandingPhase> {
        match self {
            FlightState::LandingBase(phase) => Some(*phase),
            FlightState::LandingWater => Some(LandingPhase::Descending),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlightState::Stationary => "STATIONARY",
            FlightState::TakingOff { .. } => "TAKING_OFF",
            FlightState::Flying => "FLYING",
            FlightState::LandingBase(_) => "LANDING_BASE",
            FlightState::LandingWater => "LANDING_WATER",
            FlightState::WaterLanded => "WATER_LANDED",
        }
    }
}

impl fmt::Display for FlightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.landing_phase() {
            Some(phase) => write!(f, "{} ({})", self.name(), phase),
            None => f.write_str(self.name()),
        }
    }
}

impl fmt::Display for LandingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LandingPhase::Rotating => "ROTATING",
            LandingPhase::Positioning => "POSITIONING",
            LandingPhase::Retracting => "RETRACTING",
            LandingPhase::Descending => "DESCENDING",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_phase_only_while_landing() {
        let states = [
            FlightState::Stationary,
            FlightState::TakingOff { from_pad: true },
            FlightState::Flying,
            FlightState::LandingBase(LandingPhase::Positioning),
            FlightState::LandingWater,
            FlightState::WaterLanded,
        ];
        for state in states {
            let landing = matches!(state, FlightState::LandingBase(_) | FlightState::LandingWater);
            assert_eq!(state.landing_phase().is_some(), landing, "{state}");
        }
        assert_eq!(FlightState::LandingWater.landing_phase(), Some(LandingPhase::Descending));
    }

    #[test]
    fn display_includes_phase() {
        let s = FlightState::LandingBase(LandingPhase::Retracting).to_string();
        assert_eq!(s, "LANDING_BASE (RETRACTING)");
        assert_eq!(FlightState::Flying.to_string(), "FLYING");
    }
}
