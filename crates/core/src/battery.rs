//! Battery gauge readings.

use serde::Serialize;

/// Latest `batteryStatus` report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStatus {
	/// Charge in percent.
	pub state_of_charge: f64,
	/// Percent per hour; negative while discharging.
	pub state_of_charge_change: f64,
}

impl BatteryStatus {
	pub fn new(state_of_charge: f64, state_of_charge_change: f64) -> Self {
		Self {
			state_of_charge,
			state_of_charge_change,
		}
	}

	/// Whole-percent charge for display.
	pub fn percent(&self) -> u8 {
		self.state_of_charge.round().clamp(0.0, 100.0) as u8
	}

	pub fn is_charging(&self) -> bool {
		self.state_of_charge_change > 0.0
	}

	/// Estimated time until empty (discharging) or full (charging).
	///
	/// `None` when the charge is not changing. Estimates of ten hours or more
	/// are capped, estimates under an hour are given in minutes.
	pub fn time_remaining(&self) -> Option<String> {
		let change = self.state_of_charge_change;
		if change == 0.0 {
			return None;
		}

		let (hours, suffix) = if change < 0.0 {
			(self.state_of_charge / -change, "remaining")
		} else {
			((100.0 - self.state_of_charge) / change, "to full")
		};

		Some(if hours >= 10.0 {
			format!("(>10h {suffix})")
		} else if hours > 1.0 {
			format!("({}h {suffix})", hours.round())
		} else {
			format!("({} min {suffix})", (hours * 60.0).round())
		})
	}
}

impl std::fmt::Display for BatteryStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}%", self.percent())?;
		if let Some(remaining) = self.time_remaining() {
			write!(f, " {remaining}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn steady_charge_has_no_estimate() {
		assert_eq!(BatteryStatus::new(80.0, 0.0).time_remaining(), None);
		assert_eq!(BatteryStatus::new(80.0, 0.0).to_string(), "80%");
	}

	#[test]
	fn discharging_estimates() {
		assert_eq!(BatteryStatus::new(90.0, -5.0).time_remaining().as_deref(), Some("(>10h remaining)"));
		assert_eq!(BatteryStatus::new(50.0, -10.0).time_remaining().as_deref(), Some("(5h remaining)"));
		assert_eq!(BatteryStatus::new(10.0, -20.0).time_remaining().as_deref(), Some("(30 min remaining)"));
		// Exactly one hour falls through to minutes.
		assert_eq!(BatteryStatus::new(20.0, -20.0).time_remaining().as_deref(), Some("(60 min remaining)"));
	}

	#[test]
	fn charging_estimates() {
		assert_eq!(BatteryStatus::new(0.0, 5.0).time_remaining().as_deref(), Some("(>10h to full)"));
		assert_eq!(BatteryStatus::new(40.0, 20.0).time_remaining().as_deref(), Some("(3h to full)"));
		assert_eq!(BatteryStatus::new(95.0, 20.0).time_remaining().as_deref(), Some("(15 min to full)"));
		assert!(BatteryStatus::new(95.0, 20.0).is_charging());
	}

	#[test]
	fn display_rounds_percent() {
		assert_eq!(BatteryStatus::new(66.6, -10.0).to_string(), "67% (7h remaining)");
	}
}
