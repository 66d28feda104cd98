//! Battery domain entity

use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

/// Inventory lifecycle status of a battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryStatus {
    /// On the shelf, can be rented
    Available,
    /// Assigned to an open rental
    Rented,
    /// Taken out of service by staff
    Maintenance,
}

impl BatteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Rented => "RENTED",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AVAILABLE" => Some(Self::Available),
            "RENTED" => Some(Self::Rented),
            "MAINTENANCE" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl std::fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rentable inventory unit
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    pub id: String,
    /// Manufacturer serial, unique across the inventory
    pub serial_number: String,
    /// Purchase price in the smallest currency unit
    pub price: i64,
    pub status: BatteryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Battery {
    pub fn new(serial_number: impl Into<String>, price: i64, status: BatteryStatus) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            serial_number: serial_number.into(),
            price,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == BatteryStatus::Available
    }

    pub fn is_rented(&self) -> bool {
        self.status == BatteryStatus::Rented
    }

    /// Check a status change requested through inventory management.
    ///
    /// Only the rental lifecycle may enter or leave RENTED; keeping the
    /// current status is always allowed.
    pub fn check_manual_status_change(&self, to: BatteryStatus) -> Result<(), DomainError> {
        if to == self.status {
            return Ok(());
        }
        if to == BatteryStatus::Rented {
            return Err(DomainError::Conflict(
                "status RENTED can only be set by creating a rental".to_string(),
            ));
        }
        if self.is_rented() {
            return Err(DomainError::Conflict(format!(
                "battery {} is rented; return it before changing its status",
                self.serial_number
            )));
        }
        Ok(())
    }
}

/// Inventory-side changes to a battery.
///
/// `status` here only moves between AVAILABLE and MAINTENANCE; RENTED is
/// owned by the rental lifecycle.
#[derive(Debug, Clone, Default)]
pub struct BatteryUpdate {
    pub serial_number: Option<String>,
    pub price: Option<i64>,
    pub status: Option<BatteryStatus>,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_battery_gets_generated_id() {
        let a = Battery::new("SN-001", 15_000, BatteryStatus::Available);
        let b = Battery::new("SN-002", 15_000, BatteryStatus::Available);
        assert_ne!(a.id, b.id);
        assert!(a.is_available());
        assert!(!a.is_rented());
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn manual_status_changes() {
        let mut b = Battery::new("SN-001", 100, BatteryStatus::Available);
        assert!(b
            .check_manual_status_change(BatteryStatus::Maintenance)
            .is_ok());
        assert!(b
            .check_manual_status_change(BatteryStatus::Rented)
            .unwrap_err()
            .is_conflict());

        b.status = BatteryStatus::Rented;
        assert!(b.check_manual_status_change(BatteryStatus::Rented).is_ok());
        assert!(b
            .check_manual_status_change(BatteryStatus::Available)
            .unwrap_err()
            .is_conflict());
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(
            BatteryStatus::from_str("maintenance"),
            Some(BatteryStatus::Maintenance)
        );
        assert_eq!(BatteryStatus::from_str("RENTED"), Some(BatteryStatus::Rented));
        assert_eq!(BatteryStatus::from_str("broken"), None);
    }

    #[test]
    fn status_display_matches_wire_format() {
        for status in [
            BatteryStatus::Available,
            BatteryStatus::Rented,
            BatteryStatus::Maintenance,
        ] {
            assert_eq!(BatteryStatus::from_str(&status.to_string()), Some(status));
        }
    }
}
