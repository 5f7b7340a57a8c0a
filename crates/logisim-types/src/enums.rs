//! Enumeration types for the Logisim simulation.
//!
//! Spike types, location kinds, transport modes, and the lifecycle states
//! of orders and transfers. String forms are `snake_case` everywhere
//! (serde, `Display`, `FromStr`) so persisted rows and config files agree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Locations and routes
// ---------------------------------------------------------------------------

/// The role a location plays in the supply network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LocationType {
    /// Retail store; sells to customers, holds little stock.
    Store,
    /// Warehouse; a supply source for reachability.
    Warehouse,
    /// Cross-docking hub; transit only.
    Hub,
    /// External vendor; a supply source for reachability.
    Vendor,
}

impl LocationType {
    /// Whether locations of this type count as a supply source.
    pub const fn is_supply_source(self) -> bool {
        matches!(self, Self::Warehouse | Self::Vendor)
    }
}

/// How goods travel along a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TransportMode {
    /// Road freight.
    Truck,
    /// Rail freight.
    Rail,
    /// Ocean freight.
    Sea,
    /// Air freight.
    Air,
    /// Courier parcel service.
    Courier,
    /// Express road service.
    Express,
}

impl TransportMode {
    /// Premium modes are always flagged premium regardless of price.
    pub const fn is_premium(self) -> bool {
        matches!(self, Self::Air | Self::Courier | Self::Express)
    }
}

// ---------------------------------------------------------------------------
// Spikes
// ---------------------------------------------------------------------------

/// The kind of disruption a spike represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SpikeType {
    /// Demand surge; multiplier read live by demand simulation.
    Demand,
    /// Shipping delay; stretches quoted transit time.
    Delay,
    /// Price shock; multiplier read live by pricing.
    Price,
    /// Equipment breakdown; reduces a location's storage capacity.
    Breakdown,
    /// Blizzard; closes weather-vulnerable routes.
    Blizzard,
}

impl SpikeType {
    /// Every spike type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Demand,
        Self::Delay,
        Self::Price,
        Self::Breakdown,
        Self::Blizzard,
    ];

    /// Only disruptions with a physical effect can be fixed by the player.
    pub const fn is_player_resolvable(self) -> bool {
        matches!(self, Self::Breakdown | Self::Blizzard)
    }

    /// The `snake_case` name used in config and persisted rows.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Demand => "demand",
            Self::Delay => "delay",
            Self::Price => "price",
            Self::Breakdown => "breakdown",
            Self::Blizzard => "blizzard",
        }
    }
}

impl core::fmt::Display for SpikeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known spike type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpikeType(pub String);

impl core::fmt::Display for UnknownSpikeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown spike type: {}", self.0)
    }
}

impl std::error::Error for UnknownSpikeType {}

impl core::str::FromStr for SpikeType {
    type Err = UnknownSpikeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownSpikeType(s.to_owned()))
    }
}

/// Who ended a spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResolvedBy {
    /// The spike's window elapsed.
    Time,
    /// The player paid to end it early.
    Player,
}

// ---------------------------------------------------------------------------
// Orders and transfers
// ---------------------------------------------------------------------------

/// Lifecycle state of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum OrderStatus {
    /// Being assembled; no funds committed.
    Draft,
    /// Paid and waiting for dispatch.
    Pending,
    /// On the way to its destination.
    Shipped,
    /// Arrived; terminal.
    Delivered,
    /// Cancelled and refunded; terminal.
    Cancelled,
}

/// Lifecycle state of an inter-location transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TransferStatus {
    /// Being assembled.
    Draft,
    /// Stock has left the source location.
    InTransit,
    /// Stock arrived at the target; terminal.
    Completed,
}

// ---------------------------------------------------------------------------
// Alerts and ledger
// ---------------------------------------------------------------------------

/// Severity level of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AlertSeverity {
    /// Informational.
    Info,
    /// Something is off but not critical.
    Warning,
    /// Immediate attention required.
    Critical,
}

/// Category of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AlertKind {
    /// A low-stock location cut off from every supply source.
    Isolation,
}

/// Why funds moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LedgerEntryKind {
    /// Opening balance at world seed.
    OpeningBalance,
    /// Payment when an order enters `pending`.
    OrderPayment,
    /// Refund when an order is cancelled.
    OrderRefund,
    /// Shipping fee charged when a transfer is dispatched.
    TransferFee,
    /// Cost of ending a spike early.
    SpikeResolution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supply_sources() {
        assert!(LocationType::Warehouse.is_supply_source());
        assert!(LocationType::Vendor.is_supply_source());
        assert!(!LocationType::Store.is_supply_source());
        assert!(!LocationType::Hub.is_supply_source());
    }

    #[test]
    fn premium_modes() {
        assert!(TransportMode::Air.is_premium());
        assert!(TransportMode::Courier.is_premium());
        assert!(TransportMode::Express.is_premium());
        assert!(!TransportMode::Truck.is_premium());
        assert!(!TransportMode::Sea.is_premium());
    }

    #[test]
    fn only_physical_spikes_are_player_resolvable() {
        let resolvable: Vec<SpikeType> = SpikeType::ALL
            .into_iter()
            .filter(|t| t.is_player_resolvable())
            .collect();
        assert_eq!(resolvable, vec![SpikeType::Breakdown, SpikeType::Blizzard]);
    }

    #[test]
    fn spike_type_string_forms_agree_with_serde() {
        for t in SpikeType::ALL {
            let json = serde_json::to_string(&t).unwrap_or_default();
            assert_eq!(json, format!("\"{t}\""));
            assert_eq!(t.as_str().parse::<SpikeType>(), Ok(t));
        }
    }

    #[test]
    fn unknown_spike_type_is_an_error() {
        let parsed = "earthquake".parse::<SpikeType>();
        assert_eq!(parsed, Err(UnknownSpikeType("earthquake".to_owned())));
    }
}
