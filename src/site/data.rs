//! Site configuration data (§3 `SiteData`/`IdentityTable entry`): the immutable
//! per-reconfiguration record describing one site, and the channel-id → tuning-
//! parameter table used to compute per-channel RX/TX frequencies deterministically.
//! Grounded on spec.md §3 directly (no single original_source file owns this — each
//! protocol's host keeps its own copy of the same fields) and shaped like the
//! teacher's `trunking::fields::ChannelParams` (plain struct, `rx_freq`/`tx_freq`
//! methods, constructor takes raw over-the-air units).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Immutable per-reconfiguration site description, shared across all three protocol
/// controllers running on one physical site.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteData {
    pub network_id: u32,
    pub system_id: u16,
    pub site_id: u8,
    pub rfss_id: u8,
    pub location_registration_area: u8,
    pub service_class: u8,
    pub channel_id: u8,
    pub channel_number: u32,
    pub callsign: String,
    pub net_active: bool,
}

/// One entry of the identity table: the tuning parameters needed to compute RX/TX
/// frequencies for every channel number sharing `channel_id`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct IdentityEntry {
    pub channel_id: u8,
    /// Base frequency, in Hz.
    pub base_freq_hz: u32,
    /// Channel spacing, in kHz (fractional spacing is carried in 125 Hz steps by the
    /// over-the-air encodings that feed this table; `channel_space_125hz` mirrors
    /// that unit directly so no precision is lost converting through kHz).
    pub channel_space_125hz: u32,
    /// TX offset, in MHz (may be negative on some bands; stored as signed to match
    /// that).
    pub tx_offset_mhz: i32,
    /// Channel bandwidth, in kHz.
    pub bandwidth_khz: u32,
}

impl IdentityEntry {
    /// `rx = base + (chSpace*125 * chNo) + txOffset*1e6`, per spec.md §3 verbatim.
    pub fn rx_freq(&self, channel_no: u32) -> i64 {
        self.base_freq_hz as i64 + (self.channel_space_125hz as i64 * channel_no as i64)
    }

    /// `rx + txOffset*1e6`.
    pub fn tx_freq(&self, channel_no: u32) -> i64 {
        self.rx_freq(channel_no) + self.tx_offset_mhz as i64 * 1_000_000
    }
}

/// Channel id → tuning parameters, read-mostly per spec.md §5 ("Lookup tables ...
/// read-mostly; reload path stops/swaps/restarts under a write lock").
#[derive(Clone, Debug, Default)]
pub struct IdentityTable {
    entries: HashMap<u8, IdentityEntry>,
}

impl IdentityTable {
    pub fn new() -> IdentityTable {
        IdentityTable { entries: HashMap::new() }
    }

    pub fn insert(&mut self, entry: IdentityEntry) {
        self.entries.insert(entry.channel_id, entry);
    }

    pub fn get(&self, channel_id: u8) -> Option<&IdentityEntry> {
        self.entries.get(&channel_id)
    }

    /// Convenience wrapper combining a lookup with the RX frequency formula.
    pub fn rx_freq(&self, channel_id: u8, channel_no: u32) -> Option<i64> {
        self.get(channel_id).map(|e| e.rx_freq(channel_no))
    }

    /// Convenience wrapper combining a lookup with the TX frequency formula.
    pub fn tx_freq(&self, channel_id: u8, channel_no: u32) -> Option<i64> {
        self.get(channel_id).map(|e| e.tx_freq(channel_no))
    }

    /// Atomically replace the whole table (§5 "reload path stops/swaps/restarts").
    pub fn swap(&mut self, new: IdentityTable) {
        self.entries = new.entries;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rx_tx_freq_formula() {
        let mut table = IdentityTable::new();
        table.insert(IdentityEntry {
            channel_id: 1,
            base_freq_hz: 851_000_000,
            channel_space_125hz: 125,
            tx_offset_mhz: -45,
            bandwidth_khz: 12,
        });

        let rx = table.rx_freq(1, 100).unwrap();
        assert_eq!(rx, 851_000_000 + 125 * 100);
        let tx = table.tx_freq(1, 100).unwrap();
        assert_eq!(tx, rx - 45_000_000);
    }

    #[test]
    fn test_unknown_channel_id_returns_none() {
        let table = IdentityTable::new();
        assert!(table.rx_freq(5, 1).is_none());
    }

    #[test]
    fn test_swap_replaces_contents_atomically() {
        let mut table = IdentityTable::new();
        table.insert(IdentityEntry {
            channel_id: 1,
            base_freq_hz: 1,
            channel_space_125hz: 1,
            tx_offset_mhz: 0,
            bandwidth_khz: 12,
        });

        let mut replacement = IdentityTable::new();
        replacement.insert(IdentityEntry {
            channel_id: 2,
            base_freq_hz: 2,
            channel_space_125hz: 1,
            tx_offset_mhz: 0,
            bandwidth_khz: 12,
        });

        table.swap(replacement);
        assert!(table.get(1).is_none());
        assert!(table.get(2).is_some());
    }
}
