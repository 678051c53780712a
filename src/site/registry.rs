//! Affiliation & channel-grant registry (C5): src→group affiliations with a refreshable
//! timeout, and a TG→granted-channel map allocated out of a fixed RF-channel pool.
//! Grounded in `examples/original_source/src/host/nxdn/Control.cpp`'s
//! `m_affiliations` (an `AffiliationLookup`) and its `setReleaseGrantCallback`/
//! `setUnitDeregCallback` hooks, generalized here to all three protocols since the
//! registry itself is protocol-agnostic (it only ever sees ids and channel numbers).

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// One allocated voice channel, held by exactly one talkgroup/destination for the
/// duration of a call.
#[derive(Clone, Copy, Debug)]
pub struct ChannelGrant {
    pub channel_id: u8,
    pub channel_no: u32,
    pub slot: u8,
    pub src: u32,
    pub dst: u32,
    started: Duration,
    last_touch: Duration,
}

struct Affiliation {
    group: u32,
    last_touch: Duration,
}

/// Invoked with `(channel_no, dst, slot)` when a grant is released, whether by
/// explicit release or by timeout. Spec's site controller wires this to a REST PUT
/// against the voice channel's `PUT_PERMIT_TG` endpoint with `dstId=0`.
pub type ReleaseGrantCallback = Box<dyn FnMut(u32, u32, u8) + Send>;

/// Invoked with `src` when a unit's affiliation ages out or is explicitly removed.
/// Spec's site controller wires this to a peer-network unit-deregistration
/// announcement.
pub type UnitDeregCallback = Box<dyn FnMut(u32) + Send>;

/// Affiliation and channel-grant registry for one site/channel pool.
pub struct Registry {
    affiliations: HashMap<u32, Affiliation>,
    grants: HashMap<u32, ChannelGrant>,
    free_channels: VecDeque<(u8, u32)>,
    grant_timeout: Duration,
    affiliation_timeout: Duration,
    disable_unit_reg_timeout: bool,
    now: Duration,
    release_grant_cb: Option<ReleaseGrantCallback>,
    unit_dereg_cb: Option<UnitDeregCallback>,
}

impl Registry {
    /// Create a registry over the given pool of `(channel_id, channel_no)` RF
    /// channels, with the given grant and affiliation idle timeouts.
    pub fn new(
        channels: impl IntoIterator<Item = (u8, u32)>,
        grant_timeout: Duration,
        affiliation_timeout: Duration,
    ) -> Registry {
        Registry {
            affiliations: HashMap::new(),
            grants: HashMap::new(),
            free_channels: channels.into_iter().collect(),
            grant_timeout,
            affiliation_timeout,
            disable_unit_reg_timeout: false,
            now: Duration::ZERO,
            release_grant_cb: None,
            unit_dereg_cb: None,
        }
    }

    pub fn set_release_grant_callback(&mut self, cb: ReleaseGrantCallback) {
        self.release_grant_cb = Some(cb);
    }

    pub fn set_unit_dereg_callback(&mut self, cb: UnitDeregCallback) {
        self.unit_dereg_cb = Some(cb);
    }

    /// Record or refresh `src`'s affiliation with `group`.
    pub fn affiliate(&mut self, src: u32, group: u32) {
        self.affiliations.insert(src, Affiliation { group, last_touch: self.now });
    }

    /// Remove `src`'s affiliation, firing the unit-dereg callback if one was set.
    pub fn deaffiliate(&mut self, src: u32) {
        if self.affiliations.remove(&src).is_some() {
            if let Some(cb) = self.unit_dereg_cb.as_mut() {
                cb(src);
            }
        }
    }

    pub fn is_affiliated(&self, src: u32, group: u32) -> bool {
        self.affiliations.get(&src).is_some_and(|a| a.group == group)
    }

    pub fn group_aff_size(&self) -> usize {
        self.affiliations.len()
    }

    pub fn grp_aff_table(&self) -> Vec<(u32, u32)> {
        self.affiliations.iter().map(|(&src, a)| (src, a.group)).collect()
    }

    /// All currently-granted destination ids, for REST endpoints that need to force a
    /// mass release without touching each grant individually.
    pub fn granted_dst_table(&self) -> Vec<u32> {
        self.grants.keys().copied().collect()
    }

    /// Allocate a free voice channel for `(src, dst, slot)`. Returns `None` if the
    /// channel pool is exhausted or `dst` already holds an active grant.
    pub fn grant(&mut self, src: u32, dst: u32, slot: u8) -> Option<ChannelGrant> {
        if self.grants.contains_key(&dst) {
            return None;
        }

        let (channel_id, channel_no) = self.free_channels.pop_front()?;
        let grant = ChannelGrant {
            channel_id,
            channel_no,
            slot,
            src,
            dst,
            started: self.now,
            last_touch: self.now,
        };
        self.grants.insert(dst, grant);
        Some(grant)
    }

    /// Refresh the last-touch time of `dst`'s grant, if one exists.
    pub fn touch_grant(&mut self, dst: u32) {
        if let Some(grant) = self.grants.get_mut(&dst) {
            grant.last_touch = self.now;
        }
    }

    /// Remove `dst`'s grant (if any) and invoke the release callback. `force` is
    /// carried through only as documentation for callers; this registry always
    /// releases immediately when asked.
    pub fn release_grant(&mut self, dst: u32, _force: bool) -> bool {
        match self.grants.remove(&dst) {
            Some(grant) => {
                self.free_channels.push_back((grant.channel_id, grant.channel_no));
                if let Some(cb) = self.release_grant_cb.as_mut() {
                    cb(grant.channel_no, dst, grant.slot);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_granted(&self, dst: u32) -> bool {
        self.grants.contains_key(&dst)
    }

    pub fn get_granted_ch(&self, dst: u32) -> Option<u32> {
        self.grants.get(&dst).map(|g| g.channel_no)
    }

    pub fn get_granted_src_id(&self, dst: u32) -> Option<u32> {
        self.grants.get(&dst).map(|g| g.src)
    }

    pub fn set_disable_unit_reg_timeout(&mut self, disable: bool) {
        self.disable_unit_reg_timeout = disable;
    }

    /// Advance all timers by `delta`, releasing expired grants and deregistering
    /// expired units along the way.
    pub fn clock(&mut self, delta: Duration) {
        self.now += delta;

        let expired_grants: Vec<u32> = self
            .grants
            .iter()
            .filter(|(_, g)| self.now - g.last_touch >= self.grant_timeout)
            .map(|(&dst, _)| dst)
            .collect();
        for dst in expired_grants {
            self.release_grant(dst, false);
        }

        if !self.disable_unit_reg_timeout {
            let expired_units: Vec<u32> = self
                .affiliations
                .iter()
                .filter(|(_, a)| self.now - a.last_touch >= self.affiliation_timeout)
                .map(|(&src, _)| src)
                .collect();
            for src in expired_units {
                self.deaffiliate(src);
            }
        }
    }
}
