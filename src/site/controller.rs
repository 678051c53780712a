//! Generalized per-protocol site controller state machine (C4): one instance covers
//! one slot/channel for any of DMR/P25/NXDN, since spec.md describes the three as
//! "near-isomorphic". Grounded in
//! `examples/original_source/src/host/nxdn/Control.cpp`'s `m_rfState`/`m_netState`
//! fields and `processFrame`/`processFrameLoss`/`clock` methods; DMR and P25 hosts in
//! the same source tree follow the identical shape (`RS_RF_LISTENING` etc.) under
//! different file names, so one struct serves all three here rather than three
//! near-duplicate copies.

use std::time::Duration;

use crate::site::timer::Timer;

/// RF-side call state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RfState {
    Listening,
    Audio,
    Data,
    /// Inbound burst failed ACL/affiliation; silently dropped until the next listen.
    Rejected,
}

/// Network-side call state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NetState {
    Idle,
    Audio,
    Data,
}

/// Identifies the call occupying the RF or network side.
#[derive(Copy, Clone, Debug)]
pub struct CallInfo {
    pub src: u32,
    pub dst: u32,
    pub slot: u8,
}

/// One slot/channel's RF and network call state, independent of which of the three
/// protocols is running on it.
pub struct Controller {
    pub rf_state: RfState,
    pub net_state: NetState,
    pub cc_running: bool,
    pub cc_halted: bool,

    rf_call: Option<CallInfo>,
    net_call: Option<CallInfo>,

    frame_loss_cnt: u8,
    pub frame_loss_threshold: u8,

    pub rf_loss_watchdog: Timer,
    pub network_watchdog: Timer,
    pub rf_tg_hang: Timer,
    pub net_tg_hang: Timer,

    authoritative: bool,
    permitted_dst_id: Option<u32>,
}

/// Outcome of feeding a burst into the controller, telling the caller what follow-up
/// action (grant, release, forward) is needed. The controller itself never touches the
/// affiliation/grant registry or peer network directly — those are separate components
/// per spec.md's component boundaries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// Burst dropped: not already in a call and sync/LICH was invalid, or ACL/
    /// affiliation denied it (`rf_state` is now `Rejected`).
    Dropped,
    /// A new call began; the caller should grant a channel and forward to peers.
    CallStarted,
    /// An existing call continues; the caller should touch its grant and forward.
    CallContinues,
    /// The call ended (terminator or loss-watchdog); the caller should release the
    /// grant for the returned `CallInfo`.
    CallEnded(CallInfo),
}

impl Controller {
    /// `rf_loss_watchdog`/`network_watchdog` bound how long a call may run without a
    /// fresh burst before it's torn down; `rf_tg_hang`/`net_tg_hang` are the post-call
    /// hang times (§4.4/§5: commonly 2-5 s, deployment-tunable, never hard-coded here).
    pub fn new(
        authoritative: bool,
        frame_loss_threshold: u8,
        rf_loss_watchdog: Duration,
        network_watchdog: Duration,
        rf_tg_hang: Duration,
        net_tg_hang: Duration,
    ) -> Controller {
        Controller {
            rf_state: RfState::Listening,
            net_state: NetState::Idle,
            cc_running: false,
            cc_halted: false,
            rf_call: None,
            net_call: None,
            frame_loss_cnt: 0,
            frame_loss_threshold,
            rf_loss_watchdog: Timer::new(rf_loss_watchdog),
            network_watchdog: Timer::new(network_watchdog),
            rf_tg_hang: Timer::new(rf_tg_hang),
            net_tg_hang: Timer::new(net_tg_hang),
            authoritative,
            permitted_dst_id: None,
        }
    }

    pub fn rf_call(&self) -> Option<CallInfo> {
        self.rf_call
    }

    pub fn net_call(&self) -> Option<CallInfo> {
        self.net_call
    }

    /// Step 1-3 of §4.4: an inbound voice/data header arrived on RF. `acl_allowed` is
    /// the caller's ACL/affiliation check (C5), since the controller doesn't own the
    /// registry.
    pub fn rf_call_header(&mut self, src: u32, dst: u32, slot: u8, is_data: bool, acl_allowed: bool) -> Transition {
        if !acl_allowed {
            self.rf_state = RfState::Rejected;
            return Transition::Dropped;
        }

        if self.rf_state == RfState::Listening {
            self.rf_state = if is_data { RfState::Data } else { RfState::Audio };
            self.rf_call = Some(CallInfo { src, dst, slot });
            self.frame_loss_cnt = 0;
            self.rf_loss_watchdog.start();
            return Transition::CallStarted;
        }

        Transition::CallContinues
    }

    /// Step 4 of §4.4: another burst of the same RF call arrived.
    pub fn rf_call_continue(&mut self) -> Transition {
        if self.rf_state == RfState::Audio || self.rf_state == RfState::Data {
            self.rf_loss_watchdog.start();
            Transition::CallContinues
        } else {
            Transition::Dropped
        }
    }

    /// Step 5 of §4.4: a terminator was received, tearing down the RF call cleanly.
    pub fn rf_terminator(&mut self) -> Option<CallInfo> {
        let call = self.rf_call.take();
        self.rf_state = RfState::Listening;
        self.rf_loss_watchdog.stop();
        if call.is_some() {
            self.rf_tg_hang.start();
        }
        call
    }

    /// Register one consecutive lost RF frame (modem `TAG_LOST`). Returns the call to
    /// tear down once `frame_loss_threshold` consecutive losses have been seen, per
    /// invariant 8 ("loss detection").
    pub fn rf_frame_loss(&mut self) -> Option<CallInfo> {
        if !(self.rf_state == RfState::Audio || self.rf_state == RfState::Data) {
            self.frame_loss_cnt = 0;
            return None;
        }

        self.frame_loss_cnt += 1;
        if self.frame_loss_cnt >= self.frame_loss_threshold {
            self.frame_loss_cnt = 0;
            let call = self.rf_call.take();
            self.rf_state = RfState::Listening;
            self.rf_loss_watchdog.stop();
            if call.is_some() {
                self.rf_tg_hang.start();
            }
            call
        } else {
            None
        }
    }

    /// A rejected RF state returns to listening once the ACL-denied burst's
    /// transmission ends (no terminator to key off since the burst was dropped).
    pub fn rf_reset_rejected(&mut self) {
        if self.rf_state == RfState::Rejected {
            self.rf_state = RfState::Listening;
        }
    }

    pub fn net_call_start(&mut self, src: u32, dst: u32, slot: u8, is_data: bool) {
        self.net_state = if is_data { NetState::Data } else { NetState::Audio };
        self.net_call = Some(CallInfo { src, dst, slot });
        self.network_watchdog.start();
    }

    pub fn net_terminator(&mut self) -> Option<CallInfo> {
        let call = self.net_call.take();
        self.net_state = NetState::Idle;
        self.network_watchdog.stop();
        if call.is_some() {
            self.net_tg_hang.start();
        }
        call
    }

    /// Non-authoritative permit/grant gating (§4.4 "Non-authoritative mode"): voice
    /// carrier on `dst` is only sent to RF once the authoritative peer has permitted
    /// it.
    pub fn permit_tg(&mut self, dst: u32) {
        if !self.authoritative {
            self.permitted_dst_id = Some(dst);
        }
    }

    pub fn is_permitted(&self, dst: u32) -> bool {
        self.authoritative || self.permitted_dst_id == Some(dst)
    }

    /// Advance every timer owned by this controller by `delta`, clearing the
    /// permitted-TG gate once the RF hang timer expires (mirrors `Control::clock`'s
    /// `m_rfTGHang` handling).
    pub fn clock(&mut self, delta: Duration) {
        self.rf_loss_watchdog.clock(delta);
        self.network_watchdog.clock(delta);
        self.rf_tg_hang.clock(delta);
        self.net_tg_hang.clock(delta);

        if self.rf_tg_hang.has_expired() {
            self.rf_tg_hang.stop();
            if !self.authoritative {
                self.permitted_dst_id = None;
            }
        }
    }
}
