//! The dispatch chain: six boundary-crossing entry points plus the
//! internal hops between them (§4, §5).
//!
//! Each public method corresponds to one frame crossing one boundary
//! (switch, outer crypto, inner crypto, tunnel). Internally a frame's
//! in-flight state (which label it arrived on, which session is
//! handling it, the parsed IPv6 header) is carried as a local
//! [`DispatchState`] value passed between steps — nothing is stashed in
//! `self` between calls, so concurrent dispatches never interfere with
//! each other's in-flight frame (§9).

use std::sync::Arc;

use crate::Result;
use crate::address::Address;
use crate::context::Context;
use crate::errors::DispatchOutcome;
use crate::frame::Frame;
use crate::ipv6::{Ipv6Header, NEXT_HEADER_UDP, UdpHeader, is_router_traffic};
use crate::router::DhtMessage;
use crate::switch::{ControlFrame, MessageType, SwitchErrorType, SwitchHeader};
use std::sync::atomic::Ordering;

/// Per-frame state threaded between dispatch steps; never stored on
/// `Dispatcher` itself (§9 design note on the original's global mutable
/// context).
struct DispatchState {
    label: u64,
}

/// The packet-glue core. Holds no per-frame mutable state; every method
/// takes `&self` and is safe to call concurrently from multiple frames
/// in flight (collaborators and registries provide their own interior
/// synchronization).
pub struct Dispatcher {
    ctx: Context,
}

impl Dispatcher {
    pub fn new(ctx: Context) -> Self {
        Dispatcher { ctx }
    }

    pub fn stats(&self) -> crate::context::StatsSnapshot {
        self.ctx.stats.snapshot()
    }

    /// Pins an outer session for `label` to `peer_key` ahead of any
    /// traffic, for collaborators that complete a handshake out of band
    /// (e.g. alongside a DHT lookup) before the first data frame arrives.
    pub fn pin_outer_session(&self, label: u64, peer_key: [u8; 32]) {
        self.ctx.outer_sessions.get(label, Some(peer_key));
    }

    // ---- inbound path: switch -> crypto -> tunnel/router ----

    /// Entry point for every frame the switch fabric delivers to us
    /// (§4.5). Splits control traffic (handled here) from data traffic
    /// (handed to [`received_from_crypto_auth`](Self::received_from_crypto_auth)).
    pub fn incoming_from_switch(&self, mut frame: Frame) -> Result<()> {
        self.ctx.stats.frames_from_switch.fetch_add(1, Ordering::Relaxed);
        let header = SwitchHeader::decode(&mut frame)?;
        match header.message_type {
            MessageType::Control => self.handle_control_frame(header.label, frame),
            MessageType::Data => {
                let state = DispatchState { label: header.label };
                self.received_from_crypto_auth(state, frame)
            }
        }
    }

    fn handle_control_frame(&self, _switch_label: u64, frame: Frame) -> Result<()> {
        self.ctx.stats.switch_control_frames.fetch_add(1, Ordering::Relaxed);
        match ControlFrame::parse(frame.bytes()) {
            ControlFrame::Error { cause_label, error_type } => {
                tracing::debug!(?error_type, cause_label, "switch reported a broken path");
                if let SwitchErrorType::MalformedAddress = error_type {
                    self.ctx.router.broken_path(cause_label);
                }
                Ok(())
            }
            ControlFrame::Unknown => {
                tracing::trace!("ignoring unrecognised switch control frame");
                Ok(())
            }
        }
    }

    /// Strips the outer (peer-to-peer) crypto layer for the session
    /// addressed by the frame's switch label (§4.2).
    fn received_from_crypto_auth(&self, state: DispatchState, mut frame: Frame) -> Result<()> {
        let session = self.ctx.outer_sessions.get(state.label, None);
        if let Err(err) = session.decrypt(&mut frame) {
            self.ctx.stats.decrypt_failures.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(label = state.label, error = %err, "outer decrypt failed, dropping frame");
            return Ok(());
        }
        let peer_key = match session.peer_public_key() {
            Some(key) => key,
            None => {
                tracing::debug!(label = state.label, "outer session has no pinned peer key yet");
                return Ok(());
            }
        };
        self.decrypted_incoming(state, peer_key, frame)
    }

    /// Parses the cleartext IPv6 header revealed by the outer layer,
    /// enforces the address/key binding invariant (§4.4), and either
    /// hands the frame to [`incoming_for_me`](Self::incoming_for_me) or
    /// forwards it toward its destination.
    fn decrypted_incoming(&self, state: DispatchState, peer_key: [u8; 32], mut frame: Frame) -> Result<()> {
        let header = match Ipv6Header::parse(&frame) {
            Ok(header) => header,
            Err(err) => {
                tracing::debug!(label = state.label, %err, "malformed ipv6 header, dropping frame");
                return Ok(());
            }
        };

        if Address::verify_binding(&peer_key, &header.source).is_err() {
            self.ctx.stats.binding_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(label = state.label, "source address does not bind to peer's authenticated key");
            return Ok(());
        }

        // The only point where a peer enters the routing table: we've
        // just authenticated its key via the outer session and verified
        // its claimed address binds to that key.
        if let Ok(peer) = Address::from_authenticated_key(peer_key, state.label) {
            self.ctx.router.add_node(peer, state.label);
        }

        if header.is_for(&self.ctx.our_address.ip6) {
            frame.shift(crate::ipv6::IPV6_HEADER_LEN as isize)?;
            self.ctx.stats.frames_for_me.fetch_add(1, Ordering::Relaxed);
            self.incoming_for_me(peer_key, header, frame)
        } else {
            self.forward(header, frame)
        }
    }

    /// Forwards a frame that isn't addressed to us toward its
    /// destination, re-wrapping the outer layer for the next hop. Routed
    /// purely on the destination ip6; the content-layer identity of
    /// intermediate hops is never this node's business.
    ///
    /// Enforces the hop-limit invariant: a frame that arrives with
    /// `hop_limit == 0` has no hops left and is dropped rather than
    /// relayed, and every relayed frame has its hop-limit decremented in
    /// place before re-encryption, so a cyclic routing table can't loop a
    /// frame forever.
    fn forward(&self, mut header: Ipv6Header, mut frame: Frame) -> Result<()> {
        if header.hop_limit == 0 {
            self.ctx.stats.hop_limit_exceeded.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("hop limit exhausted, dropping frame");
            return Ok(());
        }
        header.hop_limit -= 1;
        frame.bytes_mut()[7] = header.hop_limit;

        let route = match self.ctx.router.get_best(&header.destination) {
            Some(route) => route,
            None => {
                self.ctx.stats.route_misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("no route to forward frame, dropping");
                return Ok(());
            }
        };
        let session = self.ctx.outer_sessions.get(route.label, Some(route.peer_public_key));
        session.encrypt(&mut frame)?;
        self.send_to_switch(route.label, frame)
    }

    /// The frame is addressed to us (§4.6). Router-module traffic crosses
    /// the inner crypto layer exactly like ordinary content — it has no
    /// way to reach us otherwise, since the outer layer only ever reveals
    /// the IPv6 header — so the frame is always content-decrypted first,
    /// and the router-traffic predicate (§4.1) is evaluated against the
    /// plaintext to decide whether it goes to the router module or the
    /// tunnel.
    fn incoming_for_me(&self, peer_key: [u8; 32], mut header: Ipv6Header, frame: Frame) -> Result<()> {
        let mut plaintext = frame.bytes().to_vec();
        self.ctx.content_sessions.decrypt_from(&header.source, &mut plaintext)?;
        header.payload_length = plaintext.len() as u16;

        if is_router_traffic(&header, &plaintext) {
            self.ctx.stats.router_traffic_in.fetch_add(1, Ordering::Relaxed);
            let udp_payload = plaintext[crate::ipv6::UDP_HEADER_LEN..].to_vec();
            let peer = Address { public_key: peer_key, ip6: header.source, network_address: 0 };
            return self.send_to_router(DhtMessage { peer, payload: udp_payload });
        }

        let mut out = Frame::from_payload(&plaintext);
        header.prepend_to(&mut out)?;
        self.ctx.stats.frames_to_tun.fetch_add(1, Ordering::Relaxed);
        self.ctx.tunnel.deliver(out)
    }

    /// Hands an inbound routing-module message to the router
    /// collaborator.
    fn send_to_router(&self, message: DhtMessage) -> Result<()> {
        self.ctx.router.handle_incoming(message)
    }

    // ---- outbound path: tunnel/router -> crypto -> switch ----

    /// Entry point for a plaintext IPv6 packet the local tunnel device
    /// handed us (§4.6). Unlike the switch-originated path, failures here
    /// are surfaced back to the caller rather than logged and dropped,
    /// since the tunnel device is a synchronous caller waiting on a
    /// result (§7).
    pub fn ip6_from_tun(&self, frame: Frame) -> Result<()> {
        self.ctx.stats.frames_from_tun.fetch_add(1, Ordering::Relaxed);
        let header = Ipv6Header::parse(&frame).map_err(|_| DispatchOutcome::Invalid)?;
        if header.source != self.ctx.our_address.ip6 {
            return Err(DispatchOutcome::Invalid.into());
        }
        let mut payload = frame.bytes()[crate::ipv6::IPV6_HEADER_LEN..].to_vec();
        self.handle_outgoing(header, &mut payload)
    }

    /// Encrypts a locally-originated payload with the content layer and
    /// passes it on to [`outgoing_from_me`](Self::outgoing_from_me).
    fn handle_outgoing(&self, header: Ipv6Header, payload: &mut Vec<u8>) -> Result<()> {
        self.ctx.content_sessions.encrypt_for(&header.destination, payload)?;
        self.outgoing_from_me(header, payload.clone())
    }

    /// Originates an in-band routing-module message toward `destination`
    /// (§6). Router traffic crosses the inner content session exactly
    /// like ordinary data — [`handle_outgoing`](Self::handle_outgoing)
    /// content-encrypts it before it ever reaches the outer layer — so a
    /// content key for `destination` must already be pinned.
    pub fn send_router_message(&self, destination: &Address, payload: Vec<u8>) -> Result<()> {
        let udp = UdpHeader::zero_ported(payload.len() as u16);
        let mut body = udp.encode().to_vec();
        body.extend_from_slice(&payload);

        let header = Ipv6Header {
            payload_length: body.len() as u16,
            next_header: NEXT_HEADER_UDP,
            hop_limit: self.ctx.router_traffic_initial_hop_limit,
            source: self.ctx.our_address.ip6,
            destination: destination.ip6,
        };
        self.ctx.stats.router_traffic_out.fetch_add(1, Ordering::Relaxed);
        self.handle_outgoing(header, &mut body)
    }

    /// Prepends the IPv6 header, resolves a route, wraps the outer
    /// crypto layer, and hands the result to
    /// [`send_to_switch`](Self::send_to_switch).
    ///
    /// `payload_length` is recomputed from `payload` rather than trusted
    /// from the caller: content-layer encryption can grow a payload (AEAD
    /// nonce and tag overhead), and the receiving peer's header parse
    /// rejects any mismatch between the stamped length and the frame it
    /// actually received.
    ///
    /// If `header.destination` is already our own address, the payload
    /// is a decryption response the inner session handed back to be sent
    /// rather than delivered locally (a "kickback"); source and
    /// destination are swapped so it actually goes out to the peer it
    /// answers.
    fn outgoing_from_me(&self, mut header: Ipv6Header, payload: Vec<u8>) -> Result<()> {
        header.payload_length = payload.len() as u16;
        if header.destination == self.ctx.our_address.ip6 {
            std::mem::swap(&mut header.source, &mut header.destination);
        }

        let mut frame = Frame::from_payload(&payload);
        header.prepend_to(&mut frame)?;

        let route = match self.ctx.router.get_best(&header.destination) {
            Some(route) => route,
            None => {
                self.ctx.stats.route_misses.fetch_add(1, Ordering::Relaxed);
                return Err(DispatchOutcome::Undeliverable.into());
            }
        };

        let session = self.ctx.outer_sessions.get(route.label, Some(route.peer_public_key));
        session.encrypt(&mut frame)?;
        self.send_to_switch(route.label, frame)
    }

    /// Prepends the switch header and emits the frame to the switch
    /// fabric collaborator.
    fn send_to_switch(&self, label: u64, mut frame: Frame) -> Result<()> {
        let header = SwitchHeader::data(label);
        header.encode_into(&mut frame)?;
        self.ctx.stats.frames_to_switch.fetch_add(1, Ordering::Relaxed);
        self.ctx.switch.send_message(frame)
    }
}

/// Constructs a [`Dispatcher`] around a freshly-built [`Context`];
/// convenience used by [`crate::register::register`].
pub fn new_dispatcher(ctx: Context) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_session::KeyedSessionManager;
    use crate::context::DispatcherConfig;
    use crate::crypto::CryptoConfig;
    use crate::outer_session::{CryptoAuth, OuterSession, SessionState};
    use crate::router::RouterModule;
    use crate::router::test_support::RecordingRouter;
    use crate::switch::SwitchInterface;
    use crate::tunnel::test_support::RecordingTunnel;
    use std::sync::Mutex;

    /// A loopback outer session: "encrypts" with a fixed XOR so tests
    /// can exercise the full dispatch chain without a real handshake.
    struct LoopbackSession {
        peer_key: [u8; 32],
    }

    impl OuterSession for LoopbackSession {
        fn decrypt(&self, _frame: &mut Frame) -> Result<()> {
            Ok(())
        }
        fn encrypt(&self, _frame: &mut Frame) -> Result<()> {
            Ok(())
        }
        fn peer_public_key(&self) -> Option<[u8; 32]> {
            Some(self.peer_key)
        }
        fn state(&self) -> SessionState {
            SessionState::Established
        }
    }

    struct LoopbackCryptoAuth {
        fixed_peer_key: [u8; 32],
    }

    impl CryptoAuth for LoopbackCryptoAuth {
        fn our_public_key(&self) -> [u8; 32] {
            [1u8; 32]
        }
        fn wrap(&self, _peer_key: Option<[u8; 32]>) -> Arc<dyn OuterSession> {
            Arc::new(LoopbackSession { peer_key: self.fixed_peer_key })
        }
    }

    struct RecordingSwitch {
        sent: Mutex<Vec<Frame>>,
    }

    impl SwitchInterface for RecordingSwitch {
        fn send_message(&self, frame: Frame) -> Result<()> {
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }
    }

    fn build(peer_key: [u8; 32]) -> (Arc<Dispatcher>, Arc<RecordingTunnel>, Arc<RecordingRouter>, Arc<RecordingSwitch>) {
        let our_address = Address::from_authenticated_key([9u8; 32], 1).unwrap();
        let crypto_auth = Arc::new(LoopbackCryptoAuth { fixed_peer_key: peer_key });
        let switch = Arc::new(RecordingSwitch { sent: Mutex::new(Vec::new()) });
        let tunnel = Arc::new(RecordingTunnel::default());
        let router = Arc::new(RecordingRouter::default());
        let content_sessions = Arc::new(KeyedSessionManager::new(CryptoConfig::Plain));

        let peer_ip6 = Address::prefix_of(&peer_key);
        content_sessions.set_key(peer_ip6, [3u8; 32]);

        let ctx = Context::new(
            our_address,
            crypto_auth,
            switch.clone(),
            tunnel.clone(),
            router.clone(),
            content_sessions,
            DispatcherConfig::default(),
        );
        (Arc::new(Dispatcher::new(ctx)), tunnel, router, switch)
    }

    #[test]
    fn data_frame_for_us_is_delivered_to_tunnel() {
        let peer_key = [5u8; 32];
        let (dispatcher, tunnel, _router, _switch) = build(peer_key);

        let peer_ip6 = Address::prefix_of(&peer_key);
        let plaintext = b"hello node".to_vec();
        let header = Ipv6Header {
            payload_length: plaintext.len() as u16,
            next_header: 59,
            hop_limit: 40,
            source: peer_ip6,
            destination: dispatcher.ctx.our_address.ip6,
        };

        let mut inner = Frame::from_payload(&plaintext);
        header.prepend_to(&mut inner).unwrap();
        SwitchHeader::data(0x42).encode_into(&mut inner).unwrap();

        dispatcher.incoming_from_switch(inner).unwrap();

        let delivered = tunnel.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(&delivered[0][crate::ipv6::IPV6_HEADER_LEN..], &plaintext[..]);
    }

    #[test]
    fn router_traffic_is_routed_to_router_module_not_tunnel() {
        let peer_key = [6u8; 32];
        let (dispatcher, tunnel, router, _switch) = build(peer_key);

        let peer_ip6 = Address::prefix_of(&peer_key);
        let dht_payload = b"dht-ping".to_vec();
        let udp = UdpHeader::zero_ported(dht_payload.len() as u16);
        let mut body = udp.encode().to_vec();
        body.extend_from_slice(&dht_payload);

        let header = Ipv6Header {
            payload_length: body.len() as u16,
            next_header: NEXT_HEADER_UDP,
            hop_limit: 0,
            source: peer_ip6,
            destination: dispatcher.ctx.our_address.ip6,
        };

        let mut inner = Frame::from_payload(&body);
        header.prepend_to(&mut inner).unwrap();
        SwitchHeader::data(0x43).encode_into(&mut inner).unwrap();

        dispatcher.incoming_from_switch(inner).unwrap();

        assert!(tunnel.delivered.lock().unwrap().is_empty());
        let received = router.received.read().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].payload, dht_payload);
    }

    #[test]
    fn spoofed_source_address_is_dropped() {
        let peer_key = [7u8; 32];
        let (dispatcher, tunnel, _router, _switch) = build(peer_key);

        let wrong_source = Address::prefix_of(&[8u8; 32]);
        let plaintext = b"forged".to_vec();
        let header = Ipv6Header {
            payload_length: plaintext.len() as u16,
            next_header: 59,
            hop_limit: 40,
            source: wrong_source,
            destination: dispatcher.ctx.our_address.ip6,
        };
        let mut inner = Frame::from_payload(&plaintext);
        header.prepend_to(&mut inner).unwrap();
        SwitchHeader::data(0x44).encode_into(&mut inner).unwrap();

        dispatcher.incoming_from_switch(inner).unwrap();
        assert!(tunnel.delivered.lock().unwrap().is_empty());
        assert_eq!(dispatcher.stats().binding_failures, 1);
    }

    #[test]
    fn ip6_from_tun_with_foreign_source_is_rejected() {
        let peer_key = [16u8; 32];
        let (dispatcher, _tunnel, _router, _switch) = build(peer_key);

        let foreign_source = Address::prefix_of(&[17u8; 32]);
        let destination = Address::prefix_of(&[18u8; 32]);
        let payload = b"not mine".to_vec();
        let header = Ipv6Header {
            payload_length: payload.len() as u16,
            next_header: 59,
            hop_limit: 40,
            source: foreign_source,
            destination,
        };
        let mut frame = Frame::from_payload(&payload);
        header.prepend_to(&mut frame).unwrap();

        let err = dispatcher.ip6_from_tun(frame).unwrap_err();
        assert_eq!(err.downcast_ref::<crate::errors::DispatchOutcome>(), Some(&crate::errors::DispatchOutcome::Invalid));
    }

    #[test]
    fn ip6_from_tun_with_no_route_is_an_error() {
        let peer_key = [10u8; 32];
        let (dispatcher, _tunnel, _router, _switch) = build(peer_key);

        let destination = Address::prefix_of(&[11u8; 32]);
        let payload = b"outbound".to_vec();
        let header = Ipv6Header {
            payload_length: payload.len() as u16,
            next_header: 59,
            hop_limit: 40,
            source: dispatcher.ctx.our_address.ip6,
            destination,
        };
        let mut frame = Frame::from_payload(&payload);
        header.prepend_to(&mut frame).unwrap();

        assert!(dispatcher.ip6_from_tun(frame).is_err());
    }

    #[test]
    fn ip6_from_tun_with_known_route_reaches_switch() {
        let peer_key = [12u8; 32];
        let (dispatcher, _tunnel, router, switch) = build(peer_key);

        let destination_key = [13u8; 32];
        let destination_addr = Address::from_authenticated_key(destination_key, 0).unwrap();
        router.add_node(destination_addr, 0x99);
        dispatcher
            .ctx
            .content_sessions
            .set_key(destination_addr.ip6, [4u8; 32]);

        let payload = b"outbound".to_vec();
        let header = Ipv6Header {
            payload_length: payload.len() as u16,
            next_header: 59,
            hop_limit: 40,
            source: dispatcher.ctx.our_address.ip6,
            destination: destination_addr.ip6,
        };
        let mut frame = Frame::from_payload(&payload);
        header.prepend_to(&mut frame).unwrap();

        dispatcher.ip6_from_tun(frame).unwrap();
        assert_eq!(switch.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn send_router_message_reaches_switch_with_zero_hop_limit() {
        let peer_key = [14u8; 32];
        let (dispatcher, _tunnel, router, switch) = build(peer_key);

        let destination_key = [15u8; 32];
        let destination_addr = Address::from_authenticated_key(destination_key, 0).unwrap();
        router.add_node(destination_addr, 0x55);
        dispatcher.ctx.content_sessions.set_key(destination_addr.ip6, [1u8; 32]);

        dispatcher.send_router_message(&destination_addr, b"ping".to_vec()).unwrap();
        assert_eq!(switch.sent.lock().unwrap().len(), 1);
        assert_eq!(dispatcher.stats().router_traffic_out, 1);
    }

    #[test]
    fn forwarded_frame_has_hop_limit_decremented() {
        let peer_key = [20u8; 32];
        let (dispatcher, _tunnel, router, switch) = build(peer_key);

        let destination_key = [21u8; 32];
        let destination_addr = Address::from_authenticated_key(destination_key, 0).unwrap();
        router.add_node(destination_addr, 0x77);

        let peer_ip6 = Address::prefix_of(&peer_key);
        let plaintext = b"not for us".to_vec();
        let header = Ipv6Header {
            payload_length: plaintext.len() as u16,
            next_header: 59,
            hop_limit: 5,
            source: peer_ip6,
            destination: destination_addr.ip6,
        };
        let mut inner = Frame::from_payload(&plaintext);
        header.prepend_to(&mut inner).unwrap();
        SwitchHeader::data(0x42).encode_into(&mut inner).unwrap();

        dispatcher.incoming_from_switch(inner).unwrap();

        let sent = switch.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let forwarded = Ipv6Header::parse(&sent[0]).unwrap();
        assert_eq!(forwarded.hop_limit, 4);
    }

    #[test]
    fn forwarded_frame_with_zero_hop_limit_is_dropped() {
        let peer_key = [23u8; 32];
        let (dispatcher, _tunnel, router, switch) = build(peer_key);

        let destination_key = [24u8; 32];
        let destination_addr = Address::from_authenticated_key(destination_key, 0).unwrap();
        router.add_node(destination_addr, 0x78);

        let peer_ip6 = Address::prefix_of(&peer_key);
        let plaintext = b"stale ttl".to_vec();
        let header = Ipv6Header {
            payload_length: plaintext.len() as u16,
            next_header: 59,
            hop_limit: 0,
            source: peer_ip6,
            destination: destination_addr.ip6,
        };
        let mut inner = Frame::from_payload(&plaintext);
        header.prepend_to(&mut inner).unwrap();
        SwitchHeader::data(0x42).encode_into(&mut inner).unwrap();

        dispatcher.incoming_from_switch(inner).unwrap();

        assert!(switch.sent.lock().unwrap().is_empty());
        assert_eq!(dispatcher.stats().hop_limit_exceeded, 1);
    }

    #[test]
    fn successful_inbound_frame_registers_peer_with_router() {
        let peer_key = [26u8; 32];
        let (dispatcher, _tunnel, router, _switch) = build(peer_key);

        let peer_ip6 = Address::prefix_of(&peer_key);
        let plaintext = b"hello node".to_vec();
        let header = Ipv6Header {
            payload_length: plaintext.len() as u16,
            next_header: 59,
            hop_limit: 40,
            source: peer_ip6,
            destination: dispatcher.ctx.our_address.ip6,
        };
        let mut inner = Frame::from_payload(&plaintext);
        header.prepend_to(&mut inner).unwrap();
        SwitchHeader::data(0x50).encode_into(&mut inner).unwrap();

        dispatcher.incoming_from_switch(inner).unwrap();

        let route = router.get_best(&peer_ip6).expect("peer should be registered");
        assert_eq!(route.label, 0x50);
        assert_eq!(route.peer_public_key, peer_key);
    }
}
