use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::enums::{AlertDescription, HandshakeType, ProtocolVersion};
use crate::error::Error;
use crate::handshake::HandshakeState;
use crate::key_schedule;
use crate::lock::Mutex;
use crate::log::{debug, trace, warn};
use crate::msgs::alert::AlertMessagePayload;
use crate::msgs::base::Payload;
use crate::msgs::enums::{AlertLevel, KeyUpdateRequest};
use crate::msgs::handshake::{HandshakeMessagePayload, HandshakePayload, NewSessionTicketPayloadTls13};
use crate::msgs::message::{Message, Message13, MAX_FRAGMENT_LEN};
use crate::persist::{NoSessionStorage, SessionData, SessionStore, TicketInfo};
use crate::record_layer::RecordLayer;

/// Which side of a connection we play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The side that initiates the handshake.
    Client,
    /// The side that accepts the handshake.
    Server,
}

/// Where a connection is in its lifecycle.
///
/// The handshake collaborator drives the transitions; the driver only
/// reads the stage, and decrements the early-data budget.  A `KeyUpdate`
/// may be processed or sent only in `Established`, and early application
/// data is only delivered in `EarlyData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficStage {
    /// The handshake has not finished.
    Handshaking,
    /// TLS1.3 server side: 0-RTT was accepted, with this many bytes of
    /// budget remaining.
    EarlyData {
        /// How many more early-data bytes the peer may send.
        remaining: u32,
    },
    /// TLS1.3 server side: 0-RTT was rejected; any early data received
    /// is discarded without surfacing.
    EarlyDataRejected,
    /// Normal post-handshake steady state.
    Established,
}

/// Request flag for application-initiated key updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUpdateMode {
    /// Update our send direction only.
    OneWay,
    /// Update our send direction, and ask the peer to update theirs.
    TwoWay,
}

/// A deferred handler for one TLS1.3 post-handshake message.
///
/// The initial handshake installs these (in order) when it knows that a
/// later message must be serviced; post-handshake client authentication
/// is the canonical case.  The driver pops exactly one handler per
/// otherwise-unhandled handshake message and invokes it while holding the
/// connection's read/write lock, so a handler may both read and write
/// records.  Handlers must not call [`Connection::update_key`], which
/// needs that same lock.
pub trait PostHandshakeAction: Send {
    /// Service `message` on `conn`.
    fn handle(&mut self, conn: &Connection, message: HandshakeMessagePayload) -> Result<(), Error>;
}

/// The handshake collaborator: runs initial handshakes and TLS1.2
/// renegotiation on top of a [`Connection`].
///
/// The driver invokes this with `Some(message)` when the peer requests
/// renegotiation (a `HelloRequest` seen by a client, a `ClientHello`
/// seen by a server), and [`Connection::handshake`] forwards to it with
/// `None`.  Renegotiation runs concurrently with any in-flight
/// `send_data` callers; implementations own that hazard.
pub trait HandshakeDriver: Send + Sync {
    /// Run a handshake, possibly triggered by `received`.
    fn handshake(
        &self,
        conn: &Connection,
        received: Option<HandshakeMessagePayload>,
    ) -> Result<(), Error>;
}

/// A live TLS session above a [`RecordLayer`].
///
/// This is the long-lived per-connection object: it owns the protocol
/// plane selection (TLS1.3 against everything older), the post-handshake
/// message machinery, the early-data budget, the session-invalidation
/// hook, and the alert/termination protocol.  All methods take `&self`;
/// the connection is callable from several threads and serializes record
/// I/O internally:
///
/// * a *read lock* is held for the duration of each single record read,
///   never across loop iterations, so a concurrent [`Self::update_key`]
///   can interleave between records;
/// * a *read/write lock* is held while a [`PostHandshakeAction`] runs,
///   and across the send-then-rekey pairs of the key-update protocol.
///
/// Once a fatal error has terminated the session, the terminal
/// [`Error::Terminated`] is replayed by every subsequent call.
pub struct Connection {
    record_layer: Arc<dyn RecordLayer>,
    version: ProtocolVersion,
    side: Side,
    stage: Mutex<TrafficStage>,
    eof: AtomicBool,
    sent_close_notify: AtomicBool,
    fault: Mutex<Option<Error>>,
    read_lock: Mutex<()>,
    readwrite_lock: Mutex<()>,
    session_store: Mutex<Arc<dyn SessionStore>>,
    session_id: Mutex<Option<Vec<u8>>>,
    handshake_state: Mutex<Option<HandshakeState>>,
    pending_actions: Mutex<VecDeque<Box<dyn PostHandshakeAction>>>,
    handshaker: Mutex<Option<Arc<dyn HandshakeDriver>>>,
    alpn_protocol: Mutex<Option<Vec<u8>>>,
    sni_hostname: Mutex<Option<String>>,
}

impl Connection {
    /// Make a connection over `record_layer`, speaking `version`, as `side`.
    ///
    /// The connection starts in [`TrafficStage::Handshaking`] with no
    /// session storage; the handshake collaborator wires up the rest via
    /// the setters.
    pub fn new(record_layer: Arc<dyn RecordLayer>, version: ProtocolVersion, side: Side) -> Self {
        Self {
            record_layer,
            version,
            side,
            stage: Mutex::new(TrafficStage::Handshaking),
            eof: AtomicBool::new(false),
            sent_close_notify: AtomicBool::new(false),
            fault: Mutex::new(None),
            read_lock: Mutex::new(()),
            readwrite_lock: Mutex::new(()),
            session_store: Mutex::new(Arc::new(NoSessionStorage)),
            session_id: Mutex::new(None),
            handshake_state: Mutex::new(None),
            pending_actions: Mutex::new(VecDeque::new()),
            handshaker: Mutex::new(None),
            alpn_protocol: Mutex::new(None),
            sni_hostname: Mutex::new(None),
        }
    }

    // --- collaborator wiring -------------------------------------------------

    /// Attach the shared session store.
    pub fn set_session_store(&self, store: Arc<dyn SessionStore>) {
        if let Some(mut guard) = self.session_store.lock() {
            *guard = store;
        }
    }

    /// Attach the handshake/renegotiation collaborator.
    pub fn set_handshake_driver(&self, driver: Arc<dyn HandshakeDriver>) {
        if let Some(mut guard) = self.handshaker.lock() {
            *guard = Some(driver);
        }
    }

    /// Record the identifier under which this session lives in the
    /// session store, so that termination can invalidate it.
    pub fn set_session_id(&self, id: Option<Vec<u8>>) {
        if let Some(mut guard) = self.session_id.lock() {
            *guard = id;
        }
    }

    /// Install per-handshake bookkeeping.
    pub fn set_handshake_state(&self, hs: HandshakeState) {
        if let Some(mut guard) = self.handshake_state.lock() {
            *guard = Some(hs);
        }
    }

    /// Remove and return the per-handshake bookkeeping.
    pub fn take_handshake_state(&self) -> Option<HandshakeState> {
        self.handshake_state
            .lock()
            .and_then(|mut guard| guard.take())
    }

    /// Run `f` against the per-handshake bookkeeping, if present.
    pub fn with_handshake_state<T>(&self, f: impl FnOnce(&mut HandshakeState) -> T) -> Option<T> {
        let mut guard = self.handshake_state.lock()?;
        guard.as_mut().map(f)
    }

    /// Append a deferred post-handshake message handler.
    pub fn queue_pending_action(&self, action: Box<dyn PostHandshakeAction>) {
        if let Some(mut guard) = self.pending_actions.lock() {
            guard.push_back(action);
        }
    }

    /// Move the connection to `stage`.
    pub fn set_traffic_stage(&self, stage: TrafficStage) {
        if let Some(mut guard) = self.stage.lock() {
            *guard = stage;
        }
    }

    /// Record the ALPN outcome.
    pub fn set_alpn_protocol(&self, protocol: Option<Vec<u8>>) {
        if let Some(mut guard) = self.alpn_protocol.lock() {
            *guard = protocol;
        }
    }

    /// Record the hostname the client offered in SNI.
    pub fn set_sni_hostname(&self, hostname: Option<String>) {
        if let Some(mut guard) = self.sni_hostname.lock() {
            *guard = hostname;
        }
    }

    // --- accessors -----------------------------------------------------------

    /// The current lifecycle stage.
    pub fn traffic_stage(&self) -> TrafficStage {
        self.stage
            .lock()
            .map(|guard| *guard)
            .unwrap_or(TrafficStage::Handshaking)
    }

    /// The protocol agreed via ALPN, if any.
    pub fn alpn_protocol(&self) -> Option<Vec<u8>> {
        self.alpn_protocol
            .lock()
            .and_then(|guard| guard.clone())
    }

    /// The hostname the client advertised via SNI, if any.
    pub fn sni_hostname(&self) -> Option<String> {
        self.sni_hostname
            .lock()
            .and_then(|guard| guard.clone())
    }

    /// The negotiated protocol version.
    pub fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    /// Which side of the connection this is.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Whether end of stream has been observed (peer close_notify or
    /// transport EOF).
    pub fn eof(&self) -> bool {
        self.eof.load(Ordering::SeqCst)
    }

    // --- application interface -----------------------------------------------

    /// Run the initial handshake via the installed [`HandshakeDriver`].
    pub fn handshake(&self) -> Result<(), Error> {
        self.check_valid()?;
        match self.handshake_driver() {
            Some(driver) => driver.handshake(self, None),
            None => Err(Error::General("no handshake driver installed".into())),
        }
    }

    /// Receive the next chunk of application data.
    ///
    /// Returns an empty chunk on clean closure (the peer's close_notify,
    /// or transport EOF between records).  Zero-length application
    /// records never surface: the loop retries until it has real bytes,
    /// a closure, or a fault.
    ///
    /// Fails with [`Error::Terminated`] on fatal protocol errors and
    /// fatal peer alerts; the session is invalidated and a best-effort
    /// alert has been sent before this returns.
    pub fn recv_data(&self) -> Result<Vec<u8>, Error> {
        self.check_valid()?;
        if self.eof() {
            return Ok(Vec::new());
        }

        match self.version {
            ProtocolVersion::TLSv1_3 => self.recv_data_13(),
            _ => self.recv_data_12(),
        }
    }

    /// Receive the next chunks of application data.
    #[deprecated(note = "use `recv_data`")]
    pub fn recv_data_lazy(&self) -> Result<Vec<Vec<u8>>, Error> {
        self.recv_data().map(|chunk| {
            if chunk.is_empty() {
                Vec::new()
            } else {
                vec![chunk]
            }
        })
    }

    /// Send application data, fragmenting it to the plaintext record
    /// limit.
    ///
    /// Serialization of concurrent senders is the record layer's
    /// business; this method adds no locking of its own.
    pub fn send_data(&self, data: &[u8]) -> Result<(), Error> {
        self.check_valid()?;

        for chunk in data.chunks(MAX_FRAGMENT_LEN) {
            match self.version {
                ProtocolVersion::TLSv1_3 => self
                    .record_layer
                    .write_record_13(Message13::ApplicationData(Payload::new(chunk.to_vec())))?,
                _ => self
                    .record_layer
                    .write_record(Message::ApplicationData(Payload::new(chunk.to_vec())))?,
            }
        }
        Ok(())
    }

    /// Announce the end of our sending.
    ///
    /// Sends a close_notify warning alert unless end of stream was
    /// already observed or we already said goodbye.  This does not close
    /// the transport (that remains the application's job), but for
    /// TLS1.2 and below it must happen before transport close to keep
    /// the session resumable.
    pub fn bye(&self) -> Result<(), Error> {
        self.check_valid()?;
        if self.eof() || self.sent_close_notify.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("sending close_notify");
        self.send_alert(AlertLevel::Warning, AlertDescription::CloseNotify)
    }

    /// Initiate a key update for our send direction.
    ///
    /// Key updates exist only in TLS1.3: on older versions this returns
    /// `false` without side effects.  In TLS1.3, sends a `KeyUpdate`
    /// handshake message carrying the given request flag, advances the
    /// send traffic secret, and returns `true`.  The send and the rekey
    /// are atomic with respect to the receive loop's own key-update
    /// responses: the `KeyUpdate` is the last record sent under the old
    /// key.
    pub fn update_key(&self, mode: KeyUpdateMode) -> Result<bool, Error> {
        self.check_valid()?;
        if self.version != ProtocolVersion::TLSv1_3 {
            return Ok(false);
        }
        if self.traffic_stage() != TrafficStage::Established {
            return Err(Error::General(
                "key update attempted before connection establishment".into(),
            ));
        }

        let request = match mode {
            KeyUpdateMode::OneWay => KeyUpdateRequest::UpdateNotRequested,
            KeyUpdateMode::TwoWay => KeyUpdateRequest::UpdateRequested,
        };

        let _rw = self
            .readwrite_lock
            .lock()
            .ok_or_else(poisoned)?;
        self.record_layer
            .write_record_13(Message13::build_key_update(request))?;
        self.update_write_secret();
        Ok(true)
    }

    // --- receive loops -------------------------------------------------------

    fn recv_data_12(&self) -> Result<Vec<u8>, Error> {
        loop {
            let next = {
                let _read = self.read_lock.lock().ok_or_else(poisoned)?;
                self.record_layer.read_record()
            };

            let record = match next {
                Ok(record) => record,
                Err(err) => return self.on_read_error(err),
            };

            match record {
                Message::Handshake(msgs) => self.renegotiate(msgs)?,
                Message::Alert(alerts) => return self.handle_alerts(&alerts),
                Message::ApplicationData(Payload(data)) => {
                    if data.is_empty() {
                        trace!("dropping zero-length application data record");
                        continue;
                    }
                    return Ok(data);
                }
                Message::ChangeCipherSpec => {
                    return Err(self.unexpected("ChangeCipherSpec during traffic"));
                }
            }
        }
    }

    fn recv_data_13(&self) -> Result<Vec<u8>, Error> {
        loop {
            let next = {
                let _read = self.read_lock.lock().ok_or_else(poisoned)?;
                self.record_layer.read_record_13()
            };

            let record = match next {
                Ok(record) => record,
                Err(err) => return self.on_read_error(err),
            };

            match record {
                Message13::ChangeCipherSpec => {
                    trace!("ignoring middlebox ChangeCipherSpec");
                }
                Message13::Handshake(msgs) => self.process_handshake_13(msgs)?,
                Message13::Alert(alerts) => return self.handle_alerts(&alerts),
                Message13::ApplicationData(Payload(data)) => {
                    if data.is_empty() {
                        trace!("dropping zero-length application data record");
                        continue;
                    }
                    match self.traffic_stage() {
                        TrafficStage::Established => return Ok(data),
                        TrafficStage::EarlyData { remaining } => {
                            if data.len() > remaining as usize {
                                let reason = "early data overflow";
                                return Err(self.terminate(
                                    Error::General(reason.into()),
                                    AlertLevel::Fatal,
                                    AlertDescription::UnexpectedMessage,
                                    reason.into(),
                                ));
                            }
                            self.set_traffic_stage(TrafficStage::EarlyData {
                                remaining: remaining - data.len() as u32,
                            });
                            return Ok(data);
                        }
                        TrafficStage::EarlyDataRejected => {
                            trace!("dropping {} bytes of rejected early data", data.len());
                        }
                        TrafficStage::Handshaking => {
                            let reason = "application data before handshake completion";
                            return Err(self.terminate(
                                Error::peer_misbehaved(reason, AlertDescription::UnexpectedMessage),
                                AlertLevel::Fatal,
                                AlertDescription::UnexpectedMessage,
                                reason.into(),
                            ));
                        }
                    }
                }
            }
        }
    }

    /// Walk the handshake messages of one TLS1.3 record, in order.
    fn process_handshake_13(&self, msgs: Vec<HandshakeMessagePayload>) -> Result<(), Error> {
        for msg in msgs {
            match msg.payload {
                HandshakePayload::NewSessionTicketTls13(nst) => self.install_session_ticket(nst)?,
                HandshakePayload::KeyUpdate(request) => self.handle_key_update(request)?,
                HandshakePayload::ClientHello(_) => {
                    return Err(self.unexpected("ClientHello (no renegotiation in TLS1.3)"));
                }
                payload => {
                    let restored = HandshakeMessagePayload {
                        typ: msg.typ,
                        payload,
                    };
                    match self.pop_pending_action() {
                        Some(mut action) => {
                            let _rw = self
                                .readwrite_lock
                                .lock()
                                .ok_or_else(poisoned)?;
                            action.handle(self, restored)?;
                        }
                        None => {
                            return Err(self.unexpected(&format!("{:?}", restored.typ)));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Derive and store the PSK conveyed by one `NewSessionTicket`.
    ///
    /// Each ticket of a flight is installed independently.
    fn install_session_ticket(&self, nst: NewSessionTicketPayloadTls13) -> Result<(), Error> {
        let resumption_secret = self
            .with_handshake_state(|hs| hs.master_secret().map(<[u8]>::to_vec))
            .flatten();
        let Some(resumption_secret) = resumption_secret else {
            let reason = "no resumption secret available for session ticket";
            return Err(self.terminate(
                Error::General(reason.into()),
                AlertLevel::Fatal,
                AlertDescription::InternalError,
                reason.into(),
            ));
        };

        let tx = self.record_layer.write_state();
        let psk = key_schedule::derive_ticket_psk(tx.hash, &resumption_secret, &nst.nonce.0);
        let max_early_data_size = nst.max_early_data_size();

        debug!(
            "installing session ticket: lifetime {}s, max early data {}",
            nst.lifetime, max_early_data_size
        );

        let data = SessionData {
            suite: tx.suite,
            hash: tx.hash,
            secret: psk,
            max_early_data_size,
            ticket: TicketInfo::new(nst.lifetime, nst.age_add),
        };
        self.session_store().insert(&nst.ticket.0, data);
        Ok(())
    }

    /// Service a received `KeyUpdate`.
    ///
    /// For `update_requested` the order is mandatory: rekey our receive
    /// direction, send our own `KeyUpdate(update_not_requested)`, then
    /// rekey our send direction.  Incoming traffic is then never
    /// decrypted with a key the peer has not started using, and our
    /// response is the last record under the old send key.
    fn handle_key_update(&self, request: KeyUpdateRequest) -> Result<(), Error> {
        if self.traffic_stage() != TrafficStage::Established {
            let reason = "KeyUpdate received before connection establishment";
            return Err(self.terminate(
                Error::peer_misbehaved(reason, AlertDescription::UnexpectedMessage),
                AlertLevel::Fatal,
                AlertDescription::UnexpectedMessage,
                reason.into(),
            ));
        }

        match request {
            KeyUpdateRequest::UpdateNotRequested => {
                self.update_read_secret();
            }
            KeyUpdateRequest::UpdateRequested => {
                self.update_read_secret();

                let _rw = self
                    .readwrite_lock
                    .lock()
                    .ok_or_else(poisoned)?;
                if let Err(err) = self
                    .record_layer
                    .write_record_13(Message13::build_key_update(
                        KeyUpdateRequest::UpdateNotRequested,
                    ))
                {
                    return Err(self.terminate(
                        err,
                        AlertLevel::Fatal,
                        AlertDescription::InternalError,
                        "failed to acknowledge key update".into(),
                    ));
                }
                self.update_write_secret();
            }
            KeyUpdateRequest::Unknown(_) => {
                let reason = "KeyUpdate with an unknown request value";
                return Err(self.terminate(
                    Error::peer_misbehaved(reason, AlertDescription::IllegalParameter),
                    AlertLevel::Fatal,
                    AlertDescription::IllegalParameter,
                    reason.into(),
                ));
            }
        }
        Ok(())
    }

    /// Dispatch a TLS1.2 renegotiation request to the handshake
    /// collaborator.
    fn renegotiate(&self, mut msgs: Vec<HandshakeMessagePayload>) -> Result<(), Error> {
        if msgs.len() != 1 {
            return Err(self.unexpected("handshake flight during traffic"));
        }
        let msg = msgs.remove(0);

        let expected = match self.side {
            Side::Server => HandshakeType::ClientHello,
            Side::Client => HandshakeType::HelloRequest,
        };
        if msg.typ != expected {
            return Err(self.unexpected(&format!("{:?}", msg.typ)));
        }

        let Some(driver) = self.handshake_driver() else {
            let reason = "renegotiation requested but no handshake driver installed";
            return Err(self.terminate(
                Error::General(reason.into()),
                AlertLevel::Fatal,
                AlertDescription::InternalError,
                reason.into(),
            ));
        };

        debug!("renegotiation: {:?}", msg.typ);
        driver.handshake(self, Some(msg))
    }

    /// Classify one record's worth of alerts.
    ///
    /// Returns an empty chunk when the record closes the stream cleanly;
    /// everything else ends the session.
    fn handle_alerts(&self, alerts: &[AlertMessagePayload]) -> Result<Vec<u8>, Error> {
        if let Some(fatal) = alerts
            .iter()
            .find(|alert| alert.level == AlertLevel::Fatal)
        {
            return Err(self.peer_fatal_alert(fatal.description));
        }

        if alerts.iter().any(|alert| {
            alert.level == AlertLevel::Warning && alert.description == AlertDescription::CloseNotify
        }) {
            // Say goodbye in kind; a failure to do so is irrelevant now.
            let _ = self.bye();
            self.eof.store(true, Ordering::SeqCst);
            return Ok(Vec::new());
        }

        for alert in alerts {
            warn!("TLS alert warning received: {:?}", alert.description);
        }
        Err(self.unexpected("warning alert that is not close_notify"))
    }

    // --- termination ---------------------------------------------------------

    /// Map a record-layer read failure onto the session outcome.
    fn on_read_error(&self, err: Error) -> Result<Vec<u8>, Error> {
        match err {
            Error::Eof => {
                self.eof.store(true, Ordering::SeqCst);
                Ok(Vec::new())
            }
            Error::Protocol {
                reason,
                fatal,
                description,
            } => {
                let level = match fatal {
                    true => AlertLevel::Fatal,
                    false => AlertLevel::Warning,
                };
                Err(self.terminate(
                    Error::Protocol {
                        reason: reason.clone(),
                        fatal,
                        description,
                    },
                    level,
                    description,
                    reason,
                ))
            }
            err => {
                let reason = format!("record layer failure: {err}");
                Err(self.terminate(
                    err,
                    AlertLevel::Fatal,
                    AlertDescription::InternalError,
                    reason,
                ))
            }
        }
    }

    /// End the session because of a local fault.
    ///
    /// This is the single convergence point for abnormal exits: the
    /// session is invalidated in the store, a best-effort alert goes
    /// out, end of stream is latched, and the terminal error is recorded
    /// so later API calls fail fast.
    fn terminate(
        &self,
        err: Error,
        level: AlertLevel,
        description: AlertDescription,
        reason: String,
    ) -> Error {
        self.invalidate_session();
        let _ = self.send_alert(level, description);
        self.eof.store(true, Ordering::SeqCst);
        warn!("session terminated: {}", reason);

        let fault = Error::Terminated {
            clean: false,
            reason,
            source: Box::new(err),
        };
        self.record_fault(&fault);
        fault
    }

    /// End the session because the peer sent a fatal alert.
    ///
    /// No alert goes back (the peer is gone), but the session is
    /// invalidated and end of stream latched all the same.
    fn peer_fatal_alert(&self, description: AlertDescription) -> Error {
        self.invalidate_session();
        self.eof.store(true, Ordering::SeqCst);
        warn!("TLS alert fatal received: {:?}", description);

        let fault = Error::Terminated {
            clean: true,
            reason: format!("received fatal error: the peer {description}"),
            source: Box::new(Error::Protocol {
                reason: "remote side fatal error".into(),
                fatal: true,
                description,
            }),
        };
        self.record_fault(&fault);
        fault
    }

    fn unexpected(&self, what: &str) -> Error {
        let reason = format!("unexpected message {what}");
        self.terminate(
            Error::General(reason.clone()),
            AlertLevel::Fatal,
            AlertDescription::UnexpectedMessage,
            reason,
        )
    }

    fn record_fault(&self, fault: &Error) {
        if let Some(mut guard) = self.fault.lock() {
            guard.get_or_insert_with(|| fault.clone());
        }
    }

    fn check_valid(&self) -> Result<(), Error> {
        match self.fault.lock() {
            Some(guard) => match &*guard {
                Some(fault) => Err(fault.clone()),
                None => Ok(()),
            },
            None => Err(poisoned()),
        }
    }

    fn invalidate_session(&self) {
        let session_id = self
            .session_id
            .lock()
            .and_then(|mut guard| guard.take());
        if let Some(session_id) = session_id {
            self.session_store().remove(&session_id);
        }
    }

    // --- key schedule plumbing ----------------------------------------------

    fn update_read_secret(&self) {
        let mut state = self.record_layer.read_state();
        state.secret = key_schedule::next_traffic_secret(state.hash, &state.secret);
        self.record_layer.set_read_state(state);
        debug!("receive traffic secret updated");
    }

    fn update_write_secret(&self) {
        let mut state = self.record_layer.write_state();
        state.secret = key_schedule::next_traffic_secret(state.hash, &state.secret);
        self.record_layer.set_write_state(state);
        debug!("send traffic secret updated");
    }

    // --- small helpers -------------------------------------------------------

    fn send_alert(&self, level: AlertLevel, description: AlertDescription) -> Result<(), Error> {
        match self.version {
            ProtocolVersion::TLSv1_3 => self
                .record_layer
                .write_record_13(Message13::build_alert(level, description)),
            _ => self
                .record_layer
                .write_record(Message::build_alert(level, description)),
        }
    }

    fn session_store(&self) -> Arc<dyn SessionStore> {
        self.session_store
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|| Arc::new(NoSessionStorage))
    }

    fn handshake_driver(&self) -> Option<Arc<dyn HandshakeDriver>> {
        self.handshaker
            .lock()
            .and_then(|guard| guard.clone())
    }

    fn pop_pending_action(&self) -> Option<Box<dyn PostHandshakeAction>> {
        self.pending_actions
            .lock()
            .and_then(|mut guard| guard.pop_front())
    }
}

fn poisoned() -> Error {
    Error::General("connection state lock poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Connection>();
    }
}
