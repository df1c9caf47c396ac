//! The listener loop: one task owns the socket and all core state,
//! reading a datagram, running it through the loss gate, the codec,
//! the semantics filter and dispatcher, and writing back a reply,
//! fanning out callback datagrams to active subscribers along the way.

use crate::controller::{command_channel, CommandReceiver, CommandSender, Controller};
use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::history::History;
use crate::semantics;
use crate::state::SharedState;
use bankrpc_core::codec::{Decode, Encode};
use bankrpc_core::wire::PAYLOAD_LEN;
use bankrpc_core::{Request, SemanticsMode};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use crate::controller::EventReceiver;

/// A 200-byte framing margin ahead of the 1200-byte payload region.
const DATAGRAM_LEN: usize = 200 + PAYLOAD_LEN;

pub struct Server {
    socket: UdpSocket,
    shared: Arc<SharedState>,
    controller: Controller,
    commands: CommandReceiver,
}

impl Server {
    /// Binds the listener socket. Bind failure is fatal at startup,
    /// the caller should log and exit, not retry.
    pub async fn bind(
        addr: SocketAddr,
        initial_mode: SemanticsMode,
        initial_loss_threshold: u8,
    ) -> Result<(Server, EventReceiver, CommandSender), ServerError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let (controller, events) = Controller::new();
        let (command_sender, commands) = command_channel();
        let shared = Arc::new(SharedState::new(initial_mode, initial_loss_threshold));
        info!(%addr, "bound udp socket");
        Ok((
            Server {
                socket,
                shared,
                controller,
                commands,
            },
            events,
            command_sender,
        ))
    }

    pub fn shared_state(&self) -> Arc<SharedState> {
        self.shared.clone()
    }

    /// The address actually bound, useful when `bind` was called with port
    /// 0 (let the OS pick one), e.g. in tests.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Runs the listener loop until `shutdown` is cancelled. No in-flight
    /// request survives the cancellation.
    pub async fn run(self, shutdown: CancellationToken) {
        let Server {
            socket,
            shared,
            controller,
            mut commands,
        } = self;
        let mut dispatcher = Dispatcher::new(controller.clone());
        let mut history = History::new();
        let mut buf = vec![0u8; DATAGRAM_LEN];

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    controller.on_console("server shutting down");
                    break;
                }
                Some(command) = commands.recv() => {
                    apply_command(&shared, &controller, command);
                }
                received = socket.recv_from(&mut buf) => {
                    let (n, from) = match received {
                        Ok(v) => v,
                        Err(err) => {
                            warn!(%err, "recvfrom failed");
                            continue;
                        }
                    };

                    if !shared.loss.admit() {
                        debug!("experimental simulation: package lost during receiving request");
                        continue;
                    }

                    let request = match Request::decode(&buf[..n]) {
                        Ok(request) => request,
                        Err(err) => {
                            debug!(%err, "discarding undecodable datagram");
                            continue;
                        }
                    };

                    controller.on_request_received(from.ip(), request.clone());

                    let mode = shared.mode.get();
                    let outcome = match semantics::apply(mode, &mut history, &mut dispatcher, from, request) {
                        Ok(Some(outcome)) => outcome,
                        Ok(None) => continue,
                        Err(err) => {
                            debug!(%err, "discarding request with undecodable payload");
                            continue;
                        }
                    };

                    if shared.loss.admit() {
                        let encoded = outcome.response.encode_to_vec();
                        match socket.send_to(&encoded, from).await {
                            Ok(_) => controller.on_response_posted(from.ip(), outcome.response.clone()),
                            Err(err) => warn!(%err, "sendto failed"),
                        }
                    } else {
                        debug!("experimental simulation: package lost during posting response");
                    }

                    for (target, callback) in outcome.fan_out {
                        if !shared.loss.admit() {
                            debug!(%target, "experimental simulation: callback package lost");
                            continue;
                        }
                        let encoded = callback.encode_to_vec();
                        if let Err(err) = socket.send_to(&encoded, target).await {
                            warn!(%err, %target, "sendto failed for callback");
                        }
                    }
                }
            }
        }
    }
}

fn apply_command(shared: &Arc<SharedState>, controller: &Controller, command: crate::controller::Command) {
    match command {
        crate::controller::Command::SetMode(mode) => {
            shared.mode.set(mode);
            controller.on_console(format!("mode changed to {}", mode.as_str()));
        }
        crate::controller::Command::SetLossThreshold(threshold) => {
            shared.loss.set_threshold(threshold);
            controller.on_console(format!("loss threshold changed to {threshold}"));
        }
    }
}
