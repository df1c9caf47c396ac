//! End-to-end scenarios over a real UDP socket, driving
//! [`bankrpc_net::Server`] exactly as a client on the wire would: encode
//! a `Request`, `send_to`, `recv_from`, decode the `Response`.

use bankrpc_core::codec::{Decode, Encode};
use bankrpc_core::{Currency, Money, OpCode, Request, Response, SemanticsMode, StatusCode};
use bankrpc_net::Server;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

struct Harness {
    client: UdpSocket,
    server_addr: SocketAddr,
    shutdown: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start(mode: SemanticsMode) -> Harness {
        let (server, mut events, _commands) = Server::bind("127.0.0.1:0".parse().unwrap(), mode, 0)
            .await
            .expect("bind should succeed on an ephemeral port");
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move { while events.recv().await.is_some() {} });

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(server.run(shutdown.clone()));

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(server_addr).await.unwrap();

        Harness {
            client,
            server_addr,
            shutdown,
            task,
        }
    }

    async fn call(&self, req: &Request) -> Response {
        self.client.send(&req.encode_to_vec()).await.unwrap();
        let mut buf = vec![0u8; 1400];
        let n = tokio::time::timeout(Duration::from_secs(2), self.client.recv(&mut buf))
            .await
            .expect("reply should arrive before the timeout")
            .unwrap();
        Response::decode(&buf[..n]).unwrap()
    }

    /// Waits for a single callback datagram addressed to `socket`, failing
    /// the test if none arrives before the timeout.
    async fn recv_callback(socket: &UdpSocket) -> Response {
        let mut buf = vec![0u8; 1400];
        let n = tokio::time::timeout(Duration::from_secs(2), socket.recv(&mut buf))
            .await
            .expect("callback should arrive before the timeout")
            .unwrap();
        Response::decode(&buf[..n]).unwrap()
    }

    async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.task.await;
    }
}

fn open_payload(name: &str, pass: &str, amount: f64, cur: Currency) -> Vec<u8> {
    let mut payload = Vec::new();
    name.to_owned().encode(&mut payload);
    pass.to_owned().encode(&mut payload);
    Money::from_major(amount).encode(&mut payload);
    cur.encode(&mut payload);
    payload
}

fn check_balance_payload(id: i32, name: &str, pass: &str, cur: Currency) -> Vec<u8> {
    let mut payload = Vec::new();
    id.encode(&mut payload);
    name.to_owned().encode(&mut payload);
    pass.to_owned().encode(&mut payload);
    cur.encode(&mut payload);
    payload
}

fn deposit_payload(id: i32, name: &str, pass: &str, cur: Currency, amount: f64) -> Vec<u8> {
    let mut payload = Vec::new();
    id.encode(&mut payload);
    name.to_owned().encode(&mut payload);
    pass.to_owned().encode(&mut payload);
    cur.encode(&mut payload);
    Money::from_major(amount).encode(&mut payload);
    payload
}

fn withdraw_payload(id: i32, name: &str, pass: &str, cur: Currency, amount: f64) -> Vec<u8> {
    deposit_payload(id, name, pass, cur, amount)
}

#[tokio::test]
async fn scenario_open_then_check_balance() {
    let harness = Harness::start(SemanticsMode::AtMostOnce).await;

    let open = Request::new(1, OpCode::Open, &open_payload("alice", "pw", 100.0, Currency::Usd));
    let reply = harness.call(&open).await;
    assert_eq!(reply.status, StatusCode::Success);
    assert!(reply.text().contains("id 0"), "reply was: {}", reply.text());

    let check = Request::new(
        2,
        OpCode::CheckBalance,
        &check_balance_payload(0, "alice", "pw", Currency::Usd),
    );
    let reply = harness.call(&check).await;
    assert_eq!(reply.status, StatusCode::Success);
    assert_eq!(reply.text(), "100.000000");

    harness.shutdown().await;
}

#[tokio::test]
async fn scenario_deposit_then_overdraw_withdraw_fails() {
    let harness = Harness::start(SemanticsMode::AtMostOnce).await;

    harness
        .call(&Request::new(1, OpCode::Open, &open_payload("alice", "pw", 100.0, Currency::Usd)))
        .await;

    let reply = harness
        .call(&Request::new(2, OpCode::Deposit, &deposit_payload(0, "alice", "pw", Currency::Usd, 50.0)))
        .await;
    assert_eq!(reply.status, StatusCode::Success);

    let reply = harness
        .call(&Request::new(
            3,
            OpCode::Withdraw,
            &withdraw_payload(0, "alice", "pw", Currency::Usd, 200.0),
        ))
        .await;
    assert_eq!(reply.status, StatusCode::Fail);
    assert_eq!(reply.text(), "insufficient fund");

    let reply = harness
        .call(&Request::new(
            4,
            OpCode::CheckBalance,
            &check_balance_payload(0, "alice", "pw", Currency::Usd),
        ))
        .await;
    assert_eq!(reply.text(), "150.000000");

    harness.shutdown().await;
}

#[tokio::test]
async fn scenario_transfer_between_two_accounts() {
    let harness = Harness::start(SemanticsMode::AtMostOnce).await;

    harness
        .call(&Request::new(1, OpCode::Open, &open_payload("alice", "pw", 100.0, Currency::Usd)))
        .await;
    harness
        .call(&Request::new(2, OpCode::Open, &open_payload("bob", "pw", 0.0, Currency::Usd)))
        .await;

    let mut payload = Vec::new();
    0i32.encode(&mut payload);
    "alice".to_owned().encode(&mut payload);
    "pw".to_owned().encode(&mut payload);
    Currency::Usd.encode(&mut payload);
    Money::from_major(40.0).encode(&mut payload);
    1i32.encode(&mut payload);
    let reply = harness.call(&Request::new(3, OpCode::Transfer, &payload)).await;
    assert_eq!(reply.status, StatusCode::Success);

    let alice_balance = harness
        .call(&Request::new(
            4,
            OpCode::CheckBalance,
            &check_balance_payload(0, "alice", "pw", Currency::Usd),
        ))
        .await;
    let bob_balance = harness
        .call(&Request::new(
            5,
            OpCode::CheckBalance,
            &check_balance_payload(1, "bob", "pw", Currency::Usd),
        ))
        .await;
    assert_eq!(alice_balance.text(), "60.000000");
    assert_eq!(bob_balance.text(), "40.000000");

    harness.shutdown().await;
}

#[tokio::test]
async fn scenario_at_most_once_idempotence_over_the_wire() {
    let harness = Harness::start(SemanticsMode::AtMostOnce).await;

    harness
        .call(&Request::new(1, OpCode::Open, &open_payload("alice", "pw", 0.0, Currency::Usd)))
        .await;

    let deposit = Request::new(42, OpCode::Deposit, &deposit_payload(0, "alice", "pw", Currency::Usd, 10.0));
    let first = harness.call(&deposit).await;
    let second = harness.call(&deposit).await;
    let third = harness.call(&deposit).await;

    assert_eq!(first, second);
    assert_eq!(second, third);

    let balance = harness
        .call(&Request::new(
            2,
            OpCode::CheckBalance,
            &check_balance_payload(0, "alice", "pw", Currency::Usd),
        ))
        .await;
    assert_eq!(balance.text(), "10.000000");

    harness.shutdown().await;
}

#[tokio::test]
async fn scenario_at_least_once_non_idempotence_witness() {
    let harness = Harness::start(SemanticsMode::AtLeastOnce).await;

    harness
        .call(&Request::new(1, OpCode::Open, &open_payload("alice", "pw", 0.0, Currency::Usd)))
        .await;

    let deposit = Request::new(42, OpCode::Deposit, &deposit_payload(0, "alice", "pw", Currency::Usd, 10.0));
    harness.call(&deposit).await;
    harness.call(&deposit).await;

    let balance = harness
        .call(&Request::new(
            2,
            OpCode::CheckBalance,
            &check_balance_payload(0, "alice", "pw", Currency::Usd),
        ))
        .await;
    assert_eq!(balance.text(), "20.000000");

    harness.shutdown().await;
}

#[tokio::test]
async fn scenario_maybe_mode_drops_requests_silently() {
    let harness = Harness::start(SemanticsMode::Maybe).await;

    harness
        .client
        .send(&Request::new(1, OpCode::Open, &open_payload("alice", "pw", 0.0, Currency::Usd)).encode_to_vec())
        .await
        .unwrap();

    let mut buf = vec![0u8; 1400];
    let result = tokio::time::timeout(Duration::from_millis(200), harness.client.recv(&mut buf)).await;
    assert!(result.is_err(), "maybe mode must produce no reply at all");

    harness.shutdown().await;
}

#[tokio::test]
async fn scenario_subscription_lifecycle_receives_one_callback_within_window() {
    let harness = Harness::start(SemanticsMode::AtMostOnce).await;

    harness
        .call(&Request::new(1, OpCode::Open, &open_payload("alice", "pw", 0.0, Currency::Usd)))
        .await;

    let subscriber = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    subscriber.connect(harness.server_addr).await.unwrap();

    let mut payload = Vec::new();
    500i64.encode(&mut payload);
    let reply = harness.call_from(&subscriber, &Request::new(2, OpCode::Monitor, &payload)).await;
    assert_eq!(reply.status, StatusCode::Success);

    // A second monitor from the same subscriber while the window is active fails.
    let reply = harness.call_from(&subscriber, &Request::new(3, OpCode::Monitor, &payload)).await;
    assert_eq!(reply.status, StatusCode::Fail);
    assert_eq!(reply.text(), "monitor window already exists");

    let deposit = Request::new(4, OpCode::Deposit, &deposit_payload(0, "alice", "pw", Currency::Usd, 10.0));
    harness.call(&deposit).await;

    let callback = Harness::recv_callback(&subscriber).await;
    assert_eq!(callback.status, StatusCode::Callback);
    assert!(
        callback.text().starts_with("successful deposit"),
        "callback text was: {}",
        callback.text()
    );

    harness.shutdown().await;
}

impl Harness {
    async fn call_from(&self, socket: &UdpSocket, req: &Request) -> Response {
        socket.send(&req.encode_to_vec()).await.unwrap();
        let mut buf = vec![0u8; 1400];
        let n = tokio::time::timeout(Duration::from_secs(2), socket.recv(&mut buf))
            .await
            .expect("reply should arrive before the timeout")
            .unwrap();
        Response::decode(&buf[..n]).unwrap()
    }
}
