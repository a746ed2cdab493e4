/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use g3_codec::tls::{
    Alert, AlertDescription, AlertLevel, ContentType, HandshakeType, RawVersion, Record,
};
use g3_tls_capture::{
    CaptureTarget, HandshakeError, HandshakeOutcome, HandshakeServerConfig, Protocol, SentSignal,
    Termination, TlsClientMessage, run_handshake,
};

fn tls_config(versions: &[RawVersion]) -> HandshakeServerConfig {
    HandshakeServerConfig {
        protocol_versions: versions.iter().copied().collect::<BTreeSet<_>>(),
        fallback_to_ssl: false,
        close_on_error: false,
        ..Default::default()
    }
}

fn handshake_message(msg_type: HandshakeType, body: &[u8]) -> Vec<u8> {
    let mut msg = vec![msg_type.as_u8()];
    msg.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    msg.extend_from_slice(body);
    msg
}

fn client_hello(
    legacy_version: RawVersion,
    cipher_suites: &[u16],
    supported_versions: &[RawVersion],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&legacy_version.to_be_bytes());
    body.extend_from_slice(&[0x5a; 32]);
    body.push(0);
    body.extend_from_slice(&((cipher_suites.len() * 2) as u16).to_be_bytes());
    for cipher in cipher_suites {
        body.extend_from_slice(&cipher.to_be_bytes());
    }
    body.extend_from_slice(&[0x01, 0x00]);

    if !supported_versions.is_empty() {
        let list_len = supported_versions.len() * 2;
        let mut ext = vec![0x00, 0x2b];
        ext.extend_from_slice(&((1 + list_len) as u16).to_be_bytes());
        ext.push(list_len as u8);
        for v in supported_versions {
            ext.extend_from_slice(&v.to_be_bytes());
        }
        body.extend_from_slice(&(ext.len() as u16).to_be_bytes());
        body.extend_from_slice(&ext);
    }

    handshake_message(HandshakeType::ClientHello, &body)
}

fn record(content_type: ContentType, data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    Record::encode(content_type, RawVersion::TLS1_0, data, &mut buf);
    buf
}

fn parse_records(mut data: &[u8]) -> Vec<(ContentType, RawVersion, Vec<u8>)> {
    let mut records = Vec::new();
    while !data.is_empty() {
        let record = Record::parse(data).unwrap();
        records.push((
            record.header.content_type,
            record.header.version,
            record.fragment.to_vec(),
        ));
        data = &data[record.encoded_len()..];
    }
    records
}

async fn exchange(
    config: HandshakeServerConfig,
    target: CaptureTarget,
    client_data: &[u8],
    shutdown: bool,
) -> (HandshakeOutcome, Vec<u8>) {
    let (mut client, server) = tokio::io::duplex(1 << 16);
    client.write_all(client_data).await.unwrap();
    if shutdown {
        client.shutdown().await.unwrap();
    }

    let outcome = run_handshake(server, Arc::new(config), target).await;

    let mut reply = Vec::new();
    client.read_to_end(&mut reply).await.unwrap();
    (outcome, reply)
}

fn assert_alert(
    record: &(ContentType, RawVersion, Vec<u8>),
    level: AlertLevel,
    description: AlertDescription,
) {
    assert_eq!(record.0, ContentType::Alert);
    let alert = Alert::parse(&record.2).unwrap();
    assert_eq!(alert.level, level);
    assert_eq!(alert.description, description);
}

/// Check the reply hello and return its negotiated version
fn assert_server_hello(
    record: &(ContentType, RawVersion, Vec<u8>),
    cipher_suite: u16,
) -> RawVersion {
    assert_eq!(record.0, ContentType::Handshake);
    let msg = &record.2;
    assert_eq!(msg[0], HandshakeType::ServerHello.as_u8());
    assert_eq!(msg.len(), 4 + 40);
    assert_eq!(msg[38], 0); // empty session id
    assert_eq!(u16::from_be_bytes([msg[39], msg[40]]), cipher_suite);
    assert_eq!(msg[41], 0); // null compression
    assert_eq!(&msg[42..], &[0x00, 0x00]); // empty extensions
    RawVersion::new(msg[4], msg[5])
}

#[tokio::test]
async fn capture_tls13_client_hello() {
    let config = tls_config(&[RawVersion::TLS1_2, RawVersion::TLS1_3]);
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301, 0x1302], &[RawVersion::TLS1_3]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 2);
    assert_eq!(assert_server_hello(&records[0], 0x1301), RawVersion::TLS1_3);
    assert_eq!(records[0].1, RawVersion::TLS1_2);
    assert_alert(&records[1], AlertLevel::Warning, AlertDescription::CloseNotify);

    assert_eq!(outcome.protocol, Some(Protocol::Tls));
    assert!(outcome.termination.is_graceful());
    assert_eq!(
        outcome.signal,
        Some(SentSignal::Alert(Alert::new(
            AlertLevel::Warning,
            AlertDescription::CloseNotify
        )))
    );
    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(outcome.client_version(), Some(RawVersion::TLS1_3));
    assert_eq!(outcome.offered_cipher_count(), 2);
    let hello = outcome.messages.tls_client_hello().unwrap();
    assert_eq!(hello.cipher_suites, vec![0x1301, 0x1302]);
}

#[tokio::test]
async fn reject_too_new_version() {
    let config = tls_config(&[RawVersion::TLS1_2, RawVersion::TLS1_3]);
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301], &[RawVersion::new(3, 5)]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Fatal, AlertDescription::ProtocolVersion);
    assert_eq!(records[0].1, RawVersion::TLS1_0);

    assert_eq!(outcome.messages.len(), 1);
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::UnsupportedVersion(v)) if v == RawVersion::new(3, 5)
    ));
}

#[tokio::test]
async fn reject_with_empty_versions() {
    let config = tls_config(&[]);
    let hello = client_hello(RawVersion::TLS1_2, &[0x002f], &[]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Fatal, AlertDescription::ProtocolVersion);
    assert_eq!(outcome.messages.len(), 1);
}

#[tokio::test]
async fn select_exact_version() {
    let versions = [RawVersion::TLS1_0, RawVersion::TLS1_1, RawVersion::TLS1_2];
    for v in versions {
        let hello = client_hello(v, &[0x002f], &[]);
        let data = record(ContentType::Handshake, &hello);
        let (_, reply) =
            exchange(tls_config(&versions), CaptureTarget::default(), &data, false).await;

        let records = parse_records(&reply);
        assert_eq!(assert_server_hello(&records[0], 0x002f), v);
        assert_eq!(records[0].1, v);
    }
}

#[tokio::test]
async fn select_lower_version() {
    let config = tls_config(&[RawVersion::TLS1_0, RawVersion::TLS1_2]);
    let hello = client_hello(RawVersion::TLS1_1, &[0x002f, 0x0035], &[]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 2);
    assert_eq!(assert_server_hello(&records[0], 0x002f), RawVersion::TLS1_0);
    assert!(outcome.termination.is_graceful());
}

#[tokio::test]
async fn tls13_client_on_tls12_server() {
    let config = tls_config(&[RawVersion::TLS1_0, RawVersion::TLS1_1, RawVersion::TLS1_2]);
    let hello = client_hello(
        RawVersion::TLS1_2,
        &[0x1301, 0xc02f],
        &[RawVersion::TLS1_3, RawVersion::TLS1_2],
    );
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 2);
    assert_eq!(assert_server_hello(&records[0], 0x1301), RawVersion::TLS1_2);
    assert_eq!(records[0].1, RawVersion::TLS1_2);
    assert_alert(&records[1], AlertLevel::Warning, AlertDescription::CloseNotify);
    assert!(outcome.termination.is_graceful());
    assert_eq!(outcome.client_version(), Some(RawVersion::TLS1_3));
}

#[tokio::test]
async fn reject_too_new_legacy_version() {
    let config = tls_config(&[RawVersion::TLS1_0, RawVersion::TLS1_1]);
    let hello = client_hello(RawVersion::TLS1_2, &[0x002f], &[RawVersion::TLS1_1]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Fatal, AlertDescription::ProtocolVersion);
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::UnsupportedVersion(_))
    ));
}

#[tokio::test]
async fn skip_grease_version() {
    let config = tls_config(&[RawVersion::TLS1_2, RawVersion::TLS1_3]);
    let hello = client_hello(
        RawVersion::TLS1_2,
        &[0x0a0a, 0x1301],
        &[RawVersion::from(0x2a2a), RawVersion::TLS1_2],
    );
    let data = record(ContentType::Handshake, &hello);

    let (_, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(assert_server_hello(&records[0], 0x0a0a), RawVersion::TLS1_2);
}

#[tokio::test]
async fn stop_at_capture_target() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let target = CaptureTarget {
        tls: HandshakeType::ClientKeyExchange,
        ..Default::default()
    };
    let mut data = client_hello(RawVersion::TLS1_2, &[0xc02f], &[]);
    data.extend(handshake_message(HandshakeType::ClientKeyExchange, &[0x01]));
    data.extend(handshake_message(HandshakeType::Finished, &[0x02]));
    let data = record(ContentType::Handshake, &data);

    let (outcome, reply) = exchange(config, target, &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 2);
    assert_server_hello(&records[0], 0xc02f);
    assert_alert(&records[1], AlertLevel::Warning, AlertDescription::CloseNotify);

    assert!(outcome.termination.is_graceful());
    assert_eq!(
        outcome.messages.message_names(),
        vec!["client_hello", "client_key_exchange"]
    );
}

#[tokio::test]
async fn overwrite_same_message_type() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let target = CaptureTarget {
        tls: HandshakeType::Finished,
        ..Default::default()
    };
    let mut data = record(
        ContentType::Handshake,
        &client_hello(RawVersion::TLS1_2, &[0xc02f], &[]),
    );
    let mut second = handshake_message(HandshakeType::ClientKeyExchange, &[0x01]);
    second.extend(handshake_message(HandshakeType::ClientKeyExchange, &[0x02]));
    second.extend(handshake_message(HandshakeType::Finished, &[0x03]));
    data.extend(record(ContentType::Handshake, &second));

    let (outcome, reply) = exchange(config, target, &data, false).await;

    assert_eq!(parse_records(&reply).len(), 2);
    assert!(outcome.termination.is_graceful());
    assert_eq!(
        outcome.messages.message_names(),
        vec!["client_hello", "client_key_exchange", "finished"]
    );
    let g3_tls_capture::CapturedMessages::Tls(map) = &outcome.messages else {
        panic!("not tls messages");
    };
    let Some(TlsClientMessage::Other(msg)) = map.get(&HandshakeType::ClientKeyExchange) else {
        panic!("no client key exchange message");
    };
    assert_eq!(msg.body().as_ref(), &[0x02]);
}

#[tokio::test]
async fn close_on_error_without_alert() {
    let config = HandshakeServerConfig {
        close_on_error: true,
        ..tls_config(&[RawVersion::TLS1_2])
    };
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301], &[RawVersion::TLS1_3]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    assert!(reply.is_empty());
    assert!(outcome.signal.is_none());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::UnsupportedVersion(_))
    ));
}

#[tokio::test]
async fn close_on_error_graceful() {
    let config = HandshakeServerConfig {
        close_on_error: true,
        ..tls_config(&[RawVersion::TLS1_2])
    };
    let hello = client_hello(RawVersion::TLS1_2, &[0x009c], &[]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_server_hello(&records[0], 0x009c);
    assert!(outcome.signal.is_none());
    assert!(outcome.termination.is_graceful());
}

#[tokio::test]
async fn unexpected_first_message() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let data = record(
        ContentType::Handshake,
        &handshake_message(HandshakeType::Certificate, &[0x00, 0x00, 0x00]),
    );

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Fatal, AlertDescription::UnexpectedMessage);
    assert_eq!(outcome.messages.message_names(), vec!["certificate"]);
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::UnexpectedFirstMessage(_))
    ));
}

#[tokio::test]
async fn unexpected_non_handshake_record() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let data = record(ContentType::ApplicationData, b"data");

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Fatal, AlertDescription::UnexpectedMessage);
    assert!(outcome.messages.is_empty());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::UnexpectedRecord)
    ));
}

#[tokio::test]
async fn fragmented_client_hello() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let hello = client_hello(RawVersion::TLS1_2, &[0xc02b, 0xc02f], &[]);
    let (part1, part2) = hello.split_at(10);
    let mut data = record(ContentType::Handshake, part1);
    data.extend(record(ContentType::Handshake, part2));

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 2);
    assert_server_hello(&records[0], 0xc02b);
    assert!(outcome.termination.is_graceful());
    assert_eq!(outcome.offered_cipher_count(), 2);
}

#[tokio::test]
async fn plain_text_request() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let data = b"GET / HTTP/1.1\r\nHost: example.net\r\n\r\n";

    let (outcome, reply) = exchange(config, CaptureTarget::default(), data, false).await;

    assert_eq!(reply, [0x15, 0x03, 0x01, 0x00, 0x02, 0x01, 0x33]);
    assert!(outcome.messages.is_empty());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::PlainTextData)
    ));
}

#[tokio::test]
async fn invalid_record() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let data = [0x16, 0x03, 0x01, 0xff, 0xff, 0x00];

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Warning, AlertDescription::DecryptError);
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::InvalidRecord(_))
    ));
}

#[tokio::test]
async fn invalid_client_hello() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let data = record(
        ContentType::Handshake,
        &handshake_message(HandshakeType::ClientHello, &[0x03, 0x03, 0x00]),
    );

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Warning, AlertDescription::DecryptError);
    assert!(outcome.messages.is_empty());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::InvalidMessage(_))
    ));
}

#[tokio::test]
async fn truncated_record() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301], &[]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) =
        exchange(config, CaptureTarget::default(), &data[..data.len() - 4], true).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Warning, AlertDescription::DecryptError);
    assert!(outcome.messages.is_empty());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::TruncatedRecord(_))
    ));
}

#[tokio::test]
async fn incomplete_handshake_message() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301], &[]);
    let data = record(ContentType::Handshake, &hello[..10]);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, true).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_alert(&records[0], AlertLevel::Warning, AlertDescription::DecryptError);
    assert!(outcome.messages.is_empty());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::InvalidMessage(_))
    ));
}

#[tokio::test]
async fn peer_closed_after_client_hello() {
    let config = tls_config(&[RawVersion::TLS1_2]);
    let target = CaptureTarget {
        tls: HandshakeType::Finished,
        ..Default::default()
    };
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301], &[]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, target, &data, true).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert_server_hello(&records[0], 0x1301);
    assert!(outcome.signal.is_none());
    assert!(matches!(outcome.termination, Termination::PeerClosed));
    assert_eq!(outcome.messages.len(), 1);
}

#[tokio::test]
async fn detect_tls_with_fallback() {
    let config = HandshakeServerConfig {
        fallback_to_ssl: true,
        ..tls_config(&[RawVersion::TLS1_2])
    };
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301], &[]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &data, false).await;

    assert_eq!(outcome.protocol, Some(Protocol::Tls));
    assert!(outcome.termination.is_graceful());
    assert_eq!(parse_records(&reply).len(), 2);
}

#[tokio::test]
async fn closed_before_detection() {
    let config = HandshakeServerConfig {
        fallback_to_ssl: true,
        ..tls_config(&[RawVersion::TLS1_2])
    };

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &[0x16, 0x03], true).await;

    assert!(reply.is_empty());
    assert!(outcome.protocol.is_none());
    assert!(outcome.messages.is_empty());
    assert!(outcome.signal.is_none());
    assert!(matches!(outcome.termination, Termination::PeerClosed));
}

#[tokio::test]
async fn receive_timeout() {
    let config = HandshakeServerConfig {
        fallback_to_ssl: true,
        receive_timeout: Some(Duration::from_millis(100)),
        ..tls_config(&[RawVersion::TLS1_2])
    };

    let (outcome, reply) = exchange(config, CaptureTarget::default(), &[], false).await;

    assert!(reply.is_empty());
    assert!(outcome.signal.is_none());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::ReadTimeout)
    ));
}

#[tokio::test]
async fn receive_timeout_after_hello() {
    let config = HandshakeServerConfig {
        receive_timeout: Some(Duration::from_millis(100)),
        ..tls_config(&[RawVersion::TLS1_2])
    };
    let target = CaptureTarget {
        tls: HandshakeType::Finished,
        ..Default::default()
    };
    let hello = client_hello(RawVersion::TLS1_2, &[0x1301], &[]);
    let data = record(ContentType::Handshake, &hello);

    let (outcome, reply) = exchange(config, target, &data, false).await;

    let records = parse_records(&reply);
    assert_eq!(records.len(), 1);
    assert!(outcome.signal.is_none());
    assert!(matches!(
        outcome.termination,
        Termination::Failed(HandshakeError::ReadTimeout)
    ));
}
