//! Minimal SNTP client (RFC 4330) for ULUA timestamps
//!
//! One request, one reply, no retry. When the server cannot be reached in
//! time the caller falls back to the local clock.

use anyhow::{anyhow, bail, Context, Result};
use netcalc_core::types::TimeSource;
use netcalc_core::ulua::NtpTimestamp;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const NTP_PORT: u16 = 123;
const PACKET_LENGTH: usize = 48;

/// LI = 0, VN = 4, Mode = 3 (client)
const CLIENT_HEADER: u8 = 0x23;

const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;

const ORIGINATE_OFFSET: usize = 24;
const RECEIVE_OFFSET: usize = 32;
const TRANSMIT_OFFSET: usize = 40;

fn read_timestamp(packet: &[u8], offset: usize) -> NtpTimestamp {
    let mut bits = [0u8; 8];
    bits.copy_from_slice(&packet[offset..offset + 8]);
    NtpTimestamp::from_bits(u64::from_be_bytes(bits))
}

/// Builds a client request carrying `transmit` as its transmit timestamp
pub fn request_packet(transmit: NtpTimestamp) -> [u8; PACKET_LENGTH] {
    let mut packet = [0u8; PACKET_LENGTH];
    packet[0] = CLIENT_HEADER;
    packet[TRANSMIT_OFFSET..].copy_from_slice(&transmit.to_bits().to_be_bytes());
    packet
}

/// Validates a server reply and returns its receive timestamp
pub fn parse_response(packet: &[u8], sent: NtpTimestamp) -> Result<NtpTimestamp> {
    if packet.len() < PACKET_LENGTH {
        bail!("short NTP reply: {} bytes", packet.len());
    }

    let mode = packet[0] & 0x07;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        bail!("unexpected NTP mode {}", mode);
    }
    // Stratum 0 is a kiss-of-death message
    if packet[1] == 0 {
        bail!("NTP server sent kiss-of-death");
    }
    if read_timestamp(packet, ORIGINATE_OFFSET) != sent {
        bail!("NTP reply does not answer our request");
    }

    let receive = read_timestamp(packet, RECEIVE_OFFSET);
    if receive.to_bits() == 0 {
        bail!("NTP reply has no receive timestamp");
    }
    Ok(receive)
}

async fn exchange(server: &str) -> Result<NtpTimestamp> {
    let addr = tokio::net::lookup_host((server, NTP_PORT))
        .await
        .with_context(|| format!("resolve {}", server))?
        .next()
        .ok_or_else(|| anyhow!("{} has no address", server))?;

    let local: SocketAddr = match addr {
        SocketAddr::V4(_) => "0.0.0.0:0".parse()?,
        SocketAddr::V6(_) => "[::]:0".parse()?,
    };
    let socket = UdpSocket::bind(local).await.context("bind UDP socket")?;
    socket.connect(addr).await.context("connect to time server")?;

    let sent = NtpTimestamp::now();
    socket.send(&request_packet(sent)).await?;
    debug!(%addr, "sent NTP request");

    let mut buf = [0u8; 512];
    let len = socket.recv(&mut buf).await?;
    parse_response(&buf[..len], sent)
}

/// Queries `server` once, giving up after `wait`
pub async fn query(server: &str, wait: Duration) -> Result<NtpTimestamp> {
    timeout(wait, exchange(server))
        .await
        .map_err(|_| anyhow!("timed out after {:?} waiting for {}", wait, server))?
}

/// Network time from `server`, or the local clock if it does not answer
pub async fn timestamp(server: &str, wait: Duration) -> (NtpTimestamp, TimeSource) {
    match query(server, wait).await {
        Ok(ts) => {
            info!(server, timestamp = %ts, "received network time");
            (ts, TimeSource::Ntp)
        }
        Err(e) => {
            warn!(server, error = %e, "time server unavailable, using local clock");
            (NtpTimestamp::now(), TimeSource::LocalClock)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENT: NtpTimestamp = NtpTimestamp::new(0xe875_4700, 0x1234_5678);

    fn reply() -> [u8; PACKET_LENGTH] {
        let mut packet = [0u8; PACKET_LENGTH];
        packet[0] = 0x24; // VN 4, server
        packet[1] = 2;
        packet[ORIGINATE_OFFSET..RECEIVE_OFFSET].copy_from_slice(&SENT.to_bits().to_be_bytes());
        packet[RECEIVE_OFFSET..TRANSMIT_OFFSET]
            .copy_from_slice(&0xe875_4701_8000_0000u64.to_be_bytes());
        packet
    }

    #[test]
    fn test_request_packet() {
        let packet = request_packet(SENT);
        assert_eq!(packet[0], 0x23);
        assert_eq!(&packet[1..TRANSMIT_OFFSET], &[0u8; TRANSMIT_OFFSET - 1][..]);
        assert_eq!(read_timestamp(&packet, TRANSMIT_OFFSET), SENT);
    }

    #[test]
    fn test_parse_response() {
        let ts = parse_response(&reply(), SENT).unwrap();
        assert_eq!(ts.seconds(), 0xe875_4701);
        assert_eq!(ts.fraction(), 0x8000_0000);
    }

    #[test]
    fn test_parse_response_rejects_short_packet() {
        assert!(parse_response(&reply()[..40], SENT).is_err());
    }

    #[test]
    fn test_parse_response_rejects_wrong_mode() {
        let mut packet = reply();
        packet[0] = 0x23;
        assert!(parse_response(&packet, SENT).is_err());
    }

    #[test]
    fn test_parse_response_rejects_kiss_of_death() {
        let mut packet = reply();
        packet[1] = 0;
        assert!(parse_response(&packet, SENT).is_err());
    }

    #[test]
    fn test_parse_response_rejects_foreign_reply() {
        let other = NtpTimestamp::from_bits(SENT.to_bits() + 1);
        assert!(parse_response(&reply(), other).is_err());
    }

    #[test]
    fn test_parse_response_rejects_zero_receive_time() {
        let mut packet = reply();
        packet[RECEIVE_OFFSET..TRANSMIT_OFFSET].fill(0);
        assert!(parse_response(&packet, SENT).is_err());
    }

    #[tokio::test]
    async fn test_unresolvable_server_falls_back_to_local_clock() {
        let before = NtpTimestamp::now();
        let (ts, source) = timestamp("ntp.invalid", Duration::from_millis(200)).await;
        assert_eq!(source, TimeSource::LocalClock);
        assert!(ts >= before);
    }
}
