use std::net::{IpAddr, SocketAddr};

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;

use super::error::UdpError;
use super::reader::UdpReader;
use crate::analysis::flows::FlowKey;

/// UDP payload with the flow it belongs to.
pub struct UdpDatagram<'a> {
    pub flow: FlowKey,
    pub payload: &'a [u8],
}

/// Extract the UDP payload of a link-layer frame.
///
/// Returns `Ok(None)` for frames that are not UDP or use an unsupported link
/// type.
///
/// # Errors
/// `UdpError` when the frame claims to be Ethernet or IP but cannot be sliced.
pub fn parse_udp_datagram(
    linktype: Linktype,
    frame: &[u8],
) -> Result<Option<UdpDatagram<'_>>, UdpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => SlicedPacket::from_ethernet(frame),
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => SlicedPacket::from_ip(frame),
        _ => return Ok(None),
    }
    .map_err(|err| UdpError::Slice(err.to_string()))?;

    let net = sliced.net.ok_or(UdpError::MissingNetworkLayer)?;
    let Some(TransportSlice::Udp(udp)) = sliced.transport else {
        return Ok(None);
    };

    let (src_ip, dst_ip) = match &net {
        NetSlice::Ipv4(ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
    };

    let ip_payload = net.ip_payload_ref().ok_or(UdpError::MissingIpPayload)?;
    let payload = UdpReader::new(ip_payload.payload).payload()?;

    Ok(Some(UdpDatagram {
        flow: FlowKey {
            src: SocketAddr::new(src_ip, udp.source_port()),
            dst: SocketAddr::new(dst_ip, udp.destination_port()),
        },
        payload,
    }))
}
