// src/callback/dns_packet.rs
// Minimal DNS wire-format parsing and response building (4.4.2). Does not
// implement compression pointers on read beyond skipping them, and does not
// support TCP fallback - this is a raw-UDP authoritative stub, not a
// general-purpose resolver.

pub const HEADER_SIZE: usize = 12;
pub const QTYPE_A: u16 = 1;
pub const QCLASS_IN: u16 = 1;
const RESPONSE_FLAGS: u16 = 0x8580; // QR=1, AA=1, RD=1, RA=1

pub struct Header {
    pub id: u16,
    pub qdcount: u16,
}

pub struct Question {
    /// Dot-joined labels parsed before a zero-length terminator or a
    /// compression pointer was hit.
    pub qname: String,
    pub qtype: u16,
    pub qclass: u16,
    /// Byte offset immediately following the question section.
    pub end: usize,
}

/// Parse the 12-octet fixed header. Returns `None` if `packet` is shorter
/// than `HEADER_SIZE`.
pub fn parse_header(packet: &[u8]) -> Option<Header> {
    if packet.len() < HEADER_SIZE {
        return None;
    }
    Some(Header {
        id: u16::from_be_bytes([packet[0], packet[1]]),
        qdcount: u16::from_be_bytes([packet[4], packet[5]]),
    })
}

/// Parse the first question starting at `HEADER_SIZE`. A compression
/// pointer (a length byte with its top two bits set) terminates the name
/// immediately rather than being followed - the label data collected up to
/// that point is what's returned. A root name (zero labels) is treated as
/// unparseable rather than producing an empty `qname`.
pub fn parse_question(packet: &[u8]) -> Option<Question> {
    let mut offset = HEADER_SIZE;
    let mut labels = Vec::new();

    loop {
        let len_byte = *packet.get(offset)?;
        if len_byte == 0 {
            offset += 1;
            break;
        }
        if len_byte & 0xC0 == 0xC0 {
            // Compression pointer: consume its 2 octets and stop collecting
            // labels without following it.
            offset += 2;
            break;
        }
        let len = len_byte as usize;
        offset += 1;
        let label = packet.get(offset..offset + len)?;
        labels.push(String::from_utf8_lossy(label).into_owned());
        offset += len;
    }

    if labels.is_empty() {
        return None;
    }

    let qtype = u16::from_be_bytes([*packet.get(offset)?, *packet.get(offset + 1)?]);
    let qclass = u16::from_be_bytes([*packet.get(offset + 2)?, *packet.get(offset + 3)?]);
    offset += 4;

    Some(Question {
        qname: labels.join("."),
        qtype,
        qclass,
        end: offset,
    })
}

/// Build a response for `packet`, whose question section spans
/// `[HEADER_SIZE, question.end)`. For QTYPE=A, appends one answer pointing
/// at 127.0.0.1 with TTL 60; otherwise the answer section is empty.
pub fn build_response(packet: &[u8], header: &Header, question: &Question) -> Vec<u8> {
    let answer_present = question.qtype == QTYPE_A;

    let mut response = Vec::with_capacity(packet.len() + 16);
    response.extend_from_slice(&header.id.to_be_bytes());
    response.extend_from_slice(&RESPONSE_FLAGS.to_be_bytes());
    response.extend_from_slice(&1u16.to_be_bytes()); // QDCOUNT
    response.extend_from_slice(&(if answer_present { 1u16 } else { 0u16 }).to_be_bytes()); // ANCOUNT
    response.extend_from_slice(&0u16.to_be_bytes()); // NSCOUNT
    response.extend_from_slice(&0u16.to_be_bytes()); // ARCOUNT

    response.extend_from_slice(&packet[HEADER_SIZE..question.end]);

    if answer_present {
        response.extend_from_slice(&0xC00Cu16.to_be_bytes()); // NAME: pointer to question
        response.extend_from_slice(&QTYPE_A.to_be_bytes());
        response.extend_from_slice(&QCLASS_IN.to_be_bytes());
        response.extend_from_slice(&60u32.to_be_bytes()); // TTL
        response.extend_from_slice(&4u16.to_be_bytes()); // RDLENGTH
        response.extend_from_slice(&[127, 0, 0, 1]); // RDATA
    }

    response
}
