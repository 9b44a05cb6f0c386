//! Formato de fio do ICMPv4 Echo (RFC 792): cabeçalho de 8 bytes
//! `type | code | checksum | identifier | sequence`, campos de 16 bits
//! em network byte order, seguido do payload.

/// Tipo ICMP de Echo Request.
pub const ECHO_REQUEST: u8 = 8;

/// Tipo ICMP de Echo Reply.
pub const ECHO_REPLY: u8 = 0;

/// Tamanho do cabeçalho ICMP Echo (bytes).
pub const HEADER_LEN: usize = 8;

/// Calcula o checksum ICMP (RFC 792).
pub fn checksum(mut data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    while data.len() >= 2 {
        sum = sum.wrapping_add(u16::from_be_bytes([data[0], data[1]]) as u32);
        data = &data[2..];
    }
    if !data.is_empty() {
        sum = sum.wrapping_add((data[0] as u32) << 8);
    }
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// Monta um pacote ICMPv4 Echo Request (type=8, code=0).
///
/// O payload é copiado byte a byte para o buffer de saída e o checksum
/// é calculado sobre cabeçalho + payload antes do envio.
pub fn build_echo_request(ident: u16, seq: u16, payload: &[u8]) -> Vec<u8> {
    // Cabeçalho ICMP (8 bytes) + payload
    let mut pkt = Vec::with_capacity(HEADER_LEN + payload.len());

    // Type=8 (Echo Request), Code=0, checksum placeholder (2 bytes)
    pkt.extend_from_slice(&[ECHO_REQUEST, 0, 0, 0]);

    // Identifier e Sequence (big-endian)
    pkt.extend_from_slice(&ident.to_be_bytes());
    pkt.extend_from_slice(&seq.to_be_bytes());

    // Payload arbitrário (pode ser vazio)
    pkt.extend_from_slice(payload);

    // Calcula e escreve o checksum
    let csum = checksum(&pkt);
    pkt[2] = (csum >> 8) as u8;
    pkt[3] = (csum & 0xFF) as u8;

    pkt
}

/// Campos do cabeçalho de um Echo Request/Reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub ident: u16,
    pub seq: u16,
}

/// Extrai o cabeçalho Echo de um datagrama ICMP. `None` se tiver menos
/// de 8 bytes.
pub fn parse_echo_header(icmp: &[u8]) -> Option<EchoHeader> {
    if icmp.len() < HEADER_LEN {
        return None;
    }
    Some(EchoHeader {
        icmp_type: icmp[0],
        code: icmp[1],
        ident: u16::from_be_bytes([icmp[4], icmp[5]]),
        seq: u16::from_be_bytes([icmp[6], icmp[7]]),
    })
}

/// Alguns SOs incluem o cabeçalho IP no início do datagrama recebido
/// (sockets RAW; sockets DGRAM entregam só o ICMP). Detecta IPv4 e pula
/// o IHL se for o caso.
pub fn strip_ipv4_header(buf: &[u8]) -> &[u8] {
    if buf.len() >= 20 && (buf[0] >> 4) == 4 {
        let ihl = (buf[0] & 0x0F) as usize * 4;
        if ihl <= buf.len() {
            return &buf[ihl..];
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_de_pacote_pronto_fecha_em_zero() {
        // Sobre um pacote com o checksum correto embutido, a soma fecha em 0
        let pkt = build_echo_request(0x1234, 7, b"abcd");
        assert_eq!(checksum(&pkt), 0);
    }

    #[test]
    fn checksum_de_cabecalho_simples() {
        let pkt = [8u8, 0, 0, 0, 0, 1, 0, 1];
        let csum = checksum(&pkt);
        assert_ne!(csum, 0);

        // Reaplica e recalcula: deve zerar
        let mut com_csum = pkt;
        com_csum[2] = (csum >> 8) as u8;
        com_csum[3] = (csum & 0xFF) as u8;
        assert_eq!(checksum(&com_csum), 0);
    }

    #[test]
    fn checksum_com_tamanho_impar() {
        // Byte final entra como palavra com zero à direita
        assert_eq!(checksum(&[0xFF]), !0xFF00u16);
    }

    #[test]
    fn build_echo_request_layout() {
        let pkt = build_echo_request(0xABCD, 0x0102, b"xyz");
        assert_eq!(pkt.len(), HEADER_LEN + 3);
        assert_eq!(pkt[0], ECHO_REQUEST);
        assert_eq!(pkt[1], 0);
        assert_eq!(&pkt[4..6], &[0xAB, 0xCD]);
        assert_eq!(&pkt[6..8], &[0x01, 0x02]);
        // Payload copiado por valor, byte a byte
        assert_eq!(&pkt[8..], b"xyz");
    }

    #[test]
    fn build_echo_request_payload_vazio() {
        let pkt = build_echo_request(1, 1, &[]);
        assert_eq!(pkt.len(), HEADER_LEN);
        assert_eq!(checksum(&pkt), 0);
    }

    #[test]
    fn parse_echo_header_roundtrip() {
        let pkt = build_echo_request(0x1234, 0x5678, b"data");
        let hdr = parse_echo_header(&pkt).unwrap();
        assert_eq!(hdr.icmp_type, ECHO_REQUEST);
        assert_eq!(hdr.code, 0);
        assert_eq!(hdr.ident, 0x1234);
        assert_eq!(hdr.seq, 0x5678);
    }

    #[test]
    fn parse_echo_header_curto_demais() {
        assert_eq!(parse_echo_header(&[0, 0, 0]), None);
    }

    #[test]
    fn strip_ipv4_header_com_cabecalho() {
        // Cabeçalho IPv4 mínimo (20 bytes, version=4, IHL=5) + echo
        let mut buf = vec![0u8; 20];
        buf[0] = 0x45;
        buf.extend_from_slice(&build_echo_request(1, 2, b"ok"));
        let icmp = strip_ipv4_header(&buf);
        assert_eq!(icmp.len(), HEADER_LEN + 2);
        assert_eq!(icmp[0], ECHO_REQUEST);
    }

    #[test]
    fn strip_ipv4_header_sem_cabecalho() {
        // Datagrama DGRAM começa direto no ICMP: primeiro nibble não é 4
        let pkt = build_echo_request(1, 2, b"ok");
        assert_eq!(strip_ipv4_header(&pkt), &pkt[..]);
    }
}
