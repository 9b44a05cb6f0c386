//! O núcleo da troca: um Echo Request → Echo Reply sobre um socket
//! ICMP aberto pelo chamador. Um envio e no máximo uma leitura por
//! chamada; repetir (ex.: após timeout) é política do chamador.

use std::io;
use std::mem::MaybeUninit;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use socket2::Socket;
use tracing::debug;

use crate::error::ExchangeError;
use crate::icmp::{self, ECHO_REPLY, HEADER_LEN};

/// Timeout de recepção aplicado quando o chamador passa um valor <= 0.
pub const DEFAULT_TIMEOUT_MS: i32 = 5000;

// Dimensionado para o maior datagrama ICMP esperado, sem truncar
// echoes de payloads grandes
const RECV_BUF_LEN: usize = 50 * 1024;

/// Desfecho de uma troca que chegou a receber um datagrama.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Chegou o Echo Reply esperado; carrega o tamanho do payload da
    /// resposta (datagrama menos os 8 bytes de cabeçalho).
    Matched(usize),
    /// Chegou um datagrama que não casa com o pedido (ruído de rede,
    /// resposta a um pedido antigo ou alheio). Não é erro; a troca
    /// termina sem segunda leitura.
    Unmatched,
}

/// Converte o timeout pedido (ms) no timeout efetivo de recepção.
///
/// Valores <= 0 viram o default de 5000 ms. O valor é decomposto em
/// segundos inteiros + microssegundos para o SO_RCVTIMEO; microssegundos
/// derivados negativos são zerados.
fn effective_timeout(timeout_ms: i32) -> Duration {
    let ms = if timeout_ms <= 0 {
        DEFAULT_TIMEOUT_MS
    } else {
        timeout_ms
    };

    let sec = ms / 1000;
    let mut usec = (ms - sec * 1000) * 1000;
    if usec < 0 {
        usec = 0;
    }

    Duration::new(sec as u64, usec as u32 * 1000)
}

/// Aplica o predicado de casamento a um datagrama recebido.
///
/// Casa sse: o comprimento do trecho ICMP é igual ao transmitido, a
/// origem é o destino do pedido, e o cabeçalho é um Echo Reply com o
/// mesmo identifier/sequence. O payload não entra na comparação.
fn match_reply(
    sent: &[u8],
    received: &[u8],
    source: Option<IpAddr>,
    destination: Ipv4Addr,
) -> ExchangeOutcome {
    // Sockets RAW entregam o cabeçalho IP junto; DGRAM não
    let reply = icmp::strip_ipv4_header(received);

    if reply.len() != sent.len() {
        return ExchangeOutcome::Unmatched;
    }

    if source != Some(IpAddr::V4(destination)) {
        return ExchangeOutcome::Unmatched;
    }

    let (Some(req), Some(resp)) = (icmp::parse_echo_header(sent), icmp::parse_echo_header(reply))
    else {
        return ExchangeOutcome::Unmatched;
    };

    if resp.icmp_type != ECHO_REPLY
        || resp.code != 0
        || resp.ident != req.ident
        || resp.seq != req.seq
    {
        return ExchangeOutcome::Unmatched;
    }

    ExchangeOutcome::Matched(reply.len() - HEADER_LEN)
}

/// Executa uma troca ICMP Echo Request → Reply sobre `socket`.
///
/// O socket é um handle ICMP IPv4 já aberto e pertence ao chamador; a
/// função não o cria nem o fecha, mas **muta o timeout de recepção**
/// dele como efeito colateral (persiste após o retorno). `destination`
/// é um IPv4 textual decimal-pontuado; `timeout_ms <= 0` usa
/// [`DEFAULT_TIMEOUT_MS`]; `sequence` é ecoado de volta por um peer
/// correto; `payload` (pode ser vazio) vai após o cabeçalho de 8 bytes.
///
/// Envia exatamente um datagrama e lê no máximo um. Um datagrama que
/// não casa encerra a troca como [`ExchangeOutcome::Unmatched`] — não
/// há releitura nem reenvio internos.
pub fn exchange(
    socket: &Socket,
    destination: &str,
    timeout_ms: i32,
    sequence: u16,
    payload: &[u8],
) -> Result<ExchangeOutcome, ExchangeError> {
    // Valida o destino antes de tocar no socket
    if destination.is_empty() {
        return Err(ExchangeError::InvalidArgument(String::from(
            "destino vazio",
        )));
    }
    let dst: Ipv4Addr = destination
        .parse()
        .map_err(|_| ExchangeError::InvalidArgument(destination.to_string()))?;

    // getsockname valida o handle e, em sockets ICMP DGRAM do Linux,
    // expõe como "porta" local o identifier que o kernel grava no fio.
    // Sem bind (porta 0, sockets RAW) cai no PID, como o ping clássico.
    let local = socket.local_addr().map_err(ExchangeError::InvalidHandle)?;
    let ident = match local.as_socket() {
        Some(addr) if addr.port() != 0 => addr.port(),
        _ => std::process::id() as u16,
    };

    let timeout = effective_timeout(timeout_ms);
    socket
        .set_read_timeout(Some(timeout))
        .map_err(ExchangeError::SetTimeout)?;

    let pkt = icmp::build_echo_request(ident, sequence, payload);
    let addr = SocketAddr::new(IpAddr::V4(dst), 0);

    debug!(destino = %dst, ident, seq = sequence, bytes = pkt.len(), "enviando echo request");
    socket
        .send_to(&pkt, &addr.into())
        .map_err(ExchangeError::Send)?;

    let mut buf = vec![MaybeUninit::<u8>::uninit(); RECV_BUF_LEN];
    let (n, source) = match socket.recv_from(&mut buf) {
        Ok(ok) => ok,
        Err(e)
            if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
        {
            return Err(ExchangeError::Timeout(timeout));
        }
        Err(e) => return Err(ExchangeError::Receive(e)),
    };

    // recv_from inicializou os n primeiros bytes do buffer
    let received = unsafe { std::slice::from_raw_parts(buf.as_ptr().cast::<u8>(), n) };
    let source = source.as_socket().map(|a| a.ip());
    debug!(origem = ?source, bytes = n, "datagrama recebido");

    Ok(match_reply(&pkt, received, source, dst))
}
