use std::io;
use std::time::Duration;

/// Falhas terminais de uma troca de Echo. Cada variante carrega a
/// syscall de origem na mensagem e, quando existe, o erro do SO como
/// `source`.
///
/// Um datagrama recebido que não casa com o pedido não é erro — vira
/// [`ExchangeOutcome::Unmatched`](crate::ExchangeOutcome::Unmatched).
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// Destino vazio ou não parseável como IPv4 decimal-pontuado.
    #[error("destino inválido: {0:?}")]
    InvalidArgument(String),
    /// O socket fornecido não pôde ser consultado (getsockname).
    #[error("getsockname falhou no socket fornecido")]
    InvalidHandle(#[source] io::Error),
    /// O socket rejeitou o timeout de recepção (setsockopt SO_RCVTIMEO).
    #[error("setsockopt falhou ao aplicar o timeout de recepção")]
    SetTimeout(#[source] io::Error),
    /// Falha ao transmitir o Echo Request (sendto).
    #[error("sendto falhou ao enviar o Echo Request")]
    Send(#[source] io::Error),
    /// Nenhum datagrama chegou dentro da janela configurada.
    #[error("nenhuma resposta em {0:?}")]
    Timeout(Duration),
    /// Falha de recepção que não é timeout (recvfrom).
    #[error("recvfrom falhou ao receber a resposta")]
    Receive(#[source] io::Error),
}
