// Tratamento de erros ergonômico
use anyhow::{Context, Result};

// Criação e configuração de sockets de baixo nível
use socket2::{Domain, Protocol, Socket, Type};

// Endereços (IPv4, socket address)
use std::net::SocketAddr;

// Medição de tempo (RTT)
use std::time::{Duration, Instant};

use pingrs_echo::{exchange, ExchangeError, ExchangeOutcome};

// Módulos locais
mod args;

/// Cria o socket ICMP do papel de "provedor de socket": tenta DGRAM
/// (não exige root no Linux com ping_group_range) e cai para RAW.
fn create_icmp_socket() -> Result<Socket> {
    let sock = match Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4)) {
        Ok(sock) => sock,
        Err(_) => Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)).context(
            "Falha ao criar socket ICMP. Verifique privilégios ou net.ipv4.ping_group_range.",
        )?,
    };

    // bind faz o kernel atribuir o identifier do echo em sockets DGRAM
    let any: SocketAddr = "0.0.0.0:0".parse().expect("endereço literal");
    sock.bind(&any.into()).context("Falha no bind do socket ICMP")?;

    Ok(sock)
}

/// Programa principal: dispara uma sequência de trocas Echo pela
/// biblioteca, uma por vez, e imprime as estatísticas ao final.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parsing de argumentos via módulo args
    let args = args::parse()?;
    let dst = args.dst;
    let dst_str = dst.to_string();

    // Configura handler para Ctrl+C
    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, std::sync::atomic::Ordering::SeqCst);
    })
    .context("Erro ao configurar handler de Ctrl+C")?;

    // O socket pertence a este chamador e é reusado em todas as trocas
    let sock = create_icmp_socket()?;

    // Payload enviado dentro do pacote ICMP
    let payload: Vec<u8> = (0..args.payload_size).map(|i| (i % 256) as u8).collect();

    println!("Disparando {} com {} bytes de dados:", dst, payload.len());

    // Estatísticas
    let mut transmitted = 0u64;
    let mut received_count = 0u64;
    let mut rtts = Vec::new();

    let mut seq = 1u16;
    for _ in 0..args.count {
        if !running.load(std::sync::atomic::Ordering::SeqCst) {
            break;
        }

        let t0 = Instant::now();
        transmitted += 1;

        match exchange(&sock, &dst_str, args.timeout_ms, seq, &payload) {
            Ok(ExchangeOutcome::Matched(bytes)) => {
                let rtt_ms = t0.elapsed().as_secs_f64() * 1000.0;
                println!(
                    "Resposta de {}: bytes={} icmp_seq={} tempo={:.2}ms",
                    dst, bytes, seq, rtt_ms
                );
                received_count += 1;
                rtts.push(rtt_ms);
            }
            Ok(ExchangeOutcome::Unmatched) => {
                println!("Chegou um datagrama que não corresponde (icmp_seq={}).", seq);
            }
            Err(ExchangeError::Timeout(_)) => {
                println!("Esgotado o tempo limite do pedido.");
            }
            Err(e) => {
                println!("Falha no ping: {}", e);
            }
        }

        // Prepara próxima sequência (wrap around)
        seq = seq.wrapping_add(1);
        if seq == 0 {
            seq = 1;
        }

        // Sleep de 1s entre pings; não dorme depois do último
        if transmitted < args.count && running.load(std::sync::atomic::Ordering::SeqCst) {
            std::thread::sleep(Duration::from_secs(1));
        }
    }

    // Exibe estatísticas ao sair
    println!("\n--- estatísticas de ping para {} ---", dst);
    let loss = if transmitted > 0 {
        (transmitted - received_count) as f64 / transmitted as f64 * 100.0
    } else {
        0.0
    };
    println!(
        "{} pacotes transmitidos, {} recebidos, {:.0}% de perda de pacotes",
        transmitted, received_count, loss
    );

    if !rtts.is_empty() {
        let min = rtts.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = rtts.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let sum: f64 = rtts.iter().sum();
        let avg = sum / rtts.len() as f64;
        println!("rtt min/avg/max = {:.3}/{:.3}/{:.3} ms", min, avg, max);
    }

    Ok(())
}
