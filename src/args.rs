use anyhow::{Context, Result};
use std::net::Ipv4Addr;

pub struct PingArgs {
    pub dst: Ipv4Addr,
    pub count: u64,
    pub timeout_ms: i32,
    pub payload_size: usize,
}

pub fn parse() -> Result<PingArgs> {
    let args: Vec<String> = std::env::args().collect();
    let mut dst_str = None;
    let mut count = 5u64;
    let mut timeout_ms = 0i32; // <= 0: a biblioteca aplica o default
    let mut payload_size = 56usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().context("Valor inválido para -c")?;
                    i += 1;
                } else {
                    anyhow::bail!("Faltou o valor para -c");
                }
            }
            "-W" => {
                if i + 1 < args.len() {
                    timeout_ms = args[i + 1].parse().context("Valor inválido para -W")?;
                    i += 1;
                } else {
                    anyhow::bail!("Faltou o valor para -W");
                }
            }
            "-s" => {
                if i + 1 < args.len() {
                    payload_size = args[i + 1].parse().context("Valor inválido para -s")?;
                    i += 1;
                } else {
                    anyhow::bail!("Faltou o valor para -s");
                }
            }
            val => {
                if dst_str.is_none() {
                    dst_str = Some(val);
                }
            }
        }
        i += 1;
    }

    let dst_str =
        dst_str.context("Uso: pingrs-echo <ipv4> [-c <count>] [-W <timeout_ms>] [-s <bytes>]")?;
    let dst: Ipv4Addr = dst_str.parse().context("Endereço IP inválido")?;

    Ok(PingArgs {
        dst,
        count,
        timeout_ms,
        payload_size,
    })
}
