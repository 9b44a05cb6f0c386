//! Troca única de ICMP Echo (ping) como primitiva chamável.
//!
//! O núcleo é [`exchange`]: monta um Echo Request, envia ao destino
//! IPv4, espera (limitado pelo timeout) por no máximo um datagrama e
//! decide por endereço + identifier/sequence se ele é a resposta
//! esperada. O socket ICMP é criado, mantido e fechado pelo chamador;
//! a função só o consulta e configura — o que permite reusar o mesmo
//! handle numa sequência de trocas.
//!
//! ```no_run
//! use socket2::{Domain, Protocol, Socket, Type};
//! use pingrs_echo::{exchange, ExchangeOutcome};
//!
//! let sock = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))?;
//! sock.bind(&"0.0.0.0:0".parse::<std::net::SocketAddr>()?.into())?;
//!
//! match exchange(&sock, "127.0.0.1", 1000, 1, b"ping")? {
//!     ExchangeOutcome::Matched(bytes) => println!("resposta com {bytes} bytes de payload"),
//!     ExchangeOutcome::Unmatched => println!("chegou outro datagrama"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod exchange;
pub mod icmp;

pub use error::ExchangeError;
pub use exchange::{exchange, ExchangeOutcome, DEFAULT_TIMEOUT_MS};
