//! Raw TCP connection to a backend node
//!
//! One connection carries one request at a time. Concurrency comes from
//! pooling many of these (see `pool`), not from pipelining.

use std::io::{self, BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ServerAddress;
use crate::utils::{ConnectionError, RespDecoder, RespEncoder, RespValue};

/// Buffered TCP connection with split reader/writer halves
pub struct RawConnection {
    writer: BufWriter<TcpStream>,
    reader: BufReader<TcpStream>,
    encoder: RespEncoder,
}

impl RawConnection {
    /// Open a TCP connection
    pub fn connect_tcp(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let connect_failed = |source: io::Error| ConnectionError::ConnectFailed {
            host: host.to_string(),
            port,
            source,
        };

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(connect_failed)?
            .next()
            .ok_or_else(|| {
                connect_failed(io::Error::new(
                    io::ErrorKind::NotFound,
                    "No addresses found",
                ))
            })?;

        let stream = TcpStream::connect_timeout(&addr, connect_timeout).map_err(connect_failed)?;
        stream.set_nodelay(true).ok();

        let writer = BufWriter::with_capacity(16 * 1024, stream.try_clone().map_err(connect_failed)?);
        let reader = BufReader::with_capacity(16 * 1024, stream);

        Ok(Self {
            writer,
            reader,
            encoder: RespEncoder::with_capacity(512),
        })
    }

    /// Send one command and wait for its reply
    pub fn execute(&mut self, args: &[&str]) -> io::Result<RespValue> {
        self.encoder.clear();
        self.encoder.encode_command_str(args);
        self.writer.write_all(self.encoder.as_bytes())?;
        self.writer.flush()?;
        RespDecoder::new(&mut self.reader).decode()
    }

    /// Send AUTH command
    pub fn authenticate(
        &mut self,
        password: &str,
        username: Option<&str>,
    ) -> Result<(), ConnectionError> {
        let reply = match username {
            Some(user) => self.execute(&["AUTH", user, password]),
            None => self.execute(&["AUTH", password]),
        };

        let reason = match reply {
            Ok(RespValue::SimpleString(s)) if s == "OK" => return Ok(()),
            Ok(RespValue::Error(e)) => e,
            Ok(other) => format!("unexpected AUTH reply: {:?}", other),
            Err(e) => e.to_string(),
        };
        Err(ConnectionError::Unreachable {
            addr: self.peer_addr(),
            reason: format!("authentication failed: {}", reason),
        })
    }

    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> io::Result<()> {
        self.reader.get_ref().set_read_timeout(read)?;
        self.writer.get_ref().set_write_timeout(write)
    }

    fn peer_addr(&self) -> String {
        self.reader
            .get_ref()
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

/// Connection factory for creating connections with common config
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub auth_password: Option<String>,
    pub auth_username: Option<String>,
}

impl ConnectionFactory {
    /// Open an authenticated connection to `addr`
    pub fn create(&self, addr: &ServerAddress) -> Result<RawConnection, ConnectionError> {
        let mut conn = RawConnection::connect_tcp(&addr.host, addr.port, self.connect_timeout)?;

        conn.set_timeouts(Some(self.request_timeout), Some(self.request_timeout))
            .ok();

        if let Some(ref password) = self.auth_password {
            conn.authenticate(password, self.auth_username.as_deref())?;
        }

        Ok(conn)
    }
}
