//! Remote client
//!
//! Sends one command to a control server and waits for its response.

use crate::config::ClientConfig;
use crate::error::ProtocolError;
use crate::protocol::{Command, Response};
use crate::transport::read_line_bounded;

use std::io::{BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Largest response line accepted from a server
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Client for a remote control server
#[derive(Debug, Clone)]
pub struct RemoteClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl RemoteClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.host.clone(), config.port, config.timeout())
    }

    /// `host:port` of the server
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Send a command and return the server's response
    ///
    /// An error response from the server is still `Ok`; only transport and
    /// decoding failures are errors here.
    pub fn send(&self, command: &Command) -> Result<Response, ProtocolError> {
        let stream = self.connect()?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        let mut line = command.encode()?;
        line.push('\n');
        log::debug!("Sending to {}: {}", self.addr(), line.trim_end());
        (&stream).write_all(line.as_bytes())?;
        (&stream).flush()?;

        let mut buf = Vec::new();
        let mut reader = BufReader::new(&stream);
        match read_line_bounded(&mut reader, &mut buf, MAX_RESPONSE_BYTES) {
            Ok(0) => return Err(ProtocolError::ConnectionClosed),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(ProtocolError::MessageTooLarge(MAX_RESPONSE_BYTES))
            }
            Err(e) => return Err(e.into()),
        }

        let text = String::from_utf8(buf).map_err(|e| ProtocolError::InvalidMessage(e.to_string()))?;
        let response = Response::decode(&text)?;
        log::debug!("Response from {}: {}", self.addr(), response.status);
        Ok(response)
    }

    fn connect(&self) -> Result<TcpStream, ProtocolError> {
        let connect_err = |reason: String| ProtocolError::Connect {
            addr: self.addr(),
            reason,
        };

        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| connect_err(e.to_string()))?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(connect_err(
            last_err.map_or_else(|| "no address resolved".to_string(), |e| e.to_string()),
        ))
    }
}
