//! Control server
//!
//! Accepts connections one at a time. Each connection carries one command
//! line and receives one response line before it is closed.

use crate::config::ServerConfig;
use crate::error::ProtocolError;
use crate::protocol::Response;
use crate::services::CommandDispatcher;
use crate::sysfs::ControlFs;
use crate::transport::read_line_bounded;

use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often the accept loop checks the shutdown flag
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Most bytes discarded after rejecting an oversized message
const DRAIN_LIMIT: u64 = 64 * 1024;

/// Single-threaded command server
pub struct ControlServer<F> {
    listener: TcpListener,
    dispatcher: CommandDispatcher<F>,
    read_timeout: Duration,
    max_message_bytes: usize,
    running: Arc<AtomicBool>,
}

impl<F: ControlFs> ControlServer<F> {
    /// Bind the listener described by `config`
    pub fn bind(config: &ServerConfig, dispatcher: CommandDispatcher<F>) -> Result<Self, ProtocolError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr).map_err(|e| ProtocolError::Connect {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            listener,
            dispatcher,
            read_timeout: config.read_timeout(),
            max_message_bytes: config.max_message_bytes,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Flag that keeps the accept loop alive; store `false` to stop it
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn dispatcher(&self) -> &CommandDispatcher<F> {
        &self.dispatcher
    }

    /// Serve until the running flag is cleared
    pub fn run(&mut self) -> Result<(), ProtocolError> {
        log::info!("Listening on {}", self.local_addr()?);

        while self.running.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    log::info!("Connection from {}", peer);
                    if let Err(e) = self.handle(stream) {
                        log::warn!("Connection {} failed: {}", peer, e);
                    }
                    log::debug!("Connection {} closed", peer);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => log::error!("Accept failed: {}", e),
            }
        }

        log::info!("Server stopped");
        Ok(())
    }

    /// Read one command from `stream`, dispatch it and write the response
    pub fn handle(&mut self, stream: TcpStream) -> Result<(), ProtocolError> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.read_timeout))?;
        stream.set_write_timeout(Some(self.read_timeout))?;

        let mut line = Vec::new();
        let read = {
            let mut reader = BufReader::new(&stream);
            read_line_bounded(&mut reader, &mut line, self.max_message_bytes)
        };

        let mut oversized = false;
        let response = match read {
            Ok(0) => return Err(ProtocolError::ConnectionClosed),
            Ok(_) => self.dispatch_bytes(&line),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                oversized = true;
                self.dispatcher
                    .reject(&ProtocolError::MessageTooLarge(self.max_message_bytes))
            }
            // The peer stalled without a newline; answer what did arrive
            Err(e) if is_timeout(&e) && !line.is_empty() => {
                log::debug!("Read timed out after {} bytes without newline", line.len());
                self.dispatch_bytes(&line)
            }
            Err(e) => return Err(e.into()),
        };

        let mut payload = response.encode()?;
        payload.push('\n');
        (&stream).write_all(payload.as_bytes())?;
        (&stream).flush()?;

        if oversized {
            // Unread input would turn the close into a reset and lose the reply
            stream.shutdown(Shutdown::Write)?;
            let _ = io::copy(&mut (&stream).take(DRAIN_LIMIT), &mut io::sink());
        }
        Ok(())
    }

    fn dispatch_bytes(&mut self, line: &[u8]) -> Response {
        match std::str::from_utf8(line) {
            Ok(text) => self.dispatcher.dispatch_line(text),
            Err(e) => self
                .dispatcher
                .reject(&ProtocolError::InvalidMessage(e.to_string())),
        }
    }
}

/// Read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AllTargetRouting, HardwareConfig};
    use crate::mock::MockFs;
    use crate::protocol::ErrorKind;
    use crate::sysfs::layout::DEFAULT_CPU_BASE;
    use std::io::BufRead;

    fn server() -> ControlServer<MockFs> {
        server_with_timeout(2)
    }

    fn server_with_timeout(read_timeout_seconds: u64) -> ControlServer<MockFs> {
        let fs = Arc::new(
            MockFs::new().with_cpu_core(DEFAULT_CPU_BASE, 0, "userspace", &[345_600, 960_000]),
        );
        let dispatcher =
            CommandDispatcher::discover(fs, &HardwareConfig::default(), AllTargetRouting::Gpu)
                .unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            read_timeout_seconds,
            max_message_bytes: 128,
        };
        ControlServer::bind(&config, dispatcher).unwrap()
    }

    fn accept(server: &ControlServer<MockFs>) -> TcpStream {
        loop {
            match server.listener.accept() {
                Ok((stream, _)) => return stream,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10))
                }
                Err(e) => panic!("accept failed: {}", e),
            }
        }
    }

    /// Send raw bytes through one accepted connection and return the reply
    fn exchange(server: &mut ControlServer<MockFs>, input: &[u8]) -> Response {
        let addr = server.local_addr().unwrap();
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(input).unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();

        let stream = accept(server);
        server.handle(stream).unwrap();

        let mut reply = String::new();
        std::io::BufReader::new(client).read_line(&mut reply).unwrap();
        Response::decode(&reply).unwrap()
    }

    #[test]
    fn test_handles_command_line() {
        let mut server = server();
        let response = exchange(&mut server, b"{\"action\":\"get_status\"}\n");

        assert!(response.is_success());
        assert_eq!(response.cpu_status.unwrap().len(), 1);
    }

    #[test]
    fn test_oversized_message() {
        let mut server = server();
        let mut input = vec![b' '; 200];
        input.push(b'\n');
        let response = exchange(&mut server, &input);

        assert_eq!(response.error, Some(ErrorKind::InvalidRequest));
        assert!(response.message.contains("128"));
    }

    #[test]
    fn test_malformed_json() {
        let mut server = server();
        let response = exchange(&mut server, b"{\"action\": get_status}\n");
        assert_eq!(response.error, Some(ErrorKind::InvalidRequest));
    }

    #[test]
    fn test_unterminated_command_answered_at_timeout() {
        let mut server = server_with_timeout(1);
        let addr = server.local_addr().unwrap();
        let mut client = TcpStream::connect(addr).unwrap();
        // No newline and the write side stays open
        client.write_all(b"{\"action\":\"get_status\"}").unwrap();

        let stream = accept(&server);
        server.handle(stream).unwrap();

        let mut reply = String::new();
        std::io::BufReader::new(&client).read_line(&mut reply).unwrap();
        let response = Response::decode(&reply).unwrap();
        assert!(response.is_success());
        assert_eq!(response.cpu_status.unwrap().len(), 1);
    }

    #[test]
    fn test_idle_connection_times_out_silently() {
        let mut server = server_with_timeout(1);
        let addr = server.local_addr().unwrap();
        let _client = TcpStream::connect(addr).unwrap();

        let stream = accept(&server);
        assert!(matches!(server.handle(stream), Err(ProtocolError::Io(_))));
    }

    #[test]
    fn test_closed_without_data() {
        let mut server = server();
        let addr = server.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();

        let stream = accept(&server);
        assert!(matches!(
            server.handle(stream),
            Err(ProtocolError::ConnectionClosed)
        ));

        let mut rest = Vec::new();
        let _ = (&client).read_to_end(&mut rest);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_run_stops_when_flag_cleared() {
        let mut server = server();
        let running = server.running_flag();
        running.store(false, Ordering::SeqCst);
        assert!(server.run().is_ok());
    }
}
