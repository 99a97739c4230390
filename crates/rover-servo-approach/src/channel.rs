use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::command::{ActuatorChannel, Command, ControlAction};

#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    #[error("failed to connect {channel} channel to {host}:{port}")]
    Connect {
        channel: ActuatorChannel,
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("failed to send on {channel} channel")]
    Send {
        channel: ActuatorChannel,
        #[source]
        source: io::Error,
    },
}

/// Where the rover's three command servers listen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub host: String,
    pub linear_port: u16,
    pub fork_port: u16,
    pub angular_port: u16,
    /// Bound on each connection attempt; `None` blocks.
    pub connect_timeout_ms: Option<u64>,
    /// Bound on each command write; `None` blocks.
    pub write_timeout_ms: Option<u64>,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            host: String::from("192.168.0.134"),
            linear_port: 25000,
            fork_port: 25001,
            angular_port: 25002,
            connect_timeout_ms: None,
            write_timeout_ms: None,
        }
    }
}

impl ActuatorConfig {
    pub fn port(&self, channel: ActuatorChannel) -> u16 {
        match channel {
            ActuatorChannel::Angular => self.angular_port,
            ActuatorChannel::Linear => self.linear_port,
            ActuatorChannel::Fork => self.fork_port,
        }
    }
}

/// Destination for actuator commands.
pub trait CommandSink {
    fn send(&mut self, command: Command) -> Result<(), ChannelError>;

    /// Release the channels. Further sends are an error for network sinks.
    fn close(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn send(&mut self, command: Command) -> Result<(), ChannelError> {
        (**self).send(command)
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        (**self).close()
    }
}

/// One TCP connection per actuator channel.
#[derive(Debug)]
pub struct TcpActuators {
    angular: TcpStream,
    linear: TcpStream,
    fork: TcpStream,
}

impl TcpActuators {
    pub fn connect(config: &ActuatorConfig) -> Result<Self, ChannelError> {
        let fork = open_channel(config, ActuatorChannel::Fork)?;
        let angular = open_channel(config, ActuatorChannel::Angular)?;
        let linear = open_channel(config, ActuatorChannel::Linear)?;
        info!(
            "actuators connected on {} (linear {}, fork {}, angular {})",
            config.host, config.linear_port, config.fork_port, config.angular_port
        );
        Ok(Self {
            angular,
            linear,
            fork,
        })
    }

    fn stream(&mut self, channel: ActuatorChannel) -> &mut TcpStream {
        match channel {
            ActuatorChannel::Angular => &mut self.angular,
            ActuatorChannel::Linear => &mut self.linear,
            ActuatorChannel::Fork => &mut self.fork,
        }
    }
}

fn open_channel(config: &ActuatorConfig, channel: ActuatorChannel) -> Result<TcpStream, ChannelError> {
    let port = config.port(channel);
    let connect_err = |source| ChannelError::Connect {
        channel,
        host: config.host.clone(),
        port,
        source,
    };

    let stream = match config.connect_timeout_ms {
        Some(ms) => {
            let addr = resolve(&config.host, port).map_err(connect_err)?;
            TcpStream::connect_timeout(&addr, Duration::from_millis(ms))
        }
        None => TcpStream::connect((config.host.as_str(), port)),
    }
    .map_err(connect_err)?;

    stream.set_nodelay(true).map_err(connect_err)?;
    if let Some(ms) = config.write_timeout_ms {
        stream
            .set_write_timeout(Some(Duration::from_millis(ms)))
            .map_err(connect_err)?;
    }
    Ok(stream)
}

fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address for {host}"),
        )
    })
}

impl CommandSink for TcpActuators {
    fn send(&mut self, command: Command) -> Result<(), ChannelError> {
        let channel = command.channel();
        self.stream(channel)
            .write_all(&command.encode())
            .map_err(|source| ChannelError::Send { channel, source })
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        shutdown_all(|channel| self.stream(channel).shutdown(Shutdown::Both))?;
        info!("actuator channels closed");
        Ok(())
    }
}

/// Shut down every channel, then report the first failure.
fn shutdown_all<F>(mut shutdown: F) -> Result<(), ChannelError>
where
    F: FnMut(ActuatorChannel) -> io::Result<()>,
{
    let mut first = None;
    for channel in [
        ActuatorChannel::Angular,
        ActuatorChannel::Linear,
        ActuatorChannel::Fork,
    ] {
        match shutdown(channel) {
            Ok(()) => {}
            // peer already gone
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
            Err(source) => {
                warn!("{channel} channel shutdown failed: {source}");
                first.get_or_insert(ChannelError::Send { channel, source });
            }
        }
    }
    first.map_or(Ok(()), Err)
}

/// Dry-run sink: logs every command, sends nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingSink;

impl CommandSink for LoggingSink {
    fn send(&mut self, command: Command) -> Result<(), ChannelError> {
        info!("[dry-run] {} <- {}", command.channel(), command.value());
        Ok(())
    }
}

/// Keeps every command in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSink {
    pub sent: Vec<Command>,
    pub closed: bool,
}

impl RecordingSink {
    pub fn on(&self, channel: ActuatorChannel) -> impl Iterator<Item = f64> + '_ {
        self.sent
            .iter()
            .filter(move |c| c.channel() == channel)
            .map(Command::value)
    }
}

impl CommandSink for RecordingSink {
    fn send(&mut self, command: Command) -> Result<(), ChannelError> {
        self.sent.push(command);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        self.closed = true;
        Ok(())
    }
}

/// Run a cycle's actions in order, sleeping on each settle step.
pub fn execute<S: CommandSink + ?Sized>(
    actions: &[ControlAction],
    sink: &mut S,
) -> Result<(), ChannelError> {
    for action in actions {
        match *action {
            ControlAction::Send(command) => {
                debug!("send {} {}", command.channel(), command.value());
                sink.send(command)?;
            }
            ControlAction::Settle(d) => {
                if !d.is_zero() {
                    thread::sleep(d);
                }
            }
        }
    }
    Ok(())
}
