use clap::Parser;
use radiomail_core::RadioConfig;
use radiomail_core::transport::air::DEFAULT_AIR_PORT;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "radiomail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// This node's address on the air (0-255)
    #[arg(short = 'a', long, default_value = "2")]
    pub address: u8,

    /// Initial destination address
    #[arg(long, default_value = "1")]
    pub destination: u8,

    /// Base UDP port of the simulated air; node N listens on base + N
    #[arg(long, default_value_t = DEFAULT_AIR_PORT)]
    pub air_port: u16,

    /// How long each send attempt waits for an ACK (e.g. 500ms, 2s)
    #[arg(long, default_value = "500ms", value_parser = humantime::parse_duration)]
    pub ack_wait: Duration,

    /// Retransmissions after the first attempt
    #[arg(long, default_value = "2")]
    pub ack_retries: u32,

    /// Delay before answering a received message with an ACK
    #[arg(long, default_value = "100ms", value_parser = humantime::parse_duration)]
    pub ack_delay: Duration,

    /// Upper bound on one receive poll of the driver loop
    #[arg(long, default_value = "50ms", value_parser = humantime::parse_duration)]
    pub receive_timeout: Duration,

    /// Accept frames without checking their CRC
    #[arg(long)]
    pub no_crc: bool,

    /// Output in JSON format, one object per line
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Stop once standard input is closed
    #[arg(long)]
    pub exit_on_eof: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn radio_config(&self) -> RadioConfig {
        RadioConfig {
            node_address: self.address,
            destination: self.destination,
            ack_wait: self.ack_wait,
            ack_retries: self.ack_retries,
            ack_delay: self.ack_delay,
            receive_timeout: self.receive_timeout,
            enable_crc: !self.no_crc,
        }
    }
}
