use client::{Client, Config};
use transport::prelude::*;
use transport::rtu::port::{RtsPin, SerialLine};

use env_logger::Builder;
use log::{info, LevelFilter};
use tokio::signal;

use std::env;
use std::error::Error;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_LINK_POLL: Duration = Duration::from_millis(5);

struct Args {
    settings: Settings,
    config: Config,
    link_poll: Duration,
    debug: bool,
    registers: Vec<(u16, u16)>,
}

impl Default for Args {
    fn default() -> Args {
        Args {
            settings: Settings::default(),
            config: Config::default(),
            link_poll: DEFAULT_LINK_POLL,
            debug: false,
            registers: Vec::new(),
        }
    }
}

fn usage() {
    println!(
        r#"rtu-slave [parameters]

Parameters:
    serial:<port>   - serial port and line settings. /dev/ttyUSB0:9600-8-N-1 by default
    slave:<1-247>   - slave address. 1 by default
    poll:<ms>       - period of processing received messages. 100 by default
    link-poll:<ms>  - period of polling the serial line. 5 by default
    de:<rts|none>   - how the transceiver direction is switched. rts by default
    reg:<addr>=<v>  - initial value of a holding register, may be repeated
    debug           - extended output

Env. variables:
    RUST_LOG - changes output verbosity. Values [error,warn,info,debug,trace]. info by default

Examples:
    rtu-slave - run with default parameters

    rtu-slave serial:/dev/ttyUSB1:19200-8-E-1 slave:17 - answer as slave 17 on /dev/ttyUSB1

    rtu-slave reg:40001=17 reg:40002=34 de:none debug - serve two registers, no direction pin
    "#
    );
}

fn parse_ms(value: &str) -> Result<Duration, String> {
    u64::from_str(value)
        .map(Duration::from_millis)
        .map_err(|_| format!("invalid period: {}", value))
}

fn parse_register(value: &str) -> Result<(u16, u16), String> {
    let err = || format!("invalid register: {}", value);
    let (address, value) = value.split_once('=').ok_or_else(err)?;
    let address = u16::from_str(address).map_err(|_| err())?;
    let value = u16::from_str(value).map_err(|_| err())?;
    Ok((address, value))
}

/// Returns `None` when only help was asked for.
fn read_args<I: Iterator<Item = String>>(args: I) -> Result<Option<Args>, String> {
    let mut result = Args::default();
    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Ok(None);
        }

        if arg == "debug" {
            result.debug = true;
            continue;
        }

        let (key, value) = arg
            .split_once(':')
            .ok_or_else(|| format!("unknown parameter: {}", arg))?;
        match key {
            "serial" => {
                result.settings.port = PortSettings::from_str(value)
                    .map_err(|err| format!("invalid port {}: {}", value, err))?;
            }
            "slave" => {
                let address = u8::from_str(value).map_err(|_| format!("invalid slave: {}", value))?;
                let config = Config::new(address).map_err(|err| err.to_string())?;
                result.config = config.with_poll_interval(result.config.poll_interval);
            }
            "poll" => result.config.poll_interval = parse_ms(value)?,
            "link-poll" => result.link_poll = parse_ms(value)?,
            "de" => {
                result.settings.direction =
                    DirectionControl::from_str(value).map_err(|err| err.to_owned())?;
            }
            "reg" => result.registers.push(parse_register(value)?),
            _ => return Err(format!("unknown parameter: {}", arg)),
        }
    }
    Ok(Some(result))
}

async fn wait_ctrl_c() {
    info!("press Ctrl+C to exit");
    let _ = signal::ctrl_c().await;
    info!("stopping...");
}

fn init_logger(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.init();
}

async fn serve<P: DirectionPin<SerialLine>>(
    line: SerialLine,
    pin: P,
    timing: LineTiming,
    args: Args,
) -> Result<(), Box<dyn Error>> {
    let port = &args.settings.port;
    let (link, handler) = Rs485Link::build(line, pin, timing, args.settings.nmsg, &port.name);
    let poller = link.spawn_polling(args.link_poll);

    let mut client = Client::new(args.config, link, handler);
    for (address, value) in &args.registers {
        client.holding_registers_mut().set(*address, *value);
    }

    info!(
        "{} {} bps, inter-frame gap {:?}, driver enable {:?}",
        port.name,
        timing.baud(),
        timing.inter_frame(),
        timing.driver_enable_delay()
    );

    tokio::select! {
        _ = client.run_loop() => {}
        _ = wait_ctrl_c() => {}
    }
    poller.abort();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = match read_args(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            usage();
            return Ok(());
        }
        Err(err) => {
            usage();
            return Err(err.into());
        }
    };

    init_logger(args.debug);

    let timing = LineTiming::new(&args.settings.port, args.settings.driver_enable_chars);
    let line = SerialLine::open(&args.settings.port, timing.inter_frame())?;
    match args.settings.direction {
        DirectionControl::Rts => serve(line, RtsPin, timing, args).await,
        DirectionControl::None => serve(line, NoPin, timing, args).await,
    }
}
