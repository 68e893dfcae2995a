//! snmpwatch-monitor: Poll SNMP objects periodically until interrupted.
//!
//! Part of the snmp-watch CLI utilities.

use clap::Parser;
use snmp_watch::cli::args::{CommonArgs, OutputArgs, parse_interval};
use snmp_watch::cli::hints::parse_oid;
use snmp_watch::cli::output::{OutputContext, write_error};
use snmp_watch::{Engine, MonitorScheduler};
use std::process::ExitCode;
use std::time::Duration;

/// Poll SNMP objects on a fixed period and print every result.
#[derive(Debug, Parser)]
#[command(name = "snmpwatch-monitor", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Polling period (e.g. 500ms, 2s, 1m).
    #[arg(short = 'i', long = "interval", default_value = "1s", value_parser = parse_interval)]
    interval: Duration,

    /// OIDs to monitor (dotted notation or well-known names).
    #[arg(required = true, value_name = "OID")]
    oids: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let target = match args.common.target_addr() {
        Ok(addr) => addr,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let config = args.common.engine_config().monitor_interval(args.interval);
    let engine = match Engine::connect(target, &args.common.credentials(), config).await {
        Ok(engine) => engine,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let (monitor, mut events) = MonitorScheduler::new(engine);
    for name in &args.oids {
        let key = match parse_oid(name) {
            Ok(oid) => oid.to_string(),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        match monitor.add_default(&key) {
            Ok(()) => {}
            // the same object named twice is monitored once
            Err(snmp_watch::Error::DuplicateKey { .. }) => {}
            Err(e) => {
                write_error(&e);
                return ExitCode::FAILURE;
            }
        }
    }

    let ctx = OutputContext {
        format: args.output.format,
        show_hints: !args.output.no_hints,
        show_timing: false,
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                if let Err(e) = ctx.write_monitor_event(&event) {
                    eprintln!("Error writing output: {}", e);
                    monitor.shutdown();
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    monitor.shutdown();
    ExitCode::SUCCESS
}
