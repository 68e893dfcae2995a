//! snmpwatch-traps: Receive SNMP traps and print them as they arrive.
//!
//! Part of the snmp-watch CLI utilities.

use clap::Parser;
use snmp_watch::cli::args::{ListenArgs, OutputArgs};
use snmp_watch::cli::output::{OutputContext, write_error};
use snmp_watch::decode::TextEncoding;
use snmp_watch::{TrapListener, VarBindDecoder};
use std::process::ExitCode;

/// Listen for SNMP traps.
#[derive(Debug, Parser)]
#[command(name = "snmpwatch-traps", version, about)]
struct Args {
    #[command(flatten)]
    listen: ListenArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let decoder = match TextEncoding::for_label(&args.listen.text.encoding) {
        Ok(encoding) => VarBindDecoder::new(encoding),
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let (mut listener, mut traps) =
        match TrapListener::start(args.listen.listener_config(), decoder).await {
            Ok(started) => started,
            Err(e) => {
                write_error(&e);
                return ExitCode::FAILURE;
            }
        };
    eprintln!("Listening for traps on {}", listener.local_addr());

    let ctx = OutputContext {
        format: args.output.format,
        show_hints: !args.output.no_hints,
        show_timing: false,
    };

    let mut status = ExitCode::SUCCESS;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = traps.recv() => {
                let Some(event) = event else { break };
                if let Err(e) = ctx.write_trap(&event) {
                    eprintln!("Error writing output: {}", e);
                    status = ExitCode::FAILURE;
                    break;
                }
            }
        }
    }

    listener.stop().await;
    status
}
