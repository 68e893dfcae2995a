//! snmpwatch-table: Walk a conceptual table and print it as rows and columns.
//!
//! Part of the snmp-watch CLI utilities.

use clap::Parser;
use snmp_watch::Engine;
use snmp_watch::cli::args::{CommonArgs, OutputArgs};
use snmp_watch::cli::hints::parse_oid;
use snmp_watch::cli::output::{OutputContext, write_error};
use std::process::ExitCode;
use std::time::Instant;

/// Walk an SNMP table and lay it out as a grid.
#[derive(Debug, Parser)]
#[command(name = "snmpwatch-table", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Table entry OID; the arc below it selects the column (e.g. ifEntry or 1.3.6.1.2.1.2.2.1).
    #[arg(value_name = "OID")]
    root: String,
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

    let root = match parse_oid(&args.root) {
        Ok(oid) => oid,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = match Engine::connect(
        target,
        &args.common.credentials(),
        args.common.engine_config(),
    )
    .await
    {
        Ok(engine) => engine,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let grid = match engine.table(&root).await {
        Ok(grid) => grid,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = OutputContext {
        format: args.output.format,
        show_hints: !args.output.no_hints,
        show_timing: args.output.timing,
    };
    if let Err(e) = ctx.write_table(target, &grid, Some(start.elapsed())) {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
