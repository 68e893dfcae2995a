//! snmpwatch-get: Read SNMP objects with GET, or step through the MIB with GETNEXT.
//!
//! Part of the snmp-watch CLI utilities.

use clap::Parser;
use snmp_watch::cli::args::{CommonArgs, OutputArgs};
use snmp_watch::cli::hints::parse_oid;
use snmp_watch::cli::output::{OutputContext, write_error};
use snmp_watch::{DecodedVarBind, Engine, Oid, UdpEngine};
use std::process::ExitCode;
use std::time::Instant;

/// Retrieve SNMP object values.
#[derive(Debug, Parser)]
#[command(name = "snmpwatch-get", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Step with GETNEXT this many times, starting from the first OID.
    #[arg(short = 'n', long = "next", value_name = "COUNT")]
    next: Option<u32>,

    /// OIDs to retrieve (dotted notation or well-known names).
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

    let oids: Vec<Oid> = match args.oids.iter().map(|s| parse_oid(s)).collect() {
        Ok(oids) => oids,
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
    let result = match args.next {
        Some(count) => run_next(&engine, &oids[0], count).await,
        None => run_get(&engine, &oids).await,
    };
    let elapsed = start.elapsed();

    match result {
        Ok(rows) => {
            let ctx = OutputContext {
                format: args.output.format,
                show_hints: !args.output.no_hints,
                show_timing: args.output.timing,
            };
            if let Err(e) =
                ctx.write_rows(target, args.common.snmp_version.into(), &rows, Some(elapsed))
            {
                eprintln!("Error writing output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run_get(engine: &UdpEngine, oids: &[Oid]) -> snmp_watch::Result<Vec<DecodedVarBind>> {
    let mut rows = Vec::with_capacity(oids.len());
    for oid in oids {
        rows.extend(engine.poll(oid).await?);
    }
    Ok(rows)
}

async fn run_next(
    engine: &UdpEngine,
    start: &Oid,
    count: u32,
) -> snmp_watch::Result<Vec<DecodedVarBind>> {
    let mut rows = Vec::new();
    if count == 0 {
        return Ok(rows);
    }

    let (result, _) = engine.get_next(start).await?;
    rows.extend(engine.decode(&result)?);
    for _ in 1..count {
        let (result, _) = engine.step_next().await?;
        rows.extend(engine.decode(&result)?);
    }
    Ok(rows)
}
