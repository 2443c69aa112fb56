use anyhow::{Context, Result};
use clap::{arg, crate_version, value_parser, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use treapfarm::drill::Drill;
use treapfarm::{Farm, Session};

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("couldn't read from {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("couldn't read from stdin")?;
            Ok(input)
        }
    }
}

fn rng_from(params: &ArgMatches) -> StdRng {
    match params.get_one::<u64>("seed") {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    }
}

fn run_farm(params: &ArgMatches) -> Result<()> {
    let input = read_input(params.get_one::<PathBuf>("input"))?;
    let keep_going = params.get_flag("keep-going");
    let session = Session::parse(&input).context("malformed farm input")?;

    let mut builder = Farm::builder().plots(session.plots);
    if let Some(seed) = params.get_one::<u64>("seed") {
        builder = builder.seed(*seed);
    }
    let mut farm = builder.build();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut failures = 0usize;
    for (index, command) in session.commands.into_iter().enumerate() {
        match farm.execute(command) {
            Ok(Some(answer)) => writeln!(out, "{answer}")?,
            Ok(None) => {}
            Err(err) if keep_going => {
                failures += 1;
                log::warn!("command {} ({command:?}) failed: {err}", index + 1);
            }
            Err(err) => {
                out.flush()?;
                return Err(err).with_context(|| format!("command {} ({command:?})", index + 1));
            }
        }
    }
    out.flush()?;
    log::info!(
        "processed commands with {failures} failures, {} replacements still undoable",
        farm.pending_undos()
    );
    Ok(())
}

fn run_drill(params: &ArgMatches) -> Result<()> {
    let input = read_input(params.get_one::<PathBuf>("input"))?;
    let drill = Drill::parse(&input).context("malformed drill")?;
    let mut rng = rng_from(params);
    let lines = drill.run(&mut rng)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let env = env_logger::Env::new()
        .filter("TREAPFARM_LOG")
        .write_style("TREAPFARM_LOG_STYLE");
    env_logger::init_from_env(env);

    // Generate a CLI with one subcommand per input format
    let params = Command::new("treapfarm")
        .version(crate_version!())
        .about("Answer rank and recency queries over a farm of plots, backed by treaps")
        .subcommand_required(true)
        .subcommand(
            Command::new("farm")
                .about("Run a farm command stream: N Q, N categories, then Q commands of C i v | R i v | U k | S l r")
                .arg(arg!([input] "Input file; reads stdin when omitted").value_parser(value_parser!(PathBuf)))
                .arg(arg!(-s --seed <SEED> "Seed for treap priorities. Answers never depend on it, only tree shapes do").value_parser(value_parser!(u64)))
                .arg(arg!(-k --"keep-going" "Log failed commands (such as undoing more than was recorded) and continue instead of stopping")),
        )
        .subcommand(
            Command::new("drill")
                .about("Exercise a bare treap with a Basic, Merge or Split drill file")
                .arg(arg!(<input> "Drill file").value_parser(value_parser!(PathBuf)))
                .arg(arg!(-s --seed <SEED> "Seed for treap priorities").value_parser(value_parser!(u64))),
        )
        .get_matches();

    match params.subcommand() {
        Some(("farm", sub)) => run_farm(sub),
        Some(("drill", sub)) => run_drill(sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}
