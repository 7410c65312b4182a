use std::io;

use anyhow::Context;
use clap::Parser;
use log::info;

use bounded_bitset::{Shell, ShellConfig};

/// Interactive menu over a fixed-capacity bitset.
#[derive(Debug, Parser)]
#[command(name = "bitset-shell", version, about)]
struct Args {
    /// Universe size; valid elements are 0..CAPACITY
    #[arg(long, env = "BITSET_CAPACITY", default_value_t = ShellConfig::default().capacity)]
    capacity: usize,

    /// Do not print the menu before each prompt
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cfg = ShellConfig {
        capacity: args.capacity,
        show_menu: !args.quiet,
    };
    info!("bitset-shell capacity={} menu={}", cfg.capacity, cfg.show_menu);

    let mut shell = Shell::new(cfg);
    shell
        .run(io::stdin().lock(), io::stdout().lock())
        .context("shell terminated on i/o failure")?;
    Ok(())
}
