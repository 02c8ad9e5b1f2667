use clap::Parser;
use clocktree::clock_tree::{ClockId, ClockTree};
use clocktree::hardware::SocFamily;
use clocktree::logging::setup_logger;
use clocktree::simulation::SimulatedHardware;
use clocktree::{read_json_board, ClockPlatform, ClockResult};
use colored::Colorize;
use itertools::Itertools;
use std::process::ExitCode;

/// Builds a board's clock tree against simulated hardware and prints it.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON board description
    board: String,

    /// SoC family to initialize for (u8500 or u5500)
    #[arg(long, value_parser = parse_soc)]
    soc: Option<SocFamily>,

    /// Clocks to enable before printing, may be repeated
    #[arg(long = "enable")]
    enable: Vec<String>,
}

fn parse_soc(soc: &str) -> Result<SocFamily, String> {
    match soc {
        "u8500" => Ok(SocFamily::U8500),
        "u5500" => Ok(SocFamily::U5500),
        _ => Err(format!("unknown SoC family '{soc}'")),
    }
}

fn main() -> ExitCode {
    if let Err(err) = setup_logger() {
        eprintln!("Could not set up logging: {err}");
    }
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", format!("error: {err}").red());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> ClockResult<()> {
    let board = read_json_board(&args.board)?;
    let simulated = SimulatedHardware::new();
    let platform = ClockPlatform::new(board, simulated.hardware());
    let clocks = platform.init(&args.soc)?;

    for name in &args.enable {
        let clock = clocks
            .tree
            .find(name)
            .ok_or_else(|| clocktree::ClockError::invalid(format!("no clock named {name}")))?;
        clocks.tree.enable(clock)?;
    }

    let roots = clocks
        .tree
        .iter()
        .filter(|(_, node)| node.parent().is_none())
        .map(|(id, _)| id)
        .sorted_by_key(|id| clocks.tree.node(*id).map(|node| node.name.clone()))
        .collect::<Vec<_>>();
    for root in roots {
        print_clock(&clocks.tree, root, 0);
    }
    Ok(())
}

fn print_clock(tree: &ClockTree, clock: ClockId, depth: usize) {
    let Some(node) = tree.node(clock) else {
        return;
    };
    let line = format!(
        "{:indent$}{} [{}] {} Hz",
        "",
        node.name,
        node.enable_count(),
        tree.get_rate(clock),
        indent = depth * 2
    );
    if node.is_enabled() {
        println!("{}", line.green());
    } else {
        println!("{line}");
    }

    let children = tree
        .iter()
        .filter(|(_, child)| child.parent() == Some(clock))
        .sorted_by(|(_, a), (_, b)| a.name.cmp(&b.name))
        .map(|(id, _)| id)
        .collect::<Vec<_>>();
    for child in children {
        print_clock(tree, child, depth + 1);
    }
}
