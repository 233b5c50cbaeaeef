// Mon Oct 19 2026 - Alex

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;
use remote_scanner::{
    config::Config,
    memory::{maps, Address, MemOp},
    utils::{self, logging, LoggingUtils},
    MemoryManager, Pattern,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Pattern and ELF symbol scanner for live processes", long_about = None)]
struct Cli {
    /// Memory backend used to reach the target
    #[arg(long, value_enum, global = true)]
    mem_op: Option<MemOp>,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Page size used for ELF load-range alignment
    #[arg(long, global = true)]
    page_size: Option<u64>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List memory maps of a process
    Maps {
        pid: i32,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Search a memory range for a pattern
    Scan(ScanArgs),
    /// List or resolve dynamic symbols of a loaded library
    Symbols {
        pid: i32,
        #[arg(long)]
        lib: String,
        #[arg(long)]
        find: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Dump a memory range to a file
    Dump {
        pid: i32,
        #[arg(long, value_parser = parse_address)]
        start: Address,
        #[arg(long, value_parser = parse_address)]
        end: Address,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Dump the loaded image of a library to a file
    DumpElf {
        pid: i32,
        #[arg(long)]
        lib: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Rebuild a mapped file from its readable mappings
    DumpFile {
        pid: i32,
        #[arg(long)]
        lib: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Print a hexdump of remote memory
    Hexdump {
        pid: i32,
        #[arg(long, value_parser = parse_address)]
        addr: Address,
        #[arg(long, default_value_t = 256)]
        len: usize,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("pattern").required(true).args(["hex", "signature", "data"])))]
struct ScanArgs {
    pid: i32,
    #[arg(long, value_parser = parse_address)]
    start: Address,
    #[arg(long, value_parser = parse_address)]
    end: Address,
    /// Hex bytes, used with --mask
    #[arg(long, requires = "mask")]
    hex: Option<String>,
    /// Mask for --hex: 'x' must match, anything else is a wildcard
    #[arg(long)]
    mask: Option<String>,
    /// IDA-style signature, e.g. "48 8B ?? ?? 89"
    #[arg(long)]
    signature: Option<String>,
    /// Literal text to search for
    #[arg(long)]
    data: Option<String>,
    /// Stop at the first match
    #[arg(long)]
    first: bool,
}

fn parse_address(text: &str) -> Result<Address, String> {
    Address::parse(text).ok_or_else(|| format!("invalid address: {}", text))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(op) = cli.mem_op {
        config.mem_op = op;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = Some(page_size);
    }
    config.validate()?;
    Ok(config)
}

fn attach(pid: i32, config: &Config) -> Result<MemoryManager> {
    MemoryManager::initialize(pid, config).with_context(|| format!("attaching to pid {}", pid))
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let base_level = LoggingUtils::level_from_str(&config.log_level);
    logging::init(LoggingUtils::level_from_verbosity(base_level, cli.verbose));

    match cli.command {
        Command::Maps { pid, filter } => {
            let all = maps::all_maps(pid).with_context(|| format!("reading maps of pid {}", pid))?;
            let shown: Vec<_> = all
                .iter()
                .filter(|m| filter.as_deref().map_or(true, |f| m.pathname.contains(f)))
                .collect();
            for map in &shown {
                println!("{}", map);
            }
            println!("{} {} of {} maps", "[+]".green(), shown.len(), all.len());
        }

        Command::Scan(args) => scan(&args, &config)?,

        Command::Symbols { pid, lib, find, json } => {
            let mgr = attach(pid, &config)?;
            let Some(base_map) = mgr.elf_base_map(&lib)? else {
                bail!("no ELF mapping ending with {} in pid {}", lib, pid);
            };
            let elf = &base_map.elf;
            if !base_map.is_valid() {
                eprintln!("{} ELF at {} is not fully resolvable", "[!]".yellow(), elf.base());
            }

            if let Some(name) = find {
                match elf.find_symbol(&name) {
                    Some(addr) => println!("{} {} = {}", "[+]".green(), name, addr),
                    None => bail!("symbol {} not found in {}", name, lib),
                }
            } else if json {
                println!("{}", serde_json::to_string_pretty(elf.symbols().as_slice())?);
            } else {
                println!(
                    "{} {} base={} bias={:#x} size={:#x}",
                    "[*]".blue(),
                    base_map.map.pathname,
                    elf.base(),
                    elf.load_bias(),
                    elf.load_size()
                );
                for symbol in elf.symbols().iter() {
                    println!("{:>18} {}", symbol.address.to_string().cyan(), symbol.name);
                }
                println!("{} {} symbols", "[+]".green(), elf.symbols().len());
            }
        }

        Command::Dump { pid, start, end, out } => {
            let mgr = attach(pid, &config)?;
            mgr.dump_mem_range(start, end, &out)?;
            println!("{} Dumped [{}, {}) to {}", "[+]".green(), start, end, out.display());
        }

        Command::DumpElf { pid, lib, out } => {
            let mgr = attach(pid, &config)?;
            let Some(base_map) = mgr.elf_base_map(&lib)? else {
                bail!("no ELF mapping ending with {} in pid {}", lib, pid);
            };
            mgr.dump_mem_elf(base_map.map.start, &out)?;
            println!("{} Dumped {} to {}", "[+]".green(), base_map.map.pathname, out.display());
        }

        Command::DumpFile { pid, lib, out } => {
            let mgr = attach(pid, &config)?;
            mgr.dump_mem_file(&lib, &out)?;
            println!("{} Dumped {} to {}", "[+]".green(), lib, out.display());
        }

        Command::Hexdump { pid, addr, len } => {
            let mgr = attach(pid, &config)?;
            let mut buffer = vec![0u8; len];
            let read = mgr.read_mem(addr, &mut buffer);
            if read < len {
                eprintln!("{} Read {} of {} bytes at {}", "[!]".yellow(), read, len, addr);
            }
            println!("{} {} ({} bytes)", "[*]".blue(), addr, read);
            println!("{}", utils::hex_dump(&buffer[..read], config.hexdump_row_size, config.hexdump_ascii));
        }
    }

    Ok(())
}

fn scan(args: &ScanArgs, config: &Config) -> Result<()> {
    let pattern = if let Some(sig) = &args.signature {
        Pattern::from_signature(sig)?
    } else if let Some(hex) = &args.hex {
        Pattern::from_hex(hex, args.mask.as_deref().unwrap_or_default())?
    } else if let Some(data) = &args.data {
        Pattern::from_data(data.as_bytes())?
    } else {
        bail!("no pattern given");
    };

    let mgr = attach(args.pid, config)?;
    let scanner = mgr.scanner();
    println!("{} Scanning [{}, {}) for {}", "[*]".blue(), args.start, args.end, pattern);

    let found: Vec<Address> = if args.first {
        scanner.find_pattern_first(args.start, args.end, &pattern).into_iter().collect()
    } else {
        scanner.find_pattern_all(args.start, args.end, &pattern)
    };

    for addr in &found {
        println!("{} {}", "[+]".green(), addr);
    }
    if found.is_empty() {
        println!("{} No matches", "[!]".yellow());
    }
    Ok(())
}
