// src/main.rs

// watson
// Inspect, decode and produce Watson text from the command line.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use watson::{Config, Lexer, Mode, Value};

#[derive(ClapParser, Debug)]
#[command(name = "watson", version, about = "Watson stack-machine serialization", long_about = None)]
struct Cli {
    /// Stack capacity used when decoding (non-positive means the default).
    #[arg(long, global = true, default_value_t = watson::DEFAULT_STACK_CAPACITY as isize, allow_negative_numbers = true)]
    stack_capacity: isize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode Watson text and print the value.
    Decode {
        /// Input file. Reads stdin if not provided.
        file: Option<PathBuf>,
    },
    /// Print the opcodes recognized in the input, one per line.
    Ops {
        file: Option<PathBuf>,
    },
    /// Decode the input and write it back out.
    Pretty {
        file: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Encode a single scalar value.
    Encode {
        #[command(flatten)]
        value: ScalarArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Prettifier mode: plain or pretty.
    #[arg(long, default_value_t = Mode::Pretty)]
    mode: Mode,
    /// Tokens per output line (0 for a single line).
    #[arg(long, default_value_t = 0)]
    width: usize,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ScalarArgs {
    #[arg(long, allow_negative_numbers = true)]
    int: Option<i64>,
    #[arg(long)]
    uint: Option<u64>,
    #[arg(long, allow_negative_numbers = true)]
    float: Option<f64>,
    #[arg(long)]
    str: Option<String>,
    #[arg(long)]
    bool: Option<bool>,
    #[arg(long)]
    nil: bool,
}

impl ScalarArgs {
    fn into_value(self) -> Result<Value> {
        let value = if let Some(n) = self.int {
            Value::Int(n)
        } else if let Some(n) = self.uint {
            Value::Uint(n)
        } else if let Some(x) = self.float {
            Value::Float(x)
        } else if let Some(s) = self.str {
            Value::from(s)
        } else if let Some(b) = self.bool {
            Value::Bool(b)
        } else if self.nil {
            Value::Nil
        } else {
            bail!("no value given");
        };
        Ok(value)
    }
}

fn open_input(file: Option<PathBuf>) -> Result<Box<dyn Read>> {
    match file {
        Some(path) => {
            let f = File::open(&path)
                .with_context(|| format!("Failed to read file '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(f)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn write_value(value: &Value, output: &OutputArgs) -> Result<()> {
    let config = Config::new().mode(output.mode).line_width(output.width);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    watson::encode_with(&mut out, value, &config)?;
    writeln!(out)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::new().stack_capacity(cli.stack_capacity);
    match cli.command {
        Command::Decode { file } => {
            let value = watson::decode_with(open_input(file)?, &config)?;
            println!("{}", value);
        }
        Command::Ops { file } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for op in Lexer::new(open_input(file)?) {
                writeln!(out, "{}", op?)?;
            }
        }
        Command::Pretty { file, output } => {
            let value = watson::decode_with(open_input(file)?, &config)?;
            write_value(&value, &output)?;
        }
        Command::Encode { value, output } => {
            write_value(&value.into_value()?, &output)?;
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into()))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
