use std::fs::File;
use std::io::{Read, Write, stdin, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use typejson::{Manager, NamingStrategy, Options};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NamingArg {
    Default,
    Lower,
    Upper,
    Camel,
    Snake,
}

impl From<NamingArg> for NamingStrategy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Default => NamingStrategy::Default,
            NamingArg::Lower => NamingStrategy::LowerCase,
            NamingArg::Upper => NamingStrategy::UpperCase,
            NamingArg::Camel => NamingStrategy::CamelCase,
            NamingArg::Snake => NamingStrategy::SnakeCase,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "typejson-cli",
    about = "Re-encode JSON through the typejson encoder",
    version
)]
struct Args {
    /// Drop `$type`/`$types`/`$i`/`$schema` extension members
    #[arg(long)]
    no_extensions: bool,

    /// Write full type names inline instead of a shared `$types` block
    #[arg(long)]
    inline_types: bool,

    /// Omit null members and map entries
    #[arg(long)]
    skip_nulls: bool,

    /// Omit empty collection members
    #[arg(long)]
    skip_empty: bool,

    /// Write date-times in local wall-clock form
    #[arg(long)]
    local_time: bool,

    /// Append milliseconds to date-times
    #[arg(long)]
    millis: bool,

    /// Write enum members by number
    #[arg(long)]
    enum_values: bool,

    /// Escape non-ASCII characters as \uXXXX
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    escape_unicode: bool,

    /// Naming strategy for member names and string map keys
    #[arg(long, value_enum, default_value_t = NamingArg::Default)]
    naming: NamingArg,

    /// Maximum object nesting depth
    #[arg(long, default_value_t = 20)]
    max_depth: usize,

    /// Input file (defaults to stdin)
    input: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            use_extensions: !self.no_extensions,
            using_global_types: !self.inline_types,
            serialize_null_values: !self.skip_nulls,
            serialize_empty_collections: !self.skip_empty,
            use_utc_date_time: !self.local_time,
            date_time_milliseconds: self.millis,
            use_values_of_enums: self.enum_values,
            use_escaped_unicode: self.escape_unicode,
            naming_strategy: self.naming.into(),
            serializer_max_depth: self.max_depth,
            ..Options::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut buf = String::new();
    match &args.input {
        Some(path) => {
            let mut f =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            f.read_to_string(&mut buf)?;
        }
        None => {
            stdin().read_to_string(&mut buf)?;
        }
    }

    let manager = Manager::global();
    let value = typejson::ser::bridge::from_json_str(&buf, manager).context("parsing input")?;
    let options = args.options();
    tracing::debug!(?options, "encoding");
    let out = manager.to_string(&value, &options)?;

    let mut stdout = stdout().lock();
    writeln!(stdout, "{out}")?;
    Ok(())
}
