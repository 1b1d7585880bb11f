//! Run configuration and the command-line flag scanner.

use crate::error::{BenchError, Result};
use crate::runtime::RuntimeConfig;
use crate::view::LayoutKind;

pub const DEFAULT_NUM_VECTORS: usize = 1000;
pub const DEFAULT_LENGTH: usize = 10000;
pub const DEFAULT_NREPEAT: usize = 10;

/// Problem size and repetition count for one benchmark run.
///
/// Always valid once constructed: every field is at least 1 and one
/// `num_vectors x len` array of `f64` is addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    num_vectors: usize,
    len: usize,
    nrepeat: usize,
}

impl RunConfig {
    pub fn new(num_vectors: usize, len: usize, nrepeat: usize) -> Result<Self> {
        if num_vectors == 0 {
            return Err(BenchError::InvalidConfig(
                "num_vectors must be at least 1".to_string(),
            ));
        }
        // An empty reduction has a zero closed-form result, which the
        // relative-error check cannot divide by.
        if len == 0 {
            return Err(BenchError::InvalidConfig(
                "length must be at least 1".to_string(),
            ));
        }
        if nrepeat == 0 {
            return Err(BenchError::InvalidConfig(
                "nrepeat must be at least 1".to_string(),
            ));
        }
        let addressable = num_vectors
            .checked_mul(len)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f64>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !addressable {
            return Err(BenchError::InvalidConfig(format!(
                "{} vectors of length {} do not fit in memory",
                num_vectors, len
            )));
        }
        Ok(Self {
            num_vectors,
            len,
            nrepeat,
        })
    }

    pub fn num_vectors(&self) -> usize {
        self.num_vectors
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn nrepeat(&self) -> usize {
        self.nrepeat
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_vectors: DEFAULT_NUM_VECTORS,
            len: DEFAULT_LENGTH,
            nrepeat: DEFAULT_NREPEAT,
        }
    }
}

/// Everything the command line selects.
#[derive(Clone, Debug)]
pub struct CliArgs {
    pub run: RunConfig,
    pub layout: LayoutKind,
    pub runtime: RuntimeConfig,
}

/// What the binary should do.
#[derive(Clone, Debug)]
pub enum Command {
    Run(CliArgs),
    Help,
}

impl CliArgs {
    /// Scan flags (without the program name).
    ///
    /// `-help` wins over everything else and stops the scan.
    pub fn parse<I, S>(args: I) -> Result<Command>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut num_vectors = DEFAULT_NUM_VECTORS;
        let mut len = DEFAULT_LENGTH;
        let mut nrepeat = DEFAULT_NREPEAT;
        let mut layout = LayoutKind::default();
        let mut runtime = RuntimeConfig::default();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let flag = arg.as_ref();
            match flag {
                "-num_vectors" | "-v" => num_vectors = count_value(flag, args.next())?,
                "-length" | "-l" => len = count_value(flag, args.next())?,
                "-nrepeat" => nrepeat = count_value(flag, args.next())?,
                "-layout" => layout = required(flag, args.next())?.parse()?,
                "-threads" => runtime.num_threads = count_value(flag, args.next())?,
                "-bind" => runtime.bind = true,
                "-help" | "-h" => return Ok(Command::Help),
                other => {
                    return Err(BenchError::Cli(format!("unknown option '{}'", other)));
                }
            }
        }

        Ok(Command::Run(CliArgs {
            run: RunConfig::new(num_vectors, len, nrepeat)?,
            layout,
            runtime,
        }))
    }
}

fn required<S: AsRef<str>>(flag: &str, value: Option<S>) -> Result<String> {
    value
        .map(|v| v.as_ref().to_string())
        .ok_or_else(|| BenchError::Cli(format!("option '{}' needs a value", flag)))
}

fn count_value<S: AsRef<str>>(flag: &str, value: Option<S>) -> Result<usize> {
    let raw = required(flag, value)?;
    let n: i64 = raw.trim().parse().map_err(|_| {
        BenchError::Cli(format!("option '{}' expects an integer, got '{}'", flag, raw))
    })?;
    usize::try_from(n)
        .map_err(|_| BenchError::Cli(format!("option '{}' must not be negative, got {}", flag, n)))
}

/// Usage text printed for `-help`.
pub fn usage() -> String {
    format!(
        "ArrayOfDotProducts Options:\n\
         \x20 -num_vectors (-v)  <int>: number of vectors (default: {})\n\
         \x20 -length (-l) <int>:       vector length (default: {})\n\
         \x20 -nrepeat <int>:           number of repetitions (default: {})\n\
         \x20 -layout <right|left>:     2D storage layout (default: {})\n\
         \x20 -threads <int>:           worker threads, 0 = all cores (default: 0)\n\
         \x20 -bind:                    bind worker threads to cores\n\
         \x20 -help (-h):               print this message\n",
        DEFAULT_NUM_VECTORS,
        DEFAULT_LENGTH,
        DEFAULT_NREPEAT,
        LayoutKind::default(),
    )
}
