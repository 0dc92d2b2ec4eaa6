use std::path;
use std::process;

use bytesize::ByteSize;
use clap::ArgEnum;
use env_logger;
use log;

use ext_line_sort::generate::generate_file;
use ext_line_sort::ExternalSorterBuilder;

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    init_logger(log_level);

    let input = path::PathBuf::from(arg_parser.value_of("input").expect("value is required"));
    let output = match arg_parser.value_of("output") {
        Some(output) => path::PathBuf::from(output),
        None => default_output(&input),
    };
    let tmp_dir: Option<&str> = arg_parser.value_of("tmp_dir");
    let fragment_size = arg_parser.value_of("fragment_size").expect("value has default");
    let read_chunk_size = arg_parser.value_of("read_chunk_size").expect("value has default");

    if arg_parser.is_present("generate") {
        let lines: usize = arg_parser.value_of_t_or_exit("generate");
        let max_line_length: usize = arg_parser.value_of_t_or_exit("max_line_length");
        if let Err(err) = generate_file(&input, lines, max_line_length, &mut rand::thread_rng()) {
            log::error!("input file generation error: {}", err);
            process::exit(1);
        }
    }

    let mut sorter_builder = ExternalSorterBuilder::new()
        .with_fragment_size(fragment_size.parse::<ByteSize>().expect("value is pre-validated").as_u64())
        .with_read_chunk_size(read_chunk_size.parse::<ByteSize>().expect("value is pre-validated").as_u64() as usize);

    if let Some(tmp_dir) = tmp_dir {
        sorter_builder = sorter_builder.with_tmp_dir(path::Path::new(tmp_dir));
    }

    let sorter = match sorter_builder.build() {
        Ok(sorter) => sorter,
        Err(err) => {
            log::error!("sorter initialization error: {}", err);
            process::exit(1);
        }
    };

    match sorter.sort(&input, &output) {
        Ok(summary) => log::info!(
            "{} lines sorted into {} ({} fragments)",
            summary.lines,
            output.canonicalize().unwrap_or_else(|_| output.clone()).display(),
            summary.fragments
        ),
        Err(err) => {
            log::error!("data sorting error: {}", err);
            process::exit(1);
        }
    }
}

/// Result file name used when none is given: `sorted_` prefixed input name next to the input.
fn default_output(input: &path::Path) -> path::PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    return input.with_file_name(format!("sorted_{}", file_name));
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

fn validate_size(value: &str) -> Result<(), String> {
    match value.parse::<ByteSize>() {
        Ok(size) if size.as_u64() > 0 => Ok(()),
        Ok(_) => Err("size must be positive".to_string()),
        Err(err) => Err(format!("size format incorrect: {}", err)),
    }
}

fn validate_positive(value: &str) -> Result<(), String> {
    match value.parse::<usize>() {
        Ok(number) if number > 0 => Ok(()),
        Ok(_) => Err("value must be positive".to_string()),
        Err(err) => Err(format!("invalid number: {}", err)),
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("ext-line-sort")
        .about("external sorter of text file lines")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("file to be sorted")
                .required(true)
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("result file [default: sorted_<input>]")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("fragment_size")
                .short('c')
                .long("fragment-size")
                .help("maximum fragment size, a fragment is sorted in memory")
                .takes_value(true)
                .default_value("100MiB")
                .validator(validate_size),
        )
        .arg(
            clap::Arg::new("read_chunk_size")
                .short('r')
                .long("read-chunk-size")
                .help("read window used to split fragments on line boundaries, must exceed the longest line")
                .takes_value(true)
                .default_value("8KiB")
                .validator(validate_size),
        )
        .arg(
            clap::Arg::new("tmp_dir")
                .short('d')
                .long("tmp-dir")
                .help("directory to be used to store temporary data")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("log_level")
                .short('l')
                .long("loglevel")
                .help("logging level")
                .takes_value(true)
                .default_value("info")
                .possible_values(LogLevel::possible_values()),
        )
        .arg(
            clap::Arg::new("generate")
                .short('g')
                .long("generate")
                .help("generate the input file with the given number of random lines before sorting")
                .takes_value(true)
                .requires("max_line_length")
                .validator(validate_positive),
        )
        .arg(
            clap::Arg::new("max_line_length")
                .short('m')
                .long("max-line-length")
                .help("maximum generated line length")
                .takes_value(true)
                .requires("generate")
                .validator(validate_positive),
        )
        .get_matches()
}

fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}
