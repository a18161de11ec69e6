#[macro_use]
extern crate clap;

use std::path::PathBuf;
use std::time::Instant;

use clap::App;
use dialoguer::console::style;
use num_format::{Locale, ToFormattedString};

use txn_telemetry_preprocess::cli;
use txn_telemetry_preprocess::config::Config;
use txn_telemetry_preprocess::preprocessing::{JoinOutcome, Preprocessor, ServerSummary};

#[derive(Debug)]
pub struct Opts {
    pub config: Config,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    quiet: bool,
}

fn parse_opts() -> Result<Opts, Box<dyn std::error::Error>> {
    let yml = load_yaml!("cli_args.yaml");
    let m = App::from_yaml(yml).get_matches();

    let quiet = m.is_present("quiet");

    let config_path = cli::parse_input_file(m.value_of("config"), "config")?;
    cli::print_output(format!("config path: {}\n", config_path.display()), quiet);

    Ok(Opts {
        config: Config::load(&config_path)?,
        input_dir: cli::parse_input_dir(m.value_of("input_dir"), "input_dir")?,
        output_dir: cli::parse_output_dir(m.value_of("output_dir"), "output_dir")?,
        quiet,
    })
}

fn fmt_count(n: usize) -> String {
    n.to_formatted_string(&Locale::en)
}

fn print_summary(summaries: &[ServerSummary], quiet: bool) {
    for s in summaries {
        cli::print_output(format!("\n   Server {}:\n", s.server_id), quiet);
        cli::print_output(format!("   Latency records:  {}\n", fmt_count(s.latency_rows)), quiet);
        cli::print_output(format!("   Without features: {}\n", fmt_count(s.count(JoinOutcome::NoFeatures))), quiet);
        cli::print_output(format!("   Not master:       {}\n", fmt_count(s.count(JoinOutcome::NotMaster))), quiet);
        cli::print_output(format!("   During warmup:    {}\n", fmt_count(s.count(JoinOutcome::Warmup))), quiet);
        cli::print_output(format!("   Written:          {} -> {}, {}\n",
                                  fmt_count(s.count(JoinOutcome::Retained)),
                                  s.features_path.display(), s.labels_path.display()), quiet);
    }
}

fn main() {
    env_logger::init();

    let opts = parse_opts().unwrap_or_else(|e| cli::exit_with_error(e));

    cli::print_output(format!("{}\n", style("=======================\n[TELEMETRY] Preprocessor\n=======================").bold()), opts.quiet);

    let start = Instant::now();
    let summaries = Preprocessor::new(&opts.config, opts.quiet)
        .preprocess(&opts.input_dir, &opts.output_dir)
        .unwrap_or_else(|e| cli::exit_with_error(Box::new(e)));

    print_summary(&summaries, opts.quiet);

    cli::print_output(format!("\n        {}Finished in {:.1?}\n", cli::SPARKLE, start.elapsed()), opts.quiet);
}
