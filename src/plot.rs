use super::VERSION;
use clap::{App, Arg};
use std::path::PathBuf;

/// Takes the CLI arguments that control the plotting of the sieve timings.
/// The defaults reproduce the experiment file names, so a bare invocation
/// reads experiment_results.csv and writes sieve_experiment_plot.png.
pub fn parse_cli() -> (PathBuf, PathBuf) {
    let arg_csvin = Arg::with_name("input_csvfile")
        .help("name for the csv file with the timing measurements")
        .short("f")
        .long("csvfile")
        .takes_value(true)
        .default_value("experiment_results.csv");
    let arg_pngout = Arg::with_name("output_pngfile")
        .help("name of the output png file")
        .short("o")
        .long("pngfile")
        .takes_value(true)
        .default_value("sieve_experiment_plot.png");
    let cli_args = App::new("Sieve_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the sieve execution times")
        .arg(arg_csvin)
        .arg(arg_pngout)
        .get_matches();
    let csvin = PathBuf::from(cli_args.value_of("input_csvfile").unwrap_or_default());
    let pngout = PathBuf::from(cli_args.value_of("output_pngfile").unwrap_or_default());
    return (csvin, pngout);
}
