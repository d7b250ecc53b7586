use sieve_plot::open_viewer;
use sieve_plot::plot::parse_cli;
use sieve_plot::Measurements;

fn main() {
    let (csvin, pngout) = parse_cli();
    println!(
        "read data from {} and plot to {}",
        csvin.to_str().unwrap(),
        pngout.to_str().unwrap()
    );
    let measurements = match Measurements::from_csv(csvin) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = measurements.plot_png(pngout.clone()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    open_viewer(&pngout);
}
