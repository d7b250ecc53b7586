use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::fs::File;
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;
pub mod plot;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

pub const PLOT_TITLE: &str = "Execution Time of Multithreaded Sieve of Eratosthenes";
pub const PLOT_XLABEL: &str = "Prime Limit";
pub const PLOT_YLABEL: &str = "Time (seconds)";

pub const COL_LIMIT: &str = "limit";
pub const COL_TIME: &str = "time_seconds";

/// Errors raised while loading the experiment csv,
/// none of them is recovered: no plot is drawn from bad data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: could not parse {column} value '{value}'")]
    BadValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("could not read csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to load measurements: {0}")]
    DataLoad(#[from] DataLoadError),
    #[error("failed to render plot: {0}")]
    Render(String),
}

/// The main struct for the sieve timing measurements
#[derive(Debug, Clone)]
pub struct Measurements {
    pub limit: Vec<u64>,
    pub time_seconds: Vec<f64>,
}

impl Measurements {
    pub fn new(capacity: usize) -> Measurements {
        let limit: Vec<u64> = Vec::with_capacity(capacity);
        let time_seconds: Vec<f64> = Vec::with_capacity(capacity);
        let measurements: Measurements = Measurements {
            limit,
            time_seconds,
        };
        measurements
    }

    /// Init a Measurements from csv, keeping the rows in file order.
    /// The header must name the limit and time_seconds columns,
    /// any extra columns are ignored.
    /// A value that does not parse stops the loading,
    /// a header-only file gives an empty Measurements.
    pub fn from_csv(fin: PathBuf) -> Result<Measurements, DataLoadError> {
        let file = File::open(&fin).map_err(|e| DataLoadError::Open {
            path: fin.clone(),
            source: e,
        })?;
        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers()?.clone();
        let ilimit = headers
            .iter()
            .position(|h| h == COL_LIMIT)
            .ok_or(DataLoadError::MissingColumn("limit"))?;
        let itime = headers
            .iter()
            .position(|h| h == COL_TIME)
            .ok_or(DataLoadError::MissingColumn("time_seconds"))?;
        let mut measurements = Measurements::new(100 as usize);
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // the header is row 1
            let row = i + 2;
            let raw_limit = record.get(ilimit).unwrap_or("");
            let limit: u64 = raw_limit.parse().map_err(|_| DataLoadError::BadValue {
                row,
                column: "limit",
                value: raw_limit.to_string(),
            })?;
            let raw_time = record.get(itime).unwrap_or("");
            let time_seconds: f64 = raw_time.parse().map_err(|_| DataLoadError::BadValue {
                row,
                column: "time_seconds",
                value: raw_time.to_string(),
            })?;
            measurements.limit.push(limit);
            measurements.time_seconds.push(time_seconds);
        }
        Ok(measurements)
    }

    /// one x tick per measured limit, in dataset order
    pub fn x_ticks(&self) -> Vec<f64> {
        self.limit.iter().map(|&l| l as f64).collect()
    }

    /// plots time against limit and saves the chart as png
    pub fn plot_png(self, fout: PathBuf) -> Result<(), ReportError> {
        self.draw(&fout)
            .map_err(|e| ReportError::Render(e.to_string()))
    }

    fn draw(&self, fout: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        let xticks = self.x_ticks();
        let (xmin, xmax, ymin, ymax) = if xticks.is_empty() {
            (0., 1., 0., 1.)
        } else {
            let (xmin, xmax) = min_and_max(&xticks[..]);
            let xmargin = (xmax - xmin) / 20.;
            let (ymin, ymax) = min_and_max(&self.time_seconds[..]);
            let ymargin = (ymax - ymin) / 10.;
            (
                xmin - xmargin,
                xmax + xmargin,
                ymin - ymargin,
                ymax + ymargin,
            )
        };
        // a flat range is not drawable, widen it to a unit span
        let (xmin, xmax) = if xmin == xmax {
            (xmin - 1., xmax + 1.)
        } else {
            (xmin, xmax)
        };
        let (ymin, ymax) = if ymin == ymax {
            (ymin - 1., ymax + 1.)
        } else {
            (ymin, ymax)
        };
        let root = BitMapBackend::new(&fout, (800, 500)).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(PLOT_TITLE, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(80)
            .build_cartesian_2d(LimitAxis::new(xticks, xmin..xmax), ymin..ymax)?;
        chart
            .configure_mesh()
            .light_line_style(&RGBColor(220, 220, 220))
            .bold_line_style(RGBColor(150, 150, 150).stroke_width(1))
            .set_all_tick_mark_size(2)
            .label_style(("sans-serif", 16))
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc(PLOT_YLABEL)
            .x_desc(PLOT_XLABEL)
            .draw()?;

        let line = LineSeries::new(
            self.limit
                .iter()
                .zip(self.time_seconds.iter())
                .map(|(&x, &y)| (x as f64, y)),
            BLUE.stroke_width(2),
        );
        chart.draw_series(line)?;
        let points = self
            .limit
            .iter()
            .zip(self.time_seconds.iter())
            .map(|(&x, &y)| Circle::new((x as f64, y), 4, BLUE.filled()));
        chart.draw_series(points)?;
        root.present()?;
        Ok(())
    }
}

impl std::fmt::Display for Measurements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "limit, time [s]\n")?;
        for (l, t) in self.limit.iter().zip(self.time_seconds.iter()) {
            write!(f, "{},{}\n", l, t)?
        }
        Ok(())
    }
}

/// An x axis that places one tick per measured limit, in dataset order,
/// instead of the evenly spaced ticks of a plain f64 range.
#[derive(Clone)]
pub struct LimitAxis {
    ticks: Vec<f64>,
    span: RangedCoordf64,
}

impl LimitAxis {
    pub fn new(ticks: Vec<f64>, span: Range<f64>) -> LimitAxis {
        LimitAxis {
            ticks,
            span: span.into(),
        }
    }
}

impl Ranged for LimitAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.span.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.span.range()
    }
}

impl ValueFormatter<f64> for LimitAxis {
    fn format(value: &f64) -> String {
        format!("{:.0}", value)
    }
}

/// opens the saved image with the default system viewer,
/// reports and moves on when no viewer can be run (e.g. headless)
pub fn open_viewer(fimg: &PathBuf) {
    let status = if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg(fimg).status()
    } else if cfg!(target_os = "windows") {
        std::process::Command::new("cmd")
            .args(&["/C", "start", ""])
            .arg(fimg)
            .status()
    } else {
        std::process::Command::new("xdg-open").arg(fimg).status()
    };
    match status {
        Ok(s) if s.success() => (),
        Ok(s) => println!("image viewer exited with status {}", s),
        Err(e) => println!("could not open image viewer: {}", e),
    }
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> (T, T) {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => panic!("could not iterate over slice"),
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    return (min, max);
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

    fn tmp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("sieve_plot_{}_{}", std::process::id(), name));
        path
    }

    fn write_tmp(name: &str, content: &str) -> PathBuf {
        let path = tmp_path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_rows_in_file_order() {
        let fin = write_tmp(
            "order.csv",
            "limit,time_seconds\n1000,0.95\n10,0.01\n100,0.08\n",
        );
        let m = Measurements::from_csv(fin).unwrap();
        assert_eq!(m.limit, vec![1000, 10, 100]);
        assert_eq!(m.time_seconds, vec![0.95, 0.01, 0.08]);
    }

    #[test]
    fn columns_found_by_name_not_position() {
        let fin = write_tmp("swapped.csv", "time_seconds,run,limit\n0.5,1,10\n0.9,2,20\n");
        let m = Measurements::from_csv(fin).unwrap();
        assert_eq!(m.limit, vec![10, 20]);
        assert_eq!(m.time_seconds, vec![0.5, 0.9]);
    }

    #[test]
    fn missing_time_column_fails() {
        let fin = write_tmp("nocol.csv", "limit,duration\n10,0.5\n");
        let err = Measurements::from_csv(fin).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("time_seconds")));
    }

    #[test]
    fn non_numeric_time_fails() {
        let fin = write_tmp("badval.csv", "limit,time_seconds\n10,0.5\n100,fast\n");
        let err = Measurements::from_csv(fin).unwrap_err();
        match err {
            DataLoadError::BadValue { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "time_seconds");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn missing_file_fails() {
        let err = Measurements::from_csv(tmp_path("absent.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Open { .. }));
    }

    #[test]
    fn header_only_still_renders() {
        let fin = write_tmp("empty.csv", "limit,time_seconds\n");
        let fout = tmp_path("empty.png");
        let m = Measurements::from_csv(fin).unwrap();
        assert!(m.limit.is_empty());
        m.plot_png(fout.clone()).unwrap();
        let bytes = std::fs::read(&fout).unwrap();
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn three_rows_end_to_end() {
        let fin = write_tmp(
            "e2e.csv",
            "limit,time_seconds\n10,0.01\n100,0.08\n1000,0.95\n",
        );
        let fout = tmp_path("e2e.png");
        for _ in 0..2 {
            let m = Measurements::from_csv(fin.clone()).unwrap();
            assert_eq!(m.limit, vec![10, 100, 1000]);
            m.plot_png(fout.clone()).unwrap();
            let bytes = std::fs::read(&fout).unwrap();
            assert_eq!(&bytes[..4], &PNG_MAGIC);
            assert!(bytes.len() > PNG_MAGIC.len());
        }
    }

    #[test]
    fn single_row_still_renders() {
        let fin = write_tmp("single.csv", "limit,time_seconds\n10,0.01\n");
        let fout = tmp_path("single.png");
        let m = Measurements::from_csv(fin).unwrap();
        m.plot_png(fout.clone()).unwrap();
        let bytes = std::fs::read(&fout).unwrap();
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn x_ticks_are_the_limits_in_file_order() {
        let fin = write_tmp(
            "ticks.csv",
            "limit,time_seconds\n1000,0.95\n10,0.01\n100,0.08\n",
        );
        let m = Measurements::from_csv(fin).unwrap();
        let ticks = m.x_ticks();
        assert_eq!(ticks, vec![1000., 10., 100.]);
        // the axis reports exactly those ticks, whatever the hint asks for
        let axis = LimitAxis::new(ticks.clone(), 0.0..1100.0);
        assert_eq!(axis.key_points(3usize), ticks);
        assert_eq!(axis.key_points(50usize), ticks);
    }

    #[test]
    fn x_tick_labels_are_plain_integers() {
        assert_eq!(LimitAxis::format(&1000.), "1000");
        assert_eq!(LimitAxis::format(&10.), "10");
    }

    #[test]
    fn min_and_max_of_unsorted_slice() {
        let (min, max) = min_and_max(&[3., 1., 2.][..]);
        assert_eq!(min, 1.);
        assert_eq!(max, 3.);
        let (min, max) = min_and_max(&[7u64][..]);
        assert_eq!(min, 7);
        assert_eq!(max, 7);
    }
}
