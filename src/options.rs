use std::path::PathBuf;

use chrono::NaiveDate;
use concretelab::{CementType, FailureMode, Proportions, TestAge};
use structopt::StructOpt;

/// Date format accepted on the command line and written to records.
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "concretelab",
    about = "Concrete cylinder, aggregate gradation and mortar cube calculations"
)]
pub struct Options {
    /// JSON file pointing at custom reference tables
    #[structopt(long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Evaluate a concrete cylinder compression test
    Cylinder(CylinderArgs),
    /// Run a sieve analysis against a gradation envelope
    Gradation(GradationArgs),
    /// Summarise a series of 50 mm mortar cubes
    Cubes(CubesArgs),
    /// List the gradation classes of the reference table
    Classes,
}

#[derive(StructOpt, Debug)]
pub struct CylinderArgs {
    /// Sample name
    pub name: String,

    /// Declared proportions: 100x200, 150x300 or other
    #[structopt(long, default_value = "150x300")]
    pub dimensions: Proportions,

    /// Measured diameter in mm (defaults to the nominal one)
    #[structopt(long)]
    pub diameter: Option<f64>,

    /// Measured height in mm (defaults to the nominal one)
    #[structopt(long)]
    pub height: Option<f64>,

    /// Mass in kg, 0 when not weighed
    #[structopt(long, default_value = "0")]
    pub mass: f64,

    /// Maximum load in kN
    #[structopt(long)]
    pub load: f64,

    /// Design strength f'c in MPa
    #[structopt(long, default_value = "0")]
    pub design_strength: f64,

    /// Age at testing in days: 1, 3, 7, 28 or 90
    #[structopt(long, default_value = "7", parse(try_from_str = parse_age))]
    pub age: TestAge,

    /// Fracture type, 1 to 6
    #[structopt(long, default_value = "1")]
    pub failure: FailureMode,

    /// Test date as dd/mm/yyyy (defaults to today)
    #[structopt(long, parse(try_from_str = parse_date))]
    pub date: Option<NaiveDate>,

    /// CSV file the result is appended to
    #[structopt(long, parse(from_os_str))]
    pub record: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct GradationArgs {
    /// Aggregate class, as listed by `classes`
    pub class: String,

    /// Sample mass in g
    #[structopt(long)]
    pub total_mass: f64,

    /// Mass retained on each sieve in g, largest opening first
    #[structopt(required = true)]
    pub retained: Vec<f64>,

    /// PNG file for the gradation chart (needs the `chart` feature)
    #[structopt(long, parse(from_os_str))]
    pub chart: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct CubesArgs {
    /// Maximum load of each cube in kN
    #[structopt(required = true)]
    pub loads: Vec<f64>,

    /// Mass of each cube in g, in the same order as the loads
    #[structopt(long = "mass")]
    pub masses: Vec<f64>,

    /// 1-based position of a cube to leave out of the summary
    #[structopt(long)]
    pub invalid: Vec<usize>,

    /// Cement lot or batch identifier
    #[structopt(long, default_value = "")]
    pub lot: String,

    /// Cement type: ordinary, compound, slag or other
    #[structopt(long, default_value = "ordinary")]
    pub cement: CementType,

    /// Age at testing in days: 1, 3, 7, 28 or 90
    #[structopt(long, default_value = "28", parse(try_from_str = parse_age))]
    pub age: TestAge,

    /// Write the cube table to this CSV file
    #[structopt(long, parse(from_os_str))]
    pub output: Option<PathBuf>,
}

fn parse_age(s: &str) -> Result<TestAge, String> {
    let days: u16 = s
        .trim()
        .parse()
        .map_err(|_| format!("age must be a number of days, got `{s}`"))?;
    TestAge::from_days(days).ok_or_else(|| format!("no standard test age of {days} days"))
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylinder_arguments_parse() {
        let options = Options::from_iter_safe([
            "concretelab",
            "cylinder",
            "M-1",
            "--dimensions",
            "other",
            "--diameter",
            "100",
            "--height",
            "150",
            "--load",
            "200",
            "--age",
            "28",
            "--failure",
            "3",
            "--date",
            "04/03/2026",
        ])
        .expect("valid arguments");
        match options.command {
            Command::Cylinder(args) => {
                assert_eq!(args.dimensions, Proportions::Other);
                assert_eq!(args.diameter, Some(100.0));
                assert_eq!(args.age, TestAge::TwentyEightDays);
                assert_eq!(args.failure, FailureMode::Type3);
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 3, 4));
                assert!(args.record.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn non_standard_age_is_rejected() {
        let result = Options::from_iter_safe([
            "concretelab", "cylinder", "M-1", "--load", "200", "--age", "14",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn gradation_takes_masses_in_order() {
        let options = Options::from_iter_safe([
            "concretelab",
            "--config",
            "lab.json",
            "gradation",
            "#57-25 mm",
            "--total-mass",
            "5000",
            "0",
            "250",
            "2500",
        ])
        .expect("valid arguments");
        assert_eq!(options.config, Some(PathBuf::from("lab.json")));
        match options.command {
            Command::Gradation(args) => {
                assert_eq!(args.class, "#57-25 mm");
                assert_eq!(args.retained, vec![0.0, 250.0, 2500.0]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cube_series_metadata_defaults() {
        let options = Options::from_iter_safe([
            "concretelab", "cubes", "75", "70", "--lot", "L-17", "--cement", "slag",
        ])
        .expect("valid arguments");
        match options.command {
            Command::Cubes(args) => {
                assert_eq!(args.loads, vec![75.0, 70.0]);
                assert_eq!(args.lot, "L-17");
                assert_eq!(args.cement, CementType::Slag);
                assert_eq!(args.age, TestAge::TwentyEightDays);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
