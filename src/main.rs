mod options;
mod report;

use std::error::Error;
use std::fs::File;
use std::path::Path;

use concretelab::{
    read_csv, write_csv, CubeSeries, GradationResult, LabConfig, MortarCube, RecordLog,
    RecordRepository, ReferenceData, Specimen, SpecimenRecord,
};
use options::{Command, CubesArgs, CylinderArgs, GradationArgs, Options};
use report::{render_classes, render_cubes, render_gradation, render_specimen};
use structopt::StructOpt;

fn main() -> Result<(), Box<dyn Error>> {
    let options = Options::from_args();

    // Reference tables are read once and only borrowed afterwards.
    let config = match &options.config {
        Some(path) => LabConfig::from_path(path)?,
        None => LabConfig::default(),
    };
    if config.slenderness_table.is_none() {
        eprintln!("note: using the embedded slenderness correction table");
    }
    if config.gradation_limits.is_none() {
        eprintln!("note: using the embedded gradation limits");
    }
    let reference = ReferenceData::load(&config)?;

    match options.command {
        Command::Cylinder(args) => run_cylinder(args, &reference),
        Command::Gradation(args) => run_gradation(args, &reference),
        Command::Cubes(args) => run_cubes(args),
        Command::Classes => {
            print!("{}", render_classes(&reference.gradation));
            Ok(())
        }
    }
}

fn run_cylinder(args: CylinderArgs, reference: &ReferenceData) -> Result<(), Box<dyn Error>> {
    let (nominal_diameter, nominal_height) = args.dimensions.nominal_dimensions();
    let specimen = Specimen::new(args.name, args.dimensions)
        .with_dimensions(
            args.diameter.unwrap_or(nominal_diameter),
            args.height.unwrap_or(nominal_height),
        )
        .with_mass(args.mass)
        .with_load(args.load)
        .with_design_strength(args.design_strength)
        .with_age(args.age)
        .with_failure(args.failure);

    let result = specimen.evaluate(&reference.slenderness)?;
    print!("{}", render_specimen(&specimen, &result));

    if let Some(path) = args.record {
        let date = args
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let mut log = load_records(&path)?;
        log.append(specimen.record(&result, date));
        write_csv(log.records(), File::create(&path)?)?;
        println!("Recorded in {} ({} records)", path.display(), log.len());
    }
    Ok(())
}

/// Records already in `path`, or an empty log for a new file.
fn load_records(path: &Path) -> Result<RecordLog<SpecimenRecord>, Box<dyn Error>> {
    if !path.exists() {
        return Ok(RecordLog::new());
    }
    Ok(read_csv(File::open(path)?)?.into_iter().collect())
}

fn run_gradation(args: GradationArgs, reference: &ReferenceData) -> Result<(), Box<dyn Error>> {
    let envelope = reference.gradation.envelope(&args.class)?;
    let result = envelope.analyze(&args.retained, args.total_mass)?;
    print!("{}", render_gradation(&result));
    for warning in result.warnings() {
        eprintln!("warning: {warning}");
    }

    if let Some(path) = args.chart {
        export_chart(&result, &path)?;
        println!("Chart written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "chart")]
fn export_chart(result: &GradationResult, path: &Path) -> Result<(), Box<dyn Error>> {
    concretelab::render_png(result, path, (900, 600))?;
    Ok(())
}

#[cfg(not(feature = "chart"))]
fn export_chart(_result: &GradationResult, path: &Path) -> Result<(), Box<dyn Error>> {
    Err(format!(
        "cannot write {}: built without the `chart` feature",
        path.display()
    )
    .into())
}

fn run_cubes(args: CubesArgs) -> Result<(), Box<dyn Error>> {
    if !args.masses.is_empty() && args.masses.len() != args.loads.len() {
        return Err(format!(
            "{} masses given for {} cubes",
            args.masses.len(),
            args.loads.len()
        )
        .into());
    }

    let mut series = CubeSeries::new(args.lot)
        .with_cement(args.cement)
        .with_age(args.age);
    for (index, &load_kn) in args.loads.iter().enumerate() {
        let mut cube = MortarCube::new(args.masses.get(index).copied().unwrap_or(0.0), load_kn);
        cube.valid = !args.invalid.contains(&(index + 1));
        series.push(cube);
    }
    print!("{}", render_cubes(&series));

    if let Some(path) = args.output {
        series.write_csv(File::create(&path)?)?;
        println!("Cube table written to {}", path.display());
    }
    Ok(())
}
