#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use chrono::NaiveDate;
use concretelab::{
    area_mm2, compressive_strength_mpa, density_kg_m3, evolution_pct, read_csv, volume_m3,
    write_csv, FailureMode, Proportions, RecordLog, RecordRepository, ReferenceData,
    ReferenceDataError, SlendernessTable, Specimen, SpecimenError, SpecimenRecord, TestAge,
};

fn reference() -> ReferenceData {
    ReferenceData::embedded().expect("embedded reference data is valid")
}

fn standard_cylinder() -> Specimen {
    Specimen::new("M-1", Proportions::Standard150x300)
        .with_mass(12.5)
        .with_load(350.0)
        .with_design_strength(21.0)
        .with_age(TestAge::TwentyEightDays)
        .with_failure(FailureMode::Type1)
}

#[test]
fn standard_cylinder_matches_hand_calculation() {
    let result = standard_cylinder()
        .evaluate(&reference().slenderness)
        .expect("standard cylinder evaluates");

    assert_relative_eq!(result.geometry.area_mm2, 17_671.46, epsilon = 0.01);
    assert_relative_eq!(result.geometry.volume_m3, 0.005_301, epsilon = 1.0e-6);
    assert_relative_eq!(result.density_kg_m3, 2360.0);
    // 350 kN over 17 671.46 mm² is 19.806 MPa.
    assert_relative_eq!(result.strength_mpa(), 19.81);
    assert_relative_eq!(result.evolution_pct, 94.33);
    assert_eq!(result.correction_factor, None);
}

#[test]
fn volume_grows_with_both_dimensions() {
    assert_relative_eq!(
        volume_m3(100.0, 200.0),
        area_mm2(100.0) * 200.0 / 1.0e9,
        epsilon = 1.0e-15
    );
    assert!(volume_m3(100.0, 210.0) > volume_m3(100.0, 200.0));
    assert!(volume_m3(105.0, 200.0) > volume_m3(100.0, 200.0));
}

#[test]
fn density_is_a_multiple_of_ten_or_zero() {
    for (volume, mass) in [(0.001_57, 3.71), (0.005_301, 12.5), (0.0042, 9.876)] {
        let density = density_kg_m3(volume, mass);
        assert_relative_eq!(density % 10.0, 0.0, epsilon = 1.0e-9);
        assert!(density > 0.0);
    }
    assert_relative_eq!(density_kg_m3(0.0, 12.5), 0.0);
    assert_relative_eq!(density_kg_m3(0.005, 0.0), 0.0);
}

#[test]
fn strength_follows_the_inverse_square_of_the_diameter() {
    assert_relative_eq!(compressive_strength_mpa(0.0, 150.0), 0.0);
    let small = compressive_strength_mpa(400.0, 100.0);
    let large = compressive_strength_mpa(400.0, 200.0);
    assert_relative_eq!(small, 50.93);
    assert_relative_eq!(large, 12.73);
    assert!((small / 4.0 - large).abs() < 0.01);
}

#[test]
fn evolution_needs_a_design_strength() {
    assert_relative_eq!(evolution_pct(0.0, 30.0), 0.0);
    assert_relative_eq!(evolution_pct(100.0, 100.0), 100.0);
}

#[test]
fn embedded_slenderness_table_covers_its_domain() {
    let table = reference().slenderness;
    assert_eq!(table.len(), 100);
    assert_eq!(table.factor(1.0), Some(0.87));
    assert_eq!(table.factor(1.99), Some(0.999));
    assert_eq!(table.factor(2.0), None);
    assert_eq!(table.factor(0.99), None);
    let factors: Vec<f64> = table.entries().map(|entry| entry.factor).collect();
    assert!(factors.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn slenderness_table_with_a_gap_is_rejected() {
    let csv: String = std::iter::once("ratio,factor\n".to_string())
        .chain(
            (100..200)
                .filter(|key| *key != 137)
                .map(|key| format!("{:.2},0.9\n", f64::from(key) / 100.0)),
        )
        .collect();
    match SlendernessTable::from_reader(csv.as_bytes()) {
        Err(ReferenceDataError::MissingRatio(ratio)) => assert_relative_eq!(ratio, 1.37),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn squat_and_slender_specimens_are_rejected() {
    let table = reference().slenderness;
    for height in [95.0, 205.0] {
        let error = Specimen::new("X", Proportions::Other)
            .with_dimensions(100.0, height)
            .with_load(150.0)
            .evaluate(&table)
            .expect_err("ratio outside the table");
        assert!(matches!(error, SpecimenError::SlendernessOutOfRange { .. }));
    }
}

#[test]
fn records_survive_a_csv_round_trip() {
    let reference = reference();
    let date = NaiveDate::from_ymd_opt(2026, 3, 4).expect("valid date");
    let short = Specimen::new("M-2", Proportions::Other)
        .with_dimensions(100.0, 125.0)
        .with_mass(2.3)
        .with_load(180.0)
        .with_design_strength(21.0)
        .with_failure(FailureMode::Type5);

    let mut log: RecordLog<SpecimenRecord> = RecordLog::new();
    for specimen in [standard_cylinder(), short] {
        let result = specimen
            .evaluate(&reference.slenderness)
            .expect("specimen evaluates");
        log.append(specimen.record(&result, date));
    }

    let mut buffer = Vec::new();
    write_csv(log.records(), &mut buffer).expect("records export");
    let restored: RecordLog<SpecimenRecord> = read_csv(buffer.as_slice())
        .expect("records import")
        .into_iter()
        .collect();

    assert_eq!(restored, log);
    assert_eq!(restored.records()[0].date, date);
    assert_eq!(restored.records()[1].failure, "Type 5");
}
