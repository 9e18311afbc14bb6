use concretelab::{
    BandStatus, CubeSeries, GradationResult, GradationTable, Proportions, Specimen, StrengthResult,
};
use std::fmt::Write;

/// Human-readable label of the declared proportions.
fn proportions_label(proportions: Proportions) -> &'static str {
    match proportions {
        Proportions::Standard100x200 => "standard 100x200 mm",
        Proportions::Standard150x300 => "standard 150x300 mm",
        Proportions::Other => "other dimensions",
    }
}

/// Render the evaluation of one cylinder.
#[must_use]
pub fn render_specimen(specimen: &Specimen, result: &StrengthResult) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Sample {} ({}, tested at {})",
        specimen.name,
        proportions_label(specimen.proportions),
        specimen.age
    )
    .expect("writing to string cannot fail");

    writeln!(
        &mut output,
        "Geometry: D = {:.1} mm, H = {:.1} mm, L/D = {:.2}, area = {:.2} mm², volume = {:.6} m³",
        specimen.diameter_mm,
        specimen.height_mm,
        result.slenderness_ratio,
        result.geometry.area_mm2,
        result.geometry.volume_m3
    )
    .expect("writing to string cannot fail");

    if result.density_kg_m3 > 0.0 {
        writeln!(&mut output, "Density: {:.0} kg/m³", result.density_kg_m3)
            .expect("writing to string cannot fail");
    } else {
        output.push_str("Density: not available (specimen not weighed)\n");
    }

    match (result.correction_factor, result.corrected_strength_mpa) {
        (Some(factor), Some(corrected)) => writeln!(
            &mut output,
            "Strength: {:.2} MPa x {factor:.3} (L/D correction) = {corrected:.2} MPa",
            result.raw_strength_mpa
        )
        .expect("writing to string cannot fail"),
        _ => writeln!(&mut output, "Strength: {:.2} MPa", result.raw_strength_mpa)
            .expect("writing to string cannot fail"),
    }

    if specimen.design_strength_mpa > 0.0 {
        writeln!(
            &mut output,
            "Evolution: {:.2} % of f'c = {:.2} MPa",
            result.evolution_pct, specimen.design_strength_mpa
        )
        .expect("writing to string cannot fail");
    } else {
        output.push_str("Evolution: not available (no design strength)\n");
    }

    writeln!(&mut output, "Failure: {}", specimen.failure.description())
        .expect("writing to string cannot fail");

    output
}

/// Render the sieve table of an analysis with its band status.
#[must_use]
pub fn render_gradation(result: &GradationResult) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Sieve analysis: {} (sample mass = {:.1} g)",
        result.class().unwrap_or("unclassified"),
        result.total_mass_g()
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "{:>9} {:>11} {:>10} {:>13} {:>10} {:>15}",
        "Sieve mm", "Retained g", "Retained %", "Cumulative %", "Passing %", "Band %"
    )
    .expect("writing to string cannot fail");

    for row in result.rows() {
        let status = match row.status() {
            BandStatus::Within => "",
            BandStatus::Above => "  above",
            BandStatus::Below => "  below",
        };
        writeln!(
            &mut output,
            "{:>9} {:>11.1} {:>10.2} {:>13.2} {:>10.2} {:>7.0} - {:<5.0}{status}",
            row.limits.sieve_mm,
            row.retained_g,
            row.retained_pct,
            row.cumulative_pct,
            row.passing_pct,
            row.limits.lower_pct,
            row.limits.upper_pct
        )
        .expect("writing to string cannot fail");
    }

    writeln!(
        &mut output,
        "Fineness modulus: {:.2}",
        result.fineness_modulus()
    )
    .expect("writing to string cannot fail");

    output
}

/// Render a cube series and its summary.
#[must_use]
pub fn render_cubes(series: &CubeSeries) -> String {
    let mut output = String::new();

    let lot = if series.lot.is_empty() {
        "unnamed lot"
    } else {
        series.lot.as_str()
    };
    writeln!(
        &mut output,
        "Mortar cubes: {} cement, {lot}, tested at {}",
        series.cement, series.age
    )
    .expect("writing to string cannot fail");

    for (index, cube) in series.cubes.iter().enumerate() {
        writeln!(
            &mut output,
            "Cube {}: {:.1} g, {:.1} kN, {:.2} MPa{}",
            index + 1,
            cube.mass_g,
            cube.load_kn,
            cube.strength_mpa(),
            if cube.valid { "" } else { " (excluded)" }
        )
        .expect("writing to string cannot fail");
    }

    if let Some(summary) = series.summary() {
        writeln!(
            &mut output,
            "Mean of {} cubes: {:.2} MPa (min {:.2}, max {:.2}, CV {:.1} %)",
            summary.count,
            summary.mean_mpa,
            summary.min_mpa,
            summary.max_mpa,
            summary.coefficient_of_variation_pct
        )
        .expect("writing to string cannot fail");
    } else {
        output.push_str("No valid cubes to summarise\n");
    }

    output
}

/// Render the classes of an envelope table with their sieves.
#[must_use]
pub fn render_classes(table: &GradationTable) -> String {
    let mut output = String::new();

    for envelope in table.envelopes() {
        let sieves: Vec<String> = envelope
            .sieves()
            .iter()
            .map(|sieve| sieve.sieve_mm.to_string())
            .collect();
        writeln!(
            &mut output,
            "{}: {} mm",
            envelope.class(),
            sieves.join(", ")
        )
        .expect("writing to string cannot fail");
    }

    output
}
