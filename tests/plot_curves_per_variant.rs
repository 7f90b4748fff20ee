use sketchsweep::parser::{ParsedMetrics, Timings};
use sketchsweep::plot::{ChartSpec, LineStyle, build_curves};
use sketchsweep::record::{Metric, RunRecord, SweepResultSet};
use sketchsweep::sketch::SketchKind;

fn record(sketch: SketchKind, size: u64, precision: f64, stream_time: Option<f64>) -> RunRecord {
    RunRecord::new(
        sketch,
        0.001,
        Some(512),
        ParsedMetrics {
            precision,
            recall: precision - 0.1,
            sketch_size: size,
            real_k: 10,
            tp: 9.0,
            fp: 1.0,
            fn_: 1.0,
            timings: stream_time.map(|stream_time| Timings {
                stream_time,
                count_time: 2.0,
            }),
        },
    )
}

#[test]
fn one_curve_per_variant_ordered_by_x() {
    let results: SweepResultSet = [
        record(SketchKind::Cms, 16_384, 0.9, Some(1.5)),
        record(SketchKind::Cms, 8_192, 0.8, Some(1.2)),
    ]
    .into_iter()
    .collect();

    let spec = ChartSpec::new(
        Metric::SketchSize,
        vec![sketchsweep::plot::YSeries::new(Metric::Precision, "Precision")],
        "Precision vs Size",
        "precision_vs_size",
    )
    .sorted_by_x();
    let curves = build_curves(&results, &spec);

    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].sketch, SketchKind::Cms);
    assert_eq!(curves[0].label, "CMS Precision");
    assert_eq!(curves[0].points, vec![(8_192.0, 0.8), (16_384.0, 0.9)]);
}

#[test]
fn unsorted_charts_keep_sweep_order() {
    let results: SweepResultSet = [
        record(SketchKind::Mg, 900, 0.7, None),
        record(SketchKind::Mg, 300, 0.6, None),
    ]
    .into_iter()
    .collect();
    let curves = build_curves(&results, &ChartSpec::memory_analysis());
    let xs: Vec<f64> = curves[0].points.iter().map(|p| p.0).collect();
    assert_eq!(xs, [900.0, 300.0]);
}

#[test]
fn two_metrics_give_solid_and_dashed_curves() {
    let results: SweepResultSet = [
        record(SketchKind::Cs, 4_096, 0.9, None),
        record(SketchKind::Mg, 800, 0.7, None),
    ]
    .into_iter()
    .collect();
    let curves = build_curves(&results, &ChartSpec::memory_analysis());

    let summary: Vec<(SketchKind, LineStyle, &str)> = curves
        .iter()
        .map(|c| (c.sketch, c.style, c.label.as_str()))
        .collect();
    assert_eq!(
        summary,
        [
            (SketchKind::Cs, LineStyle::Solid, "CS Precision"),
            (SketchKind::Cs, LineStyle::Dashed, "CS Recall"),
            (SketchKind::Mg, LineStyle::Solid, "MG Precision"),
            (SketchKind::Mg, LineStyle::Dashed, "MG Recall"),
        ]
    );
}

#[test]
fn missing_variants_and_timings_are_omitted() {
    let results: SweepResultSet = [
        record(SketchKind::Cms, 4_096, 0.9, Some(0.4)),
        record(SketchKind::Cs, 4_096, 0.9, None),
    ]
    .into_iter()
    .collect();
    let curves = build_curves(&results, &ChartSpec::update_time());
    assert!(curves.iter().all(|c| c.sketch == SketchKind::Cms));
    assert_eq!(curves.len(), 2);

    let empty = build_curves(&SweepResultSet::new(), &ChartSpec::phi_sensitivity());
    assert!(empty.is_empty());
}
