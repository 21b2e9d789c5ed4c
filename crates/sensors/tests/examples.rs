//! Integration tests over the sample descriptors in `data/racker-stacker/`.

use std::path::PathBuf;

use racker_sensors::evaluator::Classification;
use racker_sensors::layout::{RackLayout, StatusIndicator};
use racker_sensors::loader::{DescriptorKind, DescriptorLoader, LoadStatus};
use racker_sensors::validation::validate_rack;
use racker_sensors::{evaluate_rack, rack_in_alarm, RackAlarm, SensorError, StateLookup, StateSnapshot};

const URL_ROOT: &str = "/local/racker-stacker";

/// Resolve the sample data directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn data_dir() -> PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/racker-stacker")
}

fn loaded() -> DescriptorLoader {
    let loader = DescriptorLoader::new(data_dir());
    let results = loader.load_all().expect("scan sample descriptors");
    for result in &results {
        assert!(
            matches!(result.status, LoadStatus::Loaded { .. }),
            "{}: {:?}",
            result.path.display(),
            result.status
        );
    }
    loader
}

fn states() -> StateSnapshot {
    StateSnapshot::load(&data_dir().join("states.json")).expect("load sample states")
}

#[test]
fn every_sample_descriptor_loads() {
    let loader = loaded();
    let catalog = loader.catalog();
    assert_eq!(catalog.rack_ids(), vec!["edge", "homelab"]);
    assert_eq!(
        catalog.model_ids(),
        vec![
            "apc-smt1500",
            "cisco-9300-48p",
            "dell-r740",
            "synology-rs1221",
            "ubiquiti-usw-flex",
        ]
    );
    assert_eq!(DescriptorKind::for_path(&data_dir().join("models/dell-r740.json")), Some(DescriptorKind::Model));
}

#[test]
fn every_sample_rack_validates() {
    let loader = loaded();
    let catalog = loader.catalog();
    for id in catalog.rack_ids() {
        let result = validate_rack(&loader.rack(&id).unwrap(), &catalog);
        assert!(result.valid, "{id}: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "{id}: {:?}", result.warnings);
    }
}

// ── homelab.yml ─────────────────────────────────────────────

#[test]
fn homelab_is_in_alarm() {
    let loader = loaded();
    let rack = loader.rack("homelab").unwrap();
    let states = states();

    let report = evaluate_rack(&rack.equipment, Some(&states));
    assert_eq!(report.alarm, RackAlarm::Alarm);
    assert!(rack_in_alarm(&rack.equipment, Some(&states)));

    let alarming: Vec<&str> = report.alarming().map(|eq| eq.label.as_str()).collect();
    assert_eq!(alarming, vec!["nas1", "pve2"]);

    // nas1: volume above the healthy limit.
    let nas = &report.equipment[1].sensors;
    assert_eq!(nas.len(), 3);
    assert_eq!(nas.triggered.len(), 1);
    assert_eq!(nas.triggered[0].entity_id, "sensor.nas1_volume_used");
    assert_eq!(nas.triggered[0].classification, Classification::Triggered);

    // pve2: the temperature sensor reports text.
    let pve2 = &report.equipment[3].sensors;
    assert_eq!(pve2.malformed_count(), 1);
    assert!(matches!(
        pve2.triggered[0].error,
        Some(SensorError::TypeMismatch { .. })
    ));

    // The UPS has no hostname and is labelled by model.
    assert_eq!(report.equipment[4].label, "apc-smt1500");
    assert!(!report.equipment[4].sensors.is_alarm());
}

#[test]
fn homelab_is_clear_without_monitoring() {
    let loader = loaded();
    let rack = loader.rack("homelab").unwrap();

    let report = evaluate_rack(&rack.equipment, None);
    assert_eq!(report.alarm, RackAlarm::Clear);
    assert!(!rack_in_alarm(&rack.equipment, None));
}

#[test]
fn homelab_layout() {
    let loader = loaded();
    let rack = loader.rack("homelab").unwrap();
    let layout = RackLayout::new(&rack, URL_ROOT);
    assert_eq!(layout.frame_height_px(), 24 * 40);

    let nas = &rack.equipment[1];
    let placement = layout.place(nas, &loader.model(&nas.model).unwrap());
    assert_eq!(placement.y_px, Some(4 * 40));
    assert_eq!((placement.width_px, placement.height_px), (410, 80));
    assert_eq!(placement.image_url, "/local/racker-stacker/models/synology-rs1221_front.png");

    let ups = &rack.equipment[4];
    assert_eq!(
        layout.image_url(ups, &loader.model(&ups.model).unwrap()),
        "/local/racker-stacker/models/apc-smt1500_rear.jpg"
    );
}

// ── edge.yml ────────────────────────────────────────────────

#[test]
fn edge_is_clear_and_flipped() {
    let loader = loaded();
    let rack = loader.rack("edge").unwrap();
    let states = states();

    let lookup: &dyn StateLookup = &states;
    let report = evaluate_rack(&rack.equipment, Some(lookup));
    assert_eq!(report.alarm, RackAlarm::Clear);

    // edge-fw1 has no sensors: no indicator at all.
    assert_eq!(StatusIndicator::for_report(&report.equipment[1].sensors), None);
    let indicator = StatusIndicator::for_report(&report.equipment[0].sensors).unwrap();
    assert!(!indicator.blink);

    let layout = RackLayout::new(&rack, URL_ROOT);
    let switch = &rack.equipment[0];
    let placement = layout.place(switch, &loader.model(&switch.model).unwrap());
    assert_eq!(placement.y_px, Some(0));
    assert_eq!(placement.x_px, 113);
    assert_eq!(placement.width_px, 183);
    assert_eq!(placement.image_url, "/local/racker-stacker/models/ubiquiti-usw-flex_rear.png");

    let ups = &rack.equipment[2];
    let placement = layout.place(ups, &loader.model(&ups.model).unwrap());
    assert_eq!(placement.y_px, Some(400));
}
