//! Integration test: registry assembly, GDML file output and wireframes.

use std::f64::consts::TAU;

use beamdump_geometry::gdml::write_gdml_file;
use beamdump_geometry::overlaps::{check_overlaps, OverlapOptions};
use beamdump_geometry::{Expr, Placement, Registry, Solid};
use beamdump_materials::{lead_glass_tf1, Material};

fn ring_registry(n: usize) -> Registry {
    let mut reg = Registry::new();
    let zero = reg.add_constant("zero", "0", 0.0).unwrap();
    let twopi = reg.add_constant("twopi", "2*pi", TAU).unwrap();

    let world_solid = reg
        .add_solid(Solid::new_box("world_solid", 4000.0, 4000.0, 4000.0))
        .unwrap();
    let vacuum = reg
        .add_material(Material::predefined("G4_Galactic").unwrap())
        .unwrap();
    let world = reg.add_logical_volume("world_lv", world_solid, vacuum).unwrap();
    reg.set_world(world).unwrap();

    let core = reg
        .add_solid(Solid::new_tube("core_solid", &zero, 200.0, 100.0, Expr::Value(0.0), &twopi))
        .unwrap();
    let steel = reg
        .add_material(Material::predefined("G4_STAINLESS-STEEL").unwrap())
        .unwrap();
    let core_lv = reg.add_logical_volume("core_lv", core, steel).unwrap();
    reg.add_physical_volume("core_pv", core_lv, world, Placement::default())
        .unwrap();

    let bar = reg
        .add_solid(Solid::new_box("bar_solid", 100.0, 100.0, 100.0))
        .unwrap();
    let tf1 = reg.add_material(lead_glass_tf1()).unwrap();
    let bar_lv = reg.add_logical_volume("bar_lv", bar, tf1).unwrap();
    for i in 0..n {
        let angle = i as f64 * TAU / n as f64;
        let placement = Placement::at([400.0 * angle.cos(), 400.0 * angle.sin(), 0.0])
            .with_rotation([0.0, 0.0, -angle]);
        reg.add_physical_volume(&format!("bar_pv_{}", i), bar_lv, world, placement)
            .unwrap();
    }
    reg
}

#[test]
fn test_gdml_file_written_with_every_placement() {
    let reg = ring_registry(6);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ring.gdml");
    write_gdml_file(&reg, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("<physvol ").count(), 7);
    assert_eq!(content.matches(r#"<volume name="bar_lv">"#).count(), 1);
    assert!(content.contains(r#"<physvol name="bar_pv_5">"#));
    // The unrotated first bar carries no rotation element.
    assert!(!content.contains("bar_pv_0_rot"));
    assert!(content.contains("bar_pv_1_rot"));
}

#[test]
fn test_ring_is_free_of_overlaps() {
    let reg = ring_registry(6);
    let report = check_overlaps(&reg, &OverlapOptions::default()).unwrap();
    assert!(report.is_clean(), "{:?}", report.findings);
    assert_eq!(report.volumes_checked, 7);
}

#[test]
fn test_world_wireframe_contains_every_volume() {
    let reg = ring_registry(4);
    let frames = reg.world_wireframe(24).unwrap();
    assert_eq!(frames.len(), 1 + 1 + 4);
    assert_eq!(frames[0].physical, "world_lv");
    assert_eq!(frames[0].edges.len(), 12);

    // Bar 1 sits on +y: all its vertices have y between 350 and 450.
    let bar1 = frames.iter().find(|f| f.physical == "bar_pv_1").unwrap();
    assert_eq!(bar1.material, "TF1");
    for [a, b] in &bar1.edges {
        for p in [a, b] {
            assert!(p[1] > 350.0 - 1e-9 && p[1] < 450.0 + 1e-9, "{:?}", p);
        }
    }
}
