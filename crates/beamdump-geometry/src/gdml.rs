//! GDML serialisation.
//!
//! Writes a [`Registry`] as a GDML document that Geant4 and BDSIM can load.
//! NIST materials are referenced by name only; compounds get an explicit
//! `<material>` definition. Logical volumes are written daughters first so
//! that every `volumeref` points at an already defined volume.
//!
//! ```text
//! <gdml>
//!   <define>     named constants
//!   <materials>  compound materials
//!   <solids>     box / tube
//!   <structure>  volumes with inline physvol placements
//!   <setup>      world reference
//! </gdml>
//! ```

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use beamdump_materials::{Material, MaterialProperties};
use log::info;

use crate::error::GeometryResult;
use crate::registry::{LogicalId, Registry};
use crate::solids::{Expr, SolidKind};

const GDML_SCHEMA: &str =
    "http://service-spi.web.cern.ch/service-spi/app/releases/GDML/schema/gdml.xsd";

/// Values closer to zero than this are written as `0`.
const ZERO_SNAP: f64 = 1e-9;

/// Write `registry` as a GDML document.
pub fn write_gdml<W: Write>(registry: &Registry, mut out: W) -> GeometryResult<()> {
    let world = registry.world()?;

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<gdml xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="{}">"#,
        GDML_SCHEMA
    )?;

    writeln!(out, "  <define>")?;
    for c in registry.constants() {
        writeln!(
            out,
            r#"    <constant name="{}" value="{}"/>"#,
            escape(&c.name),
            escape(&c.expression)
        )?;
    }
    writeln!(out, "  </define>")?;

    writeln!(out, "  <materials>")?;
    for material in registry.materials() {
        if let Material::Compound(c) = material {
            writeln!(
                out,
                r#"    <material name="{}" state="{}">"#,
                escape(c.name()),
                c.state().as_str()
            )?;
            writeln!(out, r#"      <D value="{}" unit="g/cm3"/>"#, number(c.density()))?;
            for component in c.components() {
                writeln!(
                    out,
                    r#"      <fraction n="{}" ref="{}"/>"#,
                    number(component.mass_fraction),
                    escape(&component.reference)
                )?;
            }
            writeln!(out, "    </material>")?;
        }
    }
    writeln!(out, "  </materials>")?;

    writeln!(out, "  <solids>")?;
    for solid in registry.solids() {
        match &solid.kind {
            SolidKind::Box { x, y, z } => writeln!(
                out,
                r#"    <box name="{}" x="{}" y="{}" z="{}" lunit="mm"/>"#,
                escape(&solid.name),
                expr(x),
                expr(y),
                expr(z)
            )?,
            SolidKind::Tube {
                rmin,
                rmax,
                z,
                start_phi,
                delta_phi,
            } => writeln!(
                out,
                r#"    <tube name="{}" rmin="{}" rmax="{}" z="{}" startphi="{}" deltaphi="{}" aunit="rad" lunit="mm"/>"#,
                escape(&solid.name),
                expr(rmin),
                expr(rmax),
                expr(z),
                expr(start_phi),
                expr(delta_phi)
            )?,
        }
    }
    writeln!(out, "  </solids>")?;

    writeln!(out, "  <structure>")?;
    for lv_id in volume_order(registry, world) {
        let lv = registry.logical(lv_id)?;
        writeln!(out, r#"    <volume name="{}">"#, escape(&lv.name))?;
        writeln!(
            out,
            r#"      <materialref ref="{}"/>"#,
            escape(registry.material(lv.material)?.name())
        )?;
        writeln!(
            out,
            r#"      <solidref ref="{}"/>"#,
            escape(&registry.solid(lv.solid)?.name)
        )?;
        for pv_id in registry.daughters(lv_id) {
            let pv = registry.physical(pv_id)?;
            let daughter = registry.logical(pv.logical)?;
            let name = escape(&pv.name);
            let [x, y, z] = pv.placement.position;
            let [rx, ry, rz] = pv.placement.rotation;
            writeln!(out, r#"      <physvol name="{}">"#, name)?;
            writeln!(out, r#"        <volumeref ref="{}"/>"#, escape(&daughter.name))?;
            writeln!(
                out,
                r#"        <position name="{}_pos" unit="mm" x="{}" y="{}" z="{}"/>"#,
                name,
                number(x),
                number(y),
                number(z)
            )?;
            if pv.placement.is_rotated() {
                writeln!(
                    out,
                    r#"        <rotation name="{}_rot" unit="rad" x="{}" y="{}" z="{}"/>"#,
                    name,
                    number(rx),
                    number(ry),
                    number(rz)
                )?;
            }
            writeln!(out, "      </physvol>")?;
        }
        writeln!(out, "    </volume>")?;
    }
    writeln!(out, "  </structure>")?;

    writeln!(out, r#"  <setup name="Default" version="1.0">"#)?;
    writeln!(
        out,
        r#"    <world ref="{}"/>"#,
        escape(&registry.logical(world)?.name)
    )?;
    writeln!(out, "  </setup>")?;
    writeln!(out, "</gdml>")?;
    Ok(())
}

/// Write `registry` to a GDML file, creating parent directories.
pub fn write_gdml_file(registry: &Registry, path: &Path) -> GeometryResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_gdml(registry, &mut writer)?;
    writer.flush()?;
    info!("GDML written to {}", path.display());
    Ok(())
}

/// Render `registry` as a GDML string.
pub fn to_gdml_string(registry: &Registry) -> GeometryResult<String> {
    let mut buf = Vec::new();
    write_gdml(registry, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Logical volumes with every daughter before its mother and the world
/// last. Volumes not reachable from the world are still written.
fn volume_order(registry: &Registry, world: LogicalId) -> Vec<LogicalId> {
    fn visit(
        registry: &Registry,
        lv: LogicalId,
        seen: &mut HashSet<LogicalId>,
        order: &mut Vec<LogicalId>,
    ) {
        if !seen.insert(lv) {
            return;
        }
        for pv in registry.daughters(lv) {
            if let Ok(daughter) = registry.physical(pv) {
                visit(registry, daughter.logical, seen, order);
            }
        }
        order.push(lv);
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let roots: Vec<LogicalId> = registry
        .logical_volumes()
        .map(|(id, _)| id)
        .filter(|id| *id != world)
        .collect();
    for lv in roots {
        if !is_placed(registry, lv) {
            visit(registry, lv, &mut seen, &mut order);
        }
    }
    visit(registry, world, &mut seen, &mut order);
    order
}

fn is_placed(registry: &Registry, lv: LogicalId) -> bool {
    registry.physical_volumes().any(|(_, pv)| pv.logical == lv)
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::Value(v) => number(*v),
        Expr::Constant(name) => escape(name),
    }
}

fn number(v: f64) -> String {
    if v.abs() < ZERO_SNAP {
        "0".into()
    } else {
        format!("{}", v)
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solids::Solid;
    use crate::transform::Placement;
    use beamdump_materials::lead_glass_tf1;

    fn tiny_registry() -> Registry {
        let mut reg = Registry::new();
        let zero = reg.add_constant("zero", "0", 0.0).unwrap();
        let twopi = reg
            .add_constant("twopi", "2*pi", std::f64::consts::TAU)
            .unwrap();
        let world_solid = reg
            .add_solid(Solid::new_box("world_solid", 1000.0, 1000.0, 1000.0))
            .unwrap();
        let vacuum = reg
            .add_material(Material::predefined("G4_Galactic").unwrap())
            .unwrap();
        let world = reg.add_logical_volume("world_lv", world_solid, vacuum).unwrap();
        reg.set_world(world).unwrap();

        let tube = reg
            .add_solid(Solid::new_tube("cyl_solid", &zero, 30.0, 10.0, 0.0, &twopi))
            .unwrap();
        let graphite = reg
            .add_material(Material::predefined("G4_GRAPHITE").unwrap())
            .unwrap();
        let cyl = reg.add_logical_volume("cyl_lv", tube, graphite).unwrap();
        reg.add_physical_volume("cyl_pv", cyl, world, Placement::on_axis(100.0))
            .unwrap();

        let bar_solid = reg
            .add_solid(Solid::new_box("bar_solid", 15.0, 15.0, 25.0))
            .unwrap();
        let tf1 = reg.add_material(lead_glass_tf1()).unwrap();
        let bar = reg.add_logical_volume("bar_lv", bar_solid, tf1).unwrap();
        reg.add_physical_volume(
            "bar_pv",
            bar,
            world,
            Placement::at([50.0, 0.0, 0.0]).with_rotation([0.0, 0.0, -0.5]),
        )
        .unwrap();
        reg
    }

    #[test]
    fn test_document_sections_in_order() {
        let gdml = to_gdml_string(&tiny_registry()).unwrap();
        let sections = ["<define>", "<materials>", "<solids>", "<structure>", "<setup"];
        let positions: Vec<usize> = sections.iter().map(|s| gdml.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(gdml.trim_end().ends_with("</gdml>"));
    }

    #[test]
    fn test_constants_referenced_by_tube() {
        let gdml = to_gdml_string(&tiny_registry()).unwrap();
        assert!(gdml.contains(r#"<constant name="twopi" value="2*pi"/>"#));
        assert!(gdml.contains(
            r#"<tube name="cyl_solid" rmin="zero" rmax="30" z="10" startphi="0" deltaphi="twopi" aunit="rad" lunit="mm"/>"#
        ));
    }

    #[test]
    fn test_only_compounds_are_defined() {
        let gdml = to_gdml_string(&tiny_registry()).unwrap();
        assert!(gdml.contains(r#"<material name="TF1" state="solid">"#));
        assert!(gdml.contains(r#"<fraction n="0.51" ref="G4_Pb"/>"#));
        assert!(!gdml.contains(r#"<material name="G4_GRAPHITE""#));
        assert!(gdml.contains(r#"<materialref ref="G4_GRAPHITE"/>"#));
    }

    #[test]
    fn test_daughters_written_before_world() {
        let gdml = to_gdml_string(&tiny_registry()).unwrap();
        let cyl = gdml.find(r#"<volume name="cyl_lv">"#).unwrap();
        let world = gdml.find(r#"<volume name="world_lv">"#).unwrap();
        assert!(cyl < world);
        assert!(gdml.contains(r#"<world ref="world_lv"/>"#));
    }

    #[test]
    fn test_rotation_only_for_rotated_placements() {
        let gdml = to_gdml_string(&tiny_registry()).unwrap();
        assert!(gdml.contains(r#"<rotation name="bar_pv_rot" unit="rad" x="0" y="0" z="-0.5"/>"#));
        assert!(!gdml.contains("cyl_pv_rot"));
        assert!(gdml.contains(r#"<position name="cyl_pv_pos" unit="mm" x="0" y="0" z="100"/>"#));
    }

    #[test]
    fn test_missing_world_is_an_error() {
        let reg = Registry::new();
        assert!(to_gdml_string(&reg).is_err());
    }

    #[test]
    fn test_escape_and_number_formatting() {
        assert_eq!(escape(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(number(2.8e-14), "0");
        assert_eq!(number(-0.0), "0");
        assert_eq!(number(462.0), "462");
        assert_eq!(number(0.51), "0.51");
    }
}
