//! The geometry registry: every constant, material, solid and volume of a
//! model, plus the designated world volume.
//!
//! Entries are stored in insertion order and addressed by typed ids. Names
//! are unique within each table, matching the GDML requirement that
//! references resolve unambiguously.

use std::collections::HashMap;

use beamdump_materials::{Material, MaterialProperties};
use log::debug;
use serde::Serialize;

use crate::error::{GeometryError, GeometryResult};
use crate::solids::{Expr, Shape, Solid};
use crate::transform::{Placement, Transform};

macro_rules! id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(usize);

        impl $name {
            pub fn index(&self) -> usize {
                self.0
            }

            const KIND: &'static str = $kind;
        }
    };
}

id_type!(SolidId, "solid");
id_type!(MaterialId, "material");
id_type!(LogicalId, "logical volume");
id_type!(PhysicalId, "physical volume");

/// A named constant, written to the GDML `<define>` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    /// Expression text as written to GDML (e.g. `2*pi`).
    pub expression: String,
    /// Numeric value of the expression.
    pub value: f64,
}

/// A shape + material pairing, independent of placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalVolume {
    pub name: String,
    pub solid: SolidId,
    pub material: MaterialId,
}

/// A placement of a logical volume inside a mother logical volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalVolume {
    pub name: String,
    pub logical: LogicalId,
    pub mother: LogicalId,
    pub placement: Placement,
}

/// Edges of one placed volume in world coordinates.
#[derive(Debug, Clone)]
pub struct VolumeWireframe {
    /// Physical volume name (the world logical volume name for the world).
    pub physical: String,
    pub logical: String,
    pub material: String,
    pub edges: Vec<[[f64; 3]; 2]>,
}

/// Serialisable overview of a registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySummary {
    pub world: Option<String>,
    pub constants: usize,
    pub materials: usize,
    pub solids: usize,
    pub logical_volumes: usize,
    pub physical_volumes: usize,
    pub placements: Vec<PlacementSummary>,
}

/// One row of [`RegistrySummary::placements`].
#[derive(Debug, Clone, Serialize)]
pub struct PlacementSummary {
    pub physical: String,
    pub logical: String,
    pub mother: String,
    pub solid: String,
    pub material: String,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

/// Name-indexed table preserving insertion order.
#[derive(Debug, Clone)]
struct Table<T> {
    items: Vec<T>,
    by_name: HashMap<String, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn insert(&mut self, kind: &'static str, name: &str, item: T) -> GeometryResult<usize> {
        if self.by_name.contains_key(name) {
            return Err(GeometryError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        let index = self.items.len();
        self.items.push(item);
        self.by_name.insert(name.to_string(), index);
        Ok(index)
    }

    fn get(&self, kind: &'static str, index: usize) -> GeometryResult<&T> {
        self.items
            .get(index)
            .ok_or(GeometryError::UnknownId { kind, index })
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

/// Container for a complete geometry tree.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    constants: Table<Constant>,
    materials: Table<Material>,
    solids: Table<Solid>,
    logical: Table<LogicalVolume>,
    physical: Table<PhysicalVolume>,
    world: Option<LogicalId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Insertion ──────────────────────────────────────────────────────

    /// Define a named constant and return an expression referencing it.
    pub fn add_constant(
        &mut self,
        name: &str,
        expression: impl Into<String>,
        value: f64,
    ) -> GeometryResult<Expr> {
        let constant = Constant {
            name: name.to_string(),
            expression: expression.into(),
            value,
        };
        self.constants.insert("constant", name, constant)?;
        Ok(Expr::constant(name))
    }

    /// Register a material. Re-adding an identical material returns the
    /// existing id so shared NIST materials are stored once.
    pub fn add_material(&mut self, material: impl Into<Material>) -> GeometryResult<MaterialId> {
        let material = material.into();
        if let Material::Compound(c) = &material {
            c.validate()?;
        }
        if let Some(index) = self.materials.find(material.name()) {
            if self.materials.items[index] == material {
                return Ok(MaterialId(index));
            }
        }
        let name = material.name().to_string();
        self.materials
            .insert(MaterialId::KIND, &name, material)
            .map(MaterialId)
    }

    /// Register a solid after checking that it resolves to a valid shape.
    pub fn add_solid(&mut self, solid: Solid) -> GeometryResult<SolidId> {
        solid.resolve(|name| self.constant_value(name))?;
        let name = solid.name.clone();
        debug!("solid {}: {:?}", name, solid.kind);
        self.solids.insert(SolidId::KIND, &name, solid).map(SolidId)
    }

    pub fn add_logical_volume(
        &mut self,
        name: &str,
        solid: SolidId,
        material: MaterialId,
    ) -> GeometryResult<LogicalId> {
        self.solids.get(SolidId::KIND, solid.0)?;
        self.materials.get(MaterialId::KIND, material.0)?;
        let lv = LogicalVolume {
            name: name.to_string(),
            solid,
            material,
        };
        debug!("logical volume {}", name);
        self.logical.insert(LogicalId::KIND, name, lv).map(LogicalId)
    }

    /// Place `logical` inside `mother`.
    ///
    /// Rejects placing the world, placing a volume inside itself, and any
    /// placement that would make the volume tree cyclic.
    pub fn add_physical_volume(
        &mut self,
        name: &str,
        logical: LogicalId,
        mother: LogicalId,
        placement: Placement,
    ) -> GeometryResult<PhysicalId> {
        self.logical.get(LogicalId::KIND, logical.0)?;
        self.logical.get(LogicalId::KIND, mother.0)?;
        let invalid = |message: &str| GeometryError::InvalidPlacement {
            name: name.to_string(),
            message: message.to_string(),
        };
        if Some(logical) == self.world {
            return Err(invalid("the world volume cannot be placed"));
        }
        if logical == mother || self.contains_descendant(logical, mother) {
            return Err(invalid("placement would create a cycle in the volume tree"));
        }
        let pv = PhysicalVolume {
            name: name.to_string(),
            logical,
            mother,
            placement,
        };
        debug!(
            "physical volume {} at {:?} rot {:?}",
            name, placement.position, placement.rotation
        );
        self.physical
            .insert(PhysicalId::KIND, name, pv)
            .map(PhysicalId)
    }

    /// Designate the root of the geometry tree.
    pub fn set_world(&mut self, world: LogicalId) -> GeometryResult<()> {
        self.logical.get(LogicalId::KIND, world.0)?;
        if self.physical.items.iter().any(|pv| pv.logical == world) {
            return Err(GeometryError::InvalidPlacement {
                name: self.logical.items[world.0].name.clone(),
                message: "a placed volume cannot become the world".into(),
            });
        }
        self.world = Some(world);
        Ok(())
    }

    // ── Lookup ─────────────────────────────────────────────────────────

    pub fn world(&self) -> GeometryResult<LogicalId> {
        self.world.ok_or(GeometryError::WorldNotSet)
    }

    pub fn has_world(&self) -> bool {
        self.world.is_some()
    }

    pub fn constant_value(&self, name: &str) -> Option<f64> {
        self.constants
            .find(name)
            .map(|i| self.constants.items[i].value)
    }

    pub fn evaluate(&self, expr: &Expr) -> GeometryResult<f64> {
        expr.evaluate(|name| self.constant_value(name))
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants.items
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials.items
    }

    pub fn solids(&self) -> &[Solid] {
        &self.solids.items
    }

    pub fn logical_volumes(&self) -> impl Iterator<Item = (LogicalId, &LogicalVolume)> {
        self.logical
            .items
            .iter()
            .enumerate()
            .map(|(i, lv)| (LogicalId(i), lv))
    }

    pub fn physical_volumes(&self) -> impl Iterator<Item = (PhysicalId, &PhysicalVolume)> {
        self.physical
            .items
            .iter()
            .enumerate()
            .map(|(i, pv)| (PhysicalId(i), pv))
    }

    pub fn material(&self, id: MaterialId) -> GeometryResult<&Material> {
        self.materials.get(MaterialId::KIND, id.0)
    }

    pub fn solid(&self, id: SolidId) -> GeometryResult<&Solid> {
        self.solids.get(SolidId::KIND, id.0)
    }

    pub fn logical(&self, id: LogicalId) -> GeometryResult<&LogicalVolume> {
        self.logical.get(LogicalId::KIND, id.0)
    }

    pub fn physical(&self, id: PhysicalId) -> GeometryResult<&PhysicalVolume> {
        self.physical.get(PhysicalId::KIND, id.0)
    }

    pub fn find_logical(&self, name: &str) -> Option<LogicalId> {
        self.logical.find(name).map(LogicalId)
    }

    pub fn find_physical(&self, name: &str) -> Option<PhysicalId> {
        self.physical.find(name).map(PhysicalId)
    }

    /// Physical volumes placed directly inside `mother`, in insertion order.
    pub fn daughters(&self, mother: LogicalId) -> Vec<PhysicalId> {
        self.physical_volumes()
            .filter(|(_, pv)| pv.mother == mother)
            .map(|(id, _)| id)
            .collect()
    }

    /// Resolve the solid of a logical volume to a numeric shape.
    pub fn shape_of(&self, lv: LogicalId) -> GeometryResult<Shape> {
        let solid = self.solid(self.logical(lv)?.solid)?;
        solid.resolve(|name| self.constant_value(name))
    }

    /// Whether `target` appears anywhere below `root` in the volume tree.
    fn contains_descendant(&self, root: LogicalId, target: LogicalId) -> bool {
        let mut stack = vec![root];
        while let Some(lv) = stack.pop() {
            for pv in self.physical.items.iter().filter(|pv| pv.mother == lv) {
                if pv.logical == target {
                    return true;
                }
                stack.push(pv.logical);
            }
        }
        false
    }

    // ── Derived views ──────────────────────────────────────────────────

    /// Accumulated local-to-world transform of every physical volume
    /// reachable from the world, in depth-first order.
    pub fn world_transforms(&self) -> GeometryResult<Vec<(PhysicalId, Transform)>> {
        let world = self.world()?;
        let mut out = Vec::new();
        self.collect_transforms(world, &Transform::default(), &mut out);
        Ok(out)
    }

    fn collect_transforms(
        &self,
        mother: LogicalId,
        to_world: &Transform,
        out: &mut Vec<(PhysicalId, Transform)>,
    ) {
        for id in self.daughters(mother) {
            let pv = &self.physical.items[id.0];
            let t = Transform::from_placement(&pv.placement).then(to_world);
            out.push((id, t.clone()));
            self.collect_transforms(pv.logical, &t, out);
        }
    }

    /// Wireframe edges of the world and every placed volume, in world
    /// coordinates.
    pub fn world_wireframe(&self, segments: usize) -> GeometryResult<Vec<VolumeWireframe>> {
        let world = self.world()?;
        let world_lv = self.logical(world)?;
        let mut out = vec![VolumeWireframe {
            physical: world_lv.name.clone(),
            logical: world_lv.name.clone(),
            material: self.material(world_lv.material)?.name().to_string(),
            edges: self.shape_of(world)?.wireframe(segments),
        }];
        for (id, to_world) in self.world_transforms()? {
            let pv = self.physical(id)?;
            let lv = self.logical(pv.logical)?;
            let edges = self
                .shape_of(pv.logical)?
                .wireframe(segments)
                .into_iter()
                .map(|[a, b]| [to_world.apply(&a), to_world.apply(&b)])
                .collect();
            out.push(VolumeWireframe {
                physical: pv.name.clone(),
                logical: lv.name.clone(),
                material: self.material(lv.material)?.name().to_string(),
                edges,
            });
        }
        Ok(out)
    }

    pub fn summary(&self) -> GeometryResult<RegistrySummary> {
        let mut placements = Vec::with_capacity(self.physical.items.len());
        for pv in &self.physical.items {
            let lv = self.logical(pv.logical)?;
            placements.push(PlacementSummary {
                physical: pv.name.clone(),
                logical: lv.name.clone(),
                mother: self.logical(pv.mother)?.name.clone(),
                solid: self.solid(lv.solid)?.name.clone(),
                material: self.material(lv.material)?.name().to_string(),
                position: pv.placement.position,
                rotation: pv.placement.rotation,
            });
        }
        let world = match self.world {
            Some(id) => Some(self.logical(id)?.name.clone()),
            None => None,
        };
        Ok(RegistrySummary {
            world,
            constants: self.constants.items.len(),
            materials: self.materials.items.len(),
            solids: self.solids.items.len(),
            logical_volumes: self.logical.items.len(),
            physical_volumes: self.physical.items.len(),
            placements,
        })
    }
}
