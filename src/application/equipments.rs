//! Equipment-type and weapon-exception lookup.
//!
//! Both tables are folded into plain maps at startup and shared read-only;
//! there is no runtime write path.

use std::collections::HashMap;

use tracing::info;

use crate::domain::entities::{EquipmentTypeRecord, WeaponExceptionRecord};
use crate::domain::types::{EquipmentKind, ItemKind};

/// Result of resolving a catalogue type identifier.
#[derive(Debug, Clone)]
pub struct EquipmentTypeMapping {
    pub equipment_kind: EquipmentKind,
    pub item_kind: ItemKind,
    pub area_effect_ids: Vec<String>,
}

/// Immutable view over the startup-loaded lookup tables.
pub struct EquipmentTypeService {
    types_by_source_id: HashMap<i32, EquipmentTypeMapping>,
    weapon_exceptions: HashMap<i32, Vec<String>>,
}

impl EquipmentTypeService {
    pub fn new(
        types: Vec<EquipmentTypeRecord>,
        exceptions: Vec<WeaponExceptionRecord>,
    ) -> Self {
        info!(count = types.len(), "equipment types loaded");
        let types_by_source_id = types
            .into_iter()
            .map(|record| {
                (
                    record.source_type_id,
                    EquipmentTypeMapping {
                        equipment_kind: record.equipment_kind,
                        item_kind: record.item_kind,
                        area_effect_ids: record.area_effect_ids,
                    },
                )
            })
            .collect();

        info!(count = exceptions.len(), "weapon exceptions loaded");
        let mut weapon_exceptions: HashMap<i32, Vec<String>> = HashMap::new();
        for record in exceptions {
            weapon_exceptions
                .entry(record.source_weapon_id)
                .or_default()
                .push(record.area_effect_id);
        }

        Self {
            types_by_source_id,
            weapon_exceptions,
        }
    }

    pub fn type_by_source_id(&self, id: i32) -> Option<&EquipmentTypeMapping> {
        self.types_by_source_id.get(&id)
    }

    /// Special-case area effects for a weapon, additive to its type defaults.
    pub fn weapon_exceptions(&self, id: i32) -> &[String] {
        self.weapon_exceptions
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
