//! Rows of the startup-loaded lookup tables.
//!
//! Both tables are read in full once during boot and never written afterwards.

use crate::domain::types::{EquipmentKind, ItemKind};

/// Maps a catalogue type identifier to the internal kind pair, with the
/// default area effects a weapon of that type carries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EquipmentTypeRecord {
    pub source_type_id: i32,
    pub equipment_kind: EquipmentKind,
    pub item_kind: ItemKind,
    pub area_effect_ids: Vec<String>,
}

/// Per-weapon area-effect exception, additive to the type defaults.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeaponExceptionRecord {
    pub source_weapon_id: i32,
    pub area_effect_id: String,
}
