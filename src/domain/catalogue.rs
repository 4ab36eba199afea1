//! Records returned by the external catalogue API.
//!
//! Shapes follow the dofusdude wire format; everything is serde round-trip
//! safe because raw responses are written to the cache verbatim.

use serde::{Deserialize, Serialize};

/// One hit of the cross-index omnisearch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub ankama_id: i32,
    pub name: String,
}

/// One entry of a per-kind search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEntry {
    pub ankama_id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

/// Numeric identifier with its translated label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedId {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Icon variants published by the catalogue, by ascending quality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hq: Option<String>,
}

impl ImageUrls {
    /// Best icon available, preferring the high-quality render.
    pub fn best(&self) -> Option<&str> {
        self.hq.as_deref().or(self.icon.as_deref())
    }

    /// Icon for small inline display, preferring the SD render.
    pub fn small(&self) -> Option<&str> {
        self.sd.as_deref().or(self.icon.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectType {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectType,
    #[serde(default)]
    pub formatted: String,
}

/// One line of a crafting recipe, ordered as published by the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeEntry {
    pub item_ankama_id: i32,
    pub quantity: i32,
    /// Source-side subtype label, e.g. `resources` or `items`.
    #[serde(default)]
    pub item_subtype: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentSet {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionLeaf {
    pub operator: String,
    pub int_value: i32,
    pub element: TypedId,
}

/// Recursive AND/OR condition tree attached to equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Relation {
        relation: String,
        children: Vec<ConditionNode>,
    },
    Leaf {
        condition: ConditionLeaf,
    },
}

/// Weapon-only characteristic block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponRange {
    pub min: i32,
    pub max: i32,
}

/// Detail record for equipment and cosmetics.
///
/// Cosmetics are normalized into this shape with the weapon block cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub ankama_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TypedId,
    #[serde(default)]
    pub is_weapon: bool,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub pods: i32,
    #[serde(default)]
    pub image_urls: ImageUrls,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Vec<RecipeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_set: Option<ParentSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_hit_probability: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_hit_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cast_per_turn: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ap_cost: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<WeaponRange>,
}

/// Detail record for consumables, resources and quest items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicItem {
    pub ankama_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TypedId,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub pods: i32,
    #[serde(default)]
    pub image_urls: ImageUrls,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Vec<RecipeEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mount {
    pub ankama_id: i32,
    pub name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub image_urls: ImageUrls,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// Detail record for an equipment set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSet {
    pub ankama_id: i32,
    pub name: String,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub equipment_ids: Vec<i32>,
    /// Bonus tiers, outer index = number of equipped members minus one.
    #[serde(default)]
    pub effects: Vec<Vec<Effect>>,
    #[serde(default)]
    pub contains_cosmetics_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxBonusType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxBonus {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AlmanaxBonusType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TributeItem {
    pub ankama_id: i32,
    pub name: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub image_urls: ImageUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tribute {
    pub item: TributeItem,
    pub quantity: i32,
}

/// One calendar day of the almanax.
///
/// Identity is `(date, language)`; a day is only ever replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxDay {
    /// Calendar date formatted `YYYY-MM-DD`.
    pub date: String,
    pub bonus: AlmanaxBonus,
    pub tribute: Tribute,
    #[serde(default)]
    pub reward_kamas: i64,
}

/// One entry of the meta almanax-bonus index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxEffect {
    pub id: String,
    pub name: String,
}
