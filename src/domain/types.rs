//! Shared domain enumerations aligned with the wire protocol and the
//! persisted lookup-table enums.

use serde::{Deserialize, Serialize};

/// Languages supported by the catalogue source.
///
/// `Any` falls back to the source default (English).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    #[default]
    Any,
    Fr,
    En,
    Es,
    De,
}

impl Language {
    /// Language segment used in catalogue API paths and cache keys.
    pub fn source_code(self) -> &'static str {
        match self {
            Language::Any | Language::En => "en",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::De => "de",
        }
    }
}

/// Kinds addressable by list (search) requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListKind {
    Item,
    Equipment,
    Cosmetic,
    Mount,
    Set,
    AlmanaxEffect,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Item => "item",
            ListKind::Equipment => "equipment",
            ListKind::Cosmetic => "cosmetic",
            ListKind::Mount => "mount",
            ListKind::Set => "set",
            ListKind::AlmanaxEffect => "almanax_effect",
        }
    }
}

/// Kinds addressable by item (detail) requests.
///
/// `AnyItem` is a wildcard marker used for unresolvable ingredients; it has
/// no routing-table entry of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "item_kind", rename_all = "snake_case")]
pub enum ItemKind {
    AnyItem,
    Consumable,
    Equipment,
    Cosmetic,
    Mount,
    Set,
    QuestItem,
    Resource,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::AnyItem => "any_item",
            ItemKind::Consumable => "consumable",
            ItemKind::Equipment => "equipment",
            ItemKind::Cosmetic => "cosmetic",
            ItemKind::Mount => "mount",
            ItemKind::Set => "set",
            ItemKind::QuestItem => "quest_item",
            ItemKind::Resource => "resource",
        }
    }
}

/// Equipment slot families carried by the persisted type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "equipment_kind", rename_all = "snake_case")]
pub enum EquipmentKind {
    None,
    Hat,
    Cloak,
    Amulet,
    Ring,
    Belt,
    Boots,
    Shield,
    Weapon,
    Dofus,
    Trophy,
    Prysmaradite,
    Pet,
    Petsmount,
    Mount,
}

/// Terminal status of an outbound answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerStatus {
    Success,
    Error,
}
