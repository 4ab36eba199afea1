//! Message-bus wire protocol: inbound request envelopes and outbound answers.
//!
//! Not-found is a valid terminal payload (echoed query, empty body), never a
//! protocol-level error.

use serde::{Deserialize, Serialize};

use crate::domain::types::{AnswerStatus, EquipmentKind, ItemKind, Language, ListKind};

/// Inbound request, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestBody {
    List {
        kind: ListKind,
        query: String,
    },
    ItemById {
        kind: ItemKind,
        id: i64,
    },
    ItemByQuery {
        kind: ItemKind,
        query: String,
    },
    /// Almanax entry for one calendar date, `YYYY-MM-DD`.
    AlmanaxDate {
        date: String,
    },
    /// Tribute resources aggregated over the next `duration` days.
    AlmanaxResource {
        duration: i64,
    },
    /// Days matching an almanax bonus, paginated.
    AlmanaxEffect {
        query: String,
        #[serde(default)]
        offset: i64,
        size: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(flatten)]
    pub body: RequestBody,
    #[serde(default)]
    pub language: Language,
    /// Opaque requester identifier, used for tracing only.
    pub correlation_id: String,
}

/// Attribution of the external source an answer was assembled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub name: String,
    pub icon: String,
    pub url: String,
}

impl SourceAttribution {
    /// The dofusdude catalogue, the only source this worker consumes.
    pub fn dofusdude() -> Self {
        Self {
            name: "dofusdude".to_owned(),
            icon: "https://avatars.githubusercontent.com/u/82651571".to_owned(),
            url: "https://github.com/dofusdude".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAnswer {
    pub items: Vec<ListItem>,
}

/// One formatted effect line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectLine {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentTypeAnswer {
    pub item_kind: ItemKind,
    pub equipment_kind: EquipmentKind,
    /// Translated type label as published by the source.
    pub label: String,
}

/// Weapon-only characteristic block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacteristicsAnswer {
    pub cost: i64,
    pub min_range: i64,
    pub max_range: i64,
    pub max_cast_per_turn: i64,
    pub critical_rate: i64,
    pub critical_bonus: i64,
    pub area_effect_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFamily {
    pub id: String,
    pub name: String,
}

/// One recipe line; unresolvable ingredients degrade to id + `AnyItem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLine {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: ItemKind,
    pub quantity: i64,
}

/// Outbound rendition of the equipment condition tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionTree {
    And { children: Vec<ConditionTree> },
    Or { children: Vec<ConditionTree> },
    Leaf { label: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentAnswer {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EquipmentTypeAnswer,
    pub icon: String,
    pub level: i64,
    pub pods: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<SetFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<CharacteristicsAnswer>,
    pub weapon_effects: Vec<EffectLine>,
    pub effects: Vec<EffectLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionTree>,
    pub recipe: Vec<RecipeLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicItemAnswer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub label: String,
    pub icon: String,
    pub level: i64,
    pub pods: i64,
    pub effects: Vec<EffectLine>,
    pub recipe: Vec<RecipeLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountAnswer {
    pub id: String,
    pub name: String,
    pub family: String,
    pub icon: String,
    pub effects: Vec<EffectLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMemberAnswer {
    pub id: String,
    pub name: String,
    pub level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBonusAnswer {
    /// Number of equipped members the tier applies from.
    pub quantity: i64,
    pub effects: Vec<EffectLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAnswer {
    pub id: String,
    pub name: String,
    pub level: i64,
    pub members: Vec<SetMemberAnswer>,
    pub bonuses: Vec<SetBonusAnswer>,
}

/// Detail answer; all body fields absent means "not found" for `query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAnswer {
    pub kind: ItemKind,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<EquipmentAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<BasicItemAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<MountAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<SetAnswer>,
}

impl ItemAnswer {
    /// Well-formed empty answer for a query nothing matched.
    pub fn not_found(kind: ItemKind, query: impl Into<String>) -> Self {
        Self {
            kind,
            query: query.into(),
            equipment: None,
            item: None,
            mount: None,
            set: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxTributeAnswer {
    pub item_name: String,
    pub item_icon: String,
    pub item_kind: ItemKind,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxAnswer {
    /// Requested date, `YYYY-MM-DD`; for off-year requests this is the
    /// requested date even though the bonus was resolved in the current year.
    pub date: String,
    pub bonus: String,
    pub tribute: AlmanaxTributeAnswer,
    pub reward_kamas: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxResourceLine {
    pub item_name: String,
    pub item_kind: ItemKind,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxResourceAnswer {
    pub duration: i64,
    pub tributes: Vec<AlmanaxResourceLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxEffectAnswer {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_name: Option<String>,
    pub days: Vec<AlmanaxAnswer>,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

/// Outbound answer payload, discriminated by `type` (mirrors the request).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerBody {
    List(ListAnswer),
    Item(ItemAnswer),
    Almanax {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day: Option<AlmanaxAnswer>,
    },
    AlmanaxResource(AlmanaxResourceAnswer),
    AlmanaxEffect(AlmanaxEffectAnswer),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub status: AnswerStatus,
    pub language: Language,
    pub correlation_id: String,
    pub source: SourceAttribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<AnswerBody>,
}

impl AnswerEnvelope {
    pub fn success(language: Language, correlation_id: impl Into<String>, body: AnswerBody) -> Self {
        Self {
            status: AnswerStatus::Success,
            language,
            correlation_id: correlation_id.into(),
            source: SourceAttribution::dofusdude(),
            body: Some(body),
        }
    }

    /// Failure answer scoped to one request; carries no payload.
    pub fn failure(language: Language, correlation_id: impl Into<String>) -> Self {
        Self {
            status: AnswerStatus::Error,
            language,
            correlation_id: correlation_id.into(),
            source: SourceAttribution::dofusdude(),
            body: None,
        }
    }
}
