//! Transformation from catalogue records to outbound answer payloads.
//!
//! Pure functions; partial data degrades field by field, never the whole
//! answer.

use std::collections::HashMap;

use tracing::warn;

use crate::application::equipments::EquipmentTypeService;
use crate::application::sources::item_kind_for_subtype;
use crate::domain::catalogue::{
    AlmanaxDay, AlmanaxEffect, BasicItem, ConditionNode, Effect, Equipment, EquipmentSet,
    ListEntry, Mount, SearchHit,
};
use crate::domain::protocol::{
    AlmanaxAnswer, AlmanaxEffectAnswer, AlmanaxResourceAnswer, AlmanaxResourceLine,
    AlmanaxTributeAnswer, BasicItemAnswer, CharacteristicsAnswer, ConditionTree, EffectLine,
    EquipmentAnswer, EquipmentTypeAnswer, ItemAnswer, ListAnswer, ListItem, MountAnswer,
    RecipeLine, SetAnswer, SetBonusAnswer, SetFamily, SetMemberAnswer,
};
use crate::domain::types::{EquipmentKind, ItemKind};

/// Fully resolved recipe ingredient, keyed by catalogue identifier.
#[derive(Debug, Clone)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub kind: ItemKind,
}

pub fn map_search_hits(hits: &[SearchHit]) -> ListAnswer {
    ListAnswer {
        items: hits
            .iter()
            .map(|hit| ListItem {
                id: hit.ankama_id.to_string(),
                name: hit.name.clone(),
            })
            .collect(),
    }
}

pub fn map_entries(entries: &[ListEntry]) -> ListAnswer {
    ListAnswer {
        items: entries
            .iter()
            .map(|entry| ListItem {
                id: entry.ankama_id.to_string(),
                name: entry.name.clone(),
            })
            .collect(),
    }
}

pub fn map_almanax_effect_list(effects: &[AlmanaxEffect]) -> ListAnswer {
    ListAnswer {
        items: effects
            .iter()
            .map(|effect| ListItem {
                id: effect.id.clone(),
                name: effect.name.clone(),
            })
            .collect(),
    }
}

/// Map an equipment (or cosmetic) detail record.
///
/// `None` yields the well-formed empty answer echoing the query.
pub fn map_equipment(
    query: &str,
    item: Option<&Equipment>,
    ingredients: &HashMap<i64, Ingredient>,
    types: &EquipmentTypeService,
) -> ItemAnswer {
    let Some(item) = item else {
        return ItemAnswer::not_found(ItemKind::Equipment, query);
    };

    let (weapon_effects, effects) = split_effects(&item.effects);
    let mapping = types.type_by_source_id(item.kind.id);
    let (equipment_kind, item_kind) = mapping
        .map(|m| (m.equipment_kind, m.item_kind))
        .unwrap_or((EquipmentKind::None, ItemKind::AnyItem));

    let characteristics = item.is_weapon.then(|| {
        let mut area_effect_ids = mapping
            .map(|m| m.area_effect_ids.clone())
            .unwrap_or_default();
        for exception in types.weapon_exceptions(item.ankama_id) {
            if !area_effect_ids.iter().any(|id| id == exception) {
                area_effect_ids.push(exception.clone());
            }
        }

        CharacteristicsAnswer {
            cost: i64::from(item.ap_cost.unwrap_or(0)),
            min_range: i64::from(item.range.as_ref().map(|r| r.min).unwrap_or(0)),
            max_range: i64::from(item.range.as_ref().map(|r| r.max).unwrap_or(0)),
            max_cast_per_turn: i64::from(item.max_cast_per_turn.unwrap_or(0)),
            critical_rate: i64::from(item.critical_hit_probability.unwrap_or(0)),
            critical_bonus: i64::from(item.critical_hit_bonus.unwrap_or(0)),
            area_effect_ids,
        }
    });

    ItemAnswer {
        kind: ItemKind::Equipment,
        query: query.to_owned(),
        equipment: Some(EquipmentAnswer {
            id: item.ankama_id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            kind: EquipmentTypeAnswer {
                item_kind,
                equipment_kind,
                label: item.kind.name.clone().unwrap_or_default(),
            },
            icon: item.image_urls.best().unwrap_or_default().to_owned(),
            level: i64::from(item.level),
            pods: i64::from(item.pods),
            set: item.parent_set.as_ref().map(|set| SetFamily {
                id: set.id.to_string(),
                name: set.name.clone(),
            }),
            characteristics,
            weapon_effects,
            effects,
            conditions: item.conditions.as_ref().map(map_conditions),
            recipe: map_recipe(item.recipe.as_deref().unwrap_or_default(), ingredients),
        }),
        item: None,
        mount: None,
        set: None,
    }
}

/// Map a consumable, resource or quest-item detail record.
pub fn map_basic_item(
    kind: ItemKind,
    query: &str,
    item: Option<&BasicItem>,
    ingredients: &HashMap<i64, Ingredient>,
) -> ItemAnswer {
    let Some(item) = item else {
        return ItemAnswer::not_found(kind, query);
    };

    ItemAnswer {
        kind,
        query: query.to_owned(),
        equipment: None,
        item: Some(BasicItemAnswer {
            id: item.ankama_id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            label: item.kind.name.clone().unwrap_or_default(),
            icon: item.image_urls.best().unwrap_or_default().to_owned(),
            level: i64::from(item.level),
            pods: i64::from(item.pods),
            effects: map_effect_lines(&item.effects),
            recipe: map_recipe(item.recipe.as_deref().unwrap_or_default(), ingredients),
        }),
        mount: None,
        set: None,
    }
}

pub fn map_mount(query: &str, mount: Option<&Mount>) -> ItemAnswer {
    let Some(mount) = mount else {
        return ItemAnswer::not_found(ItemKind::Mount, query);
    };

    ItemAnswer {
        kind: ItemKind::Mount,
        query: query.to_owned(),
        equipment: None,
        item: None,
        mount: Some(MountAnswer {
            id: mount.ankama_id.to_string(),
            name: mount.name.clone(),
            family: mount.family_name.clone(),
            icon: mount.image_urls.best().unwrap_or_default().to_owned(),
            effects: map_effect_lines(&mount.effects),
        }),
        set: None,
    }
}

/// Map a set record with its resolved members.
///
/// Members are emitted in the set's published order; unresolved members are
/// simply absent from `members`.
pub fn map_set(
    query: &str,
    set: Option<&EquipmentSet>,
    members: &HashMap<i32, Equipment>,
) -> ItemAnswer {
    let Some(set) = set else {
        return ItemAnswer::not_found(ItemKind::Set, query);
    };

    let mapped_members = set
        .equipment_ids
        .iter()
        .filter_map(|id| members.get(id))
        .map(|member| SetMemberAnswer {
            id: member.ankama_id.to_string(),
            name: member.name.clone(),
            level: i64::from(member.level),
            icon: member.image_urls.small().map(str::to_owned),
        })
        .collect();

    let bonuses = set
        .effects
        .iter()
        .enumerate()
        .map(|(tier, effects)| SetBonusAnswer {
            quantity: tier as i64 + 1,
            effects: map_effect_lines(effects),
        })
        .collect();

    ItemAnswer {
        kind: ItemKind::Set,
        query: query.to_owned(),
        equipment: None,
        item: None,
        mount: None,
        set: Some(SetAnswer {
            id: set.ankama_id.to_string(),
            name: set.name.clone(),
            level: i64::from(set.level),
            members: mapped_members,
            bonuses,
        }),
    }
}

pub fn map_almanax(day: &AlmanaxDay) -> AlmanaxAnswer {
    AlmanaxAnswer {
        date: day.date.clone(),
        bonus: day.bonus.description.clone(),
        tribute: AlmanaxTributeAnswer {
            item_name: day.tribute.item.name.clone(),
            item_icon: day
                .tribute
                .item
                .image_urls
                .small()
                .unwrap_or_default()
                .to_owned(),
            item_kind: item_kind_for_subtype(&day.tribute.item.subtype),
            quantity: i64::from(day.tribute.quantity),
        },
        reward_kamas: day.reward_kamas,
    }
}

/// Aggregate tribute quantities per item over a range of days.
pub fn map_almanax_resources(days: &[AlmanaxDay], duration: i64) -> AlmanaxResourceAnswer {
    let mut quantities: HashMap<&str, i64> = HashMap::new();
    for day in days {
        *quantities.entry(day.tribute.item.name.as_str()).or_insert(0) +=
            i64::from(day.tribute.quantity);
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut tributes = Vec::new();
    for day in days {
        let name = day.tribute.item.name.as_str();
        if seen.contains(&name) {
            continue;
        }
        seen.push(name);
        tributes.push(AlmanaxResourceLine {
            item_name: name.to_owned(),
            item_kind: item_kind_for_subtype(&day.tribute.item.subtype),
            quantity: quantities[name],
        });
    }

    AlmanaxResourceAnswer { duration, tributes }
}

pub fn map_almanax_effect_answer(
    query: &str,
    effect_name: Option<String>,
    days: &[AlmanaxDay],
    total: i64,
    offset: i64,
    size: i64,
) -> AlmanaxEffectAnswer {
    let (page, mut pages) = if size > 0 {
        (offset / size, total / size)
    } else {
        (0, 0)
    };
    if size > 0 && total % size != 0 {
        pages += 1;
    }

    AlmanaxEffectAnswer {
        query: query.to_owned(),
        effect_name,
        days: days.iter().map(map_almanax).collect(),
        page,
        pages,
        total,
    }
}

fn map_effect_lines(effects: &[Effect]) -> Vec<EffectLine> {
    effects
        .iter()
        .map(|effect| EffectLine {
            id: effect.kind.id.to_string(),
            label: effect.formatted.clone(),
        })
        .collect()
}

/// Split equipment effects into the weapon-strike block and passive bonuses.
fn split_effects(effects: &[Effect]) -> (Vec<EffectLine>, Vec<EffectLine>) {
    let mut weapon_effects = Vec::new();
    let mut passive = Vec::new();
    for effect in effects {
        let line = EffectLine {
            id: effect.kind.id.to_string(),
            label: effect.formatted.clone(),
        };
        if effect.kind.is_active.unwrap_or(false) {
            weapon_effects.push(line);
        } else {
            passive.push(line);
        }
    }
    (weapon_effects, passive)
}

fn map_recipe(
    recipe: &[crate::domain::catalogue::RecipeEntry],
    ingredients: &HashMap<i64, Ingredient>,
) -> Vec<RecipeLine> {
    recipe
        .iter()
        .map(|entry| {
            let id = i64::from(entry.item_ankama_id);
            match ingredients.get(&id) {
                Some(ingredient) => RecipeLine {
                    id: id.to_string(),
                    name: Some(ingredient.name.clone()),
                    kind: ingredient.kind,
                    quantity: i64::from(entry.quantity),
                },
                None => RecipeLine {
                    id: id.to_string(),
                    name: None,
                    kind: ItemKind::AnyItem,
                    quantity: i64::from(entry.quantity),
                },
            }
        })
        .collect()
}

fn map_conditions(node: &ConditionNode) -> ConditionTree {
    match node {
        ConditionNode::Relation { relation, children } => {
            let mapped = children.iter().map(map_conditions).collect();
            match relation.as_str() {
                "and" => ConditionTree::And { children: mapped },
                "or" => ConditionTree::Or { children: mapped },
                other => {
                    warn!(relation = other, "unknown condition relation, treating as AND");
                    ConditionTree::And { children: mapped }
                }
            }
        }
        ConditionNode::Leaf { condition } => ConditionTree::Leaf {
            label: format!(
                "{} {} {}",
                condition
                    .element
                    .name
                    .clone()
                    .unwrap_or_else(|| condition.element.id.to_string()),
                condition.operator,
                condition.int_value
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalogue::{
        AlmanaxBonus, ConditionLeaf, EffectType, ImageUrls, RecipeEntry, Tribute, TributeItem,
        TypedId, WeaponRange,
    };
    use crate::domain::entities::EquipmentTypeRecord;

    fn types_with_ring() -> EquipmentTypeService {
        EquipmentTypeService::new(
            vec![EquipmentTypeRecord {
                source_type_id: 9,
                equipment_kind: EquipmentKind::Ring,
                item_kind: ItemKind::Equipment,
                area_effect_ids: Vec::new(),
            }],
            Vec::new(),
        )
    }

    fn effect(id: i32, label: &str, active: Option<bool>) -> Effect {
        Effect {
            kind: EffectType {
                id,
                name: None,
                is_active: active,
            },
            formatted: label.to_owned(),
        }
    }

    fn bare_equipment() -> Equipment {
        Equipment {
            ankama_id: 10,
            name: "Gelano".to_owned(),
            description: String::new(),
            kind: TypedId {
                id: 9,
                name: Some("Ring".to_owned()),
            },
            is_weapon: false,
            level: 60,
            pods: 10,
            image_urls: ImageUrls::default(),
            effects: Vec::new(),
            conditions: None,
            recipe: None,
            parent_set: None,
            critical_hit_probability: None,
            critical_hit_bonus: None,
            max_cast_per_turn: None,
            ap_cost: None,
            range: None,
        }
    }

    #[test]
    fn missing_equipment_maps_to_an_empty_answer() {
        let answer = map_equipment("gelano", None, &HashMap::new(), &types_with_ring());
        assert_eq!(answer.query, "gelano");
        assert!(answer.equipment.is_none());
    }

    #[test]
    fn effects_split_on_the_active_flag() {
        let mut item = bare_equipment();
        item.effects = vec![
            effect(1, "(neutral damage)", Some(true)),
            effect(2, "+30 Strength", Some(false)),
            effect(3, "+2 AP", None),
        ];
        let answer = map_equipment("10", Some(&item), &HashMap::new(), &types_with_ring());
        let equipment = answer.equipment.unwrap();
        assert_eq!(equipment.weapon_effects.len(), 1);
        assert_eq!(equipment.effects.len(), 2);
    }

    #[test]
    fn weapon_exceptions_extend_type_area_effects_without_duplicates() {
        let types = EquipmentTypeService::new(
            vec![EquipmentTypeRecord {
                source_type_id: 9,
                equipment_kind: EquipmentKind::Weapon,
                item_kind: ItemKind::Equipment,
                area_effect_ids: vec!["line".to_owned()],
            }],
            vec![
                crate::domain::entities::WeaponExceptionRecord {
                    source_weapon_id: 10,
                    area_effect_id: "line".to_owned(),
                },
                crate::domain::entities::WeaponExceptionRecord {
                    source_weapon_id: 10,
                    area_effect_id: "cross".to_owned(),
                },
            ],
        );
        let mut item = bare_equipment();
        item.is_weapon = true;
        item.ap_cost = Some(4);
        item.range = Some(WeaponRange { min: 1, max: 2 });

        let answer = map_equipment("10", Some(&item), &HashMap::new(), &types);
        let characteristics = answer.equipment.unwrap().characteristics.unwrap();
        assert_eq!(characteristics.area_effect_ids, ["line", "cross"]);
        assert_eq!(characteristics.cost, 4);
    }

    #[test]
    fn unresolved_ingredients_become_placeholders() {
        let mut item = bare_equipment();
        item.recipe = Some(vec![
            RecipeEntry {
                item_ankama_id: 10,
                quantity: 2,
                item_subtype: "resources".to_owned(),
            },
            RecipeEntry {
                item_ankama_id: 99,
                quantity: 1,
                item_subtype: "resources".to_owned(),
            },
        ]);
        let ingredients = HashMap::from([(
            10_i64,
            Ingredient {
                id: 10,
                name: "Clay".to_owned(),
                kind: ItemKind::Resource,
            },
        )]);

        let answer = map_equipment("10", Some(&item), &ingredients, &types_with_ring());
        let recipe = answer.equipment.unwrap().recipe;
        assert_eq!(recipe.len(), 2);
        assert_eq!(recipe[0].name.as_deref(), Some("Clay"));
        assert_eq!(recipe[0].kind, ItemKind::Resource);
        assert!(recipe[1].name.is_none());
        assert_eq!(recipe[1].kind, ItemKind::AnyItem);
    }

    #[test]
    fn condition_trees_map_recursively() {
        let node = ConditionNode::Relation {
            relation: "or".to_owned(),
            children: vec![ConditionNode::Leaf {
                condition: ConditionLeaf {
                    operator: ">".to_owned(),
                    int_value: 100,
                    element: TypedId {
                        id: 1,
                        name: Some("Vitality".to_owned()),
                    },
                },
            }],
        };
        match map_conditions(&node) {
            ConditionTree::Or { children } => match &children[0] {
                ConditionTree::Leaf { label } => assert_eq!(label, "Vitality > 100"),
                other => panic!("unexpected child: {other:?}"),
            },
            other => panic!("unexpected root: {other:?}"),
        }
    }

    #[test]
    fn set_members_keep_publication_order_and_skip_missing() {
        let set = EquipmentSet {
            ankama_id: 7,
            name: "Gobball Set".to_owned(),
            level: 30,
            equipment_ids: vec![3, 1, 2],
            effects: vec![Vec::new(), vec![effect(1, "+10 Strength", None)]],
            contains_cosmetics_only: false,
        };
        let members = HashMap::from([
            (1, {
                let mut e = bare_equipment();
                e.ankama_id = 1;
                e
            }),
            (3, {
                let mut e = bare_equipment();
                e.ankama_id = 3;
                e
            }),
        ]);

        let answer = map_set("7", Some(&set), &members);
        let set_answer = answer.set.unwrap();
        let ids: Vec<&str> = set_answer.members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["3", "1"]);
        assert_eq!(set_answer.bonuses[1].quantity, 2);
        assert_eq!(set_answer.bonuses[1].effects.len(), 1);
    }

    #[test]
    fn almanax_resources_aggregate_quantity_per_item() {
        let day = |name: &str, quantity: i32| AlmanaxDay {
            date: "2024-01-01".to_owned(),
            bonus: AlmanaxBonus {
                description: String::new(),
                kind: None,
            },
            tribute: Tribute {
                item: TributeItem {
                    ankama_id: 1,
                    name: name.to_owned(),
                    subtype: "resources".to_owned(),
                    image_urls: ImageUrls::default(),
                },
                quantity,
            },
            reward_kamas: 0,
        };
        let days = vec![day("Clay", 3), day("Wheat", 2), day("Clay", 4)];

        let answer = map_almanax_resources(&days, 3);
        assert_eq!(answer.tributes.len(), 2);
        assert_eq!(answer.tributes[0].item_name, "Clay");
        assert_eq!(answer.tributes[0].quantity, 7);
        assert_eq!(answer.tributes[1].quantity, 2);
    }

    #[test]
    fn effect_answer_pagination_rounds_up() {
        let answer = map_almanax_effect_answer("xp", Some("Double XP".to_owned()), &[], 7, 4, 2);
        assert_eq!(answer.page, 2);
        assert_eq!(answer.pages, 4);
        assert_eq!(answer.total, 7);
    }
}
