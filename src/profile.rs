use serde::Serialize;

use crate::catalog::DetailRecord;
use crate::domain::{EvolutionLink, display_name};

/// Abilities listed on the detail screen, in catalog slot order.
pub const SHOWN_ABILITY_COUNT: usize = 2;

/// Detail-view model for one creature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatureProfile {
    pub id: u32,
    pub display_name: String,
    pub image_ref: String,
    pub types: Vec<String>,
    pub height_m: f64,
    pub weight_kg: f64,
    pub base_experience: Option<u32>,
    pub abilities: Vec<AbilityLine>,
    pub stats: Vec<StatLine>,
    pub stat_total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityLine {
    pub name: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatLine {
    pub name: String,
    pub label: String,
    pub value: u32,
}

impl CreatureProfile {
    pub fn from_detail(detail: &DetailRecord) -> Self {
        let stats: Vec<StatLine> = detail
            .stats
            .iter()
            .map(|slot| StatLine {
                name: slot.stat.name.clone(),
                label: stat_label(&slot.stat.name),
                value: slot.base_stat,
            })
            .collect();
        let stat_total = stats
            .iter()
            .fold(0u32, |total, stat| total.saturating_add(stat.value));

        Self {
            id: detail.id,
            display_name: display_name(&detail.name),
            image_ref: detail.sprites.preferred().unwrap_or_default().to_string(),
            types: detail.types.iter().map(|slot| slot.kind.name.clone()).collect(),
            height_m: f64::from(detail.height) / 10.0,
            weight_kg: f64::from(detail.weight) / 10.0,
            base_experience: detail.base_experience,
            abilities: detail
                .abilities
                .iter()
                .map(|slot| AbilityLine {
                    name: slot.ability.name.clone(),
                    hidden: slot.is_hidden,
                })
                .collect(),
            stats,
            stat_total,
        }
    }

    /// Catalog number padded to three digits, e.g. `#025`.
    pub fn formatted_id(&self) -> String {
        format!("#{:03}", self.id)
    }

    /// The abilities the detail screen lists. `abilities` keeps the full set.
    pub fn shown_abilities(&self) -> &[AbilityLine] {
        &self.abilities[..self.abilities.len().min(SHOWN_ABILITY_COUNT)]
    }

    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }
}

/// A profile plus its lineage, as shown when a detail view opens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub profile: CreatureProfile,
    pub lineage: Vec<EvolutionLink>,
    pub favourite: bool,
}

pub fn stat_label(stat_name: &str) -> String {
    match stat_name {
        "hp" => "HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SATK".to_string(),
        "special-defense" => "SDEF".to_string(),
        "speed" => "SPD".to_string(),
        other => other.to_uppercase(),
    }
}
