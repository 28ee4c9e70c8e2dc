//! Coop file format: human units and item names, converted to engine inputs.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use coop_core::{
    BaseCoefficients, Catalog, EquipmentCategory, Loadout, PlayerConfig, RuleSet, SimParams,
};
use coop_scenarios::Preset;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsSpec {
    pub duration_hours: f64,
    pub target_eggs: f64,
    pub gift_minutes: f64,
    pub timer_minutes: f64,
    pub crt_minutes: f64,
    pub boost_order: Vec<usize>,
    pub rules: RuleSet,
    pub double_gifts: bool,
    pub chicken_runs_per_week: f64,
}

impl Default for ParamsSpec {
    fn default() -> Self {
        let p = SimParams::default();
        Self {
            duration_hours: p.duration_secs / 3_600.0,
            target_eggs: p.target_eggs,
            gift_minutes: p.gift_interval_secs / 60.0,
            timer_minutes: p.timer_interval_secs / 60.0,
            crt_minutes: p.crt_time_secs / 60.0,
            boost_order: p.boost_order,
            rules: p.rules,
            double_gifts: p.double_gifts,
            chicken_runs_per_week: p.chicken_runs_per_week,
        }
    }
}

impl ParamsSpec {
    pub fn to_params(&self) -> SimParams {
        SimParams {
            duration_secs: self.duration_hours * 3_600.0,
            target_eggs: self.target_eggs,
            gift_interval_secs: self.gift_minutes * 60.0,
            timer_interval_secs: self.timer_minutes * 60.0,
            crt_time_secs: self.crt_minutes * 60.0,
            boost_order: self.boost_order.clone(),
            rules: self.rules,
            double_gifts: self.double_gifts,
            chicken_runs_per_week: self.chicken_runs_per_week,
        }
    }
}

/// One player; equipment is given by catalog item name.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpec {
    pub name: String,
    pub tokens: u32,
    pub mirror: bool,
    pub sink: bool,
    pub creator: bool,
    pub colleggtibles: bool,
    pub tokens_gifted: u32,
    pub equipment: BTreeMap<EquipmentCategory, String>,
    pub swap_deflector: Option<String>,
    pub base: BaseCoefficients,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        let p = PlayerConfig::default();
        Self {
            name: p.name,
            tokens: p.tokens,
            mirror: p.mirror,
            sink: p.sink,
            creator: p.creator,
            colleggtibles: p.colleggtibles,
            tokens_gifted: p.tokens_gifted,
            equipment: BTreeMap::new(),
            swap_deflector: None,
            base: p.base,
        }
    }
}

fn lookup(catalog: &Catalog, category: EquipmentCategory, item: &str) -> Result<usize> {
    catalog
        .find(category, item)
        .ok_or_else(|| anyhow!("no {category} item named '{item}'"))
}

impl PlayerSpec {
    pub fn to_config(&self, catalog: &Catalog) -> Result<PlayerConfig> {
        let mut loadout = Loadout::default();
        for (&category, item) in &self.equipment {
            loadout.set(category, lookup(catalog, category, item)?);
        }
        let siab_swap_deflector = match &self.swap_deflector {
            Some(item) => lookup(catalog, EquipmentCategory::Deflector, item)?,
            None => 0,
        };
        Ok(PlayerConfig {
            name: self.name.clone(),
            tokens: self.tokens,
            mirror: self.mirror,
            sink: self.sink,
            creator: self.creator,
            colleggtibles: self.colleggtibles,
            loadout,
            siab_swap_deflector,
            tokens_gifted: self.tokens_gifted,
            base: self.base,
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoopFile {
    pub params: ParamsSpec,
    pub players: Vec<PlayerSpec>,
    pub catalog: Option<Catalog>,
    pub presets: Vec<Preset>,
}

/// Engine-ready inputs.
pub struct Coop {
    pub params: SimParams,
    pub players: Vec<PlayerConfig>,
    pub catalog: Catalog,
    pub presets: Vec<Preset>,
}

impl CoopFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if yaml {
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        } else {
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        }
    }

    pub fn into_coop(self) -> Result<Coop> {
        let catalog = self.catalog.unwrap_or_default();
        let players = self
            .players
            .iter()
            .map(|p| p.to_config(&catalog))
            .collect::<Result<Vec<_>>>()?;
        Ok(Coop {
            params: self.params.to_params(),
            players,
            catalog,
            presets: self.presets,
        })
    }
}

/// Four players in T4L gear, two of them wearing shields.
pub fn demo() -> CoopFile {
    let players = (0..4)
        .map(|i| {
            let mut equipment = BTreeMap::new();
            equipment.insert(EquipmentCategory::Gusset, "T4L Gusset".to_string());
            equipment.insert(EquipmentCategory::Metronome, "T4L Metronome".to_string());
            equipment.insert(EquipmentCategory::Compass, "T4L Compass".to_string());
            equipment.insert(EquipmentCategory::Deflector, "T4L Deflector".to_string());
            equipment.insert(EquipmentCategory::Chalice, "T4L Chalice".to_string());
            equipment.insert(EquipmentCategory::LifeStones, "3x T4 Life".to_string());
            let shielded = i < 2;
            if shielded {
                equipment.insert(EquipmentCategory::Siab, "T4L SIAB".to_string());
            }
            PlayerSpec {
                name: format!("farmer{}", i + 1),
                creator: i == 0,
                colleggtibles: true,
                tokens_gifted: 3,
                equipment,
                swap_deflector: shielded.then(|| "T4C Deflector".to_string()),
                ..PlayerSpec::default()
            }
        })
        .collect();
    CoopFile {
        params: ParamsSpec {
            duration_hours: 72.0,
            target_eggs: 2.0e17,
            chicken_runs_per_week: 21.0,
            ..ParamsSpec::default()
        },
        players,
        catalog: None,
        presets: Vec::new(),
    }
}
