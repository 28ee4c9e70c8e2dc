//! Equipment catalog: `(category, index) -> EquipmentEffect` lookups.
//!
//! The catalog is plain data. The engine receives it by reference, so a new
//! table (loaded from a coop file or built in code) never needs engine changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{Loadout, ValidationError};

/// Bonus applied to lay, ship, hatchery and ceiling multipliers by colleggtibles.
pub const COLLEGGTIBLE_BONUS: f64 = 1.05;

/// The eight loadout slots, in slot order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    /// Population ceiling artifact.
    Gusset,
    /// Egg-laying-rate artifact.
    Metronome,
    /// Shipping-rate artifact.
    Compass,
    /// Artifact worn for its stone slots.
    SlotFiller,
    /// Coop-wide lay-rate bonus.
    Deflector,
    /// Shield; only feeds boost-time-value.
    Siab,
    /// First hatchery-rate artifact.
    Chalice,
    /// Second hatchery-rate artifact (stone set).
    LifeStones,
}

impl EquipmentCategory {
    pub const ALL: [EquipmentCategory; 8] = [
        EquipmentCategory::Gusset,
        EquipmentCategory::Metronome,
        EquipmentCategory::Compass,
        EquipmentCategory::SlotFiller,
        EquipmentCategory::Deflector,
        EquipmentCategory::Siab,
        EquipmentCategory::Chalice,
        EquipmentCategory::LifeStones,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EquipmentCategory::Gusset => "gusset",
            EquipmentCategory::Metronome => "metronome",
            EquipmentCategory::Compass => "compass",
            EquipmentCategory::SlotFiller => "slot_filler",
            EquipmentCategory::Deflector => "deflector",
            EquipmentCategory::Siab => "siab",
            EquipmentCategory::Chalice => "chalice",
            EquipmentCategory::LifeStones => "life_stones",
        }
    }

    /// Whether an item of this category is worn during `stage`.
    ///
    /// Hatchery artifacts are only useful while habitats fill; at habitat full
    /// their slots are handed to the deflector and shield.
    pub fn worn_during(self, stage: Stage) -> bool {
        match self {
            EquipmentCategory::Chalice | EquipmentCategory::LifeStones => stage == Stage::Growth,
            EquipmentCategory::Deflector => stage != Stage::Growth,
            EquipmentCategory::Siab => stage == Stage::Production,
            _ => true,
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which part of a loadout is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Habitats still filling.
    Growth,
    /// Habitats full, shield worn.
    Production,
    /// Habitats full, shield replaced by the player's swap deflector.
    Swapped,
}

/// Effect coefficients of a single catalog item. Missing fields are neutral.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentEffect {
    pub name: String,
    pub elr_mult: f64,
    pub sr_mult: f64,
    pub ihr_mult: f64,
    pub deflector_percent: f64,
    pub siab_percent: f64,
    pub chickens_mult: f64,
    pub slot_count: u32,
}

impl Default for EquipmentEffect {
    fn default() -> Self {
        Self {
            name: "None".to_string(),
            elr_mult: 1.0,
            sr_mult: 1.0,
            ihr_mult: 1.0,
            deflector_percent: 0.0,
            siab_percent: 0.0,
            chickens_mult: 1.0,
            slot_count: 0,
        }
    }
}

fn named(name: &str) -> EquipmentEffect {
    EquipmentEffect {
        name: name.to_string(),
        ..EquipmentEffect::default()
    }
}

impl EquipmentEffect {
    fn chickens(self, chickens_mult: f64) -> Self {
        Self { chickens_mult, ..self }
    }

    fn laying(self, elr_mult: f64) -> Self {
        Self { elr_mult, ..self }
    }

    fn shipping(self, sr_mult: f64) -> Self {
        Self { sr_mult, ..self }
    }

    fn hatchery(self, ihr_mult: f64) -> Self {
        Self { ihr_mult, ..self }
    }

    fn deflector(self, deflector_percent: f64) -> Self {
        Self {
            deflector_percent,
            ..self
        }
    }

    fn shield(self, siab_percent: f64) -> Self {
        Self {
            siab_percent,
            ..self
        }
    }

    fn slots(self, slot_count: u32) -> Self {
        Self { slot_count, ..self }
    }
}

/// Combined effect of every worn item for one stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadoutEffect {
    pub elr_mult: f64,
    pub sr_mult: f64,
    pub ihr_mult: f64,
    pub chickens_mult: f64,
    pub deflector_percent: f64,
    pub siab_percent: f64,
    pub stone_slots: u32,
}

impl Default for LoadoutEffect {
    fn default() -> Self {
        Self {
            elr_mult: 1.0,
            sr_mult: 1.0,
            ihr_mult: 1.0,
            chickens_mult: 1.0,
            deflector_percent: 0.0,
            siab_percent: 0.0,
            stone_slots: 0,
        }
    }
}

impl LoadoutEffect {
    fn absorb(&mut self, item: &EquipmentEffect) {
        self.elr_mult *= item.elr_mult;
        self.sr_mult *= item.sr_mult;
        self.ihr_mult *= item.ihr_mult;
        self.chickens_mult *= item.chickens_mult;
        self.deflector_percent += item.deflector_percent;
        self.siab_percent += item.siab_percent;
        self.stone_slots += item.slot_count;
    }

    /// Scale the production multipliers by [`COLLEGGTIBLE_BONUS`].
    pub fn with_colleggtibles(mut self) -> Self {
        self.elr_mult *= COLLEGGTIBLE_BONUS;
        self.sr_mult *= COLLEGGTIBLE_BONUS;
        self.ihr_mult *= COLLEGGTIBLE_BONUS;
        self.chickens_mult *= COLLEGGTIBLE_BONUS;
        self
    }
}

/// Item lists per category. Index 0 of every list is the empty slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: BTreeMap<EquipmentCategory, Vec<EquipmentEffect>>,
}

impl Catalog {
    /// Look up one item.
    pub fn get(
        &self,
        category: EquipmentCategory,
        index: usize,
    ) -> Result<&EquipmentEffect, ValidationError> {
        self.items
            .get(&category)
            .and_then(|list| list.get(index))
            .ok_or(ValidationError::UnknownEquipment { category, index })
    }

    /// Index of the item called `name` within `category`.
    pub fn find(&self, category: EquipmentCategory, name: &str) -> Option<usize> {
        self.items
            .get(&category)?
            .iter()
            .position(|item| item.name == name)
    }

    /// Check that every category exists and every coefficient is usable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for category in EquipmentCategory::ALL {
            let list = self
                .items
                .get(&category)
                .filter(|l| !l.is_empty())
                .ok_or(ValidationError::MissingCategory(category))?;
            for (index, item) in list.iter().enumerate() {
                let mults = [
                    item.elr_mult,
                    item.sr_mult,
                    item.ihr_mult,
                    item.chickens_mult,
                ];
                let percents = [item.deflector_percent, item.siab_percent];
                let ok = mults.iter().all(|m| m.is_finite() && *m > 0.0)
                    && percents.iter().all(|p| p.is_finite() && *p >= 0.0);
                if !ok {
                    return Err(ValidationError::InvalidEffect { category, index });
                }
            }
        }
        Ok(())
    }

    /// Combine the items of `loadout` worn during `stage`.
    ///
    /// In [`Stage::Swapped`] the shield slot holds `swap_deflector`, an index
    /// into the deflector list.
    pub fn resolve(
        &self,
        loadout: &Loadout,
        stage: Stage,
        swap_deflector: usize,
    ) -> Result<LoadoutEffect, ValidationError> {
        let mut effect = LoadoutEffect::default();
        for category in EquipmentCategory::ALL {
            if category.worn_during(stage) {
                effect.absorb(self.get(category, loadout.get(category))?);
            }
        }
        if stage == Stage::Swapped {
            effect.absorb(self.get(EquipmentCategory::Deflector, swap_deflector)?);
        }
        Ok(effect)
    }

    /// Built-in item table.
    pub fn standard() -> Self {
        use EquipmentCategory::*;
        let mut items = BTreeMap::new();
        items.insert(
            Gusset,
            vec![
                EquipmentEffect::default(),
                named("T1C Gusset").chickens(1.05),
                named("T2C Gusset").chickens(1.10),
                named("T2E Gusset").chickens(1.12).slots(2),
                named("T3R Gusset").chickens(1.15).slots(1),
                named("T4C Gusset").chickens(1.20),
                named("T4E Gusset").chickens(1.22).slots(2),
                named("T4L Gusset").chickens(1.25).slots(3),
            ],
        );
        items.insert(
            Metronome,
            vec![
                EquipmentEffect::default(),
                named("T4C Metronome").laying(1.25),
                named("T4R Metronome").laying(1.27).slots(1),
                named("T4E Metronome").laying(1.30).slots(2),
                named("T4L Metronome").laying(1.35).slots(3),
            ],
        );
        items.insert(
            Compass,
            vec![
                EquipmentEffect::default(),
                named("T4C Compass").shipping(1.30),
                named("T4R Compass").shipping(1.35).slots(1),
                named("T4E Compass").shipping(1.40).slots(2),
                named("T4L Compass").shipping(1.50).slots(3),
            ],
        );
        items.insert(
            SlotFiller,
            vec![
                EquipmentEffect::default(),
                named("T4R Filler").slots(1),
                named("T4E Filler").slots(2),
                named("T4L Filler").slots(3),
            ],
        );
        items.insert(
            Deflector,
            vec![
                EquipmentEffect::default(),
                named("T1C Deflector").deflector(5.0),
                named("T2R Deflector").deflector(8.0).slots(1),
                named("T3C Deflector").deflector(12.0),
                named("T3R Deflector").deflector(13.0).slots(1),
                named("T4C Deflector").deflector(15.0),
                named("T4R Deflector").deflector(17.0).slots(1),
                named("T4E Deflector").deflector(19.0).slots(2),
                named("T4L Deflector").deflector(20.0).slots(3),
            ],
        );
        items.insert(
            Siab,
            vec![
                EquipmentEffect::default(),
                named("T4C SIAB").shield(70.0),
                named("T4R SIAB").shield(80.0).slots(1),
                named("T4E SIAB").shield(90.0).slots(2),
                named("T4L SIAB").shield(100.0).slots(3),
            ],
        );
        items.insert(
            Chalice,
            vec![
                EquipmentEffect::default(),
                named("T4C Chalice").hatchery(1.30),
                named("T4E Chalice").hatchery(1.35).slots(2),
                named("T4L Chalice").hatchery(1.40).slots(3),
            ],
        );
        items.insert(
            LifeStones,
            vec![
                EquipmentEffect::default(),
                named("1x T4 Life").hatchery(1.04),
                named("2x T4 Life").hatchery(1.0816),
                named("3x T4 Life").hatchery(1.124864),
            ],
        );
        Self { items }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
