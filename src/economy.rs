//! Prices, player actions and the money ledger.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FarmError, Result};
use crate::farm::CropKind;

/// Something the player can do to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Plant(CropKind),
    Water,
    Fertilize,
    Harvest,
    Treat,
    Protect,
}

impl PlayerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerAction::Plant(_) => "plant",
            PlayerAction::Water => "water",
            PlayerAction::Fertilize => "fertilize",
            PlayerAction::Harvest => "harvest",
            PlayerAction::Treat => "treat",
            PlayerAction::Protect => "protect",
        }
    }
}

impl std::fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerAction::Plant(kind) => write!(f, "plant {kind}"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Costs of player actions and sale prices per unit of yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    pub planting: BTreeMap<CropKind, f64>,
    /// Used for crop kinds missing from `planting`.
    pub default_planting: f64,
    pub sale: BTreeMap<CropKind, f64>,
    /// Used for crop kinds missing from `sale`.
    pub default_sale: f64,
    pub water: f64,
    pub fertilize: f64,
    pub treat: f64,
    pub protect: f64,
    pub harvest: f64,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            planting: BTreeMap::from([
                (CropKind::Corn, 8.0),
                (CropKind::Wheat, 6.0),
                (CropKind::Tomato, 12.0),
            ]),
            default_planting: 8.0,
            sale: BTreeMap::from([
                (CropKind::Corn, 12.0),
                (CropKind::Wheat, 10.0),
                (CropKind::Tomato, 15.0),
            ]),
            default_sale: 10.0,
            water: 2.0,
            fertilize: 5.0,
            treat: 15.0,
            protect: 25.0,
            harvest: 0.0,
        }
    }
}

impl PriceTable {
    pub fn planting_cost(&self, kind: CropKind) -> f64 {
        self.planting
            .get(&kind)
            .copied()
            .unwrap_or(self.default_planting)
    }

    pub fn sale_price(&self, kind: CropKind) -> f64 {
        self.sale.get(&kind).copied().unwrap_or(self.default_sale)
    }

    pub fn cost_of(&self, action: PlayerAction) -> f64 {
        match action {
            PlayerAction::Plant(kind) => self.planting_cost(kind),
            PlayerAction::Water => self.water,
            PlayerAction::Fertilize => self.fertilize,
            PlayerAction::Harvest => self.harvest,
            PlayerAction::Treat => self.treat,
            PlayerAction::Protect => self.protect,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let flat = [
            self.default_planting,
            self.default_sale,
            self.water,
            self.fertilize,
            self.treat,
            self.protect,
            self.harvest,
        ];
        let negative = flat
            .iter()
            .chain(self.planting.values())
            .chain(self.sale.values())
            .any(|price| *price < 0.0);
        if negative {
            return Err(FarmError::InvalidConfig(
                "prices must not be negative".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub starting_money: f64,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            starting_money: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub action: PlayerAction,
    pub amount: f64,
    pub kind: TransactionKind,
    pub tile: (usize, usize),
}

/// Running balance plus the full transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub money: f64,
    pub total_earned: f64,
    pub total_spent: f64,
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(starting_money: f64) -> Self {
        Self {
            money: starting_money,
            total_earned: 0.0,
            total_spent: 0.0,
            transactions: Vec::new(),
        }
    }

    pub fn can_afford(&self, cost: f64) -> bool {
        self.money >= cost
    }

    pub fn profit(&self) -> f64 {
        self.total_earned - self.total_spent
    }

    pub fn record_expense(
        &mut self,
        date: NaiveDate,
        action: PlayerAction,
        amount: f64,
        tile: (usize, usize),
    ) {
        self.money -= amount;
        self.total_spent += amount;
        self.push(date, action, amount, TransactionKind::Expense, tile);
    }

    pub fn record_income(
        &mut self,
        date: NaiveDate,
        action: PlayerAction,
        amount: f64,
        tile: (usize, usize),
    ) {
        self.money += amount;
        self.total_earned += amount;
        self.push(date, action, amount, TransactionKind::Income, tile);
    }

    fn push(
        &mut self,
        date: NaiveDate,
        action: PlayerAction,
        amount: f64,
        kind: TransactionKind,
        tile: (usize, usize),
    ) {
        debug!(%date, %action, amount, ?kind, balance = self.money, "transaction");
        self.transactions.push(Transaction {
            date,
            action,
            amount,
            kind,
            tile,
        });
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(EconomyTuning::default().starting_money)
    }
}
