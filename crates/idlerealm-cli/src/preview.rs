//! Balance sheet preview
//!
//! A sheet is a RON player snapshot. For every factory the preview shows
//! the next level's price, the current output and what the selected upgrade
//! mode would buy with the available balance.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use idlerealm_core::formula::{affordable_upgrades, bulk_upgrade_cost, current_production, next_upgrade_cost};
use idlerealm_core::{PlayerState, UpgradeMode};
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// One factory line of the preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub name: String,
    pub level: u32,
    pub next_cost: f64,
    pub production: f64,
    pub balance: f64,
    pub affordable: u32,
    pub affordable_cost: f64,
}

pub fn load_sheet(path: &Path) -> Result<PlayerState> {
    let content = fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    ron::from_str(&content).wrap_err_with(|| format!("parsing {}", path.display()))
}

/// Preview every factory, ordered by realm then unlock order
///
/// Each factory spends `balance` when given, else the sheet's amount of the
/// resource it produces.
pub fn preview(state: &PlayerState, balance: Option<f64>, mode: UpgradeMode) -> Vec<PreviewRow> {
    let mut factories: Vec<_> = state.factories.iter().collect();
    factories.sort_by_key(|f| (f.realm_id, f.unlock_order, f.factory_id));

    factories
        .into_iter()
        .map(|factory| {
            let balance = balance.unwrap_or_else(|| state.amount_of(factory.resource_id));
            let affordable = affordable_upgrades(factory, &state.skills, balance, mode);
            PreviewRow {
                name: if factory.name.is_empty() {
                    factory.factory_id.to_string()
                } else {
                    factory.name.clone()
                },
                level: factory.level,
                next_cost: next_upgrade_cost(factory, &state.skills),
                production: current_production(factory, &state.skills),
                balance,
                affordable,
                affordable_cost: bulk_upgrade_cost(factory, &state.skills, affordable),
            }
        })
        .collect()
}

pub fn render(rows: &[PreviewRow], mode: UpgradeMode) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>5} {:>14} {:>14} {:>14} {:>8} {:>14}",
        "factory",
        "level",
        "next cost",
        "production/s",
        "balance",
        format!("x{mode}"),
        "total"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<24} {:>5} {:>14.2} {:>14.2} {:>14.2} {:>8} {:>14.2}",
            row.name, row.level, row.next_cost, row.production, row.balance, row.affordable, row.affordable_cost
        );
    }
    out
}
