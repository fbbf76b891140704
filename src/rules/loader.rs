//! Load faction rules, weight rows and availability conditions from TOML

use crate::core::config::{load_config, DirectorConfig};
use crate::core::error::{DirectorError, Result};
use crate::core::types::FactionId;
use crate::registry::participant::HubKind;
use crate::registry::weights::{WeightTables, Weights};
use crate::rules::condition::{AvailabilityConditions, Condition};
use crate::rules::faction_rules::{FactionRow, FactionRuleTable, RuleEntry, TargetKey};
use crate::rules::predicate::{CustomPredicate, HourWindow, Predicate};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.toml";
pub const FACTIONS_FILE: &str = "factions.toml";
pub const WEIGHTS_FILE: &str = "weights.toml";

/// Static tables the director is built from
#[derive(Debug, Clone, Default)]
pub struct DirectorRules {
    pub factions: FactionRuleTable,
    pub weights: WeightTables,
    pub availability: AvailabilityConditions,
}

/// Load config and tables from a data directory
///
/// Missing files fall back to defaults (empty tables reject every pairing).
pub fn load_director_dir(dir: &Path, customs: &[CustomPredicate]) -> Result<(DirectorConfig, DirectorRules)> {
    let config_path = dir.join(CONFIG_FILE);
    let config = if config_path.exists() {
        load_config(&config_path)?
    } else {
        DirectorConfig::default()
    };

    let mut rules = DirectorRules::default();

    let factions_path = dir.join(FACTIONS_FILE);
    if factions_path.exists() {
        let content = fs::read_to_string(&factions_path)?;
        rules.factions = parse_factions_toml(&content, customs)
            .map_err(|e| DirectorError::Config(format!("{}: {}", FACTIONS_FILE, e)))?;
    }

    let weights_path = dir.join(WEIGHTS_FILE);
    if weights_path.exists() {
        let content = fs::read_to_string(&weights_path)?;
        let (weights, availability) = parse_weights_toml(&content)
            .map_err(|e| DirectorError::Config(format!("{}: {}", WEIGHTS_FILE, e)))?;
        rules.weights = weights;
        rules.availability = availability;
    }

    tracing::info!(
        "Loaded director data from {}: {} factions, {} weight rows, {} behaviour rows, {} availability conditions",
        dir.display(),
        rules.factions.factions().count(),
        rules.weights.target_rows(),
        rules.weights.behaviour_rows(),
        rules.availability.len()
    );

    Ok((config, rules))
}

/// Parse `[factions.<faction>]` tables
pub fn parse_factions_toml(content: &str, customs: &[CustomPredicate]) -> std::result::Result<FactionRuleTable, String> {
    let toml: toml::Value = content.parse()
        .map_err(|e| format!("Invalid TOML: {}", e))?;

    let mut table = FactionRuleTable::new();

    let Some(factions) = toml.get("factions").and_then(|v| v.as_table()) else {
        return Ok(table);
    };

    for (faction, row_value) in factions {
        let row_table = row_value.as_table()
            .ok_or_else(|| format!("factions.{} must be a table", faction))?;

        let mut row = FactionRow::new();
        for (key, value) in row_table {
            let context = format!("factions.{}.{}", faction, key);
            match key.as_str() {
                "player" => row.insert(TargetKey::Player, parse_entry(value, customs, &context)?),
                "squads" => {
                    let squads = value.as_table()
                        .ok_or_else(|| format!("{} must be a table", context))?;
                    for (rival, entry) in squads {
                        let entry = parse_entry(entry, customs, &format!("{}.{}", context, rival))?;
                        row.insert(TargetKey::Squad(FactionId::new(rival.as_str())), entry);
                    }
                }
                other => {
                    let kind = HubKind::from_key(other)
                        .ok_or_else(|| format!("{}: unknown target key", context))?;
                    row.insert(TargetKey::Hub(kind), parse_entry(value, customs, &context)?);
                }
            }
        }

        table.insert(FactionId::new(faction.as_str()), row);
    }

    Ok(table)
}

/// Parse `[target_weights.*]`, `[behaviour.*]` and `[availability]`
pub fn parse_weights_toml(content: &str) -> std::result::Result<(WeightTables, AvailabilityConditions), String> {
    let toml: toml::Value = content.parse()
        .map_err(|e| format!("Invalid TOML: {}", e))?;

    let mut weights = WeightTables::new();
    let mut availability = AvailabilityConditions::new();

    if let Some(rows) = toml.get("target_weights").and_then(|v| v.as_table()) {
        for (profile, row) in rows {
            weights.insert_target_row(profile.as_str(), parse_row(row, &format!("target_weights.{}", profile))?);
        }
    }

    if let Some(rows) = toml.get("behaviour").and_then(|v| v.as_table()) {
        for (profile, row) in rows {
            weights.insert_behaviour_row(profile.as_str(), parse_row(row, &format!("behaviour.{}", profile))?);
        }
    }

    if let Some(conditions) = toml.get("availability").and_then(|v| v.as_table()) {
        for (profile, expr) in conditions {
            let expr = expr.as_str()
                .ok_or_else(|| format!("availability.{} must be a string", profile))?;
            let condition = Condition::parse(expr)
                .map_err(|e| format!("availability.{}: {}", profile, e))?;
            tracing::debug!("availability.{} reads flags {:?}", profile, condition.referenced_flags());
            availability.insert(profile.as_str(), condition);
        }
    }

    Ok((weights, availability))
}

fn parse_row(value: &toml::Value, context: &str) -> std::result::Result<Weights, String> {
    let table = value.as_table()
        .ok_or_else(|| format!("{} must be a table", context))?;

    let mut row = Weights::default();
    for (name, weight) in table {
        let weight = as_number(weight)
            .ok_or_else(|| format!("{}.{} must be a number", context, name))?;
        row.insert(name.clone(), weight);
    }
    Ok(row)
}

fn parse_entry(value: &toml::Value, customs: &[CustomPredicate], context: &str) -> std::result::Result<RuleEntry, String> {
    match value {
        toml::Value::String(s) => match s.as_str() {
            "always" => Ok(RuleEntry::Always),
            "never" => Ok(RuleEntry::Never),
            other => Err(format!("{}: expected \"always\" or \"never\", got {:?}", context, other)),
        },
        toml::Value::Boolean(true) => Ok(RuleEntry::Always),
        toml::Value::Boolean(false) => Ok(RuleEntry::Never),
        toml::Value::Table(_) => Ok(RuleEntry::Predicate(parse_predicate(value, customs, context)?)),
        _ => Err(format!("{}: expected a string, bool or table", context)),
    }
}

/// A predicate table; several keys combine with AND
fn parse_predicate(value: &toml::Value, customs: &[CustomPredicate], context: &str) -> std::result::Result<Predicate, String> {
    let table = value.as_table()
        .ok_or_else(|| format!("{}: predicate must be a table", context))?;

    let mut parts = Vec::new();
    for (key, v) in table {
        let part = match key.as_str() {
            "hours" => {
                let window = v.as_str()
                    .and_then(HourWindow::parse)
                    .ok_or_else(|| format!("{}.hours must look like \"21:00-08:00\"", context))?;
                Predicate::Hours(window)
            }
            "surge" => {
                let active = v.as_bool()
                    .ok_or_else(|| format!("{}.surge must be a bool", context))?;
                Predicate::Surge(active)
            }
            "max_distance" => Predicate::MaxDistance(
                as_number(v).ok_or_else(|| format!("{}.max_distance must be a number", context))?,
            ),
            "min_distance" => Predicate::MinDistance(
                as_number(v).ok_or_else(|| format!("{}.min_distance must be a number", context))?,
            ),
            "flag" | "not_flag" => {
                let name = v.as_str()
                    .ok_or_else(|| format!("{}.{} must be a flag name", context, key))?;
                Predicate::Flag {
                    name: name.to_string(),
                    expected: key == "flag",
                }
            }
            "any" => {
                let options = v.as_array()
                    .ok_or_else(|| format!("{}.any must be an array of tables", context))?;
                let preds = options
                    .iter()
                    .map(|opt| parse_predicate(opt, customs, &format!("{}.any", context)))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Predicate::Any(preds)
            }
            "not" => Predicate::Not(Box::new(parse_predicate(v, customs, &format!("{}.not", context))?)),
            "custom" => {
                let name = v.as_str()
                    .ok_or_else(|| format!("{}.custom must be a name", context))?;
                let custom = customs.iter()
                    .find(|c| c.name == name)
                    .ok_or_else(|| format!("{}: unknown custom predicate {:?}", context, name))?;
                Predicate::Custom(*custom)
            }
            other => return Err(format!("{}: unknown predicate key {:?}", context, other)),
        };
        parts.push(part);
    }

    match parts.len() {
        0 => Err(format!("{}: empty predicate table", context)),
        1 => Ok(parts.remove(0)),
        _ => Ok(Predicate::All(parts)),
    }
}

fn as_number(value: &toml::Value) -> Option<f32> {
    value.as_float()
        .map(|f| f as f32)
        .or_else(|| value.as_integer().map(|i| i as f32))
}
