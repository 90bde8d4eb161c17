use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        account::Account,
        consumption::DailyUsage,
        dispatch::{CompletedDispatch, Dispatch, DispatchStatus},
        gas::GasTariff,
        live_power::LivePower,
        saving_session::SavingSession,
        smart_device::SmartDevice,
        snapshot::Snapshot,
        tariff::{Rate, Tariff},
    },
    quantity::{
        energy::KilowattHours,
        money::{Currency, Money},
    },
    render::{
        format::{FormattedMinor, FormattedPower, format_time_until},
        spark::{bar, sparkline},
    },
};

/// Width of the usage bars.
const BAR_WIDTH: usize = 20;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn label(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Dim)
}

fn balance_cell(account: &Account) -> Cell {
    if account.is_in_credit() {
        Cell::new(format!("{} credit", account.balance.abs())).fg(Color::Green)
    } else {
        Cell::new(format!("{} owed", account.balance.abs())).fg(Color::Yellow)
    }
}

fn rate_cell(rate: &Rate, currency: Currency) -> Cell {
    let text = format!(
        "{} {}/kWh",
        if rate.is_off_peak { "OFF-PEAK" } else { "PEAK" },
        FormattedMinor::rate(rate.rate, currency),
    );
    Cell::new(text)
        .fg(if rate.is_off_peak { Color::Cyan } else { Color::Yellow })
        .add_attribute(Attribute::Bold)
}

pub fn build_account_table(account: &Account) -> Table {
    let mut table = new_table();
    table.set_header(vec![Cell::new("Octopus Energy account").add_attribute(Attribute::Bold)]);
    table.add_row(vec![label("Name"), Cell::new(&account.name).add_attribute(Attribute::Bold)]);
    table.add_row(vec![label("Account"), Cell::new(&account.number)]);
    table.add_row(vec![label("Status"), Cell::new(&account.status)]);
    table.add_row(vec![label("Balance"), balance_cell(account)]);
    table.add_row(vec![label("Address"), Cell::new(&account.address)]);
    table
}

pub fn build_rate_table(
    tariff: &Tariff,
    rate: &Rate,
    currency: Currency,
    now: DateTime<Local>,
) -> Table {
    let mut table = new_table();
    table.add_row(vec![label("Now"), rate_cell(rate, currency)]);
    table.add_row(vec![
        label(if rate.is_off_peak { "Ends in" } else { "Cheap rate in" }),
        Cell::new(format!(
            "{} (at {})",
            format_time_until(rate.period_end, now),
            rate.period_end.format("%H:%M"),
        )),
    ]);
    table.add_row(vec![
        label("Next"),
        Cell::new(format!("{}/kWh", FormattedMinor::rate(rate.next_rate, currency))),
    ]);
    table.add_row(vec![label("Tariff"), Cell::new(&tariff.name).add_attribute(Attribute::Dim)]);
    table.add_row(vec![
        label("Standing charge"),
        Cell::new(format!("{}/day", FormattedMinor::new(tariff.standing_charge.0, currency, 1)))
            .add_attribute(Attribute::Dim),
    ]);
    table
}

pub fn build_dispatch_table(
    status: &DispatchStatus,
    dispatches: &[Dispatch],
    now: DateTime<Local>,
) -> Table {
    let mut table = new_table();
    if let Some(current) = &status.current {
        table.add_row(vec![
            Cell::new("CHARGING NOW").fg(Color::Green).add_attribute(Attribute::Bold),
            Cell::new(format!("until {}", current.interval.end.format("%H:%M"))),
        ]);
    } else if let Some(next) = &status.next {
        table.add_row(vec![
            Cell::new("Next charge").fg(Color::Blue),
            Cell::new(format!(
                "{} - {}",
                next.interval.start.format("%H:%M"),
                next.interval.end.format("%H:%M"),
            ))
            .fg(Color::Cyan),
        ]);
        table.add_row(vec![
            label("In"),
            Cell::new(format!(
                "{} ({}min window)",
                format_time_until(next.interval.start, now),
                (next.interval.end - next.interval.start).num_minutes(),
            )),
        ]);
    } else {
        table.add_row(vec![label("No dispatches scheduled")]);
    }
    if dispatches.len() > 1 {
        for dispatch in dispatches.iter().take(5) {
            table.add_row(vec![
                label("Upcoming"),
                Cell::new(format!(
                    "{} - {}",
                    dispatch.interval.start.format("%a %H:%M"),
                    dispatch.interval.end.format("%H:%M"),
                )),
            ]);
        }
    }
    table
}

pub fn build_completed_dispatches_table(dispatches: &[CompletedDispatch]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Energy"]);
    for dispatch in dispatches {
        table.add_row(vec![
            Cell::new(dispatch.interval.start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(dispatch.interval.start.format("%H:%M")),
            Cell::new(dispatch.interval.end.format("%H:%M")),
            Cell::new(format!("{:.1}", dispatch.energy))
                .set_alignment(CellAlignment::Right)
                .fg(Color::Green),
        ]);
    }
    let total: KilowattHours = dispatches.iter().map(|dispatch| dispatch.energy).sum();
    table.add_row(vec![
        label("Total"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{total:.1}"))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn build_live_power_table(
    live_power: &LivePower,
    rate: Option<&Rate>,
    currency: Currency,
) -> Table {
    let mut table = new_table();
    table.add_row(vec![
        label("Power"),
        Cell::new(FormattedPower(live_power.demand)).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![label("Read at"), Cell::new(live_power.read_at.format("%H:%M:%S"))]);
    if let Some(consumption) = live_power.consumption {
        table.add_row(vec![label("Last period"), Cell::new(format!("{consumption:.3}"))]);
    }
    if let Some(rate) = rate {
        table.add_row(vec![
            label("Cost"),
            Cell::new(format!(
                "~{}/hour at the current rate",
                FormattedMinor::new(live_power.cost_per_hour(rate.rate), currency, 1),
            )),
        ]);
    }
    table
}

/// One-line live panel for `watch`.
pub fn build_watch_table(
    live_power: Option<&LivePower>,
    rate: Option<&Rate>,
    currency: Currency,
) -> Table {
    let mut table = new_table();
    let (Some(live_power), Some(rate)) = (live_power, rate) else {
        table.add_row(vec![label("Waiting for data…")]);
        return table;
    };
    table.set_header(vec![format!("Live power ({})", live_power.read_at.format("%H:%M:%S"))]);
    table.add_row(vec![
        Cell::new(FormattedPower(live_power.demand)).add_attribute(Attribute::Bold),
        rate_cell(rate, currency),
        label(&format!(
            "~{}/hr",
            FormattedMinor::new(live_power.cost_per_hour(rate.rate), currency, 0),
        )),
    ]);
    table
}

pub fn build_saving_sessions_table(sessions: &[SavingSession], now: DateTime<Local>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Saving session", "When", "Reward"]);
    for session in sessions {
        let when = if session.is_active(now) {
            Cell::new(format!("ACTIVE NOW until {}", session.interval.end.format("%H:%M")))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(format!(
                "{} - {}",
                session.interval.start.format("%a %d %b %H:%M"),
                session.interval.end.format("%H:%M"),
            ))
        };
        table.add_row(vec![
            label(&session.code),
            when,
            Cell::new(format!("{} Octopoints/kWh", session.reward_per_kwh)),
        ]);
    }
    table
}

/// Daily totals, newest first, with a bar relative to the busiest day.
///
/// Volume and cost columns appear only when some day has them.
pub fn build_usage_table(daily: &BTreeMap<NaiveDate, DailyUsage>, currency: Currency) -> Table {
    let has_volume = daily.values().any(|usage| usage.volume.is_some());
    let has_cost = daily.values().any(|usage| usage.cost.is_some());
    let max = daily.values().map(|usage| usage.energy).max().unwrap_or_default();

    let mut header = vec!["Date", "kWh"];
    if has_volume {
        header.push("m³");
    }
    if has_cost {
        header.push("Cost");
    }
    header.push("Graph");

    let mut table = new_table();
    table.set_header(header);
    let number = |text: String| Cell::new(text).set_alignment(CellAlignment::Right);
    let row = |date: Cell, usage: &DailyUsage, graph: Cell, is_total: bool| {
        let mut energy = number(format!("{:.1}", usage.energy.0));
        if is_total {
            energy = energy.add_attribute(Attribute::Bold);
        }
        let mut row = vec![date, energy];
        if has_volume {
            row.push(number(
                usage.volume.map_or_else(String::new, |volume| format!("{:.2}", volume.0)),
            ));
        }
        if has_cost {
            row.push(number(usage.cost.map_or_else(String::new, |cost| {
                Money::from_minor_units(cost, currency).to_string()
            })));
        }
        row.push(graph);
        row
    };

    for (date, usage) in daily.iter().rev() {
        table.add_row(row(
            Cell::new(date.format("%a %Y-%m-%d")).fg(Color::Cyan),
            usage,
            Cell::new(bar(usage.energy.0, max.0, BAR_WIDTH)).fg(Color::Green),
            false,
        ));
    }

    let mut total = DailyUsage::default();
    for usage in daily.values() {
        total.add(usage.energy, usage.cost, usage.volume);
    }
    let values: Vec<f64> = daily.values().map(|usage| usage.energy.0).collect();
    table.add_row(row(label("Total"), &total, label(&sparkline(&values, values.len())), true));
    table
}

pub fn build_gas_tariff_table(tariff: &GasTariff, currency: Currency) -> Table {
    let mut table = new_table();
    table.add_row(vec![label("Tariff"), Cell::new(&tariff.name)]);
    table.add_row(vec![label("Product"), Cell::new(&tariff.product_code)]);
    table.add_row(vec![
        label("Unit rate"),
        Cell::new(format!("{}/kWh", FormattedMinor::rate(tariff.unit_rate, currency))),
    ]);
    table.add_row(vec![
        label("Standing charge"),
        Cell::new(format!("{}/day", FormattedMinor::new(tariff.standing_charge.0, currency, 1))),
    ]);
    table
}

pub fn build_devices_table(devices: &[SmartDevice]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Device", "Provider", "Status"]);
    for device in devices {
        table.add_row(vec![
            Cell::new(&device.device_id),
            Cell::new(&device.provider),
            Cell::new(&device.status).fg(if device.status == "ACTIVE" {
                Color::Green
            } else {
                Color::Yellow
            }),
        ]);
    }
    table
}

/// One line per dashboard section; missing sections are left out.
pub fn build_status_table(snapshot: &Snapshot, currency: Currency, now: DateTime<Local>) -> Table {
    let mut table = new_table();
    table.set_header(vec![Cell::new("Octopus Energy status").add_attribute(Attribute::Bold)]);
    if let Some(account) = &snapshot.account {
        table.add_row(vec![label("Balance"), balance_cell(account)]);
    }
    if let Some(rate) = &snapshot.rate {
        table.add_row(vec![label("Rate"), rate_cell(rate, currency)]);
    }
    if let Some(live_power) = &snapshot.live_power {
        table.add_row(vec![
            label("Power"),
            Cell::new(FormattedPower(live_power.demand)).add_attribute(Attribute::Bold),
        ]);
    }
    if let Some(status) = &snapshot.dispatch_status {
        if status.is_dispatching() {
            table.add_row(vec![label("Dispatch"), Cell::new("CHARGING").fg(Color::Green)]);
        } else if let Some(next) = &status.next {
            table.add_row(vec![
                label("Dispatch"),
                Cell::new(format!("next at {}", next.interval.start.format("%H:%M"))),
            ]);
        }
    }
    if let Some(session) = snapshot.saving_sessions.first() {
        let cell = if session.is_active(now) {
            Cell::new(format!("FREE POWER until {}", session.interval.end.format("%H:%M")))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(format!("next {}", session.interval.start.format("%a %H:%M")))
        };
        table.add_row(vec![label("Saving session"), cell]);
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::quantity::volume::CubicMeters;

    #[test]
    fn test_usage_table_newest_first() {
        let usage = |energy: f64| DailyUsage { energy: KilowattHours(energy), ..DailyUsage::default() };
        let daily = BTreeMap::from([
            (NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(), usage(5.0)),
            (NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), usage(10.0)),
        ]);
        let rendered = build_usage_table(&daily, Currency::Gbp).to_string();
        let newer = rendered.find("2025-01-15").unwrap();
        let older = rendered.find("2025-01-14").unwrap();
        assert!(newer < older);
        assert!(rendered.contains("████████████████████"));
        assert!(rendered.contains("15.0"));
        assert!(!rendered.contains("Cost"));
        assert!(!rendered.contains("m³"));
    }

    #[test]
    fn test_usage_table_shows_cost_estimates() {
        let daily = BTreeMap::from([(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            DailyUsage { energy: KilowattHours(12.0), cost: Some(321.0), volume: None },
        )]);
        let rendered = build_usage_table(&daily, Currency::Jpy).to_string();
        assert!(rendered.contains("Cost"), "{rendered}");
        assert!(rendered.contains("¥321"));
    }

    #[test]
    fn test_gas_usage_table_shows_volume() {
        let daily = BTreeMap::from([(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            DailyUsage {
                energy: KilowattHours(5.5934),
                cost: None,
                volume: Some(CubicMeters(0.5)),
            },
        )]);
        let rendered = build_usage_table(&daily, Currency::Gbp).to_string();
        assert!(rendered.contains("m³"), "{rendered}");
        assert!(rendered.contains("0.50"));
        assert!(rendered.contains("5.6"));
        assert!(!rendered.contains("Cost"));
    }

    #[test]
    fn test_status_table_skips_missing_sections() {
        let now = Local.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let snapshot = Snapshot {
            account: Some(Account {
                number: "A-1".into(),
                name: String::new(),
                status: String::new(),
                address: String::new(),
                balance: Money::new(12.34, Currency::Gbp),
            }),
            dispatch_status: Some(DispatchStatus {
                current: None,
                next: Some(Dispatch {
                    interval: (now + TimeDelta::hours(1))..(now + TimeDelta::hours(2)),
                    source: "smart-charge".into(),
                }),
            }),
            ..Snapshot::default()
        };
        let rendered = build_status_table(&snapshot, Currency::Gbp, now).to_string();
        assert!(rendered.contains("£12.34 credit"));
        assert!(rendered.contains("next at 13:00"));
        assert!(!rendered.contains("Rate"));
        assert!(!rendered.contains("Power"));
    }
}
