//! XTMon command line
//!
//! Offline front end over captured JSON snapshots: print monitoring cards,
//! normalize a Pnl date, and dry-run a replay selection.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use xtmon_core::pnl_date::canonicalize;
use xtmon_core::{
    format_cell_value, to_header_label, Card, MonitoringBoard, ReplaySelectionGrid,
    SnapshotQueryService, ValidationError, XtmonConfig,
};

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "xtmon=info,warn";

/// Command definition
#[must_use]
pub fn cli() -> Command {
    Command::new("xtmon")
        .version(xtmon_core::VERSION)
        .about("XTMon dashboard tools over JSON snapshots")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("cards")
                .about("Group a size/disk report into per-database cards")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Report snapshot ({columns, rows} JSON)"),
                )
                .arg(config_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("pnl-date")
                .about("Print a Pnl date in canonical DD-MM-YYYY form")
                .arg(Arg::new("text").required(true).help("Date as typed")),
        )
        .subcommand(
            Command::new("replay")
                .about("Dry-run a replay: select the filtered view and print the batch")
                .arg(
                    Arg::new("flows")
                        .long("flows")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Failed flows snapshot (JSON array)"),
                )
                .arg(
                    Arg::new("pnl-date")
                        .long("pnl-date")
                        .required(true)
                        .help("Pnl date to load"),
                )
                .arg(
                    Arg::new("feed-source")
                        .long("feed-source")
                        .help("Only select rows from this feed source"),
                )
                .arg(
                    Arg::new("calc-type")
                        .long("calc-type")
                        .help("Only select rows with this calculation type"),
                )
                .arg(config_arg()),
        )
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML configuration file")
}

/// Run the matched subcommand and return what should be printed
///
/// # Errors
/// Any failure of the selected command, with context.
pub async fn run(matches: &ArgMatches) -> Result<String> {
    match matches.subcommand() {
        Some(("cards", args)) => {
            let input = required_path(args, "input")?;
            let config = load_config(args.get_one::<PathBuf>("config"))?;
            cards(input, &config, args.get_flag("json")).await
        }
        Some(("pnl-date", args)) => {
            let text = args.get_one::<String>("text").map_or("", String::as_str);
            pnl_date(text)
        }
        Some(("replay", args)) => {
            let flows = required_path(args, "flows")?;
            let config = load_config(args.get_one::<PathBuf>("config"))?;
            let date = args.get_one::<String>("pnl-date").map_or("", String::as_str);
            replay(
                flows,
                date,
                args.get_one::<String>("feed-source").map(String::as_str),
                args.get_one::<String>("calc-type").map(String::as_str),
                &config,
            )
            .await
        }
        _ => bail!("no subcommand given"),
    }
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("--{name} is required"))
}

fn load_config(path: Option<&PathBuf>) -> Result<XtmonConfig> {
    let config = match path {
        Some(path) => XtmonConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => XtmonConfig::new(),
    };
    config.validate().context("validating config")?;
    Ok(config)
}

/// Group a report snapshot into cards
///
/// # Errors
/// Unreadable or malformed snapshot.
pub async fn cards(input: &Path, config: &XtmonConfig, json: bool) -> Result<String> {
    let service = SnapshotQueryService::new(config).with_monitoring(input);
    let mut board = MonitoringBoard::new(config);
    board.reload(&service).await;
    if let Some(err) = board.load_error() {
        bail!("{} failed: {}", board.procedure_name(), err);
    }

    if json {
        return serde_json::to_string_pretty(board.cards()).context("serializing cards");
    }
    let mut out = String::new();
    for card in board.cards() {
        render_card(&mut out, card).context("rendering cards")?;
    }
    Ok(out)
}

fn render_card(out: &mut impl std::fmt::Write, card: &Card) -> std::fmt::Result {
    writeln!(out, "== {} ==", card.name)?;
    let header: Vec<String> = card.columns.iter().map(|c| to_header_label(c)).collect();
    writeln!(out, "  {}", header.join(" | "))?;
    for (idx, row) in card.rows.iter().enumerate() {
        let cells: Vec<String> = card
            .columns
            .iter()
            .zip(row)
            .map(|(column, value)| format_cell_value(value.as_deref(), column))
            .collect();
        let marker = if card.alert_level(idx).highlights_row() { '!' } else { ' ' };
        writeln!(out, "{marker} {}", cells.join(" | "))?;
    }
    Ok(())
}

/// Canonical form of a typed Pnl date
///
/// # Errors
/// Text matching none of the accepted layouts.
pub fn pnl_date(text: &str) -> Result<String> {
    match canonicalize(text) {
        Some(date) => Ok(date),
        None => bail!("{}: {:?}", ValidationError::InvalidPnlDate, text),
    }
}

/// Load flows, select the filtered view, and render the batch as JSON
///
/// # Errors
/// Invalid date, unreadable snapshot, or an unsubmittable selection.
pub async fn replay(
    flows: &Path,
    date: &str,
    feed_source: Option<&str>,
    calc_type: Option<&str>,
    config: &XtmonConfig,
) -> Result<String> {
    let service = SnapshotQueryService::new(config).with_failed_flows(flows);
    let mut grid = ReplaySelectionGrid::new();
    grid.set_pnl_date_input(date);
    grid.reload(&service)
        .await
        .with_context(|| format!("loading failed flows from {}", flows.display()))?;

    grid.set_filter(feed_source, calc_type);
    let selected = grid.select_all()?;
    tracing::info!(
        "Selected {} of {} failed flows for {}",
        selected,
        grid.total_rows(),
        grid.pnl_date_input()
    );

    let ticket = grid.begin_submit()?;
    tracing::info!(
        "Dry run: {} would receive {} row(s)",
        config.replay.replay_procedure,
        ticket.batch().len()
    );
    serde_json::to_string_pretty(ticket.batch()).context("serializing batch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    /// Sink that refuses every write
    struct Closed;

    impl fmt::Write for Closed {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    fn card() -> Card {
        Card {
            name: "DB1".into(),
            columns: vec!["UsedSpaceMB".into(), "AlertLevel".into()],
            rows: vec![vec![Some("2048".into()), Some("WARNING".into())]],
        }
    }

    #[test]
    fn renders_header_and_flagged_row() {
        let mut out = String::new();
        render_card(&mut out, &card()).unwrap();
        assert_eq!(out, "== DB1 ==\n  Used Space MB | Alert Level\n! 2 048 MB | WARNING\n");
    }

    #[test]
    fn write_failures_propagate() {
        assert!(render_card(&mut Closed, &card()).is_err());
    }
}
