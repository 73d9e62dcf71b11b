use std::fs::{self, File};
use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use days_home::report::{
    comparable_home_lines, grouped_trips_lines, stays_lines, superlative_lines,
    top_home_stays_lines,
};
use days_home::{
    build_history, layout_chart, normalize_stays, parse_records, ChartDocument, ChartStyle,
    HexColor, IntervalRow, Params, StayHistory, StaysError,
};
use plotters::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Trip and home stay analysis CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the day-box chart and print the home stay rankings
    Report(ReportArgs),
    /// Print the trips grouped from the stay history
    Trips(InputArgs),
    /// Print every trip with the home stay that followed it
    Stays(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// CSV file with City, Nights and Checkout Date columns
    #[arg(short, long, default_value = "data/hotels.csv", value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Date closing the current home stay (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Maximum gap in days between stays of the same trip
    #[arg(long, default_value_t = 1)]
    merge_range_days: u32,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output SVG chart path
    #[arg(long, default_value = "days_at_home.svg", value_hint = ValueHint::FilePath)]
    svg: PathBuf,

    /// Output PNG chart path
    #[arg(long, value_hint = ValueHint::FilePath)]
    png: Option<PathBuf>,

    /// Disable chart generation
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot: bool,

    /// Optional chart style JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    style: Option<PathBuf>,

    /// Also print grouped trips, every stay and the longest trip/home
    #[arg(long, action = ArgAction::SetTrue)]
    all: bool,

    /// Write the computed trips and rows as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    json: Option<PathBuf>,

    /// Write the interval rows as CSV (`-` for stdout)
    #[arg(long, value_hint = ValueHint::FilePath)]
    rows_csv: Option<PathBuf>,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Command::Report(args) => args.input.verbose,
        Command::Trips(args) | Command::Stays(args) => args.verbose,
    };
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Trips(args) => handle_trips(args),
        Command::Stays(args) => handle_stays(args),
    }
}

fn load_history(args: &InputArgs) -> Result<StayHistory> {
    let path = &args.input;
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let raw =
        parse_records(&data).with_context(|| format!("failed to parse {}", path.display()))?;
    let stays =
        normalize_stays(&raw).with_context(|| format!("invalid stay in {}", path.display()))?;

    let params = Params {
        merge_range_days: args.merge_range_days,
    };
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let history = build_history(&stays, &params, as_of)
        .with_context(|| format!("no stays found in {}", path.display()))?;
    info!(
        "Loaded {} stays from {}: {} trips, as of {}",
        raw.len(),
        path.display(),
        history.groups.len(),
        history.as_of
    );
    Ok(history)
}

fn handle_trips(args: InputArgs) -> Result<()> {
    let history = load_history(&args)?;
    let mut out = io::stdout().lock();
    print_lines(&mut out, &grouped_trips_lines(&history.groups))?;
    Ok(())
}

fn handle_stays(args: InputArgs) -> Result<()> {
    let history = load_history(&args)?;
    let mut out = io::stdout().lock();
    print_lines(&mut out, &stays_lines(&history.rows))?;
    print_lines(&mut out, &superlative_lines(&history.rows)?)?;
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<()> {
    let history = load_history(&args.input)?;

    if !args.no_plot {
        let style = match args.style.as_ref() {
            Some(path) => load_style(path)?,
            None => ChartStyle::default(),
        };
        let doc = layout_chart(&history.rows, &style)?;
        debug!(
            "Chart layout: {}x{} px, {} boxes",
            doc.width,
            doc.height,
            doc.boxes.len()
        );

        let mut targets = vec![(args.svg.clone(), ChartKind::Svg)];
        if let Some(path) = args.png.as_ref() {
            targets.push((path.clone(), ChartKind::Png));
        }
        render_charts(&doc, &targets);
    }

    if let Some(path) = args.json.as_ref() {
        write_history_json(&history, path)?;
        info!("Wrote history JSON: {}", path.display());
    }

    if let Some(path) = args.rows_csv.as_ref() {
        if path.as_os_str() == "-" {
            write_rows_csv(&history.rows, io::stdout().lock())?;
        } else {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_rows_csv(&history.rows, file)?;
            info!("Wrote rows CSV: {}", path.display());
        }
    }

    let mut out = io::stdout().lock();
    print_report(&mut out, &history, args.all)?;
    Ok(())
}

/// Render every target, logging failures; returns how many charts were written.
fn render_charts(doc: &ChartDocument, targets: &[(PathBuf, ChartKind)]) -> usize {
    let mut written = 0;
    for (path, kind) in targets {
        match render_chart_guard(doc, path, *kind) {
            Ok(()) => {
                info!("Wrote chart: {}", path.display());
                written += 1;
            }
            Err(err) => warn!("Skipping chart render ({}): {}", path.display(), err),
        }
    }
    written
}

fn print_report<W: Write>(out: &mut W, history: &StayHistory, all: bool) -> Result<()> {
    if all {
        print_lines(out, &grouped_trips_lines(&history.groups))?;
        print_lines(out, &stays_lines(&history.rows))?;
        print_lines(out, &superlative_lines(&history.rows)?)?;
    }
    print_lines(out, &top_home_stays_lines(&history.rows)?)?;
    match comparable_home_lines(&history.rows) {
        Ok(lines) => print_lines(out, &lines)?,
        Err(StaysError::NoComparableStay) => {
            let current = history
                .rows
                .last()
                .map(|row| row.home.duration_days)
                .unwrap_or_default();
            writeln!(
                out,
                "No earlier home stay equal to or greater than current {} days home.",
                current
            )?;
            writeln!(out)?;
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn print_lines<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn load_style(path: &Path) -> Result<ChartStyle> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read chart style {}", path.display()))?;
    let style: ChartStyle = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid chart style", path.display()))?;
    if style.box_size == 0 {
        return Err(anyhow!("chart style box_size must be > 0"));
    }
    Ok(style)
}

fn write_history_json(history: &StayHistory, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, history)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn write_rows_csv<W: Write>(rows: &[IntervalRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "trip_start",
        "trip_end",
        "trip_days",
        "home_start",
        "home_end",
        "home_days",
    ])?;
    let date_cell = |date: Option<NaiveDate>| date.map(|d| d.to_string()).unwrap_or_default();
    for row in rows {
        writer.write_record([
            row.trip.start.to_string(),
            row.trip.end.to_string(),
            row.trip.duration_days.to_string(),
            date_cell(row.home.start),
            date_cell(row.home.end),
            row.home.duration_days.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Clone, Copy, Debug)]
enum ChartKind {
    Png,
    Svg,
}

fn render_chart_guard(doc: &ChartDocument, path: &Path, kind: ChartKind) -> Result<(), String> {
    let render = || -> Result<(), String> {
        render_chart(doc, path, kind).map_err(|e| format!("plotting error: {}", e))
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
}

fn render_chart(doc: &ChartDocument, path: &Path, kind: ChartKind) -> Result<()> {
    let size = (u32::try_from(doc.width)?, u32::try_from(doc.height)?);
    match kind {
        ChartKind::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;
            draw_day_boxes(&root, doc)?;
        }
        ChartKind::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_day_boxes(&root, doc)?;
        }
    }
    Ok(())
}

fn draw_day_boxes<DB>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    doc: &ChartDocument,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    for day in &doc.boxes {
        let x0 = i32::try_from(day.x)?;
        let y0 = i32::try_from(day.y)?;
        let corners = [
            (x0, y0),
            (x0 + i32::try_from(day.width)?, y0 + i32::try_from(day.height)?),
        ];
        area.draw(&Rectangle::new(corners, rgb(day.fill).filled()))?;
        if day.stroke_width > 0 {
            let stroke = ShapeStyle {
                color: rgb(day.stroke).to_rgba(),
                filled: false,
                stroke_width: day.stroke_width,
            };
            area.draw(&Rectangle::new(corners, stroke))?;
        }
    }
    area.present()?;
    Ok(())
}

fn rgb(color: HexColor) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use days_home::RawStay;

    fn history() -> StayHistory {
        let raw = vec![
            RawStay::new("Oslo", "2", "2024-01-05"),
            RawStay::new("Bergen", "1", "2024-01-06"),
            RawStay::new("Oslo", "1", "2024-01-07"),
        ];
        let stays = normalize_stays(&raw).unwrap();
        build_history(&stays, &Params::default(), parse_date("2024-01-10").unwrap()).unwrap()
    }

    #[test]
    fn as_of_dates_must_be_iso() {
        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_date("01/03/2024").is_err());
    }

    #[test]
    fn rows_csv_leaves_missing_home_dates_blank() {
        let mut history = history();
        history.rows[0].home.start = None;
        history.rows[0].home.end = None;
        let mut buf = Vec::new();
        write_rows_csv(&history.rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "trip_start,trip_end,trip_days,home_start,home_end,home_days"
        );
        assert_eq!(lines[1], "2024-01-03,2024-01-07,5,,,3");
    }

    #[test]
    fn svg_chart_contains_a_rect_per_box() {
        let history = history();
        let doc = layout_chart(&history.rows, &ChartStyle::default()).unwrap();
        let path = std::env::temp_dir().join(format!("days_home_{}.svg", std::process::id()));
        render_chart_guard(&doc, &path, ChartKind::Svg).unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert!(svg.contains("<svg"));
        // One filled and one stroked rect per day box.
        assert_eq!(svg.matches("<rect").count(), doc.boxes.len() * 2);
    }

    #[test]
    fn report_continues_when_current_home_is_a_record() {
        let raw = vec![
            RawStay::new("Rome", "2", "2024-01-05"),
            RawStay::new("Oslo", "1", "2024-03-01"),
        ];
        let stays = normalize_stays(&raw).unwrap();
        let history =
            build_history(&stays, &Params::default(), parse_date("2024-06-01").unwrap()).unwrap();

        let mut buf = Vec::new();
        print_report(&mut buf, &history, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Top home stays:",
                "#1:\tSat 02 Mar 2024 - Sat 01 Jun 2024 (92 days)",
                "",
                "No earlier home stay equal to or greater than current 92 days home.",
                "",
            ]
        );
    }

    #[test]
    fn report_with_all_sections_prints_trips_first() {
        let mut buf = Vec::new();
        print_report(&mut buf, &history(), true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(
            "Wed 03 Jan 2024 - Sun 07 Jan 2024\n   Oslo\n   Bergen\n   Oslo\n"
        ));
        assert!(text.contains("Max trip: "));
        assert!(text.contains("Top home stays:\n"));
    }

    #[test]
    fn unwritable_chart_target_is_skipped() {
        let history = history();
        let doc = layout_chart(&history.rows, &ChartStyle::default()).unwrap();
        let missing_dir =
            std::env::temp_dir().join(format!("days_home_missing_{}", std::process::id()));
        let target = missing_dir.join("chart.svg");

        assert!(render_chart_guard(&doc, &target, ChartKind::Svg).is_err());
        assert_eq!(render_charts(&doc, &[(target.clone(), ChartKind::Svg)]), 0);
        assert!(!target.exists());
    }

    #[test]
    fn style_file_must_have_positive_box_size() {
        let path =
            std::env::temp_dir().join(format!("days_home_style_{}.json", std::process::id()));
        fs::write(&path, r#"{"box_size": 0}"#).unwrap();
        let result = load_style(&path);
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }
}
