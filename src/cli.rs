//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::{CsvAdapter, load_journal};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{Analysis, AnalysisConfig, SignalCounts};
use crate::domain::annotated_bar::AnnotatedBar;
use crate::domain::config_validation::{
    fee_rate_from_config, parse_windows, validate_analysis_config, validate_config,
    validate_costs_config, validate_sizing_config,
};
use crate::domain::error::TurtleError;
use crate::domain::indicator::IndicatorType;
use crate::domain::journal::{DailyProfit, JournalEntry, JournalOutcome, daily_series};
use crate::domain::position::{PositionPlan, SizingRules, size_position_with};
use crate::domain::profit::{FeeRate, TradeCalc, calculate_trade, convert_to_quote};
use crate::domain::signal::Signal;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(
    name = "turtletrader",
    about = "Turtle breakout signals, ATR position sizing and trade profit"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annotate a symbol's history with TR/ATR, moving averages and signals
    Analyze {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trading capital for the sizing plan (overrides [sizing] capital)
        #[arg(long)]
        capital: Option<f64>,
        /// Number of most recent rows to print
        #[arg(short, long, default_value_t = 20)]
        rows: usize,
        #[arg(long)]
        json: bool,
    },
    /// Compute a unit size and entry ladder
    Size {
        #[arg(long)]
        capital: Option<f64>,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        atr: f64,
        #[arg(long)]
        base_price: Option<f64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Profit of a completed trade after fees, in base and converted currency
    Profit {
        #[arg(long)]
        buy: f64,
        #[arg(long)]
        sell: f64,
        #[arg(long)]
        shares: f64,
        /// Fee per leg as a fraction (0.016 = 1.6%)
        #[arg(long)]
        fee_rate: Option<f64>,
        #[arg(long)]
        fx_rate: Option<f64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a profit journal and print the daily profit series
    Journal {
        #[arg(short, long)]
        entries: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Fee and FX settings shared by the profit calculator and reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeCosts {
    pub fee_rate: FeeRate,
    pub fx_rate: f64,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            symbol,
            data_dir,
            config,
            capital,
            rows,
            json,
        } => run_analyze(&symbol, data_dir.as_deref(), config.as_deref(), capital, rows, json),
        Command::Size {
            capital,
            price,
            atr,
            base_price,
            config,
            json,
        } => run_size(capital, price, atr, base_price, config.as_deref(), json),
        Command::Profit {
            buy,
            sell,
            shares,
            fee_rate,
            fx_rate,
            config,
            json,
        } => run_profit(buy, sell, shares, fee_rate, fx_rate, config.as_deref(), json),
        Command::Journal { entries, json } => run_journal(&entries, json),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir, config } => {
            run_list_symbols(data_dir.as_deref(), config.as_deref())
        }
    }
}

fn fail(err: &TurtleError) -> ExitCode {
    error!("{err}");
    err.into()
}

/// Loads the config file if one was given, otherwise an empty config so
/// every setting takes its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, TurtleError> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn to_usize(section: &str, key: &str, value: i64) -> Result<usize, TurtleError> {
    usize::try_from(value).map_err(|_| TurtleError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{value} is out of range"),
    })
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, TurtleError> {
    validate_analysis_config(config)?;
    let defaults = AnalysisConfig::default();

    let ma_windows = match config.get_string("analysis", "ma_windows") {
        Some(value) => parse_windows(&value)?,
        None => defaults.ma_windows,
    };

    Ok(AnalysisConfig {
        period: to_usize(
            "analysis",
            "period",
            config.get_int("analysis", "period", defaults.period as i64),
        )?,
        ma_windows,
        breakout_window: to_usize(
            "analysis",
            "breakout_window",
            config.get_int("analysis", "breakout_window", defaults.breakout_window as i64),
        )?,
        stop_multiplier: config.get_double("analysis", "stop_multiplier", defaults.stop_multiplier),
    })
}

pub fn build_sizing_rules(config: &dyn ConfigPort) -> Result<SizingRules, TurtleError> {
    validate_sizing_config(config)?;
    let defaults = SizingRules::default();
    Ok(SizingRules {
        risk_percent: config.get_double("sizing", "risk_percent", defaults.risk_percent),
        risk_multiplier: config.get_double("sizing", "risk_multiplier", defaults.risk_multiplier),
        max_units: to_usize(
            "sizing",
            "max_units",
            config.get_int("sizing", "max_units", defaults.max_units as i64),
        )?,
        unit_step_atr: config.get_double("sizing", "unit_step_atr", defaults.unit_step_atr),
    })
}

pub fn build_trade_costs(config: &dyn ConfigPort) -> Result<TradeCosts, TurtleError> {
    validate_costs_config(config)?;
    Ok(TradeCosts {
        fee_rate: fee_rate_from_config(config)?,
        fx_rate: config.get_double("costs", "fx_rate", 1.0),
    })
}

/// CLI flag first, then `[sizing] capital`.
pub fn resolve_capital(capital_override: Option<f64>, config: &dyn ConfigPort) -> Option<f64> {
    capital_override.or_else(|| config.get_double_opt("sizing", "capital"))
}

/// CLI flag first, then `[data] dir`, then `./data`.
pub fn resolve_data_dir(dir_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    dir_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub symbol: &'a str,
    pub latest_signal: Signal,
    pub latest_atr: Option<f64>,
    pub signal_counts: SignalCounts,
    pub capital: Option<f64>,
    pub plan: Option<PositionPlan>,
    /// Newest first.
    pub rows: Vec<&'a AnnotatedBar>,
}

/// Sizes a unit off the latest close and N when capital is known.
pub fn build_analysis_report<'a>(
    analysis: &'a Analysis,
    rules: &SizingRules,
    capital: Option<f64>,
    rows: usize,
) -> AnalysisReport<'a> {
    let plan = match (capital, analysis.latest(), analysis.latest_atr()) {
        (Some(capital), Some(latest), Some(atr)) => {
            size_position_with(rules, capital, latest.bar.close, atr, None)
        }
        (Some(_), _, None) => {
            warn!(
                symbol = %analysis.symbol,
                "no ATR on the latest bar, skipping position sizing"
            );
            None
        }
        _ => None,
    };

    AnalysisReport {
        symbol: &analysis.symbol,
        latest_signal: analysis.latest_signal(),
        latest_atr: analysis.latest_atr(),
        signal_counts: analysis.signal_counts(),
        capital,
        plan,
        rows: analysis.recent(rows).collect(),
    }
}

/// Load, analyze and print one symbol from any [`DataPort`].
pub fn run_analysis_pipeline(
    data_port: &dyn DataPort,
    symbol: &str,
    config: &AnalysisConfig,
    rules: &SizingRules,
    capital: Option<f64>,
    rows: usize,
    json: bool,
) -> ExitCode {
    let symbol = symbol.trim().to_uppercase();
    let bars = match data_port.load(&symbol) {
        Ok(bars) => bars,
        Err(e) => return fail(&e),
    };
    info!("Loaded {} bars for {}", bars.len(), symbol);

    let analysis = match Analysis::require(&symbol, &bars, config) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    let report = build_analysis_report(&analysis, rules, capital, rows);
    if json {
        return print_json(&report);
    }

    print!("{}", format_analysis_table(&report.rows, config));
    println!();
    print!("{}", format_summary(&report));
    ExitCode::SUCCESS
}

pub fn run_analyze(
    symbol: &str,
    data_dir: Option<&Path>,
    config_path: Option<&Path>,
    capital_override: Option<f64>,
    rows: usize,
    json: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let (config, rules) = match build_analysis_config(&adapter)
        .and_then(|config| Ok((config, build_sizing_rules(&adapter)?)))
    {
        Ok(built) => built,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &adapter));
    let capital = resolve_capital(capital_override, &adapter);
    run_analysis_pipeline(&data_port, symbol, &config, &rules, capital, rows, json)
}

pub fn run_size(
    capital_override: Option<f64>,
    price: f64,
    atr: f64,
    base_price: Option<f64>,
    config_path: Option<&Path>,
    json: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let rules = match build_sizing_rules(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let Some(capital) = resolve_capital(capital_override, &adapter) else {
        return fail(&TurtleError::ConfigMissing {
            section: "sizing".into(),
            key: "capital".into(),
        });
    };

    let Some(plan) = size_position_with(&rules, capital, price, atr, base_price) else {
        return fail(&TurtleError::InvalidInput {
            field: "capital/price/atr".into(),
            reason: "enter positive values for capital, price, ATR and base price".into(),
        });
    };

    if json {
        return print_json(&plan);
    }
    print!("{}", format_plan(&plan));
    ExitCode::SUCCESS
}

pub fn run_profit(
    buy: f64,
    sell: f64,
    shares: f64,
    fee_rate: Option<f64>,
    fx_rate: Option<f64>,
    config_path: Option<&Path>,
    json: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let mut costs = match build_trade_costs(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    if let Some(rate) = fee_rate {
        costs.fee_rate = match FeeRate::try_from_fraction(rate) {
            Ok(rate) => rate,
            Err(e) => return fail(&e),
        };
    }
    if let Some(rate) = fx_rate {
        costs.fx_rate = rate;
    }

    match calculate_trade(buy, sell, shares, costs.fee_rate, costs.fx_rate) {
        Ok(calc) if json => print_json(&calc),
        Ok(calc) => {
            print!("{}", format_trade(&calc, &costs));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[derive(Debug, Serialize)]
pub struct JournalReport {
    pub entries: Vec<JournalRow>,
    pub daily: Vec<DailyProfit>,
}

#[derive(Debug, Serialize)]
pub struct JournalRow {
    #[serde(flatten)]
    pub entry: JournalEntry,
    #[serde(flatten)]
    pub outcome: JournalOutcome,
}

pub fn build_journal_report(entries: Vec<JournalEntry>) -> Result<JournalReport, TurtleError> {
    let entries = entries
        .into_iter()
        .map(|entry| {
            let outcome = entry.evaluate()?;
            Ok(JournalRow { entry, outcome })
        })
        .collect::<Result<Vec<_>, TurtleError>>()?;
    let daily = daily_series(entries.iter().map(|row| (&row.entry, &row.outcome)));
    Ok(JournalReport { entries, daily })
}

pub fn run_journal(path: &Path, json: bool) -> ExitCode {
    info!("Loading journal from {}", path.display());
    let report = match load_journal(path).and_then(build_journal_report) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if json {
        return print_json(&report);
    }
    print!("{}", format_journal(&report));
    ExitCode::SUCCESS
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(Some(config_path)) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(&e);
    }

    let config = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    println!(
        "ATR period {}, breakout window {}, moving averages {:?}, stop {}x ATR",
        config.period, config.breakout_window, config.ma_windows, config.stop_multiplier
    );
    println!("Minimum history: {} bars", config.min_history());
    info!("Configuration is valid");
    ExitCode::SUCCESS
}

pub fn run_list_symbols(data_dir: Option<&Path>, config_path: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &adapter));

    match data_port.list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            warn!("No symbols found");
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            info!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("failed to serialize output: {e}");
            ExitCode::from(1)
        }
    }
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn opt_pct(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!(" ({v:+.2}%)"))
}

pub fn format_analysis_table(rows: &[&AnnotatedBar], config: &AnalysisConfig) -> String {
    let mut out = String::new();
    let mut header = vec![
        "Date".to_string(),
        "High".to_string(),
        "Low".to_string(),
        "Close".to_string(),
        IndicatorType::TrueRange.to_string(),
        IndicatorType::Atr(config.period).to_string(),
        "Signal".to_string(),
        IndicatorType::ChannelHigh(config.breakout_window).to_string(),
        IndicatorType::ChannelLow(config.breakout_window).to_string(),
        format!("Stop({}N)", config.stop_multiplier),
    ];
    header.extend(
        config
            .ma_windows
            .iter()
            .map(|w| IndicatorType::Sma(*w).to_string()),
    );
    let _ = writeln!(out, "{}", header.join("\t"));

    for row in rows {
        let mut cells = vec![
            row.bar.date.to_string(),
            format!("{:.2}", row.bar.high),
            format!("{:.2}", row.bar.low),
            format!("{:.2}{}", row.bar.close, opt_pct(row.change_pct)),
            format!("{:.2} ({:.1}%)", row.tr, row.tr_pct_of_close()),
            match (row.atr, row.atr_pct_of_close()) {
                (Some(atr), Some(pct)) => format!("{atr:.2} ({pct:.1}%)"),
                _ => "-".to_string(),
            },
            row.signal.to_string(),
            opt(row.channel_high),
            opt(row.channel_low),
            opt(row.stop_loss),
        ];
        cells.extend(config.ma_windows.iter().map(|w| opt(row.ma(*w))));
        let _ = writeln!(out, "{}", cells.join("\t"));
    }
    out
}

pub fn format_summary(report: &AnalysisReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", report.symbol);
    let _ = writeln!(out, "Signal:           {}", report.latest_signal);
    let _ = writeln!(out, "N (ATR):          {}", opt(report.latest_atr));
    let _ = writeln!(
        out,
        "History:          {} buy / {} sell / {} hold",
        report.signal_counts.buy, report.signal_counts.sell, report.signal_counts.hold
    );
    if let Some(latest) = report.rows.first() {
        let _ = writeln!(out, "Close:            {:.2}", latest.bar.close);
        let _ = writeln!(out, "Stop loss:        {}", opt(latest.stop_loss));
    }
    match (&report.plan, report.capital) {
        (Some(plan), _) => {
            let _ = writeln!(out);
            out.push_str(&format_plan(plan));
        }
        (None, Some(_)) => {
            let _ = writeln!(out, "Sizing:           not enough history for N");
        }
        (None, None) => {}
    }
    out
}

pub fn format_plan(plan: &PositionPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "1% of capital:    {:.2}", plan.one_percent_of_capital);
    let _ = writeln!(out, "Risk per share:   {:.2}", plan.risk_per_unit);
    let _ = writeln!(out, "Unit size:        {}", plan.unit_count);
    let _ = writeln!(out, "Unit\tEntry\tStop\tLoss");
    for entry in &plan.ladder {
        let _ = writeln!(
            out,
            "{}\t{:.2}\t{:.2}\t{:.2}%",
            entry.unit_index,
            entry.entry_price,
            entry.stop_loss,
            entry.loss_pct()
        );
    }
    out
}

pub fn format_trade(calc: &TradeCalc, costs: &TradeCosts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total investment: {:.2}", calc.total_investment);
    let _ = writeln!(
        out,
        "Fees ({:.3}%):    {:.2}",
        costs.fee_rate.percent(),
        calc.total_fees
    );
    let _ = writeln!(out, "Net profit:       {:.2}", calc.net_profit_base);
    let _ = writeln!(out, "Profit rate:      {:.2}%", calc.profit_rate_pct);
    let _ = writeln!(
        out,
        "Net profit (x{}): {:.0}",
        costs.fx_rate, calc.net_profit_converted
    );
    if let Ok(invested) = convert_to_quote(calc.total_investment, costs.fx_rate) {
        let _ = writeln!(out, "Investment (x{}): {:.0}", costs.fx_rate, invested);
    }
    out
}

pub fn format_journal(report: &JournalReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Symbol\tBuy date\tSell date\tStatus\tFees\tNet\tRate");
    for row in &report.entries {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{:?}\t{:.2}\t{}\t{}",
            row.entry.symbol,
            row.entry.buy_date,
            row.entry
                .sell_date
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
            row.outcome.status,
            row.outcome.total_fees,
            opt(row.outcome.net_profit),
            row.outcome
                .profit_rate_pct
                .map_or_else(|| "-".to_string(), |r| format!("{r:.2}%")),
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Date\tProfit\tCumulative");
    for day in &report.daily {
        let _ = writeln!(
            out,
            "{}\t{:.2}%\t{:.2}%",
            day.date, day.profit, day.cumulative
        );
    }
    out
}
