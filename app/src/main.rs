use std::{
    fmt::Display,
    io::{
        self,
        BufRead,
        IsTerminal,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use anyhow::{
    anyhow,
    bail,
    Context,
    Result,
};
use clap::Parser;
use time::OffsetDateTime;
use tracing::{
    debug,
    info,
    warn,
};
use tracing_subscriber::{
    filter::LevelFilter,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use wrapped_services::{
    discover_exports,
    load_export,
    report::{
        spotify_sheets,
        tiktok_sheets,
        write_workbook,
        SheetLayout,
        SPOTIFY_REPORT,
        TIKTOK_REPORT,
    },
    service::SpotifyListen,
    stats::{
        available_years,
        filter_plays,
        summarize,
        top_artists,
        top_tracks,
        Period,
        PlayFilter,
    },
    ExportKind,
    ImportData::{
        self,
        Spotify,
        TikTok,
    },
    Play,
};

use crate::args::{
    Args,
    Service,
    SpotifyArgs,
};

mod args;
mod display;


fn print_err<E: Display>(e: E) {
    eprintln!("{e:#}");
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("WRAPPED_LOG")
                .from_env_lossy(),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse_from(wild::args_os());
    init_logging();
    debug!(?args, "Parsed arguments");

    let files = if args.files.is_empty() {
        discover_exports(&args.data_dir).with_context(|| "Pass export files explicitly or use --data-dir".to_owned())?
    } else {
        args.files.clone()
    };

    let exports: Vec<ImportData> = files
        .iter()
        .filter(|p| {
            let other = ExportKind::of(p).is_some_and(|k| k.is_spotify() != args.service.is_spotify());
            if other {
                warn!(path = %p.display(), "Ignoring file, not a {} export", args.service.name());
            }
            !other
        })
        .filter_map(|p| load_export(p).with_context(|| p.display().to_string()).map_err(print_err).ok())
        .collect();

    match &args.service {
        Service::Spotify(spotify) => run_spotify(&args, spotify, exports),
        Service::TikTok => run_tiktok(&args, exports),
    }
}

fn run_spotify(args: &Args, spotify: &SpotifyArgs, exports: Vec<ImportData>) -> Result<()> {
    let listens: Vec<SpotifyListen> = exports
        .into_iter()
        .flat_map(|data| match data {
            Spotify(listens) => listens,
            TikTok(_) => Vec::new(),
        })
        .collect();
    if listens.is_empty() {
        bail!("No Spotify listening history could be loaded");
    }

    let filter = PlayFilter {
        min_play_ms: spotify.min_play_time * 1000,
        before: args.before.map(OffsetDateTime::unix_timestamp),
        after: args.after.map(OffsetDateTime::unix_timestamp),
    };
    let loaded = listens.len();
    let plays = filter_plays(listens.into_iter().map(Play::from), &filter);
    info!(loaded, kept = plays.len(), "Filtered plays");
    if plays.is_empty() {
        bail!("None of the {loaded} loaded plays match the filters");
    }

    let years = available_years(&plays);
    let period = match spotify.period {
        Some(period) => period,
        None if io::stdin().is_terminal() => prompt_period(&years)?,
        None => Period::All,
    };

    let selected = period.select(&plays);
    println!("{}\n", display::summary(period, &summarize(selected.iter().copied())));
    println!("{}\n", display::top_tracks(period, spotify.top, &top_tracks(selected.iter().copied(), spotify.top)));
    println!("{}\n", display::top_artists(period, spotify.top, &top_artists(selected, spotify.top)));

    export(&spotify_sheets(&plays, &years, spotify.export_top), args.output.as_deref(), SPOTIFY_REPORT)
}

fn run_tiktok(args: &Args, exports: Vec<ImportData>) -> Result<()> {
    let mut tiktok = exports.into_iter().filter_map(|data| match data {
        TikTok(data) => Some(data),
        Spotify(_) => None,
    });
    let data = tiktok.next().context("No TikTok export could be loaded")?;
    if tiktok.next().is_some() {
        warn!(used = %data.source, "Several TikTok exports given, only the first is used");
    }
    if args.before.is_some() || args.after.is_some() {
        warn!("--before/--after only apply to Spotify plays");
    }

    let insights = data.insights();
    println!("{}\n", display::insights(&insights));

    export(&tiktok_sheets(&insights, &data.detail_tables()), args.output.as_deref(), TIKTOK_REPORT)
}

fn export(sheets: &[SheetLayout], output: Option<&Path>, default: &str) -> Result<()> {
    let path = output.map_or_else(|| PathBuf::from(default), Path::to_path_buf);
    write_workbook(sheets, &path).with_context(|| format!("Failed to write report {}", path.display()))?;
    println!("Report saved to {}", path.display());
    Ok(())
}


fn period_options(years: &[i32]) -> Vec<Period> {
    std::iter::once(Period::All).chain(years.iter().copied().map(Period::Year)).collect()
}

fn prompt_period(years: &[i32]) -> Result<Period> {
    let options = period_options(years);
    println!("Select a period:");
    for (i, period) in options.iter().enumerate() {
        println!("  {i}. {period}");
    }
    print!("Choice [0-{}]: ", options.len() - 1);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    choose_period(&options, &answer)
}

fn choose_period(options: &[Period], answer: &str) -> Result<Period> {
    let answer = answer.trim();
    let index: usize = answer.parse().with_context(|| format!("Invalid choice '{answer}'"))?;
    options.get(index).copied().ok_or_else(|| anyhow!("Choice {index} is out of range 0-{}", options.len() - 1))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_menu() {
        let options = period_options(&[2024, 2023]);
        assert_eq!(options, [Period::All, Period::Year(2024), Period::Year(2023)]);

        assert_eq!(choose_period(&options, "0\n").unwrap(), Period::All);
        assert_eq!(choose_period(&options, " 2 ").unwrap(), Period::Year(2023));
        assert!(choose_period(&options, "3").is_err());
        assert!(choose_period(&options, "-1").is_err());
        assert!(choose_period(&options, "2024").is_err());
        assert!(choose_period(&options, "").is_err());
    }
}
