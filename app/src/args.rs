use std::path::PathBuf;

use anyhow::Result;
use clap::{
    arg,
    ArgGroup,
    Args as _,
    Command,
    FromArgMatches as _,
    Parser,
};
use time::{
    format_description::{
        well_known::Rfc3339,
        FormatItem,
    },
    macros::format_description,
    Date,
    OffsetDateTime,
    PrimitiveDateTime,
    UtcOffset,
};
use tracing::debug;
use wrapped_services::stats::{
    Period,
    DEFAULT_MIN_PLAY_MS,
};

/// Summarize a Spotify or TikTok data export on the console and into an Excel workbook
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Only count plays before this date/time
    #[arg(short, long, value_parser = parse_datetime)]
    pub before: Option<OffsetDateTime>,

    /// Only count plays after this date/time
    #[arg(short, long, value_parser = parse_datetime)]
    pub after: Option<OffsetDateTime>,

    /// Directory searched for exports when no files are given
    #[arg(short, long, env = "WRAPPED_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Workbook to write [default: <service>_analysis_report.xlsx]
    #[arg(short, long, env = "WRAPPED_OUTPUT")]
    pub output: Option<PathBuf>,

    /// The service where the export came from
    #[command(flatten)]
    pub service: Service,

    /// Export archives or json files; found in the data directory when omitted
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub(crate) enum Service {
    Spotify(SpotifyArgs),
    TikTok,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Spotify(_) => "Spotify",
            Service::TikTok => "TikTok",
        }
    }

    pub fn is_spotify(&self) -> bool { matches!(self, Service::Spotify(_)) }
}

impl clap::Args for Service {
    fn augment_args(cmd: clap::Command) -> clap::Command {
        const HEADING: &str = "Services";
        cmd.group(ArgGroup::new("service").args(["spotify", "tiktok"]).required(true))
            .arg(
                arg!(--spotify)
                    .help_heading(HEADING)
                    .help("Analyze a spotify listening history export")
                    .long_help(r"my_spotify_data*.zip | Streaming_History_*.json | StreamingHistory\d*.json | endsong_\d+.json"),
            )
            .arg(
                arg!(--tiktok)
                    .help_heading(HEADING)
                    .help("Analyze a tiktok account data export")
                    .long_help(r"TikTok_Data_*.zip | user_data*.json"),
            )
            .args(
                SpotifyArgs::augment_args(Command::new(""))
                    .get_arguments()
                    .cloned()
                    .map(|sa| sa.conflicts_with("tiktok").help_heading("Spotify Options")),
            )
    }

    fn augment_args_for_update(cmd: clap::Command) -> clap::Command { Self::augment_args(cmd) }

    fn group_id() -> Option<clap::Id> { Some("service".into()) }
}

impl clap::FromArgMatches for Service {
    fn from_arg_matches(matches: &clap::ArgMatches) -> std::result::Result<Self, clap::Error> {
        if matches.get_flag("spotify") {
            Ok(Service::Spotify(SpotifyArgs::from_arg_matches(matches)?))
        } else if matches.get_flag("tiktok") {
            Ok(Self::TikTok)
        } else {
            Err(clap::Error::new(clap::error::ErrorKind::MissingRequiredArgument))
        }
    }

    fn update_from_arg_matches(&mut self, matches: &clap::ArgMatches) -> std::result::Result<(), clap::Error> {
        match self {
            Service::Spotify(ref mut a) => a.update_from_arg_matches(matches),
            Service::TikTok => Ok(()),
        }
    }
}

#[derive(clap::Args, Debug)]
pub(crate) struct SpotifyArgs {
    /// Minimum play time in seconds for a play to be counted
    #[arg(long, default_value_t = DEFAULT_MIN_PLAY_MS / 1000)]
    pub min_play_time: u64,

    /// Rows per ranking printed to the console
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Rows per ranking written to the workbook
    #[arg(long, default_value_t = wrapped_services::report::DEFAULT_EXPORT_TOP)]
    pub export_top: usize,

    /// `all` or a year; asked interactively when omitted
    #[arg(long)]
    pub period: Option<Period>,
}


/// RFC 3339, or a date with optional time in the local offset
fn parse_datetime(dt: &str) -> Result<OffsetDateTime> {
    const FMTS_DT: &[&[FormatItem]] = &[
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]"),
    ];
    const FMTS_DATE: &[&[FormatItem]] = &[format_description!("[year]-[month]-[day]")];

    OffsetDateTime::parse(dt, &Rfc3339).or_else(|e| {
        let local_tz = UtcOffset::current_local_offset().unwrap_or_else(|err| {
            debug!("Local offset unavailable, using UTC: {err}");
            UtcOffset::UTC
        });
        FMTS_DT
            .iter()
            .find_map(|fmt| PrimitiveDateTime::parse(dt, fmt).ok())
            .or_else(|| {
                FMTS_DATE
                    .iter()
                    .find_map(|fmt| Date::parse(dt, fmt).ok())
                    .and_then(|d| d.with_hms(0, 0, 0).ok())
            })
            .map(|pdt| pdt.assume_offset(local_tz))
            .ok_or(e.into())
    })
}


#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use time::macros::{
        date,
        datetime,
        time,
    };

    use super::*;

    #[test]
    fn verify_cli() { Args::command().debug_assert() }

    #[test]
    fn spotify_defaults() {
        let args = Args::try_parse_from(["wrapped-history", "--spotify", "a.json"]).unwrap();
        let Service::Spotify(spotify) = args.service else { panic!("expected spotify") };
        assert_eq!(spotify.min_play_time, 15);
        assert_eq!(spotify.top, 10);
        assert_eq!(spotify.export_top, 20);
        assert_eq!(spotify.period, None);
        assert_eq!(args.files, [PathBuf::from("a.json")]);
    }

    #[test]
    fn spotify_options() {
        let args = Args::try_parse_from(["wrapped-history", "--spotify", "--period", "2023", "--top", "5"]).unwrap();
        let Service::Spotify(spotify) = args.service else { panic!("expected spotify") };
        assert_eq!(spotify.period, Some(Period::Year(2023)));
        assert_eq!(spotify.top, 5);
        assert!(args.files.is_empty());
    }

    #[test]
    fn service_is_required_and_exclusive() {
        assert!(Args::try_parse_from(["wrapped-history"]).is_err());
        assert!(Args::try_parse_from(["wrapped-history", "--spotify", "--tiktok"]).is_err());
        assert!(Args::try_parse_from(["wrapped-history", "--tiktok", "--top", "5"]).is_err());
        assert!(Args::try_parse_from(["wrapped-history", "--tiktok", "--period", "all"]).is_err());
        assert!(Args::try_parse_from(["wrapped-history", "--tiktok"]).unwrap().service.name() == "TikTok");
    }

    #[test]
    fn datetime_formats() {
        assert_eq!(parse_datetime("2023-05-01T10:00:00+02:00").unwrap(), datetime!(2023-05-01 10:00 +2));

        let day = parse_datetime("2023-05-01").unwrap();
        assert_eq!((day.date(), day.time()), (date!(2023 - 05 - 01), time!(0:00)));

        let minute = parse_datetime("2023-05-01 18:30").unwrap();
        assert_eq!(minute.time(), time!(18:30));

        assert!(parse_datetime("yesterday").is_err());
    }
}
