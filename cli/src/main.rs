use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use log::{info, warn};
use logshare_analysis::{Aggregator, Share, TrafficReport, split_lines};

const DEFAULT_LOG_FILE: &str = "apache_combined.log.txt";

const USAGE: &str = "\
usage: logshare [PATH]

PATH is the access log to report on; it defaults to $LOG_FILE, then
apache_combined.log.txt. Options are read from the environment:
  REPORT_FORMAT=json   print the report as JSON
  IP_SHARE=85%         traffic share the listed IPs must cover
  HOUR_SHARE=70%       traffic share the listed hours must cover";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Report(Option<PathBuf>),
}

/// The only accepted argument is a path; `-h`/`--help` print usage.
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Command> {
    let mut path = None;
    for arg in args {
        if arg == "-h" || arg == "--help" {
            return Ok(Command::Help);
        }
        if arg.starts_with('-') {
            bail!("unknown option '{arg}'\n\n{USAGE}");
        }
        if path.is_some() {
            bail!("unexpected argument '{arg}'\n\n{USAGE}");
        }
        path = Some(PathBuf::from(arg));
    }
    Ok(Command::Report(path))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

struct Config {
    path: PathBuf,
    format: Format,
    ip_share: Share,
    hour_share: Share,
}

fn share_from_env(var: &str, default: Share) -> anyhow::Result<Share> {
    match std::env::var(var) {
        Ok(s) => s.parse::<Share>().with_context(|| format!("{var}={s}")),
        Err(_) => Ok(default),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = path
        .or_else(|| std::env::var("LOG_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let format = match std::env::var("REPORT_FORMAT").as_deref() {
        Ok("json") => Format::Json,
        _ => Format::Text,
    };
    Ok(Config {
        path,
        format,
        ip_share: share_from_env("IP_SHARE", Share::IP_DEFAULT)?,
        hour_share: share_from_env("HOUR_SHARE", Share::HOUR_DEFAULT)?,
    })
}

/// Stream the file through the aggregator one line at a time.
fn read_report(path: &Path, ip_share: Share, hour_share: Share) -> anyhow::Result<TrafficReport> {
    let file = File::open(path).with_context(|| format!("opening log file {}", path.display()))?;
    let mut br = BufReader::new(file);
    let mut buf = Vec::new();
    let mut agg = Aggregator::new();

    // read raw bytes so one bad byte does not end the report
    while br
        .read_until(b'\n', &mut buf)
        .with_context(|| format!("reading log file {}", path.display()))?
        != 0
    {
        // a chunk may hold several lines when the log uses bare CR endings
        for line in split_lines(&String::from_utf8_lossy(&buf)) {
            agg.feed_line(line);
        }
        buf.clear();
    }

    if agg.lines_skipped() > 0 {
        warn!(
            "{}: {} of {} lines did not look like access-log entries",
            path.display(),
            agg.lines_skipped(),
            agg.lines_read()
        );
    }
    Ok(TrafficReport::from_aggregator(agg, ip_share, hour_share))
}

fn quoted_list(keys: &[String]) -> String {
    let items: Vec<String> = keys.iter().map(|k| format!("'{k}'")).collect();
    format!("[{}]", items.join(", "))
}

fn write_text(out: &mut impl Write, report: &TrafficReport) -> io::Result<()> {
    writeln!(out, "IP Address Histogram:")?;
    writeln!(out, "IP Address            Occurrences")?;
    writeln!(out, "-----------------------------------")?;
    for (ip, count) in report.ips_by_count() {
        writeln!(out, "{ip:<20} | {count}")?;
    }

    writeln!(out, "\nHourly Traffic Histogram:")?;
    writeln!(out, "Hour  | Visitors")?;
    writeln!(out, "--------------------")?;
    for (hour, count) in report.hours_by_key() {
        writeln!(out, "{hour:<5} | {count}")?;
    }

    writeln!(out, "\nIPs contributing to {} of traffic:", report.ip_share)?;
    writeln!(out, "{}", quoted_list(&report.top_ips))?;

    writeln!(out, "\nHours contributing to {} of traffic:", report.hour_share)?;
    writeln!(out, "{}", quoted_list(&report.peak_hours))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Report(path) => path,
    };
    let cfg = load_config(path)?;
    info!("analyzing {}", cfg.path.display());

    let report = read_report(&cfg.path, cfg.ip_share, cfg.hour_share)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cfg.format {
        Format::Text => write_text(&mut out, &report)?,
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn log_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f
    }

    #[test]
    fn reads_file_and_counts_skips() {
        let f = log_file(
            b"10.0.0.1 - - [10/Oct/2023:13:55:36 -0700] \"GET /\" 200 1\n\
              broken\n\
              10.0.0.2 - - [10/Oct/2023:14:00:00 -0700] \"GET /\" 200 1",
        );
        let r = read_report(f.path(), Share::IP_DEFAULT, Share::HOUR_DEFAULT).unwrap();
        assert_eq!(r.lines_read, 3);
        assert_eq!(r.lines_skipped, 1);
        assert_eq!(r.total_requests(), 2);
    }

    #[test]
    fn invalid_utf8_does_not_abort() {
        let f = log_file(b"10.0.0.1 \xff\xfe [10/Oct/2023:13:55:36 -0700]\r\n");
        let r = read_report(f.path(), Share::IP_DEFAULT, Share::HOUR_DEFAULT).unwrap();
        assert_eq!(r.top_ips, vec!["10.0.0.1"]);
    }

    #[test]
    fn bare_cr_endings_split_into_lines() {
        let f = log_file(
            b"10.0.0.1 - - [10/Oct/2023:13:55:36 -0700]\r\
              10.0.0.2 - - [10/Oct/2023:14:00:00 -0700]\r",
        );
        let r = read_report(f.path(), Share::IP_DEFAULT, Share::HOUR_DEFAULT).unwrap();
        assert_eq!(r.lines_read, 2);
        assert_eq!(r.total_requests(), 2);
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn path_is_the_only_argument() {
        assert_eq!(parse_args(args(&[])).unwrap(), Command::Report(None));
        assert_eq!(
            parse_args(args(&["access.log"])).unwrap(),
            Command::Report(Some(PathBuf::from("access.log")))
        );
        assert_eq!(parse_args(args(&["--help"])).unwrap(), Command::Help);
        assert_eq!(parse_args(args(&["-h"])).unwrap(), Command::Help);
    }

    #[test]
    fn flags_are_not_taken_as_paths() {
        let err = parse_args(args(&["--json"])).unwrap_err();
        assert!(err.to_string().contains("unknown option '--json'"));
        assert!(err.to_string().contains("usage: logshare [PATH]"));
        assert!(parse_args(args(&["a.log", "b.log"])).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_report(Path::new("/no/such/access.log"), Share::IP_DEFAULT, Share::HOUR_DEFAULT)
            .unwrap_err();
        assert!(err.to_string().contains("/no/such/access.log"));
    }

    #[test]
    fn text_report_layout() {
        let f = log_file(
            b"10.0.0.2 - - [10/Oct/2023:14:00:00 -0700]\n\
              10.0.0.1 - - [10/Oct/2023:13:55:36 -0700]\n\
              10.0.0.1 - - [10/Oct/2023:13:56:36 -0700]\n",
        );
        let r = read_report(f.path(), Share::IP_DEFAULT, Share::HOUR_DEFAULT).unwrap();
        let mut out = Vec::new();
        write_text(&mut out, &r).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "\
IP Address Histogram:
IP Address            Occurrences
-----------------------------------
10.0.0.1             | 2
10.0.0.2             | 1

Hourly Traffic Histogram:
Hour  | Visitors
--------------------
13    | 2
14    | 1

IPs contributing to 85% of traffic:
['10.0.0.1', '10.0.0.2']

Hours contributing to 70% of traffic:
['13', '14']
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_report_prints_empty_lists() {
        let f = log_file(b"");
        let r = read_report(f.path(), Share::IP_DEFAULT, Share::HOUR_DEFAULT).unwrap();
        let mut out = Vec::new();
        write_text(&mut out, &r).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("IPs contributing to 85% of traffic:\n[]\n"));
        assert!(text.ends_with("Hours contributing to 70% of traffic:\n[]\n"));
    }
}
