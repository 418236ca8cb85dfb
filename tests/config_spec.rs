use std::collections::HashMap;
use std::time::Duration;

use clap::Parser;
use release_monitor::config::*;
use release_monitor::models::StatusFilter;
use speculate2::speculate;

fn args(extra: &[&str]) -> Args {
    let mut argv = vec!["release-monitor"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).expect("Failed to parse args")
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let out = dir.path().to_string_lossy().into_owned();
        let env: HashMap<&str, &str> = HashMap::from([
            (USER_ENV, "monitor"),
            (PASSWORD_ENV, "secret"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());
    }

    describe "argument parsing" {
        it "applies defaults" {
            let args = args(&["-r", "220519A00"]);
            assert_eq!(args.output_dir, std::path::PathBuf::from("."));
            assert!(!args.keep_files);
            assert_eq!(args.run_hours, 1.0);
            assert_eq!(args.wait_minutes, 3);
            assert_eq!(args.server, ServerPreset::Prod);
        }

        it "accepts every flag" {
            let args = args(&["-o", &out, "-k", "-r", "R1", "--hours", "0.5", "-w", "5", "--server", "atz"]);
            assert!(args.keep_files);
            assert_eq!(args.run_hours, 0.5);
            assert_eq!(args.wait_minutes, 5);
            assert_eq!(args.server, ServerPreset::Atz);
        }

        it "requires a release title" {
            assert!(Args::try_parse_from(["release-monitor", "-k"]).is_err());
        }
    }

    describe "MonitorConfig::from_args" {
        it "builds a config from valid input" {
            let config = MonitorConfig::from_args(args(&["-o", &out, "-r", "R1", "--hours", "2"]), lookup)
                .expect("valid config");

            assert_eq!(config.server_url, ServerPreset::Prod.url());
            assert_eq!(config.credentials.username, "monitor");
            assert_eq!(config.credentials.password, "secret");
            assert_eq!(config.run_for, Duration::from_secs(2 * 3600));
            assert_eq!(config.interval, Duration::from_secs(180));
            assert_eq!(config.groups, default_tag_groups());
        }

        it "lets the environment override the server url" {
            let lookup = |key: &str| match key {
                URL_ENV => Some("https://xlr.test".to_string()),
                other => env.get(other).map(|v| v.to_string()),
            };
            let config = MonitorConfig::from_args(args(&["-o", &out, "-r", "R1"]), lookup).unwrap();
            assert_eq!(config.server_url, "https://xlr.test");
        }

        it "requires both credentials" {
            let no_password = |key: &str| (key == USER_ENV).then(|| "monitor".to_string());
            assert_eq!(
                MonitorConfig::from_args(args(&["-o", &out, "-r", "R1"]), no_password).unwrap_err(),
                ConfigError::MissingEnv(PASSWORD_ENV)
            );
            assert_eq!(
                MonitorConfig::from_args(args(&["-o", &out, "-r", "R1"]), |_: &str| None).unwrap_err(),
                ConfigError::MissingEnv(USER_ENV)
            );
        }

        it "rejects a missing output directory" {
            let missing = dir.path().join("nope");
            let result = MonitorConfig::from_args(
                args(&["-o", &missing.to_string_lossy(), "-r", "R1"]),
                lookup,
            );
            assert_eq!(result.unwrap_err(), ConfigError::OutputDirMissing(missing));
        }

        it "rejects a blank title" {
            let result = MonitorConfig::from_args(args(&["-o", &out, "-r", " "]), lookup);
            assert_eq!(result.unwrap_err(), ConfigError::MissingTitle);
        }

        it "rejects negative hours and a zero interval" {
            let result = MonitorConfig::from_args(args(&["-o", &out, "-r", "R1", "--hours=-1"]), lookup);
            assert_eq!(result.unwrap_err(), ConfigError::InvalidHours(-1.0));
            let result = MonitorConfig::from_args(args(&["-o", &out, "-r", "R1", "-w", "0"]), lookup);
            assert_eq!(result.unwrap_err(), ConfigError::InvalidInterval);
        }

        it "rejects run times and intervals too large for a duration" {
            let result = MonitorConfig::from_args(args(&["-o", &out, "-r", "R1", "--hours", "1e300"]), lookup);
            assert_eq!(result.unwrap_err(), ConfigError::InvalidHours(1e300));
            let result = MonitorConfig::from_args(
                args(&["-o", &out, "-r", "R1", "-w", "18446744073709551615"]),
                lookup,
            );
            assert_eq!(result.unwrap_err(), ConfigError::InvalidInterval);
        }

        it "accepts the largest interval that still fits" {
            let minutes = (u64::MAX / 60).to_string();
            let config = MonitorConfig::from_args(args(&["-o", &out, "-r", "R1", "-w", &minutes]), lookup)
                .expect("valid config");
            assert_eq!(config.interval, Duration::from_secs(u64::MAX / 60 * 60));
        }
    }

    describe "tag groups" {
        it "reports failed releases for the three tags in order" {
            let groups = default_tag_groups();
            let tags: Vec<&str> = groups.iter().map(|g| g.tags[1].as_str()).collect();
            assert_eq!(tags, vec!["release", "applikationstests", "rollout"]);
            assert!(groups.iter().all(|g| g.tags[0] == "drb"));
            assert!(groups.iter().all(|g| g.statuses == StatusFilter::only_failed()));
            assert_eq!(groups[1].except_phases, vec!["TSTUX".to_string()]);
            assert_eq!(groups[2].except_phases, vec!["tstux - Qualitycheck".to_string()]);
        }

        it "turns a group into a search for the release title" {
            let query = default_tag_groups()[2].query("R1");
            assert_eq!(query.title, "R1");
            assert_eq!(query.tags, vec!["drb".to_string(), "rollout".to_string()]);
            assert_eq!(query.page_size, 15);
        }
    }
}
