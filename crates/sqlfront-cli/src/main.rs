use std::env;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bumpalo::Bump;
use serde::Serialize;
use sqlfront_error::FrontendError;
use sqlfront_parser::{Parser, parse_metrics_snapshot};
use sqlfront_types::{Cx, ParseLimits};
use tracing::{Level, debug};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Parse,
    Tokens,
    Expr,
}

#[derive(Debug)]
struct CliConfig {
    mode: Mode,
    sql: Option<String>,
    limits: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
}

#[derive(Serialize)]
struct TokenRow<'a> {
    offset: usize,
    len: usize,
    kind: &'static str,
    reserved: bool,
    text: &'a str,
}

fn print_help() {
    let help = "\
sqlfront: tokenize or parse SQL text

USAGE:
    sqlfront [OPTIONS]

OPTIONS:
    -c <SQL>                   SQL text (default: read stdin)
    --tokens                   Print the token stream instead of statements
    --expr                     Compile the input as a single expression
    --limits <PATH>            TOML file with parse limits
    --json                     Emit machine-readable JSON output
    -v, --verbose              Log at DEBUG level on stderr
    -h, --help                 Show this help
";
    println!("{help}");
}

fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let mut config = CliConfig {
        mode: Mode::Parse,
        sql: None,
        limits: None,
        json_output: false,
        verbose: false,
    };

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "-c" => {
                index += 1;
                if index >= args.len() {
                    return Err("-c requires a value".to_owned());
                }
                config.sql = Some(args[index].clone());
            }
            "--limits" => {
                index += 1;
                if index >= args.len() {
                    return Err("--limits requires a value".to_owned());
                }
                config.limits = Some(PathBuf::from(&args[index]));
            }
            "--tokens" => config.mode = Mode::Tokens,
            "--expr" => config.mode = Mode::Expr,
            "--json" => config.json_output = true,
            "-v" | "--verbose" => config.verbose = true,
            "-h" | "--help" => {
                print_help();
                return Err(String::new());
            }
            unknown => return Err(format!("unknown option: {unknown}")),
        }
        index += 1;
    }

    Ok(config)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // Keep the first subscriber if one is already installed.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn to_json<T: Serialize>(value: &T) -> Result<String, FrontendError> {
    serde_json::to_string_pretty(value)
        .map_err(|error| FrontendError::internal(format!("json encoding failed: {error}")))
}

fn run(config: &CliConfig, sql: &str, out: &mut impl Write) -> Result<(), FrontendError> {
    let limits = match &config.limits {
        Some(path) => ParseLimits::load(path)?,
        None => ParseLimits::default(),
    };
    let parser = Parser::new(limits);
    let cx = Cx::new();

    match config.mode {
        Mode::Tokens => {
            let rows: Vec<TokenRow<'_>> = parser
                .tokenize(sql)
                .map(|token| TokenRow {
                    offset: token.offset,
                    len: token.len(),
                    kind: token.kind.as_str(),
                    reserved: token.is_reserved,
                    text: sql.get(token.offset..token.end()).unwrap_or(""),
                })
                .collect();
            if config.json_output {
                writeln!(out, "{}", to_json(&rows)?)?;
            } else {
                for row in &rows {
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}\t{:?}",
                        row.offset, row.len, row.kind, row.reserved, row.text
                    )?;
                }
            }
        }
        Mode::Parse => {
            let statements = parser.parse_all(&cx, sql)?;
            if config.json_output {
                writeln!(out, "{}", to_json(&statements)?)?;
            } else {
                for prepared in &statements {
                    writeln!(out, "{:#?}", prepared.stmt)?;
                }
            }
        }
        Mode::Expr => {
            let arena = Bump::new();
            let expr = parser.compile_expression(&cx, &arena, sql.trim_end())?;
            if config.json_output {
                writeln!(out, "{}", to_json(&expr)?)?;
            } else {
                writeln!(out, "{expr}")?;
            }
        }
    }

    debug!(metrics = ?parse_metrics_snapshot(), "done");
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(error) if error.is_empty() => return ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::from(2);
        }
    };
    init_logging(config.verbose);

    let sql = match &config.sql {
        Some(sql) => sql.clone(),
        None => {
            let mut buf = String::new();
            if let Err(error) = io::stdin().read_to_string(&mut buf) {
                eprintln!("error: reading stdin: {error}");
                return ExitCode::from(2);
            }
            buf
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&config, &sql, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            if let Some(hint) = error.suggestion() {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn run_to_string(config: &CliConfig, sql: &str) -> Result<String, FrontendError> {
        let mut out = Vec::new();
        run(config, sql, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn parses_flags() {
        let config = parse_args(&args(&["--tokens", "--json", "-c", "SELECT 1", "-v"]))
            .expect("valid args");
        assert_eq!(config.mode, Mode::Tokens);
        assert!(config.json_output && config.verbose);
        assert_eq!(config.sql.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn rejects_unknown_and_missing_values() {
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert_eq!(
            parse_args(&args(&["-c"])).unwrap_err(),
            "-c requires a value"
        );
    }

    #[test]
    fn token_listing() {
        let config = parse_args(&args(&["--tokens"])).expect("args");
        let out = run_to_string(&config, "SELECT x").expect("run");
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0\t6\tSELECT\ttrue\t\"SELECT\"");
        assert!(lines[2].starts_with("7\t1\tidentifier\t"));
    }

    #[test]
    fn json_statements() {
        let config = parse_args(&args(&["--json"])).expect("args");
        let out = run_to_string(&config, "BEGIN; COMMIT;").expect("run");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn expression_mode() {
        let config = parse_args(&args(&["--expr"])).expect("args");
        assert!(run_to_string(&config, "1 + 2\n").is_ok());
        let err = run_to_string(&config, "+").unwrap_err();
        assert!(matches!(err, FrontendError::ExpressionCompile { .. }));
    }

    #[test]
    fn limits_file_is_applied() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("limits.toml");
        std::fs::write(&path, "max_sql_length = 4\n").expect("write limits");
        let config = parse_args(&args(&["--limits", path.to_str().expect("path")]))
            .expect("args");
        let err = run_to_string(&config, "SELECT 1").unwrap_err();
        assert!(matches!(err, FrontendError::StatementTooLong { .. }));
        assert_eq!(err.exit_code(), 18);
    }
}
