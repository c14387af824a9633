use std::error::Error;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use docsim::{run_comparison, DocsimConfig, RunOptions};

const USAGE: &str =
    "usage: docsim <target> <source-dir> [--block-size N] [--out DIR] [--config FILE]";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{USAGE}");
        return;
    }

    if let Err(err) = run(&args) {
        eprintln!("docsim: {err}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let cli = CliArgs::parse(args)?;

    let config = match &cli.config_path {
        Some(path) => DocsimConfig::from_file(path)?,
        None => DocsimConfig::default(),
    };

    let options = RunOptions {
        target_path: cli.target,
        source_dir: cli.source_dir,
        output_root: cli
            .output_root
            .unwrap_or_else(|| config.output.root.clone()),
        block_size: cli.block_size.unwrap_or(config.comparison.block_size),
    };

    let run = run_comparison(&options, &config.tokenize.to_tokenize_config())
        .map_err(|err| format!("[{}] {err}", err.kind()))?;

    println!("run {} ({} pairs)", run.run_id, run.pairs.len());
    for pair in &run.pairs {
        println!("  [{}] {}  score {:.3}", pair.index, pair.source_name, pair.score);
    }
    println!(
        "artifacts: {}",
        options.output_root.join(&run.run_id).display()
    );
    Ok(())
}

#[derive(Debug)]
struct CliArgs {
    target: PathBuf,
    source_dir: PathBuf,
    output_root: Option<PathBuf>,
    block_size: Option<usize>,
    config_path: Option<PathBuf>,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut positional: Vec<PathBuf> = Vec::new();
        let mut output_root = None;
        let mut block_size = None;
        let mut config_path = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--out" => output_root = Some(PathBuf::from(flag_value(&mut iter, "--out")?)),
                "--config" => config_path = Some(PathBuf::from(flag_value(&mut iter, "--config")?)),
                "--block-size" => {
                    let raw = flag_value(&mut iter, "--block-size")?;
                    let parsed = raw
                        .parse()
                        .map_err(|_| format!("--block-size expects an integer, got {raw}"))?;
                    block_size = Some(parsed);
                }
                flag if flag.starts_with('-') => {
                    return Err(format!("unknown flag {flag}\n{USAGE}"));
                }
                value => positional.push(PathBuf::from(value)),
            }
        }

        let mut positional = positional.into_iter();
        match (positional.next(), positional.next(), positional.next()) {
            (Some(target), Some(source_dir), None) => Ok(Self {
                target,
                source_dir,
                output_root,
                block_size,
                config_path,
            }),
            _ => Err(USAGE.to_string()),
        }
    }
}

fn flag_value<'a, I>(iter: &mut I, flag: &str) -> Result<&'a String, String>
where
    I: Iterator<Item = &'a String>,
{
    iter.next()
        .ok_or_else(|| format!("{flag} expects a value\n{USAGE}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let parsed = CliArgs::parse(&args(&[
            "thesis.pdf",
            "source_files",
            "--block-size",
            "3",
            "--out",
            "artifacts",
        ]))
        .expect("parse");

        assert_eq!(parsed.target, PathBuf::from("thesis.pdf"));
        assert_eq!(parsed.source_dir, PathBuf::from("source_files"));
        assert_eq!(parsed.block_size, Some(3));
        assert_eq!(parsed.output_root, Some(PathBuf::from("artifacts")));
        assert!(parsed.config_path.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_positionals() {
        assert!(CliArgs::parse(&args(&["thesis.pdf"])).is_err());
        assert!(CliArgs::parse(&args(&[])).is_err());
        assert!(CliArgs::parse(&args(&["a.txt", "dir", "extra"])).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_block_size() {
        let err = CliArgs::parse(&args(&["a.txt", "dir", "--block-size", "two"])).unwrap_err();
        assert!(err.contains("--block-size"));
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        let err = CliArgs::parse(&args(&["a.txt", "dir", "--fast"])).unwrap_err();
        assert!(err.contains("--fast"));
    }
}
