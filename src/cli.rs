// src/cli.rs
use std::{env, error::Error, fs, path::PathBuf};

use crate::catalog::CatalogSource;
use crate::config::options::{EnrichOptions, InputSource};
use crate::core::net;
use crate::dom;
use crate::enrich::Enricher;
use crate::matcher;
use crate::progress::Progress;
use crate::scan;
use crate::watch::Watcher;

pub fn run() -> Result<(), Box<dyn Error>> {
    let opts = parse_cli()?;

    let input = opts
        .input
        .clone()
        .ok_or("Specify --input <file> or --url <url>")?;

    let html = match &input {
        InputSource::File(p) => fs::read_to_string(p)?,
        InputSource::Url(u) => {
            let (host, path) = net::split_url(u).ok_or("URL must be http(s)://host/path")?;
            net::https_get(&host, &path)?
        }
    };

    let mut doc = dom::parse(&html);

    if opts.list_only {
        for id in scan::text_nodes(&doc, doc.body()) {
            let text = doc.text(id).unwrap_or("");
            if let Some(code) = matcher::find_code(text) {
                println!("{},{}", code, matcher::reverse_digits(&code));
            }
        }
        return Ok(());
    }

    let names = CatalogSource::new(opts.pause_ms);
    let mut enricher = Enricher::new(&names);
    let mut watcher = Watcher::new();
    let mut progress = CliProgress::new(opts.quiet);

    watcher.start(&mut doc, &mut enricher, Some(&mut progress));

    fs::write(&opts.out, doc.to_html())?;
    println!("Wrote {}", opts.out.display());
    Ok(())
}

fn parse_cli() -> Result<EnrichOptions, Box<dyn Error>> {
    let mut opts = EnrichOptions::default();

    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "-i" | "--input" => {
                let v = args.next().ok_or("Missing value for --input")?;
                opts.input = Some(InputSource::File(PathBuf::from(v)));
            }
            "-u" | "--url" => {
                let v = args.next().ok_or("Missing value for --url")?;
                opts.input = Some(InputSource::Url(v));
            }
            "-o" | "--out" => {
                opts.out = PathBuf::from(args.next().ok_or("Missing output path")?);
            }
            "--pause" => {
                let v = args.next().ok_or("Missing value for --pause")?;
                opts.pause_ms = v.parse()?;
            }
            "--list" => opts.list_only = true,
            "-q" | "--quiet" => opts.quiet = true,
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }

    Ok(opts)
}

/// Per-code progress lines plus a closing summary.
struct CliProgress {
    quiet: bool,
    done: usize,
    failed: usize,
}

impl CliProgress {
    fn new(quiet: bool) -> Self {
        Self { quiet, done: 0, failed: 0 }
    }
}

impl Progress for CliProgress {
    fn log(&mut self, msg: &str) {
        if !self.quiet {
            eprintln!("{msg}");
        }
    }

    fn item_done(&mut self, code: &str, name: &str) {
        self.done += 1;
        if !self.quiet {
            eprintln!("{code}: {name}");
        }
    }

    fn item_failed(&mut self, code: &str) {
        self.failed += 1;
        if !self.quiet {
            eprintln!("{code}: no result");
        }
    }

    fn finish(&mut self) {
        eprintln!(
            "Enriched {} set code(s), {} lookup(s) without result",
            self.done, self.failed
        );
    }
}
