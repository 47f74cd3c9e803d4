// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use wikiquery::config::Command;
use wikiquery::{CommandLineInput, Coordinates, PageIdentifier, PageOptions, SummaryOptions, Wiki, WikiConfig};

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("wikiquery.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // Results go to stdout; keep log lines on stderr.
    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Runs one subcommand against the configured endpoint.
fn execute(wiki: &Wiki, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Search { query, results } => {
            print_lines(&wiki.search(query, *results)?);
        }
        Command::Suggest { query } => match wiki.suggest(query)? {
            Some(suggestion) => println!("{}", suggestion),
            None => eprintln!("No suggestion for \"{}\"", query),
        },
        Command::Summary {
            title,
            sentences,
            chars,
        } => {
            let options = SummaryOptions {
                sentences: *sentences,
                chars: *chars,
                ..SummaryOptions::default()
            };
            println!("{}", wiki.summary(title, options)?);
        }
        Command::Page {
            title,
            no_redirect,
            exact,
        } => {
            let options = PageOptions {
                auto_suggest: !exact,
                follow_redirect: !no_redirect,
                preload: false,
            };
            let page = wiki.page_with(PageIdentifier::title(title.as_str())?, options)?;
            println!("{}\t{}\t{}", page.pageid(), page.title(), page.url());
        }
        Command::Links { title } => {
            print_lines(wiki.page(title)?.links()?);
        }
        Command::Categories { title } => {
            print_lines(wiki.page(title)?.categories()?);
        }
        Command::Section { title, section } => {
            let page = wiki.page(title)?;
            match page.section(section)? {
                Some(text) => println!("{}", text),
                None => anyhow::bail!("\"{}\" has no section \"{}\"", page.title(), section),
            }
        }
        Command::Members { category, results } => {
            let members = wiki.category_members(category, *results, true)?;
            print_lines(&members.pages);
            for subcategory in &members.subcategories {
                println!("Category:{}", subcategory);
            }
        }
        Command::Tree { categories, depth } => {
            let names: Vec<&str> = categories.iter().map(String::as_str).collect();
            let tree = wiki.category_tree(&names, *depth)?;
            let json = serde_json::to_string_pretty(&tree).context("serializing category tree")?;
            println!("{}", json);
        }
        Command::Geo {
            lat,
            lon,
            radius,
            results,
        } => {
            let coordinates = Coordinates { lat: *lat, lon: *lon };
            print_lines(&wiki.geosearch(coordinates, None, *results, *radius)?);
        }
        Command::Random { pages } => {
            print_lines(&wiki.random(*pages)?);
        }
        Command::Languages => {
            for (code, name) in wiki.languages()? {
                println!("{}\t{}", code, name);
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("failed to set up logging: {}", e))?;

    let config = WikiConfig::resolve(&cli)?;
    log::info!("Using {} ({})", config.api_url, config.language);

    let wiki = Wiki::new(config)?;
    execute(&wiki, &cli.command)
}
