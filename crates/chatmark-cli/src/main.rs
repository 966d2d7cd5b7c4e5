use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use chatmark_core::{ParseOptions, escape_html_text, parse_html_as_formatted_text};

fn main() {
    let mut input: Option<String> = None;
    let mut options = ParseOptions::default();
    let mut escape_input = false;
    let mut pretty = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--links" => options.with_markdown_links = true,
            "--skip-markdown" => options.skip_markdown = true,
            "--text" => escape_input = true,
            "--pretty" => pretty = true,
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    let source = match input {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|err| {
                    eprintln!("failed to read stdin: {}", err);
                    process::exit(1);
                });
            buffer
        }
    };

    let source = if escape_input {
        escape_html_text(&source)
    } else {
        source
    };

    let formatted = parse_html_as_formatted_text(&source, &options);
    let json = if pretty {
        serde_json::to_string_pretty(&formatted)
    } else {
        serde_json::to_string(&formatted)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("failed to serialize output: {}", err);
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("usage: chatmark-cli [options] [file]");
    eprintln!();
    eprintln!("Reads composer HTML from <file> (or stdin) and prints the");
    eprintln!("parsed text and entities as JSON.");
    eprintln!();
    eprintln!("options:");
    eprintln!("  --links          rewrite [label](url) into links first");
    eprintln!("  --skip-markdown  skip the markdown rewrite pass");
    eprintln!("  --text           treat input as raw text and escape it first");
    eprintln!("  --pretty         pretty-print the JSON output");
    eprintln!("  -h, --help       show this help");
}
