use std::env;
use std::fs;
use std::process;

use brlmusic::Options;

const USAGE: &str = "Usage: brlmusic [--brf] <timeline.yaml> [options.yaml] [output]";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    // Parse flags
    let brf = args.first().map(String::as_str) == Some("--brf");
    let positional = if brf { &args[1..] } else { &args[..] };

    if positional.is_empty() || positional.len() > 3 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }
    let input_path = &positional[0];
    let options_path = positional.get(1);
    let output_path = positional.get(2);

    let source = read(input_path);

    let options = match options_path {
        Some(path) => match Options::from_yaml(&read(path)) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error in '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => Options::default(),
    };

    let score = match brlmusic::timeline::load(&source) {
        Ok(score) => score,
        Err(e) => {
            eprintln!("Error in '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let result = if brf {
        brlmusic::transcribe_to_brf(&score, &options)
    } else {
        brlmusic::transcribe(&score, &options)
    };

    let text = match result {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Transcription error: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &text) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote braille to {}", path);
        }
        None => {
            println!("{}", text);
        }
    }
}

fn read(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path, e);
            process::exit(1);
        }
    }
}
