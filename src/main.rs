// looptty: step through the event loop of a single-threaded async runtime

mod compiler;
mod library;
mod replay;
mod share;
mod trace;
mod ui;

use std::fs;
use std::io;
use std::path::Path;
use std::process;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use library::Library;
use share::ShareState;
use trace::Example;
use ui::App;

fn usage(program_name: &str) -> ! {
    eprintln!("Usage: {} [options] [file.js]", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --example <name>   Open a built-in example");
    eprintln!("  --state <state>    Open a shared state, e.g. \"example=basic-timeout&step=4\"");
    eprintln!("  --list             List the built-in examples and exit");
    eprintln!("  --json             Print the selected trace as JSON instead of opening the TUI");
    eprintln!();
    eprintln!("With a file argument the source is compiled into a custom trace;");
    eprintln!("with no arguments the first built-in example opens.");
    process::exit(1);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("looptty");

    let mut example_name: Option<String> = None;
    let mut state_arg: Option<String> = None;
    let mut source_file: Option<String> = None;
    let mut list = false;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--example" => {
                i += 1;
                match args.get(i) {
                    Some(name) => example_name = Some(name.clone()),
                    None => usage(program_name),
                }
            }
            "--state" => {
                i += 1;
                match args.get(i) {
                    Some(state) => state_arg = Some(state.clone()),
                    None => usage(program_name),
                }
            }
            "--list" => list = true,
            "--json" => json = true,
            "--help" | "-h" => usage(program_name),
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option '{}'", arg);
                usage(program_name);
            }
            arg => source_file = Some(arg.to_string()),
        }
        i += 1;
    }

    let library = Library::builtin();

    if list {
        for example in library.examples() {
            println!("{:20} {}", example.name, example.description);
        }
        return Ok(());
    }

    // Resolve what to play back and where to start.
    let mut start_index = 0;

    let example: Example = if let Some(path) = &source_file {
        if !Path::new(path).exists() {
            eprintln!("Error: File '{}' not found", path);
            process::exit(1);
        }
        let source = fs::read_to_string(path)?;
        eprintln!("Compiling {}...", path);
        match compiler::compile(&source) {
            Ok(example) => {
                eprintln!("Compiled: {} steps.", example.step_count());
                example
            }
            Err(e) => {
                eprintln!("Compile error: {}", e);
                process::exit(1);
            }
        }
    } else if let Some(state) = &state_arg {
        match ShareState::decode(state) {
            Some(state) => match library.get(&state.example) {
                Some(example) => {
                    start_index = state.step_within(example);
                    example.clone()
                }
                None => {
                    eprintln!("Error: Shared state names unknown example '{}'", state.example);
                    process::exit(1);
                }
            },
            None => {
                eprintln!("Error: Could not decode shared state '{}'", state);
                process::exit(1);
            }
        }
    } else if let Some(name) = &example_name {
        match library.get(name) {
            Some(example) => example.clone(),
            None => {
                eprintln!("Error: No built-in example named '{}'", name);
                eprintln!("Use --list to see what is available.");
                process::exit(1);
            }
        }
    } else {
        library.default_example().clone()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&example)?);
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(example, start_index);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
