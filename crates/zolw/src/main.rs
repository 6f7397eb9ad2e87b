use std::{
    cell::RefCell,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::exit,
    rc::Rc,
};

use anyhow::Context;
use clap::Parser;
use log::info;
use svg::node::element::{path::Data, Path as SvgPath, Text};
use svg::Document;
use zolw::{Config, DrawOp, Env, Error, Locale, PenMode, Recorder, RunOptions, TurtleMode};

/// Runs LOGO programs. Without a program to run, starts an interactive session.
#[derive(Parser)]
struct Args {
    /// A file containing the program.
    input: Option<PathBuf>,
    /// Runs this code instead of a file, and prints its value.
    #[arg(short, long)]
    eval: Option<String>,
    /// Which names the primitives go by: pl or en.
    #[arg(long, default_value = "pl")]
    locale: Locale,
    /// What the turtle does at the edge of its field: wrap, fence or window.
    #[arg(long, default_value = "wrap")]
    mode: TurtleMode,
    /// The width and height of the turtle's field.
    #[arg(long, default_value_t = 300.0)]
    size: f64,
    #[arg(long)]
    seed: Option<u64>,
    /// Saves the drawing to this file when the program finishes.
    #[arg(long)]
    svg: Option<PathBuf>,
}

fn repl(env: &mut Env) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut pending = String::new();
    loop {
        print!("{}", if pending.is_empty() { "? " } else { "> " });
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        pending.push_str(&line);
        match env.run(
            &pending,
            RunOptions {
                return_result: true,
            },
        ) {
            // A definition that isn't finished yet; keep reading.
            Err(Error::ExpectedEnd(_)) => continue,
            Err(e) => println!("error: {e}"),
            Ok(Some(v)) => println!("{v}"),
            Ok(None) => {}
        }
        pending.clear();
    }
}

fn save_svg(path: &Path, recorder: &Recorder, config: &Config) -> anyhow::Result<()> {
    let (w, h) = (config.half_width, config.half_height);
    let mut document = Document::new()
        .set("viewBox", (-w, -h, 2.0 * w, 2.0 * h))
        .set("width", 2.0 * w)
        .set("height", 2.0 * h);

    let start = recorder
        .ops
        .iter()
        .rposition(|op| *op == DrawOp::Clear)
        .map_or(0, |i| i + 1);
    // The turtle's y axis points up, and svg's points down.
    for op in &recorder.ops[start..] {
        match op {
            DrawOp::Segment { from, to, pen } => {
                let data = Data::new()
                    .move_to((from.x, -from.y))
                    .line_to((to.x, -to.y));
                let stroke = match pen.mode {
                    PenMode::Erase => "white",
                    _ => pen.color.as_str(),
                };
                let path = SvgPath::new()
                    .set("fill", "none")
                    .set("stroke", stroke)
                    .set("stroke-width", pen.size)
                    .set("stroke-linecap", "round")
                    .set("d", data);
                document = document.add(path);
            }
            DrawOp::Label { at, text, height } => {
                let text = Text::new()
                    .set("x", at.x)
                    .set("y", -at.y)
                    .set("font-size", *height)
                    .add(svg::node::Text::new(text.as_str()));
                document = document.add(text);
            }
            DrawOp::Clear => {}
        }
    }

    svg::save(path, &document).with_context(|| format!("failed to write {}", path.display()))?;
    info!("saved drawing to {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let config = Config {
        locale: args.locale,
        half_width: args.size / 2.0,
        half_height: args.size / 2.0,
        turtle_mode: args.mode,
        seed: args.seed,
    };
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut env = Env::new(config).with_canvas(recorder.clone());

    let mut failed = false;
    if let Some(code) = &args.eval {
        match env.run(
            code,
            RunOptions {
                return_result: true,
            },
        ) {
            Ok(Some(v)) => println!("{v}"),
            Ok(None) => {}
            Err(e) => {
                eprintln!("error: {e}");
                failed = true;
            }
        }
    } else if let Some(input) = &args.input {
        let source = std::fs::read_to_string(input)
            .with_context(|| format!("failed to open input file {}", input.display()))?;
        if let Err(e) = env.run(&source, RunOptions::default()) {
            eprintln!("error: {e}");
            failed = true;
        }
    } else {
        repl(&mut env)?;
    }

    if let Some(path) = &args.svg {
        save_svg(path, &recorder.borrow(), env.config())?;
    }
    if failed {
        exit(1);
    }
    Ok(())
}
